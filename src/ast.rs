// ABOUTME: Abstract syntax tree produced by the parser and walked by the interpreter

use crate::token::{Literal, Token};

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Nil,
    Variable(Token),
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    ListLiteral {
        bracket: Token,
        elements: Vec<Expr>,
    },
    IndexGet {
        object: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
    },
    IndexSet {
        object: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
        value: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print {
        keyword: Token,
        values: Vec<Expr>,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function {
        name: Token,
        params: Vec<Token>,
        body: Vec<Stmt>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Assert {
        keyword: Token,
        condition: Expr,
        message: Expr,
    },
    Import {
        keyword: Token,
        path: Token,
        namespace: Option<Token>,
    },
}
