// ABOUTME: Recursive-descent parser turning a token stream into statements, with panic-mode recovery

use crate::ast::{Expr, Stmt};
use crate::error::ParseError;
use crate::token::{Literal, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct ParseErrorAt {
    pub token: Option<Token>,
    pub error: ParseError,
}

type ParseResult<T> = Result<T, ParseErrorAt>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseErrorAt>,
}

const MAX_PARAMS: usize = 255;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, errors: Vec::new() }
    }

    /// Parses the whole token stream into a program. Statements that fail to
    /// parse are skipped after synchronizing to the next statement boundary;
    /// every error encountered is still reported.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseErrorAt>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        (statements, self.errors)
    }

    // ===== declarations =====

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Function]) {
            return self.function_declaration();
        }
        if self.matches(&[TokenKind::Var]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenKind::Identifier, ParseError::ExpectFunctionName)?
            .clone();
        self.consume(TokenKind::LeftParen, ParseError::ExpectToken("(".to_string()))?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_PARAMS {
                    self.report_error(ParseError::TooMany("parameters"));
                }
                let param = self
                    .consume(TokenKind::Identifier, ParseError::ExpectParameterName)?
                    .clone();
                params.push(param);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?;
        self.consume(TokenKind::LeftBrace, ParseError::ExpectToken("{".to_string()))?;
        let body = self.block()?;
        Ok(Stmt::Function { name, params, body })
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenKind::Identifier, ParseError::ExpectVariableName)?
            .clone();
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Var { name, initializer })
    }

    // ===== statements =====

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::Assert]) {
            return self.assert_statement();
        }
        if self.matches(&[TokenKind::Import]) {
            return self.import_statement();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let mut values = vec![self.expression()?];
        while self.matches(&[TokenKind::Comma]) {
            values.push(self.expression()?);
        }
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Print { keyword, values })
    }

    fn assert_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let condition = self.expression()?;
        self.consume(TokenKind::Comma, ParseError::ExpectToken(",".to_string()))?;
        let message = self.expression()?;
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Assert { keyword, condition, message })
    }

    fn import_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let mut namespace = None;
        if self.check(TokenKind::Identifier) {
            namespace = Some(self.advance().clone());
            self.consume(TokenKind::From, ParseError::ExpectToken("from".to_string()))?;
        }
        let path = self
            .consume(TokenKind::String, ParseError::ExpectImportPath)?
            .clone();
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Import { keyword, path, namespace })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, ParseError::ExpectToken("(".to_string()))?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, ParseError::ExpectToken("(".to_string()))?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// Desugars the C-style `for` into a `while` wrapped in a block, matching the
    /// loop's scoping (the initializer's variable is local to the loop).
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, ParseError::ExpectToken("(".to_string()))?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            self.expression()?
        } else {
            Expr::Literal(Literal::Bool(true))
        };
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While { condition, body: Box::new(body) };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }
        Ok(body)
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        self.consume(TokenKind::RightBrace, ParseError::ExpectToken("}".to_string()))?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, ParseError::ExpectToken(";".to_string()))?;
        Ok(Stmt::Expression(expr))
    }

    // ===== expressions, in increasing precedence order =====

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign { name, value: Box::new(value) }),
                Expr::IndexGet { object, bracket, index } => {
                    Ok(Expr::IndexSet { object, bracket, index, value: Box::new(value) })
                }
                _ => Err(ParseErrorAt {
                    token: Some(equals),
                    error: ParseError::InvalidAssignmentTarget,
                }),
            };
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::PipePipe]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::AmpAmp]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        while self.matches(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::Plus, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::Star, TokenKind::Slash]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary { left: Box::new(expr), operator, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary { operator, right: Box::new(right) });
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::LeftBracket]) {
                let bracket = self.previous().clone();
                let index = self.expression()?;
                self.consume(TokenKind::RightBracket, ParseError::ExpectToken("]".to_string()))?;
                expr = Expr::IndexGet { object: Box::new(expr), bracket, index: Box::new(index) };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_PARAMS {
                    self.report_error(ParseError::TooMany("arguments"));
                }
                arguments.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self
            .consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?
            .clone();
        Ok(Expr::Call { callee: Box::new(callee), paren, arguments })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::False, TokenKind::True, TokenKind::Number, TokenKind::String, TokenKind::Char]) {
            let literal = self
                .previous()
                .literal
                .clone()
                .expect("lexer always attaches a literal to this token kind");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Nil);
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(self.previous().clone()));
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, ParseError::ExpectToken(")".to_string()))?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        if self.matches(&[TokenKind::LeftBracket]) {
            let bracket = self.previous().clone();
            let mut elements = Vec::new();
            if !self.check(TokenKind::RightBracket) {
                loop {
                    elements.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightBracket, ParseError::ExpectToken("]".to_string()))?;
            return Ok(Expr::ListLiteral { bracket, elements });
        }
        Err(self.error_at_current(ParseError::ExpectExpression))
    }

    // ===== token stream helpers =====

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, error: ParseError) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error_at_current(error))
    }

    fn error_at_current(&self, error: ParseError) -> ParseErrorAt {
        let token = if self.is_at_end() { None } else { Some(self.peek().clone()) };
        ParseErrorAt { token, error }
    }

    /// Records a diagnostic without aborting the current production — used for
    /// recoverable violations like the 255-parameter/argument cap, where
    /// parsing should continue and still produce a valid AST node.
    fn report_error(&mut self, error: ParseError) {
        let err = self.error_at_current(error);
        self.errors.push(err);
    }

    /// Discards tokens until the start of what looks like the next statement,
    /// so one bad statement doesn't cascade into spurious downstream errors.
    fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Function
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Assert
                | TokenKind::Import => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
