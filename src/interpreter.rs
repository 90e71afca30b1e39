// ABOUTME: Tree-walking evaluator: executes statements and evaluates expressions over an Environment chain

use crate::ast::{Expr, Stmt};
use crate::builtins;
use crate::callable::UserFunction;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::import::{self, ImportStack};
use crate::lexer::Lexer;
use crate::output::{OutputSink, StdoutOutput};
use crate::parser::Parser;
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const INTERACTIVE_LABEL: &str = "<stdin>";

/// A runtime error together with the source line it occurred on, when known.
/// Errors raised inside a `Callable` (which has no line context of its own)
/// are wrapped with the calling expression's line by the interpreter.
#[derive(Debug, Clone)]
pub struct RuntimeErrorAt {
    pub line: Option<usize>,
    pub error: RuntimeError,
}

fn err_at(line: usize, error: RuntimeError) -> RuntimeErrorAt {
    RuntimeErrorAt { line: Some(line), error }
}

/// What a statement hands back to its enclosing block: either nothing special
/// happened, or a `return` unwound up to here and should keep unwinding.
pub enum Signal {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    current_file: Option<PathBuf>,
    imports: ImportStack,
    sink: Box<dyn DiagnosticSink>,
    output: Box<dyn OutputSink>,
}

impl Interpreter {
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self::with_output(sink, Box::new(StdoutOutput))
    }

    /// Like `new`, but routes `print` output through a caller-supplied sink
    /// instead of stdout — used by tests that assert on a script's literal
    /// output.
    pub fn with_output(sink: Box<dyn DiagnosticSink>, output: Box<dyn OutputSink>) -> Self {
        let globals = Environment::new();
        builtins::register_natives(&globals);
        Interpreter {
            environment: globals.clone(),
            globals,
            current_file: None,
            imports: ImportStack::new(),
            sink,
            output,
        }
    }

    /// Lexes, parses, and executes `source`. Returns `true` if it ran to
    /// completion without a lex, parse, or runtime error.
    pub fn run(&mut self, source: &str, file: Option<PathBuf>) -> bool {
        let file_label = file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| INTERACTIVE_LABEL.to_string());

        let (tokens, lex_errors) = Lexer::new(source).scan_tokens();
        for e in &lex_errors {
            self.sink.report(Diagnostic::Lex {
                file: file_label.clone(),
                line: e.line,
                error: e.error.clone(),
            });
        }

        let (statements, parse_errors) = Parser::new(tokens).parse();
        for e in &parse_errors {
            self.sink.report(Diagnostic::Parse { token: e.token.clone(), error: e.error.clone() });
        }

        if !lex_errors.is_empty() || !parse_errors.is_empty() {
            return false;
        }

        let previous_file = self.current_file.clone();
        self.current_file = file;
        let mut ok = true;
        for stmt in &statements {
            if let Err(e) = self.execute(stmt) {
                self.sink.report(Diagnostic::Runtime { file: file_label.clone(), line: e.line, error: e.error });
                ok = false;
                break;
            }
        }
        self.current_file = previous_file;
        ok
    }

    // ===== statements =====

    fn execute(&mut self, stmt: &Stmt) -> Result<Signal, RuntimeErrorAt> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print { values, .. } => {
                let mut rendered = Vec::with_capacity(values.len());
                for value in values {
                    rendered.push(self.evaluate(value)?.to_display_string());
                }
                self.output.print_line(&rendered.join(" "));
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block(statements) => {
                let new_env = Environment::with_parent(self.environment.clone());
                self.execute_block(statements, new_env)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Signal::Normal => {}
                        Signal::Return(v) => return Ok(Signal::Return(v)),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function { name, params, body } => {
                let function = UserFunction {
                    name: name.lexeme.clone(),
                    params: params.iter().map(|p| p.lexeme.clone()).collect(),
                    body: Rc::new(body.clone()),
                    closure: self.environment.clone(),
                };
                self.environment.define(name.lexeme.clone(), Value::Callable(Rc::new(function)));
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Assert { keyword, condition, message } => {
                let cond = self.evaluate(condition)?;
                if !cond.is_truthy() {
                    let text = self.evaluate(message)?.to_display_string();
                    return Err(err_at(keyword.line, RuntimeError::AssertionFailed(text)));
                }
                Ok(Signal::Normal)
            }
            Stmt::Import { keyword, path, .. } => {
                let literal = match &path.literal {
                    Some(Literal::String(s)) => s.clone(),
                    _ => unreachable!("parser only produces Import with a string literal token"),
                };
                self.import_module(&literal, keyword.line)?;
                Ok(Signal::Normal)
            }
        }
    }

    /// Runs `statements` in `env`, restoring the interpreter's previous scope
    /// on the way out whether the block finished, returned, or errored.
    fn execute_block(&mut self, statements: &[Stmt], env: Rc<Environment>) -> Result<Signal, RuntimeErrorAt> {
        let previous = std::mem::replace(&mut self.environment, env);
        let mut result = Ok(Signal::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Signal::Normal) => {}
                Ok(signal @ Signal::Return(_)) => {
                    result = Ok(signal);
                    break;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.environment = previous;
        result
    }

    /// Entry point used by `UserFunction::call`: runs a function body in its
    /// own call frame and collapses a `Return` signal into its value.
    pub fn execute_function_body(&mut self, body: &[Stmt], env: Rc<Environment>) -> Result<Value, RuntimeError> {
        match self.execute_block(body, env) {
            Ok(Signal::Return(v)) => Ok(v),
            Ok(Signal::Normal) => Ok(Value::Nil),
            Err(e) => Err(e.error),
        }
    }

    fn import_module(&mut self, literal: &str, line: usize) -> Result<(), RuntimeErrorAt> {
        let resolved = import::resolve_module(literal, self.current_file.as_deref()).map_err(|e| err_at(line, e))?;
        let canonical = resolved.canonicalize().unwrap_or_else(|_| resolved.clone());
        self.imports.enter(canonical).map_err(|e| err_at(line, e))?;
        let result = self.run_module_file(&resolved, line);
        self.imports.exit();
        result
    }

    fn run_module_file(&mut self, resolved: &Path, line: usize) -> Result<(), RuntimeErrorAt> {
        let source = std::fs::read_to_string(resolved).map_err(|e| {
            err_at(line, RuntimeError::FileError { path: resolved.display().to_string(), message: e.to_string() })
        })?;

        let file_label = resolved.display().to_string();
        let (tokens, lex_errors) = Lexer::new(&source).scan_tokens();
        let (statements, parse_errors) = Parser::new(tokens).parse();
        for e in &lex_errors {
            self.sink.report(Diagnostic::Lex { file: file_label.clone(), line: e.line, error: e.error.clone() });
        }
        for e in &parse_errors {
            self.sink.report(Diagnostic::Parse { token: e.token.clone(), error: e.error.clone() });
        }
        if !lex_errors.is_empty() || !parse_errors.is_empty() {
            return Err(err_at(line, RuntimeError::Custom(format!("failed to import module: {}", file_label))));
        }

        let previous_file = self.current_file.replace(resolved.to_path_buf());
        let result = self.execute_block(&statements, self.globals.clone());
        self.current_file = previous_file;
        result.map(|_| ())
    }

    // ===== expressions =====

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeErrorAt> {
        match expr {
            Expr::Literal(lit) => Ok(literal_to_value(lit)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Variable(name) => self
                .environment
                .get(&name.lexeme)
                .ok_or_else(|| err_at(name.line, RuntimeError::UndefinedVariable(name.lexeme.clone()))),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                if !self.environment.assign(&name.lexeme, value.clone()) {
                    self.globals.define(name.lexeme.clone(), value.clone());
                }
                Ok(value)
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),
            Expr::Binary { left, operator, right } => self.evaluate_binary(left, operator, right),
            Expr::Logical { left, operator, right } => self.evaluate_logical(left, operator, right),
            Expr::Call { callee, paren, arguments } => self.evaluate_call(callee, paren, arguments),
            Expr::ListLiteral { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::list(items))
            }
            Expr::IndexGet { object, bracket, index } => self.evaluate_index_get(object, bracket, index),
            Expr::IndexSet { object, bracket, index, value } => {
                self.evaluate_index_set(object, bracket, index, value)
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, RuntimeErrorAt> {
        let value = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Minus => match value {
                Value::Integer(n) => Ok(Value::Integer(-n)),
                Value::Float(n) => Ok(Value::Float(-n)),
                _ => Err(err_at(operator.line, RuntimeError::OperandMustBeNumber)),
            },
            TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
            _ => unreachable!("parser only emits Minus or Bang as a unary operator"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, RuntimeErrorAt> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let line = operator.line;
        match operator.kind {
            TokenKind::Plus => match (&left, &right) {
                (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
                _ if left.is_number() && right.is_number() => Ok(Value::Float(left.as_f64() + right.as_f64())),
                _ => Err(err_at(line, RuntimeError::OperandsMustBeNumbers)),
            },
            TokenKind::Minus => numeric_binary(&left, &right, line, |a, b| a - b),
            TokenKind::Star => numeric_binary(&left, &right, line, |a, b| a * b),
            TokenKind::Slash => {
                require_numbers(&left, &right, line)?;
                let divisor = right.as_f64();
                if divisor == 0.0 {
                    return Err(err_at(line, RuntimeError::DivisionByZero));
                }
                Ok(Value::Float(left.as_f64() / divisor))
            }
            TokenKind::Greater => numeric_comparison(&left, &right, line, |a, b| a > b),
            TokenKind::GreaterEqual => numeric_comparison(&left, &right, line, |a, b| a >= b),
            TokenKind::Less => numeric_comparison(&left, &right, line, |a, b| a < b),
            TokenKind::LessEqual => numeric_comparison(&left, &right, line, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left.values_equal(&right))),
            TokenKind::BangEqual => Ok(Value::Bool(!left.values_equal(&right))),
            _ => unreachable!("parser only emits these operators for a binary expression"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, RuntimeErrorAt> {
        let left = self.evaluate(left)?;
        match operator.kind {
            TokenKind::PipePipe if left.is_truthy() => return Ok(Value::Bool(true)),
            TokenKind::AmpAmp if !left.is_truthy() => return Ok(Value::Bool(false)),
            _ => {}
        }
        let right = self.evaluate(right)?;
        Ok(Value::Bool(right.is_truthy()))
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value, RuntimeErrorAt> {
        let callee = self.evaluate(callee)?;
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }
        let callable = match callee {
            Value::Callable(c) => c,
            _ => return Err(err_at(paren.line, RuntimeError::NotCallable)),
        };
        let arity = callable.arity();
        if arity >= 0 && args.len() as i32 != arity {
            return Err(err_at(paren.line, RuntimeError::arity(arity.to_string(), args.len())));
        }
        callable.call(self, args).map_err(|e| err_at(paren.line, e))
    }

    fn evaluate_index_get(&mut self, object: &Expr, bracket: &Token, index: &Expr) -> Result<Value, RuntimeErrorAt> {
        let object = self.evaluate(object)?;
        let index = self.evaluate(index)?;
        match object {
            Value::List(items) => {
                let i = list_index(&index, bracket.line)?;
                items
                    .borrow()
                    .get(i)
                    .cloned()
                    .ok_or_else(|| err_at(bracket.line, RuntimeError::IndexOutOfRange))
            }
            _ => Err(err_at(bracket.line, RuntimeError::NotIndexable)),
        }
    }

    fn evaluate_index_set(
        &mut self,
        object: &Expr,
        bracket: &Token,
        index: &Expr,
        value: &Expr,
    ) -> Result<Value, RuntimeErrorAt> {
        let object = self.evaluate(object)?;
        let index = self.evaluate(index)?;
        let value = self.evaluate(value)?;
        match object {
            Value::List(items) => {
                let i = list_index(&index, bracket.line)?;
                let mut items = items.borrow_mut();
                if i >= items.len() {
                    return Err(err_at(bracket.line, RuntimeError::IndexOutOfRange));
                }
                items[i] = value.clone();
                Ok(value)
            }
            _ => Err(err_at(bracket.line, RuntimeError::NotIndexable)),
        }
    }
}

fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::String(s) => Value::string(s.clone()),
        Literal::Char(c) => Value::Char(*c),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

fn require_numbers(left: &Value, right: &Value, line: usize) -> Result<(), RuntimeErrorAt> {
    if left.is_number() && right.is_number() {
        Ok(())
    } else {
        Err(err_at(line, RuntimeError::OperandsMustBeNumbers))
    }
}

fn numeric_binary(left: &Value, right: &Value, line: usize, op: impl Fn(f64, f64) -> f64) -> Result<Value, RuntimeErrorAt> {
    require_numbers(left, right, line)?;
    Ok(Value::Float(op(left.as_f64(), right.as_f64())))
}

fn numeric_comparison(
    left: &Value,
    right: &Value,
    line: usize,
    op: impl Fn(f64, f64) -> bool,
) -> Result<Value, RuntimeErrorAt> {
    require_numbers(left, right, line)?;
    Ok(Value::Bool(op(left.as_f64(), right.as_f64())))
}

fn list_index(value: &Value, line: usize) -> Result<usize, RuntimeErrorAt> {
    match value {
        Value::Integer(n) if *n >= 0 => Ok(*n as usize),
        Value::Integer(_) => Err(err_at(line, RuntimeError::IndexOutOfRange)),
        _ => Err(err_at(line, RuntimeError::IndexMustBeInteger)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn run(source: &str) -> bool {
        let mut interp = Interpreter::new(Box::new(CollectingSink::new()));
        interp.run(source, None)
    }

    #[test]
    fn arithmetic_widens_to_float() {
        assert!(run("var x = 1 + 2 * 3; assert x == 7.0, \"arithmetic\";"));
    }

    #[test]
    fn string_concatenation() {
        assert!(run("var s = \"foo\" + \"bar\"; assert s == \"foobar\", \"concat\";"));
    }

    #[test]
    fn function_call_and_closure_counter() {
        let source = r#"
            function make_counter() {
                var n = 0;
                function counter() {
                    n = n + 1;
                    return n;
                }
                return counter;
            }
            var c = make_counter();
            assert c() == 1.0, "first call";
            assert c() == 2.0, "second call";
        "#;
        assert!(run(source));
    }

    #[test]
    fn list_indexing_and_mutation() {
        let source = r#"
            var xs = [1, 2, 3];
            xs[1] = 9;
            assert xs[1] == 9, "mutated";
        "#;
        assert!(run(source));
    }

    #[test]
    fn failed_assert_reports_runtime_error() {
        assert!(!run("assert false, \"always fails\";"));
    }

    #[test]
    fn unary_minus_preserves_integer_variant_for_indexing() {
        // `-1` stays Value::Integer(-1) rather than widening to float, so it
        // passes the index-must-be-integer check and fails bounds instead.
        let mut interp = Interpreter::new(Box::new(CollectingSink::new()));
        let ok = interp.run("var xs = [10, 20, 30]; var y = xs[-1];", None);
        assert!(!ok);
    }

    #[test]
    fn assigning_undeclared_name_defines_it_at_globals() {
        assert!(run("x = 5; assert x == 5.0, \"global assign\";"));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert!(!run("var x = 1 / 0;"));
    }
}
