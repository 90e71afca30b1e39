// ABOUTME: The callable protocol shared by user-defined functions and bundled natives

use crate::ast::Stmt;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Anything invocable with `(...)` syntax implements this. `arity` of `-1` means
/// variadic (no arity check is performed before `call` runs).
pub trait Callable: fmt::Debug {
    fn arity(&self) -> i32;
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError>;

    /// The text a callable renders as when printed or interpolated into a string.
    fn describe(&self) -> String;
}

/// A function declared in source, closing over the environment active at its
/// definition site.
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<Environment>,
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserFunction({})", self.name)
    }
}

impl Callable for UserFunction {
    fn arity(&self) -> i32 {
        self.params.len() as i32
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let call_env = Environment::with_parent(self.closure.clone());
        for (param, arg) in self.params.iter().zip(args.into_iter()) {
            call_env.define(param.clone(), arg);
        }
        interpreter.execute_function_body(&self.body, call_env)
    }

    fn describe(&self) -> String {
        format!("<fn {}>", self.name)
    }
}

/// A bundled, host-provided function such as `clock` or `len`.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: i32,
    pub func: fn(&mut Interpreter, Vec<Value>) -> Result<Value, RuntimeError>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> i32 {
        self.arity
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
        (self.func)(interpreter, args)
    }

    fn describe(&self) -> String {
        "<native fn>".to_string()
    }
}
