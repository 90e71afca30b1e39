// ABOUTME: The small set of natives bundled into every interpreter's global scope

use crate::callable::NativeFunction;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn register_natives(globals: &Rc<Environment>) {
    define(globals, "clock", 0, native_clock);
    define(globals, "len", 1, native_len);
    define(globals, "type_of", 1, native_type_of);
}

fn define(globals: &Rc<Environment>, name: &'static str, arity: i32, func: fn(&mut Interpreter, Vec<Value>) -> Result<Value, RuntimeError>) {
    globals.define(name, Value::Callable(Rc::new(NativeFunction { name, arity, func })));
}

fn native_clock(_interpreter: &mut Interpreter, _args: Vec<Value>) -> Result<Value, RuntimeError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch");
    Ok(Value::Float(elapsed.as_secs_f64()))
}

fn native_len(_interpreter: &mut Interpreter, mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    match args.remove(0) {
        Value::List(items) => Ok(Value::Integer(items.borrow().len() as i64)),
        Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
        other => Err(RuntimeError::Custom(format!(
            "len() expects a list or string, got {}",
            other.type_name()
        ))),
    }
}

fn native_type_of(_interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, RuntimeError> {
    Ok(Value::string(args[0].type_name()))
}
