//! cons, car, cdr

use crate::error::EvalError;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

fn cons(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Object(gc.alloc_value(HeapObject::Pair(args[0], args[1]))))
}

fn car(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    args[0]
        .car(gc)
        .ok_or_else(|| EvalError::type_error("car requires a pair argument"))
}

fn cdr(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    args[0]
        .cdr(gc)
        .ok_or_else(|| EvalError::type_error("cdr requires a pair argument"))
}

pub fn register(gc: &mut Gc, env: EnvRef) {
    use super::define_fn;
    define_fn(gc, env, "cons", Arity::Exact(2), cons);
    define_fn(gc, env, "car", Arity::Exact(1), car);
    define_fn(gc, env, "cdr", Arity::Exact(1), cdr);
}
