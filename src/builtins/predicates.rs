//! Type predicates: number?, pair?, vector?, symbol?, string?, procedure?

use crate::error::EvalError;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

fn number_p(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0], Value::Integer(_))))
}

fn pair_p(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_pair(gc)))
}

fn vector_p(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0].object(gc), Some(HeapObject::Vector(_)))))
}

fn symbol_p(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(args[0].is_symbol(gc)))
}

fn string_p(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(args[0].object(gc), Some(HeapObject::String(_)))))
}

fn procedure_p(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Bool(matches!(
        args[0].object(gc),
        Some(HeapObject::Function { .. }) | Some(HeapObject::Closure { .. })
    )))
}

pub fn register(gc: &mut Gc, env: EnvRef) {
    use super::define_fn;
    define_fn(gc, env, "number?", Arity::Exact(1), number_p);
    define_fn(gc, env, "pair?", Arity::Exact(1), pair_p);
    define_fn(gc, env, "vector?", Arity::Exact(1), vector_p);
    define_fn(gc, env, "symbol?", Arity::Exact(1), symbol_p);
    define_fn(gc, env, "string?", Arity::Exact(1), string_p);
    define_fn(gc, env, "procedure?", Arity::Exact(1), procedure_p);
}
