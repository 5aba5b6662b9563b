//! make-vector, vector-length, vector-ref, vector-set!

use crate::error::EvalError;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

fn as_index(v: &Value, who: &str) -> Result<usize, EvalError> {
    match v {
        Value::Integer(n) if *n >= 0 => Ok(*n as usize),
        Value::Integer(_) => Err(EvalError::type_error(format!("{who} requires a non-negative index"))),
        _ => Err(EvalError::type_error(format!("{who} requires an integer index"))),
    }
}

fn make_vector(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let len = as_index(&args[0], "make-vector")?;
    let fill = args.get(1).copied().unwrap_or(Value::Integer(0));
    Ok(Value::Object(gc.alloc_value(HeapObject::Vector(vec![fill; len]))))
}

fn vector_length(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    match args[0].object(gc) {
        Some(HeapObject::Vector(items)) => Ok(Value::Integer(items.len() as i64)),
        _ => Err(EvalError::type_error("vector-length requires a vector argument")),
    }
}

fn vector_ref(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let index = as_index(&args[1], "vector-ref")?;
    match args[0].object(gc) {
        Some(HeapObject::Vector(items)) => items
            .get(index)
            .copied()
            .ok_or_else(|| EvalError::type_error("vector-ref index out of range")),
        _ => Err(EvalError::type_error("vector-ref requires a vector argument")),
    }
}

fn vector_set(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let index = as_index(&args[1], "vector-set!")?;
    let value = args[2];
    let gc_ref = args[0]
        .gc_ref()
        .ok_or_else(|| EvalError::type_error("vector-set! requires a vector argument"))?;
    match gc.get_mut(gc_ref) {
        HeapObject::Vector(items) => {
            let slot = items
                .get_mut(index)
                .ok_or_else(|| EvalError::type_error("vector-set! index out of range"))?;
            *slot = value;
            Ok(Value::Undefined)
        }
        _ => Err(EvalError::type_error("vector-set! requires a vector argument")),
    }
}

pub fn register(gc: &mut Gc, env: EnvRef) {
    use super::define_fn;
    define_fn(gc, env, "make-vector", Arity::Range(1, 2), make_vector);
    define_fn(gc, env, "vector-length", Arity::Exact(1), vector_length);
    define_fn(gc, env, "vector-ref", Arity::Exact(2), vector_ref);
    define_fn(gc, env, "vector-set!", Arity::Exact(3), vector_set);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_vector_fills_with_default() {
        let mut gc = Gc::new();
        let v = make_vector(&mut gc, &[Value::Integer(3)]).unwrap();
        assert_eq!(vector_length(&mut gc, &[v]), Ok(Value::Integer(3)));
        assert_eq!(vector_ref(&mut gc, &[v, Value::Integer(0)]), Ok(Value::Integer(0)));
    }

    #[test]
    fn vector_set_mutates_in_place() {
        let mut gc = Gc::new();
        let v = make_vector(&mut gc, &[Value::Integer(2)]).unwrap();
        vector_set(&mut gc, &[v, Value::Integer(1), Value::Integer(9)]).unwrap();
        assert_eq!(vector_ref(&mut gc, &[v, Value::Integer(1)]), Ok(Value::Integer(9)));
    }

    #[test]
    fn vector_ref_out_of_range_is_an_error() {
        let mut gc = Gc::new();
        let v = make_vector(&mut gc, &[Value::Integer(1)]).unwrap();
        assert!(vector_ref(&mut gc, &[v, Value::Integer(5)]).is_err());
    }
}
