//! +, -, *, div, mod — C-semantics integer arithmetic: division and
//! modulo truncate toward zero (Rust's `/` and `%` on signed integers
//! already do this, so no extra rounding logic is needed).

use crate::error::EvalError;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, Value};

fn as_int(v: &Value, who: &str) -> Result<i64, EvalError> {
    match v {
        Value::Integer(n) => Ok(*n),
        _ => Err(EvalError::type_error(format!("{who} requires numeric arguments"))),
    }
}

/// `(+ n ...)` — sum of all arguments, 0 with none.
fn add(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let mut acc: i64 = 0;
    for a in args {
        acc = acc.wrapping_add(as_int(a, "+")?);
    }
    Ok(Value::Integer(acc))
}

/// `(- n ...)` — subtract the rest from the first, or negate a single
/// argument.
fn sub(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let first = as_int(&args[0], "-")?;
    if args.len() == 1 {
        return Ok(Value::Integer(first.wrapping_neg()));
    }
    let mut acc = first;
    for a in &args[1..] {
        acc = acc.wrapping_sub(as_int(a, "-")?);
    }
    Ok(Value::Integer(acc))
}

/// `(* n ...)` — product of all arguments, 1 with none.
fn mul(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let mut acc: i64 = 1;
    for a in args {
        acc = acc.wrapping_mul(as_int(a, "*")?);
    }
    Ok(Value::Integer(acc))
}

/// `(div a b)` — truncating integer division.
fn div(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let a = as_int(&args[0], "div")?;
    let b = as_int(&args[1], "div")?;
    if b == 0 {
        return Err(EvalError::type_error("division by zero"));
    }
    Ok(Value::Integer(a.wrapping_div(b)))
}

/// `(mod a b)` — truncating remainder, same sign as `a`.
fn rem(_gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let a = as_int(&args[0], "mod")?;
    let b = as_int(&args[1], "mod")?;
    if b == 0 {
        return Err(EvalError::type_error("division by zero"));
    }
    Ok(Value::Integer(a.wrapping_rem(b)))
}

pub fn register(gc: &mut Gc, env: EnvRef) {
    use super::define_fn;
    define_fn(gc, env, "+", Arity::AtLeast(0), add);
    define_fn(gc, env, "-", Arity::AtLeast(1), sub);
    define_fn(gc, env, "*", Arity::AtLeast(0), mul);
    define_fn(gc, env, "div", Arity::Exact(2), div);
    define_fn(gc, env, "mod", Arity::Exact(2), rem);
}
