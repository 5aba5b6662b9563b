//! Primitive procedures, organized into small per-category modules and
//! registered into the top-level environment on startup.
//!
//! - [`predicates`]: number?, pair?, vector?, symbol?, string?, procedure?
//! - [`arithmetic`]: +, -, *, div, mod
//! - [`comparison`]: >, =, eq?
//! - [`pairs`]: cons, car, cdr
//! - [`vectors`]: make-vector, vector-length, vector-ref, vector-set!
//! - [`reflection`]: eval, expand, about

use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

pub mod arithmetic;
pub mod comparison;
pub mod pairs;
pub mod predicates;
pub mod reflection;
pub mod vectors;

/// Define a primitive procedure named `name` in `env`.
pub(crate) fn define_fn(
    gc: &mut Gc,
    env: EnvRef,
    name: &'static str,
    arity: Arity,
    func: fn(&mut Gc, &[Value]) -> Result<Value, crate::error::EvalError>,
) {
    let obj = gc.alloc_value(HeapObject::Function { name, arity, func });
    crate::env::define(gc, env, name, Value::Object(obj));
}

pub fn register_all(gc: &mut Gc, env: EnvRef) {
    predicates::register(gc, env);
    arithmetic::register(gc, env);
    comparison::register(gc, env);
    pairs::register(gc, env);
    vectors::register(gc, env);
    reflection::register(gc, env);
}
