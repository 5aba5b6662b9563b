// ABOUTME: Environment module for managing variable bindings and scopes
//! Environment frames: a chain of small binding lists, extended on every
//! lambda application and walked on every variable lookup. Storage lives
//! in the `Gc` arena (`Frame`/`Binding`, see `gc.rs`) rather than behind
//! `Rc`, so a closure capturing an environment and an environment binding
//! that closure can form a cycle the collector still reclaims.

use crate::error::EvalError;
use crate::gc::{Binding, EnvRef, Gc};
use crate::value::Value;

/// Create a new frame extending `parent`.
pub fn extend(gc: &mut Gc, parent: EnvRef) -> EnvRef {
    gc.alloc_env(Some(parent))
}

/// Bind `name` to `value` in `env` itself — never walks to a parent frame,
/// matching `env_define` in the reference interpreter: a second `define`
/// of the same name in the same frame overwrites the first.
pub fn define(gc: &mut Gc, env: EnvRef, name: &str, value: Value) {
    let frame = gc.frame_mut(env);
    let mut cur = frame.bindings.as_deref_mut();
    while let Some(b) = cur {
        if b.name == name {
            b.value = value;
            return;
        }
        cur = b.next.as_deref_mut();
    }
    let frame = gc.frame_mut(env);
    let next = frame.bindings.take();
    frame.bindings = Some(Box::new(Binding {
        name: name.to_string(),
        value,
        next,
    }));
}

/// Look up `name`, walking the parent chain.
pub fn get(gc: &Gc, env: EnvRef, name: &str) -> Result<Value, EvalError> {
    let mut current = Some(env);
    while let Some(e) = current {
        let frame = gc.frame(e);
        let mut cur = frame.bindings.as_deref();
        while let Some(b) = cur {
            if b.name == name {
                return Ok(b.value);
            }
            cur = b.next.as_deref();
        }
        current = frame.parent;
    }
    Err(EvalError::UnboundVariable {
        name: name.to_string(),
    })
}

/// Rebind `name` in place, walking the parent chain to find where it was
/// defined. Errors if the name is unbound anywhere in the chain.
pub fn set(gc: &mut Gc, env: EnvRef, name: &str, value: Value) -> Result<(), EvalError> {
    let mut current = Some(env);
    while let Some(e) = current {
        let frame = gc.frame_mut(e);
        let mut cur = frame.bindings.as_deref_mut();
        while let Some(b) = cur {
            if b.name == name {
                b.value = value;
                return Ok(());
            }
            cur = b.next.as_deref_mut();
        }
        current = gc.frame(e).parent;
    }
    Err(EvalError::UnboundVariable {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::Gc;

    fn fresh() -> (Gc, EnvRef) {
        let mut gc = Gc::new();
        let top = gc.alloc_env(None);
        gc.set_top_level(top);
        (gc, top)
    }

    #[test]
    fn define_then_get() {
        let (mut gc, top) = fresh();
        define(&mut gc, top, "x", Value::Integer(42));
        assert_eq!(get(&gc, top, "x"), Ok(Value::Integer(42)));
    }

    #[test]
    fn unbound_is_an_error() {
        let (gc, top) = fresh();
        assert!(get(&gc, top, "nope").is_err());
    }

    #[test]
    fn redefine_overwrites_in_same_frame() {
        let (mut gc, top) = fresh();
        define(&mut gc, top, "x", Value::Integer(1));
        define(&mut gc, top, "x", Value::Integer(2));
        assert_eq!(get(&gc, top, "x"), Ok(Value::Integer(2)));
    }

    #[test]
    fn child_frame_shadows_parent() {
        let (mut gc, top) = fresh();
        define(&mut gc, top, "x", Value::Integer(1));
        let child = extend(&mut gc, top);
        define(&mut gc, child, "x", Value::Integer(2));
        assert_eq!(get(&gc, child, "x"), Ok(Value::Integer(2)));
        assert_eq!(get(&gc, top, "x"), Ok(Value::Integer(1)));
    }

    #[test]
    fn set_walks_to_defining_frame() {
        let (mut gc, top) = fresh();
        define(&mut gc, top, "x", Value::Integer(1));
        let child = extend(&mut gc, top);
        set(&mut gc, child, "x", Value::Integer(9)).unwrap();
        assert_eq!(get(&gc, top, "x"), Ok(Value::Integer(9)));
    }

    #[test]
    fn set_unbound_is_an_error() {
        let (mut gc, top) = fresh();
        assert!(set(&mut gc, top, "nope", Value::Integer(1)).is_err());
    }
}
