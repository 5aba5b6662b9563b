//! eval, expand, about — the only primitives that call back into the
//! interpreter itself rather than operating purely on their arguments.

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::expander::expand as expand_form;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

/// `(eval expr)` — expand and evaluate `expr` in the top-level
/// environment. Runs its own non-tracing sub-evaluation regardless of
/// whether the outer session was started with `-d`, matching the
/// reference primitive's use of the global environment rather than the
/// caller's lexical environment.
fn eval_primitive(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    let top = gc.top_level();
    let expanded = expand_form(gc, args[0])?;
    Evaluator::new(false).eval(gc, expanded, top)
}

/// `(expand expr)` — run the expander and return the kernel form, without
/// evaluating it. Exposes the expander as a first-class reflection tool.
fn expand_primitive(gc: &mut Gc, args: &[Value]) -> Result<Value, EvalError> {
    expand_form(gc, args[0])
}

/// `(about)` — a fixed greeting naming the interpreter.
fn about(gc: &mut Gc, _args: &[Value]) -> Result<Value, EvalError> {
    let text = format!("{} {} — a small Scheme", crate::config::NAME, crate::config::VERSION);
    Ok(Value::Object(gc.alloc_value(HeapObject::String(text))))
}

pub fn register(gc: &mut Gc, env: EnvRef) {
    use super::define_fn;
    define_fn(gc, env, "eval", Arity::Exact(1), eval_primitive);
    define_fn(gc, env, "expand", Arity::Exact(1), expand_primitive);
    define_fn(gc, env, "about", Arity::Exact(0), about);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;

    #[test]
    fn eval_primitive_runs_a_quoted_form() {
        let mut gc = Gc::new();
        let top = gc.alloc_env(None);
        gc.set_top_level(top);
        crate::builtins::register_all(&mut gc, top);
        let form = Reader::new("(+ 1 2)").read(&mut gc).unwrap().unwrap();
        assert_eq!(eval_primitive(&mut gc, &[form]), Ok(Value::Integer(3)));
    }

    #[test]
    fn about_mentions_the_interpreter_name() {
        let mut gc = Gc::new();
        let v = about(&mut gc, &[]).unwrap();
        match v.object(&gc) {
            Some(HeapObject::String(s)) => assert!(s.contains(crate::config::NAME)),
            _ => panic!("expected string"),
        }
    }
}
