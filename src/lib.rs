// ABOUTME: Library module exposing internal components for testing
//! Library surface, exposed so integration tests under `tests/` can drive
//! the interpreter the same way `main.rs` does.

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod expander;
pub mod gc;
pub mod reader;
pub mod value;

use error::EvalError;
use eval::Evaluator;
use gc::{EnvRef, Gc};
use value::Value;

/// Owns the GC arenas and the top-level environment. One `Interpreter`
/// per process, but the type itself carries no global state, so nothing
/// stops a caller from running more than one.
pub struct Interpreter {
    pub gc: Gc,
    pub top_level: EnvRef,
    pub evaluator: Evaluator,
}

impl Interpreter {
    pub fn new(debug: bool) -> Self {
        let mut gc = Gc::new();
        let top_level = gc.alloc_env(None);
        gc.set_top_level(top_level);
        builtins::register_all(&mut gc, top_level);
        Interpreter {
            gc,
            top_level,
            evaluator: Evaluator::new(debug),
        }
    }

    pub fn load_stdlib(&mut self) -> Result<(), EvalError> {
        self.eval_source(config::STDLIB_SOURCE).map(|_| ())
    }

    /// Read, expand and evaluate every top-level form in `source`,
    /// running one collection after each form, and return the value of
    /// the last one.
    pub fn eval_source(&mut self, source: &str) -> Result<Value, EvalError> {
        reader::check_fatal_bytes(source)?;
        let mut reader = reader::Reader::new(source);
        let mut result = Value::Undefined;
        loop {
            let form = match reader.read(&mut self.gc)? {
                Some(form) => form,
                None => break,
            };
            let expanded = expander::expand(&mut self.gc, form)?;
            result = self.evaluator.eval(&mut self.gc, expanded, self.top_level)?;
            self.gc.collect();
        }
        Ok(result)
    }
}
