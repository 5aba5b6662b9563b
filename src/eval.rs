// ABOUTME: Evaluator module for executing expanded Scheme expressions
//! Tail-call preserving evaluator: a tree-walker driven by an explicit
//! loop that rebinds `expr`/`env` in tail position instead of recursing
//! through the host call stack, so `if`, `begin` and tail application
//! never grow Rust's stack. Grounded in the later, TCO-shaped draft of
//! the reference evaluator; the earlier draft (which also inlines
//! `cond`/`and`/`or`/quasiquote handling directly into `eval`) is
//! superseded by the separate expander pass in `expander.rs`.

use crate::env;
use crate::error::EvalError;
use crate::gc::{EnvRef, Gc};
use crate::value::{Arity, HeapObject, Value};

pub struct Evaluator {
    pub debug: bool,
}

impl Evaluator {
    pub fn new(debug: bool) -> Self {
        Evaluator { debug }
    }

    pub fn eval(&self, gc: &mut Gc, mut expr: Value, mut envr: EnvRef) -> Result<Value, EvalError> {
        loop {
            if self.debug {
                eprintln!("eval: {}", expr.stringify(gc));
            }
            if is_self_eval(gc, expr) {
                return Ok(expr);
            }
            if let Some(name) = expr.as_symbol(gc) {
                return env::get(gc, envr, &name.to_string());
            }
            let head = match expr.car(gc) {
                Some(h) => h,
                None => return Err(EvalError::syntax("cannot evaluate ()")),
            };
            let tag = head.as_symbol(gc).map(|s| s.to_string());
            match tag.as_deref() {
                Some("quote") => return Ok(expr.nth(gc, 1).unwrap()),
                Some("set!") => {
                    let name = expr.nth(gc, 1).unwrap();
                    let name = name
                        .as_symbol(gc)
                        .ok_or_else(|| EvalError::syntax("set! requires a symbol"))?
                        .to_string();
                    let value = self.eval(gc, expr.nth(gc, 2).unwrap(), envr)?;
                    env::set(gc, envr, &name, value)?;
                    return Ok(value);
                }
                Some("define") => {
                    let name = expr.nth(gc, 1).unwrap();
                    let name = name
                        .as_symbol(gc)
                        .ok_or_else(|| EvalError::syntax("define requires a symbol"))?
                        .to_string();
                    let value = self.eval(gc, expr.nth(gc, 2).unwrap(), envr)?;
                    if let Some(r) = value.gc_ref() {
                        if let HeapObject::Closure { name: closure_name, .. } = gc.get_mut(r) {
                            if closure_name.is_none() {
                                *closure_name = Some(name.clone());
                            }
                        }
                    }
                    env::define(gc, envr, &name, value);
                    return Ok(value);
                }
                Some("if") => {
                    let test = self.eval(gc, expr.nth(gc, 1).unwrap(), envr)?;
                    expr = if test.is_truthy() {
                        expr.nth(gc, 2).unwrap()
                    } else {
                        expr.nth(gc, 3).unwrap()
                    };
                    continue;
                }
                Some("lambda") => {
                    let params = expr.nth(gc, 1).unwrap();
                    let body = expr.cdr(gc).unwrap().cdr(gc).unwrap();
                    return Ok(Value::Object(gc.alloc_value(HeapObject::Closure {
                        name: None,
                        params,
                        body,
                        env: envr,
                    })));
                }
                Some("begin") => {
                    let mut forms = expr.cdr(gc).unwrap();
                    if forms.is_nil() {
                        return Ok(Value::Undefined);
                    }
                    while !forms.cdr(gc).unwrap().is_nil() {
                        self.eval(gc, forms.car(gc).unwrap(), envr)?;
                        forms = forms.cdr(gc).unwrap();
                    }
                    expr = forms.car(gc).unwrap();
                    continue;
                }
                Some("%or") => {
                    let mut tests = expr.cdr(gc).unwrap();
                    let mut result = Value::Bool(false);
                    while let Some(first) = tests.car(gc) {
                        result = self.eval(gc, first, envr)?;
                        if result.is_truthy() {
                            return Ok(result);
                        }
                        tests = tests.cdr(gc).unwrap();
                    }
                    return Ok(result);
                }
                _ => {
                    let fn_value = self.eval(gc, head, envr)?;
                    let mut args = Vec::new();
                    let mut rest = expr.cdr(gc).unwrap();
                    while let Some(a) = rest.car(gc) {
                        args.push(self.eval(gc, a, envr)?);
                        rest = rest.cdr(gc).unwrap();
                    }
                    match fn_value.object(gc) {
                        Some(HeapObject::Function { name, arity, func }) => {
                            check_arity(name, *arity, args.len())?;
                            let func = *func;
                            return func(gc, &args);
                        }
                        Some(HeapObject::Closure {
                            params, body, env, ..
                        }) => {
                            let params = *params;
                            let body = *body;
                            let closure_env = *env;
                            let new_env = extend_env(gc, params, &args, closure_env)?;
                            if body.is_nil() {
                                return Ok(Value::Undefined);
                            }
                            let mut forms = body;
                            while !forms.cdr(gc).unwrap().is_nil() {
                                self.eval(gc, forms.car(gc).unwrap(), new_env)?;
                                forms = forms.cdr(gc).unwrap();
                            }
                            expr = forms.car(gc).unwrap();
                            envr = new_env;
                            continue;
                        }
                        _ => return Err(EvalError::type_error("attempt to call a non-procedure")),
                    }
                }
            }
        }
    }
}

fn is_self_eval(gc: &Gc, v: Value) -> bool {
    match v {
        Value::Integer(_) | Value::Bool(_) | Value::Character(_) | Value::Nil | Value::Undefined => {
            true
        }
        Value::Object(_) => matches!(
            v.object(gc),
            Some(HeapObject::String(_))
                | Some(HeapObject::Vector(_))
                | Some(HeapObject::Bytevector(_))
                | Some(HeapObject::Function { .. })
                | Some(HeapObject::Closure { .. })
        ),
    }
}

fn check_arity(name: &str, arity: Arity, actual: usize) -> Result<(), EvalError> {
    if arity.accepts(actual) {
        return Ok(());
    }
    let expected = match arity {
        Arity::Exact(n) => format!("exactly {n}"),
        Arity::AtLeast(n) => format!("at least {n}"),
        Arity::Range(lo, hi) => format!("between {lo} and {hi}"),
    };
    Err(EvalError::arity(name.to_string(), expected, actual))
}

/// Walk `params` and `args` in lockstep, binding each symbol parameter to
/// the corresponding argument. A trailing symbol (instead of `()`) is a
/// rest parameter and collects the remaining arguments as a list.
/// Non-symbol entries in an already-expanded parameter list should never
/// occur (the expander rejects them), but the binder still ignores rather
/// than panics on one, matching the reference `extend_env`.
fn extend_env(gc: &mut Gc, params: Value, args: &[Value], parent: EnvRef) -> Result<EnvRef, EvalError> {
    let new_env = env::extend(gc, parent);
    let mut params = params;
    let mut i = 0;
    loop {
        if params.is_nil() {
            if i != args.len() {
                return Err(EvalError::arity("#<procedure>".to_string(), "fewer arguments".to_string(), args.len()));
            }
            return Ok(new_env);
        }
        if let Some(name) = params.as_symbol(gc).map(|n| n.to_string()) {
            let rest = args[i..].to_vec();
            let rest_list = list_of(gc, &rest);
            env::define(gc, new_env, &name, rest_list);
            return Ok(new_env);
        }
        match params.object(gc) {
            Some(HeapObject::Pair(head, tail)) => {
                if i >= args.len() {
                    return Err(EvalError::arity("#<procedure>".to_string(), "more arguments".to_string(), args.len()));
                }
                let next_params = *tail;
                if let Some(name) = head.as_symbol(gc).map(|n| n.to_string()) {
                    env::define(gc, new_env, &name, args[i]);
                }
                params = next_params;
                i += 1;
            }
            _ => return Ok(new_env),
        }
    }
}

fn list_of(gc: &mut Gc, items: &[Value]) -> Value {
    let mut out = Value::Nil;
    for item in items.iter().rev() {
        out = Value::Object(gc.alloc_value(HeapObject::Pair(*item, out)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expander::expand;
    use crate::reader::Reader;

    fn run(src: &str) -> (Value, Gc) {
        let mut gc = Gc::new();
        let top = gc.alloc_env(None);
        gc.set_top_level(top);
        crate::builtins::register_all(&mut gc, top);
        let forms = crate::reader::read_all(src, &mut gc).unwrap();
        let eval = Evaluator::new(false);
        let mut result = Value::Undefined;
        for form in forms {
            let expanded = expand(&mut gc, form).unwrap();
            result = eval.eval(&mut gc, expanded, top).unwrap();
        }
        (result, gc)
    }

    #[test]
    fn self_evaluating_literals() {
        let (v, _) = run("42");
        assert_eq!(v, Value::Integer(42));
    }

    #[test]
    fn arithmetic() {
        let (v, _) = run("(+ 1 2 3)");
        assert_eq!(v, Value::Integer(6));
    }

    #[test]
    fn factorial_via_named_define() {
        let (v, _) = run(
            "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 5)",
        );
        assert_eq!(v, Value::Integer(120));
    }

    #[test]
    fn set_mutates_binding() {
        let (v, _) = run("(define x 1) (set! x (+ x 10)) x");
        assert_eq!(v, Value::Integer(11));
    }

    #[test]
    fn cond_picks_first_true_clause() {
        let (v, gc) = run("(cond (#f 'a) (#t 'b) (else 'c))");
        assert!(v.symbol_eq(&gc, "b"));
    }

    #[test]
    fn variadic_lambda_collects_rest_args() {
        let (v, gc) = run("((lambda args args) 1 2 3)");
        assert_eq!(v.to_vec(&gc), vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    }

    #[test]
    fn quasiquote_splices_list() {
        let (v, gc) = run("(define xs (list 2 3 4)) `(1 ,@xs 5)");
        assert_eq!(
            v.to_vec(&gc),
            vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3),
                Value::Integer(4),
                Value::Integer(5)
            ]
        );
    }

    #[test]
    fn tail_calls_do_not_grow_the_stack() {
        let (v, _) = run(
            "(define (loop n acc) (if (= n 0) acc (loop (- n 1) (+ acc 1)))) (loop 1000000 0)",
        );
        assert_eq!(v, Value::Integer(1000000));
    }

    #[test]
    fn lexical_scope_is_respected() {
        let (v, _) = run(
            "(define (make-adder n) (lambda (x) (+ x n))) (define add5 (make-adder 5)) (add5 10)",
        );
        assert_eq!(v, Value::Integer(15));
    }

    #[test]
    fn define_attaches_a_display_name_to_a_nameless_closure() {
        let (v, gc) = run("(define sq (lambda (x) (* x x))) sq");
        assert_eq!(format!("{}", v.stringify(&gc)), "#<procedure:sq>");
    }

    #[test]
    fn define_function_sugar_names_the_closure_too() {
        let (v, gc) = run("(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) fact");
        assert_eq!(format!("{}", v.stringify(&gc)), "#<procedure:fact>");
    }

    #[test]
    fn improper_list_argument_is_an_arity_error() {
        let mut gc = Gc::new();
        let top = gc.alloc_env(None);
        gc.set_top_level(top);
        crate::builtins::register_all(&mut gc, top);
        let form = crate::reader::read_all("(+ . 1)", &mut gc).unwrap().remove(0);
        let expanded = crate::expander::expand(&mut gc, form).unwrap();
        let eval = Evaluator::new(false);
        assert!(eval.eval(&mut gc, expanded, top).is_err());
    }
}
