//! End-to-end scenarios run as a fresh interpreter session loaded only
//! with the startup library, the same way a script file is evaluated.

use yoshi::Interpreter;
use yoshi::value::Value;

fn session() -> Interpreter {
    let mut interp = Interpreter::new(false);
    interp.load_stdlib().expect("startup library must load");
    interp
}

#[test]
fn factorial_recurses_to_the_expected_result() {
    let mut interp = session();
    let v = interp
        .eval_source("(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 10)")
        .unwrap();
    assert_eq!(v, Value::Integer(3628800));
}

#[test]
fn map_and_filter_compose_over_a_list() {
    let mut interp = session();
    let v = interp
        .eval_source("(map (lambda (x) (* x x)) (filter (lambda (x) (> x 2)) (list 1 2 3 4 5)))")
        .unwrap();
    assert_eq!(
        v.to_vec(&interp.gc),
        vec![Value::Integer(9), Value::Integer(16), Value::Integer(25)]
    );
}

#[test]
fn closures_capture_their_defining_environment() {
    let mut interp = session();
    let v = interp
        .eval_source(
            "(define (make-adder n) (lambda (x) (+ x n))) \
             (define add10 (make-adder 10)) \
             (add10 5)",
        )
        .unwrap();
    assert_eq!(v, Value::Integer(15));
}

#[test]
fn quote_identity_preserves_structure_without_evaluating() {
    let mut interp = session();
    let v = interp.eval_source("'(+ 1 2)").unwrap();
    assert!(v.is_pair(&interp.gc));
    assert_eq!(v.list_length(&interp.gc), Some(3));
}

#[test]
fn tail_recursive_loop_runs_without_overflowing_the_stack() {
    let mut interp = session();
    let v = interp
        .eval_source(
            "(define (count-down n) (if (= n 0) 'done (count-down (- n 1)))) \
             (count-down 500000)",
        )
        .unwrap();
    assert!(v.symbol_eq(&interp.gc, "done"));
}

#[test]
fn reduce_sums_a_list_via_the_startup_library() {
    let mut interp = session();
    let v = interp
        .eval_source("(reduce + 0 (list 1 2 3 4 5))")
        .unwrap();
    assert_eq!(v, Value::Integer(15));
}

#[test]
fn quasiquote_mixes_literal_and_spliced_structure() {
    let mut interp = session();
    let v = interp
        .eval_source("(define mid (list 2 3)) `(1 ,@mid ,(+ 2 2))")
        .unwrap();
    assert_eq!(
        v.to_vec(&interp.gc),
        vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4)
        ]
    );
}

#[test]
fn or_short_circuits_and_returns_the_first_truthy_value() {
    let mut interp = session();
    let v = interp.eval_source("(or #f #f 7 (/ 1 0))").unwrap();
    assert_eq!(v, Value::Integer(7));
}

#[test]
fn unbound_variable_is_a_recoverable_error_not_a_panic() {
    let mut interp = session();
    let err = interp.eval_source("totally-unbound-name").unwrap_err();
    assert!(format!("{err}").contains("totally-unbound-name"));
}

#[test]
fn eval_primitive_runs_a_form_built_by_the_program_itself() {
    let mut interp = session();
    let v = interp
        .eval_source("(eval (list '+ 1 2 3))")
        .unwrap();
    assert_eq!(v, Value::Integer(6));
}
