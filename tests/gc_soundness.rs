//! Allocation counters should return to baseline once garbage becomes
//! unreachable and a collection runs — including through reference
//! cycles the old `Rc`-based model could never reclaim: a closure
//! captured by an environment that the closure itself is reachable from.

use yoshi::Interpreter;

#[test]
fn dropped_list_is_reclaimed_after_collection() {
    let mut interp = Interpreter::new(false);
    interp.load_stdlib().unwrap();
    let baseline = interp.gc.live_value_count();

    interp.eval_source("(define tmp (list 1 2 3 4 5))").unwrap();
    assert!(interp.gc.live_value_count() > baseline);

    interp.eval_source("(set! tmp 0)").unwrap();
    assert_eq!(interp.gc.live_value_count(), baseline);
}

#[test]
fn closure_captured_by_its_own_environment_is_still_collected() {
    // `self-ref` closes over `env`, and `env` (via the `self-ref`
    // binding) points right back at the closure: a genuine cycle.
    let mut interp = Interpreter::new(false);
    interp.load_stdlib().unwrap();
    let baseline_envs = interp.gc.live_env_count();

    interp
        .eval_source(
            "(define (make-cycle) \
               (define self-ref (lambda () self-ref)) \
               self-ref) \
             (define looped (make-cycle))",
        )
        .unwrap();
    assert!(interp.gc.live_env_count() > baseline_envs);

    interp.eval_source("(set! looped 0)").unwrap();
    assert_eq!(interp.gc.live_env_count(), baseline_envs);
}

#[test]
fn repeated_allocation_and_collection_does_not_leak() {
    let mut interp = Interpreter::new(false);
    interp.load_stdlib().unwrap();
    let baseline = interp.gc.live_value_count();

    for _ in 0..200 {
        interp
            .eval_source("(define scratch (map (lambda (x) (* x 2)) (list 1 2 3 4 5)))")
            .unwrap();
    }
    interp.eval_source("(set! scratch 0)").unwrap();
    assert_eq!(interp.gc.live_value_count(), baseline);
}

#[test]
fn values_reachable_only_through_a_closures_environment_survive() {
    let mut interp = Interpreter::new(false);
    interp.load_stdlib().unwrap();

    let v = interp
        .eval_source(
            "(define (make-adder n) (lambda (x) (+ x n))) \
             (define add5 (make-adder 5)) \
             (add5 1)",
        )
        .unwrap();
    assert_eq!(v, yoshi::value::Value::Integer(6));

    // forcing a collection must not disturb `add5`'s captured `n`.
    interp.gc.collect();
    let v = interp.eval_source("(add5 2)").unwrap();
    assert_eq!(v, yoshi::value::Value::Integer(7));
}
