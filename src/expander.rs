// ABOUTME: Expander module for rewriting surface syntax into kernel forms
//! Pure syntactic rewriting: turns source syntax into the kernel forms the
//! evaluator actually understands (`quote`, `set!`, `define`, `if`,
//! `lambda`, `begin`, application). `cond`, `and`, `or` and `quasiquote`
//! are lowered here rather than given their own evaluator cases. Grounded
//! in the tag-dispatch structure of the reference expander, which is the
//! later of two drafts in the original source — the earlier draft folds
//! this logic into the evaluator itself and is not followed here.

use crate::error::EvalError;
use crate::gc::Gc;
use crate::value::{HeapObject, Value};

pub fn expand(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    if !exp.is_pair(gc) {
        return Ok(exp);
    }
    let head = exp.car(gc).unwrap();
    if let Some(tag) = head.as_symbol(gc).map(|s| s.to_string()) {
        match tag.as_str() {
            "quote" => return expand_quote(gc, exp),
            "set!" => return expand_set(gc, exp),
            "define" => return expand_define(gc, exp),
            "if" => return expand_if(gc, exp),
            "lambda" => return expand_lambda(gc, exp),
            "begin" => return expand_begin(gc, exp),
            "cond" => return expand_cond(gc, exp),
            "and" => return expand_and(gc, exp),
            "or" => return expand_or(gc, exp),
            "quasiquote" => return expand_quasiquote(gc, exp),
            _ => {}
        }
    }
    expand_list_map(gc, exp)
}

/// Expand every element of a (possibly improper) list, rebuilding it.
fn expand_list_map(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    if exp.is_nil() {
        return Ok(exp);
    }
    let HeapObject::Pair(head, tail) = *exp.object(gc).ok_or_else(|| {
        EvalError::syntax("expected a list")
    })? else {
        return expand(gc, exp);
    };
    let head = expand(gc, head)?;
    let tail = expand_list_map(gc, tail)?;
    Ok(Value::Object(gc.alloc_value(HeapObject::Pair(head, tail))))
}

fn list_of(gc: &mut Gc, items: &[Value]) -> Value {
    let mut out = Value::Nil;
    for item in items.iter().rev() {
        out = Value::Object(gc.alloc_value(HeapObject::Pair(*item, out)));
    }
    out
}

fn symbol(gc: &mut Gc, name: &str) -> Value {
    Value::Object(gc.alloc_value(HeapObject::Symbol(name.to_string())))
}

fn require_arity(gc: &Gc, exp: Value, form: &str, n: usize) -> Result<(), EvalError> {
    match exp.list_length(gc) {
        Some(len) if len == n => Ok(()),
        _ => Err(EvalError::syntax(format!("bad syntax in {form}"))),
    }
}

fn require_arity_at_least(gc: &Gc, exp: Value, form: &str, n: usize) -> Result<(), EvalError> {
    match exp.list_length(gc) {
        Some(len) if len >= n => Ok(()),
        _ => Err(EvalError::syntax(format!("bad syntax in {form}"))),
    }
}

fn expand_quote(gc: &Gc, exp: Value) -> Result<Value, EvalError> {
    require_arity(gc, exp, "quote", 2)?;
    Ok(exp)
}

fn expand_set(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    require_arity(gc, exp, "set!", 3)?;
    let var = exp.nth(gc, 1).unwrap();
    if !var.is_symbol(gc) {
        return Err(EvalError::syntax("set! requires a symbol target"));
    }
    let value = expand(gc, exp.nth(gc, 2).unwrap())?;
    let tag = symbol(gc, "set!");
    Ok(list_of(gc, &[tag, var, value]))
}

fn proper_params_or_rest(gc: &Gc, params: Value) -> bool {
    let mut cur = params;
    loop {
        if cur.is_nil() {
            return true;
        }
        if cur.is_symbol(gc) {
            return true;
        }
        match cur.object(gc) {
            Some(HeapObject::Pair(head, tail)) => {
                if !head.is_symbol(gc) {
                    return false;
                }
                cur = *tail;
            }
            _ => return false,
        }
    }
}

fn expand_define(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    require_arity_at_least(gc, exp, "define", 3)?;
    let target = exp.nth(gc, 1).unwrap();
    if target.is_symbol(gc) {
        require_arity(gc, exp, "define", 3)?;
        let value = expand(gc, exp.nth(gc, 2).unwrap())?;
        let tag = symbol(gc, "define");
        return Ok(list_of(gc, &[tag, target, value]));
    }
    if target.is_pair(gc) {
        let name = target.car(gc).unwrap();
        if !name.is_symbol(gc) {
            return Err(EvalError::syntax("bad syntax in define"));
        }
        let params = target.cdr(gc).unwrap();
        if !proper_params_or_rest(gc, params) {
            return Err(EvalError::syntax("bad syntax in define: non-symbol parameter"));
        }
        let body = exp.cdr(gc).unwrap().cdr(gc).unwrap();
        let lambda_tag = symbol(gc, "lambda");
        let params_body = Value::Object(gc.alloc_value(HeapObject::Pair(params, body)));
        let lambda = Value::Object(gc.alloc_value(HeapObject::Pair(
            lambda_tag,
            params_body,
        )));
        let define_tag = symbol(gc, "define");
        let rewritten = list_of(gc, &[define_tag, name, lambda]);
        return expand_define(gc, rewritten);
    }
    Err(EvalError::syntax("bad syntax in define"))
}

fn expand_if(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    let len = exp
        .list_length(gc)
        .ok_or_else(|| EvalError::syntax("bad syntax in if"))?;
    let tag = symbol(gc, "if");
    if len == 3 {
        let test = expand(gc, exp.nth(gc, 1).unwrap())?;
        let then = expand(gc, exp.nth(gc, 2).unwrap())?;
        Ok(list_of(gc, &[tag, test, then, Value::Undefined]))
    } else if len == 4 {
        let test = expand(gc, exp.nth(gc, 1).unwrap())?;
        let then = expand(gc, exp.nth(gc, 2).unwrap())?;
        let alt = expand(gc, exp.nth(gc, 3).unwrap())?;
        Ok(list_of(gc, &[tag, test, then, alt]))
    } else {
        Err(EvalError::syntax("bad syntax in if"))
    }
}

fn expand_lambda(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    let len = exp
        .list_length(gc)
        .ok_or_else(|| EvalError::syntax("bad syntax in lambda"))?;
    if len < 3 {
        return Err(EvalError::syntax("bad syntax in lambda"));
    }
    let params = exp.nth(gc, 1).unwrap();
    if !proper_params_or_rest(gc, params) {
        return Err(EvalError::syntax("bad syntax in lambda: non-symbol parameter"));
    }
    let tag = symbol(gc, "lambda");
    if len > 3 {
        let body_forms = exp.cdr(gc).unwrap().cdr(gc).unwrap();
        let begin_tag = symbol(gc, "begin");
        let begin = Value::Object(gc.alloc_value(HeapObject::Pair(begin_tag, body_forms)));
        let expanded_begin = expand_begin(gc, begin)?;
        Ok(list_of(gc, &[tag, params, expanded_begin]))
    } else {
        let body = expand(gc, exp.nth(gc, 2).unwrap())?;
        Ok(list_of(gc, &[tag, params, body]))
    }
}

fn expand_begin(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    require_arity_at_least(gc, exp, "begin", 2)?;
    let forms: Vec<Value> = exp
        .cdr(gc)
        .unwrap()
        .to_vec(gc)
        .into_iter()
        .map(|f| expand(gc, f))
        .collect::<Result<_, _>>()?;
    let tag = symbol(gc, "begin");
    let mut out = vec![tag];
    out.extend(forms);
    Ok(list_of(gc, &out))
}

fn expand_cond(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    let clauses = exp.cdr(gc).unwrap().to_vec(gc);
    expand_cond_clauses(gc, &clauses)
}

fn expand_cond_clauses(gc: &mut Gc, clauses: &[Value]) -> Result<Value, EvalError> {
    let Some((clause, rest)) = clauses.split_first() else {
        return Ok(Value::Undefined);
    };
    if clause.list_length(gc) != Some(2) {
        return Err(EvalError::syntax("bad clause in cond"));
    }
    let test = clause.car(gc).unwrap();
    let result = clause.nth(gc, 1).unwrap();
    let test = if test.symbol_eq(gc, "else") {
        Value::Bool(true)
    } else {
        expand(gc, test)?
    };
    let result = expand(gc, result)?;
    let alt = expand_cond_clauses(gc, rest)?;
    let tag = symbol(gc, "if");
    Ok(list_of(gc, &[tag, test, result, alt]))
}

fn expand_and(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    let tests = exp.cdr(gc).unwrap().to_vec(gc);
    expand_and_tests(gc, &tests)
}

fn expand_and_tests(gc: &mut Gc, tests: &[Value]) -> Result<Value, EvalError> {
    match tests {
        [] => Ok(Value::Bool(true)),
        [only] => expand(gc, *only),
        [first, rest @ ..] => {
            let first = expand(gc, *first)?;
            let tag = symbol(gc, "if");
            let rest_expanded = expand_and_tests(gc, rest)?;
            Ok(list_of(gc, &[tag, first, rest_expanded, Value::Bool(false)]))
        }
    }
}

/// `or` is expanded to a kernel node the evaluator recognizes directly
/// rather than a nested `if` chain, so `e1` is evaluated exactly once
/// instead of twice (`(if e1 e1 ...)` would re-evaluate a truthy `e1`).
fn expand_or(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    let tests: Vec<Value> = exp
        .cdr(gc)
        .unwrap()
        .to_vec(gc)
        .into_iter()
        .map(|t| expand(gc, t))
        .collect::<Result<_, _>>()?;
    let tag = symbol(gc, "%or");
    let mut out = vec![tag];
    out.extend(tests);
    Ok(list_of(gc, &out))
}

/// Quasiquote template expansion, depth-tracked from 0. `unquote` at
/// depth 0 splices the raw expression in; everything else recurses one
/// level deeper, wrapped so a further `quasiquote`/`unquote` can still
/// find it.
fn expand_quasiquote(gc: &mut Gc, exp: Value) -> Result<Value, EvalError> {
    require_arity(gc, exp, "quasiquote", 2)?;
    let template = exp.nth(gc, 1).unwrap();
    expand_qq_template(gc, template, 0)
}

fn expand_qq_template(gc: &mut Gc, template: Value, depth: usize) -> Result<Value, EvalError> {
    if !template.is_pair(gc) {
        return quote_if_needed(gc, template);
    }
    let head = template.car(gc).unwrap();
    if depth == 0 && head.symbol_eq(gc, "unquote-splicing") {
        return Err(EvalError::syntax(
            "unquote-splicing is not valid outside a list",
        ));
    }
    if head.symbol_eq(gc, "unquote") {
        if template.list_length(gc) != Some(2) {
            return Err(EvalError::syntax("bad syntax in unquote"));
        }
        let inner = template.nth(gc, 1).unwrap();
        return if depth == 0 {
            expand(gc, inner)
        } else {
            let wrapped = expand_qq_template(gc, inner, depth - 1)?;
            let unquote_sym = symbol(gc, "unquote");
            let quoted = quote(gc, unquote_sym);
            wrap_call(gc, "list", &[quoted, wrapped])
        };
    }
    if head.symbol_eq(gc, "quasiquote") {
        if template.list_length(gc) != Some(2) {
            return Err(EvalError::syntax("bad syntax in quasiquote"));
        }
        let inner = template.nth(gc, 1).unwrap();
        let expanded = expand_qq_template(gc, inner, depth + 1)?;
        let quasiquote_sym = symbol(gc, "quasiquote");
        let quoted = quote(gc, quasiquote_sym);
        return wrap_call(gc, "list", &[quoted, expanded]);
    }
    let tail = template.cdr(gc).unwrap();
    if depth == 0 && head.is_pair(gc) {
        if let Some(inner_head) = head.car(gc) {
            if inner_head.symbol_eq(gc, "unquote-splicing") {
                if head.list_length(gc) != Some(2) {
                    return Err(EvalError::syntax("bad syntax in unquote-splicing"));
                }
                let spliced = head.nth(gc, 1).unwrap();
                let rest = expand_qq_template(gc, tail, depth)?;
                let spliced = expand(gc, spliced)?;
                return wrap_call(gc, "append", &[spliced, rest]);
            }
        }
    }
    let car_expanded = expand_qq_template(gc, head, depth)?;
    let cdr_expanded = expand_qq_template(gc, tail, depth)?;
    wrap_call(gc, "cons", &[car_expanded, cdr_expanded])
}

fn quote_if_needed(gc: &mut Gc, v: Value) -> Result<Value, EvalError> {
    Ok(quote(gc, v))
}

fn quote(gc: &mut Gc, v: Value) -> Value {
    let tag = symbol(gc, "quote");
    list_of(gc, &[tag, v])
}

fn wrap_call(gc: &mut Gc, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let tag = symbol(gc, name);
    let mut out = vec![tag];
    out.extend_from_slice(args);
    Ok(list_of(gc, &out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;

    fn expand_src(src: &str, gc: &mut Gc) -> Value {
        let v = Reader::new(src).read(gc).unwrap().unwrap();
        expand(gc, v).unwrap()
    }

    #[test]
    fn if_pads_missing_else_with_undefined() {
        let mut gc = Gc::new();
        let v = expand_src("(if #t 1)", &mut gc);
        assert_eq!(v.nth(&gc, 3), Some(Value::Undefined));
    }

    #[test]
    fn define_function_sugar_becomes_lambda() {
        let mut gc = Gc::new();
        let v = expand_src("(define (f x) x)", &mut gc);
        let value = v.nth(&gc, 2).unwrap();
        assert!(value.car(&gc).unwrap().symbol_eq(&gc, "lambda"));
    }

    #[test]
    fn and_expands_to_nested_if() {
        let mut gc = Gc::new();
        let v = expand_src("(and 1 2)", &mut gc);
        assert!(v.car(&gc).unwrap().symbol_eq(&gc, "if"));
    }

    #[test]
    fn or_expands_to_percent_or() {
        let mut gc = Gc::new();
        let v = expand_src("(or 1 2)", &mut gc);
        assert!(v.car(&gc).unwrap().symbol_eq(&gc, "%or"));
    }

    #[test]
    fn cond_else_becomes_true_test() {
        let mut gc = Gc::new();
        let v = expand_src("(cond (else 'b))", &mut gc);
        assert!(v.car(&gc).unwrap().symbol_eq(&gc, "if"));
        assert_eq!(v.nth(&gc, 1), Some(Value::Bool(true)));
    }

    #[test]
    fn rejects_non_symbol_lambda_param() {
        let mut gc = Gc::new();
        let v = Reader::new("(lambda (1) 1)").read(&mut gc).unwrap().unwrap();
        assert!(expand(&mut gc, v).is_err());
    }

    #[test]
    fn rejects_unquote_splicing_outside_a_list() {
        let mut gc = Gc::new();
        let v = Reader::new("`,@x").read(&mut gc).unwrap().unwrap();
        assert!(expand(&mut gc, v).is_err());
    }

    #[test]
    fn rejects_unquote_splicing_in_dotted_tail_position() {
        let mut gc = Gc::new();
        let v = Reader::new("`(a . ,@b)").read(&mut gc).unwrap().unwrap();
        assert!(expand(&mut gc, v).is_err());
    }
}
