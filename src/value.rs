// ABOUTME: Value types representing Scheme data structures and expressions
//! The value model: the tagged union every reader, expander and evaluator
//! node is built from, plus the heap payloads the GC arena owns.

use std::fmt;

use crate::gc::{Children, Gc, GcRef};

/// A Lisp value. Heap variants (`Object`) carry only a handle; the actual
/// payload lives in the `Gc` arena. `Nil`, `Bool` and `Undefined` are
/// singletons with no handle at all — they are never placed on the managed
/// heap and the collector never sees them.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Value {
    Undefined,
    Nil,
    Bool(bool),
    Integer(i64),
    Character(char),
    /// Handle into the GC arena; resolve with `Gc::get`.
    Object(GcRef),
}

/// Heap-resident payloads. Pairs, strings, symbols, vectors, bytevectors
/// and procedures all live here; `Value::Object` is the handle type.
pub enum HeapObject {
    Pair(Value, Value),
    String(String),
    Symbol(String),
    Vector(Vec<Value>),
    Bytevector(Vec<u8>),
    /// A primitive implemented in Rust.
    Function {
        name: &'static str,
        arity: Arity,
        func: fn(&mut Gc, &[Value]) -> Result<Value, crate::error::EvalError>,
    },
    /// A user-defined procedure: parameter list (proper or improper,
    /// expressed as a Scheme list/pair structure), body, and the defining
    /// environment.
    Closure {
        name: Option<String>,
        params: Value,
        body: Value,
        env: crate::gc::EnvRef,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Range(lo, hi) => n >= lo && n <= hi,
        }
    }
}

impl HeapObject {
    /// References this object points at, for GC marking.
    pub(crate) fn children(&self) -> Children {
        match self {
            HeapObject::Pair(a, b) => {
                let mut values = Vec::new();
                if let Some(r) = a.gc_ref() {
                    values.push(r);
                }
                if let Some(r) = b.gc_ref() {
                    values.push(r);
                }
                Children { values, env: None }
            }
            HeapObject::Vector(items) => Children {
                values: items.iter().filter_map(|v| v.gc_ref()).collect(),
                env: None,
            },
            HeapObject::Closure {
                params, body, env, ..
            } => {
                let mut values = Vec::new();
                if let Some(r) = params.gc_ref() {
                    values.push(r);
                }
                if let Some(r) = body.gc_ref() {
                    values.push(r);
                }
                Children {
                    values,
                    env: Some(*env),
                }
            }
            HeapObject::String(_) | HeapObject::Symbol(_) | HeapObject::Bytevector(_) => {
                Children {
                    values: Vec::new(),
                    env: None,
                }
            }
            HeapObject::Function { .. } => Children {
                values: Vec::new(),
                env: None,
            },
        }
    }
}

impl Value {
    pub fn gc_ref(&self) -> Option<GcRef> {
        match self {
            Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_pair(&self, gc: &Gc) -> bool {
        matches!(self.object(gc), Some(HeapObject::Pair(..)))
    }

    pub fn is_symbol(&self, gc: &Gc) -> bool {
        matches!(self.object(gc), Some(HeapObject::Symbol(_)))
    }

    pub fn object<'a>(&self, gc: &'a Gc) -> Option<&'a HeapObject> {
        self.gc_ref().map(|r| gc.get(r))
    }

    pub fn as_symbol<'a>(&self, gc: &'a Gc) -> Option<&'a str> {
        match self.object(gc) {
            Some(HeapObject::Symbol(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn symbol_eq(&self, gc: &Gc, name: &str) -> bool {
        self.as_symbol(gc) == Some(name)
    }

    pub fn car(&self, gc: &Gc) -> Option<Value> {
        match self.object(gc) {
            Some(HeapObject::Pair(a, _)) => Some(*a),
            _ => None,
        }
    }

    pub fn cdr(&self, gc: &Gc) -> Option<Value> {
        match self.object(gc) {
            Some(HeapObject::Pair(_, b)) => Some(*b),
            _ => None,
        }
    }

    /// Length of a proper list, or `None` if `self` is not a proper list.
    /// Uses tortoise-and-hare traversal so a circular list terminates
    /// instead of looping forever.
    pub fn list_length(&self, gc: &Gc) -> Option<usize> {
        let mut slow = *self;
        let mut fast = *self;
        let mut len = 0usize;
        loop {
            if fast.is_nil() {
                return Some(len);
            }
            let HeapObject::Pair(_, fast_cdr) = fast.object(gc)? else {
                return None;
            };
            fast = *fast_cdr;
            len += 1;
            if fast.is_nil() {
                return Some(len);
            }
            let HeapObject::Pair(_, fast_cdr2) = fast.object(gc)? else {
                return None;
            };
            fast = *fast_cdr2;
            len += 1;
            let HeapObject::Pair(_, slow_cdr) = slow.object(gc)? else {
                return None;
            };
            slow = *slow_cdr;
            if let (Value::Object(a), Value::Object(b)) = (fast, slow) {
                if a == b {
                    return None; // cyclic
                }
            }
        }
    }

    pub fn is_proper_list(&self, gc: &Gc) -> bool {
        self.list_length(gc).is_some()
    }

    pub fn to_vec(&self, gc: &Gc) -> Vec<Value> {
        let mut out = Vec::new();
        let mut cur = *self;
        while let Some(HeapObject::Pair(a, b)) = cur.object(gc) {
            out.push(*a);
            cur = *b;
        }
        out
    }

    pub fn nth(&self, gc: &Gc, n: usize) -> Option<Value> {
        let mut cur = *self;
        for _ in 0..n {
            cur = cur.cdr(gc)?;
        }
        cur.car(gc)
    }

    /// Structural equality in the `eq?` sense: identity for heap objects,
    /// value equality for symbols and fixnums, singleton identity
    /// otherwise.
    pub fn eq(&self, other: &Value, gc: &Gc) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                if a == b {
                    return true;
                }
                matches!(
                    (gc.get(*a), gc.get(*b)),
                    (HeapObject::Symbol(x), HeapObject::Symbol(y)) if x == y
                )
            }
            _ => false,
        }
    }
}

/// Classify a bare atom token from the reader: `#t`/`#f` are handled
/// separately by the reader's `#` dispatch, so this only needs to decide
/// between an integer and a symbol — a run of digits with an optional
/// leading `-` is an integer, everything else is a symbol.
pub fn classify_atom(gc: &mut Gc, token: &str) -> Value {
    if is_integer_token(token) {
        Value::Integer(token.parse::<i64>().unwrap_or(0))
    } else {
        Value::Object(gc.alloc_value(HeapObject::Symbol(token.to_string())))
    }
}

fn is_integer_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => {}
        Some('-') => {
            if chars.clone().next().is_none() {
                return false;
            }
        }
        _ => return false,
    }
    chars.all(|c| c.is_ascii_digit())
}

const CHAR_NAMES: &[(&str, char)] = &[
    ("alarm", '\u{7}'),
    ("backspace", '\u{8}'),
    ("delete", '\u{7f}'),
    ("escape", '\u{1b}'),
    ("newline", '\n'),
    ("null", '\0'),
    ("return", '\r'),
    ("space", ' '),
    ("tab", '\t'),
];

pub fn name_to_char(name: &str) -> Option<char> {
    CHAR_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

pub fn char_to_name(c: char) -> Option<&'static str> {
    CHAR_NAMES.iter().find(|(_, ch)| *ch == c).map(|(n, _)| *n)
}

/// Adapter bridging `Value`'s need for arena context to `Display`, which
/// takes no extra arguments.
pub struct Stringifier<'a> {
    pub value: Value,
    pub gc: &'a Gc,
}

impl Value {
    pub fn stringify<'a>(&self, gc: &'a Gc) -> Stringifier<'a> {
        Stringifier { value: *self, gc }
    }
}

impl fmt::Display for Stringifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self.value, self.gc, f)
    }
}

fn write_value(value: Value, gc: &Gc, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Undefined => write!(f, "#<undefined>"),
        Value::Nil => write!(f, "()"),
        Value::Bool(true) => write!(f, "#t"),
        Value::Bool(false) => write!(f, "#f"),
        Value::Integer(n) => write!(f, "{n}"),
        Value::Character(c) => write_character(c, f),
        Value::Object(r) => match gc.get(r) {
            HeapObject::Symbol(s) => write!(f, "{s}"),
            HeapObject::String(s) => write_string(s, f),
            HeapObject::Pair(..) => write_pair(value, gc, f),
            HeapObject::Vector(items) => {
                write!(f, "#(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write_value(*item, gc, f)?;
                }
                write!(f, ")")
            }
            HeapObject::Bytevector(bytes) => {
                write!(f, "#u8(")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{b}")?;
                }
                write!(f, ")")
            }
            HeapObject::Function { name, .. } => write!(f, "#<procedure:{name}>"),
            HeapObject::Closure { name: Some(n), .. } => write!(f, "#<procedure:{n}>"),
            HeapObject::Closure { name: None, .. } => write!(f, "#<procedure>"),
        },
    }
}

fn write_character(c: char, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(name) = char_to_name(c) {
        write!(f, "#\\{name}")
    } else if c.is_ascii_graphic() || (c as u32 > 0x20 && !c.is_control()) {
        write!(f, "#\\{c}")
    } else {
        write!(f, "#\\x{:x}", c as u32)
    }
}

fn write_string(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '\n' => write!(f, "\\n")?,
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            other => write!(f, "{other}")?,
        }
    }
    write!(f, "\"")
}

fn write_pair(value: Value, gc: &Gc, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // `(quote x)` prints as `'x`.
    if let Some(head) = value.car(gc) {
        if head.symbol_eq(gc, "quote") {
            if let Some(rest) = value.cdr(gc) {
                if let Some(inner) = rest.car(gc) {
                    if rest.cdr(gc) == Some(Value::Nil) {
                        write!(f, "'")?;
                        return write_value(inner, gc, f);
                    }
                }
            }
        }
    }
    write!(f, "(")?;
    let mut cur = value;
    let mut first = true;
    loop {
        match cur.object(gc) {
            Some(HeapObject::Pair(a, b)) => {
                if !first {
                    write!(f, " ")?;
                }
                first = false;
                write_value(*a, gc, f)?;
                cur = *b;
            }
            _ => break,
        }
    }
    if !cur.is_nil() {
        write!(f, " . ")?;
        write_value(cur, gc, f)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_atom_integers_and_symbols() {
        let mut gc = Gc::new();
        assert_eq!(classify_atom(&mut gc, "42"), Value::Integer(42));
        assert_eq!(classify_atom(&mut gc, "-7"), Value::Integer(-7));
        assert!(matches!(classify_atom(&mut gc, "-"), Value::Object(_)));
        assert!(matches!(classify_atom(&mut gc, "foo"), Value::Object(_)));
    }

    #[test]
    fn stringify_round_trips_simple_values() {
        let gc = Gc::new();
        assert_eq!(format!("{}", Value::Integer(6).stringify(&gc)), "6");
        assert_eq!(format!("{}", Value::Bool(true).stringify(&gc)), "#t");
        assert_eq!(format!("{}", Value::Nil.stringify(&gc)), "()");
    }

    #[test]
    fn char_names_round_trip() {
        assert_eq!(name_to_char("space"), Some(' '));
        assert_eq!(char_to_name(' '), Some("space"));
        assert_eq!(name_to_char("bogus"), None);
    }
}
