// ABOUTME: Reader module for parsing Scheme expressions by hand-rolled recursive descent
//! Recursive-descent reader: consumes one character at a time from a
//! source with one character of pushback, exactly like `get`/`unget`
//! wrapping `getc`/`ungetc` in the reference implementation. This is why
//! the reader does not use a combinator grammar — a `Peekable<Chars>`
//! already gives one-slot pushback in the standard library, so it reads
//! one top-level form and leaves the rest of the source untouched for the
//! next `read` call, which is what a REPL and a multi-form script both
//! need.
//!
//! The arena is passed into each call rather than held by `Reader`
//! itself, so a caller can interleave reading one top-level form with
//! evaluating it (which also needs `&mut Gc`) without fighting the borrow
//! checker.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::EvalError;
use crate::gc::Gc;
use crate::value::{classify_atom, name_to_char, HeapObject, Value};

pub struct Reader<'s> {
    chars: Peekable<Chars<'s>>,
}

impl<'s> Reader<'s> {
    pub fn new(source: &'s str) -> Self {
        Reader {
            chars: source.chars().peekable(),
        }
    }

    /// Read one top-level form, or `Ok(None)` at end of input.
    pub fn read(&mut self, gc: &mut Gc) -> Result<Option<Value>, EvalError> {
        self.eat_space();
        let c = match self.get() {
            Some(c) => c,
            None => return Ok(None),
        };
        self.read_from(gc, c).map(Some)
    }

    fn read_from(&mut self, gc: &mut Gc, c: char) -> Result<Value, EvalError> {
        match c {
            '(' => self.read_pair(gc),
            ')' => Err(EvalError::read("extra close parenthesis")),
            '"' => self.read_string(gc),
            '#' => self.read_hash(gc),
            '\'' => self.read_sugar(gc, "quote"),
            '`' => self.read_sugar(gc, "quasiquote"),
            ',' => {
                if self.peek() == Some('@') {
                    self.get();
                    self.read_sugar(gc, "unquote-splicing")
                } else {
                    self.read_sugar(gc, "unquote")
                }
            }
            ';' => {
                self.eat_until('\n');
                self.eat_space();
                match self.get() {
                    Some(c) => self.read_from(gc, c),
                    None => Err(EvalError::read("unexpected end of input after comment")),
                }
            }
            other => self.read_atom(gc, other),
        }
    }

    fn read_sugar(&mut self, gc: &mut Gc, tag: &str) -> Result<Value, EvalError> {
        self.eat_space();
        let c = self
            .get()
            .ok_or_else(|| EvalError::read("unexpected end of input"))?;
        let inner = self.read_from(gc, c)?;
        let tag = Value::Object(gc.alloc_value(HeapObject::Symbol(tag.to_string())));
        let rest = gc.alloc_value(HeapObject::Pair(inner, Value::Nil));
        Ok(Value::Object(
            gc.alloc_value(HeapObject::Pair(tag, Value::Object(rest))),
        ))
    }

    fn read_atom(&mut self, gc: &mut Gc, first: char) -> Result<Value, EvalError> {
        let mut token = String::new();
        token.push(first);
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '(' || c == ')' => break,
                Some(_) => token.push(self.get().unwrap()),
                None => break,
            }
        }
        Ok(classify_atom(gc, &token))
    }

    fn read_pair(&mut self, gc: &mut Gc) -> Result<Value, EvalError> {
        self.eat_space();
        match self.peek() {
            Some(')') => {
                self.get();
                Ok(Value::Nil)
            }
            None => Err(EvalError::read("unexpected end of input in list")),
            _ => {
                let c = self.get().unwrap();
                let head = self.read_from(gc, c)?;
                if head.symbol_eq(gc, ".") {
                    self.eat_space();
                    let c = self
                        .get()
                        .ok_or_else(|| EvalError::read("unexpected end of input after `.`"))?;
                    let tail = self.read_from(gc, c)?;
                    self.eat_space();
                    match self.get() {
                        Some(')') => Ok(tail),
                        _ => Err(EvalError::read("bad dot syntax")),
                    }
                } else {
                    let rest = self.read_pair(gc)?;
                    Ok(Value::Object(gc.alloc_value(HeapObject::Pair(head, rest))))
                }
            }
        }
    }

    fn read_string(&mut self, gc: &mut Gc) -> Result<Value, EvalError> {
        let mut buf = String::new();
        loop {
            let c = self
                .get()
                .ok_or_else(|| EvalError::read("unterminated string literal"))?;
            if c == '"' {
                break;
            } else if c == '\\' {
                let escaped = self
                    .get()
                    .ok_or_else(|| EvalError::read("unterminated escape in string literal"))?;
                match escaped {
                    'n' => buf.push('\n'),
                    other => buf.push(other),
                }
            } else {
                buf.push(c);
            }
        }
        Ok(Value::Object(gc.alloc_value(HeapObject::String(buf))))
    }

    fn read_vector(&mut self, gc: &mut Gc) -> Result<Value, EvalError> {
        let mut items = Vec::new();
        self.eat_space();
        while self.peek() != Some(')') {
            let c = self
                .get()
                .ok_or_else(|| EvalError::read("unexpected end of input in vector"))?;
            items.push(self.read_from(gc, c)?);
            self.eat_space();
        }
        self.get();
        Ok(Value::Object(gc.alloc_value(HeapObject::Vector(items))))
    }

    /// Reads the `1 2 3)` tail of a `#u8(1 2 3)` bytevector literal; the
    /// leading `u8(` has already been consumed by `read_hash`.
    fn read_bytevector(&mut self, gc: &mut Gc) -> Result<Value, EvalError> {
        let mut bytes = Vec::new();
        self.eat_space();
        while self.peek() != Some(')') {
            let c = self
                .get()
                .ok_or_else(|| EvalError::read("unexpected end of input in bytevector"))?;
            let element = self.read_from(gc, c)?;
            match element {
                Value::Integer(n) if (0..=255).contains(&n) => bytes.push(n as u8),
                _ => return Err(EvalError::read("bytevector elements must be bytes 0-255")),
            }
            self.eat_space();
        }
        self.get();
        Ok(Value::Object(gc.alloc_value(HeapObject::Bytevector(bytes))))
    }

    fn read_char(&mut self) -> Result<Value, EvalError> {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(c) if !c.is_whitespace() && c != '(' && c != ')' => {
                    name.push(self.get().unwrap())
                }
                _ => break,
            }
        }
        if name.is_empty() {
            Err(EvalError::read("zero-length character literal"))
        } else if name.chars().count() == 1 {
            Ok(Value::Character(name.chars().next().unwrap()))
        } else if let Some(rest) = name.strip_prefix('x') {
            let code = u32::from_str_radix(rest, 16)
                .map_err(|_| EvalError::read("bad hex character literal"))?;
            let c = char::from_u32(code).ok_or_else(|| EvalError::read("invalid code point"))?;
            Ok(Value::Character(c))
        } else {
            name_to_char(&name)
                .map(Value::Character)
                .ok_or_else(|| EvalError::read(format!("unknown character name: {name}")))
        }
    }

    fn read_hash(&mut self, gc: &mut Gc) -> Result<Value, EvalError> {
        match self.get() {
            Some('(') => self.read_vector(gc),
            Some('\\') => self.read_char(),
            Some('t') => Ok(Value::Bool(true)),
            Some('f') => Ok(Value::Bool(false)),
            Some('u') => {
                if self.get() != Some('8') || self.get() != Some('(') {
                    return Err(EvalError::read("bad syntax in #u8"));
                }
                self.read_bytevector(gc)
            }
            _ => Err(EvalError::read("bad syntax in #")),
        }
    }

    fn eat_space(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.get();
        }
    }

    fn eat_until(&mut self, stop: char) {
        while let Some(c) = self.get() {
            if c == stop {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Pull one character. Unlike the ASCII `get`/`unget` pair in the
    /// reference reader, this accepts the full Unicode scalar range —
    /// the fatal-input-byte check happens earlier, in `check_fatal_bytes`,
    /// before any character reaches the reader.
    fn get(&mut self) -> Option<char> {
        self.chars.next()
    }
}

/// Reject bytes the reference reader's `get` would call fatal: control
/// bytes that are neither whitespace nor part of a valid UTF-8 stream.
/// Called once per source before reading begins, since `Reader` itself
/// works over `char`s rather than raw bytes.
pub fn check_fatal_bytes(source: &str) -> Result<(), EvalError> {
    for b in source.bytes() {
        if b < 0x20 && b != b'\n' && b != b'\t' && b != b'\r' {
            return Err(EvalError::InputError { byte: b });
        }
    }
    Ok(())
}

/// Read every top-level form in `source`.
pub fn read_all(source: &str, gc: &mut Gc) -> Result<Vec<Value>, EvalError> {
    let mut reader = Reader::new(source);
    let mut forms = Vec::new();
    while let Some(form) = reader.read(gc)? {
        forms.push(form);
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(src: &str, gc: &mut Gc) -> Value {
        Reader::new(src).read(gc).unwrap().unwrap()
    }

    #[test]
    fn reads_integers_and_symbols() {
        let mut gc = Gc::new();
        assert_eq!(read_one("42", &mut gc), Value::Integer(42));
        assert!(read_one("foo", &mut gc).is_symbol(&gc));
    }

    #[test]
    fn reads_nested_lists() {
        let mut gc = Gc::new();
        let v = read_one("(1 (2 3) 4)", &mut gc);
        assert_eq!(v.list_length(&gc), Some(3));
    }

    #[test]
    fn reads_dotted_pairs() {
        let mut gc = Gc::new();
        let v = read_one("(1 . 2)", &mut gc);
        assert_eq!(v.car(&gc), Some(Value::Integer(1)));
        assert_eq!(v.cdr(&gc), Some(Value::Integer(2)));
    }

    #[test]
    fn reads_quote_sugar() {
        let mut gc = Gc::new();
        let v = read_one("'x", &mut gc);
        assert!(v.car(&gc).unwrap().symbol_eq(&gc, "quote"));
    }

    #[test]
    fn reads_strings_with_escapes() {
        let mut gc = Gc::new();
        let v = read_one("\"a\\nb\"", &mut gc);
        match v.object(&gc) {
            Some(HeapObject::String(s)) => assert_eq!(s, "a\nb"),
            _ => panic!("expected string"),
        }
    }

    #[test]
    fn reads_multiple_top_level_forms() {
        let mut gc = Gc::new();
        let forms = read_all("1 2 3", &mut gc).unwrap();
        assert_eq!(forms, vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    }

    #[test]
    fn extra_close_paren_is_an_error() {
        let mut gc = Gc::new();
        assert!(Reader::new(")").read(&mut gc).is_err());
    }

    #[test]
    fn reads_bytevectors() {
        let mut gc = Gc::new();
        let v = read_one("#u8(1 2 3)", &mut gc);
        match v.object(&gc) {
            Some(HeapObject::Bytevector(bytes)) => assert_eq!(bytes, &[1, 2, 3]),
            _ => panic!("expected bytevector"),
        }
    }

    #[test]
    fn bytevector_rejects_out_of_range_elements() {
        let mut gc = Gc::new();
        assert!(Reader::new("#u8(1 300 3)").read(&mut gc).is_err());
    }

    #[test]
    fn stringify_round_trip() {
        let mut gc = Gc::new();
        for src in ["42", "foo", "(1 2 3)", "\"hi\"", "#t", "#f", "'x"] {
            let v = read_one(src, &mut gc);
            let rendered = format!("{}", v.stringify(&gc));
            let reread = read_one(&rendered, &mut gc);
            assert!(reread.eq(&v, &gc) || format!("{}", reread.stringify(&gc)) == rendered);
        }
    }
}
