//! SICStus fastrw: whole-tree writer and shared leaf encodings.
//!
//! A sentence is the version byte `D` followed by one term:
//!
//! | term          | bytes                                     |
//! |---------------|-------------------------------------------|
//! | compound      | `S` functor `\0` arity-byte args...       |
//! | atom          | `A` name `\0`                             |
//! | integer       | `I` decimal-digits `\0`                   |
//! | float         | `F` decimal-text `\0`                     |
//! | variable      | `_` ordinal `\0`                          |
//! | list          | `[` elem ... `[` elem `]`                 |
//! | code run      | `"` byte... `\0` (list elements 1..=255)  |
//!
//! [`SicstusWriter`] encodes a finished [`Term`]; the streaming
//! [`SicstusOutput`](crate::SicstusOutput) produces identical bytes from
//! protocol calls.

use crate::{ByteBuffer, FastrwError, VarCache};
use prolog_terms::{Arena, Term, View};
use std::io::Write;

pub(crate) const VERSION: u8 = b'D';
pub(crate) const COMPOUND: u8 = b'S';
pub(crate) const ATOM: u8 = b'A';
pub(crate) const INTEGER: u8 = b'I';
pub(crate) const FLOAT: u8 = b'F';
pub(crate) const VARIABLE: u8 = b'_';
pub(crate) const LIST: u8 = b'[';
pub(crate) const NIL: u8 = b']';
pub(crate) const ASCII: u8 = b'"';

/// Largest arity that fits the single arity byte.
pub const MAX_ARITY: usize = 255;

/// Returns the byte of a list element that can join a code run.
#[inline]
pub(crate) fn ascii_code(value: i64) -> Option<u8> {
    match value {
        1..=255 => Some(value as u8),
        _ => None,
    }
}

/// Float text as SICStus writes it: the shortest round-trip digits with
/// a `.` before any exponent.
pub fn float_text(value: f64) -> std::string::String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    let mut buf = ryu::Buffer::new();
    let s = buf.format_finite(value);
    match s.find('e') {
        Some(e) if !s[..e].contains('.') => format!("{}.0{}", &s[..e], &s[e..]),
        _ => s.to_owned(),
    }
}

pub(crate) fn put_atom(buf: &mut ByteBuffer, name: &str) {
    buf.push(ATOM);
    buf.push_cstr(name);
}

pub(crate) fn put_int(buf: &mut ByteBuffer, value: impl std::fmt::Display) {
    buf.push(INTEGER);
    buf.push_display(value);
    buf.push(0);
}

pub(crate) fn put_float(buf: &mut ByteBuffer, value: f64) {
    buf.push(FLOAT);
    buf.push_cstr(&float_text(value));
}

pub(crate) fn put_var(buf: &mut ByteBuffer, vars: &mut VarCache, name: &str) {
    buf.push(VARIABLE);
    buf.push_display(vars.ordinal(name));
    buf.push(0);
}

pub(crate) fn check_arity(functor: &str, arity: usize) -> Result<u8, FastrwError> {
    if arity > MAX_ARITY {
        return Err(FastrwError::ArityOverflow {
            functor: functor.into(),
            arity,
        });
    }
    Ok(arity as u8)
}

/// Work items of the iterative walk.  The markers stand for the
/// structural bytes between list elements.
enum Item {
    Term(Term),
    Start,
    End,
    Codes(Vec<u8>),
}

/// Writes finished terms in SICStus fastrw format.
///
/// Each [`SicstusWriter::write_term`] call is one sentence: it is encoded
/// into memory first, so a failing term leaves nothing on the sink.
///
/// ```rust
/// # use prolog_fastrw::SicstusWriter;
/// # use prolog_terms::{Arena, list, var, IntoTerm};
/// let mut arena = Arena::new();
/// let xs = list![var!("X"), var!("X") => &mut arena];
/// let mut w = SicstusWriter::new(Vec::new());
/// w.write_term(&xs, &arena).unwrap();
/// assert_eq!(w.get_ref().as_slice(), b"D[_0\0[_0\0]");
/// ```
#[derive(Debug)]
pub struct SicstusWriter<W: Write> {
    out: W,
    buf: ByteBuffer,
    vars: VarCache,
}

impl<W: Write> SicstusWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: ByteBuffer::new(),
            vars: VarCache::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Encode `term` as one sentence and flush the sink.
    pub fn write_term(&mut self, term: &Term, arena: &Arena) -> Result<(), FastrwError> {
        self.buf.clear();
        self.vars.clear();
        self.buf.push(VERSION);
        let encoded = self.encode(term, arena);
        if encoded.is_ok() {
            self.out.write_all(self.buf.as_slice())?;
            self.out.flush()?;
            log::trace!(
                "sicstus sentence: {} bytes, {} vars",
                self.buf.len(),
                self.vars.len()
            );
        }
        self.buf.clear();
        self.vars.clear();
        encoded
    }

    fn encode(&mut self, term: &Term, arena: &Arena) -> Result<(), FastrwError> {
        let mut items = vec![Item::Term(*term)];
        while let Some(item) = items.pop() {
            let t = match item {
                Item::Term(t) => t,
                Item::Start => {
                    self.buf.push(LIST);
                    continue;
                }
                Item::End => {
                    self.buf.push(NIL);
                    continue;
                }
                Item::Codes(codes) => {
                    self.buf.push(ASCII);
                    self.buf.extend_from_slice(&codes);
                    self.buf.push(0);
                    continue;
                }
            };
            match t.view(arena)? {
                View::Int(i) => put_int(&mut self.buf, i),
                View::BigInt(digits) => put_int(&mut self.buf, digits),
                View::Real(r) => put_float(&mut self.buf, r),
                View::Atom(name) => put_atom(&mut self.buf, name),
                View::Var(name) => put_var(&mut self.buf, &mut self.vars, name),
                View::List(ar, elems) => {
                    items.push(Item::End);
                    let mut codes = Vec::new();
                    for e in elems.iter().rev() {
                        match e.view(ar)? {
                            View::Int(i) if ascii_code(i).is_some() => {
                                codes.extend(ascii_code(i));
                            }
                            _ => {
                                if !codes.is_empty() {
                                    codes.reverse();
                                    items.push(Item::Codes(std::mem::take(&mut codes)));
                                }
                                items.push(Item::Term(*e));
                                items.push(Item::Start);
                            }
                        }
                    }
                    if !codes.is_empty() {
                        codes.reverse();
                        items.push(Item::Codes(codes));
                    }
                }
                View::Func(ar, functor, args) => {
                    let name = ar.atom_name(functor)?;
                    let arity = check_arity(name, args.len())?;
                    self.buf.push(COMPOUND);
                    self.buf.push_cstr(name);
                    self.buf.push(arity);
                    items.extend(args.iter().rev().map(|a| Item::Term(*a)));
                }
                View::Str(_) | View::Tuple(_, _) => {
                    return Err(FastrwError::UnsupportedTerm(t.kind_name()));
                }
            }
        }
        Ok(())
    }
}
