//! Defines [`TermBuilder`], a [`TermOutput`] that assembles arena terms.
//!
//! Lets any producer of protocol calls also feed the whole-tree writer or
//! [`TermDisplay`](prolog_terms::TermDisplay).

use crate::{FastrwError, TermOutput};
use dashu::integer::IBig;
use prolog_terms::{Arena, Term};
use smartstring::alias::String;

#[derive(Debug)]
enum Frame {
    Compound { functor: String, args: Vec<Term> },
    List(Vec<Term>),
}

/// Builds one [`Term`] per sentence in the given [`Arena`].
///
/// ```rust
/// # use prolog_fastrw::{TermBuilder, TermOutput};
/// # use prolog_terms::Arena;
/// let mut arena = Arena::new();
/// let mut b = TermBuilder::new(&mut arena);
/// b.open_term("f").unwrap().print_var("X").unwrap().close_term().unwrap();
/// b.full_stop().unwrap();
/// let terms = b.into_terms();
/// assert_eq!(terms[0].display(&arena).to_string(), "f(X)");
/// ```
#[derive(Debug)]
pub struct TermBuilder<'a> {
    arena: &'a mut Arena,
    frames: Vec<Frame>,
    /// Top-level terms of the current sentence.
    pending: Vec<Term>,
    terms: Vec<Term>,
}

impl<'a> TermBuilder<'a> {
    pub fn new(arena: &'a mut Arena) -> Self {
        Self {
            arena,
            frames: Vec::new(),
            pending: Vec::new(),
            terms: Vec::new(),
        }
    }

    /// The terms of all completed sentences.
    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    fn add(&mut self, term: Term) -> Result<&mut Self, FastrwError> {
        match self.frames.last_mut() {
            Some(Frame::Compound { args, .. }) => args.push(term),
            Some(Frame::List(elems)) => elems.push(term),
            None => self.pending.push(term),
        }
        Ok(self)
    }
}

impl TermOutput for TermBuilder<'_> {
    fn open_term(&mut self, functor: &str) -> Result<&mut Self, FastrwError> {
        self.frames.push(Frame::Compound {
            functor: functor.into(),
            args: Vec::new(),
        });
        Ok(self)
    }

    fn close_term(&mut self) -> Result<&mut Self, FastrwError> {
        let Some(Frame::Compound { functor, args }) = self
            .frames
            .pop_if(|f| matches!(f, Frame::Compound { .. }))
        else {
            return Err(FastrwError::MismatchedClose {
                found: "close_term",
            });
        };
        let term = self.arena.func(&functor, args);
        self.add(term)
    }

    fn open_list(&mut self) -> Result<&mut Self, FastrwError> {
        self.frames.push(Frame::List(Vec::new()));
        Ok(self)
    }

    fn close_list(&mut self) -> Result<&mut Self, FastrwError> {
        let Some(Frame::List(elems)) = self.frames.pop_if(|f| matches!(f, Frame::List(_))) else {
            return Err(FastrwError::MismatchedClose {
                found: "close_list",
            });
        };
        let term = self.arena.list(elems);
        self.add(term)
    }

    fn empty_list(&mut self) -> Result<&mut Self, FastrwError> {
        self.add(Term::NIL)
    }

    fn print_atom(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        let term = self.arena.atom(name);
        self.add(term)
    }

    fn print_int(&mut self, value: i64) -> Result<&mut Self, FastrwError> {
        self.add(Term::int(value))
    }

    fn print_bigint(&mut self, value: &IBig) -> Result<&mut Self, FastrwError> {
        let term = self.arena.bigint(value);
        self.add(term)
    }

    fn print_float(&mut self, value: f64) -> Result<&mut Self, FastrwError> {
        self.add(Term::real(value))
    }

    fn print_var(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        let term = self.arena.var(name);
        self.add(term)
    }

    /// Completes a sentence.  A sentence must hold exactly one term.
    fn full_stop(&mut self) -> Result<&mut Self, FastrwError> {
        if !self.frames.is_empty() {
            let unclosed = self.frames.len();
            self.frames.clear();
            self.pending.clear();
            return Err(FastrwError::Unbalanced { unclosed });
        }
        let pending = std::mem::take(&mut self.pending);
        match pending[..] {
            [term] => self.terms.push(term),
            _ => return Err(FastrwError::Unsupported("sentence without exactly one term")),
        }
        Ok(self)
    }

    fn flush(&mut self) -> Result<&mut Self, FastrwError> {
        Ok(self)
    }
}
