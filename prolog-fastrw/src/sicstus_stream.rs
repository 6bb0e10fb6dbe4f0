//! Streaming SICStus fastrw encoder.
//!
//! Compound preludes are written lazily: a term opened with
//! [`TermOutput::open_term`] is only known to be a compound once its first
//! argument arrives, so the `S` functor header and a placeholder arity byte
//! are emitted at that point and the arity is patched on close.  A term that
//! closes without arguments becomes an atom.

use crate::sicstus::{self, ascii_code, check_arity};
use crate::{ByteBuffer, FastrwError, TermOutput, VarCache};
use dashu::integer::IBig;
use smartstring::alias::String;
use std::io::Write;

/// An open term or list awaiting its close call.
#[derive(Debug)]
enum Pending {
    List,
    Compound {
        functor: String,
        /// Position of the arity byte, valid once `arity > 0`.
        arity_pos: usize,
        arity: usize,
    },
}

/// Encodes protocol calls in SICStus fastrw format.
///
/// Each sentence is buffered until [`TermOutput::full_stop`], which writes
/// the version byte and the buffered term to the sink and flushes it.
///
/// ```rust
/// # use prolog_fastrw::{SicstusOutput, TermOutput};
/// let mut out = SicstusOutput::new(Vec::new());
/// out.open_list().unwrap()
///     .print_var("X").unwrap()
///     .print_var("X").unwrap()
///     .close_list().unwrap()
///     .full_stop().unwrap();
/// assert_eq!(out.get_ref().as_slice(), b"D[_0\0[_0\0]");
/// ```
#[derive(Debug)]
pub struct SicstusOutput<W: Write> {
    out: W,
    buf: ByteBuffer,
    vars: VarCache,
    stack: Vec<Pending>,
    /// A `"` code run is open in the innermost list.
    in_codes: bool,
    /// A call of the current sentence failed.
    failed: bool,
}

impl<W: Write> SicstusOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: ByteBuffer::new(),
            vars: VarCache::new(),
            stack: Vec::new(),
            in_codes: false,
            failed: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Number of terms and lists currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.vars.clear();
        self.stack.clear();
        self.in_codes = false;
        self.failed = false;
    }

    /// Marks the sentence as failed; `full_stop` will drop it.
    fn fail(&mut self, e: FastrwError) -> FastrwError {
        self.failed = true;
        e
    }

    #[inline]
    fn end_codes(&mut self) {
        if self.in_codes {
            self.buf.push(0);
            self.in_codes = false;
        }
    }

    /// Account for a new argument of the innermost context.
    fn handle_term(&mut self) {
        match self.stack.last_mut() {
            None => {}
            Some(Pending::List) => {
                if self.in_codes {
                    self.buf.push(0);
                    self.in_codes = false;
                }
                self.buf.push(sicstus::LIST);
            }
            Some(Pending::Compound {
                functor,
                arity_pos,
                arity,
            }) => {
                if *arity == 0 {
                    self.buf.push(sicstus::COMPOUND);
                    self.buf.push_cstr(functor);
                    *arity_pos = self.buf.len();
                    self.buf.push(0);
                }
                *arity += 1;
            }
        }
    }
}

impl<W: Write> TermOutput for SicstusOutput<W> {
    fn open_term(&mut self, functor: &str) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        self.stack.push(Pending::Compound {
            functor: functor.into(),
            arity_pos: 0,
            arity: 0,
        });
        Ok(self)
    }

    fn close_term(&mut self) -> Result<&mut Self, FastrwError> {
        let byte = match self.stack.last() {
            Some(Pending::Compound { arity: 0, .. }) => None,
            Some(Pending::Compound { functor, arity, .. }) => {
                match check_arity(functor, *arity) {
                    Ok(byte) => Some(byte),
                    Err(e) => return Err(self.fail(e)),
                }
            }
            _ => {
                return Err(self.fail(FastrwError::MismatchedClose {
                    found: "close_term",
                }))
            }
        };
        if let Some(Pending::Compound {
            functor, arity_pos, ..
        }) = self.stack.pop()
        {
            match byte {
                Some(byte) => self.buf.set(arity_pos, byte),
                None => sicstus::put_atom(&mut self.buf, &functor),
            }
        }
        Ok(self)
    }

    fn open_list(&mut self) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        self.stack.push(Pending::List);
        Ok(self)
    }

    fn close_list(&mut self) -> Result<&mut Self, FastrwError> {
        if self
            .stack
            .pop_if(|p| matches!(p, Pending::List))
            .is_none()
        {
            return Err(self.fail(FastrwError::MismatchedClose {
                found: "close_list",
            }));
        }
        self.end_codes();
        self.buf.push(sicstus::NIL);
        Ok(self)
    }

    fn print_atom(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        sicstus::put_atom(&mut self.buf, name);
        Ok(self)
    }

    fn print_int(&mut self, value: i64) -> Result<&mut Self, FastrwError> {
        let in_list = matches!(self.stack.last(), Some(Pending::List));
        if let (true, Some(code)) = (in_list, ascii_code(value)) {
            if !self.in_codes {
                self.buf.push(sicstus::ASCII);
                self.in_codes = true;
            }
            self.buf.push(code);
            return Ok(self);
        }
        self.handle_term();
        sicstus::put_int(&mut self.buf, value);
        Ok(self)
    }

    fn print_bigint(&mut self, value: &IBig) -> Result<&mut Self, FastrwError> {
        if let Ok(i) = i64::try_from(value) {
            return self.print_int(i);
        }
        self.handle_term();
        sicstus::put_int(&mut self.buf, value);
        Ok(self)
    }

    fn print_float(&mut self, value: f64) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        sicstus::put_float(&mut self.buf, value);
        Ok(self)
    }

    fn print_var(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        sicstus::put_var(&mut self.buf, &mut self.vars, name);
        Ok(self)
    }

    fn full_stop(&mut self) -> Result<&mut Self, FastrwError> {
        if self.failed {
            self.reset();
            return Err(FastrwError::SentenceDiscarded);
        }
        if !self.stack.is_empty() {
            let unclosed = self.stack.len();
            self.reset();
            return Err(FastrwError::Unbalanced { unclosed });
        }
        let written = self.write_sentence();
        log::trace!(
            "sicstus sentence: {} bytes, {} vars",
            self.buf.len() + 1,
            self.vars.len()
        );
        self.reset();
        written?;
        Ok(self)
    }

    fn flush(&mut self) -> Result<&mut Self, FastrwError> {
        self.out.flush()?;
        Ok(self)
    }
}

impl<W: Write> SicstusOutput<W> {
    fn write_sentence(&mut self) -> Result<(), FastrwError> {
        self.out.write_all(&[sicstus::VERSION])?;
        self.out.write_all(self.buf.as_slice())?;
        self.out.flush()?;
        Ok(())
    }
}
