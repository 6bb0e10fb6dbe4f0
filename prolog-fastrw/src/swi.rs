//! Streaming SWI-Prolog fastrw encoder.
//!
//! A sentence is a record: one header byte, then (unless the record is a
//! single atom or small integer) the code size, the stack size and, for
//! non-ground terms, the variable count, each as a "zips" varint, followed by
//! the tagged code bytes.  The receiver sizes its allocation from the stack
//! size, so every cell the decoded term occupies is accounted for while the
//! code is produced.
//!
//! Sizes and byte orders depend on the target system, described by
//! [`SwiConfig`].

use crate::{ByteBuffer, FastrwError, TermOutput, VarCache};
use dashu::integer::IBig;
use std::io::Write;

const REC_INT: u8 = 0x04;
const REC_ATOM: u8 = 0x08;
const REC_GROUND: u8 = 0x10;
const REC_VERSION: u8 = 3 << 5;

const PL_TYPE_VARIABLE: u8 = 1;
const PL_TYPE_TAGGED_INTEGER: u8 = 4;
const PL_TYPE_CONS: u8 = 8;
const PL_TYPE_NIL: u8 = 9;
const PL_TYPE_EXT_ATOM: u8 = 11;
const PL_TYPE_EXT_WATOM: u8 = 12;
const PL_TYPE_EXT_COMPOUND: u8 = 13;
const PL_TYPE_EXT_FLOAT: u8 = 14;

/// Stack words of a cons cell: functor, head and tail.
const CONS_CELL_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSize {
    Four,
    Eight,
}

impl WordSize {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            WordSize::Four => 4,
            WordSize::Eight => 8,
        }
    }

    #[inline]
    fn header_class(self) -> u8 {
        match self {
            WordSize::Four => 0x01,
            WordSize::Eight => 0x02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Target operating system.  Windows builds of SWI-Prolog store wide
/// atoms as UTF-16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Windows,
    Other,
}

/// Describes the SWI-Prolog system that reads the records.
///
/// ```rust
/// # use prolog_fastrw::{SwiConfig, WordSize, Endianness, TargetOs};
/// let cfg = SwiConfig::host()
///     .with_word_size(WordSize::Four)
///     .with_endianness(Endianness::Big)
///     .with_target_os(TargetOs::Other)
///     .with_wide_atoms(false);
/// assert_eq!(cfg.word_size(), WordSize::Four);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwiConfig {
    word_size: WordSize,
    endianness: Endianness,
    target_os: TargetOs,
    wide_atoms: bool,
}

impl Default for SwiConfig {
    fn default() -> Self {
        Self::host()
    }
}

impl SwiConfig {
    /// Word size, byte order and OS of the system this crate was built for.
    pub fn host() -> Self {
        Self {
            word_size: if cfg!(target_pointer_width = "64") {
                WordSize::Eight
            } else {
                WordSize::Four
            },
            endianness: if cfg!(target_endian = "big") {
                Endianness::Big
            } else {
                Endianness::Little
            },
            target_os: if cfg!(windows) {
                TargetOs::Windows
            } else {
                TargetOs::Other
            },
            wide_atoms: true,
        }
    }

    pub fn with_word_size(mut self, word_size: WordSize) -> Self {
        self.word_size = word_size;
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_target_os(mut self, target_os: TargetOs) -> Self {
        self.target_os = target_os;
        self
    }

    /// Allow atoms outside Latin-1.  When disabled such atoms are an error.
    pub fn with_wide_atoms(mut self, wide_atoms: bool) -> Self {
        self.wide_atoms = wide_atoms;
        self
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn target_os(&self) -> TargetOs {
        self.target_os
    }

    pub fn wide_atoms(&self) -> bool {
        self.wide_atoms
    }

    /// Bits available to a tagged integer.
    #[inline]
    pub fn int_bits(&self) -> u32 {
        (self.word_size.bytes() * 8 - 8) as u32
    }

    #[inline]
    fn header(&self) -> u8 {
        self.word_size.header_class() | REC_VERSION
    }
}

/// Encodes `value` as a zips varint: 7-bit groups, most significant first,
/// with the high bit set on every group but the last.  Returns the buffer
/// and the number of bytes used.
pub fn varint(value: usize) -> ([u8; 10], usize) {
    let mut groups = [0u8; 10];
    let mut n = 0;
    let mut v = value;
    loop {
        groups[n] = (v & 0x7f) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    let mut out = [0u8; 10];
    for i in 0..n {
        let group = groups[n - 1 - i];
        out[i] = if i + 1 < n { group | 0x80 } else { group };
    }
    (out, n)
}

#[inline]
fn is_latin1(name: &str) -> bool {
    name.chars().all(|c| (c as u32) < 0x100)
}

#[inline]
fn put_varint(buf: &mut ByteBuffer, value: usize) {
    let (bytes, n) = varint(value);
    buf.extend_from_slice(&bytes[..n]);
}

/// Length byte and minimal big-endian two's complement bytes of `value`.
fn put_int_bytes(buf: &mut ByteBuffer, value: i64) {
    let magnitude = if value < 0 { !value } else { value };
    let bits = 65 - magnitude.leading_zeros() as usize;
    let n = bits.div_ceil(8);
    buf.push(n as u8);
    buf.extend_from_slice(&value.to_be_bytes()[8 - n..]);
}

#[derive(Debug)]
enum Pending {
    List,
    Compound {
        /// Position of the compound tag.
        start: usize,
        arity: usize,
    },
}

/// Encodes protocol calls as SWI-Prolog fastrw records.
///
/// ```rust
/// # use prolog_fastrw::{SwiConfig, SwiOutput, TermOutput, WordSize};
/// let cfg = SwiConfig::host().with_word_size(WordSize::Eight);
/// let mut out = SwiOutput::new(Vec::new(), cfg);
/// out.print_int(42).unwrap().full_stop().unwrap();
/// assert_eq!(out.get_ref().as_slice(), &[0x76, 0x01, 0x2a]);
/// ```
#[derive(Debug)]
pub struct SwiOutput<W: Write> {
    out: W,
    config: SwiConfig,
    buf: ByteBuffer,
    vars: VarCache,
    stack: Vec<Pending>,
    /// Receiver stack words used by the buffered term.
    stack_size: usize,
    /// A call of the current sentence failed.
    failed: bool,
}

impl<W: Write> SwiOutput<W> {
    pub fn new(out: W, config: SwiConfig) -> Self {
        Self {
            out,
            config,
            buf: ByteBuffer::new(),
            vars: VarCache::new(),
            stack: Vec::new(),
            stack_size: 0,
            failed: false,
        }
    }

    pub fn config(&self) -> &SwiConfig {
        &self.config
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
        self.stack_size = 0;
        self.failed = false;
    }

    /// Marks the sentence as failed; `full_stop` will drop it.
    fn fail(&mut self, e: FastrwError) -> FastrwError {
        self.failed = true;
        e
    }

    /// A leaf printed now is a whole record on its own.
    #[inline]
    fn is_direct(&self) -> bool {
        self.stack.is_empty() && self.buf.is_empty() && !self.failed
    }

    /// Write a single-record sentence straight to the sink.
    fn write_direct(&mut self) -> Result<(), FastrwError> {
        let written = self.out.write_all(self.buf.as_slice());
        log::trace!("swi direct record: {} bytes", self.buf.len());
        self.buf.clear();
        Ok(written?)
    }

    /// Account for a new argument of the innermost context.
    fn handle_term(&mut self) {
        match self.stack.last_mut() {
            None => {}
            Some(Pending::List) => {
                self.buf.push(PL_TYPE_CONS);
                self.stack_size += CONS_CELL_WORDS;
            }
            Some(Pending::Compound { arity, .. }) => *arity += 1,
        }
    }

    fn check_int(&mut self, value: i64) -> Result<(), FastrwError> {
        let bits = self.config.int_bits();
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(self.fail(FastrwError::IntegerOutOfRange { value, bits }));
        }
        Ok(())
    }

    fn check_atom(&mut self, name: &str) -> Result<(), FastrwError> {
        if !self.config.wide_atoms && !is_latin1(name) {
            return Err(self.fail(FastrwError::WideAtomsDisabled(name.into())));
        }
        Ok(())
    }

    /// Atom encoding of `name`, which has passed [`Self::check_atom`].
    fn put_atom(&mut self, name: &str) {
        if is_latin1(name) {
            self.buf.push(PL_TYPE_EXT_ATOM);
            put_varint(&mut self.buf, name.chars().count());
            for c in name.chars() {
                self.buf.push(c as u32 as u8);
            }
            return;
        }
        self.buf.push(PL_TYPE_EXT_WATOM);
        match self.config.target_os {
            TargetOs::Windows => {
                put_varint(&mut self.buf, name.encode_utf16().count());
                for unit in name.encode_utf16() {
                    self.buf.extend_from_slice(&unit.to_le_bytes());
                }
            }
            TargetOs::Other => {
                put_varint(&mut self.buf, name.chars().count());
                for c in name.chars() {
                    let c = c as u32;
                    match self.config.endianness {
                        Endianness::Little => self.buf.extend_from_slice(&c.to_le_bytes()),
                        Endianness::Big => self.buf.extend_from_slice(&c.to_be_bytes()),
                    }
                }
            }
        }
    }

    /// Write a direct atom or nil record when `code` is the whole sentence.
    fn try_direct(&mut self, code: &[u8]) -> Result<bool, FastrwError> {
        if !self.is_direct() {
            return Ok(false);
        }
        self.buf
            .push(self.config.header() | REC_ATOM | REC_GROUND);
        self.buf.extend_from_slice(code);
        self.write_direct()?;
        Ok(true)
    }

    /// Replace the single placeholder byte at `pos` with the varint
    /// `arity`, moving the following bytes when it needs more room.
    fn patch_arity(&mut self, pos: usize, arity: usize) {
        let (bytes, n) = varint(arity);
        if n == 1 {
            self.buf.set(pos, bytes[0]);
            return;
        }
        log::debug!("swi arity {arity} needs {n} bytes, shifting");
        self.buf.shift_right(pos + 1, n - 1);
        let end = self.buf.len();
        self.buf.set_len(pos);
        self.buf.extend_from_slice(&bytes[..n]);
        self.buf.set_len(end);
    }

    fn write_record(&mut self) -> Result<(), FastrwError> {
        let mut header = ByteBuffer::with_capacity(16);
        let mut flags = self.config.header();
        if self.vars.is_empty() {
            flags |= REC_GROUND;
        }
        header.push(flags);
        put_varint(&mut header, self.buf.len());
        put_varint(&mut header, self.stack_size);
        if !self.vars.is_empty() {
            put_varint(&mut header, self.vars.len());
        }
        self.out.write_all(header.as_slice())?;
        self.out.write_all(self.buf.as_slice())?;
        Ok(())
    }
}

impl<W: Write> TermOutput for SwiOutput<W> {
    fn open_term(&mut self, functor: &str) -> Result<&mut Self, FastrwError> {
        self.check_atom(functor)?;
        self.handle_term();
        let start = self.buf.len();
        self.buf.push(PL_TYPE_EXT_COMPOUND);
        self.buf.push(0);
        self.put_atom(functor);
        self.stack.push(Pending::Compound { start, arity: 0 });
        Ok(self)
    }

    fn close_term(&mut self) -> Result<&mut Self, FastrwError> {
        let Some(Pending::Compound { start, arity }) = self
            .stack
            .pop_if(|p| matches!(p, Pending::Compound { .. }))
        else {
            return Err(self.fail(FastrwError::MismatchedClose {
                found: "close_term",
            }));
        };
        if arity == 0 {
            // No arguments: rewrite `tag placeholder functor` as the atom.
            let functor = self.buf.as_slice()[start + 2..].to_vec();
            self.buf.set_len(start);
            if !self.try_direct(&functor)? {
                self.buf.extend_from_slice(&functor);
            }
            return Ok(self);
        }
        self.stack_size += arity + 1;
        self.patch_arity(start + 1, arity);
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
        // An empty top-level list is a direct nil record.
        if !self.try_direct(&[PL_TYPE_NIL])? {
            self.buf.push(PL_TYPE_NIL);
        }
        Ok(self)
    }

    fn print_atom(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        self.check_atom(name)?;
        if self.is_direct() {
            self.buf
                .push(self.config.header() | REC_ATOM | REC_GROUND);
            self.put_atom(name);
            self.write_direct()?;
            return Ok(self);
        }
        self.handle_term();
        self.put_atom(name);
        Ok(self)
    }

    fn print_int(&mut self, value: i64) -> Result<&mut Self, FastrwError> {
        self.check_int(value)?;
        if self.is_direct() {
            self.buf.push(self.config.header() | REC_INT | REC_GROUND);
            put_int_bytes(&mut self.buf, value);
            self.write_direct()?;
            return Ok(self);
        }
        self.handle_term();
        self.buf.push(PL_TYPE_TAGGED_INTEGER);
        put_int_bytes(&mut self.buf, value);
        Ok(self)
    }

    fn print_bigint(&mut self, value: &IBig) -> Result<&mut Self, FastrwError> {
        match i64::try_from(value) {
            Ok(i) => self.print_int(i),
            Err(_) => Err(self.fail(FastrwError::Unsupported("big integers in SWI records"))),
        }
    }

    fn print_float(&mut self, value: f64) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        self.buf.push(PL_TYPE_EXT_FLOAT);
        self.buf.extend_from_slice(&value.to_le_bytes());
        self.stack_size += 8usize.div_ceil(self.config.word_size.bytes());
        Ok(self)
    }

    fn print_var(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
        self.handle_term();
        self.buf.push(PL_TYPE_VARIABLE);
        let ordinal = self.vars.ordinal(name);
        put_varint(&mut self.buf, ordinal);
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
        let written = if self.buf.is_empty() {
            Ok(())
        } else {
            log::trace!(
                "swi record: {} code bytes, {} stack words, {} vars",
                self.buf.len(),
                self.stack_size,
                self.vars.len()
            );
            self.write_record()
        };
        self.reset();
        written?;
        self.out.flush()?;
        Ok(self)
    }

    fn flush(&mut self) -> Result<&mut Self, FastrwError> {
        self.out.flush()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolog_terms::{func, list, var, Arena, IntoTerm, Term};
    use std::io;
    use std::str::FromStr;

    fn cfg64() -> SwiConfig {
        SwiConfig::host()
            .with_word_size(WordSize::Eight)
            .with_endianness(Endianness::Little)
            .with_target_os(TargetOs::Other)
    }

    fn cfg32() -> SwiConfig {
        cfg64().with_word_size(WordSize::Four)
    }

    fn record(
        cfg: SwiConfig,
        f: impl FnOnce(&mut SwiOutput<Vec<u8>>) -> Result<(), FastrwError>,
    ) -> Vec<u8> {
        let mut out = SwiOutput::new(Vec::new(), cfg);
        f(&mut out).unwrap();
        out.full_stop().unwrap();
        out.into_inner()
    }

    #[test]
    fn varints() {
        let enc = |v| {
            let (b, n) = varint(v);
            b[..n].to_vec()
        };
        assert_eq!(enc(0), [0x00]);
        assert_eq!(enc(127), [0x7f]);
        assert_eq!(enc(128), [0x81, 0x00]);
        assert_eq!(enc(300), [0x82, 0x2c]);
        assert_eq!(enc(16384), [0x81, 0x80, 0x00]);
    }

    #[test]
    fn direct_integer() {
        assert_eq!(record(cfg64(), |o| o.print_int(42).map(drop)), [0x76, 0x01, 0x2a]);
        assert_eq!(record(cfg64(), |o| o.print_int(0).map(drop)), [0x76, 0x01, 0x00]);
        assert_eq!(record(cfg64(), |o| o.print_int(-1).map(drop)), [0x76, 0x01, 0xff]);
        assert_eq!(
            record(cfg64(), |o| o.print_int(128).map(drop)),
            [0x76, 0x02, 0x00, 0x80]
        );
        assert_eq!(
            record(cfg64(), |o| o.print_int(-129).map(drop)),
            [0x76, 0x02, 0xff, 0x7f]
        );
        assert_eq!(record(cfg32(), |o| o.print_int(42).map(drop)), [0x75, 0x01, 0x2a]);
    }

    #[test]
    fn direct_atom_and_nil() {
        assert_eq!(
            record(cfg64(), |o| o.print_atom("ab").map(drop)),
            [0x7a, 0x0b, 0x02, b'a', b'b']
        );
        assert_eq!(record(cfg64(), |o| o.empty_list().map(drop)), [0x7a, 0x09]);
        assert_eq!(
            record(cfg64(), |o| o.open_term("a")?.close_term().map(drop)),
            [0x7a, 0x0b, 0x01, b'a']
        );
    }

    #[test]
    fn compound() {
        let bytes = record(cfg64(), |o| {
            o.open_term("a")?.print_atom("b")?.close_term()?;
            Ok(())
        });
        assert_eq!(
            bytes,
            [0x72, 0x08, 0x02, 0x0d, 0x01, 0x0b, 0x01, 0x61, 0x0b, 0x01, 0x62]
        );
    }

    #[test]
    fn childless_nested_term_is_an_atom() {
        let bytes = record(cfg64(), |o| {
            o.open_term("f")?.open_term("g")?.close_term()?.close_term()?;
            Ok(())
        });
        assert_eq!(
            bytes,
            [0x72, 0x08, 0x02, 0x0d, 0x01, 0x0b, 0x01, b'f', 0x0b, 0x01, b'g']
        );
    }

    #[test]
    fn list_cells_and_variables() {
        let bytes = record(cfg64(), |o| {
            o.open_list()?.print_var("X")?.print_int(1)?.print_var("X")?.close_list()?;
            Ok(())
        });
        assert_eq!(
            bytes,
            [
                0x62, 0x0b, 0x09, 0x01, // header, code size, stack size, var count
                0x08, 0x01, 0x00, // [X
                0x08, 0x04, 0x01, 0x01, // , 1
                0x08, 0x01, 0x00, // , X
                0x09, // ]
            ]
        );
    }

    #[test]
    fn floats() {
        let bytes = record(cfg64(), |o| o.print_float(1.0).map(drop));
        let mut expected = vec![0x72, 0x09, 0x01, 0x0e];
        expected.extend_from_slice(&1.0f64.to_le_bytes());
        assert_eq!(bytes, expected);

        let bytes = record(cfg32().with_endianness(Endianness::Big), |o| {
            o.print_float(1.0).map(drop)
        });
        assert_eq!(&bytes[..4], &[0x71, 0x09, 0x02, 0x0e]);
        assert_eq!(&bytes[4..], &1.0f64.to_le_bytes());
    }

    #[test]
    fn integer_range() {
        let max56 = (1i64 << 55) - 1;
        assert!(record(cfg64(), |o| o.print_int(max56).map(drop)).len() == 9);
        let mut out = SwiOutput::new(Vec::new(), cfg64());
        assert!(matches!(
            out.print_int(max56 + 1),
            Err(FastrwError::IntegerOutOfRange { bits: 56, .. })
        ));
        let mut out = SwiOutput::new(Vec::new(), cfg32());
        out.open_list().unwrap();
        assert!(out.print_int((1 << 23) - 1).is_ok());
        assert!(matches!(
            out.print_int(-(1 << 23) - 1),
            Err(FastrwError::IntegerOutOfRange { bits: 24, .. })
        ));
        let big = IBig::from_str("123456789012345678901234567890").unwrap();
        assert!(matches!(
            out.print_bigint(&big),
            Err(FastrwError::Unsupported(_))
        ));
    }

    #[test]
    fn wide_atoms() {
        // U+0101 is outside Latin-1; U+1F600 needs a surrogate pair in UTF-16.
        let name = "\u{101}\u{1F600}";
        let unix = record(cfg64(), |o| o.print_atom(name).map(drop));
        assert_eq!(
            unix,
            [0x7a, 0x0c, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0xf6, 0x01, 0x00]
        );
        let big = record(cfg64().with_endianness(Endianness::Big), |o| {
            o.print_atom(name).map(drop)
        });
        assert_eq!(
            big,
            [0x7a, 0x0c, 0x02, 0x00, 0x00, 0x01, 0x01, 0x00, 0x01, 0xf6, 0x00]
        );
        let windows = record(cfg64().with_target_os(TargetOs::Windows), |o| {
            o.print_atom(name).map(drop)
        });
        assert_eq!(
            windows,
            [0x7a, 0x0c, 0x03, 0x01, 0x01, 0x3d, 0xd8, 0x00, 0xde]
        );
        let latin1 = record(cfg64(), |o| o.print_atom("caf\u{e9}").map(drop));
        assert_eq!(latin1, [0x7a, 0x0b, 0x04, b'c', b'a', b'f', 0xe9]);
    }

    #[test]
    fn wide_atoms_disabled() {
        let mut out = SwiOutput::new(Vec::new(), cfg64().with_wide_atoms(false));
        assert!(matches!(
            out.print_atom("\u{3bb}"),
            Err(FastrwError::WideAtomsDisabled(_))
        ));
        assert!(out.get_ref().is_empty());
        assert!(matches!(
            out.full_stop(),
            Err(FastrwError::SentenceDiscarded)
        ));
        out.print_atom("ok").unwrap().full_stop().unwrap();
        assert_eq!(out.get_ref().as_slice(), &[0x7a, 0x0b, 0x02, b'o', b'k']);
    }

    #[test]
    fn failed_sentence_is_discarded() {
        let mut out = SwiOutput::new(Vec::new(), cfg64().with_wide_atoms(false));
        out.open_list().unwrap().print_atom("a").unwrap();
        assert!(out.print_atom("\u{3bb}").is_err());
        assert!(out.open_term("\u{3bb}").is_err());
        assert_eq!(out.depth(), 1);
        out.close_list().unwrap();
        assert!(matches!(
            out.full_stop(),
            Err(FastrwError::SentenceDiscarded)
        ));
        assert!(out.get_ref().is_empty());

        // a later leaf of a failed sentence is not written directly
        assert!(out.print_int(1 << 60).is_err());
        out.print_int(1).unwrap();
        assert!(out.get_ref().is_empty());
        assert!(out.full_stop().is_err());
        assert!(out.get_ref().is_empty());

        let mut arena = Arena::new();
        let big = Term::bigint(&mut arena, &IBig::from_str("99999999999999999999").unwrap());
        let t = list![1, big => &mut arena];
        assert!(out.print_term(&t, &arena).is_err());
        assert!(out.full_stop().is_err());
        assert!(out.get_ref().is_empty());

        out.open_list().unwrap().print_atom("a").unwrap().close_list().unwrap();
        out.full_stop().unwrap();
        assert_eq!(
            out.get_ref().as_slice(),
            &[0x72, 0x05, 0x03, 0x08, 0x0b, 0x01, b'a', 0x09]
        );
    }

    #[test]
    fn empty_list_calls_agree() {
        let split = record(cfg64(), |o| {
            o.open_list()?.close_list()?;
            Ok(())
        });
        assert_eq!(split, [0x7a, 0x09]);
        assert_eq!(split, record(cfg64(), |o| o.empty_list().map(drop)));

        let nested = record(cfg64(), |o| {
            o.open_term("f")?.open_list()?.close_list()?.close_term()?;
            Ok(())
        });
        assert_eq!(
            nested,
            [0x72, 0x06, 0x02, 0x0d, 0x01, 0x0b, 0x01, b'f', 0x09]
        );
    }

    #[test]
    fn large_arity_shifts_arguments() {
        let bytes = record(cfg64(), |o| {
            o.open_term("f")?;
            for _ in 0..200 {
                o.print_atom("x")?;
            }
            o.close_term()?;
            Ok(())
        });
        // code: tag, 2 arity bytes, functor (3 bytes), 200 * 3 argument bytes
        let code_size = 1 + 2 + 3 + 200 * 3;
        let (cs, csn) = varint(code_size);
        let (ss, ssn) = varint(201);
        let mut expected = vec![0x72];
        expected.extend_from_slice(&cs[..csn]);
        expected.extend_from_slice(&ss[..ssn]);
        expected.extend_from_slice(&[0x0d, 0x81, 0x48, 0x0b, 0x01, b'f']);
        for _ in 0..200 {
            expected.extend_from_slice(&[0x0b, 0x01, b'x']);
        }
        assert_eq!(bytes, expected);
    }

    #[test]
    fn nested_large_arity() {
        let bytes = record(cfg64(), |o| {
            o.open_term("g")?.open_term("f")?;
            for _ in 0..130 {
                o.print_int(1)?;
            }
            o.close_term()?.print_atom("z")?.close_term()?;
            Ok(())
        });
        let code = &bytes[bytes.len() - (5 + 6 + 130 * 3 + 3)..];
        assert_eq!(&code[..6], &[0x0d, 0x02, 0x0b, 0x01, b'g', 0x0d]);
        assert_eq!(&code[6..10], &[0x81, 0x02, 0x0b, 0x01]);
        assert_eq!(&code[code.len() - 3..], &[0x0b, 0x01, b'z']);
    }

    #[test]
    fn print_term_from_arena() {
        let mut arena = Arena::new();
        let t = func!["a"; "b" => &mut arena];
        let mut out = SwiOutput::new(Vec::new(), cfg64());
        out.print_term(&t, &arena).unwrap().full_stop().unwrap();
        assert_eq!(
            out.into_inner(),
            [0x72, 0x08, 0x02, 0x0d, 0x01, 0x0b, 0x01, 0x61, 0x0b, 0x01, 0x62]
        );

        let t = list![var!("X"), list![], 2.5 => &mut arena];
        let mut out = SwiOutput::new(Vec::new(), cfg64());
        out.print_term(&t, &arena).unwrap().full_stop().unwrap();
        let bytes = out.into_inner();
        assert_eq!(bytes[0], 0x62);
        // three cons cells plus one float
        assert_eq!(bytes[2], (3 * 3 + 1) as u8);
        assert_eq!(bytes[3], 1);

        let mut out = SwiOutput::new(Vec::new(), cfg64());
        out.print_term(&Term::NIL, &arena).unwrap().full_stop().unwrap();
        assert_eq!(out.into_inner(), [0x7a, 0x09]);
    }

    #[test]
    fn sentences_are_independent() {
        let second = |o: &mut SwiOutput<Vec<u8>>| -> Result<(), FastrwError> {
            o.open_term("g")?.print_var("Y")?.print_float(0.5)?.close_term()?;
            Ok(())
        };
        let mut out = SwiOutput::new(Vec::new(), cfg64());
        out.open_list().unwrap().print_var("X").unwrap().print_var("Y").unwrap();
        out.close_list().unwrap().full_stop().unwrap();
        let first_len = out.get_ref().len();
        second(&mut out).unwrap();
        out.full_stop().unwrap();
        let both = out.into_inner();
        assert_eq!(&both[first_len..], record(cfg64(), second).as_slice());
    }

    #[test]
    fn unbalanced_and_mismatched() {
        let mut out = SwiOutput::new(Vec::new(), cfg64());
        out.open_term("f").unwrap().print_int(1).unwrap();
        assert!(matches!(
            out.full_stop(),
            Err(FastrwError::Unbalanced { unclosed: 1 })
        ));
        assert!(out.get_ref().is_empty());
        assert!(matches!(
            out.close_list(),
            Err(FastrwError::MismatchedClose { .. })
        ));
        assert!(matches!(
            out.full_stop(),
            Err(FastrwError::SentenceDiscarded)
        ));
        out.print_int(5).unwrap().full_stop().unwrap();
        assert_eq!(out.get_ref().as_slice(), &[0x76, 0x01, 0x05]);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn io_errors_propagate() {
        let mut out = SwiOutput::new(FailingSink, cfg64());
        assert!(matches!(out.print_atom("a"), Err(FastrwError::Io(_))));
        out.open_term("f").unwrap().print_int(1).unwrap().close_term().unwrap();
        assert!(matches!(out.full_stop(), Err(FastrwError::Io(_))));
        assert_eq!(out.depth(), 0);
    }
}
