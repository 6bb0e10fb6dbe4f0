//! # Prolog Fastrw
//!
//! Encoders for the binary term formats read by the fast-read primitives
//! of SICStus Prolog and SWI-Prolog.
//!
//! Terms reach an encoder in one of two ways:
//!
//! - as calls of the construction protocol [`TermOutput`]: open a compound or
//!   list, print leaves, close, and end the sentence with
//!   [`TermOutput::full_stop`].  [`SicstusOutput`] and [`SwiOutput`] stream
//!   these calls to a [`std::io::Write`] sink without ever holding the whole
//!   term in memory;
//! - as a finished [`prolog_terms::Term`], via [`SicstusWriter`] or the
//!   provided [`TermOutput::print_term`].
//!
//! Both SICStus paths produce identical bytes.
//!
//! ## Example
//! ```rust
//! # use prolog_fastrw::{SicstusOutput, SwiConfig, SwiOutput, TermOutput, WordSize, FastrwError};
//! # fn main() -> Result<(), FastrwError> {
//! let mut sicstus = SicstusOutput::new(Vec::new());
//! sicstus.open_term("a")?.print_atom("b")?.close_term()?.full_stop()?;
//! assert_eq!(sicstus.get_ref().as_slice(), b"DSa\0\x01Ab\0");
//!
//! let cfg = SwiConfig::host().with_word_size(WordSize::Eight);
//! let mut swi = SwiOutput::new(Vec::new(), cfg);
//! swi.open_term("a")?.print_atom("b")?.close_term()?.full_stop()?;
//! assert_eq!(
//!     swi.get_ref().as_slice(),
//!     &[0x72, 0x08, 0x02, 0x0d, 0x01, 0x0b, 0x01, b'a', 0x0b, 0x01, b'b']
//! );
//! # Ok(()) }
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

pub mod buffer;
pub mod builder;
pub mod error;
pub mod json;
pub mod output;
pub mod sicstus;
pub mod sicstus_stream;
pub mod swi;
pub mod vars;

pub use buffer::ByteBuffer;
pub use builder::TermBuilder;
pub use error::FastrwError;
pub use output::TermOutput;
pub use sicstus::{float_text, SicstusWriter, MAX_ARITY};
pub use sicstus_stream::SicstusOutput;
pub use swi::{varint, Endianness, SwiConfig, SwiOutput, TargetOs, WordSize};
pub use vars::VarCache;
