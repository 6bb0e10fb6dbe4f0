//! # Fastrw Error Type
//!
//! This module defines [`FastrwError`], a unified error enum for the fastrw
//! encoders.  It aggregates failures from:
//!
//! - **Protocol misuse** (unbalanced or mismatched open/close calls),
//! - **Representability limits** of the target wire format,
//! - **Term inspection** ([`TermError`]),
//! - **I/O** on the downstream byte sink,
//! - **JSON input** for the command-line producer.
//!
//! Conversions from underlying error types are derived with `#[from]`, enabling
//! ergonomic propagation via the `?` operator in functions that return
//! `Result<T, FastrwError>`.

use prolog_terms::TermError;
use smartstring::alias::String;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding terms.
///
/// None of the representability errors are worked around: emitting anything
/// for such input would corrupt a wire format owned by the receiving Prolog
/// system.
///
/// # Examples
/// Propagating a term inspection failure:
/// ```rust
/// # use prolog_fastrw::FastrwError;
/// # use prolog_terms::{Arena, Term};
/// # fn demo(arena: &Arena, t: &Term) -> Result<i64, FastrwError> {
/// let n = t.unpack_int(arena)?; // TermError -> FastrwError via #[from]
/// # Ok(n) }
/// ```
#[derive(Debug, Error)]
pub enum FastrwError {
    /// `full_stop` was called while terms or lists were still open.
    #[error("sentence ended with {unclosed} unclosed term(s) or list(s)")]
    Unbalanced { unclosed: usize },

    /// An earlier call of the sentence failed, so `full_stop` dropped it.
    #[error("sentence discarded after an earlier error")]
    SentenceDiscarded,

    /// A close call did not match the innermost open context.
    #[error("{found} does not match the innermost open context")]
    MismatchedClose { found: &'static str },

    /// SICStus compounds carry their arity in a single byte.
    #[error("compound {functor}/{arity} exceeds the maximum arity of 255")]
    ArityOverflow { functor: String, arity: usize },

    /// The integer does not fit in a tagged integer of the target word size.
    #[error("integer {value} does not fit in {bits} bits")]
    IntegerOutOfRange { value: i64, bits: u32 },

    /// The atom is not Latin-1 and wide atoms are disabled.
    #[error("atom {0:?} needs wide characters but wide atoms are disabled")]
    WideAtomsDisabled(String),

    /// The term kind has no encoding in this format.
    #[error("cannot encode term of kind {0}")]
    UnsupportedTerm(&'static str),

    /// The operation has no encoding in this format.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The JSON input does not describe a term.
    #[error("invalid term json: {0}")]
    Json(String),

    /// Term error.
    #[error("term error {0:?}")]
    Term(#[from] TermError),

    /// Writing or flushing the output sink failed.
    #[error("io error {0}")]
    Io(#[from] std::io::Error),

    /// Reading JSON input failed.
    #[error("json error {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Return a `FastrwError::Json` with a formatted message.
///
/// # Example
/// ```rust, ignore
/// bail_json!("unexpected value: {}", val);
/// ```
#[macro_export]
macro_rules! bail_json {
    ($($arg:tt)*) => {
        return Err($crate::FastrwError::Json(format!($($arg)*).into()))
    };
}
