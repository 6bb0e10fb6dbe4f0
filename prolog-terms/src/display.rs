//! Defines [`TermDisplay`], a formatter for rendering [`Term`] values.
//!
//! Provides a [`fmt::Display`] implementation that renders terms in
//! Prolog syntax: quoted atoms where needed, lists, tuples and compound
//! structures.  Used for diagnostics and logging; the wire formats live
//! in the `prolog-fastrw` crate.

use crate::{Arena, Term, View};
use std::fmt;

/// A wrapper that ties together a [`Term`] and its [`Arena`] so the term
/// can be rendered with standard formatting macros (`format!`,
/// `println!`, `log::debug!`, etc.).
///
/// ### Example
/// ```rust
/// use prolog_terms::{Term, Arena, func, IntoTerm};
/// let mut arena = Arena::new();
/// let term = func!("foo"; 1, "hello, world!" => &mut arena);
///
/// assert_eq!(term.display(&arena).to_string(), "foo(1, 'hello, world!')");
/// ```
///
/// Construct instances via [`Term::display`].
pub struct TermDisplay<'a> {
    /// The interned term to display.
    term: &'a Term,
    /// The arena where the term is stored.
    arena: &'a Arena,
}

impl Term {
    /// Return a [`TermDisplay`] suitable for formatting with [`fmt::Display`].
    #[inline]
    pub fn display<'a>(&'a self, arena: &'a Arena) -> TermDisplay<'a> {
        TermDisplay { term: self, arena }
    }
}

fn is_unquoted_atom(s: &str) -> bool {
    if s == "[]" || s == "{}" {
        return true;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_atom_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if is_unquoted_atom(s) {
        return f.write_str(s);
    }
    f.write_str("'")?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

fn write_str_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\x{:02X}\\", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

fn write_args(f: &mut fmt::Formatter<'_>, arena: &Arena, args: &[Term]) -> fmt::Result {
    for (i, t) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", t.display(arena))?;
    }
    Ok(())
}

/// Implements [`fmt::Display`] for [`TermDisplay`], enabling it to be
/// formatted and printed with standard formatting macros.
impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term.view(self.arena).map_err(|_e| fmt::Error)? {
            View::Int(i) => write!(f, "{i}"),
            View::BigInt(digits) => f.write_str(digits),
            View::Real(r) => {
                if r.is_finite() && r.fract() == 0.0 && r.abs() < 1e16 {
                    write!(f, "{:.1}", r)
                } else {
                    write!(f, "{}", r)
                }
            }
            View::Str(s) => write_str_quoted(f, s),
            View::Atom(a) => write_atom_str(f, a),
            View::Var(v) => f.write_str(v),
            View::Func(ar, functor, args) => {
                let name = ar.atom_name(functor).map_err(|_e| fmt::Error)?;
                write_atom_str(f, name)?;
                f.write_str("(")?;
                write_args(f, ar, args)?;
                f.write_str(")")
            }
            View::Tuple(ar, items) => {
                f.write_str("(")?;
                write_args(f, ar, items)?;
                f.write_str(")")
            }
            View::List(ar, items) => {
                f.write_str("[")?;
                write_args(f, ar, items)?;
                f.write_str("]")
            }
        }
    }
}
