//! Defines the core [`Term`] type and related constructors.
//!
//! Provides a compact representation for Prolog terms
//! and basic utilities for creating and inspecting them.

use crate::{Arena, EpochID, TermError};
use core::fmt;
use dashu::integer::IBig;

// The following type definitions describe the internal representation
// of a term.  Rather than packing data into a single integer we use
// a tagged enum to store the various kinds of terms.  Each variant
// carries its associated data directly, for example a 64 bit integer
// for numeric types or a small inline buffer for short atoms and
// variables.  Long names, big integer digits and argument sequences
// store an index and length into the appropriate arena.

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub(crate) struct TinyArray {
    pub(crate) bytes: [u8; 14],
    pub(crate) len: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub(crate) struct Slice {
    pub(crate) epoch_id: EpochID,
    pub(crate) index: u32,
    pub(crate) len: u32,
}

/// Internal handle describing the kind of a term and storing its data.
///
/// Each variant stores the associated value directly.  The `repr(u8)`
/// attribute ensures the discriminant occupies a single byte, which
/// together with the payloads yields a `Term` size of 16 bytes on
/// 64‑bit targets.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[repr(u8)]
pub(crate) enum Handle {
    Int(i64),
    BigIntRef(Slice),
    Real(f64),
    Var(TinyArray),
    VarRef(Slice),
    Atom(TinyArray),
    AtomRef(Slice),
    Str(TinyArray),
    StrRef(Slice),
    FuncRef(Slice),
    ListRef(Slice),
    TupleRef(Slice),
}

/// A compact, copyable handle referencing a term stored in a [`Arena`].
///
/// Internally a `Term` stores a single [`Handle`] enum variant.
/// On 64‑bit targets the discriminant and associated payload occupy
/// 16 bytes in total.  Users should never construct `Term` values
/// directly; instead use the associated constructors or the
/// convenience macros exported from this crate.
/// Instances of `Term` are cheap to copy (`Copy` and `Clone`).
#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Term(pub(crate) Handle);

impl AsRef<Term> for Term {
    fn as_ref(&self) -> &Self {
        self
    }
}

macro_rules! impl_from_integers_for_term {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Term {
            #[inline]
            fn from(v: $t) -> Self { Term::int(v as i64) }
        }
    )*};
}
impl_from_integers_for_term!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_floats_for_term {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Term {
            #[inline]
            fn from(v: $t) -> Self { Term::real(v as f64) }
        }
    )*};
}
impl_from_floats_for_term!(f32, f64);

/// Conversion of plain Rust values into terms allocated in an [`Arena`].
///
/// Integers and floats become numbers, `&str` and `String` become
/// **atoms** (the common case for AST functors and identifiers; use
/// [`Term::str`] for Prolog strings), and [`IBig`] becomes an integer of
/// arbitrary precision.
pub trait IntoTerm {
    fn into_term(self, arena: &mut Arena) -> Term;
}

macro_rules! impl_intoterm_for_integers {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self, _arena: &mut Arena) -> Term { Term::int(self as i64) }
        }
    )*};
}
impl_intoterm_for_integers!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_intoterm_for_floats {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self, _arena: &mut Arena) -> Term { Term::real(self as f64) }
        }
    )*};
}
impl_intoterm_for_floats!(f32, f64);

impl<'a> IntoTerm for &'a str {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, self)
    }
}

impl IntoTerm for String {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::atom(arena, &self)
    }
}

impl IntoTerm for IBig {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::bigint(arena, &self)
    }
}

impl IntoTerm for &IBig {
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        Term::bigint(arena, self)
    }
}

impl IntoTerm for Term {
    #[inline]
    fn into_term(self, _arena: &mut Arena) -> Term {
        self
    }
}

impl IntoTerm for &Term {
    #[inline]
    fn into_term(self, _arena: &mut Arena) -> Term {
        *self
    }
}

impl<F> IntoTerm for F
where
    F: FnOnce(&mut Arena) -> Term,
{
    #[inline]
    fn into_term(self, arena: &mut Arena) -> Term {
        self(arena)
    }
}

#[inline]
fn tiny(bytes: &[u8]) -> Option<TinyArray> {
    if bytes.len() > 14 {
        return None;
    }
    let mut buf = [0u8; 14];
    buf[..bytes.len()].copy_from_slice(bytes);
    Some(TinyArray {
        bytes: buf,
        len: bytes.len() as u8,
    })
}

impl Term {
    /// Construct a new integer term.  The full 64 bit two's complement
    /// representation of `i` is stored in the payload.  No truncation
    /// occurs.
    #[inline]
    pub fn int(i: impl Into<i64>) -> Self {
        Self(Handle::Int(i.into()))
    }

    /// Construct an integer of arbitrary precision.  Values that fit in
    /// an `i64` are stored inline exactly like [`Term::int`]; only larger
    /// magnitudes intern their decimal digits in the arena.  A big
    /// integer handle therefore always lies outside the `i64` range.
    pub fn bigint(arena: &mut Arena, value: &IBig) -> Self {
        match i64::try_from(value) {
            Ok(i) => Self::int(i),
            Err(_) => Self(Handle::BigIntRef(arena.intern_str(&value.to_string()))),
        }
    }

    /// Construct a new floating point term.  The full 64 bit IEEE‑754
    /// bit pattern is stored in the payload without truncation.
    #[inline]
    pub fn real(f: impl Into<f64>) -> Self {
        Self(Handle::Real(f.into()))
    }

    /// Construct or intern an atom into the arena and produce a term
    /// referencing it.  Small atom names (≤14 bytes of UTF‑8) are
    /// inlined directly into the handle; longer names are interned
    /// into the arena and referenced by index and length.
    #[inline]
    pub fn atom(arena: &mut Arena, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match tiny(name.as_bytes()) {
            Some(t) => Self(Handle::Atom(t)),
            None => Self(Handle::AtomRef(arena.intern_str(name))),
        }
    }

    /// Construct or intern a variable into the arena and produce a
    /// term referencing it.  Small variable names (≤14 bytes) are
    /// inlined directly into the handle; longer names are interned in
    /// the arena and referenced by index.
    #[inline]
    pub fn var(arena: &mut Arena, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match tiny(name.as_bytes()) {
            Some(t) => Self(Handle::Var(t)),
            None => Self(Handle::VarRef(arena.intern_str(name))),
        }
    }

    /// Construct or intern a Prolog string.  Strings longer than 14
    /// bytes are interned in the arena; shorter strings are inlined.
    #[inline]
    pub fn str(arena: &mut Arena, s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        match tiny(s.as_bytes()) {
            Some(t) => Self(Handle::Str(t)),
            None => Self(Handle::StrRef(arena.intern_str(s))),
        }
    }

    /// Construct a new compound term by interning the functor and
    /// arguments in the arena.  The returned term references a slice
    /// in the arena's term storage consisting of the functor atom as
    /// the first entry followed by the argument handles.  A functor of
    /// arity zero results in an atom.
    #[inline]
    pub fn func(
        arena: &mut Arena,
        functor: impl AsRef<str>,
        args: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Self {
        let functor_atom = Self::atom(arena, functor);
        let mut args = args.into_iter();
        let Some(first) = args.next() else {
            return functor_atom;
        };
        Self(Handle::FuncRef(arena.intern_func(
            functor_atom,
            std::iter::once(first).chain(args),
        )))
    }

    /// Construct a new compound term by interning the functor and its arguments
    /// into the arena as a sequence of terms (functor first, then arguments).
    /// A functor with no arguments yields the atom itself.  Errors if
    /// no functor is provided or if the first term is not an atom.
    #[inline]
    pub fn funcv(
        arena: &mut Arena,
        terms: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Result<Self, TermError> {
        let mut terms = terms.into_iter();
        let Some(functor_atom) = terms.next() else {
            return Err(TermError::MissingFunctor);
        };
        let functor_atom = functor_atom.into_term(arena);
        if !functor_atom.is_atom() {
            return Err(TermError::InvalidFunctor(functor_atom));
        }
        let Some(first) = terms.next() else {
            return Ok(functor_atom);
        };
        Ok(Self(Handle::FuncRef(arena.intern_func(
            functor_atom,
            std::iter::once(first).chain(terms),
        ))))
    }

    /// Constructs a new proper list. A list is represented internally as a
    /// flat array of its elements. If `terms` is empty, returns `nil`.
    #[inline]
    pub fn list(arena: &mut Arena, terms: impl IntoIterator<Item = impl IntoTerm>) -> Self {
        let mut terms = terms.into_iter();
        let Some(first) = terms.next() else {
            return Self::NIL;
        };
        Self(Handle::ListRef(
            arena.intern_seq(std::iter::once(first).chain(terms)),
        ))
    }

    /// Constructs a new tuple. A tuple is represented internally as an array
    /// of terms.
    #[inline]
    pub fn tuple(arena: &mut Arena, terms: impl IntoIterator<Item = impl IntoTerm>) -> Self {
        let mut terms = terms.into_iter();
        let Some(first) = terms.next() else {
            return Self::UNIT;
        };
        Self(Handle::TupleRef(
            arena.intern_seq(std::iter::once(first).chain(terms)),
        ))
    }

    /// Constant representing the zero‑arity tuple (unit).  Internally
    /// this is the atom `"unit"` encoded as a small atom.  It may
    /// be copied freely and does not depend on any arena.
    pub const UNIT: Self = {
        let buf: [u8; 14] = [b'u', b'n', b'i', b't', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        Self(Handle::Atom(TinyArray { bytes: buf, len: 4 }))
    };

    /// Constant representing the empty list.  Internally this is the
    /// atom `'[]'` encoded as a small atom, so `arena.atom("[]")` yields
    /// the very same handle.  It views as an empty [`View::List`].
    ///
    /// [`View::List`]: crate::View::List
    pub const NIL: Self = {
        let buf: [u8; 14] = [b'[', b']', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        Self(Handle::Atom(TinyArray { bytes: buf, len: 2 }))
    };

    /// Returns the value if `term` is an integer, otherwise an error.
    #[inline]
    pub fn unpack_int(&self, arena: &Arena) -> Result<i64, TermError> {
        arena.unpack_int(self)
    }

    /// Returns the value if `term` is an integer of any size, otherwise an error.
    #[inline]
    pub fn unpack_bigint(&self, arena: &Arena) -> Result<IBig, TermError> {
        arena.unpack_bigint(self)
    }

    /// Returns the value if `term` is a real, otherwise an error.
    #[inline]
    pub fn unpack_real(&self, arena: &Arena) -> Result<f64, TermError> {
        arena.unpack_real(self)
    }

    /// Returns the string slice if `term` is a string, otherwise an error.
    #[inline]
    pub fn unpack_str<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.unpack_str(self)
    }

    /// Returns the name if `term` is an atom, otherwise an error.
    #[inline]
    pub fn unpack_atom<'a>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<&'a str, TermError> {
        arena.unpack_atom(self, allowed_names)
    }

    /// Returns the name if `term` is a variable, otherwise an error.
    #[inline]
    pub fn unpack_var<'a>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<&'a str, TermError> {
        arena.unpack_var(self, allowed_names)
    }

    /// Returns the name and arguments if `term` is a compound term of any arity
    /// or an atom and its name is in `allowed_names` (or if `allowed_names` is empty),
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_func_any<'a>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, &'a [Term]), TermError> {
        arena.unpack_func_any(self, allowed_names)
    }

    /// Returns the name and arguments if `term` is a compound term of arity `ARITY`
    /// (or an atom if `ARITY == 0`) and its name is in `allowed_names` (or if `allowed_names` is empty),
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_func<'a, const ARITY: usize>(
        &'a self,
        arena: &'a Arena,
        allowed_names: &[&str],
    ) -> Result<(&'a Term, [Term; ARITY]), TermError> {
        arena.unpack_func(self, allowed_names)
    }

    /// Returns the slice with list elements if `term` is a list,
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_list<'a>(&'a self, arena: &'a Arena) -> Result<&'a [Term], TermError> {
        arena.unpack_list(self)
    }

    /// Returns the slice with tuple elements if `term` is a tuple of any arity,
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_tuple_any<'a>(&'a self, arena: &'a Arena) -> Result<&'a [Term], TermError> {
        arena.unpack_tuple_any(self)
    }

    /// Returns the tuple elements if `term` is a tuple of arity `ARITY`,
    /// otherwise returns an error.
    #[inline]
    pub fn unpack_tuple<const ARITY: usize>(
        &self,
        arena: &Arena,
    ) -> Result<[Term; ARITY], TermError> {
        arena.unpack_tuple(self)
    }

    /// Returns `true` if the value fits directly in `Term` without arena storage,
    /// i.e. `int`, `real`, or a small `atom`, `var` or `str`.
    #[inline]
    pub fn is_inline(&self) -> bool {
        match &self.0 {
            Handle::Int(_) | Handle::Real(_) | Handle::Atom(_) | Handle::Var(_) | Handle::Str(_) => {
                true
            }
            Handle::BigIntRef(_)
            | Handle::AtomRef(_)
            | Handle::VarRef(_)
            | Handle::StrRef(_)
            | Handle::FuncRef(_)
            | Handle::ListRef(_)
            | Handle::TupleRef(_) => false,
        }
    }

    /// Returns `true` if the term is a compound term.
    #[inline]
    pub fn is_func(&self) -> bool {
        matches!(self.0, Handle::FuncRef(_))
    }

    /// Returns `true` if the term is a list (including the empty list).
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self.0, Handle::ListRef(_)) || *self == Self::NIL
    }

    /// Returns `true` if the term is the empty list.
    #[inline]
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Returns `true` if the term is a tuple.
    #[inline]
    pub fn is_tuple(&self) -> bool {
        matches!(self.0, Handle::TupleRef(_)) || *self == Self::UNIT
    }

    /// Returns `true` if the term is an integer of any size.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self.0, Handle::Int(_) | Handle::BigIntRef(_))
    }

    /// Returns `true` if the term is an integer outside the `i64` range.
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(self.0, Handle::BigIntRef(_))
    }

    /// Returns `true` if the term is a real (floating-point) number.
    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self.0, Handle::Real(_))
    }

    /// Returns `true` if the term is an atom.  The empty list is the
    /// atom `'[]'` and counts as one.
    #[inline]
    pub fn is_atom(&self) -> bool {
        matches!(self.0, Handle::Atom(_) | Handle::AtomRef(_))
    }

    /// Returns `true` if the term is a variable.
    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(self.0, Handle::Var(_) | Handle::VarRef(_))
    }

    /// Returns `true` if the term is a number (`int`, `bigint` or `real`).
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(
            self.0,
            Handle::Int(_) | Handle::BigIntRef(_) | Handle::Real(_)
        )
    }

    /// Returns `true` if the term is a string.
    #[inline]
    pub fn is_str(&self) -> bool {
        matches!(self.0, Handle::Str(_) | Handle::StrRef(_))
    }

    /// Returns the arity of the term. The arity of atoms, numbers,
    /// lists and variables is 0.
    #[inline]
    pub fn arity(&self) -> usize {
        match &self.0 {
            Handle::FuncRef(Slice { len: n, .. }) => (n - 1) as usize,
            Handle::TupleRef(Slice { len: n, .. }) => *n as usize,
            _ => 0,
        }
    }

    /// Returns the name of a compound term, atom, or variable.
    /// Use [`Term::atom_name`], [`Term::func_name`], or [`Term::var_name`]
    /// to ensure the term is of a specific kind.
    #[inline]
    pub fn name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.name(self)
    }

    /// Returns the name of an atom,
    #[inline]
    pub fn atom_name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.unpack_atom(self, &[])
    }

    /// Returns the name of a variable.
    #[inline]
    pub fn var_name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        arena.unpack_var(self, &[])
    }

    /// Returns the name of a compund term.
    #[inline]
    pub fn func_name<'a>(&'a self, arena: &'a Arena) -> Result<&'a str, TermError> {
        let (functor, _) = arena.unpack_func_any(self, &[])?;
        arena.atom_name(functor)
    }

    /// Returns a string describing the kind of this term.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match &self.0 {
            Handle::Int(_) => "int",
            Handle::BigIntRef(_) => "bigint",
            Handle::Real(_) => "real",
            Handle::Var(_) | Handle::VarRef(_) => "var",
            Handle::Atom(_) if *self == Self::NIL => "list",
            Handle::Atom(_) | Handle::AtomRef(_) => "atom",
            Handle::Str(_) | Handle::StrRef(_) => "str",
            Handle::FuncRef(_) => "func",
            Handle::ListRef(_) => "list",
            Handle::TupleRef(_) => "tuple",
        }
    }
}

/// Implements the standard [`Debug`] formatter for [`Term`].
///
/// This prints a developer-friendly representation of the term,
/// showing its kind (e.g. `int`, `atom`, `list`, `tuple`) and
/// its internal value in a form useful for debugging.
///
/// The output is not guaranteed to be stable across versions and
/// should not be parsed; it is intended purely for diagnostics
/// and logging.
///
/// # Example
/// ```rust
/// # use prolog_terms::Term;
/// let t = Term::int(42);
/// println!("{:?}", t); // e.g. prints `Int(42)`
/// ```
impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn inline(t: &TinyArray) -> &str {
            core::str::from_utf8(&t.bytes[..t.len as usize]).unwrap_or("<invalid utf8>")
        }
        fn slice(f: &mut fmt::Formatter<'_>, kind: &str, v: &Slice) -> fmt::Result {
            f.debug_struct(kind)
                .field("epoch_id", &v.epoch_id)
                .field("index", &v.index)
                .field("len", &v.len)
                .finish()
        }
        match &self.0 {
            Handle::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Handle::BigIntRef(v) => slice(f, "BigIntRef", v),
            Handle::Real(r) => f.debug_tuple("Real").field(r).finish(),
            Handle::Var(v) => f.debug_struct("Var").field("name", &inline(v)).finish(),
            Handle::VarRef(v) => slice(f, "VarRef", v),
            Handle::Atom(a) => f.debug_struct("Atom").field("name", &inline(a)).finish(),
            Handle::AtomRef(v) => slice(f, "AtomRef", v),
            Handle::Str(s) => f.debug_struct("Str").field("value", &inline(s)).finish(),
            Handle::StrRef(v) => slice(f, "StrRef", v),
            Handle::FuncRef(v) => slice(f, "Func", v),
            Handle::ListRef(v) => slice(f, "List", v),
            Handle::TupleRef(v) => slice(f, "Tuple", v),
        }
    }
}

/// Convenience macros to construct func, list and tuple.
#[macro_export]
macro_rules! list {
    // explicit arena
    ($($arg:expr),* $(,)? => $arena:expr) => {
        $crate::list!($($arg),*)($arena)
    };
    // implicit arena
    ($($arg:expr),* $(,)?) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($arg.into_term(__arena)),*];
        __arena.list(__args)
    })};
}

#[macro_export]
macro_rules! tuple {
    // explicit arena
    ($($arg:expr),* $(,)? => $arena:expr) => {
        $crate::tuple!($($arg),*)($arena)
    };
    // implicit arena
    ($($arg:expr),* $(,)?) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($arg.into_term(__arena)),*];
        __arena.tuple(__args)
    })};
}

#[macro_export]
macro_rules! func {
    // explicit arena
    ($functor:expr; $($arg:expr),+ $(,)? => $arena:expr) => {
        $crate::func!($functor; $($arg),+)($arena)
    };
    // implicit arena
    ($functor:expr; $($arg:expr),+ $(,)?) => { (|__arena: &mut $crate::Arena| {
        let __args: &[$crate::Term] = &[$($arg.into_term(__arena)),+];
        __arena.func($functor, __args)
    })};
}

#[macro_export]
macro_rules! atom {
    // explicit arena
    ($functor:expr => $arena:expr) => {
        $crate::atom!($functor)($arena)
    };
    // implicit arena
    ($functor:expr) => {
        (|__arena: &mut $crate::Arena| __arena.atom($functor))
    };
}

#[macro_export]
macro_rules! var {
    // explicit arena
    ($name:expr => $arena:expr) => {
        $crate::var!($name)($arena)
    };
    // implicit arena
    ($name:expr) => {
        (|__arena: &mut $crate::Arena| __arena.var($name))
    };
}

#[macro_export]
macro_rules! unit {
    () => {
        $crate::Term::UNIT
    };
}

#[macro_export]
macro_rules! nil {
    () => {
        $crate::Term::NIL
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::View;
    use std::str::FromStr;

    #[test]
    fn term_size_is_16_bytes() {
        assert_eq!(core::mem::size_of::<Term>(), 16);
    }

    #[test]
    fn option_term_size_is_16_bytes() {
        assert_eq!(core::mem::size_of::<Option<Term>>(), 16);
    }

    #[test]
    fn small_atom_interning() {
        let mut arena = Arena::new();
        let a1 = Term::atom(&mut arena, "foo");
        let a2 = Term::atom(&mut arena, "foo");
        assert_eq!(a1, a2);
        if let Ok(View::Atom(name)) = a1.view(&arena) {
            assert_eq!(name, "foo");
        } else {
            panic!("wrong view");
        }
    }

    #[test]
    fn nil_is_the_empty_list_atom() {
        let mut arena = Arena::new();
        assert_eq!(arena.atom("[]"), Term::NIL);
        assert!(Term::NIL.is_list());
        assert!(Term::NIL.is_nil());
        assert!(!Term::NIL.is_func());
        assert_eq!(Term::NIL.kind_name(), "list");
        assert_eq!(Term::NIL.arity(), 0);
        match Term::NIL.view(&arena).unwrap() {
            View::List(_, elems) => assert!(elems.is_empty()),
            v => panic!("unexpected view {v:?}"),
        }
    }

    #[test]
    fn compound_construction_and_formatting() {
        let mut arena = Arena::new();
        let a = Term::int(1);
        let b = Term::real(2.0);
        let d = Term::atom(&mut arena, "hello");
        let e = Term::var(&mut arena, "Hello");
        let f = Term::str(&mut arena, "A str\ning. Longer string.");
        let g = list![d, e, f => &mut arena];
        let p = Term::func(&mut arena, "point", &[a, b, d, e, g]);
        let p = func![
            "foo";
            Term::NIL,
            p,
            list![],
            list![a, b],
            => &mut arena
        ];
        dbg!(&p);
        dbg!(p.view(&arena).unwrap());
        dbg!(arena.stats());
        assert!(p.is_func());
        if let Ok(View::Func(_, functor, args)) = p.view(&arena) {
            assert_eq!(functor.atom_name(&arena).unwrap(), "foo");
            assert_eq!(p.arity(), 4);
            assert_eq!(args.len(), 4);
        } else {
            panic!("unexpected view");
        }

        let s = format!("{}", p.display(&arena));
        assert_eq!(
            s,
            "foo([], point(1, 2.0, hello, Hello, [hello, Hello, \"A str\\ning. Longer string.\"]), [], [1, 2.0])"
        );
    }

    #[test]
    fn str_converts_to_atom() {
        let mut arena = Arena::new();
        let t = func!["f"; "abc", "a much longer atom name here" => &mut arena];
        let (_, [x, y]) = t.unpack_func(&arena, &["f"]).unwrap();
        assert_eq!(x.atom_name(&arena).unwrap(), "abc");
        assert_eq!(y.atom_name(&arena).unwrap(), "a much longer atom name here");
    }

    #[test]
    fn bigint_normalises_to_int() {
        let mut arena = Arena::new();
        let small = Term::bigint(&mut arena, &IBig::from(-42));
        assert_eq!(small, Term::int(-42));
        assert!(!small.is_bigint());

        let big = IBig::from_str("123456789012345678901234567890").unwrap();
        let t = Term::bigint(&mut arena, &big);
        assert!(t.is_bigint());
        assert!(t.is_int());
        assert_eq!(t.kind_name(), "bigint");
        assert_eq!(t.unpack_bigint(&arena).unwrap(), big);
        assert!(t.unpack_int(&arena).is_err());
        match t.view(&arena).unwrap() {
            View::BigInt(digits) => assert_eq!(digits, "123456789012345678901234567890"),
            v => panic!("unexpected view {v:?}"),
        }
    }

    #[test]
    fn bigint_at_i64_boundary() {
        let mut arena = Arena::new();
        let max = IBig::from(i64::MAX);
        assert_eq!(Term::bigint(&mut arena, &max), Term::int(i64::MAX));
        let over = max + IBig::from(1);
        let t = Term::bigint(&mut arena, &over);
        assert!(t.is_bigint());
        assert_eq!(t.display(&arena).to_string(), "9223372036854775808");
    }

    #[test]
    fn view_construction() {
        let mut a1 = Arena::new();
        let x = a1.atom("Hello, hello, quite long long string, world! X");
        dbg!(a1.view(&x).unwrap());
        dbg!(a1.stats());
        let p = list![x, x => &mut a1];
        dbg!(p);
        let v = a1.view(&p).unwrap();
        dbg!(v);
    }

    #[test]
    #[should_panic]
    fn arena_mismatch() {
        let a1 = Arena::new();
        let mut a2 = Arena::new();
        let y = a2.str("Hello, hello, quite long long string, world! Y");
        dbg!(a1.view(&y).unwrap());
    }

    #[test]
    #[should_panic]
    fn stale_term_str() {
        let mut a = Arena::new();
        let x = a.str("Hello, hello, quite long long string, world! Y");
        dbg!(&a);
        a.truncate(a.current_epoch()).unwrap();
        dbg!(a.view(&x).unwrap());
    }

    #[test]
    #[should_panic]
    fn stale_term_list() {
        let mut a = Arena::new();
        let _x = list![1, 2, 3 => &mut a];
        let epoch = a.begin_epoch().unwrap();
        dbg!(&epoch);
        let y = list![4, 5, 6 => &mut a];
        dbg!(&a);
        a.truncate(epoch).unwrap();
        dbg!(&a);
        dbg!(a.view(&y).unwrap());
    }

    #[test]
    fn big_term() {
        let mut a1 = Arena::new();
        let x = a1.atom("Hello, hello, quite long long string, world! X");
        let p = a1.func("foo", vec![x; 1_000_000]);
        assert!(p.arity() == 1_000_000);
        dbg!(a1.stats());
    }

    #[test]
    fn interface() {
        let a = &mut Arena::new();
        let s = String::from("x");
        let x1 = a.func(&s, &vec![Term::int(1000)]);
        let x2 = a.func(s.as_str(), vec![Term::int(1000)]);
        let x3 = a.func(s, &[Term::int(1000)]);
        let _x4 = a.func("x", [Term::int(1000)]);
        let _x5 = a.func("x", [x1, x2, x3]);
        let _x6 = a.func("x", (5..=6).map(|x| x as f64));
        let _x7 = a.func("x", vec![&x1, &x2, &x3]);
        let _x8 = a.func("x", &[x1, x2, x3]);
        let x9 = func!(
            String::from("aaa");
            x1, 1u8, 1i8, 2.0,
            "x",
            atom!("ATOM"),
            var!("Var"),
            IBig::from(7),
            unit!(),
            list![1, 2, 3],
            nil!(),
            => a
        );
        dbg!(a.view(&x9).unwrap());
        assert_eq!(x9.arity(), 11);
        dbg!(a.stats());
    }

    #[test]
    fn into_test() {
        let mut arena = Arena::new();
        // You can mix numbers and names; IntoTerm will pick the right constructor.
        let t1 = arena.term(1);
        let t2 = arena.term(2.0);
        let t3 = arena.term("x");
        let point1 = arena.func("point", [t1, t2, t3]);
        // Equivalent to:
        let t1 = Term::int(1);
        let t2 = Term::real(2.0);
        let t3 = Term::atom(&mut arena, "x");
        let point2 = arena.func("point", [t1, t2, t3]);
        assert_eq!(arena.view(&point1).unwrap(), arena.view(&point2).unwrap());

        // You can also provide closures returning Term.
        let lazy = Term::func(&mut arena, "lazy", [|arena: &mut Arena| arena.atom("ok")]);
        dbg!(arena.view(&lazy).unwrap());

        let list = arena.list([1, 2, 3]);
        assert_eq!(list.unpack_list(&arena).unwrap().len(), 3);
    }

    #[test]
    fn funcv() {
        let a = &mut Arena::new();
        let xs = [a.atom("foo"), a.atom("x"), a.atom("y")];
        let x = a.funcv(xs).unwrap();
        let ys = [a.atom("x"), a.atom("y")];
        let y = a.func("foo", ys);
        assert_eq!(x.arity(), y.arity());
        if let Ok(View::Func(_, functor, args)) = x.view(&a) {
            assert_eq!(functor.name(a).unwrap(), "foo");
            assert_eq!(args.len(), 2);
        }
        assert!(a.funcv([Term::int(1), Term::int(2)]).is_err());
        assert!(a.funcv(Vec::<Term>::new()).is_err());
    }

    #[test]
    fn arity_primitives_and_lists_are_zero() {
        let a = &mut Arena::new();

        let t_int = Term::int(42);
        let t_real = Term::real(3.14);
        let t_atom = Term::atom(a, "ok");
        let t_var = Term::var(a, "X");
        let t_str = Term::str(a, "hello");
        let t_list = Term::list(a, &[Term::int(1), Term::int(2), Term::int(3)]);

        assert_eq!(t_int.arity(), 0);
        assert_eq!(t_real.arity(), 0);
        assert_eq!(t_atom.arity(), 0);
        assert_eq!(t_var.arity(), 0);
        assert_eq!(t_str.arity(), 0);
        assert_eq!(t_list.arity(), 0);
    }

    #[test]
    fn arity_for_tuples_and_funcs() {
        let a = &mut Arena::new();

        let t2 = Term::tuple(a, &[Term::int(1), Term::int(2)]);
        assert_eq!(t2.arity(), 2);

        let f0 = Term::func(a, "nilary", &[] as &[Term]); // creates an atom `nilary`
        let f2 = Term::func(a, "pair", &[Term::int(1), Term::int(2)]);

        assert!(f0.is_atom());
        assert_eq!(f0.arity(), 0);
        assert_eq!(f2.arity(), 2);
    }

    #[test]
    fn name_and_kind_name() {
        let a = &mut Arena::new();

        let atom = Term::atom(a, "foo");
        let var = Term::var(a, "X");
        let fun = Term::func(a, "bar", &[Term::int(1)]);
        let tup = Term::tuple(a, &[Term::int(1), Term::int(2)]);
        let lst = Term::list(a, &[Term::int(1), Term::int(2), Term::int(3)]);

        assert_eq!(atom.name(&a).unwrap(), "foo");
        assert_eq!(var.name(&a).unwrap(), "X");
        assert_eq!(fun.name(&a).unwrap(), "bar");

        assert_eq!(atom.kind_name(), "atom");
        assert_eq!(var.kind_name(), "var");
        assert_eq!(fun.kind_name(), "func");
        assert_eq!(tup.kind_name(), "tuple");
        assert_eq!(lst.kind_name(), "list");
        assert_eq!(Term::int(7).kind_name(), "int");
        assert_eq!(Term::real(0.5).kind_name(), "real");
        assert_eq!(Term::str(a, "s").kind_name(), "str");
    }

    #[test]
    fn unpack_primitives() {
        let a = &mut Arena::new();

        let t_int = Term::int(42);
        let t_real = Term::real(3.5);
        let t_str = Term::str(a, "hello");

        assert_eq!(t_int.unpack_int(a).unwrap(), 42);
        assert_eq!(t_int.unpack_bigint(a).unwrap(), IBig::from(42));
        assert!((t_real.unpack_real(a).unwrap() - 3.5).abs() < f64::EPSILON);
        assert_eq!(t_str.unpack_str(a).unwrap(), "hello");

        assert!(t_str.unpack_int(a).is_err());
        assert!(t_int.unpack_real(a).is_err());
        assert!(t_int.unpack_str(a).is_err());
    }

    #[test]
    fn unpack_atom_and_var_with_allowed_names() {
        let a = &mut Arena::new();

        let at_ok = Term::atom(a, "foo");
        let at_no = Term::atom(a, "bar");
        let vr_ok = Term::var(a, "X");
        let vr_no = Term::var(a, "Y");

        let allowed_atoms = ["foo", "baz"];
        let allowed_vars = ["X", "Z"];

        assert_eq!(at_ok.unpack_atom(a, &allowed_atoms).unwrap(), "foo");
        assert!(at_no.unpack_atom(a, &allowed_atoms).is_err());

        assert_eq!(vr_ok.unpack_var(a, &allowed_vars).unwrap(), "X");
        assert!(vr_no.unpack_var(a, &allowed_vars).is_err());

        // Empty allowed_names means "any"
        assert_eq!(at_no.name(a).unwrap(), "bar");
        assert_eq!(vr_no.var_name(a).unwrap(), "Y");
    }

    #[test]
    fn unpack_func_any_and_arity_specific() {
        let a = &mut Arena::new();

        let f0 = Term::func(a, "nilary", &[] as &[Term]);
        let f2 = Term::func(a, "pair", &[Term::int(1), Term::int(2)]);
        let f3 = Term::func(a, "triple", &[Term::int(1), Term::int(2), Term::int(3)]);

        let (name, args) = f2.unpack_func_any(a, &["pair", "other"]).unwrap();
        assert_eq!(name.name(a).unwrap(), "pair");
        assert_eq!(args.len(), 2);

        let (name0, args0) = f0.unpack_func_any(a, &[]).unwrap();
        assert_eq!(name0.name(a).unwrap(), "nilary");
        assert!(args0.is_empty());

        assert!(f3.unpack_func_any(a, &["not_triple"]).is_err());

        let (name2, [x, y]) = f2.unpack_func(a, &["pair"]).unwrap();
        assert_eq!(name2.name(a).unwrap(), "pair");
        assert_eq!(x.unpack_int(a).unwrap(), 1);
        assert_eq!(y.unpack_int(a).unwrap(), 2);
        assert!(f3.unpack_func::<2>(a, &["triple"]).is_err());
    }

    #[test]
    fn unpack_list_and_tuple() {
        let a = &mut Arena::new();

        let l0 = Term::list(a, &[] as &[Term]);
        assert_eq!(l0, Term::NIL);
        assert!(l0.unpack_list(a).unwrap().is_empty());

        let l3 = Term::list(a, &[Term::int(1), Term::int(2), Term::int(3)]);
        let elems3 = l3.unpack_list(a).unwrap();
        assert_eq!(elems3.len(), 3);
        assert_eq!(elems3[2].unpack_int(a).unwrap(), 3);
        assert!(Term::int(9).unpack_list(a).is_err());

        let t3 = Term::tuple(a, &[Term::int(1), Term::int(2), Term::int(3)]);
        assert_eq!(t3.unpack_tuple_any(a).unwrap().len(), 3);
        assert!(t3.unpack_tuple::<2>(a).is_err());
        assert!(Term::UNIT.unpack_tuple_any(a).unwrap().is_empty());
    }
}
