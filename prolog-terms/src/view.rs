//! Defines [`View`], a borrowed read-only representation of a [`Term`].
//!
//! Provides lightweight accessors for inspecting terms without allocation.

use crate::{Arena, Handle, Slice, Term, TermError, TinyArray};
use core::fmt;
use std::cmp::Ordering;

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            View::Int(i) => f.debug_tuple("Int").field(&i).finish(),
            View::BigInt(d) => f.debug_tuple("BigInt").field(&d).finish(),
            View::Real(r) => f.debug_tuple("Real").field(&r).finish(),
            View::Var(v) => f.debug_tuple("Var").field(&v).finish(),
            View::Atom(a) => f.debug_tuple("Atom").field(&a).finish(),
            View::Str(s) => f.debug_tuple("Str").field(&s).finish(),
            View::Func(a, fr, ts) => f
                .debug_tuple("Func")
                .field(&a.arena_id)
                .field(&fr)
                .field(&ts.iter().map(|t| t.view(a)).collect::<Vec<_>>())
                .finish(),
            View::List(a, ts) => f
                .debug_tuple("List")
                .field(&a.arena_id)
                .field(&ts.iter().map(|t| t.view(a)).collect::<Vec<_>>())
                .finish(),
            View::Tuple(a, ts) => f
                .debug_tuple("Tuple")
                .field(&a.arena_id)
                .field(&ts.iter().map(|t| t.view(a)).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A borrowed view into the interned contents of a [`Term`].
///
/// Use [`Term::view`] to obtain a view.  Each variant of [`View`]
/// represents the decoded form of a term and borrows any data
/// referenced from the [`Arena`] or the term handle itself.  No
/// allocations are performed when constructing a `View`; instead
/// references into the underlying storage are returned directly.  The
/// lifetime `'a` binds the returned references to both the borrowed
/// `Term` and the supplied `Arena`.
#[derive(Clone, Copy)]
pub enum View<'a> {
    /// An integer value in the `i64` range.
    Int(i64),
    /// An integer outside the `i64` range, as its decimal digits
    /// (with a leading `-` when negative).
    BigInt(&'a str),
    /// A floating point value.
    Real(f64),
    /// A variable name borrowed from the term or arena.
    Var(&'a str),
    /// An atom name borrowed from the term or arena.
    Atom(&'a str),
    /// A UTF‑8 string borrowed from the term or arena.
    Str(&'a str),
    /// A compound term view containing the functor atom and a slice
    /// of arguments (never empty).  Both the functor and the argument
    /// slice are borrowed; the arguments themselves are `Term` handles
    /// owned by the arena.
    Func(&'a Arena, &'a Term, &'a [Term]),
    /// A proper list view containing the slice of its elements.  The
    /// empty list views as `List` with an empty slice.
    List(&'a Arena, &'a [Term]),
    /// A tuple view containing a slice of the tuple elements.
    Tuple(&'a Arena, &'a [Term]),
}

#[inline]
fn tiny_str(t: &TinyArray) -> &str {
    // Inline names are only ever built from `&str`.
    unsafe { core::str::from_utf8_unchecked(&t.bytes[..t.len as usize]) }
}

impl Term {
    /// Produce a [`View`] of this term that borrows from the given
    /// [`Arena`].  This method decodes any inlined bytes and
    /// dereferences indexes into the arena to yield structured
    /// references.  See [`View`] for details.
    #[inline]
    pub fn view<'a>(&'a self, arena: &'a Arena) -> Result<View<'a>, TermError> {
        let text = |slice: &Slice| -> Result<&'a str, TermError> {
            let bytes = arena
                .byte_slice(slice)
                .map_err(|_| TermError::InvalidTerm(*self))?;
            Ok(unsafe { core::str::from_utf8_unchecked(bytes) })
        };
        let terms = |slice: &Slice| {
            arena
                .term_slice(slice)
                .map_err(|_| TermError::InvalidTerm(*self))
        };
        match &self.0 {
            Handle::Int(i) => Ok(View::Int(*i)),
            Handle::BigIntRef(br) => Ok(View::BigInt(text(br)?)),
            Handle::Real(f) => Ok(View::Real(*f)),
            Handle::Var(vs) => Ok(View::Var(tiny_str(vs))),
            Handle::VarRef(vr) => Ok(View::Var(text(vr)?)),
            Handle::Atom(_) if *self == Term::NIL => Ok(View::List(arena, &[])),
            Handle::Atom(a) => Ok(View::Atom(tiny_str(a))),
            Handle::AtomRef(ar) => Ok(View::Atom(text(ar)?)),
            Handle::Str(ss) => Ok(View::Str(tiny_str(ss))),
            Handle::StrRef(sr) => Ok(View::Str(text(sr)?)),
            Handle::FuncRef(fr) => {
                let slice = terms(fr)?;
                // Functor is the first element of the slice
                Ok(View::Func(arena, &slice[0], &slice[1..]))
            }
            Handle::ListRef(lr) => Ok(View::List(arena, terms(lr)?)),
            Handle::TupleRef(tr) => Ok(View::Tuple(arena, terms(tr)?)),
        }
    }
}

impl Arena {
    /// Produce a [`View`] of the given `term` that borrows from
    /// this [`Arena`].  See [`View`] for details.
    #[inline]
    pub fn view<'a>(&'a self, term: &'a Term) -> Result<View<'a>, TermError> {
        term.view(self)
    }
}

fn views_cmp(arena_a: &Arena, a: &[Term], arena_b: &Arena, b: &[Term]) -> Ordering {
    let ord = a.len().cmp(&b.len());
    if ord != Ordering::Equal {
        return ord;
    }
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x
            .view(arena_a)
            .expect("arena mismatch")
            .cmp(&y.view(arena_b).expect("arena mismatch"));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl<'a> PartialEq for View<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<'a> Eq for View<'a> {}

impl core::cmp::PartialOrd for View<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl core::cmp::Ord for View<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let order_a = kind_order(self);
        let order_b = kind_order(other);
        if order_a != order_b {
            return order_a.cmp(&order_b);
        }
        match (self, other) {
            (View::BigInt(a), View::BigInt(b)) => cmp_digits(a, b),
            // Numbers: compare by numeric value irrespective of the exact type.
            (
                View::Int(_) | View::BigInt(_) | View::Real(_),
                View::Int(_) | View::BigInt(_) | View::Real(_),
            ) => numeric_value(self).total_cmp(&numeric_value(other)),
            (View::Var(a), View::Var(b)) => a.cmp(b),
            (View::Atom(a), View::Atom(b)) => a.cmp(b),
            (View::Str(a), View::Str(b)) => a.cmp(b),
            // Compounds: compare by arity, then name, then arguments.
            (View::Func(arena_a, functor_a, args_a), View::Func(arena_b, functor_b, args_b)) => {
                let ord = args_a.len().cmp(&args_b.len());
                if ord != Ordering::Equal {
                    return ord;
                }
                let ord = functor_a
                    .view(arena_a)
                    .expect("arena mismatch")
                    .cmp(&functor_b.view(arena_b).expect("arena mismatch"));
                if ord != Ordering::Equal {
                    return ord;
                }
                views_cmp(arena_a, args_a, arena_b, args_b)
            }
            (View::List(arena_a, a), View::List(arena_b, b))
            | (View::Tuple(arena_a, a), View::Tuple(arena_b, b)) => views_cmp(arena_a, a, arena_b, b),
            _ => unreachable!(),
        }
    }
}

/// Compute the kind order used for comparing terms of different kinds.
/// According to Prolog standard order: variables < numbers < atoms < strings
/// < compounds.
fn kind_order(t: &View) -> u8 {
    match t {
        View::Var(_) => 0,
        View::Int(_) | View::BigInt(_) | View::Real(_) => 1,
        View::Atom(_) => 4,
        View::Str(_) => 5,
        View::Func(_, _, _) => 6,
        View::Tuple(_, _) => 7,
        View::List(_, _) => 8,
    }
}

/// Extract a numeric value from a term for ordering purposes.  All
/// numeric kinds are converted to `f64` for comparison.
fn numeric_value(t: &View) -> f64 {
    match t {
        View::Int(i) => *i as f64,
        View::BigInt(d) => d.parse().unwrap_or(f64::NAN),
        View::Real(f) => *f,
        _ => unreachable!(),
    }
}

/// Orders two decimal digit strings by value without parsing them.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    match (a.strip_prefix('-'), b.strip_prefix('-')) {
        (Some(a), Some(b)) => cmp_magnitude(b, a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => cmp_magnitude(a, b),
    }
}

fn cmp_magnitude(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
