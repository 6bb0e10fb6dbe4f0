//! # Prolog Terms
//!
//! A lightweight, arena-backed representation of Prolog terms.
//!
//! This crate provides a compact [`Term`] type for representing Prolog
//! data structures, along with a typed arena [`Arena`] used to
//! intern atoms, variables, strings, big integers and compound terms.  The
//! underlying representation is designed around a fixed‐width 16
//! byte handle which carries both the tag and value of a term.
//!
//! Terms are immutable once built.  They are produced by parsers and
//! AST translators and consumed by the fastrw encoders in the
//! `prolog-fastrw` crate, which turn them into the binary formats read by
//! SICStus and SWI-Prolog.  Lists are stored as flattened slices of
//! elements; the encoders rebuild the nested cons structure on the wire.
//!
//! ## Example
//! ```rust
//! # use prolog_terms::{Arena, func, IntoTerm, list, var, View};
//! let mut arena = Arena::new();
//!
//! let a = arena.atom("machine");
//! let xs = arena.list((0..1_000).map(|x| x as i64));
//!
//! let term = func![
//!     "clause";
//!     a,
//!     list![a, xs],
//!     var!("X"),
//!     => &mut arena
//! ];
//!
//! if let Ok(View::Func(ar, functor, args)) = term.view(&arena) {
//!     assert_eq!(functor.name(ar).unwrap(), "clause");
//!     assert_eq!(args.len(), 3);
//!     match args[1].view(ar).unwrap() {
//!         View::List(_, elems) => assert_eq!(elems.len(), 2),
//!         _ => unreachable!(),
//!     }
//! }
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod arena;
mod display;
mod error;
mod term;
mod view;

pub use arena::{Arena, ArenaID, ArenaStats, EpochID, MAX_LIVE_EPOCHS};
pub use dashu::integer::IBig;
pub use display::TermDisplay;
pub(crate) use error::InternalTermError;
pub use error::TermError;
pub(crate) use term::{Handle, Slice, TinyArray};
pub use term::{IntoTerm, Term};
pub use view::View;
