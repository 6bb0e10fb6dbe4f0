//! Defines [`TermOutput`], the term construction protocol.
//!
//! A producer describes each sentence as a well-bracketed sequence of
//! calls: `open_term` / `open_list` push a context, leaf prints add an
//! argument to the innermost context, `close_term` / `close_list` pop it and
//! `full_stop` ends the sentence.  Encoders consume the calls and emit their
//! wire format as they go.

use crate::FastrwError;
use dashu::integer::IBig;
use prolog_terms::{Arena, Term, View};

/// Event-driven sink for Prolog terms.
///
/// Every method returns `&mut Self` so calls chain with `?`:
/// ```rust
/// # use prolog_fastrw::{SicstusOutput, TermOutput, FastrwError};
/// # fn main() -> Result<(), FastrwError> {
/// let mut out = SicstusOutput::new(Vec::new());
/// out.open_term("a")?.print_atom("b")?.close_term()?.full_stop()?;
/// assert_eq!(out.get_ref().as_slice(), b"DSa\0\x01Ab\0");
/// # Ok(()) }
/// ```
pub trait TermOutput {
    /// Start a compound term.  It stays an atom if no argument follows
    /// before the matching [`TermOutput::close_term`].
    fn open_term(&mut self, functor: &str) -> Result<&mut Self, FastrwError>;

    /// Finish the innermost compound term.
    fn close_term(&mut self) -> Result<&mut Self, FastrwError>;

    /// Start a proper list.
    fn open_list(&mut self) -> Result<&mut Self, FastrwError>;

    /// Finish the innermost list.
    fn close_list(&mut self) -> Result<&mut Self, FastrwError>;

    /// Print `[]`.
    fn empty_list(&mut self) -> Result<&mut Self, FastrwError> {
        self.open_list()?.close_list()
    }

    fn print_atom(&mut self, name: &str) -> Result<&mut Self, FastrwError>;

    fn print_int(&mut self, value: i64) -> Result<&mut Self, FastrwError>;

    /// Print an integer of any size.  Values in the `i64` range go through
    /// [`TermOutput::print_int`].
    fn print_bigint(&mut self, value: &IBig) -> Result<&mut Self, FastrwError>;

    fn print_float(&mut self, value: f64) -> Result<&mut Self, FastrwError>;

    /// Print a variable.  Equal names within one sentence denote the same
    /// variable.
    fn print_var(&mut self, name: &str) -> Result<&mut Self, FastrwError>;

    /// End the sentence and hand it to the underlying sink.
    ///
    /// Fails with [`FastrwError::Unbalanced`] when terms or lists are still
    /// open; the partial sentence is discarded.
    fn full_stop(&mut self) -> Result<&mut Self, FastrwError>;

    /// Flush the underlying sink.
    fn flush(&mut self) -> Result<&mut Self, FastrwError>;

    /// Drive the protocol from an already built term.
    ///
    /// The walk uses an explicit stack, so very long lists and deeply
    /// nested terms do not grow the call stack.  Strings and tuples have
    /// no fastrw encoding and fail with [`FastrwError::UnsupportedTerm`].
    fn print_term(&mut self, term: &Term, arena: &Arena) -> Result<&mut Self, FastrwError> {
        enum Step {
            Term(Term),
            CloseTerm,
            CloseList,
        }

        let mut steps = vec![Step::Term(*term)];
        while let Some(step) = steps.pop() {
            let t = match step {
                Step::Term(t) => t,
                Step::CloseTerm => {
                    self.close_term()?;
                    continue;
                }
                Step::CloseList => {
                    self.close_list()?;
                    continue;
                }
            };
            match t.view(arena)? {
                View::Int(i) => {
                    self.print_int(i)?;
                }
                View::BigInt(_) => {
                    self.print_bigint(&t.unpack_bigint(arena)?)?;
                }
                View::Real(r) => {
                    self.print_float(r)?;
                }
                View::Atom(name) => {
                    self.print_atom(name)?;
                }
                View::Var(name) => {
                    self.print_var(name)?;
                }
                View::List(_, []) => {
                    self.empty_list()?;
                }
                View::List(_, elems) => {
                    self.open_list()?;
                    steps.push(Step::CloseList);
                    steps.extend(elems.iter().rev().map(|e| Step::Term(*e)));
                }
                View::Func(ar, functor, args) => {
                    self.open_term(ar.atom_name(functor)?)?;
                    steps.push(Step::CloseTerm);
                    steps.extend(args.iter().rev().map(|a| Step::Term(*a)));
                }
                View::Str(_) | View::Tuple(_, _) => {
                    return Err(FastrwError::UnsupportedTerm(t.kind_name()));
                }
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolog_terms::{func, list, var, IntoTerm};

    /// Records protocol calls as text.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl Trace {
        fn log(&mut self, s: String) -> Result<&mut Self, FastrwError> {
            self.0.push(s);
            Ok(self)
        }
    }

    impl TermOutput for Trace {
        fn open_term(&mut self, functor: &str) -> Result<&mut Self, FastrwError> {
            self.log(format!("open {functor}"))
        }
        fn close_term(&mut self) -> Result<&mut Self, FastrwError> {
            self.log("close".into())
        }
        fn open_list(&mut self) -> Result<&mut Self, FastrwError> {
            self.log("[".into())
        }
        fn close_list(&mut self) -> Result<&mut Self, FastrwError> {
            self.log("]".into())
        }
        fn print_atom(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
            self.log(format!("atom {name}"))
        }
        fn print_int(&mut self, value: i64) -> Result<&mut Self, FastrwError> {
            self.log(format!("int {value}"))
        }
        fn print_bigint(&mut self, value: &IBig) -> Result<&mut Self, FastrwError> {
            self.log(format!("bigint {value}"))
        }
        fn print_float(&mut self, value: f64) -> Result<&mut Self, FastrwError> {
            self.log(format!("float {value}"))
        }
        fn print_var(&mut self, name: &str) -> Result<&mut Self, FastrwError> {
            self.log(format!("var {name}"))
        }
        fn full_stop(&mut self) -> Result<&mut Self, FastrwError> {
            self.log(".".into())
        }
        fn flush(&mut self) -> Result<&mut Self, FastrwError> {
            Ok(self)
        }
    }

    #[test]
    fn print_term_walks_in_order() {
        let mut arena = Arena::new();
        let t = func!["f"; var!("X"), list![1, "a", list![]], 2.5 => &mut arena];
        let mut out = Trace::default();
        out.print_term(&t, &arena).unwrap().full_stop().unwrap();
        assert_eq!(
            out.0,
            [
                "open f", "var X", "[", "int 1", "atom a", "[", "]", "]", "float 2.5", "close",
                "."
            ]
        );
    }

    #[test]
    fn print_term_rejects_strings_and_tuples() {
        let mut arena = Arena::new();
        let s = arena.str("text");
        let t = arena.tuple([1, 2]);
        let mut out = Trace::default();
        assert!(matches!(
            out.print_term(&s, &arena),
            Err(FastrwError::UnsupportedTerm("str"))
        ));
        assert!(matches!(
            out.print_term(&t, &arena),
            Err(FastrwError::UnsupportedTerm("tuple"))
        ));
    }

    #[test]
    fn print_term_handles_long_lists() {
        let mut arena = Arena::new();
        let t = arena.list((0..100_000).map(|i| i as i64));
        let mut out = Trace::default();
        out.print_term(&t, &arena).unwrap();
        assert_eq!(out.0.len(), 100_002);
    }

    #[test]
    fn print_term_rejects_stale_terms() {
        let mut arena = Arena::new();
        let epoch = arena.begin_epoch().unwrap();
        let t = arena.func("f", [1]);
        arena.truncate(epoch).unwrap();
        let mut out = Trace::default();
        assert!(matches!(
            out.print_term(&t, &arena),
            Err(FastrwError::Term(_))
        ));
    }
}
