//! A JSON term producer.
//!
//! [`emit`] walks a [`serde_json::Value`] and drives any [`TermOutput`]:
//!
//! | JSON                               | term                |
//! |------------------------------------|---------------------|
//! | `42`                               | integer             |
//! | `1.5`                              | float               |
//! | `"abc"`                            | atom `abc`          |
//! | `[a, b]`                           | list                |
//! | `{"var": "X"}`                     | variable `X`        |
//! | `{"atom": "a"}`                    | atom `a`            |
//! | `{"int": "123456789012345678901"}` | integer of any size |
//! | `{"float": 1.0}`                   | float               |
//! | `{"func": "f", "args": [..]}`      | compound `f(..)`    |

use crate::{bail_json, FastrwError, TermBuilder, TermOutput};
use dashu::integer::IBig;
use prolog_terms::{Arena, Term};
use serde_json::{Map, Number, Value};
use std::str::FromStr;

enum Step<'v> {
    Value(&'v Value),
    CloseTerm,
    CloseList,
}

/// Emit `value` as one term (without the closing `full_stop`).
pub fn emit<O: TermOutput>(value: &Value, out: &mut O) -> Result<(), FastrwError> {
    let mut steps = vec![Step::Value(value)];
    while let Some(step) = steps.pop() {
        let value = match step {
            Step::Value(v) => v,
            Step::CloseTerm => {
                out.close_term()?;
                continue;
            }
            Step::CloseList => {
                out.close_list()?;
                continue;
            }
        };
        match value {
            Value::Number(n) => {
                emit_number(n, out)?;
            }
            Value::String(s) => {
                out.print_atom(s)?;
            }
            Value::Array(items) if items.is_empty() => {
                out.empty_list()?;
            }
            Value::Array(items) => {
                out.open_list()?;
                steps.push(Step::CloseList);
                steps.extend(items.iter().rev().map(Step::Value));
            }
            Value::Object(map) => {
                if let Some(args) = emit_object(map, out)? {
                    steps.push(Step::CloseTerm);
                    steps.extend(args.iter().rev().map(Step::Value));
                }
            }
            Value::Null | Value::Bool(_) => bail_json!("no term for {value}"),
        }
    }
    Ok(())
}

fn emit_number<O: TermOutput>(n: &Number, out: &mut O) -> Result<(), FastrwError> {
    if let Some(i) = n.as_i64() {
        out.print_int(i)?;
    } else if let Some(u) = n.as_u64() {
        out.print_bigint(&IBig::from(u))?;
    } else if let Some(f) = n.as_f64() {
        out.print_float(f)?;
    } else {
        bail_json!("unrepresentable number {n}");
    }
    Ok(())
}

/// Emits a tagged object.  For a compound with arguments it opens the term
/// and returns the arguments still to be walked.
fn emit_object<'v, O: TermOutput>(
    map: &'v Map<String, Value>,
    out: &mut O,
) -> Result<Option<&'v [Value]>, FastrwError> {
    if let Some(functor) = map.get("func") {
        let Value::String(functor) = functor else {
            bail_json!("functor must be a string, found {functor}");
        };
        let args = match map.get("args") {
            None => &[][..],
            Some(Value::Array(args)) => &args[..],
            Some(other) => bail_json!("args must be an array, found {other}"),
        };
        if map.len() > 1 + usize::from(map.contains_key("args")) {
            bail_json!("unexpected keys in compound {}", Value::Object(map.clone()));
        }
        if args.is_empty() {
            out.print_atom(functor)?;
            return Ok(None);
        }
        out.open_term(functor)?;
        return Ok(Some(args));
    }
    let mut entries = map.iter();
    let (Some((key, value)), None) = (entries.next(), entries.next()) else {
        bail_json!("expected one tag, found {}", Value::Object(map.clone()));
    };
    match (key.as_str(), value) {
        ("var", Value::String(name)) => {
            out.print_var(name)?;
        }
        ("atom", Value::String(name)) => {
            out.print_atom(name)?;
        }
        ("int", Value::String(digits)) => {
            let i = IBig::from_str(digits)
                .map_err(|_| FastrwError::Json(format!("invalid integer {digits:?}").into()))?;
            out.print_bigint(&i)?;
        }
        ("int", Value::Number(n)) if n.is_i64() || n.is_u64() => emit_number(n, out)?,
        ("float", Value::Number(n)) => {
            let Some(f) = n.as_f64() else {
                bail_json!("invalid float {n}");
            };
            out.print_float(f)?;
        }
        _ => bail_json!("unknown tag {key:?} with {value}"),
    }
    Ok(None)
}

/// Build the term described by `value` in `arena`.
pub fn to_term(value: &Value, arena: &mut Arena) -> Result<Term, FastrwError> {
    let mut builder = TermBuilder::new(arena);
    emit(value, &mut builder)?;
    builder.full_stop()?;
    builder
        .into_terms()
        .pop()
        .ok_or(FastrwError::Unsupported("empty sentence"))
}
