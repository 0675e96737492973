//! Term evaluation against decoded entities
//!
//! Applies an ordered term list to an instance map with AND semantics,
//! short-circuiting on the first non-matching term. Each term compares the
//! instance value against its literal with target-typed coercion:
//!
//! - INTEGER / DECIMAL: instance value coerced through its string rendering
//!   into the arbitrary-precision target type; a value that will not coerce
//!   simply fails the term
//! - STRING: lexicographic comparison of the rendered instance value
//! - REFERENCE: like STRING, but only eq/ne are meaningful — ordering a
//!   reference is a programmer error, not a non-match
//! - BOOLEAN: parsed boolean comparison
//! - NULL: equal only to an absent (or null) instance value
//!
//! `In` terms have no semantics here; the surrounding store's index backend
//! may translate them, but this evaluator rejects them outright.

use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::str::FromStr;

use super::ast::{Literal, QueryOperator, QueryTerm};
use super::errors::{QueryError, QueryResult};

/// Evaluates term lists against instance maps.
pub struct QueryEvaluator;

impl QueryEvaluator {
    /// True only if every term matches, in the supplied order.
    ///
    /// A term that fails to evaluate (unsupported operator, misbuilt term)
    /// is treated as a non-match; use `try_matches` to surface the error.
    pub fn matches(instance: &Map<String, Value>, terms: &[QueryTerm]) -> bool {
        terms.iter().all(|term| match Self::evaluate(instance, term) {
            Ok(matched) => matched,
            Err(error) => {
                tracing::debug!(
                    target: "query",
                    field = term.field(),
                    error = %error,
                    "term evaluation rejected"
                );
                false
            }
        })
    }

    /// Like `matches`, but propagates evaluation errors instead of folding
    /// them into a non-match.
    pub fn try_matches(instance: &Map<String, Value>, terms: &[QueryTerm]) -> QueryResult<bool> {
        for term in terms {
            if !Self::evaluate(instance, term)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluates a single term against an instance.
    pub fn evaluate(instance: &Map<String, Value>, term: &QueryTerm) -> QueryResult<bool> {
        if term.operator() == QueryOperator::In {
            return Err(QueryError::UnsupportedOperator(QueryOperator::In));
        }

        let holder = term.value()?;
        let actual = instance.get(term.field()).filter(|v| !v.is_null());

        // A NULL target compares equal exactly when the value is absent.
        if let Literal::Null = holder.value() {
            let sign = if actual.is_none() {
                Ordering::Equal
            } else {
                Ordering::Greater
            };
            return Ok(sign_matches(term.operator(), sign));
        }

        let Some(actual) = actual else {
            return Ok(false);
        };

        let sign = match holder.value() {
            Literal::Integer(target) => {
                match BigInt::from_str(&render(actual)) {
                    Ok(value) => value.cmp(target),
                    Err(_) => return Ok(false), // non-numeric value never matches
                }
            }
            Literal::Decimal(target) => match Decimal::from_str(&render(actual)) {
                Ok(value) => value.cmp(target),
                Err(_) => return Ok(false),
            },
            Literal::String(target) => render(actual).as_str().cmp(target.as_str()),
            Literal::Reference(target) => {
                if !matches!(term.operator(), QueryOperator::Eq | QueryOperator::Ne) {
                    return Err(QueryError::UnsupportedOperator(term.operator()));
                }
                render(actual).as_str().cmp(target.as_str())
            }
            Literal::Boolean(target) => match parse_bool(actual) {
                Some(value) => value.cmp(target),
                None => return Ok(false),
            },
            Literal::Null => Ordering::Equal, // handled above
        };

        Ok(sign_matches(term.operator(), sign))
    }
}

/// Maps a comparison sign to the operator's verdict.
fn sign_matches(operator: QueryOperator, sign: Ordering) -> bool {
    match operator {
        QueryOperator::Eq => sign == Ordering::Equal,
        QueryOperator::Ne => sign != Ordering::Equal,
        QueryOperator::Gt => sign == Ordering::Greater,
        QueryOperator::Ge => sign != Ordering::Less,
        QueryOperator::Lt => sign == Ordering::Less,
        QueryOperator::Le => sign != Ordering::Greater,
        QueryOperator::In => false,
    }
}

/// Renders an instance value for cross-type comparison.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{ValueHolder, ValueHolderList};
    use crate::query::parser::parse_query;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_string_instance_vs_integer_target() {
        let instance = object(json!({"a": "1"}));
        for (query, expected) in [
            ("a eq 1", true),
            ("a ge 1", true),
            ("a le 1", true),
            ("a ne 1", false),
            ("a gt 1", false),
            ("a lt 1", false),
        ] {
            let terms = parse_query(query).unwrap();
            assert_eq!(
                QueryEvaluator::matches(&instance, &terms),
                expected,
                "{query}"
            );
        }
    }

    #[test]
    fn test_lexicographic_string_comparison() {
        let instance = object(json!({"s": "bbb"}));
        for (query, expected) in [
            (r#"s gt "aaa""#, true),
            (r#"s ge "aaa""#, true),
            (r#"s ne "aaa""#, true),
            (r#"s eq "aaa""#, false),
            (r#"s lt "aaa""#, false),
            (r#"s le "aaa""#, false),
        ] {
            let terms = parse_query(query).unwrap();
            assert_eq!(
                QueryEvaluator::matches(&instance, &terms),
                expected,
                "{query}"
            );
        }
    }

    #[test]
    fn test_decimal_coercion_via_string_round_trip() {
        let instance = object(json!({"d": "2.50"}));
        let terms = parse_query("d eq 2.5").unwrap();
        assert!(QueryEvaluator::matches(&instance, &terms));
    }

    #[test]
    fn test_non_numeric_value_fails_numeric_term() {
        let instance = object(json!({"a": "not a number"}));
        let terms = parse_query("a eq 1").unwrap();
        // Fails the term rather than erroring.
        assert!(!QueryEvaluator::matches(&instance, &terms));
        assert_eq!(QueryEvaluator::try_matches(&instance, &terms), Ok(false));
    }

    #[test]
    fn test_absent_value_fails_non_null_target() {
        let instance = object(json!({"other": 1}));
        let terms = parse_query("a eq 1").unwrap();
        assert!(!QueryEvaluator::matches(&instance, &terms));
    }

    #[test]
    fn test_null_target_matches_absent_and_explicit_null() {
        let terms = parse_query("a eq null").unwrap();
        assert!(QueryEvaluator::matches(&object(json!({})), &terms));
        assert!(QueryEvaluator::matches(&object(json!({"a": null})), &terms));
        assert!(!QueryEvaluator::matches(&object(json!({"a": 1})), &terms));

        // ne null: present values only
        let terms = parse_query("a ne null").unwrap();
        assert!(QueryEvaluator::matches(&object(json!({"a": 1})), &terms));
        assert!(!QueryEvaluator::matches(&object(json!({})), &terms));
    }

    #[test]
    fn test_boolean_comparison() {
        let instance = object(json!({"flag": true}));
        assert!(QueryEvaluator::matches(
            &instance,
            &parse_query("flag eq true").unwrap()
        ));
        assert!(!QueryEvaluator::matches(
            &instance,
            &parse_query("flag eq false").unwrap()
        ));

        // "true" string coerces
        let instance = object(json!({"flag": "true"}));
        assert!(QueryEvaluator::matches(
            &instance,
            &parse_query("flag eq true").unwrap()
        ));
    }

    #[test]
    fn test_reference_equality_only() {
        let instance = object(json!({"owner": "user_7"}));
        assert!(QueryEvaluator::matches(
            &instance,
            &parse_query("owner eq user_7").unwrap()
        ));
        assert!(QueryEvaluator::matches(
            &instance,
            &parse_query("owner ne user_8").unwrap()
        ));

        // Ordering a reference is an error, not a non-match.
        let terms = parse_query("owner gt user_1").unwrap();
        assert_eq!(
            QueryEvaluator::try_matches(&instance, &terms),
            Err(QueryError::UnsupportedOperator(QueryOperator::Gt))
        );
        // matches() folds the error into false.
        assert!(!QueryEvaluator::matches(&instance, &terms));
    }

    #[test]
    fn test_and_semantics_short_circuit() {
        let instance = object(json!({"a": 1, "b": 2}));
        assert!(QueryEvaluator::matches(
            &instance,
            &parse_query("a eq 1 and b eq 2").unwrap()
        ));
        assert!(!QueryEvaluator::matches(
            &instance,
            &parse_query("a eq 1 and b eq 3").unwrap()
        ));
        assert!(!QueryEvaluator::matches(
            &instance,
            &parse_query("a eq 9 and b eq 2").unwrap()
        ));
    }

    #[test]
    fn test_empty_term_list_matches_everything() {
        assert!(QueryEvaluator::matches(&object(json!({})), &[]));
    }

    #[test]
    fn test_in_is_unsupported_in_evaluation() {
        let list = ValueHolderList::new(vec![ValueHolder::integer(1)]).unwrap();
        let term = QueryTerm::in_list("a", list);
        let instance = object(json!({"a": 1}));

        assert_eq!(
            QueryEvaluator::evaluate(&instance, &term),
            Err(QueryError::UnsupportedOperator(QueryOperator::In))
        );
        assert!(!QueryEvaluator::matches(&instance, &[term]));
    }

    #[test]
    fn test_numeric_instance_vs_string_target() {
        // Numbers render to their decimal text for string targets.
        let instance = object(json!({"n": 42}));
        let terms = parse_query(r#"n eq "42""#).unwrap();
        assert!(QueryEvaluator::matches(&instance, &terms));
    }
}
