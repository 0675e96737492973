//! Query term model
//!
//! A parsed query is an ordered list of `QueryTerm`s, each a
//! field/operator/literal comparison. Terms are value objects: built by the
//! parser or programmatically, never mutated, shared freely.
//!
//! `In` terms carry a `ValueHolderList` instead of a single `ValueHolder`;
//! they can be built and transported but the in-memory evaluator does not
//! define semantics for them (the surrounding store's index backend may).

use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::fmt;

use super::errors::{QueryError, QueryResult};

/// Comparison operators.
///
/// The six comparators have surface keywords in the query grammar; `In` is
/// builder-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
}

impl QueryOperator {
    /// Grammar keyword for this operator
    pub fn keyword(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "eq",
            QueryOperator::Ne => "ne",
            QueryOperator::Gt => "gt",
            QueryOperator::Ge => "ge",
            QueryOperator::Lt => "lt",
            QueryOperator::Le => "le",
            QueryOperator::In => "in",
        }
    }

    /// Operator for a comparator keyword. `in` has no surface form and
    /// returns `None` like any other unknown word.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "eq" => Some(QueryOperator::Eq),
            "ne" => Some(QueryOperator::Ne),
            "gt" => Some(QueryOperator::Gt),
            "ge" => Some(QueryOperator::Ge),
            "lt" => Some(QueryOperator::Lt),
            "le" => Some(QueryOperator::Le),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Type tag of a parsed literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Decimal,
    Integer,
    String,
    Boolean,
    Reference,
    Null,
}

/// Parsed literal payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Arbitrary-precision decimal (literal with a fractional part)
    Decimal(Decimal),
    /// Arbitrary-precision integer
    Integer(BigInt),
    /// Unquoted, unescaped string
    String(String),
    Boolean(bool),
    /// Unquoted reference token; only eq/ne are meaningful
    Reference(String),
    Null,
}

impl Literal {
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::Decimal(_) => ValueType::Decimal,
            Literal::Integer(_) => ValueType::Integer,
            Literal::String(_) => ValueType::String,
            Literal::Boolean(_) => ValueType::Boolean,
            Literal::Reference(_) => ValueType::Reference,
            Literal::Null => ValueType::Null,
        }
    }
}

/// One typed literal with its original surface text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueHolder {
    text: String,
    value: Literal,
}

impl ValueHolder {
    /// Build from surface text and its parsed value (parser entry point)
    pub fn new(text: impl Into<String>, value: Literal) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }

    /// String literal; the surface text is quoted and escaped
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: quote(&value),
            value: Literal::String(value),
        }
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        let value = value.into();
        Self {
            text: value.to_string(),
            value: Literal::Integer(value),
        }
    }

    pub fn decimal(value: Decimal) -> Self {
        Self {
            text: value.to_string(),
            value: Literal::Decimal(value),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            text: value.to_string(),
            value: Literal::Boolean(value),
        }
    }

    pub fn reference(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value: Literal::Reference(value),
        }
    }

    pub fn null() -> Self {
        Self {
            text: "null".into(),
            value: Literal::Null,
        }
    }

    /// Original literal text as it appeared (or would appear) in a query
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}

impl fmt::Display for ValueHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Renders a string as a double-quoted grammar literal.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Bounded list of holders for IN-style terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueHolderList {
    holders: Vec<ValueHolder>,
}

impl ValueHolderList {
    pub const MAX_LEN: usize = 99;

    /// Build a list of 1..=99 holders
    pub fn new(holders: Vec<ValueHolder>) -> QueryResult<Self> {
        if holders.is_empty() || holders.len() > Self::MAX_LEN {
            return Err(QueryError::InvalidListLength(holders.len()));
        }
        Ok(Self { holders })
    }

    pub fn holders(&self) -> &[ValueHolder] {
        &self.holders
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

/// Exactly one of a single holder or a holder list.
#[derive(Debug, Clone, PartialEq)]
enum TermValue {
    Single(ValueHolder),
    List(ValueHolderList),
}

/// One field/operator/literal comparison clause.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    operator: QueryOperator,
    field: String,
    value: TermValue,
}

impl QueryTerm {
    /// Term with a single literal
    pub fn new(field: impl Into<String>, operator: QueryOperator, holder: ValueHolder) -> Self {
        Self {
            operator,
            field: field.into(),
            value: TermValue::Single(holder),
        }
    }

    /// Term with a value list (IN-style)
    pub fn with_list(
        field: impl Into<String>,
        operator: QueryOperator,
        holders: ValueHolderList,
    ) -> Self {
        Self {
            operator,
            field: field.into(),
            value: TermValue::List(holders),
        }
    }

    pub fn eq(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Eq, holder)
    }

    pub fn ne(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Ne, holder)
    }

    pub fn gt(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Gt, holder)
    }

    pub fn ge(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Ge, holder)
    }

    pub fn lt(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Lt, holder)
    }

    pub fn le(field: impl Into<String>, holder: ValueHolder) -> Self {
        Self::new(field, QueryOperator::Le, holder)
    }

    /// IN term over a bounded value list
    pub fn in_list(field: impl Into<String>, holders: ValueHolderList) -> Self {
        Self::with_list(field, QueryOperator::In, holders)
    }

    pub fn operator(&self) -> QueryOperator {
        self.operator
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// The single holder; fails if this term carries a list
    pub fn value(&self) -> QueryResult<&ValueHolder> {
        match &self.value {
            TermValue::Single(holder) => Ok(holder),
            TermValue::List(_) => Err(QueryError::SingleValueExpected),
        }
    }

    /// The holder list; fails if this term carries a single value
    pub fn values(&self) -> QueryResult<&ValueHolderList> {
        match &self.value {
            TermValue::List(holders) => Ok(holders),
            TermValue::Single(_) => Err(QueryError::ValueListExpected),
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TermValue::Single(holder) => {
                write!(f, "{} {} {}", self.field, self.operator, holder)
            }
            TermValue::List(holders) => {
                write!(f, "{} {} (", self.field, self.operator)?;
                for (i, holder) in holders.holders().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{holder}")?;
                }
                write!(f, ")")
            }
        }
    }
}
