//! Query subsystem
//!
//! A conjunction-only comparison language for secondary-index matching:
//!
//! - `ast`: the typed term model (`QueryTerm`, `ValueHolder`, operators)
//! - `parser`: hand-written recursive descent over the surface grammar
//! - `evaluator`: AND-semantics matching against decoded instance maps
//!
//! A query is parsed once into an ordered term list and evaluated per
//! candidate. There is no disjunction, negation, or grouping.

mod ast;
mod errors;
mod evaluator;
mod parser;

pub use ast::{Literal, QueryOperator, QueryTerm, ValueHolder, ValueHolderList, ValueType};
pub use errors::{ParseError, ParseResult, QueryError, QueryResult};
pub use evaluator::QueryEvaluator;
pub use parser::parse_query;
