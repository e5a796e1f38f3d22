//! Natural-language time clauses → absolute timestamps.

pub mod parser;
pub mod resolver;

pub use parser::{ParsedClause, TemporalParser};
pub use resolver::{TimeResolver, describe_instant};
