pub mod ast;
pub mod decode;
pub mod escape;
pub mod parser;
pub mod writer;

pub use ast::{ClauseKind, FieldFilter, FilterExpr};
pub use decode::{decode_filter_string, decode_filters};
pub use escape::{escape_lucene, unescape_lucene};
pub use parser::parse_filter;
pub use writer::filter_string;

use crate::error::ParseError;

/// Source of filter parse trees.
pub trait FilterParser: Send + Sync {
    fn parse_filter(&self, input: &str) -> Result<FilterExpr, ParseError>;
}

/// Parser for the Lucene subset described in [`parser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LuceneParser;

impl FilterParser for LuceneParser {
    fn parse_filter(&self, input: &str) -> Result<FilterExpr, ParseError> {
        parser::parse_filter(input)
    }
}
