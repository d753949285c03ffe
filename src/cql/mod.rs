//! Corpus query language support.
//!
//! The decoder only needs a parse tree ([`ParsedPattern`]); any parser can supply one through
//! [`PatternParser`]. [`CqlParser`] covers the subset the simplified editors produce.

pub mod ast;
pub mod parser;
pub mod wildcard;
pub mod writer;

pub use ast::{Attribute, BoolOp, Comparator, Expr, ParsedPattern, Repeats, TagKind, Token, XmlTag};
pub use parser::parse_pattern;
pub use wildcard::{regex_to_wildcard, wildcard_to_regex};
pub use writer::{CASE_SENSITIVE_PREFIX, pattern_string};

use crate::error::ParseError;

/// Source of pattern parse trees.
pub trait PatternParser: Send + Sync {
    /// Parse `input`; bare string tokens test `default_annotation`.
    fn parse_pattern(&self, input: &str, default_annotation: &str)
    -> Result<ParsedPattern, ParseError>;
}

/// Parser for the pattern subset described in [`parser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CqlParser;

impl PatternParser for CqlParser {
    fn parse_pattern(
        &self,
        input: &str,
        default_annotation: &str,
    ) -> Result<ParsedPattern, ParseError> {
        parser::parse_pattern(input, default_annotation)
    }
}
