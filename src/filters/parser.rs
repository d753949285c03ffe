//! Reference parser for metadata filter strings.
//!
//! Parses the Lucene subset that [`filter_string`](super::writer::filter_string) produces into a
//! [`FilterExpr`].
//!
//! # Syntax
//!
//! ```text
//! filter_expr  := field_filter (AND? field_filter)*
//! field_filter := field:value | field:"quoted value" | field:[lo TO hi] | field:(v1 OR? v2 ...)
//! ```
//!
//! Clauses are always combined with AND; `OR` is only accepted inside a parenthesized value
//! list, where it is the default anyway.
//!
//! # Examples
//!
//! ```rust
//! # use corpus_query_state::filters::parser::parse_filter;
//! let expr = parse_filter(r#"year:[2000 TO 2010] AND genre:("poetry" "prose")"#).unwrap();
//! assert_eq!(expr.filters.len(), 2);
//! assert_eq!(expr.filters[1].values, vec!["poetry", "prose"]);
//! ```
//!
//! # Escapes
//!
//! Bare values keep their backslash escapes so the decoder can reverse free-text escaping.
//! Inside quotes only `\"` and `\\` are unescaped.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::ast::{ClauseKind, FieldFilter, FilterExpr};
use crate::error::ParseError;

/// Open range bound
const UNBOUNDED: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Phrase(String),
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        let kind = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '"' => {
                chars.next();
                tokens.push(Token { kind: TokenKind::Phrase(read_quoted(&mut chars, position)?), position });
                continue;
            }
            _ => {
                tokens.push(Token { kind: TokenKind::Word(read_word(&mut chars)), position });
                continue;
            }
        };
        chars.next();
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

/// Read until whitespace or an unescaped delimiter, keeping escapes.
fn read_word(chars: &mut Peekable<std::str::CharIndices>) -> String {
    let mut word = String::new();

    while let Some(&(_, ch)) = chars.peek() {
        if ch.is_whitespace() || matches!(ch, ':' | '(' | ')' | '[' | ']' | '"') {
            break;
        }
        chars.next();
        word.push(ch);
        if ch == '\\'
            && let Some((_, escaped)) = chars.next()
        {
            word.push(escaped);
        }
    }

    word
}

/// Read a quoted value; the opening quote is already consumed.
fn read_quoted(chars: &mut Peekable<std::str::CharIndices>, start: usize) -> Result<String, ParseError> {
    let mut value = String::new();

    while let Some((_, ch)) = chars.next() {
        match ch {
            '"' => return Ok(value),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                Some((_, escaped)) => {
                    value.push('\\');
                    value.push(escaped);
                }
                None => break,
            },
            c => value.push(c),
        }
    }

    Err(ParseError::new(start, "Unterminated quoted string"))
}

fn is_keyword(word: &str, keyword: &str, symbol: &str) -> bool {
    word == keyword || word == symbol
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    end: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn error_at(&mut self, message: impl Into<String>) -> ParseError {
        let position = self.tokens.peek().map(|t| t.position).unwrap_or(self.end);
        ParseError::new(position, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(ParseError::new(token.position, format!("Expected {what}"))),
            None => Err(ParseError::new(self.end, format!("Expected {what}"))),
        }
    }

    fn parse(mut self) -> Result<FilterExpr, ParseError> {
        let mut expr = FilterExpr::new();
        let mut after_operator = false;

        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Word(word) if is_keyword(&word, "AND", "&&") => {
                    if expr.is_empty() || after_operator {
                        return Err(ParseError::new(
                            token.position,
                            "Unexpected AND operator (expected field:value)",
                        ));
                    }
                    after_operator = true;
                }
                TokenKind::Word(word) if is_keyword(&word, "OR", "||") => {
                    return Err(ParseError::new(
                        token.position,
                        "OR between fields is not supported",
                    ));
                }
                TokenKind::Word(field) => {
                    self.expect(TokenKind::Colon, "':' after field name")?;
                    let (kind, values) = self.value(&field)?;
                    expr.add_filter(FieldFilter::new(field, kind, values));
                    after_operator = false;
                }
                _ => return Err(ParseError::new(token.position, "Expected field name")),
            }
        }

        if after_operator {
            return Err(ParseError::new(self.end, "Filter ended with operator (expected field:value)"));
        }
        Ok(expr)
    }

    fn value(&mut self, field: &str) -> Result<(ClauseKind, Vec<String>), ParseError> {
        let Some(token) = self.next() else {
            return Err(ParseError::new(self.end, format!("Missing value for field '{field}'")));
        };

        match token.kind {
            TokenKind::Word(value) | TokenKind::Phrase(value) => Ok((ClauseKind::Terms, vec![value])),
            TokenKind::LBracket => {
                let lo = self.bound()?;
                match self.next() {
                    Some(Token { kind: TokenKind::Word(word), .. }) if word == "TO" => {}
                    _ => return Err(self.error_at("Expected TO in range")),
                }
                let hi = self.bound()?;
                self.expect(TokenKind::RBracket, "']' to close range")?;
                Ok((ClauseKind::Range, vec![lo, hi]))
            }
            TokenKind::LParen => {
                let mut values = Vec::new();
                loop {
                    match self.next() {
                        Some(Token { kind: TokenKind::RParen, .. }) => break,
                        Some(Token { kind: TokenKind::Word(word), .. })
                            if is_keyword(&word, "OR", "||") => {}
                        Some(Token { kind: TokenKind::Word(word), position })
                            if is_keyword(&word, "AND", "&&") =>
                        {
                            return Err(ParseError::new(position, "AND inside a value list is not supported"));
                        }
                        Some(Token { kind: TokenKind::Word(value) | TokenKind::Phrase(value), .. }) => {
                            values.push(value);
                        }
                        Some(token) => return Err(ParseError::new(token.position, "Unexpected token in value list")),
                        None => return Err(ParseError::new(self.end, "Expected ')' to close value list")),
                    }
                }
                if values.is_empty() {
                    return Err(ParseError::new(token.position, format!("Empty value list for field '{field}'")));
                }
                Ok((ClauseKind::Terms, values))
            }
            _ => Err(ParseError::new(token.position, format!("Invalid value for field '{field}'"))),
        }
    }

    fn bound(&mut self) -> Result<String, ParseError> {
        match self.next() {
            Some(Token { kind: TokenKind::Word(word), .. }) if word == UNBOUNDED => Ok(String::new()),
            Some(Token { kind: TokenKind::Word(value) | TokenKind::Phrase(value), .. }) => Ok(value),
            Some(token) => Err(ParseError::new(token.position, "Expected range bound")),
            None => Err(ParseError::new(self.end, "Expected range bound")),
        }
    }
}

/// Parse a filter string into a [`FilterExpr`]. Blank input yields an empty expression.
pub fn parse_filter(input: &str) -> Result<FilterExpr, ParseError> {
    if input.trim().is_empty() {
        return Ok(FilterExpr::new());
    }
    let tokens = tokenize(input)?;
    Parser { tokens: tokens.into_iter().peekable(), end: input.len() }.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_field_value() {
        let tokens = tokenize("author:smith").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Word("author".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Colon);
        assert_eq!(tokens[2].position, 7);
    }

    #[test]
    fn test_tokenize_keeps_escapes() {
        let tokens = tokenize(r"title:a\:b\ c").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Word(r"a\:b\ c".to_string()));
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let result = tokenize("title:\"foo bar");
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Unterminated"));
    }

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_range() {
        let expr = parse_filter("year:[2000 TO 2010]").unwrap();
        assert_eq!(expr.filters[0], FieldFilter::new("year", ClauseKind::Range, vec!["2000".into(), "2010".into()]));

        let open = parse_filter("year:[* TO 2010]").unwrap();
        assert_eq!(open.filters[0].values, vec!["", "2010"]);
    }

    #[test]
    fn test_parse_filter_quoted() {
        let expr = parse_filter(r#"title:"the \"big\" sleep""#).unwrap();
        assert_eq!(expr.filters[0].values, vec![r#"the "big" sleep"#]);
    }

    #[test]
    fn test_parse_filter_value_list() {
        let expr = parse_filter(r#"genre:("poetry" OR "prose" drama)"#).unwrap();
        assert_eq!(expr.filters[0].values, vec!["poetry", "prose", "drama"]);
        assert_eq!(expr.filters[0].kind, ClauseKind::Terms);
    }

    #[test]
    fn test_parse_filter_implicit_and() {
        let expr = parse_filter("author:smith year:[1 TO 2]").unwrap();
        assert_eq!(expr.filters.len(), 2);
        let explicit = parse_filter("author:smith AND year:[1 TO 2]").unwrap();
        assert_eq!(expr, explicit);
    }

    #[test]
    fn test_parse_filter_rejects_or_between_fields() {
        let result = parse_filter("author:smith OR author:jones");
        assert!(result.unwrap_err().message.contains("OR between fields"));
    }

    #[test]
    fn test_parse_filter_operator_errors() {
        assert!(parse_filter("AND author:smith").is_err());
        let trailing = parse_filter("author:smith AND").unwrap_err();
        assert!(trailing.message.contains("ended with operator"));
        assert_eq!(trailing.position, 16);
        assert!(parse_filter("author:smith AND AND year:1").is_err());
    }

    #[test]
    fn test_parse_filter_malformed() {
        assert!(parse_filter("author").is_err());
        assert!(parse_filter("author:").is_err());
        assert!(parse_filter("year:[2000 2010]").is_err());
        assert!(parse_filter("year:[2000 TO 2010").is_err());
        assert!(parse_filter("genre:()").is_err());
        assert!(parse_filter("genre:(a").is_err());
    }
}
