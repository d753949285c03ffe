//! Reference parser for the pattern subset the simplified editors can represent.
//!
//! # Syntax
//!
//! ```text
//! pattern    := (xml_tag | token)* ("within" xml_tag)?
//! token      := ("[" expr? "]" | string) quantifier?
//! quantifier := "?" | "*" | "+" | "{" n ("," m?)? "}"
//! expr       := and_expr ("|" and_expr)*
//! and_expr   := unary ("&" unary)*
//! unary      := "!" unary | "(" expr ")" | name ("=" | "!=") string
//! xml_tag    := "<" "/"? name "/"? ">"
//! ```
//!
//! A bare string token such as `"cat"` tests the default annotation. Strings keep their
//! backslash escapes except `\"`, since values are regular expressions.
//!
//! # Examples
//!
//! ```rust
//! # use corpus_query_state::cql::parse_pattern;
//! let parsed = parse_pattern(r#""the" [lemma="cat" & pos="NOU"] within <s/>"#, "word").unwrap();
//! assert_eq!(parsed.tokens.len(), 2);
//! assert_eq!(parsed.within.as_deref(), Some("s"));
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::{Attribute, Comparator, Expr, ParsedPattern, Repeats, TagKind, Token, XmlTag};
use crate::error::ParseError;

const WITHIN_KEYWORD: &str = "within";

/// Parse a pattern, resolving bare string tokens against `default_annotation`.
pub fn parse_pattern(input: &str, default_annotation: &str) -> Result<ParsedPattern, ParseError> {
    Parser { chars: input.char_indices().peekable(), len: input.len(), default_annotation }.parse()
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
    default_annotation: &'a str,
}

impl Parser<'_> {
    fn parse(mut self) -> Result<ParsedPattern, ParseError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut pending_tag: Option<XmlTag> = None;
        let mut within = None;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('<') => {
                    let tag = self.xml_tag()?;
                    match tag.kind {
                        TagKind::Close => match tokens.last_mut() {
                            Some(last) if last.trailing_xml_tag.is_none() => {
                                last.trailing_xml_tag = Some(tag);
                            }
                            _ => return Err(self.error("Closing tag without a preceding token")),
                        },
                        TagKind::Open | TagKind::SelfClosing => {
                            if pending_tag.is_some() {
                                return Err(self.error("Two tags before one token"));
                            }
                            pending_tag = Some(tag);
                        }
                    }
                }
                Some('[' | '"' | '\'') => {
                    let mut token = self.token()?;
                    token.leading_xml_tag = pending_tag.take();
                    tokens.push(token);
                }
                Some(c) if c.is_alphabetic() => {
                    let word = self.ident();
                    if word != WITHIN_KEYWORD {
                        return Err(self.error(format!("Unexpected word '{word}'")));
                    }
                    self.skip_whitespace();
                    within = Some(self.xml_tag()?.name);
                    self.skip_whitespace();
                    if self.peek().is_some() {
                        return Err(self.error("Unexpected input after within clause"));
                    }
                    break;
                }
                Some(c) => return Err(self.error(format!("Unexpected character '{c}'"))),
            }
        }

        // A tag after the last token closes it
        if let Some(tag) = pending_tag {
            match tokens.last_mut() {
                Some(last) if last.trailing_xml_tag.is_none() => last.trailing_xml_tag = Some(tag),
                _ => return Err(self.error("Tag is not attached to any token")),
            }
        }

        Ok(ParsedPattern { tokens, within })
    }

    fn token(&mut self) -> Result<Token, ParseError> {
        let expression = match self.bump() {
            Some('[') => {
                self.skip_whitespace();
                if self.eat(']') {
                    None
                } else {
                    let expr = self.or_expr()?;
                    self.skip_whitespace();
                    self.expect(']')?;
                    Some(expr)
                }
            }
            Some(quote @ ('"' | '\'')) => {
                let value = self.string_body(quote)?;
                Some(Expr::Attribute(Attribute::new(self.default_annotation, Comparator::Eq, value)))
            }
            _ => return Err(self.error("Expected a token")),
        };

        let mut token = Token::new(expression);
        match self.peek() {
            Some('?') => {
                self.bump();
                token.optional = true;
            }
            Some('*') => {
                self.bump();
                token.repeats = Some(Repeats { min: 0, max: None });
            }
            Some('+') => {
                self.bump();
                token.repeats = Some(Repeats { min: 1, max: None });
            }
            Some('{') => {
                self.bump();
                let min = self.number()?;
                let max = if self.eat(',') {
                    match self.peek() {
                        Some(c) if c.is_ascii_digit() => Some(self.number()?),
                        _ => None,
                    }
                } else {
                    Some(min)
                };
                self.expect('}')?;
                token.repeats = Some(Repeats { min, max });
            }
            _ => {}
        }
        Ok(token)
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        loop {
            self.skip_whitespace();
            if !self.eat('|') {
                return Ok(left);
            }
            let right = self.and_expr()?;
            left = Expr::or(left, right);
        }
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            self.skip_whitespace();
            if !self.eat('&') {
                return Ok(left);
            }
            let right = self.unary()?;
            left = Expr::and(left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('!') => {
                self.bump();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            Some('(') => {
                self.bump();
                let expr = self.or_expr()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(expr)
            }
            _ => self.attribute(),
        }
    }

    fn attribute(&mut self) -> Result<Expr, ParseError> {
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error("Expected annotation name"));
        }
        self.skip_whitespace();
        let comparator = if self.eat('=') {
            Comparator::Eq
        } else if self.eat('!') {
            self.expect('=')?;
            Comparator::NotEq
        } else {
            return Err(self.error(format!("Expected comparator after '{name}'")));
        };
        self.skip_whitespace();
        let value = match self.bump() {
            Some(quote @ ('"' | '\'')) => self.string_body(quote)?,
            _ => return Err(self.error("Expected quoted value")),
        };
        Ok(Expr::Attribute(Attribute::new(name, comparator, value)))
    }

    fn xml_tag(&mut self) -> Result<XmlTag, ParseError> {
        self.expect('<')?;
        let closing = self.eat('/');
        self.skip_whitespace();
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error("Expected tag name"));
        }
        self.skip_whitespace();
        let self_closing = self.eat('/');
        self.expect('>')?;

        let kind = match (closing, self_closing) {
            (true, true) => return Err(self.error("Tag cannot be both closing and self-closing")),
            (true, false) => TagKind::Close,
            (false, true) => TagKind::SelfClosing,
            (false, false) => TagKind::Open,
        };
        Ok(XmlTag { name, kind })
    }

    /// Read up to the closing `quote`; the opening quote is already consumed.
    fn string_body(&mut self, quote: char) -> Result<String, ParseError> {
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some(escaped) if escaped == quote => value.push(escaped),
                    Some(escaped) => {
                        value.push('\\');
                        value.push(escaped);
                    }
                    None => break,
                },
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(self.error("Unterminated quoted string"))
    }

    fn ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '-') {
                break;
            }
            ident.push(c);
            self.bump();
        }
        ident
    }

    fn number(&mut self) -> Result<u32, ParseError> {
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.bump();
        }
        digits.parse().map_err(|_| self.error("Expected a number"))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) { Ok(()) } else { Err(self.error(format!("Expected '{expected}'"))) }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&mut self, message: impl Into<String>) -> ParseError {
        let position = self.chars.peek().map(|&(i, _)| i).unwrap_or(self.len);
        ParseError::new(position, message)
    }
}
