//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! A recursive-descent parser over code points. Identifiers and strings are
//! consumed per [CSS Syntax § 4.3](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms),
//! so escaped identifiers (`#\31 23`, `.a\.b`, `.\E9 t\E9`) decode to the
//! same names the escaper started from.

use pinpoint_common::warning::warn_once;
use thiserror::Error;

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth, PseudoClass,
    SelectorList, SimpleSelector,
};

/// Why a selector could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    /// The selector (or one entry of a selector list) is empty.
    #[error("empty selector")]
    Empty,
    /// A character that cannot appear at this position.
    #[error("unexpected {found:?} at offset {position}")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Code point offset into the selector.
        position: usize,
    },
    /// The input ended in the middle of a selector.
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    /// A string was not closed before the end of the line or input.
    #[error("unterminated string at offset {0}")]
    UnterminatedString(usize),
    /// The argument of `:nth-child()` or `:nth-last-child()` is not An+B.
    #[error("invalid An+B expression {0:?}")]
    InvalidNth(String),
}

/// Parse a comma-separated selector list.
///
/// # Errors
///
/// Returns a [`SelectorParseError`] describing the first syntax error.
pub fn parse_selector_list(raw: &str) -> Result<SelectorList, SelectorParseError> {
    let mut parser = SelectorParser::new(raw);
    let mut selectors = vec![parser.parse_complex()?];
    while parser.peek() == Some(',') {
        parser.position += 1;
        selectors.push(parser.parse_complex()?);
    }
    match parser.peek() {
        None => Ok(SelectorList { selectors }),
        Some(found) => Err(parser.unexpected(found)),
    }
}

/// "ident-start code point: A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// "ident code point: An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

/// CSS whitespace. CR and FF count as newlines after preprocessing.
const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

const fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\x0C')
}

struct SelectorParser {
    input: Vec<char>,
    position: usize,
}

impl SelectorParser {
    fn new(raw: &str) -> Self {
        Self {
            input: raw.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.position;
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
        self.position > start
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorParseError> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => {
                self.position -= 1;
                Err(self.unexpected(c))
            }
            None => Err(SelectorParseError::UnexpectedEnd),
        }
    }

    const fn unexpected(&self, found: char) -> SelectorParseError {
        SelectorParseError::Unexpected {
            found,
            position: self.position,
        }
    }

    /// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    ///
    /// Compounds are collected left to right, then reversed so the subject
    /// comes first and matching can walk outward from it.
    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorParseError> {
        let _ = self.skip_whitespace();
        if matches!(self.peek(), None | Some(',')) {
            return Err(SelectorParseError::Empty);
        }

        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(found) => return Err(self.unexpected(found)),
            };
            if combinator != Combinator::Descendant {
                self.position += 1;
                let _ = self.skip_whitespace();
            }
            match self.peek() {
                None => return Err(SelectorParseError::UnexpectedEnd),
                Some(found @ (',' | '>' | '+' | '~')) => return Err(self.unexpected(found)),
                Some(_) => {}
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let subject = compounds.pop().ok_or(SelectorParseError::Empty)?;
        let combinators = combinators
            .into_iter()
            .zip(compounds)
            .rev()
            .collect();
        Ok(ComplexSelector {
            subject,
            combinators,
        })
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    ///
    /// "If it contains a type selector or universal selector, that selector
    /// must come first in the sequence."
    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorParseError> {
        let mut simple_selectors = Vec::new();

        if self.peek() == Some('*') {
            self.position += 1;
            simple_selectors.push(SimpleSelector::Universal);
        } else if self.starts_ident() {
            let name = self.consume_ident();
            simple_selectors.push(SimpleSelector::Type(name));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.position += 1;
                    let id = self.parse_ident()?;
                    simple_selectors.push(SimpleSelector::Id(id));
                }
                Some('.') => {
                    self.position += 1;
                    let class = self.parse_ident()?;
                    simple_selectors.push(SimpleSelector::Class(class));
                }
                Some('[') => {
                    self.position += 1;
                    let attribute = self.parse_attribute()?;
                    simple_selectors.push(SimpleSelector::Attribute(attribute));
                }
                Some(':') => {
                    self.position += 1;
                    simple_selectors.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if simple_selectors.is_empty() {
            return Err(match self.peek() {
                Some(found) => self.unexpected(found),
                None => SelectorParseError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Called after `[`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorParseError> {
        let _ = self.skip_whitespace();
        let name = self.parse_ident()?;
        let _ = self.skip_whitespace();

        let operator = match self.next() {
            Some(']') => return Ok(AttributeSelector::Exists(name)),
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                op
            }
            Some(found) => {
                self.position -= 1;
                return Err(self.unexpected(found));
            }
            None => return Err(SelectorParseError::UnexpectedEnd),
        };

        let _ = self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.position += 1;
                self.consume_string(quote)?
            }
            _ => self.parse_ident()?,
        };
        let _ = self.skip_whitespace();
        self.expect(']')?;

        Ok(match operator {
            '~' => AttributeSelector::Includes(name, value),
            '|' => AttributeSelector::DashMatch(name, value),
            '^' => AttributeSelector::PrefixMatch(name, value),
            '$' => AttributeSelector::SuffixMatch(name, value),
            '*' => AttributeSelector::SubstringMatch(name, value),
            _ => AttributeSelector::Equals(name, value),
        })
    }

    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// Called after the first `:`.
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorParseError> {
        let is_pseudo_element = self.peek() == Some(':');
        if is_pseudo_element {
            self.position += 1;
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        let argument = if self.peek() == Some('(') {
            self.position += 1;
            Some(self.consume_parenthesized()?)
        } else {
            None
        };

        if is_pseudo_element {
            return Ok(SimpleSelector::NeverMatch);
        }

        let pseudo = match (name.as_str(), argument) {
            ("root", None) => PseudoClass::Root,
            ("empty", None) => PseudoClass::Empty,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("first-of-type", None) => PseudoClass::FirstOfType,
            ("last-of-type", None) => PseudoClass::LastOfType,
            ("nth-child", Some(argument)) => PseudoClass::NthChild(parse_nth(&argument)?),
            ("nth-last-child", Some(argument)) => {
                PseudoClass::NthLastChild(parse_nth(&argument)?)
            }
            _ => {
                warn_once(
                    "CSS",
                    &format!("unsupported pseudo-class ':{name}' never matches"),
                );
                return Ok(SimpleSelector::NeverMatch);
            }
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Raw text up to the matching `)`, which is consumed.
    fn consume_parenthesized(&mut self) -> Result<String, SelectorParseError> {
        let mut depth = 1u32;
        let mut text = String::new();
        while let Some(c) = self.next() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                _ => {}
            }
            text.push(c);
        }
        Err(SelectorParseError::UnexpectedEnd)
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => match self.peek_at(1) {
                Some(c) if is_ident_start(c) || c == '-' => true,
                Some('\\') => self.is_valid_escape(2),
                _ => false,
            },
            Some(c) if is_ident_start(c) => true,
            Some('\\') => self.is_valid_escape(1),
            _ => false,
        }
    }

    /// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    ///
    /// `offset` points just past the backslash.
    fn is_valid_escape(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|c| !is_newline(c))
    }

    fn parse_ident(&mut self) -> Result<String, SelectorParseError> {
        if self.starts_ident() {
            Ok(self.consume_ident())
        } else {
            Err(match self.peek() {
                Some(found) => self.unexpected(found),
                None => SelectorParseError::UnexpectedEnd,
            })
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(c) if is_ident_char(c) => {
                    name.push(c);
                    self.position += 1;
                }
                Some('\\') if self.is_valid_escape(1) => {
                    self.position += 1;
                    name.push(self.consume_escaped_code_point());
                }
                _ => return name,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Called after the backslash.
    fn consume_escaped_code_point(&mut self) -> char {
        let Some(first) = self.next() else {
            // "EOF: This is a parse error. Return U+FFFD REPLACEMENT CHARACTER."
            return char::REPLACEMENT_CHARACTER;
        };
        if !first.is_ascii_hexdigit() {
            return first;
        }

        // "Consume as many hex digits as possible, but no more than 5. Note
        // that this means 1-6 hex digits have been consumed in total."
        let mut hex = String::from(first);
        while hex.len() < 6
            && let Some(c) = self.peek().filter(char::is_ascii_hexdigit)
        {
            hex.push(c);
            self.position += 1;
        }
        // "If the next input code point is whitespace, consume it as well."
        if self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }

        // "If this number is zero, or is for a surrogate, or is greater than
        // the maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER."
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Called after the opening quote.
    fn consume_string(&mut self, quote: char) -> Result<String, SelectorParseError> {
        let start = self.position;
        let mut value = String::new();
        loop {
            match self.next() {
                Some(c) if c == quote => return Ok(value),
                None => return Err(SelectorParseError::UnterminatedString(start)),
                Some(c) if is_newline(c) => return Err(SelectorParseError::UnterminatedString(start)),
                Some('\\') => match self.peek() {
                    None => {}
                    // An escaped newline continues the string.
                    Some(c) if is_newline(c) => self.position += 1,
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }
}

/// [§ 14.3 The An+B microsyntax](https://www.w3.org/TR/selectors-4/#the-an-b-notation)
///
/// Accepts `odd`, `even`, `B`, `An`, `An+B` and `An-B` with optional signs
/// and whitespace around the operator.
fn parse_nth(argument: &str) -> Result<Nth, SelectorParseError> {
    let invalid = || SelectorParseError::InvalidNth(argument.to_string());
    let compact: String = argument
        .chars()
        .filter(|&c| !is_whitespace(c))
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => return Ok(Nth { a: 2, b: 1 }),
        "even" => return Ok(Nth { a: 2, b: 0 }),
        "" => return Err(invalid()),
        _ => {}
    }

    let Some((step, offset)) = compact.split_once('n') else {
        let b = compact.parse().map_err(|_| invalid())?;
        return Ok(Nth { a: 0, b });
    };

    let a = match step {
        "" | "+" => 1,
        "-" => -1,
        digits => digits.parse().map_err(|_| invalid())?,
    };
    let b = if offset.is_empty() {
        0
    } else if offset.starts_with(['+', '-']) && offset.len() > 1 {
        offset.parse().map_err(|_| invalid())?
    } else {
        return Err(invalid());
    };
    Ok(Nth { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nth_forms() {
        assert_eq!(parse_nth("odd"), Ok(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth(" EVEN "), Ok(Nth { a: 2, b: 0 }));
        assert_eq!(parse_nth("7"), Ok(Nth { a: 0, b: 7 }));
        assert_eq!(parse_nth("n"), Ok(Nth { a: 1, b: 0 }));
        assert_eq!(parse_nth("-n+3"), Ok(Nth { a: -1, b: 3 }));
        assert_eq!(parse_nth("2n + 1"), Ok(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth("3n-2"), Ok(Nth { a: 3, b: -2 }));
    }

    #[test]
    fn test_parse_nth_rejects_garbage() {
        assert!(parse_nth("").is_err());
        assert!(parse_nth("2n1").is_err());
        assert!(parse_nth("x").is_err());
        assert!(parse_nth("2n+").is_err());
    }

    #[test]
    fn test_escaped_code_point() {
        let mut parser = SelectorParser::new("31 abc");
        assert_eq!(parser.consume_escaped_code_point(), '1');
        assert_eq!(parser.peek(), Some('a'));

        let mut parser = SelectorParser::new("0");
        assert_eq!(parser.consume_escaped_code_point(), char::REPLACEMENT_CHARACTER);

        let mut parser = SelectorParser::new("D800");
        assert_eq!(parser.consume_escaped_code_point(), char::REPLACEMENT_CHARACTER);

        let mut parser = SelectorParser::new(".");
        assert_eq!(parser.consume_escaped_code_point(), '.');
    }
}
