//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! A reduced HTML tokenizer: enough of the state machine to load real-world
//! markup into a DOM for selector work. Script data escaping, CDATA and the
//! long tail of named character references are not implemented.

use pinpoint_common::warning::warn_once;
use pinpoint_dom::Attribute;
use strum_macros::Display;

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Named character references this tokenizer resolves.
///
/// The first five (plus `nbsp`, `copy`, `reg`) are also recognized in text
/// without a trailing semicolon, as legacy markup relies on that.
const NAMED_REFERENCES: [(&str, char, bool); 14] = [
    ("amp", '&', true),
    ("lt", '<', true),
    ("gt", '>', true),
    ("quot", '"', true),
    ("apos", '\'', false),
    ("nbsp", '\u{A0}', true),
    ("copy", '\u{A9}', true),
    ("reg", '\u{AE}', true),
    ("hellip", '\u{2026}', false),
    ("mdash", '\u{2014}', false),
    ("ndash", '\u{2013}', false),
    ("laquo", '\u{AB}', true),
    ("raquo", '\u{BB}', true),
    ("times", '\u{D7}', true),
];

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Consecutive characters are coalesced into a single [`Token::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A DOCTYPE declaration; only the name is kept.
    Doctype {
        /// Lower-cased doctype name (`html` for `<!DOCTYPE html>`).
        name: String,
    },
    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// Lower-cased tag name.
        name: String,
        /// Whether the tag ended with `/>`.
        self_closing: bool,
        /// Attributes in source order, duplicates dropped.
        attributes: Vec<Attribute>,
    },
    /// An end tag.
    EndTag {
        /// Lower-cased tag name.
        name: String,
    },
    /// "Comment and character tokens have data."
    Comment {
        /// Comment text between `<!--` and `-->`.
        data: String,
    },
    /// A run of character data with character references resolved.
    Text {
        /// The characters.
        data: String,
    },
    /// End of input.
    EndOfFile,
}

/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RawText,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
}

/// HTML tokenizer producing a flat token stream for [`crate::HTMLParser`].
pub struct HTMLTokenizer {
    input: Vec<char>,
    position: usize,
    state: TokenizerState,
    current_input_character: Option<char>,
    // "Reconsume in the X state": the next loop iteration reuses the character.
    reconsume: bool,
    at_eof: bool,
    tokens: Vec<Token>,

    /// Pending character data, flushed before any other token.
    text: String,
    tag_name: String,
    is_end_tag: bool,
    self_closing: bool,
    attributes: Vec<Attribute>,
    attribute_name: String,
    attribute_value: String,
    attribute_pending: bool,
    comment: String,
    /// Tag name that terminates the current RAWTEXT section.
    raw_text_end: Option<String>,
}

impl HTMLTokenizer {
    /// Create a new tokenizer for the given input. The initial state is the
    /// data state.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            state: TokenizerState::Data,
            current_input_character: None,
            reconsume: false,
            at_eof: false,
            tokens: Vec::new(),
            text: String::new(),
            tag_name: String::new(),
            is_end_tag: false,
            self_closing: false,
            attributes: Vec::new(),
            attribute_name: String::new(),
            attribute_value: String::new(),
            attribute_pending: false,
            comment: String::new(),
            raw_text_end: None,
        }
    }

    /// Run the state machine to the end of input.
    pub fn run(&mut self) {
        while !self.at_eof {
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current_input_character = self.input.get(self.position).copied();
                if self.current_input_character.is_some() {
                    self.position += 1;
                }
            }
            self.step();
        }
    }

    /// Consume the tokenizer and return the token stream.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Current state, for diagnostics.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    fn step(&mut self) {
        let c = self.current_input_character;
        match self.state {
            TokenizerState::Data => match c {
                Some('&') => {
                    let resolved = self.consume_character_reference(false);
                    self.text.push_str(&resolved);
                }
                Some('<') => self.switch_to(TokenizerState::TagOpen),
                Some(c) => self.text.push(c),
                None => self.emit_eof(),
            },

            TokenizerState::RawText => match c {
                Some('<') if self.at_raw_text_end() => {
                    let name = self.raw_text_end.take().unwrap_or_default();
                    // Skip "/" and the tag name; the tag name state sees what follows.
                    self.position += 1 + name.chars().count();
                    self.start_tag(true);
                    self.tag_name = name;
                    self.switch_to(TokenizerState::TagName);
                }
                Some(c) => self.text.push(c),
                None => self.emit_eof(),
            },

            TokenizerState::TagOpen => match c {
                Some('!') => self.markup_declaration_open(),
                Some('/') => self.switch_to(TokenizerState::EndTagOpen),
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(false);
                    self.reconsume_in(TokenizerState::TagName);
                }
                Some('?') => {
                    self.comment.clear();
                    self.reconsume_in(TokenizerState::BogusComment);
                }
                _ => {
                    // "invalid-first-character-of-tag-name parse error"
                    self.text.push('<');
                    self.reconsume_in(TokenizerState::Data);
                }
            },

            TokenizerState::EndTagOpen => match c {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(true);
                    self.reconsume_in(TokenizerState::TagName);
                }
                Some('>') => self.switch_to(TokenizerState::Data),
                None => {
                    self.text.push_str("</");
                    self.reconsume_in(TokenizerState::Data);
                }
                Some(_) => {
                    self.comment.clear();
                    self.reconsume_in(TokenizerState::BogusComment);
                }
            },

            TokenizerState::TagName => match c {
                Some(c) if is_html_whitespace(c) => {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                }
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
                Some('>') => self.emit_tag(),
                Some(c) => self.tag_name.push(c.to_ascii_lowercase()),
                None => self.eof_in_tag(),
            },

            TokenizerState::BeforeAttributeName => match c {
                Some(c) if is_html_whitespace(c) => {}
                Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
                Some(_) => {
                    self.start_attribute();
                    self.reconsume_in(TokenizerState::AttributeName);
                }
            },

            TokenizerState::AttributeName => match c {
                Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
                Some(c) if is_html_whitespace(c) => {
                    self.reconsume_in(TokenizerState::AfterAttributeName);
                }
                Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
                Some(c) => self.attribute_name.push(c.to_ascii_lowercase()),
            },

            TokenizerState::AfterAttributeName => match c {
                Some(c) if is_html_whitespace(c) => {}
                Some('/') => {
                    self.finish_attribute();
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                }
                Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
                Some('>') => {
                    self.finish_attribute();
                    self.emit_tag();
                }
                Some(_) => {
                    self.finish_attribute();
                    self.start_attribute();
                    self.reconsume_in(TokenizerState::AttributeName);
                }
                None => self.eof_in_tag(),
            },

            TokenizerState::BeforeAttributeValue => match c {
                Some(c) if is_html_whitespace(c) => {}
                Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
                Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
                Some('>') => {
                    // "missing-attribute-value parse error"
                    self.finish_attribute();
                    self.emit_tag();
                }
                _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
            },

            TokenizerState::AttributeValueDoubleQuoted => {
                self.quoted_attribute_value(c, '"');
            }

            TokenizerState::AttributeValueSingleQuoted => {
                self.quoted_attribute_value(c, '\'');
            }

            TokenizerState::AttributeValueUnquoted => match c {
                Some(c) if is_html_whitespace(c) => {
                    self.finish_attribute();
                    self.switch_to(TokenizerState::BeforeAttributeName);
                }
                Some('&') => {
                    let resolved = self.consume_character_reference(true);
                    self.attribute_value.push_str(&resolved);
                }
                Some('>') => {
                    self.finish_attribute();
                    self.emit_tag();
                }
                Some(c) => self.attribute_value.push(c),
                None => self.eof_in_tag(),
            },

            TokenizerState::AfterAttributeValueQuoted => match c {
                Some(c) if is_html_whitespace(c) => {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                }
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
                Some('>') => self.emit_tag(),
                Some(_) => self.reconsume_in(TokenizerState::BeforeAttributeName),
                None => self.eof_in_tag(),
            },

            TokenizerState::SelfClosingStartTag => match c {
                Some('>') => {
                    self.self_closing = true;
                    self.emit_tag();
                }
                Some(_) => self.reconsume_in(TokenizerState::BeforeAttributeName),
                None => self.eof_in_tag(),
            },

            TokenizerState::Comment => match c {
                Some('-') if self.starts_with("->") => {
                    self.position += 2;
                    self.emit_comment();
                }
                Some(c) => self.comment.push(c),
                None => {
                    warn_once("HTML", "unterminated comment at end of input");
                    self.emit_comment();
                    self.emit_eof();
                }
            },

            TokenizerState::BogusComment => match c {
                Some('>') => self.emit_comment(),
                Some(c) => self.comment.push(c),
                None => {
                    self.emit_comment();
                    self.emit_eof();
                }
            },
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn markup_declaration_open(&mut self) {
        self.comment.clear();
        if self.starts_with("--") {
            self.position += 2;
            self.switch_to(TokenizerState::Comment);
        } else if self.starts_with_ignore_case("doctype") {
            self.position += "doctype".len();
            let mut raw = String::new();
            while let Some(&c) = self.input.get(self.position) {
                self.position += 1;
                if c == '>' {
                    break;
                }
                raw.push(c);
            }
            self.flush_text();
            let name = raw
                .split_ascii_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            self.tokens.push(Token::Doctype { name });
            self.switch_to(TokenizerState::Data);
        } else {
            // "incorrectly-opened-comment parse error"
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    fn quoted_attribute_value(&mut self, c: Option<char>, quote: char) {
        match c {
            Some(c) if c == quote => {
                self.finish_attribute();
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some('&') => {
                let resolved = self.consume_character_reference(true);
                self.attribute_value.push_str(&resolved);
            }
            Some(c) => self.attribute_value.push(c),
            None => self.eof_in_tag(),
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called with the `&` already consumed. Returns the replacement text,
    /// which is a literal `&` when nothing recognizable follows.
    fn consume_character_reference(&mut self, in_attribute: bool) -> String {
        if self.peek() == Some('#') {
            return self.consume_numeric_reference();
        }

        let name: String = self.input[self.position..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric())
            .take(32)
            .collect();
        if name.is_empty() {
            return "&".to_string();
        }

        let len = name.chars().count();
        let terminated = self.input.get(self.position + len) == Some(&';');
        match NAMED_REFERENCES.iter().find(|(n, _, _)| *n == name) {
            Some(&(_, replacement, _)) if terminated => {
                self.position += len + 1;
                replacement.to_string()
            }
            Some(&(_, replacement, legacy)) if legacy && !in_attribute => {
                self.position += len;
                replacement.to_string()
            }
            _ => {
                if terminated {
                    warn_once("HTML", &format!("unknown character reference '&{name};'"));
                }
                "&".to_string()
            }
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn consume_numeric_reference(&mut self) -> String {
        let start = self.position;
        self.position += 1; // '#'
        let hex = matches!(self.peek(), Some('x' | 'X'));
        if hex {
            self.position += 1;
        }
        let radix = if hex { 16 } else { 10 };

        let digits: String = self.input[self.position..]
            .iter()
            .take_while(|c| c.is_digit(radix))
            .collect();
        if digits.is_empty() {
            // "absence-of-digits-in-numeric-character-reference parse error"
            self.position = start;
            return "&".to_string();
        }
        self.position += digits.len();
        if self.peek() == Some(';') {
            self.position += 1;
        }

        // [§ 13.2.5.80 Numeric character reference end state]
        // "If the number is 0x00 ... a surrogate ... or greater than 0x10FFFF,
        // set the character reference code to 0xFFFD."
        let resolved = u32::from_str_radix(&digits, radix)
            .ok()
            .filter(|&code| code != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        resolved.to_string()
    }

    fn start_tag(&mut self, is_end_tag: bool) {
        self.tag_name.clear();
        self.is_end_tag = is_end_tag;
        self.self_closing = false;
        self.attributes.clear();
        self.attribute_pending = false;
    }

    fn start_attribute(&mut self) {
        self.attribute_name.clear();
        self.attribute_value.clear();
        self.attribute_pending = true;
    }

    /// "If there is already an attribute on the token with the exact same name,
    /// then this is a duplicate-attribute parse error and the new attribute
    /// must be removed from the token."
    fn finish_attribute(&mut self) {
        if !self.attribute_pending {
            return;
        }
        self.attribute_pending = false;
        let name = std::mem::take(&mut self.attribute_name);
        let value = std::mem::take(&mut self.attribute_value);
        if !name.is_empty() && !self.attributes.iter().any(|a| a.name == name) {
            self.attributes.push(Attribute { name, value });
        }
    }

    fn emit_tag(&mut self) {
        self.finish_attribute();
        self.flush_text();
        let name = std::mem::take(&mut self.tag_name);
        if self.is_end_tag {
            self.tokens.push(Token::EndTag { name });
            self.switch_to(TokenizerState::Data);
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self.self_closing {
            self.raw_text_end = Some(name.clone());
            self.switch_to(TokenizerState::RawText);
        } else {
            self.switch_to(TokenizerState::Data);
        }
        self.tokens.push(Token::StartTag {
            name,
            self_closing: self.self_closing,
            attributes: std::mem::take(&mut self.attributes),
        });
    }

    fn emit_comment(&mut self) {
        self.flush_text();
        self.tokens.push(Token::Comment {
            data: std::mem::take(&mut self.comment),
        });
        self.switch_to(TokenizerState::Data);
    }

    /// "eof-in-tag parse error": the unfinished tag is dropped.
    fn eof_in_tag(&mut self) {
        warn_once(
            "HTML",
            &format!("end of input inside a tag ({} state)", self.state),
        );
        self.emit_eof();
    }

    fn emit_eof(&mut self) {
        self.flush_text();
        self.tokens.push(Token::EndOfFile);
        self.at_eof = true;
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(Token::Text {
                data: std::mem::take(&mut self.text),
            });
        }
    }

    /// Whether the input after a `<` is `/name` closing the raw text element.
    fn at_raw_text_end(&self) -> bool {
        let Some(name) = self.raw_text_end.as_deref() else {
            return false;
        };
        let candidate = format!("/{name}");
        if !self.starts_with_ignore_case(&candidate) {
            return false;
        }
        let after = self.input.get(self.position + candidate.chars().count());
        matches!(after, None | Some('/' | '>')) || after.is_some_and(|&c| is_html_whitespace(c))
    }

    fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    fn reconsume_in(&mut self, state: TokenizerState) {
        self.reconsume = true;
        self.state = state;
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut pos = self.position;
        for expected in s.chars() {
            if self.input.get(pos) != Some(&expected) {
                return false;
            }
            pos += 1;
        }
        true
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        let mut pos = self.position;
        for expected in s.chars() {
            match self.input.get(pos) {
                Some(c) if c.eq_ignore_ascii_case(&expected) => pos += 1,
                _ => return false,
            }
        }
        true
    }
}

/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR, or U+0020 SPACE."
const fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}
