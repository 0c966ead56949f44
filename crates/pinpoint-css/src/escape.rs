//! CSS token escaping.
//!
//! [CSSOM § 2.1 Common serializing idioms](https://drafts.csswg.org/cssom/#common-serializing-idioms)
//!
//! "To escape a character means to create a string of "\" (U+005C), followed
//! by the character." and "To escape a character as code point means to
//! create a string of "\" (U+005C), followed by the Unicode code point as the
//! smallest possible number of hexadecimal digits in the range 0-9 a-f
//! (U+0030 to U+0039 and U+0061 to U+0066) to represent the code point in
//! base 16, followed by a single SPACE (U+0020)."
//!
//! The escaper here follows the widely deployed `cssesc` grammar rather than
//! `CSS.escape()`: hex digits are upper-case, every non-printable or
//! non-ASCII code point is hex-escaped (so the output is always ASCII), and
//! redundant trailing spaces after hex escapes are removed.
//!
//! Character classes are tested explicitly; no regular expressions.

use std::fmt::Write;

/// The quote character used for string (non-identifier) escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    /// `'` (U+0027)
    #[default]
    Single,
    /// `"` (U+0022)
    Double,
}

impl Quote {
    /// The quote as a character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// Options for [`escape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EscapeOptions {
    /// Escape every printable character, not only the ones that need it.
    pub escape_everything: bool,
    /// Produce a CSS identifier (class name, id, attribute name) rather than
    /// the contents of a quoted string.
    pub is_identifier: bool,
    /// Quote character escaped in string mode and used for wrapping.
    pub quote: Quote,
    /// Surround string-mode output with `quote`. Ignored for identifiers.
    pub wrap: bool,
}

impl EscapeOptions {
    /// Options for escaping an identifier.
    #[must_use]
    pub const fn identifier() -> Self {
        Self {
            escape_everything: false,
            is_identifier: true,
            quote: Quote::Single,
            wrap: false,
        }
    }

    /// Options for escaping the contents of a string quoted with `quote`.
    #[must_use]
    pub const fn string(quote: Quote) -> Self {
        Self {
            escape_everything: false,
            is_identifier: false,
            quote,
            wrap: false,
        }
    }
}

/// Escape `input` for use in a selector.
///
/// ```
/// use pinpoint_css::escape::{escape, EscapeOptions};
///
/// assert_eq!(escape("nav-item", &EscapeOptions::identifier()), "nav-item");
/// assert_eq!(escape("1abc", &EscapeOptions::identifier()), "\\31 abc");
/// assert_eq!(escape("a.b", &EscapeOptions::identifier()), "a\\.b");
/// ```
#[must_use]
pub fn escape(input: &str, options: &EscapeOptions) -> String {
    let units: Vec<u16> = input.encode_utf16().collect();
    escape_utf16(&units, options)
}

/// Escape an identifier with the default identifier options.
#[must_use]
pub fn escape_identifier(input: &str) -> String {
    escape(input, &EscapeOptions::identifier())
}

/// Escape UTF-16 input, which, unlike `&str`, may contain unpaired surrogates.
///
/// A high surrogate immediately followed by a low surrogate is escaped as the
/// combined code point. An unpaired surrogate is escaped on its own and the
/// unit after it is processed normally.
#[must_use]
pub fn escape_utf16(input: &[u16], options: &EscapeOptions) -> String {
    let quote = options.quote.as_char();
    let mut output = String::with_capacity(input.len());

    let mut counter = 0;
    while counter < input.len() {
        let unit = input[counter];
        counter += 1;

        let Some(c) = printable_ascii(unit) else {
            let mut code_point = u32::from(unit);
            if is_high_surrogate(unit)
                && let Some(&extra) = input.get(counter)
                && is_low_surrogate(extra)
            {
                counter += 1;
                code_point = combine_surrogates(unit, extra);
            }
            push_hex_escape(&mut output, code_point);
            continue;
        };

        if options.escape_everything {
            if is_escape_everything_single(c) {
                output.push('\\');
                output.push(c);
            } else {
                push_hex_escape(&mut output, u32::from(unit));
            }
        } else if c == '\\'
            || (!options.is_identifier && c == quote)
            || (options.is_identifier && is_identifier_single(c))
        {
            output.push('\\');
            output.push(c);
        } else {
            output.push(c);
        }
    }

    if options.is_identifier {
        let mut chars = output.chars();
        let first = chars.next();
        let second = chars.next();
        if first == Some('-') && second.is_some_and(|c| c == '-' || c.is_ascii_digit()) {
            // "-1" and "--x" would not start an identifier; escape the hyphen.
            output.insert(0, '\\');
        } else if let Some(digit) = first.filter(char::is_ascii_digit) {
            output = format!("\\3{digit} {}", &output[1..]);
        }
    }

    let mut output = trim_escape_spaces(&output);

    if !options.is_identifier && options.wrap {
        output.insert(0, quote);
        output.push(quote);
    }
    output
}

/// The character for a unit in U+0020..=U+007E, otherwise `None`.
fn printable_ascii(unit: u16) -> Option<char> {
    char::from_u32(u32::from(unit)).filter(|c| (' '..='~').contains(c))
}

const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

fn combine_surrogates(high: u16, low: u16) -> u32 {
    ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00) + 0x1_0000
}

fn push_hex_escape(output: &mut String, code_point: u32) {
    let _ = write!(output, "\\{code_point:X} ");
}

/// Printable ASCII that is escaped with a single backslash in identifiers:
/// `[ -,./:-@[]^`{-~]`. Letters, digits, `-` and `_` pass through; `\` is
/// handled separately.
const fn is_identifier_single(c: char) -> bool {
    matches!(
        c,
        ' '..=',' | '.' | '/' | ':'..='@' | '[' | ']' | '^' | '`' | '{'..='~'
    )
}

/// Printable ASCII that is escaped with a single backslash when escaping
/// everything: `[ -,./:-@[-^`{-~]`. Everything else printable is hex-escaped.
const fn is_escape_everything_single(c: char) -> bool {
    matches!(
        c,
        ' '..=',' | '.' | '/' | ':'..='@' | '['..='^' | '`' | '{'..='~'
    )
}

/// Drop the space that terminates a hex escape when the next character could
/// not be mistaken for part of the escape.
///
/// The space is kept when it is followed by a hex digit or another space, and
/// when the backslash run before the hex digits has even length (the last
/// backslash is then itself escaped, so the "escape" is literal text).
fn trim_escape_spaces(escaped: &str) -> String {
    let chars: Vec<char> = escaped.chars().collect();
    let mut output = String::with_capacity(escaped.len());

    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            output.push(chars[i]);
            i += 1;
            continue;
        }

        let run_start = i;
        while chars.get(i) == Some(&'\\') {
            output.push('\\');
            i += 1;
        }
        let run = i - run_start;

        let hex_start = i;
        while i - hex_start < 6 && chars.get(i).is_some_and(|c| matches!(c, '0'..='9' | 'A'..='F')) {
            output.push(chars[i]);
            i += 1;
        }

        let redundant_space = i > hex_start
            && run % 2 == 1
            && chars.get(i) == Some(&' ')
            && !chars
                .get(i + 1)
                .is_some_and(|&c| c.is_ascii_hexdigit() || c == ' ');
        if redundant_space {
            i += 1;
        }
    }
    output
}
