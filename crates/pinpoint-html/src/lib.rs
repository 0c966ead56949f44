//! HTML tokenizer and tree builder for the Pinpoint selector toolkit.
//!
//! # Scope
//!
//! This crate loads markup into a [`DomTree`] so selectors can be computed
//! and verified against it:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RAWTEXT, tag, attribute and comment states
//!   - Numeric and common named character references
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Implicit `<html>`, `<head>`, `<body>`; void elements; implied `</p>`, `</li>`
//!
//! # Not Implemented
//!
//! - Script data escape states and CDATA sections
//! - Table, form and template insertion modes
//! - Foster parenting and the adoption agency algorithm

/// HTML tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{HTMLParser, print_tree};
pub use tokenizer::{HTMLTokenizer, Token, TokenizerState};

use pinpoint_dom::DomTree;

/// Tokenize and build a document from `html` in one step.
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html);
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run()
}
