//! CSS support for Pinpoint: token escaping, selector parsing and matching,
//! and selector queries over a [`pinpoint_dom::DomTree`].

pub mod escape;
pub mod query;
pub mod selector;

pub use escape::{EscapeOptions, Quote, escape, escape_identifier, escape_utf16};
pub use query::{QueryError, SelectorQuery};
pub use selector::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth, PseudoClass,
    SelectorList, SelectorParseError, SimpleSelector, parse_selector_list,
};
