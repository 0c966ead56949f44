//! CSS Selector parsing and matching
//!
//! This module implements the subset of
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/) needed to check
//! synthesized selectors: type, universal, class, id, attribute and the
//! structural pseudo-classes, joined by the four combinators.

mod parser;

pub use parser::{SelectorParseError, parse_selector_list};

use pinpoint_dom::{DomTree, ElementData, NodeId, NodeType};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Examples: `div`, `p`, `span`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// Pseudo-class or pseudo-element that always fails to match.
    /// Interactive states (`:hover`, `:focus`) and pseudo-elements have no
    /// meaning for a static document.
    NeverMatch,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// Structural pseudo-class that requires DOM tree context to match.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// Structural pseudo-classes per [§ 14 Tree-Structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children
    /// except, optionally, document white space characters."
    Empty,

    /// [§ 14.4.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    /// "The :nth-child(An+B) pseudo-class notation represents elements that
    /// are among An+Bth elements from the list composed of their inclusive
    /// siblings"
    NthChild(Nth),

    /// [§ 14.4.2 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    /// Like `:nth-child()`, counting from the last sibling.
    NthLastChild(Nth),

    /// [§ 14.4.3 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// Same as `:nth-child(1)`.
    FirstChild,

    /// [§ 14.4.4 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    /// Same as `:nth-last-child(1)`.
    LastChild,

    /// [§ 14.4.5 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    /// "The :only-child pseudo-class represents an element that has no siblings."
    OnlyChild,

    /// [§ 14.5.3 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,

    /// [§ 14.5.4 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
}

/// [§ 14.3 An+B microsyntax](https://www.w3.org/TR/selectors-4/#the-an-b-notation)
///
/// "represents an element whose index among its siblings is An+B for some
/// non-negative integer n"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl Nth {
    /// Whether a 1-based sibling index is selected.
    #[must_use]
    pub fn matches(self, index: usize) -> bool {
        let Ok(index) = i64::try_from(index) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return index == b;
        }
        let offset = index - b;
        offset % a == 0 && offset / a >= 0
    }
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: "Represents an element with the att attribute"
    Exists(String),

    /// `[attr=value]`: "Represents an element with the att attribute whose
    /// value is exactly 'val'."
    Equals(String, String),

    /// `[attr~=value]`: one of the whitespace-separated words is exactly 'val'.
    Includes(String, String),

    /// `[attr|=value]`: exactly 'val' or beginning with 'val' immediately
    /// followed by '-'.
    DashMatch(String, String),

    /// `[attr^=value]`: value begins with 'val'.
    PrefixMatch(String, String),

    /// `[attr$=value]`: value ends with 'val'.
    SuffixMatch(String, String),

    /// `[attr*=value]`: value contains 'val'.
    SubstringMatch(String, String),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    Descendant,
    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    Child,
    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// "A selector of the form 'A + B' represents an element B that
    /// immediately follows element A, where A and B share the same parent."
    NextSibling,
    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately), where A and B share the same
    /// parent."
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors separated
/// by combinators."
///
/// `div.wrap > p span` is stored as:
/// ```text
/// subject: [span]
/// combinators: [(Descendant, [p]), (Child, [div.wrap])]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,
    /// Chain of (combinator, compound) pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#selector-list)
///
/// "A selector list is a comma-separated list of selectors; it matches any
/// element that is matched by at least one of the selectors."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// The comma-separated alternatives.
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Whether any selector in the list matches the element.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node_id))
    }
}

impl ComplexSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against an element with full tree context. Relationships are
    /// checked from the subject outward, backtracking when an ancestor or
    /// sibling that matches one compound does not satisfy the rest of the
    /// chain.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.subject.matches(tree, node_id) && self.matches_from(tree, node_id, 0)
    }

    fn matches_from(&self, tree: &DomTree, current: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.combinators.get(index) else {
            return true;
        };
        let rest = |candidate: NodeId| {
            compound.matches(tree, candidate) && self.matches_from(tree, candidate, index + 1)
        };

        match combinator {
            Combinator::Descendant => tree.ancestors(current).any(rest),
            Combinator::Child => tree.parent_element(current).is_some_and(rest),
            Combinator::NextSibling => previous_element_sibling(tree, current).is_some_and(rest),
            Combinator::SubsequentSibling => tree
                .preceding_siblings(current)
                .filter(|&s| tree.is_element(s))
                .any(rest),
        }
    }
}

impl CompoundSelector {
    /// Whether every simple selector matches the node. Non-elements never match.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        let Some(element) = tree.as_element(node_id) else {
            return false;
        };
        self.simple_selectors.iter().all(|simple| match simple {
            SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node_id, element),
            _ => simple.matches(element),
        })
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches the given element, without tree
    /// context. Structural pseudo-classes never match here.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            // HTML element names are ASCII case-insensitive.
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.has_class(class_name),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Universal => true,
            Self::NeverMatch | Self::PseudoClass(_) => false,
            Self::Attribute(attr_sel) => attr_sel.matches(element),
        }
    }
}

impl AttributeSelector {
    /// Check the attribute condition against an element.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let value = |name: &str| element.attrs.get(name);
        match self {
            Self::Exists(name) => element.attrs.contains_key(name),
            Self::Equals(name, val) => value(name) == Some(val.as_str()),
            Self::Includes(name, val) => value(name).is_some_and(|v| {
                !val.is_empty() && v.split_ascii_whitespace().any(|w| w == val)
            }),
            Self::DashMatch(name, val) => value(name).is_some_and(|v| {
                v == val || (v.starts_with(val.as_str()) && v[val.len()..].starts_with('-'))
            }),
            // "If 'val' is the empty string then the selector does not represent anything."
            Self::PrefixMatch(name, val) => {
                value(name).is_some_and(|v| !val.is_empty() && v.starts_with(val.as_str()))
            }
            Self::SuffixMatch(name, val) => {
                value(name).is_some_and(|v| !val.is_empty() && v.ends_with(val.as_str()))
            }
            Self::SubstringMatch(name, val) => {
                value(name).is_some_and(|v| !val.is_empty() && v.contains(val.as_str()))
            }
        }
    }
}

/// [§ 14 Tree-Structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
///
/// "Standalone text and other non-element nodes are not counted when
/// calculating the position of an element in the list of children of its
/// parent."
fn pseudo_class_matches(
    pc: PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let Some(parent) = tree.parent(node_id) else {
        // Detached elements have no siblings to count.
        return matches!(pc, PseudoClass::Empty) && is_empty(tree, node_id);
    };

    let same_type = |id: NodeId| {
        tree.as_element(id)
            .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(&element.tag_name))
    };

    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::Empty => is_empty(tree, node_id),
        PseudoClass::NthChild(nth) => tree.element_index(node_id).is_some_and(|i| nth.matches(i)),
        PseudoClass::NthLastChild(nth) => nth.matches(
            tree.following_siblings(node_id)
                .filter(|&s| tree.is_element(s))
                .count()
                + 1,
        ),
        PseudoClass::FirstChild => previous_element_sibling(tree, node_id).is_none(),
        PseudoClass::LastChild => !tree
            .following_siblings(node_id)
            .any(|s| tree.is_element(s)),
        PseudoClass::OnlyChild => tree.element_children(parent).count() == 1,
        PseudoClass::FirstOfType => !tree.preceding_siblings(node_id).any(same_type),
        PseudoClass::LastOfType => !tree.following_siblings(node_id).any(same_type),
    }
}

/// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
fn is_empty(tree: &DomTree, node_id: NodeId) -> bool {
    tree.children(node_id)
        .iter()
        .all(|&c| match tree.get(c).map(|n| &n.node_type) {
            Some(NodeType::Text(t)) => t.chars().all(|ch| ch.is_ascii_whitespace()),
            Some(NodeType::Comment(_)) => true,
            _ => false,
        })
}

/// Find the immediately preceding element sibling (skipping text/comment nodes).
fn previous_element_sibling(tree: &DomTree, node_id: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node_id)
        .find(|&sibling_id| tree.is_element(sibling_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_formulas() {
        let odd = Nth { a: 2, b: 1 };
        assert!(odd.matches(1) && odd.matches(3) && !odd.matches(2));

        let first_three = Nth { a: -1, b: 3 };
        assert!(first_three.matches(1) && first_three.matches(3) && !first_three.matches(4));

        let exact = Nth { a: 0, b: 2 };
        assert!(exact.matches(2) && !exact.matches(4));

        let from_four = Nth { a: 1, b: 4 };
        assert!(!from_four.matches(3) && from_four.matches(4) && from_four.matches(9));
    }
}
