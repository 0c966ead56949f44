//! [DOM § 4.2.6 Mixin ParentNode](https://dom.spec.whatwg.org/#interface-parentnode)
//!
//! "The querySelectorAll(selectors) method steps are to return the static
//! result of running scope-match a selectors string selectors against this."
//!
//! Selector queries are a trait so that callers needing uniqueness checks
//! can run against any document model, or a scripted stand-in under test.

use pinpoint_dom::{DomTree, NodeId};
use thiserror::Error;

use crate::selector::{SelectorList, SelectorParseError, parse_selector_list};

/// Errors reported by a [`SelectorQuery`] provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// "If s is failure, then throw a "SyntaxError" DOMException."
    #[error("invalid selector {selector:?}: {source}")]
    InvalidSelector {
        /// The rejected selector text.
        selector: String,
        /// What the parser objected to.
        #[source]
        source: SelectorParseError,
    },
    /// The scope node does not exist or cannot have descendants.
    #[error("invalid query scope {0:?}")]
    InvalidScope(NodeId),
}

/// Selector queries scoped to a node, with `querySelectorAll` semantics:
/// results are descendants of the scope (the scope itself is excluded), in
/// tree order, while the selector is matched against the whole tree.
pub trait SelectorQuery {
    /// All elements under `scope` matching `selector`, in tree order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the selector does not parse or the scope
    /// is not a document or element.
    fn query_all(&self, selector: &str, scope: NodeId) -> Result<Vec<NodeId>, QueryError>;

    /// The first element under `scope` matching `selector`.
    ///
    /// # Errors
    ///
    /// Same as [`SelectorQuery::query_all`].
    fn query_one(&self, selector: &str, scope: NodeId) -> Result<Option<NodeId>, QueryError> {
        Ok(self.query_all(selector, scope)?.into_iter().next())
    }
}

impl SelectorQuery for DomTree {
    fn query_all(&self, selector: &str, scope: NodeId) -> Result<Vec<NodeId>, QueryError> {
        let list = parse(selector)?;
        check_scope(self, scope)?;
        Ok(self
            .descendants(scope)
            .filter(|&id| list.matches(self, id))
            .collect())
    }

    fn query_one(&self, selector: &str, scope: NodeId) -> Result<Option<NodeId>, QueryError> {
        let list = parse(selector)?;
        check_scope(self, scope)?;
        Ok(self.descendants(scope).find(|&id| list.matches(self, id)))
    }
}

fn parse(selector: &str) -> Result<SelectorList, QueryError> {
    parse_selector_list(selector).map_err(|source| QueryError::InvalidSelector {
        selector: selector.to_string(),
        source,
    })
}

fn check_scope(tree: &DomTree, scope: NodeId) -> Result<(), QueryError> {
    if scope == tree.root() || tree.is_element(scope) {
        Ok(())
    } else {
        Err(QueryError::InvalidScope(scope))
    }
}
