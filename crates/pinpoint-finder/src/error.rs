//! Errors returned by the selector finder.

use pinpoint_css::QueryError;
use pinpoint_dom::NodeId;
use thiserror::Error;

/// Why no selector could be produced for an element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinderError {
    /// The node is not an element (document, text or comment node), or does
    /// not exist.
    #[error("can't generate a CSS selector for non-element node {0:?}")]
    NotAnElement(NodeId),

    /// The element is not a descendant of the node selectors are resolved
    /// against, so no selector can match it.
    #[error("element {element:?} is outside the query root {root:?}")]
    OutsideRoot {
        /// The requested element.
        element: NodeId,
        /// The node queries are scoped to.
        root: NodeId,
    },

    /// Every breadth mode was tried without finding a unique selector.
    #[error("selector was not found")]
    NotFound,

    /// A selector built from the element's own features matched nothing.
    /// The configured predicates and the query provider disagree about the
    /// document.
    #[error("generated selector {selector:?} matched no elements")]
    NoMatch {
        /// The offending selector.
        selector: String,
    },

    /// The query provider rejected a selector or scope.
    #[error(transparent)]
    Query(#[from] QueryError),
}
