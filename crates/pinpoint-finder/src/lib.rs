//! Unique CSS selector synthesis.
//!
//! Given an element of a [`DomTree`], [`finder`] computes a short, low-cost
//! selector that matches that element and nothing else under the configured
//! root.
//!
//! # Pipeline
//!
//! 1. **Candidates**: each element on the way up contributes scored
//!    fragments (`#id`, `[attr="v"]`, `.class`, `tag`, `*`), optionally
//!    narrowed with `:nth-child(n)`.
//! 2. **Walk**: one level of candidates per ancestor, from the target
//!    toward the root, in one of three [`BreadthMode`]s.
//! 3. **Search**: combinations of the levels are ranked by penalty and the
//!    first one matching only the target wins. Too many combinations, or no
//!    unique one, moves on to a narrower mode.
//! 4. **Optimize**: intermediate levels are dropped while the selector still
//!    resolves to the target, and the cheapest variant is rendered.
//!
//! ```
//! use pinpoint_finder::{Config, finder};
//! use pinpoint_html::parse_document;
//!
//! let tree = parse_document(r#"<ul><li class="item">a</li><li class="item">b</li></ul>"#);
//! let second = tree
//!     .descendants(tree.root())
//!     .filter(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == "li"))
//!     .nth(1)
//!     .unwrap();
//!
//! let selector = finder(&tree, second, &Config::default()).unwrap();
//! assert_eq!(selector, ".item:nth-child(2)");
//! ```

pub mod candidate;
pub mod config;
pub mod error;
pub mod optimize;
pub mod render;
pub mod search;
pub mod walk;

use pinpoint_css::SelectorQuery;
use pinpoint_dom::{DomTree, NodeId};

pub use candidate::{Candidate, penalty};
pub use config::{AttributePredicate, Config, NamePredicate};
pub use error::FinderError;
pub use optimize::OptimizeScope;
pub use render::render;
pub use search::{Combinations, Path, combination_count, sort_by_penalty};
pub use walk::{BreadthMode, Level, build_level};

use search::Search;

/// Find a unique selector for `element`, querying `tree` itself.
///
/// # Errors
///
/// See [`Finder::find`].
pub fn finder(tree: &DomTree, element: NodeId, config: &Config) -> Result<String, FinderError> {
    Finder::new(tree, tree, config).find(element)
}

/// Selector synthesis against a document, with a pluggable query provider.
///
/// The tree supplies structure (parents, siblings, attributes); every
/// uniqueness and identity check goes through `query`.
pub struct Finder<'a, Q: SelectorQuery + ?Sized> {
    tree: &'a DomTree,
    query: &'a Q,
    config: &'a Config,
}

impl<'a, Q: SelectorQuery + ?Sized> Finder<'a, Q> {
    /// Create a finder over `tree`, checking selectors with `query`.
    #[must_use]
    pub const fn new(tree: &'a DomTree, query: &'a Q, config: &'a Config) -> Self {
        Self { tree, query, config }
    }

    /// Find a unique selector for `element`.
    ///
    /// The `html` element is always `"html"`. Otherwise the walk runs in
    /// [`BreadthMode::All`], narrowing as needed, and the resulting path is
    /// optimized.
    ///
    /// # Errors
    ///
    /// - [`FinderError::NotAnElement`] if `element` is not an element.
    /// - [`FinderError::OutsideRoot`] if `element` is not under the root
    ///   queries are scoped to.
    /// - [`FinderError::NotFound`] if no breadth mode produced a unique path.
    /// - [`FinderError::NoMatch`] if a generated selector matched nothing.
    /// - [`FinderError::Query`] if the query provider failed.
    pub fn find(&self, element: NodeId) -> Result<String, FinderError> {
        let Some(data) = self.tree.as_element(element) else {
            return Err(FinderError::NotAnElement(element));
        };
        if data.tag_name.eq_ignore_ascii_case("html") {
            return Ok("html".to_string());
        }

        let (root, scope) = self.resolve_root();
        if !self.tree.is_descendant_of(element, scope) {
            return Err(FinderError::OutsideRoot {
                element,
                root: scope,
            });
        }

        let search = Search {
            tree: self.tree,
            query: self.query,
            config: self.config,
            target: element,
            scope,
            stop: self.tree.parent_element(root),
        };

        let path = search
            .bottom_up_search(BreadthMode::All)?
            .ok_or(FinderError::NotFound)?;

        let mut scope = OptimizeScope::default();
        let mut found = Vec::new();
        search.optimize(&path, &mut scope, &mut found)?;

        let mut paths = Vec::with_capacity(found.len() + 1);
        paths.push(path);
        paths.extend(found);
        sort_by_penalty(&mut paths);

        #[cfg(feature = "search-trace")]
        eprintln!(
            "[FINDER] {} optimized variants after {} attempts",
            paths.len() - 1,
            scope.attempts
        );

        paths
            .first()
            .map(|best| render(best))
            .ok_or(FinderError::NotFound)
    }

    /// The node every uniqueness query is scoped to: the configured element
    /// root, or the document.
    #[must_use]
    pub fn query_scope(&self) -> NodeId {
        self.resolve_root().1
    }

    /// The node the walk stops below, and the node queries are scoped to.
    ///
    /// Without a configured root the walk stops below `<body>` (or the
    /// document element, or the document) and queries cover the whole
    /// document. A configured root that is the document or the default root
    /// behaves the same; any other element root scopes queries to its
    /// descendants.
    fn resolve_root(&self) -> (NodeId, NodeId) {
        let document = self.tree.root();
        let default_root = self
            .tree
            .body()
            .or_else(|| self.tree.document_element())
            .unwrap_or(document);

        match self.config.root {
            Some(root) if root != document && root != default_root => (root, root),
            Some(root) => (root, document),
            None => (default_root, document),
        }
    }
}
