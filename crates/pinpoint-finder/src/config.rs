//! Finder configuration.

use std::fmt;

use pinpoint_dom::NodeId;

/// Predicate over an id, class or tag name.
pub type NamePredicate = Box<dyn Fn(&str) -> bool>;

/// Predicate over an attribute name and value.
pub type AttributePredicate = Box<dyn Fn(&str, &str) -> bool>;

/// Options for [`crate::finder`].
///
/// Built from [`Config::default`] with the chained setters:
///
/// ```
/// use pinpoint_finder::Config;
///
/// let config = Config::default()
///     .class_name(|name| !name.starts_with("is-"))
///     .attr(|name, _| name == "data-test")
///     .threshold(500);
/// assert!(!config.accepts_class("is-active"));
/// assert!(config.accepts_attr("data-test", "save"));
/// ```
pub struct Config {
    /// Node the selector is resolved against. Defaults to the document's
    /// `<body>` (then the document element, then the document itself).
    pub root: Option<NodeId>,
    id_name: NamePredicate,
    class_name: NamePredicate,
    tag_name: NamePredicate,
    attr: AttributePredicate,
    /// Minimum number of levels collected before the first uniqueness search.
    pub seed_min_length: usize,
    /// Paths no longer than this are not optimized.
    pub optimized_min_length: usize,
    /// Largest number of level combinations enumerated before falling back
    /// to a narrower breadth mode.
    pub threshold: usize,
    /// Cap on removal attempts made by the optimizer.
    pub max_number_of_tries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            id_name: Box::new(|_| true),
            class_name: Box::new(|_| true),
            tag_name: Box::new(|_| true),
            attr: Box::new(|_, _| false),
            seed_min_length: 1,
            optimized_min_length: 2,
            threshold: 1000,
            max_number_of_tries: 10_000,
        }
    }
}

impl Config {
    /// Resolve selectors against `root` instead of the document body.
    #[must_use]
    pub const fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    /// Only use ids accepted by `predicate`.
    #[must_use]
    pub fn id_name(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.id_name = Box::new(predicate);
        self
    }

    /// Only use class names accepted by `predicate`.
    #[must_use]
    pub fn class_name(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.class_name = Box::new(predicate);
        self
    }

    /// Only use (lower-cased) tag names accepted by `predicate`.
    #[must_use]
    pub fn tag_name(mut self, predicate: impl Fn(&str) -> bool + 'static) -> Self {
        self.tag_name = Box::new(predicate);
        self
    }

    /// Use attributes accepted by `predicate`. No attributes are used by default.
    #[must_use]
    pub fn attr(mut self, predicate: impl Fn(&str, &str) -> bool + 'static) -> Self {
        self.attr = Box::new(predicate);
        self
    }

    /// Set [`Config::seed_min_length`].
    #[must_use]
    pub const fn seed_min_length(mut self, length: usize) -> Self {
        self.seed_min_length = length;
        self
    }

    /// Set [`Config::optimized_min_length`].
    #[must_use]
    pub const fn optimized_min_length(mut self, length: usize) -> Self {
        self.optimized_min_length = length;
        self
    }

    /// Set [`Config::threshold`].
    #[must_use]
    pub const fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set [`Config::max_number_of_tries`].
    #[must_use]
    pub const fn max_number_of_tries(mut self, tries: usize) -> Self {
        self.max_number_of_tries = tries;
        self
    }

    /// Whether an id may appear in selectors.
    #[must_use]
    pub fn accepts_id(&self, name: &str) -> bool {
        (self.id_name)(name)
    }

    /// Whether a class name may appear in selectors.
    #[must_use]
    pub fn accepts_class(&self, name: &str) -> bool {
        (self.class_name)(name)
    }

    /// Whether a tag name may appear in selectors.
    #[must_use]
    pub fn accepts_tag(&self, name: &str) -> bool {
        (self.tag_name)(name)
    }

    /// Whether an attribute may appear in selectors.
    #[must_use]
    pub fn accepts_attr(&self, name: &str, value: &str) -> bool {
        (self.attr)(name, value)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("root", &self.root)
            .field("seed_min_length", &self.seed_min_length)
            .field("optimized_min_length", &self.optimized_min_length)
            .field("threshold", &self.threshold)
            .field("max_number_of_tries", &self.max_number_of_tries)
            .finish_non_exhaustive()
    }
}
