//! Selector fragments for a single element.

use pinpoint_css::escape::{EscapeOptions, Quote, escape, escape_identifier};
use pinpoint_dom::ElementData;

use crate::config::Config;

/// Cost of each kind of fragment. Lower is preferred.
pub mod penalty {
    /// `#id`
    pub const ID: f64 = 0.0;
    /// `[name="value"]`
    pub const ATTRIBUTE: f64 = 0.5;
    /// `.class`
    pub const CLASS: f64 = 1.0;
    /// `tag`
    pub const TAG: f64 = 2.0;
    /// `*`
    pub const WILDCARD: f64 = 3.0;
    /// Added for a `:nth-child(n)` suffix.
    pub const NTH_CHILD: f64 = 1.0;
}

/// One scored selector fragment for an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Ready-to-join selector text (`#id`, `.cls`, `div:nth-child(2)`).
    pub fragment: String,
    /// Ranking cost.
    pub penalty: f64,
    /// Distance of the element from the target (0 is the target itself).
    pub level: usize,
}

impl Candidate {
    /// A candidate at level 0.
    #[must_use]
    pub fn new(fragment: impl Into<String>, penalty: f64) -> Self {
        Self {
            fragment: fragment.into(),
            penalty,
            level: 0,
        }
    }

    /// This fragment narrowed to the `index`th (1-based) element child.
    #[must_use]
    pub fn nth_child(&self, index: usize) -> Self {
        Self {
            fragment: format!("{}:nth-child({index})", self.fragment),
            penalty: self.penalty + penalty::NTH_CHILD,
            level: self.level,
        }
    }

    /// Whether an `:nth-child` variant is worth generating. Ids are already
    /// unique and `html` has no siblings.
    #[must_use]
    pub fn is_dispensable(&self) -> bool {
        self.fragment != "html" && !self.fragment.starts_with('#')
    }
}

/// `name` escaped as an identifier, or `None` when no escaping makes it one.
///
/// The escaper leaves a lone `-` (and the empty string) as is, and neither
/// starts an identifier, so `#-` or `.-` would be rejected by any selector
/// parser.
fn identifier(name: &str) -> Option<String> {
    let escaped = escape_identifier(name);
    (!escaped.is_empty() && escaped != "-").then_some(escaped)
}

/// `#id` when the element has an id accepted by the config that can be
/// written as an identifier.
#[must_use]
pub fn id(element: &ElementData, config: &Config) -> Option<Candidate> {
    element
        .id()
        .filter(|id| config.accepts_id(id))
        .and_then(identifier)
        .map(|id| Candidate::new(format!("#{id}"), penalty::ID))
}

/// `[name="value"]` for every accepted attribute, in document order.
#[must_use]
pub fn attributes(element: &ElementData, config: &Config) -> Vec<Candidate> {
    let value_options = EscapeOptions::string(Quote::Double);
    element
        .attrs
        .iter()
        .filter(|attr| config.accepts_attr(&attr.name, &attr.value))
        .filter_map(|attr| {
            let name = identifier(&attr.name)?;
            Some(Candidate::new(
                format!("[{name}=\"{}\"]", escape(&attr.value, &value_options)),
                penalty::ATTRIBUTE,
            ))
        })
        .collect()
}

/// `.class` for every accepted class token.
#[must_use]
pub fn class_names(element: &ElementData, config: &Config) -> Vec<Candidate> {
    element
        .class_list()
        .into_iter()
        .filter(|name| config.accepts_class(name))
        .filter_map(identifier)
        .map(|name| Candidate::new(format!(".{name}"), penalty::CLASS))
        .collect()
}

/// The lower-cased tag name, when accepted.
#[must_use]
pub fn tag_name(element: &ElementData, config: &Config) -> Option<Candidate> {
    let name = element.tag_name.to_ascii_lowercase();
    config
        .accepts_tag(&name)
        .then(|| Candidate::new(escape_identifier(&name), penalty::TAG))
}

/// The universal selector, used when nothing else qualifies.
#[must_use]
pub fn any() -> Candidate {
    Candidate::new("*", penalty::WILDCARD)
}

/// Every qualifying candidate for an element, cheapest source first: id,
/// attributes, classes, tag. Falls back to `*` when none qualify.
#[must_use]
pub fn candidates(element: &ElementData, config: &Config) -> Vec<Candidate> {
    let mut all: Vec<Candidate> = id(element, config).into_iter().collect();
    all.extend(attributes(element, config));
    all.extend(class_names(element, config));
    all.extend(tag_name(element, config));
    if all.is_empty() {
        all.push(any());
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            let _ = data.attrs.insert((*name).to_string(), (*value).to_string());
        }
        data
    }

    fn fragments(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.fragment.as_str()).collect()
    }

    #[test]
    fn test_candidates_in_precedence_order() {
        let data = element("DIV", &[("class", "b a"), ("id", "main"), ("role", "nav")]);
        let config = Config::default().attr(|name, _| name == "role");
        assert_eq!(
            fragments(&candidates(&data, &config)),
            vec!["#main", "[role=\"nav\"]", ".b", ".a", "div"]
        );
    }

    #[test]
    fn test_rejected_sources_fall_back_to_wildcard() {
        let data = element("span", &[("class", "x")]);
        let config = Config::default()
            .class_name(|_| false)
            .tag_name(|_| false);
        assert_eq!(fragments(&candidates(&data, &config)), vec!["*"]);
    }

    #[test]
    fn test_lone_hyphen_names_are_skipped() {
        let data = element("p", &[("id", "-"), ("class", "- ok"), ("-", "v")]);
        let config = Config::default().attr(|_, _| true);
        assert!(id(&data, &config).is_none());
        assert_eq!(fragments(&class_names(&data, &config)), vec![".ok"]);
        assert_eq!(
            fragments(&attributes(&data, &config)),
            vec!["[id=\"-\"]", "[class=\"- ok\"]"]
        );
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let data = element("p", &[("id", "")]);
        assert!(id(&data, &Config::default()).is_none());
    }

    #[test]
    fn test_fragments_are_escaped() {
        let data = element(
            "a",
            &[("id", "1st"), ("class", "w-1/2"), ("data-q", "say \"hi\"")],
        );
        let config = Config::default().attr(|_, _| true);
        assert_eq!(id(&data, &config).unwrap().fragment, "#\\31st");
        assert_eq!(class_names(&data, &config)[0].fragment, ".w-1\\/2");
        assert_eq!(
            attributes(&data, &config)[2].fragment,
            "[data-q=\"say \\\"hi\\\"\"]"
        );
    }

    #[test]
    fn test_nth_child_variant() {
        let tag = Candidate::new("li", penalty::TAG);
        let nth = tag.nth_child(3);
        assert_eq!(nth.fragment, "li:nth-child(3)");
        assert!((nth.penalty - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dispensable() {
        assert!(Candidate::new(".x", penalty::CLASS).is_dispensable());
        assert!(Candidate::new("*", penalty::WILDCARD).is_dispensable());
        assert!(!Candidate::new("#x", penalty::ID).is_dispensable());
        assert!(!Candidate::new("html", penalty::TAG).is_dispensable());
    }
}
