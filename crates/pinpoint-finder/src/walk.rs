//! The bottom-up walk from the target toward the root.

use pinpoint_css::SelectorQuery;
use pinpoint_dom::ElementData;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::candidate::{Candidate, candidates};
use crate::config::Config;
use crate::error::FinderError;
use crate::search::{Path, Search, SearchOutcome};

/// Candidates for one ancestor, all tagged with the same level.
pub type Level = Vec<Candidate>;

/// How many alternatives each level keeps. Tried in declaration order: when
/// a mode has too many combinations or finds nothing, the next one runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum BreadthMode {
    /// Every qualifying candidate, each also with an `:nth-child` variant.
    All,
    /// The best candidate and its `:nth-child` variant.
    Two,
    /// The best candidate only, replaced by its `:nth-child` variant when
    /// it has one.
    One,
}

impl BreadthMode {
    /// The next narrower mode, if any.
    #[must_use]
    pub fn narrower(self) -> Option<Self> {
        Self::iter().skip_while(|&mode| mode != self).nth(1)
    }
}

/// Build the level for one element at `distance` from the target.
///
/// `index` is the element's 1-based position among its element siblings.
#[must_use]
pub fn build_level(
    element: &ElementData,
    index: Option<usize>,
    mode: BreadthMode,
    distance: usize,
    config: &Config,
) -> Level {
    let mut level = candidates(element, config);

    match mode {
        BreadthMode::All | BreadthMode::Two => {
            if mode == BreadthMode::Two {
                level.truncate(1);
            }
            if let Some(index) = index {
                let indexed: Vec<Candidate> = level
                    .iter()
                    .filter(|c| c.is_dispensable())
                    .map(|c| c.nth_child(index))
                    .collect();
                level.extend(indexed);
            }
        }
        BreadthMode::One => {
            level.truncate(1);
            if let Some(index) = index
                && let Some(best) = level.first_mut()
                && best.is_dispensable()
            {
                *best = best.nth_child(index);
            }
        }
    }

    for candidate in &mut level {
        candidate.level = distance;
    }
    level
}

impl<Q: SelectorQuery + ?Sized> Search<'_, Q> {
    /// Walk from the target toward the root, one level per element, and
    /// search the accumulated levels for a unique path.
    ///
    /// Falls back to the next narrower [`BreadthMode`] when the levels have
    /// more combinations than the threshold allows, or when the walk reaches
    /// the root without a unique path. The combination count only grows as
    /// levels are added, so once it passes the threshold the rest of this
    /// walk can only defer to the narrower mode.
    pub(crate) fn bottom_up_search(&self, mode: BreadthMode) -> Result<Option<Path>, FinderError> {
        #[cfg(feature = "search-trace")]
        eprintln!("[FINDER] {mode}: walking up from {:?}", self.target);

        let mut stack: Vec<Level> = Vec::new();
        let mut current = Some(self.target);
        let mut searched_full_stack = false;

        while let Some(node) = current
            && current != self.stop
            && let Some(element) = self.tree.as_element(node)
        {
            stack.push(build_level(
                element,
                self.tree.element_index(node),
                mode,
                stack.len(),
                self.config,
            ));
            searched_full_stack = false;

            if stack.len() >= self.config.seed_min_length {
                match self.find_unique_path(&stack)? {
                    SearchOutcome::Unique(path) => {
                        #[cfg(feature = "search-trace")]
                        eprintln!("[FINDER] {mode}: unique path {:?}", crate::render(&path));
                        return Ok(Some(path));
                    }
                    SearchOutcome::TooMany => {
                        #[cfg(feature = "search-trace")]
                        eprintln!(
                            "[FINDER] {mode}: {} combinations over {} levels exceeds threshold {}",
                            crate::combination_count(&stack),
                            stack.len(),
                            self.config.threshold
                        );
                        return self.fall_back(mode);
                    }
                    SearchOutcome::Ambiguous => searched_full_stack = true,
                }
            }
            current = self.tree.parent_element(node);
        }

        if !searched_full_stack && !stack.is_empty() {
            match self.find_unique_path(&stack)? {
                SearchOutcome::Unique(path) => {
                    #[cfg(feature = "search-trace")]
                    eprintln!("[FINDER] {mode}: unique path {:?}", crate::render(&path));
                    return Ok(Some(path));
                }
                SearchOutcome::TooMany | SearchOutcome::Ambiguous => {}
            }
        }
        self.fall_back(mode)
    }

    fn fall_back(&self, mode: BreadthMode) -> Result<Option<Path>, FinderError> {
        match mode.narrower() {
            Some(next) => self.bottom_up_search(next),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(level: &Level) -> Vec<&str> {
        level.iter().map(|c| c.fragment.as_str()).collect()
    }

    fn button() -> ElementData {
        let mut data = ElementData::new("button");
        let _ = data
            .attrs
            .insert("class".to_string(), "btn primary".to_string());
        data
    }

    #[test]
    fn test_narrower_chain() {
        assert_eq!(BreadthMode::All.narrower(), Some(BreadthMode::Two));
        assert_eq!(BreadthMode::Two.narrower(), Some(BreadthMode::One));
        assert_eq!(BreadthMode::One.narrower(), None);
        assert_eq!(BreadthMode::Two.to_string(), "Two");
    }

    #[test]
    fn test_all_keeps_union_and_nth_variants() {
        let level = build_level(&button(), Some(2), BreadthMode::All, 3, &Config::default());
        assert_eq!(
            fragments(&level),
            vec![
                ".btn",
                ".primary",
                "button",
                ".btn:nth-child(2)",
                ".primary:nth-child(2)",
                "button:nth-child(2)",
            ]
        );
        assert!(level.iter().all(|c| c.level == 3));
    }

    #[test]
    fn test_two_keeps_best_and_its_nth_variant() {
        let level = build_level(&button(), Some(2), BreadthMode::Two, 0, &Config::default());
        assert_eq!(fragments(&level), vec![".btn", ".btn:nth-child(2)"]);
    }

    #[test]
    fn test_one_replaces_best_with_nth_variant() {
        let level = build_level(&button(), Some(2), BreadthMode::One, 0, &Config::default());
        assert_eq!(fragments(&level), vec![".btn:nth-child(2)"]);

        let level = build_level(&button(), None, BreadthMode::One, 0, &Config::default());
        assert_eq!(fragments(&level), vec![".btn"]);
    }

    #[test]
    fn test_ids_get_no_nth_variant() {
        let mut data = button();
        let _ = data.attrs.insert("id".to_string(), "go".to_string());
        let level = build_level(&data, Some(1), BreadthMode::Two, 0, &Config::default());
        assert_eq!(fragments(&level), vec!["#go"]);
        let level = build_level(&data, Some(1), BreadthMode::One, 0, &Config::default());
        assert_eq!(fragments(&level), vec!["#go"]);
    }
}
