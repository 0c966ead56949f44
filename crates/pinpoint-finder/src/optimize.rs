//! Shortening a unique path by dropping intermediate levels.

use std::collections::HashSet;

use pinpoint_css::SelectorQuery;

use crate::candidate::Candidate;
use crate::error::FinderError;
use crate::render::render;
use crate::search::{Path, Search};

/// Bookkeeping shared across one optimization, including its recursion.
#[derive(Debug, Default)]
pub struct OptimizeScope {
    /// Removal attempts made so far, bounded by
    /// [`Config::max_number_of_tries`](crate::Config::max_number_of_tries).
    pub attempts: usize,
    /// Rendered selectors already accepted.
    pub visited: HashSet<String>,
}

impl<Q: SelectorQuery + ?Sized> Search<'_, Q> {
    /// Collect into `found` every shorter variant of `path` that still
    /// selects only the target.
    ///
    /// The target (first) and outermost (last) candidates are kept; each
    /// member in between is tried for removal, and every accepted removal is
    /// optimized further. Returns early from a level once a variant repeats
    /// one already seen.
    pub(crate) fn optimize(
        &self,
        path: &[Candidate],
        scope: &mut OptimizeScope,
        found: &mut Vec<Path>,
    ) -> Result<(), FinderError> {
        if path.len() <= 2 || path.len() <= self.config.optimized_min_length {
            return Ok(());
        }

        for i in 1..path.len() - 1 {
            if scope.attempts >= self.config.max_number_of_tries {
                #[cfg(feature = "search-trace")]
                eprintln!("[FINDER] optimizer stopped after {} attempts", scope.attempts);
                return Ok(());
            }
            scope.attempts += 1;

            let mut shorter = path.to_vec();
            let _ = shorter.remove(i);
            let selector = render(&shorter);
            if scope.visited.contains(&selector) {
                return Ok(());
            }
            if self.is_unique(&shorter)? && self.is_same(&shorter)? {
                #[cfg(feature = "search-trace")]
                eprintln!("[FINDER] optimized to {selector:?}");
                let _ = scope.visited.insert(selector);
                found.push(shorter.clone());
                self.optimize(&shorter, scope, found)?;
            }
        }
        Ok(())
    }
}
