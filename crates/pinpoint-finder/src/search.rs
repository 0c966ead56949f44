//! Combination search over candidate levels.

use pinpoint_css::SelectorQuery;
use pinpoint_dom::{DomTree, NodeId};

use crate::candidate::Candidate;
use crate::config::Config;
use crate::error::FinderError;
use crate::render::render;
use crate::walk::Level;

/// Candidates ordered nearest (index 0, the target) to farthest.
pub type Path = Vec<Candidate>;

/// Total penalty of a path.
#[must_use]
pub fn penalty(path: &[Candidate]) -> f64 {
    path.iter().map(|c| c.penalty).sum()
}

/// Stable sort by total penalty; equal-cost paths keep their order.
pub fn sort_by_penalty(paths: &mut [Path]) {
    paths.sort_by(|a, b| penalty(a).total_cmp(&penalty(b)));
}

/// Number of paths [`Combinations`] yields for `stack`, saturating at
/// `usize::MAX`.
#[must_use]
pub fn combination_count(stack: &[Level]) -> usize {
    stack
        .iter()
        .try_fold(1usize, |total, level| total.checked_mul(level.len()))
        .unwrap_or(usize::MAX)
}

/// Lazy cartesian product of a level stack: one candidate per level, in
/// level order. The first level varies slowest.
#[derive(Debug)]
pub struct Combinations<'a> {
    stack: &'a [Level],
    /// Index into each level of the next path; `None` once exhausted.
    indices: Option<Vec<usize>>,
}

impl<'a> Combinations<'a> {
    /// Enumerate the paths of `stack`. An empty stack yields one empty path;
    /// a stack with an empty level yields nothing.
    #[must_use]
    pub fn new(stack: &'a [Level]) -> Self {
        let indices = stack
            .iter()
            .all(|level| !level.is_empty())
            .then(|| vec![0; stack.len()]);
        Self { stack, indices }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        let indices = self.indices.as_mut()?;
        let path = self
            .stack
            .iter()
            .zip(indices.iter())
            .map(|(level, &i)| level[i].clone())
            .collect();

        // Advance the odometer from the last level.
        let mut position = indices.len();
        loop {
            if position == 0 {
                self.indices = None;
                break;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < self.stack[position].len() {
                break;
            }
            indices[position] = 0;
        }
        Some(path)
    }
}

/// Result of searching one level stack.
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    /// A path whose selector matches only the target.
    Unique(Path),
    /// Every path matched more than one element.
    Ambiguous,
    /// The stack has more combinations than the threshold allows.
    TooMany,
}

/// State shared by the walker, search and optimizer for one `finder` call.
pub(crate) struct Search<'a, Q: SelectorQuery + ?Sized> {
    pub(crate) tree: &'a DomTree,
    pub(crate) query: &'a Q,
    pub(crate) config: &'a Config,
    /// The element a selector is being built for.
    pub(crate) target: NodeId,
    /// Node all queries are scoped to.
    pub(crate) scope: NodeId,
    /// The walk stops before reaching this node (the root's parent element).
    pub(crate) stop: Option<NodeId>,
}

impl<Q: SelectorQuery + ?Sized> Search<'_, Q> {
    /// Rank every path of `stack` by penalty and return the first unique one.
    pub(crate) fn find_unique_path(&self, stack: &[Level]) -> Result<SearchOutcome, FinderError> {
        if combination_count(stack) > self.config.threshold {
            return Ok(SearchOutcome::TooMany);
        }

        let mut paths: Vec<Path> = Combinations::new(stack).collect();
        sort_by_penalty(&mut paths);

        for path in paths {
            if self.is_unique(&path)? {
                return Ok(SearchOutcome::Unique(path));
            }
        }
        Ok(SearchOutcome::Ambiguous)
    }

    /// Whether the path's selector matches exactly one element in scope.
    ///
    /// A selector built from the target's own features always matches at
    /// least the target, so zero matches is reported as an error.
    pub(crate) fn is_unique(&self, path: &[Candidate]) -> Result<bool, FinderError> {
        let selector = render(path);
        match self.query.query_all(&selector, self.scope)?.len() {
            0 => Err(FinderError::NoMatch { selector }),
            1 => Ok(true),
            _ => Ok(false),
        }
    }

    /// Whether the path's selector resolves to the target itself.
    pub(crate) fn is_same(&self, path: &[Candidate]) -> Result<bool, FinderError> {
        let selector = render(path);
        Ok(self.query.query_one(&selector, self.scope)? == Some(self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(fragments: &[&str]) -> Level {
        fragments.iter().map(|f| Candidate::new(*f, 1.0)).collect()
    }

    fn names(path: &[Candidate]) -> String {
        path.iter()
            .map(|c| c.fragment.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_combinations_first_level_varies_slowest() {
        let stack = vec![level(&["a", "b"]), level(&["x", "y", "z"])];
        let all: Vec<String> = Combinations::new(&stack).map(|p| names(&p)).collect();
        assert_eq!(all, vec!["a,x", "a,y", "a,z", "b,x", "b,y", "b,z"]);
        assert_eq!(combination_count(&stack), 6);
    }

    #[test]
    fn test_combinations_edge_cases() {
        let empty: Vec<Level> = Vec::new();
        assert_eq!(Combinations::new(&empty).count(), 1);
        assert_eq!(combination_count(&empty), 1);

        let with_hole = vec![level(&["a"]), Vec::new()];
        assert_eq!(Combinations::new(&with_hole).count(), 0);
        assert_eq!(combination_count(&with_hole), 0);
    }

    #[test]
    fn test_combination_count_saturates() {
        let wide = level(&vec!["a"; 1 << 16]);
        let stack = vec![wide; 4];
        assert_eq!(combination_count(&stack), usize::MAX);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut paths = vec![
            vec![Candidate::new("b", 2.0)],
            vec![Candidate::new("a", 1.0)],
            vec![Candidate::new("c", 2.0)],
            vec![Candidate::new("d", 0.5), Candidate::new("e", 0.5)],
        ];
        sort_by_penalty(&mut paths);
        let order: Vec<String> = paths.iter().map(|p| names(p)).collect();
        assert_eq!(order, vec!["a", "d,e", "b", "c"]);
    }

    #[test]
    fn test_find_unique_path_outcomes() {
        use pinpoint_dom::{ElementData, NodeType};

        let mut tree = DomTree::new();
        let mut divs = Vec::new();
        for _ in 0..2 {
            let mut data = ElementData::new("div");
            let _ = data.attrs.insert("class".to_string(), "x".to_string());
            let div = tree.alloc(NodeType::Element(data));
            tree.append_child(tree.root(), div);
            divs.push(div);
        }

        let config = Config::default();
        let search = Search {
            tree: &tree,
            query: &tree,
            config: &config,
            target: divs[1],
            scope: tree.root(),
            stop: None,
        };

        let ambiguous = vec![level(&[".x"])];
        assert!(matches!(
            search.find_unique_path(&ambiguous).unwrap(),
            SearchOutcome::Ambiguous
        ));

        let stack = vec![level(&[".x", ".x:nth-child(2)"])];
        match search.find_unique_path(&stack).unwrap() {
            SearchOutcome::Unique(path) => assert_eq!(names(&path), ".x:nth-child(2)"),
            other => panic!("expected a unique path, got {other:?}"),
        }

        let narrow = Config::default().threshold(1);
        let search = Search {
            config: &narrow,
            ..search
        };
        assert!(matches!(
            search.find_unique_path(&stack).unwrap(),
            SearchOutcome::TooMany
        ));
    }
}
