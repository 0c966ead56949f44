//! Turning a path of candidates into selector text.

use crate::candidate::Candidate;

/// Render a path ordered nearest (the target) to farthest.
///
/// Fragments on adjacent levels are joined with the child combinator; a gap
/// left by the optimizer becomes a descendant combinator.
///
/// ```
/// use pinpoint_finder::{Candidate, render};
///
/// let mut span = Candidate::new("span", 2.0);
/// let mut p = Candidate::new("p", 2.0);
/// let mut wrap = Candidate::new(".wrap", 1.0);
/// (span.level, p.level, wrap.level) = (0, 1, 3);
/// assert_eq!(render(&[span, p, wrap]), ".wrap p > span");
/// ```
#[must_use]
pub fn render(path: &[Candidate]) -> String {
    let Some((first, rest)) = path.split_first() else {
        return String::new();
    };

    let mut query = first.fragment.clone();
    let mut nearer = first;
    for farther in rest {
        query = if nearer.level + 1 == farther.level {
            format!("{} > {query}", farther.fragment)
        } else {
            format!("{} {query}", farther.fragment)
        };
        nearer = farther;
    }
    query
}
