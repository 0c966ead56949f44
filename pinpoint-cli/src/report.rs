//! Per-target results: finding a selector, verifying it, and printing it.

use owo_colors::OwoColorize;
use pinpoint_css::SelectorQuery;
use pinpoint_dom::{DomTree, NodeId};
use pinpoint_finder::Finder;
use serde::Serialize;

/// Outcome for one target element.
#[derive(Debug, Serialize)]
pub struct Report {
    pub node: usize,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub verified: bool,
}

/// Find a selector for `target` and check it resolves back to it within
/// `scope`.
#[must_use]
pub fn check(tree: &DomTree, finder: &Finder<'_, DomTree>, scope: NodeId, target: NodeId) -> Report {
    let tag = tree
        .as_element(target)
        .map(|e| e.tag_name.clone())
        .unwrap_or_default();

    match finder.find(target) {
        Ok(selector) => {
            let verified = tree
                .query_one(&selector, scope)
                .is_ok_and(|found| found == Some(target));
            Report {
                node: target.0,
                tag,
                selector: Some(selector),
                error: None,
                verified,
            }
        }
        Err(e) => Report {
            node: target.0,
            tag,
            selector: None,
            error: Some(e.to_string()),
            verified: false,
        },
    }
}

/// Number of targets without a verified selector. Any failure makes the
/// process exit non-zero.
#[must_use]
pub fn failures(reports: &[Report]) -> usize {
    reports.iter().filter(|r| !r.verified).count()
}

pub fn print_report(report: &Report) {
    let label = format!("<{}>", report.tag);
    match (&report.selector, &report.error) {
        (Some(selector), _) if report.verified => {
            println!("{:>5} {:<12} {}", report.node, label.dimmed(), selector.green());
        }
        (Some(selector), _) => {
            println!(
                "{:>5} {:<12} {} {}",
                report.node,
                label.dimmed(),
                selector.yellow(),
                "(does not resolve to this element)".red()
            );
        }
        (None, error) => {
            println!(
                "{:>5} {:<12} {}",
                report.node,
                label.dimmed(),
                error.as_deref().unwrap_or("no selector").red()
            );
        }
    }
}
