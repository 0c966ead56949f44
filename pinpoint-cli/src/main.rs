//! Pinpoint CLI - compute and verify unique CSS selectors
//!
//! Every target element gets a selector from the finder, which is then
//! queried back against the document to check it resolves to that element.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use pinpoint_common::warning::{clear_warnings, set_quiet};
use pinpoint_css::SelectorQuery;
use pinpoint_dom::{DomTree, NodeId};
use pinpoint_finder::{Config, Finder};
use pinpoint_html::{parse_document, print_tree};

use report::{Report, check, failures, print_report};

mod report;

/// Pinpoint - shortest unique CSS selectors for HTML elements
#[derive(Parser, Debug)]
#[command(name = "pinpoint")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Selectors for every element in the body
    pinpoint ./index.html

    # Only buttons, with data-test attributes allowed
    pinpoint ./index.html --select button --attr data-test

    # Selectors relative to the main element
    pinpoint ./index.html --root main

    # Inline HTML, JSON output
    pinpoint --html '<ul><li>a</li><li>b</li></ul>' --json
"#)]
struct Cli {
    /// Path to the HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Only compute selectors for elements matching this selector
    #[arg(short, long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Resolve selectors against the first element matching this selector
    #[arg(long, value_name = "SELECTOR")]
    root: Option<String>,

    /// Allow this attribute in selectors (repeatable)
    #[arg(long = "attr", value_name = "NAME")]
    attrs: Vec<String>,

    /// Never use this id (repeatable)
    #[arg(long = "skip-id", value_name = "NAME")]
    skip_ids: Vec<String>,

    /// Never use this class name (repeatable)
    #[arg(long = "skip-class", value_name = "NAME")]
    skip_classes: Vec<String>,

    /// Never use this tag name (repeatable)
    #[arg(long = "skip-tag", value_name = "NAME")]
    skip_tags: Vec<String>,

    /// Levels collected before the first uniqueness search
    #[arg(long, default_value_t = 1)]
    seed_min_length: usize,

    /// Selectors with this many parts or fewer are not optimized
    #[arg(long, default_value_t = 2)]
    optimized_min_length: usize,

    /// Largest number of combinations searched before narrowing
    #[arg(long, default_value_t = 1000)]
    threshold: usize,

    /// Cap on optimizer attempts
    #[arg(long, default_value_t = 10_000)]
    max_tries: usize,

    /// Print a JSON report instead of colored lines
    #[arg(short, long)]
    json: bool,

    /// Print the parsed DOM tree first
    #[arg(long)]
    tree: bool,

    /// Suppress parser and selector warnings
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    set_quiet(cli.quiet);

    let html = load_html(&cli)?;
    clear_warnings();
    let tree = parse_document(&html);

    if cli.tree {
        println!("=== DOM Tree ===");
        print_tree(&tree, tree.root(), 0);
        println!();
    }

    let root = match cli.root.as_deref() {
        Some(selector) => Some(
            tree.query_one(selector, tree.root())?
                .ok_or_else(|| anyhow!("--root {selector:?} matched no element"))?,
        ),
        None => None,
    };
    let config = build_config(&cli, root);
    let finder = Finder::new(&tree, &tree, &config);
    let scope = finder.query_scope();

    let targets = select_targets(&tree, cli.select.as_deref(), root)?;
    let reports: Vec<Report> = targets
        .into_iter()
        .map(|target| check(&tree, &finder, scope, target))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let failed = failures(&reports);
    if failed > 0 {
        if !cli.json {
            eprintln!("{}", format!("{failed} of {} targets failed", reports.len()).red());
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn load_html(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        Ok(html.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    } else {
        bail!("no input: pass a FILE or --html")
    }
}

fn build_config(cli: &Cli, root: Option<NodeId>) -> Config {
    let attrs = cli.attrs.clone();
    let skip_ids = cli.skip_ids.clone();
    let skip_classes = cli.skip_classes.clone();
    let skip_tags = cli.skip_tags.clone();

    let config = Config::default()
        .id_name(move |name| !skip_ids.iter().any(|s| s == name))
        .class_name(move |name| !skip_classes.iter().any(|s| s == name))
        .tag_name(move |name| !skip_tags.iter().any(|s| s.eq_ignore_ascii_case(name)))
        .attr(move |name, _| attrs.iter().any(|a| a == name))
        .seed_min_length(cli.seed_min_length)
        .optimized_min_length(cli.optimized_min_length)
        .threshold(cli.threshold)
        .max_number_of_tries(cli.max_tries);

    match root {
        Some(root) => config.with_root(root),
        None => config,
    }
}

/// Elements matching `--select`, or every element under the root.
fn select_targets(tree: &DomTree, select: Option<&str>, root: Option<NodeId>) -> Result<Vec<NodeId>> {
    let under = root
        .or_else(|| tree.body())
        .unwrap_or_else(|| tree.root());
    match select {
        Some(selector) => Ok(tree.query_all(selector, under)?),
        None => Ok(tree
            .descendants(under)
            .filter(|&id| tree.is_element(id))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pinpoint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_library_config() {
        let config = build_config(&cli(&["--html", "<p></p>"]), None);
        let defaults = Config::default();
        assert_eq!(config.seed_min_length, defaults.seed_min_length);
        assert_eq!(config.optimized_min_length, defaults.optimized_min_length);
        assert_eq!(config.threshold, defaults.threshold);
        assert_eq!(config.max_number_of_tries, defaults.max_number_of_tries);
        assert!(config.root.is_none());
        assert!(!config.accepts_attr("data-test", "x"));
        assert!(config.accepts_id("main"));
    }

    #[test]
    fn test_flags_map_onto_predicates() {
        let args = cli(&[
            "page.html",
            "--attr",
            "data-test",
            "--skip-id",
            "ember1",
            "--skip-class",
            "active",
            "--skip-tag",
            "DIV",
            "--threshold",
            "5",
            "--max-tries",
            "7",
        ]);
        let config = build_config(&args, Some(NodeId(3)));

        assert!(config.accepts_attr("data-test", "save"));
        assert!(!config.accepts_attr("href", "/"));
        assert!(!config.accepts_id("ember1"));
        assert!(config.accepts_id("main"));
        assert!(!config.accepts_class("active"));
        assert!(config.accepts_class("btn"));
        assert!(!config.accepts_tag("div"));
        assert!(config.accepts_tag("span"));
        assert_eq!(config.threshold, 5);
        assert_eq!(config.max_number_of_tries, 7);
        assert_eq!(config.root, Some(NodeId(3)));
    }

    #[test]
    fn test_targets_default_to_elements_under_body() {
        let tree = parse_document("<title>t</title><ul><li>a</li></ul>");
        let targets = select_targets(&tree, None, None).unwrap();
        let tags: Vec<&str> = targets
            .iter()
            .filter_map(|&n| tree.as_element(n).map(|e| e.tag_name.as_str()))
            .collect();
        assert_eq!(tags, vec!["ul", "li"]);

        let only_li = select_targets(&tree, Some("li"), None).unwrap();
        assert_eq!(only_li.len(), 1);
        assert!(select_targets(&tree, Some("li["), None).is_err());
    }
}
