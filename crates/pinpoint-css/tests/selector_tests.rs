//! Tests for selector parsing and matching.

use pinpoint_css::selector::{
    AttributeSelector, Combinator, Nth, PseudoClass, SelectorList, SelectorParseError,
    SimpleSelector, parse_selector_list,
};
use pinpoint_dom::{DomTree, NodeId};
use pinpoint_html::parse_document;

fn parse(selector: &str) -> SelectorList {
    parse_selector_list(selector).unwrap_or_else(|e| panic!("{selector:?}: {e}"))
}

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).and_then(|e| e.id()) == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

fn matches(tree: &DomTree, selector: &str, id: &str) -> bool {
    parse(selector).matches(tree, by_id(tree, id))
}

// ========== parsing ==========

#[test]
fn test_parse_compound() {
    let list = parse("div#main.a.b[data-x]");
    let subject = &list.selectors[0].subject.simple_selectors;
    assert_eq!(
        subject,
        &vec![
            SimpleSelector::Type("div".to_string()),
            SimpleSelector::Id("main".to_string()),
            SimpleSelector::Class("a".to_string()),
            SimpleSelector::Class("b".to_string()),
            SimpleSelector::Attribute(AttributeSelector::Exists("data-x".to_string())),
        ]
    );
}

#[test]
fn test_parse_combinator_chain_right_to_left() {
    let list = parse(".wrap > p span + em ~ b");
    let complex = &list.selectors[0];
    assert_eq!(
        complex.subject.simple_selectors,
        vec![SimpleSelector::Type("b".to_string())]
    );
    let combinators: Vec<Combinator> = complex.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::SubsequentSibling,
            Combinator::NextSibling,
            Combinator::Descendant,
            Combinator::Child,
        ]
    );
}

#[test]
fn test_parse_selector_list() {
    let list = parse("a, .b ,#c");
    assert_eq!(list.selectors.len(), 3);
}

#[test]
fn test_parse_escaped_identifiers() {
    let list = parse("#\\31 23.a\\.b.caf\\E9");
    assert_eq!(
        list.selectors[0].subject.simple_selectors,
        vec![
            SimpleSelector::Id("123".to_string()),
            SimpleSelector::Class("a.b".to_string()),
            SimpleSelector::Class("caf\u{E9}".to_string()),
        ]
    );
}

#[test]
fn test_parse_attribute_operators_and_strings() {
    let list = parse(r#"[a="x \"y\""][b~=w][c|='en'][d^=p][e$="s"][f*=m]"#);
    assert_eq!(
        list.selectors[0].subject.simple_selectors,
        vec![
            SimpleSelector::Attribute(AttributeSelector::Equals(
                "a".to_string(),
                "x \"y\"".to_string()
            )),
            SimpleSelector::Attribute(AttributeSelector::Includes("b".to_string(), "w".to_string())),
            SimpleSelector::Attribute(AttributeSelector::DashMatch("c".to_string(), "en".to_string())),
            SimpleSelector::Attribute(AttributeSelector::PrefixMatch("d".to_string(), "p".to_string())),
            SimpleSelector::Attribute(AttributeSelector::SuffixMatch("e".to_string(), "s".to_string())),
            SimpleSelector::Attribute(AttributeSelector::SubstringMatch(
                "f".to_string(),
                "m".to_string()
            )),
        ]
    );
}

#[test]
fn test_parse_nth_child() {
    let list = parse("li:nth-child(2n+1):nth-last-child(3)");
    assert_eq!(
        list.selectors[0].subject.simple_selectors[1..],
        [
            SimpleSelector::PseudoClass(PseudoClass::NthChild(Nth { a: 2, b: 1 })),
            SimpleSelector::PseudoClass(PseudoClass::NthLastChild(Nth { a: 0, b: 3 })),
        ]
    );
}

#[test]
fn test_unknown_pseudo_classes_never_match() {
    let list = parse("a:hover, p::before");
    assert!(
        list.selectors
            .iter()
            .all(|s| s.subject.simple_selectors.contains(&SimpleSelector::NeverMatch))
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse_selector_list(""), Err(SelectorParseError::Empty));
    assert_eq!(parse_selector_list("a,"), Err(SelectorParseError::Empty));
    assert_eq!(parse_selector_list("a >"), Err(SelectorParseError::UnexpectedEnd));
    assert!(matches!(
        parse_selector_list("#1abc"),
        Err(SelectorParseError::Unexpected { found: '1', .. })
    ));
    assert!(parse_selector_list("> a").is_err());
    assert!(parse_selector_list("a > > b").is_err());
    assert!(parse_selector_list("[x=\"open").is_err());
    assert!(parse_selector_list("li:nth-child(foo)").is_err());
    assert!(parse_selector_list("div!").is_err());
}

// ========== matching ==========

const FIXTURE: &str = r#"
<div id="outer" class="wrap">
  <section id="s1">
    <p id="p1" class="x">
      <span id="deep"></span>
    </p>
  </section>
  <p id="p2" lang="en-US" data-role="primary button"></p>
  <p id="p3"></p>
</div>
<div id="empty"> <!-- c --> </div>
"#;

#[test]
fn test_type_class_id_attribute() {
    let tree = parse_document(FIXTURE);
    assert!(matches(&tree, "DIV.wrap", "outer"));
    assert!(matches(&tree, "#p1.x", "p1"));
    assert!(!matches(&tree, ".X", "p1"));
    assert!(matches(&tree, "[lang|=en]", "p2"));
    assert!(matches(&tree, "[data-role~=button]", "p2"));
    assert!(matches(&tree, "[data-role^=pri][data-role$=ton][data-role*=\"y b\"]", "p2"));
    assert!(!matches(&tree, "[data-role~=\"\"]", "p2"));
    assert!(matches(&tree, "*", "p3"));
}

#[test]
fn test_descendant_and_child_combinators() {
    let tree = parse_document(FIXTURE);
    assert!(matches(&tree, ".wrap span", "deep"));
    assert!(matches(&tree, ".wrap > section > p > span", "deep"));
    assert!(!matches(&tree, ".wrap > p > span", "deep"));
    assert!(matches(&tree, "body > .wrap > p", "p2"));
}

#[test]
fn test_descendant_matching_backtracks() {
    // The nearest `div` ancestor of `span` is not a child of `.a`, but an
    // outer one is.
    let tree = parse_document(
        r#"<div class="a"><div><div><span id="t"></span></div></div></div>"#,
    );
    assert!(matches(&tree, ".a > div span", "t"));
    assert!(!matches(&tree, ".a > div > span", "t"));
}

#[test]
fn test_sibling_combinators() {
    let tree = parse_document(FIXTURE);
    assert!(matches(&tree, "section + p", "p2"));
    assert!(!matches(&tree, "section + p", "p3"));
    assert!(matches(&tree, "section ~ p", "p3"));
    assert!(matches(&tree, "#p2 + p", "p3"));
}

#[test]
fn test_structural_pseudo_classes() {
    let tree = parse_document(FIXTURE);
    assert!(matches(&tree, "section:first-child", "s1"));
    assert!(matches(&tree, "p:first-of-type", "p2"));
    assert!(matches(&tree, "p:last-child:last-of-type", "p3"));
    assert!(matches(&tree, "p:only-child", "p1"));
    assert!(matches(&tree, ":nth-child(2)", "p2"));
    assert!(matches(&tree, ":nth-child(odd)", "p3"));
    assert!(matches(&tree, ":nth-last-child(1)", "p3"));
    assert!(matches(&tree, "div:empty", "empty"));
    assert!(!matches(&tree, "div:empty", "outer"));
    assert!(!matches(&tree, ":root", "outer"));
}

#[test]
fn test_selector_list_matches_any() {
    let tree = parse_document(FIXTURE);
    assert!(matches(&tree, "#nope, #p3", "p3"));
    assert!(!matches(&tree, "a:hover, #nope", "p3"));
}
