//! Tests for loading markup into a DOM tree.

use pinpoint_dom::{DomTree, NodeId, NodeType};
use pinpoint_html::{HTMLTokenizer, Token, parse_document};

/// Tag names of the element children of `id`.
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.element_children(id)
        .filter_map(|child| tree.as_element(child))
        .map(|e| e.tag_name.clone())
        .collect()
}

/// First element in tree order with the given id attribute.
fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).and_then(|e| e.id()) == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

// ========== tree construction ==========

#[test]
fn test_fragment_gets_implicit_html_head_body() {
    let tree = parse_document("<p>hello</p>");
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["html"]);
    assert_eq!(child_tags(&tree, html), vec!["body"]);
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p"]);
}

#[test]
fn test_nested_fixture() {
    let tree = parse_document(
        r#"<body><div id="a"><p class="x"><span id="target"></span></p></div></body>"#,
    );
    let body = tree.body().unwrap();
    let a = by_id(&tree, "a");
    let target = by_id(&tree, "target");

    assert_eq!(tree.parent_element(a), Some(body));
    let p = tree.parent_element(target).unwrap();
    assert!(tree.as_element(p).unwrap().has_class("x"));
    assert_eq!(tree.parent_element(p), Some(a));
}

#[test]
fn test_head_elements_go_to_head() {
    let tree = parse_document(
        "<!DOCTYPE html><html><head><title>t</title><meta charset=utf-8></head>\
         <body><div></div></body></html>",
    );
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let head = tree.element_children(html).next().unwrap();
    assert_eq!(child_tags(&tree, head), vec!["title", "meta"]);
}

#[test]
fn test_void_elements_do_not_nest() {
    let tree = parse_document("<div><img src=a.png><br><input type=text><span></span></div>");
    let body = tree.body().unwrap();
    let div = tree.element_children(body).next().unwrap();
    assert_eq!(child_tags(&tree, div), vec!["img", "br", "input", "span"]);
}

#[test]
fn test_self_closing_non_void_is_ignored() {
    let tree = parse_document("<div/><span></span>");
    let body = tree.body().unwrap();
    let div = tree.element_children(body).next().unwrap();
    assert_eq!(child_tags(&tree, div), vec!["span"]);
}

#[test]
fn test_implied_end_tags() {
    let tree = parse_document("<ul><li>a<li>b<li>c</ul><p>one<p>two<div></div>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["ul", "p", "p", "div"]);
    let ul = tree.element_children(body).next().unwrap();
    assert_eq!(child_tags(&tree, ul), vec!["li", "li", "li"]);
}

#[test]
fn test_unmatched_end_tag_is_ignored() {
    let tree = parse_document("<div><span></b></span><em></em></div>");
    let body = tree.body().unwrap();
    let div = tree.element_children(body).next().unwrap();
    assert_eq!(child_tags(&tree, div), vec!["span", "em"]);
}

#[test]
fn test_whitespace_between_elements_becomes_text() {
    let tree = parse_document("<body>\n  <a></a>\n  <b></b>\n</body>");
    let body = tree.body().unwrap();
    let b = tree.element_children(body).nth(1).unwrap();
    assert!(tree.children(body).len() > 2);
    assert_eq!(tree.element_index(b), Some(2));
}

#[test]
fn test_comments_are_kept() {
    let tree = parse_document("<div><!-- note --></div>");
    let body = tree.body().unwrap();
    let div = tree.element_children(body).next().unwrap();
    let child = tree.children(div)[0];
    assert!(matches!(
        tree.get(child).map(|n| &n.node_type),
        Some(NodeType::Comment(data)) if data == " note "
    ));
}

// ========== attributes ==========

#[test]
fn test_attribute_forms_and_order() {
    let tree = parse_document(r#"<input disabled name='q' type=text data-x="a b" name="dup">"#);
    let input = tree
        .descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).is_some_and(|e| e.tag_name == "input"))
        .unwrap();
    let attrs = &tree.as_element(input).unwrap().attrs;
    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["disabled", "name", "type", "data-x"]);
    assert_eq!(attrs.get("disabled"), Some(""));
    assert_eq!(attrs.get("name"), Some("q"));
    assert_eq!(attrs.get("data-x"), Some("a b"));
}

#[test]
fn test_character_references() {
    let tree = parse_document(r#"<a title="&quot;x&quot; &amp; &#x41;&#66;">&lt;b&gt; &copy</a>"#);
    let a = tree
        .descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).is_some_and(|e| e.tag_name == "a"))
        .unwrap();
    assert_eq!(tree.as_element(a).unwrap().attrs.get("title"), Some("\"x\" & AB"));
    let text = tree.children(a)[0];
    assert_eq!(tree.as_text(text), Some("<b> \u{A9}"));
}

// ========== tokenizer ==========

#[test]
fn test_raw_text_is_not_tokenized() {
    let mut tokenizer = HTMLTokenizer::new("<script>if (a < b) { x = '</p>'; }</script>");
    tokenizer.run();
    let tokens = tokenizer.into_tokens();
    assert_eq!(
        tokens[1],
        Token::Text {
            data: "if (a < b) { x = '</p>'; }".to_string()
        }
    );
    assert_eq!(
        tokens[2],
        Token::EndTag {
            name: "script".to_string()
        }
    );
}

#[test]
fn test_tag_names_are_lowercased() {
    let mut tokenizer = HTMLTokenizer::new("<DIV CLASS=A></Div>");
    tokenizer.run();
    let tokens = tokenizer.into_tokens();
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, attributes, .. }
            if name == "div" && attributes[0].name == "class" && attributes[0].value == "A"
    ));
    assert_eq!(
        tokens[1],
        Token::EndTag {
            name: "div".to_string()
        }
    );
    assert_eq!(tokens.last(), Some(&Token::EndOfFile));
}

#[test]
fn test_doctype_token() {
    let mut tokenizer = HTMLTokenizer::new("<!doctype HTML>");
    tokenizer.run();
    assert_eq!(
        tokenizer.into_tokens()[0],
        Token::Doctype {
            name: "html".to_string()
        }
    );
}
