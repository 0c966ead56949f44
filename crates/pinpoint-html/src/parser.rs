//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A reduced tree builder: a stack of open elements, implicit `<html>`,
//! `<head>` and `<body>`, void elements, and the common implied end tags.
//! Tables, forms, foster parenting and the adoption agency algorithm are not
//! implemented; misnested markup is closed at the nearest matching element.

use pinpoint_common::warning::warn_once;
use pinpoint_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

use crate::tokenizer::Token;

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements."
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements that belong in `<head>` when they appear before the body.
const HEAD_ELEMENTS: [&str; 7] = ["base", "link", "meta", "script", "style", "title", "noscript"];

/// Start tags that close an open `<p>` element.
const CLOSES_P: [&str; 24] = [
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main",
    "nav", "ol", "p", "ul",
];

/// Elements that close an open element of the same group (`li` closes `li`).
const SELF_CLOSING_GROUPS: [&[&str]; 3] = [&["li"], &["dt", "dd"], &["option"]];

/// Builds a [`DomTree`] from the token stream of [`crate::HTMLTokenizer`].
pub struct HTMLParser {
    tokens: Vec<Token>,
    tree: DomTree,
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    open_elements: Vec<NodeId>,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
}

impl HTMLParser {
    /// Create a parser over a complete token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: DomTree::new(),
            open_elements: Vec::new(),
            html: None,
            head: None,
            body: None,
        }
    }

    /// Build the tree.
    #[must_use]
    pub fn run(mut self) -> DomTree {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            match token {
                Token::Doctype { .. } => {}
                Token::Comment { data } => {
                    let comment = self.tree.alloc(NodeType::Comment(data));
                    let parent = self.current_node();
                    self.tree.append_child(parent, comment);
                }
                Token::Text { data } => self.insert_text(data),
                Token::StartTag {
                    name, attributes, ..
                } => {
                    let mut attrs = AttributesMap::new();
                    for attr in attributes {
                        let _ = attrs.insert(attr.name, attr.value);
                    }
                    self.start_tag(name, attrs);
                }
                Token::EndTag { name } => self.end_tag(&name),
                Token::EndOfFile => break,
            }
        }
        self.tree
    }

    fn start_tag(&mut self, name: String, attrs: AttributesMap) {
        match name.as_str() {
            "html" => {
                if self.html.is_none() {
                    let html = self.insert_element(NodeId::ROOT, name, attrs);
                    self.html = Some(html);
                    self.open_elements.push(html);
                }
            }
            "head" => {
                let html = self.ensure_html();
                if self.head.is_none() && self.body.is_none() {
                    let head = self.insert_element(html, name, attrs);
                    self.head = Some(head);
                    self.open_elements.push(head);
                }
            }
            "body" => {
                if self.body.is_none() {
                    let html = self.ensure_html();
                    self.pop_until(html);
                    let body = self.insert_element(html, name, attrs);
                    self.body = Some(body);
                    self.open_elements.push(body);
                }
            }
            _ if self.body.is_none() && HEAD_ELEMENTS.contains(&name.as_str()) => {
                let head = self.ensure_head();
                let element = self.insert_element(head, name.clone(), attrs);
                if !VOID_ELEMENTS.contains(&name.as_str()) {
                    self.open_elements.push(element);
                }
            }
            _ => {
                let _ = self.ensure_body();
                self.close_implied(&name);
                let parent = self.current_node();
                let is_void = VOID_ELEMENTS.contains(&name.as_str());
                let element = self.insert_element(parent, name, attrs);
                // Self-closing flags on non-void elements are ignored, as in HTML.
                if !is_void {
                    self.open_elements.push(element);
                }
            }
        }
    }

    fn end_tag(&mut self, name: &str) {
        match name {
            // The body stays the insertion point so trailing content lands in it.
            "html" | "body" => {}
            _ if VOID_ELEMENTS.contains(&name) => {}
            _ => {
                let matching = self
                    .open_elements
                    .iter()
                    .rposition(|&id| self.tag_name(id) == Some(name));
                match matching {
                    Some(index) => self.open_elements.truncate(index),
                    None => warn_once("HTML", &format!("ignoring unmatched end tag </{name}>")),
                }
            }
        }
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#closing-elements-that-have-implied-end-tags)
    fn close_implied(&mut self, name: &str) {
        if CLOSES_P.contains(&name) && self.current_tag_is(&["p"]) {
            let _ = self.open_elements.pop();
        }
        if let Some(group) = SELF_CLOSING_GROUPS.iter().find(|g| g.contains(&name))
            && self.current_tag_is(group)
        {
            let _ = self.open_elements.pop();
        }
    }

    fn insert_text(&mut self, data: String) {
        let whitespace_only = data.chars().all(|c| c.is_ascii_whitespace());
        let parent = match self.current_element_tag() {
            Some("html" | "head") | None if whitespace_only => return,
            Some("html" | "head") | None => self.ensure_body(),
            _ => self.current_node(),
        };
        let text = self.tree.alloc(NodeType::Text(data));
        self.tree.append_child(parent, text);
    }

    fn insert_element(&mut self, parent: NodeId, tag_name: String, attrs: AttributesMap) -> NodeId {
        let element = self
            .tree
            .alloc(NodeType::Element(ElementData { tag_name, attrs }));
        self.tree.append_child(parent, element);
        element
    }

    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.insert_element(NodeId::ROOT, "html".to_string(), AttributesMap::new());
        self.html = Some(html);
        self.open_elements.insert(0, html);
        html
    }

    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.insert_element(html, "head".to_string(), AttributesMap::new());
        self.head = Some(head);
        head
    }

    /// Create the body on first use, closing anything still open in the head.
    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            if !self.open_elements.contains(&body) {
                self.open_elements.push(body);
            }
            return body;
        }
        let html = self.ensure_html();
        self.pop_until(html);
        let body = self.insert_element(html, "body".to_string(), AttributesMap::new());
        self.body = Some(body);
        self.open_elements.push(body);
        body
    }

    /// Pop open elements until `id` is the current node.
    fn pop_until(&mut self, id: NodeId) {
        while let Some(&top) = self.open_elements.last() {
            if top == id {
                break;
            }
            let _ = self.open_elements.pop();
        }
    }

    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn current_element_tag(&self) -> Option<&str> {
        self.open_elements
            .last()
            .and_then(|&id| self.tag_name(id))
    }

    fn current_tag_is(&self, names: &[&str]) -> bool {
        self.current_element_tag()
            .is_some_and(|tag| names.contains(&tag))
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|e| e.tag_name.as_str())
    }
}

/// Print the tree rooted at `id`, one node per line, indented by depth.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    if let Some(node) = tree.get(id) {
        match &node.node_type {
            NodeType::Document => {
                println!("{prefix}Document");
            }
            NodeType::Element(data) => {
                if data.attrs.is_empty() {
                    println!("{prefix}<{}>", data.tag_name);
                } else {
                    let attrs: Vec<String> = data
                        .attrs
                        .iter()
                        .map(|attr| {
                            if attr.value.is_empty() {
                                attr.name.clone()
                            } else {
                                format!("{}=\"{}\"", attr.name, attr.value)
                            }
                        })
                        .collect();
                    println!("{prefix}<{} {}>", data.tag_name, attrs.join(" "));
                }
            }
            NodeType::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                println!("{prefix}\"{display}\"");
            }
            NodeType::Comment(data) => {
                println!("{prefix}<!-- {data} -->");
            }
        }
        for &child_id in tree.children(id) {
            print_tree(tree, child_id, indent + 1);
        }
    }
}
