//! Chapter text normalization. Pure functions, no I/O.
//!
//! Chapter pages arrive as HTML where paragraphs are separated by `<br>` and
//! site chrome is injected as `h1`..`h3` headings. `html_to_text` flattens
//! that to raw text; `normalize_whitespace` collapses the result into
//! canonical paragraph form (one newline between lines, no edge whitespace).

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

/// Convert chapter HTML to raw text: `<br>` becomes a newline, `h1`..`h3`
/// subtrees are dropped, script/style/head content is ignored, all other
/// text is concatenated in document order.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();
    collect_text(doc.tree.root(), &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => match el.name() {
                "h1" | "h2" | "h3" | "script" | "style" | "head" => {}
                "br" => out.push('\n'),
                _ => collect_text(child, out),
            },
            _ => {}
        }
    }
}

/// Collapse text into canonical paragraph form: CR removed, every line
/// trimmed of spaces and tabs, blank lines dropped, single newline between
/// the lines that remain. Stable under re-application.
pub fn normalize_whitespace(text: &str) -> String {
    let no_cr = text.replace('\r', "");
    no_cr
        .split('\n')
        .map(|line| line.trim_matches(|c| c == ' ' || c == '\t'))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
