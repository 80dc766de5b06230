//! Literal, case-insensitive text search over a content subtree.
//!
//! Matches are wrapped in `<span class="search-highlight">` markers. Every
//! marker can be unwrapped again, after which the surrounding text nodes are
//! merged so the tree reads the same, at the text level, as before the search.

use std::collections::HashSet;

use fancy_regex::{Regex, RegexBuilder};

use crate::dom::{Dom, NodeId};

/// Queries shorter than this (in characters) never highlight anything.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MARKER_CLASS: &str = "search-highlight";
const MARKER_TAG: &str = "span";

const TREE_WALK_RED_ZONE: usize = 64 * 1024;
const TREE_WALK_STACK_SIZE: usize = 32 * 1024 * 1024;

/// One highlighted occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    node: NodeId,
    text: String,
    source_offset: usize,
}

impl Marker {
    /// The wrapper element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Matched text, in the document's original case.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character offset of the match inside the text node it was cut from.
    pub fn source_offset(&self) -> usize {
        self.source_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    Idle,
    Highlighted,
}

pub fn query_is_active(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Escapes every character the regex engine would otherwise interpret.
pub fn escape_literal(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(
            ch,
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Case folding is Unicode simple folding, so `k` also matches the Kelvin
/// sign and `s` the long s.
fn compile_literal(query: &str) -> Option<Regex> {
    let mut builder = RegexBuilder::new(&escape_literal(query));
    builder.case_insensitive(true);
    builder.build().ok()
}

/// Wraps every occurrence of `query` below `root` in a marker and returns the
/// markers in document order.
///
/// Text under `script`/`style` elements and text already inside a marker is
/// never touched. A short query, or a root that is not an element attached to
/// the document, leaves the tree untouched and returns nothing. Matches never
/// span two text nodes.
pub fn mark_matches(dom: &mut Dom, root: NodeId, query: &str) -> Vec<Marker> {
    if !query_is_active(query) || !dom.is_element(root) || !dom.is_connected(root) {
        return Vec::new();
    }
    if is_excluded_subtree(dom, root) {
        return Vec::new();
    }
    let Some(pattern) = compile_literal(query) else {
        return Vec::new();
    };

    let mut text_nodes = Vec::new();
    collect_searchable_text(dom, root, &mut text_nodes);

    let mut markers = Vec::new();
    for text_node in text_nodes {
        let Some(text) = dom.text(text_node).map(str::to_owned) else {
            continue;
        };
        let ranges = match_ranges(&pattern, &text);
        if ranges.is_empty() {
            continue;
        }

        let mut pieces = Vec::with_capacity(ranges.len() * 2 + 1);
        let mut node_markers = Vec::with_capacity(ranges.len());
        let mut cursor = 0usize;
        for (start, end) in ranges {
            if start > cursor {
                pieces.push(dom.create_detached_text(text[cursor..start].to_string()));
            }
            let matched = &text[start..end];
            let marker = dom.create_detached_element(MARKER_TAG, &[("class", MARKER_CLASS)]);
            dom.create_text(marker, matched.to_string());
            pieces.push(marker);
            node_markers.push(Marker {
                node: marker,
                text: matched.to_string(),
                source_offset: text[..start].chars().count(),
            });
            cursor = end;
        }
        if cursor < text.len() {
            pieces.push(dom.create_detached_text(text[cursor..].to_string()));
        }

        if dom.replace_with_nodes(text_node, &pieces).is_ok() {
            markers.extend(node_markers);
        }
    }
    markers
}

/// Unwraps markers back into plain text and merges the text runs they split.
///
/// Markers that were already removed, or whose ancestors no longer reach the
/// document, are skipped.
pub fn clear_markers(dom: &mut Dom, markers: &[Marker]) {
    let mut touched = Vec::new();
    let mut seen = HashSet::new();
    for marker in markers {
        let node = marker.node;
        if !dom.is_connected(node) {
            continue;
        }
        let Some(parent) = dom.parent(node) else {
            continue;
        };
        let original = dom.text_content(node);
        let replacement = dom.create_detached_text(original);
        if dom.replace_with_nodes(node, &[replacement]).is_ok() && seen.insert(parent) {
            touched.push(parent);
        }
    }
    for parent in touched {
        if dom.is_valid_node(parent) {
            dom.normalize(parent);
        }
    }
}

fn match_ranges(pattern: &Regex, text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for matched in pattern.find_iter(text) {
        let Ok(matched) = matched else {
            break;
        };
        if matched.start() < matched.end() {
            out.push((matched.start(), matched.end()));
        }
    }
    out
}

fn collect_searchable_text(dom: &Dom, node: NodeId, out: &mut Vec<NodeId>) {
    stacker::maybe_grow(TREE_WALK_RED_ZONE, TREE_WALK_STACK_SIZE, || {
        for &child in dom.children(node) {
            if dom.is_text(child) {
                out.push(child);
            } else if !is_excluded_subtree(dom, child) {
                collect_searchable_text(dom, child, out);
            }
        }
    })
}

fn is_excluded_subtree(dom: &Dom, node: NodeId) -> bool {
    let Some(tag) = dom.tag_name(node) else {
        return false;
    };
    tag.eq_ignore_ascii_case("script")
        || tag.eq_ignore_ascii_case("style")
        || dom.class_contains(node, MARKER_CLASS)
}

/// Search session: the current query and the markers it produced.
///
/// Every new search first clears the previous markers, so at most one marker
/// set is live at a time.
#[derive(Debug, Default, Clone)]
pub struct Highlighter {
    query: String,
    markers: Vec<Marker>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&mut self, dom: &mut Dom, root: NodeId, query: &str) -> &[Marker] {
        self.clear(dom);
        self.query = query.to_string();
        self.markers = mark_matches(dom, root, query);
        &self.markers
    }

    /// Removes the live markers but keeps the query.
    pub fn clear(&mut self, dom: &mut Dom) {
        if self.markers.is_empty() {
            return;
        }
        clear_markers(dom, &self.markers);
        self.markers.clear();
    }

    /// Removes the live markers and forgets the query.
    pub fn reset(&mut self, dom: &mut Dom) {
        self.clear(dom);
        self.query.clear();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn first(&self) -> Option<&Marker> {
        self.markers.first()
    }

    pub fn state(&self) -> HighlightState {
        if self.markers.is_empty() {
            HighlightState::Idle
        } else {
            HighlightState::Highlighted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};

    fn content(dom: &Dom) -> Result<NodeId> {
        dom.by_id("content")
            .ok_or_else(|| Error::SelectorNotFound("#content".into()))
    }

    #[test]
    fn context_example_marks_both_occurrences() -> Result<()> {
        let html = "<div id='content'>Context budgets matter. Context windows shrink.</div>";
        let mut dom = Dom::parse(html)?;
        let root = content(&dom)?;
        let before = dom.dump_node(root);

        let markers = mark_matches(&mut dom, root, "context");
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].text(), "Context");
        assert_eq!(markers[1].text(), "Context");
        assert_eq!(markers[0].source_offset(), 0);
        assert_eq!(markers[1].source_offset(), 24);
        assert_eq!(
            dom.dump_node(root),
            "<div id=\"content\"><span class=\"search-highlight\">Context</span> budgets matter. \
             <span class=\"search-highlight\">Context</span> windows shrink.</div>"
        );

        clear_markers(&mut dom, &markers);
        assert_eq!(dom.dump_node(root), before);
        assert_eq!(dom.children(root).len(), 1);
        Ok(())
    }

    #[test]
    fn short_query_leaves_tree_untouched() -> Result<()> {
        let mut dom = Dom::parse("<div id='content'>a b c</div>")?;
        let root = content(&dom)?;
        let before = dom.dump_node(root);
        assert!(mark_matches(&mut dom, root, "a").is_empty());
        assert!(mark_matches(&mut dom, root, "").is_empty());
        assert_eq!(dom.dump_node(root), before);
        Ok(())
    }

    #[test]
    fn special_characters_match_literally() -> Result<()> {
        let mut dom = Dom::parse("<div id='content'>a.b axb (x) a*b</div>")?;
        let root = content(&dom)?;
        let markers = mark_matches(&mut dom, root, "a.b");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].text(), "a.b");
        clear_markers(&mut dom, &markers);

        assert_eq!(mark_matches(&mut dom, root, "(x)").len(), 1);
        Ok(())
    }

    #[test]
    fn escape_literal_prefixes_metacharacters() {
        assert_eq!(escape_literal("a.b*(c)"), "a\\.b\\*\\(c\\)");
        assert_eq!(escape_literal("plain text"), "plain text");
    }

    #[test]
    fn script_style_and_existing_markers_are_skipped() -> Result<()> {
        let html = r#"<div id='content'>
            <p>token here</p>
            <script>var token = 1;</script>
            <style>.token {}</style>
            <span class="search-highlight">token</span>
        </div>"#;
        let mut dom = Dom::parse(html)?;
        let root = content(&dom)?;
        let markers = mark_matches(&mut dom, root, "token");
        assert_eq!(markers.len(), 1);
        assert_eq!(dom.tag_name(markers[0].node()), Some("span"));
        Ok(())
    }

    #[test]
    fn matches_inside_one_node_keep_order_and_text() -> Result<()> {
        let mut dom = Dom::parse("<p id='content'>abAB-ab</p>")?;
        let root = content(&dom)?;
        let markers = mark_matches(&mut dom, root, "ab");
        let texts = markers.iter().map(Marker::text).collect::<Vec<_>>();
        assert_eq!(texts, vec!["ab", "AB", "ab"]);
        assert_eq!(dom.text_content(root), "abAB-ab");
        assert_eq!(dom.children(root).len(), 4);
        Ok(())
    }

    #[test]
    fn match_does_not_cross_inline_elements() -> Result<()> {
        let mut dom = Dom::parse("<p id='content'>con<b>text</b></p>")?;
        let root = content(&dom)?;
        assert!(mark_matches(&mut dom, root, "context").is_empty());
        Ok(())
    }

    #[test]
    fn clear_skips_detached_markers() -> Result<()> {
        let mut dom = Dom::parse("<div id='content'><p id='p'>alpha beta</p></div>")?;
        let root = content(&dom)?;
        let markers = mark_matches(&mut dom, root, "beta");
        let p = dom.by_id("p").ok_or_else(|| Error::SelectorNotFound("#p".into()))?;
        dom.remove_node(p)?;
        clear_markers(&mut dom, &markers);
        assert!(dom.class_contains(markers[0].node(), MARKER_CLASS));
        assert_eq!(dom.parent(markers[0].node()), Some(p));
        Ok(())
    }

    #[test]
    fn detached_or_text_roots_are_ignored() -> Result<()> {
        let mut dom = Dom::parse("<div id='content'>alpha</div>")?;
        let root = content(&dom)?;
        let text = dom.children(root)[0];
        assert!(mark_matches(&mut dom, text, "alpha").is_empty());
        dom.remove_node(root)?;
        assert!(mark_matches(&mut dom, root, "alpha").is_empty());
        Ok(())
    }

    #[test]
    fn highlighter_replaces_previous_markers() -> Result<()> {
        let mut dom = Dom::parse("<div id='content'>one two one</div>")?;
        let root = content(&dom)?;
        let mut highlighter = Highlighter::new();

        assert_eq!(highlighter.search(&mut dom, root, "one").len(), 2);
        assert_eq!(highlighter.state(), HighlightState::Highlighted);
        assert_eq!(highlighter.search(&mut dom, root, "two").len(), 1);
        assert_eq!(dom.query_selector_all(".search-highlight")?.len(), 1);

        assert!(highlighter.search(&mut dom, root, "t").is_empty());
        assert_eq!(highlighter.state(), HighlightState::Idle);
        assert_eq!(highlighter.query(), "t");
        assert_eq!(dom.children(root).len(), 1);

        highlighter.reset(&mut dom);
        highlighter.reset(&mut dom);
        assert_eq!(highlighter.query(), "");
        Ok(())
    }

    #[test]
    fn non_ascii_text_keeps_char_offsets() -> Result<()> {
        let mut dom = Dom::parse("<p id='content'>Контекст и КОНТЕКСТ</p>")?;
        let root = content(&dom)?;
        let markers = mark_matches(&mut dom, root, "контекст");
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].source_offset(), 11);
        assert_eq!(markers[1].text(), "КОНТЕКСТ");
        Ok(())
    }
}
