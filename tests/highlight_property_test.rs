use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use transcript_page::{Dom, NodeId};
use transcript_page::highlight::{MIN_QUERY_CHARS, clear_markers, mark_matches};

const DEFAULT_HIGHLIGHT_PROPTEST_CASES: u32 = 256;

fn highlight_proptest_cases() -> u32 {
    std::env::var("TRANSCRIPT_PAGE_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_HIGHLIGHT_PROPTEST_CASES)
}

fn fragment_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("context"),
        Just("Context"),
        Just("CONTEXT"),
        Just("budget"),
        Just("a.b"),
        Just("a*b"),
        Just("(x)"),
        Just("окно"),
        Just("Окно"),
        Just(" "),
        Just(", "),
        Just("."),
    ]
    .prop_map(str::to_string)
    .boxed()
}

fn paragraph_strategy() -> BoxedStrategy<String> {
    vec(fragment_strategy(), 1..12)
        .prop_map(|parts| parts.concat())
        .boxed()
}

fn query_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("context"),
        Just("CONTEXT"),
        Just("text"),
        Just("a.b"),
        Just("a*"),
        Just("(x)"),
        Just("ОКНО"),
        Just("t, "),
        Just("."),
        Just("c"),
    ]
    .prop_map(str::to_string)
    .boxed()
}

fn build_document(paragraphs: &[String]) -> String {
    let body = paragraphs
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            if idx % 2 == 0 {
                format!("<p>{text}</p>")
            } else {
                format!("<p><em>{text}</em></p>")
            }
        })
        .collect::<String>();
    format!(r#"<main id="root">{body}</main>"#)
}

/// Occurrences counted per paragraph, since a match never crosses one.
fn expected_count(dom: &Dom, paragraphs: &[NodeId], query: &str) -> usize {
    if query.chars().count() < MIN_QUERY_CHARS {
        return 0;
    }
    let needle = query.to_lowercase();
    paragraphs
        .iter()
        .map(|node| {
            dom.text_content(*node)
                .to_lowercase()
                .matches(needle.as_str())
                .count()
        })
        .sum()
}

fn assert_highlight_round_trip(paragraphs: &[String], query: &str) -> TestCaseResult {
    let html = build_document(paragraphs);
    let mut dom = Dom::parse(&html).map_err(|err| TestCaseError::fail(err.to_string()))?;
    let root = dom
        .query_selector("#root")
        .map_err(|err| TestCaseError::fail(err.to_string()))?
        .ok_or_else(|| TestCaseError::fail("missing #root"))?;
    let paragraph_nodes = dom
        .query_selector_all("#root p")
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert_eq!(paragraph_nodes.len(), paragraphs.len());
    let expected = expected_count(&dom, &paragraph_nodes, query);
    let dump_before = dom.dump_node(root);
    let text_before = dom.text_content(root);

    let markers = mark_matches(&mut dom, root, query);
    prop_assert_eq!(markers.len(), expected);
    prop_assert_eq!(dom.text_content(root), text_before.clone());
    for marker in &markers {
        prop_assert_eq!(marker.text().to_lowercase(), query.to_lowercase());
        prop_assert_eq!(dom.text_content(marker.node()), marker.text());
    }
    if markers.is_empty() {
        prop_assert_eq!(dom.dump_node(root), dump_before.clone());
    }

    clear_markers(&mut dom, &markers);
    prop_assert_eq!(dom.dump_node(root), dump_before);
    prop_assert_eq!(dom.text_content(root), text_before);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: highlight_proptest_cases(),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn highlight_marks_every_occurrence_and_clears_without_trace(
        paragraphs in vec(paragraph_strategy(), 1..5),
        query in query_strategy(),
    ) {
        assert_highlight_round_trip(&paragraphs, &query)?;
    }
}
