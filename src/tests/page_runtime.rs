use super::*;

#[test]
fn trace_records_events_timers_and_search() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    traced(&mut page);
    page.type_text("#searchInput", "context")?;
    page.advance_time(300)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[event] input")
        && line.contains("target=#searchInput")
        && line.contains("behavior=search_input")));
    assert!(logs
        .iter()
        .any(|line| line.starts_with("[search] debounce query=\"context\"")));
    assert!(logs
        .iter()
        .any(|line| line.starts_with("[timer] run") && line.contains("label=search")));
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_categories_can_be_silenced() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    traced(&mut page);
    page.set_trace_events(false);
    page.set_trace_timers(false);
    page.set_trace_search(false);
    page.type_text("#searchInput", "context")?;
    page.advance_time(300)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().all(|line| !line.starts_with("[event]")
        && !line.starts_with("[timer]")
        && !line.starts_with("[search]")));
    Ok(())
}

#[test]
fn disabled_trace_keeps_no_lines() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.set_trace_stderr(false);
    page.type_text("#searchInput", "context")?;
    page.advance_time(300)?;
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_log_limit_keeps_newest_lines() -> Result<()> {
    let mut page = laid_out_page()?;
    traced(&mut page);
    page.set_trace_events(false);
    page.set_trace_timers(false);
    page.set_trace_log_limit(2)?;
    page.scroll_to(100);
    page.scroll_to(200);
    page.scroll_to(300);

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0], "[scroll] user requested=300 from=200 to=300");
    assert!(logs[1].starts_with("[scroll] progress scroll_y=300 "));
    assert!(matches!(page.set_trace_log_limit(0), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn timer_step_limit_stops_runaway_queue() -> Result<()> {
    let mut page = laid_out_page()?;
    page.set_timer_step_limit(1)?;
    page.type_text("#searchInput", "context")?;
    page.scroll_to(500);

    let err = page.flush().expect_err("two timers exceed a limit of one");
    match err {
        Error::Timer(msg) => {
            assert!(msg.contains("limit=1"));
            assert!(msg.contains("steps=2"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(page.set_timer_step_limit(0), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn time_only_moves_forward() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.advance_time(40)?;
    assert_eq!(page.now_ms(), 40);
    assert!(matches!(page.advance_time(-1), Err(Error::Timer(_))));
    assert!(matches!(page.advance_time_to(10), Err(Error::Timer(_))));
    page.advance_time_to(90)?;
    assert_eq!(page.now_ms(), 90);
    Ok(())
}

#[test]
fn timers_can_be_run_one_by_one_or_cleared() -> Result<()> {
    let mut page = laid_out_page()?;
    page.type_text("#searchInput", "context")?;
    page.scroll_to(500);
    assert_eq!(page.pending_timers().len(), 2);

    assert!(page.run_next_timer()?);
    assert_eq!(page.now_ms(), 100);
    assert_eq!(page.pending_timers().len(), 1);
    assert_eq!(page.run_due_timers()?, 0);

    let search = page.pending_timers()[0].id;
    assert!(page.clear_timer(search));
    assert!(!page.clear_timer(search));
    page.flush()?;
    assert_eq!(page.highlight_count(), 0);

    page.type_text("#searchInput", "token")?;
    assert_eq!(page.clear_all_timers(), 1);
    assert!(!page.run_next_timer()?);
    Ok(())
}

#[test]
fn search_can_restart_after_its_timer_was_cleared() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.type_text("#searchInput", "context")?;
    page.clear_all_timers();
    page.type_text("#searchInput", "token")?;
    page.advance_time(300)?;
    assert_eq!(page.highlight_count(), 1);
    Ok(())
}

#[test]
fn page_without_features_still_constructs() -> Result<()> {
    let mut page = Page::from_html("<main><p>Plain transcript text.</p></main>")?;
    page.scroll_to(100);
    page.resize(400, 600)?;
    page.press_key(KeyPress::new("f").with_ctrl())?;
    assert_eq!(page.active_element(), None);
    assert!(page.pending_timers().is_empty());

    assert!(matches!(
        page.click("#searchInput"),
        Err(Error::SelectorNotFound(selector)) if selector == "#searchInput"
    ));
    Ok(())
}

#[test]
fn search_is_disabled_without_content_root() -> Result<()> {
    let config = PageConfig {
        content_root_id: "missingRoot".into(),
        ..PageConfig::default()
    };
    let mut page = Page::from_html_with_config(PAGE, config)?;
    page.type_text("#searchInput", "context")?;
    page.advance_time(300)?;
    assert_eq!(page.highlight_count(), 0);
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn repeated_initialization_does_not_double_reactions() -> Result<()> {
    let mut page = laid_out_page()?;
    page.initialize();
    page.initialize();

    page.type_text("#searchInput", "context")?;
    page.click("#card-budgets")?;
    let labels = page
        .pending_timers()
        .into_iter()
        .map(|timer| timer.label)
        .collect::<Vec<_>>();
    assert_eq!(labels.iter().filter(|label| **label == "search").count(), 1);
    assert_eq!(labels.iter().filter(|label| **label == "card_press").count(), 1);

    page.mouse_enter("#intro-title")?;
    assert_eq!(page.dom().query_selector_all(".anchor-link")?.len(), 1);
    Ok(())
}

#[test]
fn typing_into_non_input_is_a_type_mismatch() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    match page.type_text("#p-intro", "x") {
        Err(Error::TypeMismatch {
            selector, actual, ..
        }) => {
            assert_eq!(selector, "#p-intro");
            assert_eq!(actual, "p");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_configs_are_rejected_before_parsing() {
    let configs = [
        PageConfig {
            search_debounce_ms: 0,
            ..PageConfig::default()
        },
        PageConfig {
            content_root_id: String::new(),
            ..PageConfig::default()
        },
        PageConfig {
            compact_search_breakpoint: 2000,
            ..PageConfig::default()
        },
        PageConfig {
            document_url: "index.html".into(),
            ..PageConfig::default()
        },
    ];
    for config in configs {
        assert!(matches!(
            Page::from_html_with_config(PAGE, config),
            Err(Error::Config(_))
        ));
    }
}

#[test]
fn unsupported_heading_selector_only_disables_anchor_links() -> Result<()> {
    let config = PageConfig {
        heading_selector: "h2:hover".into(),
        ..PageConfig::default()
    };
    let mut page = Page::from_html_with_config(PAGE, config)?;
    page.mouse_enter("#intro-title")?;
    assert!(page.dom().query_selector_all(".anchor-link")?.is_empty());

    page.type_text("#searchInput", "context")?;
    page.advance_time(300)?;
    assert_eq!(page.highlight_count(), 4);
    Ok(())
}

#[test]
fn assertion_failures_carry_a_dom_snippet() -> Result<()> {
    let page = Page::from_html(PAGE)?;
    match page.assert_text("#budgets-title", "Windows") {
        Err(Error::AssertionFailed {
            actual,
            dom_snippet,
            ..
        }) => {
            assert_eq!(actual, "Budgets");
            assert!(dom_snippet.starts_with("<h2 id=\"budgets-title\">"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(page.assert_value("#searchInput", "x").is_err());
    Ok(())
}
