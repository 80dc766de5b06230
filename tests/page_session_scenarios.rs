use transcript_page::{KeyPress, Page, PageConfig, Viewport};

const TRANSCRIPT_HTML: &str = r##"
<body>
  <div id="scrollProgress"></div>
  <input id="searchInput" type="text" class="w-64">
  <button id="clearSearch" class="hidden">×</button>
  <aside class="section-navigation">
    <nav>
      <a class="nav-item" href="#opening">Opening</a>
      <a class="nav-item" href="#questions">Questions</a>
    </nav>
  </aside>
  <div id="transcriptContent">
    <section id="opening">
      <h2 id="opening-title">Opening remarks</h2>
      <p>Good evening. Tonight we talk about memory &amp; attention.</p>
    </section>
    <section id="questions">
      <h2 id="questions-title">Questions</h2>
      <p>Q: How much memory is enough? A: More memory than you think.</p>
    </section>
  </div>
</body>
"##;

fn session() -> transcript_page::Result<Page> {
    let mut page = Page::from_html(TRANSCRIPT_HTML)?;
    page.set_trace_stderr(false);
    page.set_document_height(2400);
    page.set_layout_box("#opening", 0, 1200)?;
    page.set_layout_box("#questions", 1200, 1200)?;
    Ok(page)
}

#[test]
fn reader_searches_navigates_and_clears() -> transcript_page::Result<()> {
    let mut page = session()?;
    let original = page.dump_dom("#transcriptContent")?;

    page.press_key(KeyPress::new("f").with_meta())?;
    page.type_text("#searchInput", "memory")?;
    page.advance_time(300)?;
    assert_eq!(page.highlight_count(), 3);
    page.assert_class("#clearSearch", "hidden", false)?;
    page.assert_text(
        "#questions p",
        "Q: How much memory is enough? A: More memory than you think.",
    )?;

    page.click(".nav-item[href='#questions']")?;
    assert_eq!(page.scroll_y(), 1080);
    page.assert_class(".nav-item[href='#questions']", "active", true)?;
    page.assert_class(".nav-item[href='#opening']", "active", false)?;

    page.press_key(KeyPress::new("Escape"))?;
    assert_eq!(page.highlight_count(), 0);
    assert_eq!(page.dump_dom("#transcriptContent")?, original);
    Ok(())
}

#[test]
fn entity_decoded_text_is_searchable() -> transcript_page::Result<()> {
    let mut page = session()?;
    page.type_text("#searchInput", "memory & attention")?;
    page.advance_time(300)?;
    assert_eq!(page.highlight_count(), 1);
    assert_eq!(page.markers()[0].text(), "memory & attention");
    Ok(())
}

#[test]
fn compact_session_with_english_labels() -> transcript_page::Result<()> {
    let mut config = PageConfig {
        viewport: Viewport {
            width: 600,
            height: 900,
        },
        ..PageConfig::default()
    };
    config.labels.mobile_nav_toggle = "Contents".into();
    config.labels.search_placeholder_compact = "Search...".into();

    let mut page = Page::from_html_with_config(TRANSCRIPT_HTML, config)?;
    page.assert_text(".mobile-nav-toggle", "Contents")?;
    page.assert_class(".section-navigation nav", "hidden", true)?;
    page.assert_class("#searchInput", "w-full", true)?;

    page.click(".mobile-nav-toggle")?;
    page.assert_class(".section-navigation nav", "hidden", false)?;

    page.resize(1440, 900)?;
    page.assert_class(".section-navigation nav", "hidden", false)?;
    assert!(page.dump_dom(".section-navigation")?.find("mobile-nav-toggle").is_none());
    Ok(())
}
