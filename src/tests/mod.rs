use super::*;

mod page_runtime;

pub(super) const PAGE: &str = r##"
<html>
<body>
  <div id="scrollProgress" style="width: 0%;"></div>
  <header>
    <input id="searchInput" type="text" class="w-64">
    <button id="clearSearch" class="hidden">Clear</button>
  </header>
  <aside class="section-navigation">
    <nav id="toc">
      <a id="nav-intro" class="nav-item" href="#intro">Intro</a>
      <a id="nav-budgets" class="nav-item" href="#budgets">Budgets</a>
      <a id="nav-windows" class="nav-item" href="#windows">Windows</a>
    </nav>
  </aside>
  <div class="categories">
    <a id="card-budgets" class="category-card" href="#budgets">Budgets card</a>
    <a id="card-windows" class="category-card" href="#windows" tabindex="2">Windows card</a>
  </div>
  <main id="transcriptContent">
    <section id="intro">
      <h2 id="intro-title">Introduction</h2>
      <p id="p-intro">Context budgets matter. Context windows shrink.</p>
      <a id="jump" href="#windows">Skip ahead</a>
    </section>
    <section id="budgets">
      <h2 id="budgets-title">Budgets</h2>
      <p id="p-budgets">Every <em>token</em> in the context costs.</p>
      <script>var context = 1;</script>
    </section>
    <section id="windows">
      <h3 id="windows-detail">Windows</h3>
      <p id="p-windows">Long windows (a.k.a. context*) help.</p>
      <style>.context { color: red; }</style>
    </section>
  </main>
</body>
</html>
"##;

/// The fixture with a 3000px document: intro at 0, budgets at 800, windows at
/// 1800, under an 800px viewport.
pub(super) fn laid_out_page() -> Result<Page> {
    laid_out_page_with(PageConfig::default())
}

pub(super) fn laid_out_page_with(config: PageConfig) -> Result<Page> {
    let mut page = Page::from_html_with_config(PAGE, config)?;
    page.set_trace_stderr(false);
    page.set_document_height(3000);
    page.set_layout_box("#intro", 0, 800)?;
    page.set_layout_box("#budgets", 800, 1000)?;
    page.set_layout_box("#windows", 1800, 1200)?;
    Ok(page)
}

pub(super) fn traced(page: &mut Page) {
    page.set_trace_stderr(false);
    page.enable_trace(true);
}
