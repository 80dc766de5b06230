//! Deterministic behavior layer for a static transcript page.
//!
//! A [`Page`] parses the page's HTML into an in-memory document and reacts to
//! the events a host feeds it: scrolling, clicks, typing, key presses, hover,
//! resize and touch. Deferred work runs on a virtual clock that only moves
//! when the host advances it, so every interaction is reproducible.
//!
//! The core is the search highlighter in [`highlight`], which wraps literal,
//! case-insensitive matches in `<span class="search-highlight">` markers and
//! removes them again without leaving a trace in the text.
//!
//! ```
//! use transcript_page::{Page, Result};
//!
//! fn main() -> Result<()> {
//!     let mut page = Page::from_html(
//!         r#"<input id="searchInput">
//!            <button id="clearSearch" class="hidden">x</button>
//!            <div id="transcriptContent"><p>Context budgets matter.</p></div>"#,
//!     )?;
//!     page.type_text("#searchInput", "context")?;
//!     page.advance_time(300)?;
//!     assert_eq!(page.highlight_count(), 1);
//!     page.assert_class("#clearSearch", "hidden", false)?;
//!     Ok(())
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;

mod config;
mod dom;
pub mod highlight;
mod html;
mod layout;
mod location;
mod page;
mod scheduler;
mod selector;
mod trace;

pub use config::{PageConfig, PageLabels};
pub use dom::{Dom, NodeId};
pub use highlight::{HighlightState, Highlighter, Marker};
pub use layout::{LayoutBox, Viewport, scroll_progress_percent};
pub use page::{KeyPress, Page, SWIPE_HISTORY_LIMIT, Swipe, SwipeDirection};
pub use scheduler::PendingTimer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    Dom(String),
    Config(String),
    Timer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::Timer(msg) => write!(f, "timer error: {msg}"),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;
