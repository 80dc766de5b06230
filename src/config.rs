use crate::layout::Viewport;
use crate::location::LocationParts;
use crate::{Error, Result};

/// User-facing strings the page inserts into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    pub anchor_aria_label: String,
    pub copy_notification: String,
    pub mobile_nav_toggle: String,
    pub search_placeholder_compact: String,
    pub search_placeholder_wide: String,
}

impl Default for PageLabels {
    fn default() -> Self {
        Self {
            anchor_aria_label: "Ссылка на этот раздел".into(),
            copy_notification: "Ссылка скопирована!".into(),
            mobile_nav_toggle: "Содержание".into(),
            search_placeholder_compact: "Поиск...".into(),
            search_placeholder_wide: "Поиск по тексту...".into(),
        }
    }
}

/// Element lookups, timings and breakpoints for a transcript page.
///
/// Every duration is in virtual milliseconds. Pixel values use the same units
/// as [`crate::LayoutBox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub content_root_id: String,
    pub search_input_id: String,
    pub clear_search_id: String,
    pub progress_bar_id: String,
    pub nav_item_selector: String,
    pub section_selector: String,
    pub heading_selector: String,
    pub category_card_selector: String,
    pub navigation_region_selector: String,

    pub search_debounce_ms: i64,
    pub nav_update_debounce_ms: i64,
    pub card_press_ms: i64,
    pub anchor_fade_in_ms: i64,
    pub anchor_remove_ms: i64,
    pub notification_show_ms: i64,
    pub notification_visible_ms: i64,
    pub notification_remove_ms: i64,
    pub hash_scroll_delay_ms: i64,

    pub header_offset: i64,
    pub active_probe_offset: i64,
    pub nav_breakpoint: i64,
    pub compact_search_breakpoint: i64,
    pub swipe_threshold: i64,

    pub viewport: Viewport,
    pub document_url: String,
    pub labels: PageLabels,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            content_root_id: "transcriptContent".into(),
            search_input_id: "searchInput".into(),
            clear_search_id: "clearSearch".into(),
            progress_bar_id: "scrollProgress".into(),
            nav_item_selector: ".nav-item".into(),
            section_selector: "section[id]".into(),
            heading_selector: "h2[id], h3[id]".into(),
            category_card_selector: ".category-card".into(),
            navigation_region_selector: ".section-navigation".into(),

            search_debounce_ms: 300,
            nav_update_debounce_ms: 100,
            card_press_ms: 150,
            anchor_fade_in_ms: 10,
            anchor_remove_ms: 200,
            notification_show_ms: 10,
            notification_visible_ms: 2000,
            notification_remove_ms: 300,
            hash_scroll_delay_ms: 100,

            header_offset: 120,
            active_probe_offset: 150,
            nav_breakpoint: 1024,
            compact_search_breakpoint: 640,
            swipe_threshold: 50,

            viewport: Viewport::default(),
            document_url: "http://localhost/index.html".into(),
            labels: PageLabels::default(),
        }
    }
}

impl PageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.content_root_id.trim().is_empty() {
            return Err(Error::Config("content_root_id must not be empty".into()));
        }
        if self.search_debounce_ms <= 0 {
            return Err(Error::Config(format!(
                "search_debounce_ms must be positive (got {})",
                self.search_debounce_ms
            )));
        }
        if self.nav_update_debounce_ms <= 0 {
            return Err(Error::Config(format!(
                "nav_update_debounce_ms must be positive (got {})",
                self.nav_update_debounce_ms
            )));
        }
        let delays = [
            ("card_press_ms", self.card_press_ms),
            ("anchor_fade_in_ms", self.anchor_fade_in_ms),
            ("anchor_remove_ms", self.anchor_remove_ms),
            ("notification_show_ms", self.notification_show_ms),
            ("notification_visible_ms", self.notification_visible_ms),
            ("notification_remove_ms", self.notification_remove_ms),
            ("hash_scroll_delay_ms", self.hash_scroll_delay_ms),
            ("swipe_threshold", self.swipe_threshold),
        ];
        if let Some((name, value)) = delays.iter().find(|(_, value)| *value < 0) {
            return Err(Error::Config(format!(
                "{name} must not be negative (got {value})"
            )));
        }
        if self.compact_search_breakpoint >= self.nav_breakpoint {
            return Err(Error::Config(format!(
                "compact_search_breakpoint ({}) must be below nav_breakpoint ({})",
                self.compact_search_breakpoint, self.nav_breakpoint
            )));
        }
        if self.viewport.width <= 0 || self.viewport.height <= 0 {
            return Err(Error::Config(format!(
                "viewport must have a positive size (got {}x{})",
                self.viewport.width, self.viewport.height
            )));
        }
        LocationParts::parse(&self.document_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() -> Result<()> {
        PageConfig::default().validate()
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let config = PageConfig {
            search_debounce_ms: 0,
            ..PageConfig::default()
        };
        let err = config.validate().expect_err("zero debounce");
        assert!(matches!(err, Error::Config(msg) if msg.contains("search_debounce_ms")));

        let config = PageConfig {
            nav_update_debounce_ms: 0,
            ..PageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_content_root_is_rejected() {
        let config = PageConfig {
            content_root_id: "  ".into(),
            ..PageConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn breakpoints_must_be_ordered() {
        let config = PageConfig {
            compact_search_breakpoint: 1024,
            ..PageConfig::default()
        };
        let err = config.validate().expect_err("equal breakpoints");
        assert!(err.to_string().contains("nav_breakpoint"));
    }

    #[test]
    fn relative_document_url_is_rejected() {
        let config = PageConfig {
            document_url: "transcript.html".into(),
            ..PageConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn negative_delay_is_named_in_error() {
        let config = PageConfig {
            anchor_remove_ms: -1,
            ..PageConfig::default()
        };
        let err = config.validate().expect_err("negative delay");
        assert!(err.to_string().contains("anchor_remove_ms"));
    }
}
