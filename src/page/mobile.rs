use std::collections::VecDeque;

use super::{Behavior, EventDetail, EventState, ListenerTarget, Page};
use crate::html::escape_text;
use crate::Result;

const TOGGLE_CLASS: &str = "mobile-nav-toggle lg:hidden w-full mb-4 px-4 py-2 bg-blue-500 text-white rounded-lg flex items-center justify-between";
const TOGGLE_ICON_HTML: &str =
    r#"<i class="fas fa-chevron-down transition-transform duration-200"></i>"#;

/// Swipes kept for inspection; older ones are dropped first.
pub const SWIPE_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

/// A completed touch. Swipes are recorded but never acted on, so they cannot
/// interfere with normal scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    pub start_y: i64,
    pub end_y: i64,
    /// `start_y - end_y`: positive when the finger moved up.
    pub distance: i64,
    /// `None` when the distance stays under the threshold.
    pub direction: Option<SwipeDirection>,
}

#[derive(Debug, Default)]
pub(crate) struct MobileState {
    pub(crate) nav_expanded: bool,
}

#[derive(Debug, Default)]
pub(crate) struct TouchState {
    pub(crate) start_y: i64,
    pub(crate) swipes: VecDeque<Swipe>,
}

impl Page {
    pub(super) fn init_mobile(&mut self) {
        if let Err(err) = self.apply_responsive_layout() {
            self.trace_state
                .line(format!("[error] responsive layout init {err}"));
        }
        self.listen(ListenerTarget::Window, "resize", Behavior::ResponsiveLayout);
        let document = self.dom.root();
        self.listen(
            ListenerTarget::Node(document),
            "touchstart",
            Behavior::TouchStart,
        );
        self.listen(
            ListenerTarget::Node(document),
            "touchend",
            Behavior::TouchEnd,
        );
    }

    pub(super) fn apply_responsive_layout(&mut self) -> Result<()> {
        self.update_mobile_nav_toggle()?;
        self.update_responsive_search()
    }

    fn update_mobile_nav_toggle(&mut self) -> Result<()> {
        let Some(region) = self
            .dom
            .query_selector(&self.config.navigation_region_selector)?
        else {
            return Ok(());
        };
        let Some(nav) = self.dom.query_selector_from(region, "nav")? else {
            return Ok(());
        };
        let existing = self.dom.query_selector(".mobile-nav-toggle")?;

        if self.layout.viewport().width > self.config.nav_breakpoint {
            if let Some(toggle) = existing {
                self.dom.remove_node(toggle)?;
                self.listeners.remove_target(ListenerTarget::Node(toggle));
            }
            return self.dom.class_remove(nav, "hidden");
        }

        if existing.is_some() {
            return Ok(());
        }
        let Some(nav_parent) = self.dom.parent(nav) else {
            return Ok(());
        };
        let toggle = self.dom.create_detached_element("button", &[("class", TOGGLE_CLASS)]);
        let markup = format!(
            "<span>{}</span>{TOGGLE_ICON_HTML}",
            escape_text(&self.config.labels.mobile_nav_toggle)
        );
        self.dom.set_inner_html(toggle, &markup)?;
        self.dom.class_add(nav, "hidden")?;
        self.dom.class_add(nav, "lg:block")?;
        self.dom.insert_before(nav_parent, toggle, nav)?;
        self.listen(
            ListenerTarget::Node(toggle),
            "click",
            Behavior::MobileNavToggleClick,
        );
        self.mobile.nav_expanded = false;
        Ok(())
    }

    fn update_responsive_search(&mut self) -> Result<()> {
        let Some(input) = self.search_input() else {
            return Ok(());
        };
        if self.layout.viewport().width <= self.config.compact_search_breakpoint {
            let placeholder = self.config.labels.search_placeholder_compact.clone();
            self.dom.set_attr(input, "placeholder", &placeholder)?;
            self.dom.class_remove(input, "w-64")?;
            self.dom.class_add(input, "w-full")
        } else {
            let placeholder = self.config.labels.search_placeholder_wide.clone();
            self.dom.set_attr(input, "placeholder", &placeholder)?;
            self.dom.class_remove(input, "w-full")?;
            self.dom.class_add(input, "w-64")
        }
    }

    pub(super) fn on_mobile_nav_toggle(&mut self, event: &EventState) -> Result<()> {
        let toggle = event.current_node()?;
        let Some(region) = self
            .dom
            .query_selector(&self.config.navigation_region_selector)?
        else {
            return Ok(());
        };
        let Some(nav) = self.dom.query_selector_from(region, "nav")? else {
            return Ok(());
        };
        self.mobile.nav_expanded = !self.mobile.nav_expanded;
        let icon = self.dom.query_selector_from(toggle, "i")?;
        if self.mobile.nav_expanded {
            self.dom.class_remove(nav, "hidden")?;
            if let Some(icon) = icon {
                self.dom.class_add(icon, "rotate-180")?;
            }
        } else {
            self.dom.class_add(nav, "hidden")?;
            if let Some(icon) = icon {
                self.dom.class_remove(icon, "rotate-180")?;
            }
        }
        Ok(())
    }

    pub(super) fn on_touch_start(&mut self, event: &EventState) -> Result<()> {
        if let EventDetail::Touch { screen_y } = event.detail {
            self.touch.start_y = screen_y;
        }
        Ok(())
    }

    pub(super) fn on_touch_end(&mut self, event: &EventState) -> Result<()> {
        let EventDetail::Touch { screen_y } = event.detail else {
            return Ok(());
        };
        let start_y = self.touch.start_y;
        let distance = start_y - screen_y;
        let threshold = self.config.swipe_threshold;
        let direction = if distance > threshold {
            Some(SwipeDirection::Up)
        } else if distance < -threshold {
            Some(SwipeDirection::Down)
        } else {
            None
        };
        if self.touch.swipes.len() >= SWIPE_HISTORY_LIMIT {
            self.touch.swipes.pop_front();
        }
        self.touch.swipes.push_back(Swipe {
            start_y,
            end_y: screen_y,
            distance,
            direction,
        });
        self.trace_state.line(format!(
            "[touch] swipe start_y={start_y} end_y={screen_y} distance={distance} direction={direction:?}"
        ));
        Ok(())
    }
}

