use super::{EventDetail, KeyPress, ListenerTarget, Page, Swipe};
use crate::config::PageConfig;
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::highlight::{HighlightState, Marker};
use crate::layout::{LayoutBox, Viewport};
use crate::scheduler::PendingTimer;
use crate::{Error, Result};

impl Page {
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.set_enabled(enabled);
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.take_logs()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.set_to_stderr(enabled);
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.set_events(enabled);
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_state.set_timers(enabled);
    }

    pub fn set_trace_search(&mut self, enabled: bool) {
        self.trace_state.set_search(enabled);
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace_state.set_log_limit(max_entries)
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.scheduler.set_timer_step_limit(max_steps)
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        self.platform_mocks.clipboard_text = text.to_string();
    }

    pub fn clipboard_text(&self) -> String {
        self.platform_mocks.clipboard_text.clone()
    }

    /// When set, clipboard writes fail as if permission was refused.
    pub fn set_clipboard_denied(&mut self, denied: bool) {
        self.platform_mocks.clipboard_denied = denied;
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        if self.selection == Some(target) {
            self.selection = None;
        }
        self.dispatch_event(ListenerTarget::Node(target), "input", EventDetail::None);
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.perform_click(target);
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target);
        Ok(())
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target);
        Ok(())
    }

    /// Sends `keydown` to the focused element, or to `body` when nothing has
    /// focus. Returns whether a behavior prevented the default action.
    pub fn press_key(&mut self, key: KeyPress) -> Result<bool> {
        let target = match self.active_element {
            Some(node) if self.dom.is_connected(node) => node,
            _ => self
                .dom
                .query_selector("body")?
                .unwrap_or_else(|| self.dom.root()),
        };
        let event = self.dispatch_event(ListenerTarget::Node(target), "keydown", EventDetail::Key(key));
        Ok(event.default_prevented)
    }

    pub fn mouse_enter(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(ListenerTarget::Node(target), "mouseenter", EventDetail::None);
        Ok(())
    }

    pub fn mouse_leave(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(ListenerTarget::Node(target), "mouseleave", EventDetail::None);
        Ok(())
    }

    /// Fires a bare event with no key or touch detail.
    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(ListenerTarget::Node(target), event, EventDetail::None);
        Ok(())
    }

    pub fn touch_start(&mut self, screen_y: i64) -> Result<()> {
        let target = self.touch_target()?;
        self.dispatch_event(target, "touchstart", EventDetail::Touch { screen_y });
        Ok(())
    }

    pub fn touch_end(&mut self, screen_y: i64) -> Result<()> {
        let target = self.touch_target()?;
        self.dispatch_event(target, "touchend", EventDetail::Touch { screen_y });
        Ok(())
    }

    fn touch_target(&self) -> Result<ListenerTarget> {
        let node = self
            .dom
            .query_selector("body")?
            .unwrap_or_else(|| self.dom.root());
        Ok(ListenerTarget::Node(node))
    }

    /// Recorded swipes, oldest first, capped at `SWIPE_HISTORY_LIMIT`.
    pub fn swipes(&self) -> Vec<Swipe> {
        self.touch.swipes.iter().copied().collect()
    }

    /// User scroll. Fires `scroll` only when the clamped offset changes.
    pub fn scroll_to(&mut self, y: i64) {
        self.window_scroll_to(y, "user");
    }

    pub fn scroll_y(&self) -> i64 {
        self.layout.scroll_y()
    }

    pub fn scroll_progress(&self) -> f64 {
        self.layout.progress_percent()
    }

    pub fn resize(&mut self, width: i64, height: i64) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(Error::Config(format!(
                "resize requires a positive size (got {width}x{height})"
            )));
        }
        let previous = self.layout.set_viewport(Viewport { width, height });
        self.dispatch_event(ListenerTarget::Window, "resize", EventDetail::None);
        self.scroll_after_layout_change(previous, "resize");
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.layout.viewport()
    }

    /// Assigns the document box of the first element matching `selector`.
    pub fn set_layout_box(&mut self, selector: &str, top: i64, height: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        let previous = self.layout.set_box(target, LayoutBox::new(top, height));
        self.scroll_after_layout_change(previous, "layout_box");
        Ok(())
    }

    /// Shrinking the document below the current offset pulls the window up
    /// and fires `scroll`.
    pub fn set_document_height(&mut self, height: i64) {
        let previous = self.layout.set_document_height(height);
        self.scroll_after_layout_change(previous, "document_height");
    }

    pub fn document_height(&self) -> i64 {
        self.layout.document_height()
    }

    /// Changes the location fragment, firing `hashchange` when it differs.
    pub fn set_location_hash(&mut self, hash: &str) {
        self.navigate_to_hash(hash);
    }

    pub fn location_hash(&self) -> &str {
        &self.location.hash
    }

    pub fn location_href(&self) -> String {
        self.location.href()
    }

    pub fn search_query(&self) -> &str {
        self.highlighter.query()
    }

    pub fn highlight_state(&self) -> HighlightState {
        self.highlighter.state()
    }

    pub fn markers(&self) -> &[Marker] {
        self.highlighter.markers()
    }

    pub fn highlight_count(&self) -> usize {
        self.highlighter.markers().len()
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Whether the element's whole value is selected (after the find
    /// shortcut).
    pub fn is_selected(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.selection == Some(target))
    }

    pub fn nav_expanded(&self) -> bool {
        self.mobile.nav_expanded
    }

    /// Clears the search the way the page's debug hook does: empty the input
    /// and click the clear control.
    pub fn clear_search(&mut self) -> Result<()> {
        if let Some(input) = self.search_input() {
            self.dom.set_value(input, "")?;
        }
        match self.clear_button() {
            Some(button) => {
                self.perform_click(button);
                Ok(())
            }
            None => self.clear_search_state(),
        }
    }

    /// Scrolls the section with `section_id` below the header. Unknown ids are
    /// ignored.
    pub fn scroll_to_section(&mut self, section_id: &str) {
        if let Some(target) = self.dom.by_id(section_id) {
            self.scroll_below_header(target);
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let existed = self.scheduler.cancel(timer_id);
        self.trace_state.timer_line(format!(
            "[timer] clear id={timer_id} existed={existed}"
        ));
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.scheduler.clear_all();
        self.trace_state
            .timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending_timers()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms();
        let to = from.saturating_add(delta_ms);
        let ran = self.run_until(to)?;
        self.trace_state.timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={to} ran_due={ran}"
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.scheduler.now_ms();
        if target_ms < from {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        let ran = self.run_until(target_ms)?;
        self.trace_state.timer_line(format!(
            "[timer] advance_to from={from} to={target_ms} ran_due={ran}"
        ));
        Ok(())
    }

    /// Runs timers in due order, stepping the clock to each one, so a timer
    /// scheduled by another sees the time it fired at.
    fn run_until(&mut self, target_ms: i64) -> Result<usize> {
        let ran = self.run_timer_queue(Some(target_ms), true)?;
        self.scheduler.set_now_ms(target_ms);
        Ok(ran)
    }

    /// Runs every pending timer, including ones scheduled while flushing.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms();
        let ran = self.run_timer_queue(None, true)?;
        self.trace_state.timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.scheduler.now_ms()
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(task) = self.scheduler.pop_next(None) else {
            self.trace_state
                .timer_line("[timer] run_next none".into());
            return Ok(false);
        };
        if task.due_at > self.scheduler.now_ms() {
            self.scheduler.set_now_ms(task.due_at);
        }
        self.execute_timer_task(task);
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let now_ms = self.scheduler.now_ms();
        let ran = self.run_timer_queue(Some(now_ms), false)?;
        self.trace_state
            .timer_line(format!("[timer] run_due now_ms={now_ms} ran={ran}"));
        Ok(ran)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name} present={expected}"),
                actual: format!("present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}
