use super::{Behavior, EventDetail, EventState, ListenerTarget, Page};
use crate::dom::NodeId;
use crate::highlight::Marker;
use crate::scheduler::TimerTask;
use crate::Result;

const HIDDEN_CLASS: &str = "hidden";

impl Page {
    pub(crate) fn search_input(&self) -> Option<NodeId> {
        self.dom.by_id(&self.config.search_input_id)
    }

    pub(crate) fn clear_button(&self) -> Option<NodeId> {
        self.dom.by_id(&self.config.clear_search_id)
    }

    pub(crate) fn content_root(&self) -> Option<NodeId> {
        self.dom.by_id(&self.config.content_root_id)
    }

    pub(super) fn init_search(&mut self) {
        let (Some(input), Some(_)) = (self.search_input(), self.content_root()) else {
            self.trace_state
                .search_line("[search] disabled: search input or content root missing".into());
            return;
        };
        self.listen(ListenerTarget::Node(input), "input", Behavior::SearchInput);
        if let Some(button) = self.clear_button() {
            self.listen(
                ListenerTarget::Node(button),
                "click",
                Behavior::ClearSearchClick,
            );
        }
        let document = self.dom.root();
        self.listen(
            ListenerTarget::Node(document),
            "keydown",
            Behavior::KeyboardShortcuts,
        );
    }

    /// Debounces: only the last input inside the quiet window runs a search.
    pub(super) fn on_search_input(&mut self, event: &EventState) -> Result<()> {
        let input = event.current_node()?;
        let query = self.dom.value(input)?.trim().to_string();
        let (timer_id, canceled) = self.search_slot.reschedule(
            &mut self.scheduler,
            TimerTask::RunSearch {
                query: query.clone(),
            },
            self.config.search_debounce_ms,
        );
        let canceled = canceled
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".into());
        self.trace_state.search_line(format!(
            "[search] debounce query={query:?} timer={timer_id} canceled={canceled}"
        ));
        Ok(())
    }

    pub(crate) fn run_search(&mut self, query: &str) -> Result<()> {
        if query.is_empty() {
            return self.clear_search_state();
        }
        let Some(root) = self.content_root() else {
            return Ok(());
        };
        let count = self.highlighter.search(&mut self.dom, root, query).len();
        self.trace_state
            .search_line(format!("[search] run query={query:?} markers={count}"));
        self.sync_clear_button()?;
        if let Some(first) = self.highlighter.first().map(Marker::node) {
            self.scroll_into_view_centered(first);
        }
        Ok(())
    }

    /// Empties the input, drops every marker and any search still waiting on
    /// its debounce, and hides the clear control.
    pub(crate) fn clear_search_state(&mut self) -> Result<()> {
        if let Some(timer_id) = self.search_slot.cancel(&mut self.scheduler) {
            self.trace_state
                .timer_line(format!("[timer] cancel id={timer_id} label=search"));
        }
        if let Some(input) = self.search_input() {
            self.dom.set_value(input, "")?;
        }
        let removed = self.highlighter.markers().len();
        self.highlighter.reset(&mut self.dom);
        self.trace_state
            .search_line(format!("[search] clear removed={removed}"));
        self.sync_clear_button()
    }

    fn sync_clear_button(&mut self) -> Result<()> {
        let Some(button) = self.clear_button() else {
            return Ok(());
        };
        if self.highlighter.markers().is_empty() {
            self.dom.class_add(button, HIDDEN_CLASS)
        } else {
            self.dom.class_remove(button, HIDDEN_CLASS)
        }
    }

    fn scroll_into_view_centered(&mut self, node: NodeId) {
        let Some(found) = self.layout.nearest_box(&self.dom, node) else {
            let label = self.trace_node_label(node);
            self.trace_state.line(format!(
                "[scroll] into_view skipped target={label} reason=no_layout_box"
            ));
            return;
        };
        let viewport = self.layout.viewport();
        let target = found.top + found.height / 2 - viewport.height / 2;
        self.window_scroll_to(target, "into_view");
    }

    pub(super) fn on_keyboard_shortcut(&mut self, event: &mut EventState) -> Result<()> {
        let EventDetail::Key(key) = &event.detail else {
            return Ok(());
        };
        let find_shortcut = (key.ctrl || key.meta) && key.key == "f";
        let escape = key.key == "Escape";
        let Some(input) = self.search_input() else {
            return Ok(());
        };

        if find_shortcut {
            event.default_prevented = true;
            self.focus_node(input);
            self.selection = Some(input);
            self.trace_state
                .search_line("[search] shortcut focus+select".into());
        }
        if escape && self.active_element == Some(input) {
            self.clear_search_state()?;
            self.blur_node(input);
        }
        Ok(())
    }
}
