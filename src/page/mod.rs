//! The page controller: owns the document, the clock and all session state, and
//! reacts to dispatched events the way the transcript page's script does.
//!
//! Behaviors are registered per element and event type during
//! [`Page::initialize`]. A dispatched event walks from its target up to the
//! document (unless it does not bubble) and runs every behavior registered on
//! the way. Behaviors never fail the dispatch; their errors go to the trace.

mod anchors;
mod driver;
mod mobile;
mod navigation;
mod progress;
mod search;

use std::collections::HashMap;

use crate::config::PageConfig;
use crate::dom::{Dom, NodeId};
use crate::highlight::Highlighter;
use crate::layout::LayoutState;
use crate::location::LocationParts;
use crate::scheduler::{ScheduledTask, Scheduler, TimerSlot, TimerTask};
use crate::trace::TraceState;
use crate::{Error, Result};

pub use mobile::{SWIPE_HISTORY_LIMIT, Swipe, SwipeDirection};

use mobile::{MobileState, TouchState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ListenerTarget {
    Window,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    UpdateScrollProgress,
    ScheduleActiveNav,
    NavItemClick,
    SearchInput,
    ClearSearchClick,
    KeyboardShortcuts,
    CategoryCardClick,
    CategoryCardKeydown,
    ShowAnchorLink,
    HideAnchorLink,
    AnchorLinkClick,
    ResponsiveLayout,
    MobileNavToggleClick,
    TouchStart,
    TouchEnd,
    HashNavigation,
}

impl Behavior {
    fn label(self) -> &'static str {
        match self {
            Self::UpdateScrollProgress => "scroll_progress",
            Self::ScheduleActiveNav => "schedule_active_nav",
            Self::NavItemClick => "nav_item_click",
            Self::SearchInput => "search_input",
            Self::ClearSearchClick => "clear_search",
            Self::KeyboardShortcuts => "keyboard_shortcuts",
            Self::CategoryCardClick => "category_card_click",
            Self::CategoryCardKeydown => "category_card_keydown",
            Self::ShowAnchorLink => "show_anchor_link",
            Self::HideAnchorLink => "hide_anchor_link",
            Self::AnchorLinkClick => "anchor_link_click",
            Self::ResponsiveLayout => "responsive_layout",
            Self::MobileNavToggleClick => "mobile_nav_toggle",
            Self::TouchStart => "touch_start",
            Self::TouchEnd => "touch_end",
            Self::HashNavigation => "hash_navigation",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<ListenerTarget, HashMap<String, Vec<Behavior>>>,
}

impl ListenerStore {
    /// Registers `behavior` unless the same pair is already present, so
    /// repeated initialization never doubles a reaction.
    pub(crate) fn add(&mut self, target: ListenerTarget, event: &str, behavior: Behavior) -> bool {
        let listeners = self
            .map
            .entry(target)
            .or_default()
            .entry(event.to_string())
            .or_default();
        if listeners.contains(&behavior) {
            return false;
        }
        listeners.push(behavior);
        true
    }

    pub(crate) fn get(&self, target: ListenerTarget, event: &str) -> Vec<Behavior> {
        self.map
            .get(&target)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn remove_target(&mut self, target: ListenerTarget) {
        self.map.remove(&target);
    }
}

/// A key as reported by a `keydown` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EventDetail {
    None,
    Key(KeyPress),
    Touch { screen_y: i64 },
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: ListenerTarget,
    pub(crate) current_target: ListenerTarget,
    pub(crate) bubbles: bool,
    pub(crate) default_prevented: bool,
    pub(crate) detail: EventDetail,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: ListenerTarget, detail: EventDetail) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            bubbles: event_bubbles(event_type),
            default_prevented: false,
            detail,
        }
    }

    /// The element the running behavior was registered on.
    pub(crate) fn current_node(&self) -> Result<NodeId> {
        match self.current_target {
            ListenerTarget::Node(node) => Ok(node),
            ListenerTarget::Window => Err(Error::Dom(format!(
                "{} listener expects an element target",
                self.event_type
            ))),
        }
    }
}

fn event_bubbles(event_type: &str) -> bool {
    !matches!(
        event_type,
        "mouseenter" | "mouseleave" | "focus" | "blur" | "load" | "scroll" | "resize"
    )
}

#[derive(Debug, Default)]
pub(crate) struct PlatformMockState {
    pub(crate) clipboard_text: String,
    pub(crate) clipboard_denied: bool,
}

/// A transcript page: document, virtual clock and behavior state.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) config: PageConfig,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) layout: LayoutState,
    pub(crate) trace_state: TraceState,
    pub(crate) location: LocationParts,
    pub(crate) platform_mocks: PlatformMockState,
    pub(crate) highlighter: Highlighter,
    pub(crate) search_slot: TimerSlot,
    pub(crate) nav_slot: TimerSlot,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) selection: Option<NodeId>,
    pub(crate) mobile: MobileState,
    pub(crate) touch: TouchState,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, PageConfig::default())
    }

    /// Parses the document, wires every behavior and fires `load`.
    pub fn from_html_with_config(html: &str, config: PageConfig) -> Result<Self> {
        config.validate()?;
        let dom = Dom::parse(html)?;
        let location = LocationParts::parse(&config.document_url)?;
        let layout = LayoutState::new(config.viewport);
        let mut page = Self {
            dom,
            config,
            listeners: ListenerStore::default(),
            scheduler: Scheduler::default(),
            layout,
            trace_state: TraceState::default(),
            location,
            platform_mocks: PlatformMockState::default(),
            highlighter: Highlighter::new(),
            search_slot: TimerSlot::default(),
            nav_slot: TimerSlot::default(),
            active_element: None,
            selection: None,
            mobile: MobileState::default(),
            touch: TouchState::default(),
        };
        page.initialize();
        page.dispatch_event(ListenerTarget::Window, "load", EventDetail::None);
        Ok(page)
    }

    /// Wires every feature whose elements exist and runs their initial
    /// updates. Safe to call again: listeners are never registered twice.
    pub fn initialize(&mut self) {
        self.init_scroll_progress();
        self.init_navigation();
        self.init_search();
        self.init_anchor_links();
        self.init_category_cards();
        self.init_mobile();
        self.listen(ListenerTarget::Window, "load", Behavior::HashNavigation);
        self.listen(ListenerTarget::Window, "hashchange", Behavior::HashNavigation);
    }

    pub(crate) fn listen(&mut self, target: ListenerTarget, event: &str, behavior: Behavior) {
        self.listeners.add(target, event, behavior);
    }

    /// Resolves a configured selector, logging instead of failing so a bad
    /// selector only disables its own feature.
    pub(crate) fn select_all_logged(&mut self, selector: &str) -> Vec<NodeId> {
        match self.dom.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                self.trace_state
                    .line(format!("[error] selector={selector:?} {err}"));
                Vec::new()
            }
        }
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: ListenerTarget,
        event_type: &str,
        detail: EventDetail,
    ) -> EventState {
        let mut event = EventState::new(event_type, target, detail);

        let mut path = vec![target];
        if let ListenerTarget::Node(node) = target {
            let mut cursor = self.dom.parent(node);
            while let Some(parent) = cursor {
                path.push(ListenerTarget::Node(parent));
                cursor = self.dom.parent(parent);
            }
        }

        for (depth, current) in path.into_iter().enumerate() {
            if depth > 0 && !event.bubbles {
                break;
            }
            event.current_target = current;
            self.invoke_listeners(&mut event);
        }

        self.trace_event_done(&event);
        event
    }

    fn invoke_listeners(&mut self, event: &mut EventState) {
        let behaviors = self.listeners.get(event.current_target, &event.event_type);
        for behavior in behaviors {
            if self.trace_state.enabled() {
                let target_label = self.trace_target_label(event.target);
                let current_label = self.trace_target_label(event.current_target);
                self.trace_state.event_line(format!(
                    "[event] {} target={} current={} behavior={} default_prevented={}",
                    event.event_type,
                    target_label,
                    current_label,
                    behavior.label(),
                    event.default_prevented
                ));
            }
            if let Err(err) = self.run_behavior(behavior, event) {
                self.trace_state.line(format!(
                    "[error] {} behavior={} {err}",
                    event.event_type,
                    behavior.label()
                ));
            }
        }
    }

    fn run_behavior(&mut self, behavior: Behavior, event: &mut EventState) -> Result<()> {
        match behavior {
            Behavior::UpdateScrollProgress => self.update_scroll_progress(),
            Behavior::ScheduleActiveNav => self.schedule_active_nav(),
            Behavior::NavItemClick => self.on_nav_item_click(event),
            Behavior::SearchInput => self.on_search_input(event),
            Behavior::ClearSearchClick => self.clear_search_state(),
            Behavior::KeyboardShortcuts => self.on_keyboard_shortcut(event),
            Behavior::CategoryCardClick => self.on_category_card_click(event),
            Behavior::CategoryCardKeydown => self.on_category_card_keydown(event),
            Behavior::ShowAnchorLink => self.show_anchor_link(event),
            Behavior::HideAnchorLink => self.hide_anchor_link(event),
            Behavior::AnchorLinkClick => self.on_anchor_link_click(event),
            Behavior::ResponsiveLayout => self.apply_responsive_layout(),
            Behavior::MobileNavToggleClick => self.on_mobile_nav_toggle(event),
            Behavior::TouchStart => self.on_touch_start(event),
            Behavior::TouchEnd => self.on_touch_end(event),
            Behavior::HashNavigation => self.on_hash_navigation(),
        }
    }

    /// A full user click: the `click` event, then the default action of a
    /// fragment link when no behavior prevented it.
    pub(crate) fn perform_click(&mut self, node: NodeId) -> EventState {
        let event = self.dispatch_event(ListenerTarget::Node(node), "click", EventDetail::None);
        if event.default_prevented {
            return event;
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self
                .dom
                .tag_name(current)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("a"))
            {
                if let Some(href) = self.dom.attr(current, "href") {
                    if href.starts_with('#') {
                        self.follow_fragment_link(&href);
                    }
                }
                break;
            }
            cursor = self.dom.parent(current);
        }
        event
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) {
        if self.dom.disabled(node) || self.active_element == Some(node) {
            return;
        }
        if let Some(current) = self.active_element {
            self.blur_node(current);
        }
        self.active_element = Some(node);
        self.dispatch_event(ListenerTarget::Node(node), "focus", EventDetail::None);
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) {
        if self.active_element != Some(node) {
            return;
        }
        self.dispatch_event(ListenerTarget::Node(node), "blur", EventDetail::None);
        self.active_element = None;
        if self.selection == Some(node) {
            self.selection = None;
        }
    }

    /// Moves the window and fires `scroll` when the offset actually changed.
    pub(crate) fn window_scroll_to(&mut self, y: i64, reason: &str) {
        let from = self.layout.scroll_y();
        let to = self.layout.scroll_to(y);
        self.trace_state
            .line(format!("[scroll] {reason} requested={y} from={from} to={to}"));
        if to != from {
            self.dispatch_event(ListenerTarget::Window, "scroll", EventDetail::None);
        }
    }

    /// Fires `scroll` when a layout change re-clamped the offset away from
    /// `previous`.
    pub(crate) fn scroll_after_layout_change(&mut self, previous: i64, reason: &str) {
        let to = self.layout.scroll_y();
        if to == previous {
            return;
        }
        self.trace_state
            .line(format!("[scroll] clamp reason={reason} from={previous} to={to}"));
        self.dispatch_event(ListenerTarget::Window, "scroll", EventDetail::None);
    }

    /// Document top of a node. Nodes without a laid-out box (or ancestor
    /// with one) sit at the top of the document.
    pub(crate) fn element_top(&self, node: NodeId) -> i64 {
        self.layout
            .nearest_box(&self.dom, node)
            .map(|found| found.top)
            .unwrap_or(0)
    }

    /// Scrolls so `node` sits just below the fixed header.
    pub(crate) fn scroll_below_header(&mut self, node: NodeId) {
        let top = self.element_top(node) - self.config.header_offset;
        self.window_scroll_to(top, "smooth");
    }

    pub(crate) fn run_timer_queue(
        &mut self,
        due_limit: Option<i64>,
        advance_clock: bool,
    ) -> Result<usize> {
        let mut steps = 0usize;
        while self.scheduler.next_task(due_limit).is_some() {
            steps += 1;
            if steps > self.scheduler.timer_step_limit() {
                return Err(self.timer_step_limit_error(steps, due_limit));
            }
            let Some(task) = self.scheduler.pop_next(due_limit) else {
                break;
            };
            if advance_clock && task.due_at > self.scheduler.now_ms() {
                self.scheduler.set_now_ms(task.due_at);
            }
            self.execute_timer_task(task);
        }
        Ok(steps)
    }

    fn timer_step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        let next_task_desc = self
            .scheduler
            .next_task(due_limit)
            .map(|task| {
                format!(
                    "id={},due_at={},order={},label={}",
                    task.id,
                    task.due_at,
                    task.order,
                    task.task.label()
                )
            })
            .unwrap_or_else(|| "none".into());
        Error::Timer(format!(
            "timer queue exceeded max task steps: limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={next_task_desc}",
            self.scheduler.timer_step_limit(),
            self.scheduler.now_ms(),
            self.scheduler.pending_len(),
        ))
    }

    pub(crate) fn execute_timer_task(&mut self, task: ScheduledTask) {
        self.trace_state.timer_line(format!(
            "[timer] run id={} label={} due_at={} now_ms={}",
            task.id,
            task.task.label(),
            task.due_at,
            self.scheduler.now_ms()
        ));
        self.search_slot.settle(task.id);
        self.nav_slot.settle(task.id);

        let label = task.task.label();
        let outcome = match task.task {
            TimerTask::RunSearch { query } => self.run_search(&query),
            TimerTask::UpdateActiveNav => self.update_active_navigation(),
            TimerTask::ReleaseCardPress(card) => self.release_card_press(card),
            TimerTask::FadeInAnchor(link) => self.fade_in_anchor_link(link),
            TimerTask::RemoveAnchor(link) => self.remove_anchor_link(link),
            TimerTask::ShowNotification(node) => self.slide_in_notification(node),
            TimerTask::HideNotification(node) => self.slide_out_notification(node),
            TimerTask::RemoveNotification(node) => self.remove_notification(node),
            TimerTask::ScrollToHashTarget(node) => self.scroll_to_hash_target(node),
        };
        if let Err(err) = outcome {
            self.trace_state
                .line(format!("[error] timer id={} label={label} {err}", task.id));
        }
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !self.trace_state.enabled() {
            return;
        }
        let target_label = self.trace_target_label(event.target);
        self.trace_state.event_line(format!(
            "[event] done {} target={} default_prevented={}",
            event.event_type, target_label, event.default_prevented
        ));
    }

    pub(crate) fn trace_target_label(&self, target: ListenerTarget) -> String {
        match target {
            ListenerTarget::Window => "window".into(),
            ListenerTarget::Node(node) => self.trace_node_label(node),
        }
    }

    pub(crate) fn trace_node_label(&self, node: NodeId) -> String {
        if node == self.dom.root() {
            return "document".into();
        }
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }
}
