use super::{Behavior, EventDetail, EventState, ListenerTarget, Page};
use crate::dom::NodeId;
use crate::scheduler::TimerTask;
use crate::Result;

const ACTIVE_CLASS: &str = "active";

impl Page {
    pub(super) fn init_navigation(&mut self) {
        let selector = self.config.nav_item_selector.clone();
        for item in self.select_all_logged(&selector) {
            self.listen(ListenerTarget::Node(item), "click", Behavior::NavItemClick);
        }
        self.listen(ListenerTarget::Window, "scroll", Behavior::ScheduleActiveNav);
        if let Err(err) = self.update_active_navigation() {
            self.trace_state
                .line(format!("[error] active nav init {err}"));
        }
    }

    pub(super) fn init_category_cards(&mut self) {
        let selector = self.config.category_card_selector.clone();
        for card in self.select_all_logged(&selector) {
            self.listen(
                ListenerTarget::Node(card),
                "click",
                Behavior::CategoryCardClick,
            );
            self.listen(
                ListenerTarget::Node(card),
                "keydown",
                Behavior::CategoryCardKeydown,
            );
            if !self.dom.has_attr(card, "tabindex") {
                if let Err(err) = self.dom.set_attr(card, "tabindex", "0") {
                    self.trace_state
                        .line(format!("[error] category card tabindex {err}"));
                }
            }
        }
    }

    /// Element named by a link's `href` fragment. The first character of the
    /// `href` is dropped unconditionally, as a `#` prefix is assumed.
    fn fragment_target(&self, link: NodeId) -> Option<NodeId> {
        let href = self.dom.attr(link, "href")?;
        let id = href.chars().skip(1).collect::<String>();
        self.dom.by_id(&id)
    }

    pub(super) fn on_nav_item_click(&mut self, event: &mut EventState) -> Result<()> {
        event.default_prevented = true;
        let item = event.current_node()?;
        let Some(target) = self.fragment_target(item) else {
            return Ok(());
        };
        self.scroll_below_header(target);
        self.activate_nav_item(item)
    }

    pub(super) fn schedule_active_nav(&mut self) -> Result<()> {
        let (timer_id, canceled) = self.nav_slot.reschedule(
            &mut self.scheduler,
            TimerTask::UpdateActiveNav,
            self.config.nav_update_debounce_ms,
        );
        if let Some(canceled) = canceled {
            self.trace_state
                .timer_line(format!("[timer] cancel id={canceled} label=active_nav"));
        }
        self.trace_state.timer_line(format!(
            "[timer] schedule id={timer_id} label=active_nav delay_ms={}",
            self.config.nav_update_debounce_ms
        ));
        Ok(())
    }

    /// Activates the nav item of the section under the probe line. When
    /// sections overlap, the last one in document order wins.
    pub(crate) fn update_active_navigation(&mut self) -> Result<()> {
        let probe = self.layout.scroll_y() + self.config.active_probe_offset;
        let sections = self.dom.query_selector_all(&self.config.section_selector)?;
        let mut hit = None;
        for section in sections {
            let Some(found) = self.layout.box_of(section) else {
                continue;
            };
            if !found.contains(probe) {
                continue;
            }
            let Some(id) = self.dom.attr(section, "id") else {
                continue;
            };
            if let Some(item) = self.nav_item_for(&id)? {
                hit = Some(item);
            }
        }
        if let Some(item) = hit {
            self.activate_nav_item(item)?;
        }
        Ok(())
    }

    fn nav_item_for(&self, section_id: &str) -> Result<Option<NodeId>> {
        let wanted = format!("#{section_id}");
        let items = self.dom.query_selector_all(&self.config.nav_item_selector)?;
        Ok(items
            .into_iter()
            .find(|item| self.dom.attr(*item, "href").as_deref() == Some(wanted.as_str())))
    }

    fn activate_nav_item(&mut self, item: NodeId) -> Result<()> {
        let items = self.dom.query_selector_all(&self.config.nav_item_selector)?;
        for other in items {
            self.dom.class_remove(other, ACTIVE_CLASS)?;
        }
        self.dom.class_add(item, ACTIVE_CLASS)
    }

    pub(super) fn on_category_card_click(&mut self, event: &mut EventState) -> Result<()> {
        event.default_prevented = true;
        let card = event.current_node()?;
        let Some(target) = self.fragment_target(card) else {
            return Ok(());
        };
        self.scroll_below_header(target);
        if let Some(section_id) = self.dom.attr(target, "id") {
            if let Some(item) = self.nav_item_for(&section_id)? {
                self.activate_nav_item(item)?;
            }
        }
        self.dom.style_set(card, "transform", "scale(0.95)")?;
        self.scheduler
            .schedule(TimerTask::ReleaseCardPress(card), self.config.card_press_ms);
        Ok(())
    }

    pub(crate) fn release_card_press(&mut self, card: NodeId) -> Result<()> {
        self.dom.style_set(card, "transform", "scale(1)")
    }

    /// Enter and Space act as a click on a focused card.
    pub(super) fn on_category_card_keydown(&mut self, event: &mut EventState) -> Result<()> {
        let EventDetail::Key(key) = &event.detail else {
            return Ok(());
        };
        if key.key != "Enter" && key.key != " " {
            return Ok(());
        }
        event.default_prevented = true;
        let card = event.current_node()?;
        self.perform_click(card);
        Ok(())
    }

    pub(super) fn on_hash_navigation(&mut self) -> Result<()> {
        let Some(id) = self.location.hash.strip_prefix('#') else {
            return Ok(());
        };
        let Some(target) = self.dom.by_id(id) else {
            return Ok(());
        };
        let (timer_id, _) = self.scheduler.schedule(
            TimerTask::ScrollToHashTarget(target),
            self.config.hash_scroll_delay_ms,
        );
        self.trace_state.timer_line(format!(
            "[timer] schedule id={timer_id} label=hash_scroll delay_ms={}",
            self.config.hash_scroll_delay_ms
        ));
        Ok(())
    }

    pub(crate) fn scroll_to_hash_target(&mut self, target: NodeId) -> Result<()> {
        if self.dom.is_connected(target) {
            self.scroll_below_header(target);
        }
        Ok(())
    }

    /// Default action of an unprevented click on an `href="#…"` link: jump to
    /// the element, then update the location and fire `hashchange` if the
    /// fragment changed.
    pub(crate) fn follow_fragment_link(&mut self, href: &str) {
        if let Some(target) = href.strip_prefix('#').and_then(|id| self.dom.by_id(id)) {
            let top = self.element_top(target);
            self.window_scroll_to(top, "fragment");
        }
        self.navigate_to_hash(href);
    }

    pub(crate) fn navigate_to_hash(&mut self, hash: &str) {
        let before = self.location.hash.clone();
        self.location.set_hash(hash);
        if self.location.hash != before {
            let (from, to) = (before, self.location.hash.clone());
            self.trace_state
                .event_line(format!("[event] hashchange from={from:?} to={to:?}"));
            self.dispatch_event(ListenerTarget::Window, "hashchange", EventDetail::None);
        }
    }
}
