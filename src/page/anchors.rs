use std::collections::HashMap;

use super::{Behavior, EventState, ListenerTarget, Page};
use crate::dom::NodeId;
use crate::html::escape_text;
use crate::scheduler::TimerTask;
use crate::Result;

const ANCHOR_LINK_CLASS: &str =
    "anchor-link text-gray-400 hover:text-gray-600 ml-2 opacity-0 transition-opacity duration-200";
const ANCHOR_ICON_HTML: &str = r#"<i class="fas fa-link text-sm"></i>"#;
const NOTIFICATION_CLASS: &str = "copy-notification fixed top-20 right-4 bg-green-500 text-white px-4 py-2 rounded-lg shadow-lg z-50 transform translate-x-full transition-transform duration-300";
const NOTIFICATION_ICON_HTML: &str = r#"<i class="fas fa-check mr-2"></i>"#;
const OFFSCREEN_CLASS: &str = "translate-x-full";

impl Page {
    pub(super) fn init_anchor_links(&mut self) {
        let selector = self.config.heading_selector.clone();
        for heading in self.select_all_logged(&selector) {
            self.listen(
                ListenerTarget::Node(heading),
                "mouseenter",
                Behavior::ShowAnchorLink,
            );
            self.listen(
                ListenerTarget::Node(heading),
                "mouseleave",
                Behavior::HideAnchorLink,
            );
        }
    }

    /// Appends the heading's anchor link if it has none yet, then fades it in.
    pub(super) fn show_anchor_link(&mut self, event: &EventState) -> Result<()> {
        let heading = event.current_node()?;
        if self.dom.query_selector_from(heading, ".anchor-link")?.is_some() {
            return Ok(());
        }
        let heading_id = self.dom.attr(heading, "id").unwrap_or_default();
        let attrs = HashMap::from([
            ("href".to_string(), format!("#{heading_id}")),
            ("class".to_string(), ANCHOR_LINK_CLASS.to_string()),
            (
                "aria-label".to_string(),
                self.config.labels.anchor_aria_label.clone(),
            ),
        ]);
        let link = self.dom.create_element(heading, "a".into(), attrs);
        self.dom.set_inner_html(link, ANCHOR_ICON_HTML)?;
        self.listen(ListenerTarget::Node(link), "click", Behavior::AnchorLinkClick);
        self.scheduler
            .schedule(TimerTask::FadeInAnchor(link), self.config.anchor_fade_in_ms);
        Ok(())
    }

    pub(super) fn hide_anchor_link(&mut self, event: &EventState) -> Result<()> {
        let heading = event.current_node()?;
        let Some(link) = self.dom.query_selector_from(heading, ".anchor-link")? else {
            return Ok(());
        };
        self.dom.class_remove(link, "opacity-100")?;
        self.dom.class_add(link, "opacity-0")?;
        self.scheduler
            .schedule(TimerTask::RemoveAnchor(link), self.config.anchor_remove_ms);
        Ok(())
    }

    pub(crate) fn fade_in_anchor_link(&mut self, link: NodeId) -> Result<()> {
        self.dom.class_remove(link, "opacity-0")?;
        self.dom.class_add(link, "opacity-100")
    }

    pub(crate) fn remove_anchor_link(&mut self, link: NodeId) -> Result<()> {
        if self.dom.parent(link).is_none() {
            return Ok(());
        }
        self.dom.remove_node(link)?;
        self.listeners.remove_target(ListenerTarget::Node(link));
        Ok(())
    }

    /// Copies the section URL, then scrolls to the section. The notification
    /// only appears when the clipboard accepted the write.
    pub(super) fn on_anchor_link_click(&mut self, event: &mut EventState) -> Result<()> {
        event.default_prevented = true;
        let link = event.current_node()?;
        let href = self.dom.attr(link, "href").unwrap_or_default();
        let url = format!(
            "{}//{}{}{}",
            self.location.protocol(),
            self.location.host(),
            self.location.pathname,
            href
        );

        let copied = if self.platform_mocks.clipboard_denied {
            self.trace_state
                .line(format!("[error] clipboard write denied url={url}"));
            false
        } else {
            self.platform_mocks.clipboard_text = url;
            true
        };

        let section_id = href.chars().skip(1).collect::<String>();
        if let Some(target) = self.dom.by_id(&section_id) {
            self.scroll_below_header(target);
        }

        if copied {
            self.show_copy_notification()?;
        }
        Ok(())
    }

    fn show_copy_notification(&mut self) -> Result<()> {
        for existing in self.dom.query_selector_all(".copy-notification")? {
            self.dom.remove_node(existing)?;
        }
        let body = self
            .dom
            .query_selector("body")?
            .unwrap_or_else(|| self.dom.root());
        let attrs = HashMap::from([("class".to_string(), NOTIFICATION_CLASS.to_string())]);
        let notification = self.dom.create_element(body, "div".into(), attrs);
        let markup = format!(
            "{NOTIFICATION_ICON_HTML}{}",
            escape_text(&self.config.labels.copy_notification)
        );
        self.dom.set_inner_html(notification, &markup)?;
        self.scheduler.schedule(
            TimerTask::ShowNotification(notification),
            self.config.notification_show_ms,
        );
        self.scheduler.schedule(
            TimerTask::HideNotification(notification),
            self.config.notification_visible_ms,
        );
        Ok(())
    }

    pub(crate) fn slide_in_notification(&mut self, notification: NodeId) -> Result<()> {
        self.dom.class_remove(notification, OFFSCREEN_CLASS)
    }

    pub(crate) fn slide_out_notification(&mut self, notification: NodeId) -> Result<()> {
        self.dom.class_add(notification, OFFSCREEN_CLASS)?;
        self.scheduler.schedule(
            TimerTask::RemoveNotification(notification),
            self.config.notification_remove_ms,
        );
        Ok(())
    }

    pub(crate) fn remove_notification(&mut self, notification: NodeId) -> Result<()> {
        if self.dom.parent(notification).is_none() {
            return Ok(());
        }
        self.dom.remove_node(notification)
    }
}
