use super::{Behavior, ListenerTarget, Page};
use crate::Result;

impl Page {
    pub(super) fn init_scroll_progress(&mut self) {
        if self.dom.by_id(&self.config.progress_bar_id).is_none() {
            return;
        }
        self.listen(
            ListenerTarget::Window,
            "scroll",
            Behavior::UpdateScrollProgress,
        );
        if let Err(err) = self.update_scroll_progress() {
            self.trace_state
                .line(format!("[error] scroll progress init {err}"));
        }
    }

    pub(super) fn update_scroll_progress(&mut self) -> Result<()> {
        let Some(bar) = self.dom.by_id(&self.config.progress_bar_id) else {
            return Ok(());
        };
        let percent = self.layout.progress_percent();
        self.dom.style_set(bar, "width", &format!("{percent}%"))?;
        self.trace_state.line(format!(
            "[scroll] progress scroll_y={} percent={percent}",
            self.layout.scroll_y()
        ));
        Ok(())
    }
}
