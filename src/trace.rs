use std::collections::VecDeque;

use crate::{Error, Result};

#[derive(Debug)]
pub(crate) struct TraceState {
    enabled: bool,
    events: bool,
    timers: bool,
    search: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            search: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl TraceState {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_events(&mut self, enabled: bool) {
        self.events = enabled;
    }

    pub(crate) fn set_timers(&mut self, enabled: bool) {
        self.timers = enabled;
    }

    pub(crate) fn set_search(&mut self, enabled: bool) {
        self.search = enabled;
    }

    pub(crate) fn set_to_stderr(&mut self, enabled: bool) {
        self.to_stderr = enabled;
    }

    pub(crate) fn set_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.log_limit = max_entries;
        while self.logs.len() > self.log_limit {
            self.logs.pop_front();
        }
        Ok(())
    }

    pub(crate) fn take_logs(&mut self) -> Vec<String> {
        self.logs.drain(..).collect()
    }

    pub(crate) fn event_line(&mut self, line: String) {
        if self.events {
            self.line(line);
        }
    }

    pub(crate) fn timer_line(&mut self, line: String) {
        if self.timers {
            self.line(line);
        }
    }

    pub(crate) fn search_line(&mut self, line: String) {
        if self.search {
            self.line(line);
        }
    }

    /// Uncategorized lines (`[scroll]`, `[touch]`, `[error]`) follow only the
    /// master switch.
    pub(crate) fn line(&mut self, line: String) {
        if !self.enabled {
            return;
        }
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_trace() -> TraceState {
        let mut trace = TraceState::default();
        trace.set_enabled(true);
        trace.set_to_stderr(false);
        trace
    }

    #[test]
    fn disabled_trace_records_nothing() {
        let mut trace = TraceState::default();
        trace.set_to_stderr(false);
        trace.line("[scroll] top=0".into());
        assert!(trace.take_logs().is_empty());
    }

    #[test]
    fn log_limit_keeps_latest_entries() -> Result<()> {
        let mut trace = quiet_trace();
        for idx in 0..5 {
            trace.line(format!("line {idx}"));
        }
        trace.set_log_limit(2)?;
        trace.line("line 5".into());
        assert_eq!(trace.take_logs(), vec!["line 4", "line 5"]);
        assert!(trace.take_logs().is_empty());
        Ok(())
    }

    #[test]
    fn categories_filter_independently() {
        let mut trace = quiet_trace();
        trace.set_timers(false);
        trace.set_search(false);
        trace.timer_line("[timer] run id=1".into());
        trace.search_line("[search] run query=ab".into());
        trace.event_line("[event] click".into());
        assert_eq!(trace.take_logs(), vec!["[event] click"]);
    }

    #[test]
    fn zero_log_limit_is_rejected() {
        let mut trace = quiet_trace();
        let err = trace.set_log_limit(0).expect_err("zero should fail");
        assert!(matches!(err, Error::Config(_)));
    }
}
