use crate::dom::NodeId;
use crate::Error;

/// Deferred page work. Each variant names what runs when the timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimerTask {
    RunSearch { query: String },
    UpdateActiveNav,
    ReleaseCardPress(NodeId),
    FadeInAnchor(NodeId),
    RemoveAnchor(NodeId),
    ShowNotification(NodeId),
    HideNotification(NodeId),
    RemoveNotification(NodeId),
    ScrollToHashTarget(NodeId),
}

impl TimerTask {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::RunSearch { .. } => "search",
            Self::UpdateActiveNav => "active_nav",
            Self::ReleaseCardPress(_) => "card_press",
            Self::FadeInAnchor(_) => "anchor_fade_in",
            Self::RemoveAnchor(_) => "anchor_remove",
            Self::ShowNotification(_) => "notification_show",
            Self::HideNotification(_) => "notification_hide",
            Self::RemoveNotification(_) => "notification_remove",
            Self::ScrollToHashTarget(_) => "hash_scroll",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) task: TimerTask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub label: &'static str,
}

/// Virtual clock plus a `(due_at, order)`-ordered one-shot timer queue.
#[derive(Debug)]
pub(crate) struct Scheduler {
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }
}

impl Scheduler {
    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn set_now_ms(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }

    pub(crate) fn timer_step_limit(&self) -> usize {
        self.timer_step_limit
    }

    pub(crate) fn set_timer_step_limit(&mut self, max_steps: usize) -> crate::Result<()> {
        if max_steps == 0 {
            return Err(Error::Config(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    pub(crate) fn schedule(&mut self, task: TimerTask, delay_ms: i64) -> (i64, i64) {
        let delay_ms = delay_ms.max(0);
        let due_at = self.now_ms.saturating_add(delay_ms);
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            task,
        });
        (id, due_at)
    }

    /// Drops a pending timer; returns whether one was queued under `id`.
    pub(crate) fn cancel(&mut self, id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != id);
        self.task_queue.len() != before
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        cleared
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.task_queue.len()
    }

    pub(crate) fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                label: task.task.label(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn next_task(&self, due_limit: Option<i64>) -> Option<&ScheduledTask> {
        self.next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
    }

    /// Removes and returns the earliest task due at or before `due_limit`.
    pub(crate) fn pop_next(&mut self, due_limit: Option<i64>) -> Option<ScheduledTask> {
        let idx = self.next_task_index(due_limit)?;
        Some(self.task_queue.remove(idx))
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }
}

/// Single-slot pending timer for one trigger source.
///
/// Rescheduling cancels whatever the slot still holds, so a source never has
/// more than one queued invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerSlot {
    pending: Option<i64>,
}

impl TimerSlot {
    /// Returns the new timer id and the id of the timer it superseded, if any.
    pub(crate) fn reschedule(
        &mut self,
        scheduler: &mut Scheduler,
        task: TimerTask,
        delay_ms: i64,
    ) -> (i64, Option<i64>) {
        let canceled = self.cancel(scheduler);
        let (id, _) = scheduler.schedule(task, delay_ms);
        self.pending = Some(id);
        (id, canceled)
    }

    pub(crate) fn cancel(&mut self, scheduler: &mut Scheduler) -> Option<i64> {
        let id = self.pending.take()?;
        scheduler.cancel(id).then_some(id)
    }

    /// Called when timer `id` starts running.
    pub(crate) fn settle(&mut self, id: i64) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_pop_in_due_then_insertion_order() {
        let mut scheduler = Scheduler::default();
        let (late, _) = scheduler.schedule(TimerTask::UpdateActiveNav, 20);
        let (first, _) = scheduler.schedule(TimerTask::UpdateActiveNav, 5);
        let (second, _) = scheduler.schedule(TimerTask::UpdateActiveNav, 5);

        assert!(scheduler.pop_next(Some(4)).is_none());
        let popped = [
            scheduler.pop_next(None).map(|t| t.id),
            scheduler.pop_next(None).map(|t| t.id),
            scheduler.pop_next(None).map(|t| t.id),
        ];
        assert_eq!(popped, [Some(first), Some(second), Some(late)]);
    }

    #[test]
    fn negative_delay_is_clamped_to_now() {
        let mut scheduler = Scheduler::default();
        scheduler.set_now_ms(50);
        let (_, due_at) = scheduler.schedule(TimerTask::UpdateActiveNav, -10);
        assert_eq!(due_at, 50);
    }

    #[test]
    fn slot_keeps_at_most_one_pending_timer() {
        let mut scheduler = Scheduler::default();
        let mut slot = TimerSlot::default();

        let (first, canceled) = slot.reschedule(
            &mut scheduler,
            TimerTask::RunSearch { query: "co".into() },
            300,
        );
        assert_eq!(canceled, None);
        let (second, canceled) = slot.reschedule(
            &mut scheduler,
            TimerTask::RunSearch { query: "con".into() },
            300,
        );
        assert_eq!(canceled, Some(first));
        assert_eq!(scheduler.pending_len(), 1);
        assert_eq!(scheduler.pending_timers()[0].id, second);

        let task = scheduler.pop_next(None).expect("pending search");
        slot.settle(task.id);
        assert_eq!(slot.cancel(&mut scheduler), None);
        assert_eq!(
            task.task,
            TimerTask::RunSearch {
                query: "con".into()
            }
        );
    }

    #[test]
    fn cancel_reports_only_timers_still_queued() {
        let mut scheduler = Scheduler::default();
        let mut slot = TimerSlot::default();
        slot.reschedule(&mut scheduler, TimerTask::UpdateActiveNav, 100);
        scheduler.clear_all();
        assert_eq!(slot.cancel(&mut scheduler), None);
    }

    #[test]
    fn step_limit_rejects_zero() {
        let mut scheduler = Scheduler::default();
        let err = scheduler
            .set_timer_step_limit(0)
            .expect_err("zero should be rejected");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(scheduler.timer_step_limit(), 10_000);
    }

    #[test]
    fn pending_timers_are_sorted_and_labeled() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(TimerTask::UpdateActiveNav, 100);
        scheduler.schedule(TimerTask::RunSearch { query: "ab".into() }, 30);
        let labels = scheduler
            .pending_timers()
            .into_iter()
            .map(|timer| (timer.due_at, timer.label))
            .collect::<Vec<_>>();
        assert_eq!(labels, vec![(30, "search"), (100, "active_nav")]);
    }
}
