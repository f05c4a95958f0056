//! Ownership of a session's repeating timer task.
//!
//! A draft session must never have two governors ticking its clock, or
//! reserves would drain twice as fast. The session therefore owns a
//! [`TimerSlot`] holding at most one [`TimerHandle`]; installing a new
//! handle aborts the old task, and dropping the slot aborts whatever is
//! left.

use tokio::task::AbortHandle;
use tracing::debug;

/// Handle to a spawned timer task. Aborts the task when dropped.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    /// `true` once the task has completed or been aborted.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Abort the task. Idempotent.
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Holds the single live timer of a session.
#[derive(Debug, Default)]
pub struct TimerSlot {
    current: Option<TimerHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handle`, aborting any timer already in the slot.
    pub fn install(&mut self, handle: TimerHandle) {
        if let Some(previous) = self.current.replace(handle) {
            debug!("replacing live timer");
            previous.cancel();
        }
    }

    /// Abort and forget the current timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }

    /// `true` if a timer is installed and its task hasn't ended.
    pub fn is_live(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn forever() -> tokio::task::JoinHandle<()> {
        tokio::spawn(async {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_replaces_and_aborts_previous_timer() {
        let first = forever();
        let second = forever();
        let first_abort = first.abort_handle();

        let mut slot = TimerSlot::new();
        slot.install(TimerHandle::new(first.abort_handle()));
        slot.install(TimerHandle::new(second.abort_handle()));

        let err = first.await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(first_abort.is_finished());
        assert!(slot.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_empties_slot() {
        let task = forever();
        let mut slot = TimerSlot::new();
        slot.install(TimerHandle::new(task.abort_handle()));

        slot.cancel();

        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!slot.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_slot_aborts_timer() {
        let task = forever();
        {
            let mut slot = TimerSlot::new();
            slot.install(TimerHandle::new(task.abort_handle()));
        }
        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_empty_slot_is_not_live() {
        assert!(!TimerSlot::new().is_live());
    }
}
