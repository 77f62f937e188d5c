//! The turn lock and the cursor it guards.

use parking_lot::Mutex as StateMutex;
use std::time::Duration;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::models::LeafIndex;
use crate::sequencer::SequencerState;

#[derive(Debug)]
struct Cursor {
    right: LeafIndex,
}

/// Admits one holder at a time to the cursor.
///
/// Only a [`TurnPermit`] can move the cursor; every move is republished on a
/// watch channel so readers never wait on the lock.
pub struct TurnGate {
    cursor: Mutex<Cursor>,
    state: StateMutex<SequencerState>,
    published: watch::Sender<LeafIndex>,
}

impl TurnGate {
    pub fn new(right: LeafIndex) -> Self {
        let (published, _) = watch::channel(right);
        Self {
            cursor: Mutex::new(Cursor { right }),
            state: StateMutex::new(SequencerState::Idle),
            published,
        }
    }

    /// Waits for the lock for as long as it takes.
    pub async fn acquire(&self, state: SequencerState) -> TurnPermit<'_> {
        let guard = self.cursor.lock().await;
        self.permit(guard, state)
    }

    /// Waits for the lock for at most `timeout`.
    pub async fn acquire_within(
        &self,
        timeout: Duration,
        state: SequencerState,
    ) -> Option<TurnPermit<'_>> {
        let guard = tokio::time::timeout(timeout, self.cursor.lock()).await.ok()?;
        Some(self.permit(guard, state))
    }

    fn permit<'a>(
        &'a self,
        guard: MutexGuard<'a, Cursor>,
        state: SequencerState,
    ) -> TurnPermit<'a> {
        *self.state.lock() = state;
        TurnPermit { guard, gate: self }
    }

    /// The last published cursor.
    pub fn cursor(&self) -> LeafIndex {
        *self.published.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<LeafIndex> {
        self.published.subscribe()
    }

    pub fn state(&self) -> SequencerState {
        *self.state.lock()
    }
}

/// Scope guard over the turn lock. Dropping it releases the lock.
pub struct TurnPermit<'a> {
    guard: MutexGuard<'a, Cursor>,
    gate: &'a TurnGate,
}

impl TurnPermit<'_> {
    pub fn cursor(&self) -> LeafIndex {
        self.guard.right
    }

    /// Moves the cursor and publishes the new value.
    pub fn advance(&mut self, right: LeafIndex) {
        self.guard.right = right;
        self.gate.published.send_replace(right);
    }
}

impl Drop for TurnPermit<'_> {
    fn drop(&mut self) {
        *self.gate.state.lock() = SequencerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::TurnDirection;

    #[tokio::test]
    async fn test_second_holder_times_out() {
        let gate = TurnGate::new(1);
        let turning = SequencerState::Turning(TurnDirection::Forward);
        let permit = gate
            .acquire_within(Duration::from_millis(10), turning)
            .await
            .unwrap();
        assert_eq!(gate.state(), SequencerState::Turning(TurnDirection::Forward));

        let second = gate
            .acquire_within(Duration::from_millis(10), SequencerState::Collecting)
            .await;
        assert!(second.is_none());

        drop(permit);
        assert_eq!(gate.state(), SequencerState::Idle);
        assert!(gate
            .acquire_within(Duration::from_millis(10), SequencerState::Collecting)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_advance_publishes_cursor() {
        let gate = TurnGate::new(1);
        let mut watcher = gate.watch();

        let mut permit = gate.acquire(SequencerState::Loading).await;
        permit.advance(2);
        drop(permit);

        assert_eq!(gate.cursor(), 2);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), 2);
    }
}
