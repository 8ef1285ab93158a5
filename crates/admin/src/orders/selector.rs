//! Two-phase order status selector.
//!
//! Staff pick a new status (select), review it, then confirm. Only the
//! confirm step talks to the backend. A rejected update reverts the
//! displayed status to the last confirmed value, so the control never
//! shows a status the backend has not accepted.

use std::future::Future;

use marigold_core::{OrderId, OrderStatus};
use serde::Serialize;
use thiserror::Error;

/// Endpoint that applies a status change on the backend.
///
/// The selector submits through this seam so its commit/rollback logic can
/// be exercised without a live backend.
pub trait StatusEndpoint {
    type Error: std::fmt::Display;

    /// Apply `status` to the order, failing if the backend refuses it.
    fn submit_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Errors from misusing the selector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// A confirm is already in flight.
    #[error("A status update is already in flight")]
    Busy,

    /// Confirm or cancel called with nothing selected.
    #[error("No status change is pending")]
    NothingPending,
}

/// Outcome of a selector operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Transition {
    /// A new value was selected and awaits confirmation.
    Pending { from: OrderStatus, to: OrderStatus },
    /// The operation left the committed status as-is.
    Unchanged { status: OrderStatus },
    /// The backend accepted the change.
    Committed { status: OrderStatus },
    /// The backend refused the change; displayed status reverted.
    RolledBack { status: OrderStatus, reason: String },
}

/// Observer invoked after a status change commits.
type CommitObserver = Box<dyn Fn(&OrderId, OrderStatus) + Send + Sync>;

/// Per-order state machine: `Idle` (no pending value) or
/// `PendingConfirmation` (a value selected, awaiting confirm/cancel).
///
/// At most one change may be outstanding; while a confirm is in flight
/// every other operation fails with [`SelectorError::Busy`].
pub struct StatusSelector {
    order_id: OrderId,
    committed: OrderStatus,
    pending: Option<OrderStatus>,
    in_flight: bool,
    on_commit: Option<CommitObserver>,
}

impl std::fmt::Debug for StatusSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusSelector")
            .field("order_id", &self.order_id)
            .field("committed", &self.committed)
            .field("pending", &self.pending)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl StatusSelector {
    /// Create a selector showing the order's current confirmed status.
    #[must_use]
    pub const fn new(order_id: OrderId, committed: OrderStatus) -> Self {
        Self {
            order_id,
            committed,
            pending: None,
            in_flight: false,
            on_commit: None,
        }
    }

    /// Register an observer called after each committed change.
    pub fn set_on_commit(&mut self, observer: CommitObserver) {
        self.on_commit = Some(observer);
    }

    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// The last backend-confirmed status.
    #[must_use]
    pub const fn committed(&self) -> OrderStatus {
        self.committed
    }

    /// The selected-but-unconfirmed status, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<OrderStatus> {
        self.pending
    }

    /// The status the control currently displays.
    #[must_use]
    pub const fn displayed(&self) -> OrderStatus {
        match self.pending {
            Some(status) => status,
            None => self.committed,
        }
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Select a new status, entering `PendingConfirmation`.
    ///
    /// Selecting the committed value is a no-op that clears any pending
    /// selection. Re-selecting while pending replaces the pending value.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Busy`] while a confirm is in flight.
    pub fn select(&mut self, status: OrderStatus) -> Result<Transition, SelectorError> {
        if self.in_flight {
            return Err(SelectorError::Busy);
        }

        if status == self.committed {
            self.pending = None;
            return Ok(Transition::Unchanged {
                status: self.committed,
            });
        }

        self.pending = Some(status);
        Ok(Transition::Pending {
            from: self.committed,
            to: status,
        })
    }

    /// Discard the pending selection and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Busy`] while a confirm is in flight, or
    /// [`SelectorError::NothingPending`] if nothing was selected.
    pub fn cancel(&mut self) -> Result<Transition, SelectorError> {
        if self.in_flight {
            return Err(SelectorError::Busy);
        }
        if self.pending.take().is_none() {
            return Err(SelectorError::NothingPending);
        }
        Ok(Transition::Unchanged {
            status: self.committed,
        })
    }

    /// Start a confirm: marks the selector busy and yields the target status.
    ///
    /// Must be paired with [`Self::complete_confirm`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Busy`] if a confirm is already in flight, or
    /// [`SelectorError::NothingPending`] if nothing was selected.
    pub fn begin_confirm(&mut self) -> Result<OrderStatus, SelectorError> {
        if self.in_flight {
            return Err(SelectorError::Busy);
        }
        let Some(target) = self.pending else {
            return Err(SelectorError::NothingPending);
        };
        self.in_flight = true;
        Ok(target)
    }

    /// Finish a confirm with the backend's verdict.
    ///
    /// On success the pending value becomes the committed status and the
    /// observer fires. On failure the pending value is dropped, reverting
    /// the displayed status to the last confirmed value.
    pub fn complete_confirm(&mut self, result: Result<(), String>) -> Transition {
        self.in_flight = false;

        match (result, self.pending.take()) {
            (Ok(()), Some(target)) => {
                self.committed = target;
                if let Some(observer) = &self.on_commit {
                    observer(&self.order_id, target);
                }
                Transition::Committed { status: target }
            }
            (Err(reason), _) => Transition::RolledBack {
                status: self.committed,
                reason,
            },
            // begin_confirm guarantees a pending value; treat a missing one
            // as a no-op rather than panicking
            (Ok(()), None) => Transition::Unchanged {
                status: self.committed,
            },
        }
    }

    /// Confirm the pending selection against the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Busy`] or [`SelectorError::NothingPending`]
    /// without touching the backend. A backend refusal is NOT an error: it
    /// comes back as [`Transition::RolledBack`].
    pub async fn confirm<E: StatusEndpoint>(
        &mut self,
        endpoint: &E,
    ) -> Result<Transition, SelectorError> {
        let target = self.begin_confirm()?;
        let result = endpoint
            .submit_status(&self.order_id, target)
            .await
            .map_err(|e| e.to_string());
        Ok(self.complete_confirm(result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Endpoint stub that records submissions and answers from a script.
    struct StubEndpoint {
        accept: bool,
        calls: AtomicUsize,
    }

    impl StubEndpoint {
        const fn accepting() -> Self {
            Self {
                accept: true,
                calls: AtomicUsize::new(0),
            }
        }

        const fn rejecting() -> Self {
            Self {
                accept: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl StatusEndpoint for StubEndpoint {
        type Error = String;

        fn submit_status(
            &self,
            _order_id: &OrderId,
            _status: OrderStatus,
        ) -> impl Future<Output = Result<(), Self::Error>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let verdict = if self.accept {
                Ok(())
            } else {
                Err("transition refused".to_string())
            };
            async move { verdict }
        }
    }

    fn selector() -> StatusSelector {
        StatusSelector::new(OrderId::new("ord_42"), OrderStatus::Paid)
    }

    #[test]
    fn test_select_enters_pending() {
        let mut sel = selector();

        let transition = sel.select(OrderStatus::Shipped).unwrap();
        assert_eq!(
            transition,
            Transition::Pending {
                from: OrderStatus::Paid,
                to: OrderStatus::Shipped,
            }
        );
        assert_eq!(sel.pending(), Some(OrderStatus::Shipped));
        assert_eq!(sel.displayed(), OrderStatus::Shipped);
        assert_eq!(sel.committed(), OrderStatus::Paid);
    }

    #[test]
    fn test_select_current_status_is_noop() {
        let mut sel = selector();

        let transition = sel.select(OrderStatus::Paid).unwrap();
        assert_eq!(
            transition,
            Transition::Unchanged {
                status: OrderStatus::Paid
            }
        );
        assert_eq!(sel.pending(), None);
        assert_eq!(sel.displayed(), OrderStatus::Paid);
    }

    #[test]
    fn test_reselect_replaces_pending() {
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        sel.select(OrderStatus::Cancelled).unwrap();

        assert_eq!(sel.pending(), Some(OrderStatus::Cancelled));
    }

    #[test]
    fn test_select_committed_clears_pending() {
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        let transition = sel.select(OrderStatus::Paid).unwrap();

        assert_eq!(
            transition,
            Transition::Unchanged {
                status: OrderStatus::Paid
            }
        );
        assert_eq!(sel.pending(), None);
    }

    #[test]
    fn test_cancel_reverts_displayed() {
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        let transition = sel.cancel().unwrap();

        assert_eq!(
            transition,
            Transition::Unchanged {
                status: OrderStatus::Paid
            }
        );
        assert_eq!(sel.displayed(), OrderStatus::Paid);
    }

    #[test]
    fn test_cancel_without_pending_fails() {
        let mut sel = selector();
        assert_eq!(sel.cancel().unwrap_err(), SelectorError::NothingPending);
    }

    #[tokio::test]
    async fn test_confirm_success_commits() {
        let endpoint = StubEndpoint::accepting();
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        let transition = sel.confirm(&endpoint).await.unwrap();

        assert_eq!(
            transition,
            Transition::Committed {
                status: OrderStatus::Shipped
            }
        );
        assert_eq!(sel.committed(), OrderStatus::Shipped);
        assert_eq!(sel.pending(), None);
        assert!(!sel.is_in_flight());
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirm_failure_rolls_back() {
        let endpoint = StubEndpoint::rejecting();
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        let transition = sel.confirm(&endpoint).await.unwrap();

        assert_eq!(
            transition,
            Transition::RolledBack {
                status: OrderStatus::Paid,
                reason: "transition refused".to_string(),
            }
        );
        // Displayed status reverts to the pre-change value
        assert_eq!(sel.displayed(), OrderStatus::Paid);
        assert_eq!(sel.committed(), OrderStatus::Paid);
        assert_eq!(sel.pending(), None);
        assert!(!sel.is_in_flight());
    }

    #[tokio::test]
    async fn test_confirm_without_pending_fails() {
        let endpoint = StubEndpoint::accepting();
        let mut sel = selector();

        let err = sel.confirm(&endpoint).await.unwrap_err();
        assert_eq!(err, SelectorError::NothingPending);
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_busy_guard_blocks_everything() {
        let mut sel = selector();

        sel.select(OrderStatus::Shipped).unwrap();
        let target = sel.begin_confirm().unwrap();
        assert_eq!(target, OrderStatus::Shipped);
        assert!(sel.is_in_flight());

        assert_eq!(
            sel.select(OrderStatus::Cancelled).unwrap_err(),
            SelectorError::Busy
        );
        assert_eq!(sel.cancel().unwrap_err(), SelectorError::Busy);
        assert_eq!(sel.begin_confirm().unwrap_err(), SelectorError::Busy);

        // Completing the confirm releases the guard
        sel.complete_confirm(Ok(()));
        assert!(!sel.is_in_flight());
        assert_eq!(sel.committed(), OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_commit_observer_fires() {
        let endpoint = StubEndpoint::accepting();
        let seen: std::sync::Arc<Mutex<Vec<(String, OrderStatus)>>> =
            std::sync::Arc::new(Mutex::new(Vec::new()));

        let mut sel = selector();
        let sink = std::sync::Arc::clone(&seen);
        sel.set_on_commit(Box::new(move |order_id, status| {
            sink.lock().unwrap().push((order_id.to_string(), status));
        }));

        sel.select(OrderStatus::Processing).unwrap();
        sel.confirm(&endpoint).await.unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.as_slice(), &[("ord_42".to_string(), OrderStatus::Processing)]);
    }

    #[tokio::test]
    async fn test_observer_not_fired_on_rollback() {
        let endpoint = StubEndpoint::rejecting();
        let fired = std::sync::Arc::new(AtomicUsize::new(0));

        let mut sel = selector();
        let counter = std::sync::Arc::clone(&fired);
        sel.set_on_commit(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        sel.select(OrderStatus::Shipped).unwrap();
        sel.confirm(&endpoint).await.unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_transition_serializes_with_state_tag() {
        let transition = Transition::RolledBack {
            status: OrderStatus::Paid,
            reason: "refused".to_string(),
        };
        let json = serde_json::to_value(&transition).unwrap();
        assert_eq!(json["state"], "rolled_back");
        assert_eq!(json["status"], "PAID");
        assert_eq!(json["reason"], "refused");
    }
}
