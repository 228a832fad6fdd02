//! Monotonic request tickets
//!
//! Every outgoing request takes a [`Ticket`]. When its response arrives it is
//! applied only if no newer response has been applied already, so a slow
//! earlier request can never overwrite the result of a faster later one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position of a request in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Marks `ticket` applied if it is newer than every applied ticket
    ///
    /// Returns false for stale tickets. Callers that also write state must
    /// hold their state lock across this call and the write.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.applied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (ticket.0 > current).then_some(ticket.0)
            })
            .is_ok()
    }

    /// Whether `ticket` is the most recently issued one
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let sequencer = RequestSequencer::new();
        let a = sequencer.issue();
        let b = sequencer.issue();
        assert!(b > a);
        assert_eq!(a.value(), 1);
        assert!(sequencer.is_latest(b));
        assert!(!sequencer.is_latest(a));
    }

    #[test]
    fn test_out_of_order_responses() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(sequencer.try_apply(second));
        assert!(!sequencer.try_apply(first));
    }

    #[test]
    fn test_in_order_responses() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(sequencer.try_apply(first));
        assert!(sequencer.try_apply(second));
        assert!(!sequencer.try_apply(second));
    }
}
