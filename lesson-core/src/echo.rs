//! Echo suppression between the controller and the owner of its block list.
//!
//! The controller emits every change to an external owner, and the same
//! owner pushes block lists back in. Each emission is stamped with an
//! [`Epoch`]; when the owner reflects an emission back it passes that epoch
//! along, and the arrival is recognized as the controller's own change
//! instead of an external update. Untagged arrivals are always external.

use serde::{Deserialize, Serialize};

use crate::model::RawBlock;

/// Sequence number of an emission. Zero means nothing was emitted yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    pub const ZERO: Epoch = Epoch(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Epoch {
        Epoch(self.0.saturating_add(1))
    }
}

/// A block list pushed in from outside
#[derive(Debug, Clone, Default)]
pub struct Incoming {
    pub blocks: Vec<RawBlock>,
    /// Epoch of the emission this list reflects, if it is one
    pub echo_of: Option<Epoch>,
}

impl Incoming {
    /// A list that did not originate from this controller
    pub fn external(blocks: Vec<RawBlock>) -> Self {
        Self {
            blocks,
            echo_of: None,
        }
    }

    /// The owner handing back what the controller emitted at `epoch`
    pub fn echo(epoch: Epoch, blocks: Vec<RawBlock>) -> Self {
        Self {
            blocks,
            echo_of: Some(epoch),
        }
    }
}

/// What the controller did with an incoming list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reception {
    /// Reflection of our own emission; state already reflects it
    Absorbed,
    /// Genuine external update; state was replaced
    Replaced,
}

#[derive(Debug, Clone, Default)]
pub struct EchoGuard {
    emitted: Epoch,
    acknowledged: Epoch,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the next emission
    pub fn arm(&mut self) -> Epoch {
        self.emitted = self.emitted.next();
        self.emitted
    }

    /// Whether an arrival tagged `echo_of` reflects one of our emissions.
    ///
    /// Any epoch we have emitted counts, including ones older than the
    /// latest: the state already contains everything they carried.
    pub fn is_echo(&mut self, echo_of: Option<Epoch>) -> bool {
        match echo_of {
            Some(epoch) if epoch > Epoch::ZERO && epoch <= self.emitted => {
                self.acknowledged = self.acknowledged.max(epoch);
                true
            }
            _ => false,
        }
    }

    /// Latest emission not yet reflected back, if any
    pub fn pending(&self) -> Option<Epoch> {
        (self.emitted > self.acknowledged).then_some(self.emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_is_never_echo() {
        let mut guard = EchoGuard::new();
        guard.arm();
        assert!(!guard.is_echo(None));
        assert_eq!(guard.pending(), Some(Epoch(1)));
    }

    #[test]
    fn test_echo_of_latest_is_absorbed() {
        let mut guard = EchoGuard::new();
        let epoch = guard.arm();
        assert!(guard.is_echo(Some(epoch)));
        assert_eq!(guard.pending(), None);
    }

    #[test]
    fn test_stale_echo_is_still_ours() {
        let mut guard = EchoGuard::new();
        let first = guard.arm();
        let second = guard.arm();
        assert!(guard.is_echo(Some(first)));
        assert_eq!(guard.pending(), Some(second));
        assert!(guard.is_echo(Some(second)));
        assert_eq!(guard.pending(), None);
    }

    #[test]
    fn test_unknown_epoch_is_external() {
        let mut guard = EchoGuard::new();
        assert!(!guard.is_echo(Some(Epoch::ZERO)));
        guard.arm();
        assert!(!guard.is_echo(Some(Epoch(7))));
    }
}
