use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::error::{FlowError, Result};

/// A cooperative cancellation flag shared between a running computation and
/// whoever may want to stop it.  Clones share the same flag.
///
/// Algorithms poll the token between augmentation steps and at the top of
/// every augmenting-path search; a cancelled algorithm returns
/// [`FlowError::Cancelled`] and leaves any partial graph mutation to be
/// undone by its owner's rollback.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.  Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(FlowError::Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FlowError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert_eq!(other.check(), Ok(()));
        token.cancel();
        assert!(other.is_cancelled());
        assert_eq!(other.check(), Err(FlowError::Cancelled));
    }
}
