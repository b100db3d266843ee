//! Cooperative cancellation for `TreeDelta` (spec §5).
//!
//! A closure rather than a trait object with state: the core never needs
//! to hold onto a cancellation source, only poll it at directory
//! boundaries and before each text-delta window.
use crate::error::{CoreError, CoreResult};

/// Something `delta::diff` polls periodically. Returning `true` aborts the
/// walk with [`CoreError::Cancelled`] once the current frame is torn down.
pub trait CancelCheck {
    fn is_cancelled(&mut self) -> bool;
}

impl<F: FnMut() -> bool> CancelCheck for F {
    fn is_cancelled(&mut self) -> bool {
        self()
    }
}

/// Never cancels; the default for callers that don't need to interrupt a
/// diff.
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

pub(crate) fn check(cancel: &mut dyn CancelCheck) -> CoreResult<()> {
    if cancel.is_cancelled() {
        log::debug!("tree delta cancelled");
        Err(CoreError::Cancelled)
    } else {
        Ok(())
    }
}
