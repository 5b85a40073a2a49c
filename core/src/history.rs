//! The two-slot most-recently-used list of focused windows.

use bincode::{Decode, Encode};
use derive_more::Display;

/// One remembered window. `window == 0` marks the slot as unset, matching
/// the X11 null window handle.
#[derive(Encode, Decode, Display, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[display("window {window:#x} on desktop {desktop}")]
pub struct FocusSlot {
    pub window: u32,
    pub desktop: u32,
}

impl FocusSlot {
    pub fn new(window: u32, desktop: u32) -> Self {
        Self { window, desktop }
    }

    pub fn is_empty(&self) -> bool {
        self.window == 0
    }
}

/// The last two distinct eligible windows. At most one slot is ever empty,
/// and the empty one is always `older`.
#[derive(Encode, Decode, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusHistory {
    pub older: FocusSlot,
    pub newer: FocusSlot,
}

impl FocusHistory {
    /// Records an active-window observation. Returns whether the history
    /// changed and should be persisted.
    ///
    /// The null window, ineligible windows and repeat notifications for the
    /// window already in `newer` are all ignored. A window equal to `older`
    /// is not promoted specially; it shifts like any other observation, so
    /// the two slots swap.
    pub fn observe(&mut self, window: u32, desktop: u32, eligible: bool) -> bool {
        if !eligible || window == 0 || window == self.newer.window {
            return false;
        }
        self.older = self.newer;
        self.newer = FocusSlot::new(window, desktop);
        true
    }

    /// The slot a toggle invocation should jump back to.
    pub fn activation_target(&self) -> Option<FocusSlot> {
        (!self.older.is_empty()).then_some(self.older)
    }
}
