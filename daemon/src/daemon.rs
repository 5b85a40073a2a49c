use std::fs::File;
use std::path::PathBuf;

use focus_last_core::{history::FocusHistory, store};

use crate::{ewmh::Ewmh, prelude::*};

/// Daemon role: keeps the focus history in sync with the window manager
/// for as long as the process lives.
pub struct FocusDaemon {
    _lock_file: File, // the daemon must hold the exclusive file lock while it is alive and running
    ewmh: Ewmh,
    history: FocusHistory,
    state_path: PathBuf,
}

impl FocusDaemon {
    pub fn new(lock_file: File, history: FocusHistory, state_path: PathBuf) -> Result<Self> {
        Ok(Self {
            _lock_file: lock_file,
            ewmh: Ewmh::connect()?,
            history,
            state_path,
        })
    }

    /// Subscribes to root property changes and records every focus change.
    /// Only a broken X connection ends the loop; the daemon otherwise runs
    /// until it is killed.
    #[instrument(skip(self), name = "Daemon")]
    pub fn listen(mut self) -> Result<()> {
        self.ewmh.watch_root_properties()?;
        debug!(
            desktop = self.ewmh.current_desktop().unwrap_or(0),
            window = self.ewmh.active_window().unwrap_or(0),
            "Watching for focus changes"
        );
        loop {
            self.ewmh.wait_for_active_window_change()?;
            if let Err(e) = self.record_active_window() {
                // the window may be gone by the time we query it
                error!("{e}");
            }
        }
    }

    fn record_active_window(&mut self) -> Result<()> {
        let window = self.ewmh.active_window()?;
        if window == 0 {
            return Ok(());
        }
        let eligible = self.ewmh.is_normal_window(window)?;
        let desktop = self.ewmh.window_desktop(window)?;

        if self.history.observe(window, desktop, eligible) {
            info!(older = %self.history.older, newer = %self.history.newer, "Focus history updated");
            if let Err(e) = store::save(&self.state_path, &self.history) {
                // the in-memory history stays authoritative
                warn!("Could not write state file {}: {e}", self.state_path.display());
            }
        }
        Ok(())
    }
}
