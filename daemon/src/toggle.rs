use std::{thread::sleep, time::Duration};

use focus_last_core::{
    constants::{ALL_DESKTOPS, SETTLE_DELAY_MS},
    history::FocusHistory,
};

use crate::{ewmh::Ewmh, prelude::*};

/// Toggle role: a one-shot jump back to the previously focused window,
/// switching desktops first when the target lives somewhere else. An empty
/// history is a no-op, not an error.
#[instrument(skip(history))]
pub fn run(history: &FocusHistory) -> Result<()> {
    let ewmh = Ewmh::connect()?;

    let Some(target) = history.activation_target() else {
        debug!("No previous window recorded, nothing to do");
        return Ok(());
    };

    let current = ewmh.current_desktop()?;
    if target.desktop != current && target.desktop != ALL_DESKTOPS {
        debug!(from = current, to = target.desktop, "Switching desktop");
        ewmh.switch_desktop(target.desktop)?;
    }
    info!("Activating {target}");
    ewmh.activate(target.window)?;
    ewmh.flush()?;

    // give the window manager time to act on the requests before the
    // connection drops
    sleep(Duration::from_millis(SETTLE_DELAY_MS));
    Ok(())
}
