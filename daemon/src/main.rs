mod daemon;
mod error;
mod ewmh;
mod prelude;
mod toggle;

use focus_last_core::{
    daemon_utils::{self, LockOutcome},
    store,
};

use crate::{daemon::FocusDaemon, prelude::*};

fn main() {
    if let Err(e) = setup_logging() {
        eprintln!("{e}");
        std::process::exit(1);
    }
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn setup_logging() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Loads the persisted history, then lets the instance lock decide the
/// role: a newly acquired lock makes this process the daemon, a held lock
/// means a daemon is already tracking focus and this invocation only has
/// to toggle back to the previous window.
fn run() -> Result<()> {
    let lock_path = daemon_utils::lock_path();
    let state_path = daemon_utils::state_path();
    let history = store::load(&state_path);

    match daemon_utils::try_acquire(&lock_path)? {
        LockOutcome::AlreadyHeld => toggle::run(&history),
        LockOutcome::Acquired(lock_file) => {
            let daemon = FocusDaemon::new(lock_file, history, state_path)?;
            let result = daemon.listen();
            // voluntary exit path: the lock dies with the process either
            // way, unlinking just avoids leaving a stale file behind
            daemon_utils::unlink_lock_file(&lock_path);
            result
        }
    }
}
