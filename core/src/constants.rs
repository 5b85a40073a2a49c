//! Compiled-in configuration. The tool has no config surface; everything
//! tunable lives here.

/// File name of the instance lock, created under the runtime directory.
pub const LOCK_FILE: &str = "focus_last.lock";

/// File name of the persisted focus history.
pub const STATE_FILE: &str = "focus_last.state";

/// Env var naming the user runtime directory.
pub const RUNTIME_DIR: &str = "XDG_RUNTIME_DIR";

/// Fallback when the runtime dir is unset or not an absolute path.
pub const FALLBACK_DIR: &str = "/tmp";

/// Version tag leading the on-disk state record. Version 0 stored window
/// handles only; version 1 added the desktop id per slot.
pub const STATE_VERSION: u32 = 1;

/// X screen the helper operates on.
pub const SCREEN_NUM: usize = 0;

/// How long a toggle invocation waits after flushing its requests, so the
/// window manager can act before the connection drops.
pub const SETTLE_DELAY_MS: u64 = 250;

/// When false, every window is eligible for the history, not just windows
/// of type _NET_WM_WINDOW_TYPE_NORMAL.
pub const FILTER_NORMAL_WINDOWS: bool = true;

/// _NET_WM_DESKTOP value meaning "on all desktops".
pub const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;
