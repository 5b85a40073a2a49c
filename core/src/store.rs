//! Binary persistence of the focus history.
//!
//! On-disk layout is a fixed contract, independent of in-memory
//! representation: `[u32 version][older: u32 window, u32 desktop]
//! [newer: u32 window, u32 desktop]`, little-endian, 20 bytes. Reading is
//! best-effort; only writing can fail.

use std::fs::{File, OpenOptions, remove_file};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use bincode::config::{self, Configuration, Fixint, LittleEndian};

use crate::constants::STATE_VERSION;
use crate::history::{FocusHistory, FocusSlot};
use crate::prelude::*;

fn state_config() -> Configuration<LittleEndian, Fixint> {
    config::standard().with_fixed_int_encoding()
}

/// Reads the persisted history. Absence, a version mismatch and truncation
/// are all degraded-but-safe outcomes, never errors; a version-mismatched
/// file is deleted so it cannot shadow the next write.
pub fn load(path: &Path) -> FocusHistory {
    let mut buf = Vec::new();
    match File::open(path) {
        Ok(mut file) => {
            if let Err(e) = file.read_to_end(&mut buf) {
                warn!("Could not read state file {}: {e}", path.display());
                return FocusHistory::default();
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No state file at {} yet", path.display());
            return FocusHistory::default();
        }
        Err(e) => {
            warn!("Could not open state file {}: {e}", path.display());
            return FocusHistory::default();
        }
    }
    parse(path, &buf)
}

fn parse(path: &Path, buf: &[u8]) -> FocusHistory {
    let cfg = state_config();

    let version = bincode::decode_from_slice::<u32, _>(buf, cfg)
        .map(|(version, _)| version)
        .ok();
    if version != Some(STATE_VERSION) {
        warn!("State file version mismatch, removing {}", path.display());
        if let Err(e) = remove_file(path) {
            warn!("Could not remove state file {}: {e}", path.display());
        }
        return FocusHistory::default();
    }

    let mut offset = size_of::<u32>();
    let mut slots = [FocusSlot::default(); 2];
    for slot in &mut slots {
        match bincode::decode_from_slice::<FocusSlot, _>(&buf[offset..], cfg) {
            Ok((value, read)) => {
                *slot = value;
                offset += read;
            }
            Err(e) => {
                // partial recovery: keep what was read, leave the rest empty
                warn!("State file {} is truncated: {e}", path.display());
                break;
            }
        }
    }

    let [older, newer] = slots;
    let mut history = FocusHistory { older, newer };
    if history.newer.is_empty() && !history.older.is_empty() {
        // a truncated two-slot record leaves only the older half; keep the
        // empty slot in `older` so the history invariant holds
        std::mem::swap(&mut history.older, &mut history.newer);
    }
    history
}

/// Writes the history, version tag first, creating the file with
/// owner-only permissions and flushing before the handle drops.
pub fn save(path: &Path, history: &FocusHistory) -> Result<()> {
    let bytes =
        bincode::encode_to_vec((STATE_VERSION, history.older, history.newer), state_config())?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use std::fs::{metadata, read, write};
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use super::*;

    fn temp_state_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("focus-last-store-{}-{name}.state", std::process::id()))
    }

    fn sample_history() -> FocusHistory {
        FocusHistory {
            older: FocusSlot::new(0x0120_0001, 0),
            newer: FocusSlot::new(0x0140_0003, 1),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_state_path("round-trip");
        let history = sample_history();

        save(&path, &history).unwrap();
        assert_eq!(load(&path), history);

        remove_file(&path).unwrap();
    }

    #[test]
    fn record_is_twenty_bytes_with_owner_only_permissions() {
        let path = temp_state_path("layout");

        save(&path, &sample_history()).unwrap();
        let meta = metadata(&path).unwrap();
        assert_eq!(meta.len(), 20);
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);

        remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = temp_state_path("missing");
        assert_eq!(load(&path), FocusHistory::default());
    }

    #[test]
    fn version_mismatch_loads_empty_and_removes_the_file() {
        let path = temp_state_path("version");
        let stale = bincode::encode_to_vec(
            (STATE_VERSION + 1, sample_history().older, sample_history().newer),
            state_config(),
        )
        .unwrap();
        write(&path, stale).unwrap();

        assert_eq!(load(&path), FocusHistory::default());
        assert!(!path.exists());
    }

    #[test]
    fn truncation_after_one_slot_keeps_that_slot() {
        let path = temp_state_path("one-slot");
        let history = sample_history();

        save(&path, &history).unwrap();
        let bytes = read(&path).unwrap();
        write(&path, &bytes[..12]).unwrap();

        let loaded = load(&path);
        assert!(loaded.older.is_empty());
        assert_eq!(loaded.newer, history.older);
        assert_eq!(loaded.activation_target(), None);

        remove_file(&path).unwrap();
    }

    #[test]
    fn truncation_inside_a_slot_drops_it() {
        let path = temp_state_path("mid-slot");

        save(&path, &sample_history()).unwrap();
        let bytes = read(&path).unwrap();
        write(&path, &bytes[..6]).unwrap();

        assert_eq!(load(&path), FocusHistory::default());

        remove_file(&path).unwrap();
    }

    #[test]
    fn truncation_before_the_version_tag_counts_as_mismatch() {
        let path = temp_state_path("no-version");
        write(&path, [0x01, 0x00]).unwrap();

        assert_eq!(load(&path), FocusHistory::default());
        assert!(!path.exists());
    }
}
