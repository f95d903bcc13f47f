//! The leaderboard store itself.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::BoardError;

/// `list` returns at most this many entries. The cap is a view limit,
/// not an expiry: slower records stay stored and resurface if a faster
/// one is deleted.
pub const MAX_ENTRIES: usize = 100;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub time_ms: u64,
}

/// A JSON-file-backed leaderboard.
///
/// All access goes through one async mutex, held across the file write
/// so concurrent mutations serialize instead of clobbering each other.
/// Mutations are staged on a copy and only committed to memory once the
/// file write succeeds, so a failed persist leaves both memory and disk
/// unchanged. Writes go to a temp file first and are renamed into
/// place, so a crash mid-write never leaves a truncated board behind.
#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
    entries: Mutex<Vec<Entry>>,
}

impl Leaderboard {
    /// Opens the board at `path`, creating the file (and any missing
    /// parent directories) on first use.
    ///
    /// A file that exists but fails to parse is treated as empty rather
    /// than fatal: the board heals itself on the next write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BoardError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Entry>>(&bytes) {
                Ok(mut entries) => {
                    entries.sort_by_key(|e| e.time_ms);
                    entries
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "leaderboard file is not valid JSON, starting empty"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::write(&path, "[]").await?;
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), entries = entries.len(), "leaderboard opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The top of the board, best time first, at most [`MAX_ENTRIES`]
    /// rows. Entries past the cap remain stored and are only hidden
    /// from the listing.
    pub async fn list(&self) -> Vec<Entry> {
        let entries = self.entries.lock().await;
        let mut listed = entries.clone();
        listed.truncate(MAX_ENTRIES);
        listed
    }

    /// Adds a score and persists the board.
    ///
    /// `time_ms` comes in as the wire's floating-point milliseconds and
    /// is rounded to whole milliseconds. The returned entry carries the
    /// generated id.
    pub async fn insert(&self, name: &str, time_ms: f64) -> Result<Entry, BoardError> {
        let name = validate_name(name)?;
        let time_ms = validate_time(time_ms)?;

        let entry = Entry {
            id: generate_id(),
            name: name.to_owned(),
            time_ms,
        };

        let mut entries = self.entries.lock().await;
        let mut staged = entries.clone();
        staged.push(entry.clone());
        staged.sort_by_key(|e| e.time_ms);
        self.persist(&staged).await?;
        *entries = staged;
        debug!(id = %entry.id, name = %entry.name, time_ms, "leaderboard entry added");
        Ok(entry)
    }

    /// Updates an entry's name and/or time. Omitted fields keep their
    /// current value; supplied fields are validated like on insert.
    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        time_ms: Option<f64>,
    ) -> Result<Entry, BoardError> {
        let name = name.map(validate_name).transpose()?;
        let time_ms = time_ms.map(validate_time).transpose()?;

        let mut entries = self.entries.lock().await;
        let mut staged = entries.clone();
        let entry = staged
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| BoardError::NotFound(id.to_owned()))?;
        if let Some(name) = name {
            entry.name = name.to_owned();
        }
        if let Some(time_ms) = time_ms {
            entry.time_ms = time_ms;
        }
        let updated = entry.clone();

        staged.sort_by_key(|e| e.time_ms);
        self.persist(&staged).await?;
        *entries = staged;
        debug!(id = %updated.id, "leaderboard entry updated");
        Ok(updated)
    }

    /// Deletes an entry by id, returning the removed record.
    pub async fn remove(&self, id: &str) -> Result<Entry, BoardError> {
        let mut entries = self.entries.lock().await;
        let mut staged = entries.clone();
        let index = staged
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BoardError::NotFound(id.to_owned()))?;
        let removed = staged.remove(index);
        self.persist(&staged).await?;
        *entries = staged;
        debug!(id, "leaderboard entry removed");
        Ok(removed)
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &[Entry]) -> Result<(), BoardError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, BoardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::InvalidName);
    }
    Ok(name)
}

fn validate_time(time_ms: f64) -> Result<u64, BoardError> {
    if !time_ms.is_finite() || time_ms < 0.0 {
        return Err(BoardError::InvalidTime);
    }
    Ok(time_ms.round() as u64)
}

/// Timestamp in base-36 plus six random base-36 characters. Compact,
/// roughly sortable by creation time, and unique enough for a board
/// that tops out at 100 rows.
fn generate_id() -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut id = to_base36(now_ms);
    let mut rng = rand::rng();
    for _ in 0..6 {
        id.push(DIGITS[rng.random_range(0..DIGITS.len())] as char);
    }
    id
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  AGENT1  ").unwrap(), "AGENT1");
        assert!(matches!(validate_name(""), Err(BoardError::InvalidName)));
        assert!(matches!(validate_name("   "), Err(BoardError::InvalidName)));
    }

    #[test]
    fn test_validate_time_rejects_junk() {
        assert_eq!(validate_time(1234.4).unwrap(), 1234);
        assert_eq!(validate_time(1234.6).unwrap(), 1235);
        assert_eq!(validate_time(0.0).unwrap(), 0);
        assert!(matches!(validate_time(-1.0), Err(BoardError::InvalidTime)));
        assert!(matches!(
            validate_time(f64::NAN),
            Err(BoardError::InvalidTime)
        ));
        assert!(matches!(
            validate_time(f64::INFINITY),
            Err(BoardError::InvalidTime)
        ));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 35), "10z");
        // Millisecond timestamps land in 8 base-36 digits.
        assert_eq!(to_base36(1_700_000_000_000).len(), 8);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.len() > 6);
    }
}
