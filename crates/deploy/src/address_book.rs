//! Durable address book for deployed artifacts.
//!
//! Addresses are persisted in an env-style text file, one `KEY=address`
//! mapping per line, so that other tooling can pick them up after the run.

use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// The address book's durable medium could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("address book {} is unavailable", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persisted mapping from `(environment, logical artifact name)` to a
/// deployed address.
///
/// Writes are idempotent upserts: setting an existing key replaces its value
/// in place and leaves every other line of the file untouched.
#[derive(Debug, Clone)]
pub struct AddressBook {
    path: PathBuf,
}

/// Key under which an artifact's address is stored for an environment.
///
/// The environment is the name the run was requested with, not the resolved
/// network, so an unrecognized environment keeps its own entries.
pub fn entry_key(environment: &str, logical_name: &str) -> String {
    format!(
        "{}_ADDRESS{}",
        logical_name.to_uppercase(),
        environment.to_uppercase()
    )
}

impl AddressBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the deployed address for `(environment, logical_name)`,
    /// overwriting any prior value for that key.
    ///
    /// The file is created on first write. The read-modify-write runs under
    /// an advisory exclusive lock; the lock is released when the handle
    /// drops.
    pub fn set(
        &self,
        environment: &str,
        logical_name: &str,
        address: &str,
    ) -> Result<(), StoreError> {
        let key = entry_key(environment, logical_name);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| self.unavailable(source))?;
        file.lock_exclusive()
            .map_err(|source| self.unavailable(source))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|source| self.unavailable(source))?;

        let patched = patch_entry(&contents, &key, address);

        file.seek(SeekFrom::Start(0))
            .map_err(|source| self.unavailable(source))?;
        file.set_len(0)
            .map_err(|source| self.unavailable(source))?;
        file.write_all(patched.as_bytes())
            .map_err(|source| self.unavailable(source))?;

        tracing::debug!(path = %self.path.display(), key, address, "Address recorded");
        Ok(())
    }

    /// Look up the persisted address for `(environment, logical_name)`.
    ///
    /// A missing file reads as an empty book.
    pub fn get(
        &self,
        environment: &str,
        logical_name: &str,
    ) -> Result<Option<String>, StoreError> {
        let key = entry_key(environment, logical_name);

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.unavailable(source)),
        };

        Ok(contents.lines().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().to_string())
        }))
    }

    fn unavailable(&self, source: io::Error) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

/// Replace the value of `key` in env-file `contents`, appending the entry if
/// the key is not present yet. Unrelated lines pass through verbatim.
fn patch_entry(contents: &str, key: &str, value: &str) -> String {
    let mut replaced = false;
    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| match line.split_once('=') {
            Some((k, _)) if k.trim() == key => {
                replaced = true;
                format!("{key}={value}")
            }
            _ => line.to_string(),
        })
        .collect();

    if !replaced {
        lines.push(format!("{key}={value}"));
    }

    let mut patched = lines.join("\n");
    patched.push('\n');
    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn book_in(dir: &TempDir) -> AddressBook {
        AddressBook::new(dir.path().join(".addresses.env"))
    }

    #[test]
    fn entry_keys_are_uppercased() {
        assert_eq!(
            entry_key("rinkeby", "ballot_token"),
            "BALLOT_TOKEN_ADDRESSRINKEBY"
        );
        assert_eq!(entry_key("Development", "ballot_box"), "BALLOT_BOX_ADDRESSDEVELOPMENT");
    }

    #[test]
    fn get_on_missing_file_is_empty() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        let book = book_in(&dir);
        assert_eq!(book.get("rinkeby", "ballot_token").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        let book = book_in(&dir);
        book.set("rinkeby", "ballot_token", "0xABC").unwrap();
        assert_eq!(
            book.get("rinkeby", "ballot_token").unwrap().as_deref(),
            Some("0xABC")
        );
    }

    #[test]
    fn set_overwrites_prior_value_for_the_same_key() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        let book = book_in(&dir);
        book.set("rinkeby", "ballot_token", "0x111").unwrap();
        book.set("rinkeby", "ballot_token", "0x222").unwrap();
        book.set("rinkeby", "ballot_token", "0x333").unwrap();

        assert_eq!(
            book.get("rinkeby", "ballot_token").unwrap().as_deref(),
            Some("0x333")
        );
        // A single line per key, not an append log.
        let contents = std::fs::read_to_string(book.path()).unwrap();
        assert_eq!(
            contents
                .lines()
                .filter(|l| l.starts_with("BALLOT_TOKEN_ADDRESSRINKEBY="))
                .count(),
            1
        );
    }

    #[test]
    fn patching_one_key_preserves_unrelated_lines() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        let path = dir.path().join(".addresses.env");
        std::fs::write(
            &path,
            "# deployment addresses\nOTHER_TOOL_SETTING=keep-me\nBALLOT_TOKEN_ADDRESSRINKEBY=0xold\n",
        )
        .unwrap();

        let book = AddressBook::new(&path);
        book.set("rinkeby", "ballot_token", "0xnew").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "# deployment addresses\nOTHER_TOOL_SETTING=keep-me\nBALLOT_TOKEN_ADDRESSRINKEBY=0xnew\n"
        );
    }

    #[test]
    fn addresses_survive_reopening_the_book() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        let path = dir.path().join(".addresses.env");
        AddressBook::new(&path)
            .set("rinkeby", "ballot_token", "0xABC")
            .unwrap();
        AddressBook::new(&path)
            .set("mainnet", "ballot_token", "0xDEF")
            .unwrap();

        // Fresh handle, same file: simulates a process restart.
        let reopened = AddressBook::new(&path);
        assert_eq!(
            reopened.get("rinkeby", "ballot_token").unwrap().as_deref(),
            Some("0xABC")
        );
        assert_eq!(
            reopened.get("mainnet", "ballot_token").unwrap().as_deref(),
            Some("0xDEF")
        );
    }

    #[test]
    fn unwritable_medium_reports_unavailable() {
        let dir = TempDir::new("ballotbox-store").unwrap();
        // Use a regular file as a directory component to force an io error.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let book = AddressBook::new(blocker.join(".addresses.env"));

        let err = book.set("rinkeby", "ballot_token", "0xABC").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
