//! Per-user credential directories and the marker file side channel.

use std::fs::{DirBuilder, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

use crate::consts::MARKER_PREFIX;
use crate::Error;

/// The root under which every user owns a credential directory `<root>/<username>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    /// Create a store rooted at `root`. The root itself is never created.
    ///
    /// A relative root is resolved against the current directory, since the issuer receives
    /// the directory paths and does not share our working directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let root = std::path::absolute(&root).map_err(|e| Error::fs(root, e))?;

        Ok(Self { root })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The credential directory of `username`, without touching the filesystem.
    pub fn user_dir(&self, username: &str) -> Result<PathBuf, Error> {
        validate_username(username)?;
        Ok(self.root.join(username))
    }

    /// Returns the credential directory of `username`, creating it if needed.
    ///
    /// Concurrent first requests for the same user may race here; losing the race is fine.
    pub fn ensure_user_dir(&self, username: &str) -> Result<PathBuf, Error> {
        let dir = self.user_dir(username)?;

        let mut builder = DirBuilder::new();

        #[cfg(unix)]
        builder.mode(0o700);

        match builder.create(&dir) {
            Ok(()) => {
                log::debug!("created credential directory {}", dir.display());
                Ok(dir)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(dir),
            Err(e) => Err(Error::fs(dir, e)),
        }
    }

    /// Write the empty marker file `SESSION.<token>` into `dir`, truncating an existing one.
    pub fn write_marker(&self, dir: &Path, token: &str) -> Result<PathBuf, Error> {
        let marker = marker_path(dir, token);

        File::create(&marker).map_err(|e| Error::fs(&marker, e))?;

        Ok(marker)
    }
}

/// Path of the marker file for `token` inside `dir`.
pub fn marker_path(dir: &Path, token: &str) -> PathBuf {
    dir.join(format!("{MARKER_PREFIX}{token}"))
}

/// Usernames become a single path component below the credential root.
fn validate_username(username: &str) -> Result<(), Error> {
    let invalid = username.is_empty()
        || username == "."
        || username == ".."
        || username.contains(['/', '\\', '\0']);

    if invalid {
        return Err(Error::InvalidUsername(username.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dir_is_created_once() {
        let root = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(root.path()).unwrap();

        let d1 = store.ensure_user_dir("alice").unwrap();
        let d2 = store.ensure_user_dir("alice").unwrap();

        assert_eq!(d1, root.path().join("alice"));
        assert_eq!(d1, d2);
        assert!(d1.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_user_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let dir = CredentialStore::new(root.path())
            .unwrap()
            .ensure_user_dir("alice")
            .unwrap();

        let mode = std::fs::metadata(dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(root.path().join("does-not-exist")).unwrap();

        assert!(matches!(
            store.ensure_user_dir("alice"),
            Err(Error::Filesystem { .. })
        ));
    }

    #[test]
    fn test_file_in_place_of_dir_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        File::create(root.path().join("alice")).unwrap();

        let store = CredentialStore::new(root.path()).unwrap();
        assert!(store.ensure_user_dir("alice").is_err());
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let store = CredentialStore::new("creds").unwrap();

        assert!(store.root().is_absolute());
        assert_eq!(store.root(), std::env::current_dir().unwrap().join("creds"));

        let dir = store.user_dir("alice").unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("creds/alice"));
    }

    #[test]
    fn test_invalid_usernames() {
        let store = CredentialStore::new("/srv/gridcertlib").unwrap();

        for name in ["", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(
                matches!(store.user_dir(name), Err(Error::InvalidUsername(_))),
                "{name:?} should be rejected"
            );
        }

        assert!(store.user_dir("alice.smith@example.org").is_ok());
    }

    #[test]
    fn test_marker_is_written_and_overwritten() {
        let root = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(root.path()).unwrap();
        let dir = store.ensure_user_dir("bob").unwrap();

        let marker = store.write_marker(&dir, "0123abcd").unwrap();
        assert_eq!(marker, dir.join("SESSION.0123abcd"));
        assert_eq!(std::fs::metadata(&marker).unwrap().len(), 0);

        std::fs::write(&marker, b"junk").unwrap();
        store.write_marker(&dir, "0123abcd").unwrap();
        assert_eq!(std::fs::metadata(&marker).unwrap().len(), 0);
    }
}
