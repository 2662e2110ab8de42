//! Credential freshness by modification time.
//!
//! Artifacts are not parsed. All certificates (resp. proxies) are issued with the same
//! lifetime, so a file that was written recently enough is assumed to still be valid.

use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::Error;

/// Returns whether the file at `path` exists and was modified less than `max_age` ago.
///
/// A missing file is reported as `Ok(false)`. Any other IO failure is returned as an error and
/// must not be taken as "not fresh".
pub fn is_fresh(path: impl AsRef<Path>, max_age: Duration) -> Result<bool, Error> {
    is_fresh_at(path, max_age, SystemTime::now())
}

/// Like [`is_fresh`], with an explicit check time.
pub fn is_fresh_at(
    path: impl AsRef<Path>,
    max_age: Duration,
    now: SystemTime,
) -> Result<bool, Error> {
    match age_at(path, now)? {
        Some(age) => Ok(age < max_age),
        None => Ok(false),
    }
}

/// Returns the age of the file at `path`, or `None` when it does not exist.
///
/// A modification time in the future counts as age zero.
pub fn age_at(path: impl AsRef<Path>, now: SystemTime) -> Result<Option<Duration>, Error> {
    let path = path.as_ref();

    let mtime = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::fs(path, e)),
    };

    Ok(Some(now.duration_since(mtime).unwrap_or(Duration::ZERO)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{backdate, DAY, HOUR};
    use std::fs::File;

    #[test]
    fn test_missing_file_is_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usercert.pem");

        assert!(!is_fresh(&path, 10 * DAY).unwrap());
        assert!(age_at(&path, SystemTime::now()).unwrap().is_none());
    }

    #[test]
    fn test_recent_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usercert.pem");
        File::create(&path).unwrap();

        assert!(is_fresh(&path, 10 * DAY).unwrap());
    }

    #[test]
    fn test_age_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("userproxy.pem");
        File::create(&path).unwrap();
        let mtime = backdate(&path, 9 * DAY);

        assert!(is_fresh_at(&path, 10 * DAY, mtime + 9 * DAY).unwrap());
        assert!(!is_fresh_at(&path, 9 * DAY, mtime + 9 * DAY).unwrap());
        assert!(!is_fresh_at(&path, 10 * DAY, mtime + 11 * DAY).unwrap());
        assert!(is_fresh_at(&path, 11 * HOUR, mtime + 10 * HOUR).unwrap());
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usercert.pem");
        File::create(&path).unwrap();
        let mtime = backdate(&path, Duration::ZERO);

        assert_eq!(
            age_at(&path, mtime - HOUR).unwrap(),
            Some(Duration::ZERO)
        );
        assert!(is_fresh_at(&path, HOUR, mtime - HOUR).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_io_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("somefile");
        File::create(&file).unwrap();

        // Looking up a path below a regular file fails, but not with NotFound.
        let res = is_fresh(file.join("usercert.pem"), DAY);
        assert!(matches!(res, Err(Error::Filesystem { .. })));
    }
}
