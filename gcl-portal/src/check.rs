use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use gcl_core::credential::CredentialKind;
use gcl_core::freshness::age_at;

use crate::{opts::*, PortalError};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ArtifactStatus {
    Missing,
    Fresh(Duration),
    Stale(Duration),
}

type Report = Vec<(CredentialKind, PathBuf, ArtifactStatus)>;

pub(crate) fn report(check_opts: &CheckOpts) -> Result<Report, PortalError> {
    let CheckOpts { user, gate } = check_opts;

    let config = gate.gridcert_config();
    let dir = config.store()?.user_dir(user)?;
    let now = SystemTime::now();

    [
        (CredentialKind::Certificate, config.certificate_max_age),
        (CredentialKind::Proxy, config.proxy_max_age),
    ]
    .into_iter()
    .map(|(kind, max_age)| -> Result<_, PortalError> {
        let path = dir.join(kind.artifact());

        let status = match age_at(&path, now)? {
            None => ArtifactStatus::Missing,
            Some(age) if age < Duration::from_secs(max_age) => ArtifactStatus::Fresh(age),
            Some(age) => ArtifactStatus::Stale(age),
        };

        Ok((kind, path, status))
    })
    .collect()
}

pub fn exec(check_opts: &CheckOpts) -> Result<(), PortalError> {
    for (kind, path, status) in report(check_opts)? {
        match status {
            ArtifactStatus::Missing => println!("{kind}: {} is missing", path.display()),
            ArtifactStatus::Fresh(age) => {
                println!("{kind}: {} is fresh ({}s old)", path.display(), age.as_secs())
            }
            ArtifactStatus::Stale(age) => {
                println!("{kind}: {} is stale ({}s old)", path.display(), age.as_secs())
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs::File;

    #[test]
    fn test_report() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("alice");
        std::fs::create_dir(&dir).unwrap();

        let cert = File::create(dir.join("usercert.pem")).unwrap();
        cert.set_modified(SystemTime::now() - Duration::from_secs(12 * 24 * 3600))
            .unwrap();

        let opts = CheckOpts::parse_from([
            "check",
            "--user",
            "alice",
            "--credential-root",
            root.path().to_str().unwrap(),
        ]);

        let report = report(&opts).unwrap();
        assert_eq!(report.len(), 2);

        assert_eq!(report[0].0, CredentialKind::Certificate);
        assert!(matches!(report[0].2, ArtifactStatus::Stale(_)));
        assert_eq!(report[1].0, CredentialKind::Proxy);
        assert_eq!(report[1].1, dir.join("userproxy.pem"));
        assert_eq!(report[1].2, ArtifactStatus::Missing);
    }

    #[test]
    fn test_report_with_relative_root() {
        let opts = CheckOpts::parse_from(["check", "--user", "alice", "--credential-root", "creds"]);

        let report = report(&opts).unwrap();
        let dir = std::env::current_dir().unwrap().join("creds").join("alice");

        assert_eq!(report[0].1, dir.join("usercert.pem"));
        assert_eq!(report[0].2, ArtifactStatus::Missing);
    }

    #[test]
    fn test_report_without_root() {
        let opts = CheckOpts {
            user: "alice".to_string(),
            gate: GateOpts {
                credential_root: None,
                certificate_max_age: 864000,
                proxy_max_age: 39600,
            },
        };

        assert!(matches!(
            report(&opts),
            Err(PortalError::Core(gcl_core::Error::ConfigurationMissing(_)))
        ));
    }
}
