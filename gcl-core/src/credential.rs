//! Credential kinds and their validity predicates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::freshness::is_fresh;
use crate::Error;

/// The kind of credential a gate demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// A short-lived X.509 certificate (SLCS) with its private key.
    Certificate,
    /// A Grid (VOMS) proxy derived from the certificate.
    Proxy,
}

impl CredentialKind {
    /// Short lowercase name, used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Proxy => "proxy",
        }
    }

    /// The artifact whose modification time decides freshness.
    pub fn artifact(&self) -> &'static str {
        match self {
            Self::Certificate => USERCERT_FILE,
            Self::Proxy => USERPROXY_FILE,
        }
    }

    /// Default maximum age of the artifact.
    pub fn default_max_age(&self) -> Duration {
        match self {
            Self::Certificate => DEFAULT_CERTIFICATE_MAX_AGE,
            Self::Proxy => DEFAULT_PROXY_MAX_AGE,
        }
    }

    /// The artifacts downstream code may use once this credential is valid, as pairs of
    /// environment variable name and file name.
    pub fn exports(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Certificate => &[(X509_USER_CERT, USERCERT_FILE), (X509_USER_KEY, USERKEY_FILE)],
            Self::Proxy => &[(X509_USER_PROXY, USERPROXY_FILE)],
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths of validated artifacts, keyed by the environment variable downstream tools expect.
///
/// These are scoped to a single request: hosts put them in request-local storage and pass
/// them to child processes explicitly, never through the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedArtifacts {
    entries: Vec<(&'static str, PathBuf)>,
}

impl ValidatedArtifacts {
    /// Record the artifacts exported by `kind` inside `dir`.
    pub fn for_kind(kind: CredentialKind, dir: &Path) -> Self {
        Self {
            entries: kind
                .exports()
                .iter()
                .map(|(var, file)| (*var, dir.join(file)))
                .collect(),
        }
    }

    /// Look up the path exported as `var`.
    pub fn get(&self, var: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, p)| p.as_path())
    }

    /// The validated user certificate, if any.
    pub fn user_cert(&self) -> Option<&Path> {
        self.get(X509_USER_CERT)
    }

    /// The private key of the validated user certificate, if any.
    pub fn user_key(&self) -> Option<&Path> {
        self.get(X509_USER_KEY)
    }

    /// The validated Grid proxy, if any.
    pub fn user_proxy(&self) -> Option<&Path> {
        self.get(X509_USER_PROXY)
    }

    /// Merge `other` into `self`; later entries replace earlier ones with the same name.
    pub fn merge(&mut self, other: ValidatedArtifacts) {
        for (var, path) in other.entries {
            match self.entries.iter_mut().find(|(v, _)| *v == var) {
                Some(entry) => entry.1 = path,
                None => self.entries.push((var, path)),
            }
        }
    }

    /// Iterate over `(variable, path)` pairs, e.g. to feed `Command::envs`.
    pub fn env_vars(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        self.entries.iter().map(|(v, p)| (*v, p.as_path()))
    }

    /// Returns `true` if nothing was validated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decides whether the credentials in a user's directory are usable.
pub trait ValidityPredicate: std::fmt::Debug + Send + Sync {
    /// The credential this predicate checks.
    fn kind(&self) -> CredentialKind;

    /// Returns the validated artifacts, or `None` when the credential must be (re)issued.
    fn check(&self, dir: &Path) -> Result<Option<ValidatedArtifacts>, Error>;
}

/// Freshness of a single artifact by modification time.
///
/// All certificates (resp. proxies) are issued with the same lifetime, so a recently written
/// artifact is assumed valid. No cryptographic verification takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshArtifact {
    kind: CredentialKind,
    max_age: Duration,
}

impl FreshArtifact {
    /// Check `kind` against a custom maximum age.
    pub fn new(kind: CredentialKind, max_age: Duration) -> Self {
        Self { kind, max_age }
    }

    /// The user certificate must be younger than `max_age`.
    pub fn certificate(max_age: Duration) -> Self {
        Self::new(CredentialKind::Certificate, max_age)
    }

    /// The Grid proxy must be younger than `max_age`.
    pub fn proxy(max_age: Duration) -> Self {
        Self::new(CredentialKind::Proxy, max_age)
    }

    /// The configured maximum age.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl ValidityPredicate for FreshArtifact {
    fn kind(&self) -> CredentialKind {
        self.kind
    }

    fn check(&self, dir: &Path) -> Result<Option<ValidatedArtifacts>, Error> {
        let artifact = dir.join(self.kind.artifact());

        if is_fresh(&artifact, self.max_age)? {
            Ok(Some(ValidatedArtifacts::for_kind(self.kind, dir)))
        } else {
            Ok(None)
        }
    }
}
