//! Gate configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::credential::FreshArtifact;
use crate::gate::{Gate, GateChain};
use crate::session::PassphrasePolicy;
use crate::store::CredentialStore;
use crate::url::{append_query, QueryParams};
use crate::Error;

/// Settings shared by the certificate and proxy gates.
///
/// Required values are optional here so that a partially configured host fails with
/// [`Error::ConfigurationMissing`] when a gate is built, not with a panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridCertConfig {
    /// Root under which the per-user credential directories live.
    pub credential_root: Option<PathBuf>,

    /// Base URL of the certificate issuer (`SlcsInit`).
    pub certificate_issuer_url: Option<String>,

    /// Base URL of the proxy issuer (`VomsProxyInit`).
    pub proxy_issuer_url: Option<String>,

    /// Virtual organizations to request a proxy for, appended as repeated `vo` parameters.
    pub virtual_organizations: Vec<String>,

    /// Maximum age of `usercert.pem`, in seconds.
    pub certificate_max_age: u64,

    /// Maximum age of `userproxy.pem`, in seconds.
    pub proxy_max_age: u64,

    /// How private key passphrases are chosen.
    pub passphrase: PassphrasePolicy,
}

impl Default for GridCertConfig {
    fn default() -> Self {
        Self {
            credential_root: None,
            certificate_issuer_url: None,
            proxy_issuer_url: None,
            virtual_organizations: vec![DEFAULT_VO.to_string()],
            certificate_max_age: DEFAULT_CERTIFICATE_MAX_AGE.as_secs(),
            proxy_max_age: DEFAULT_PROXY_MAX_AGE.as_secs(),
            passphrase: PassphrasePolicy::default(),
        }
    }
}

impl GridCertConfig {
    /// The credential store.
    pub fn store(&self) -> Result<CredentialStore, Error> {
        let root = self
            .credential_root
            .as_ref()
            .ok_or(Error::ConfigurationMissing("credential root directory"))?;

        CredentialStore::new(root)
    }

    /// The gate demanding a fresh user certificate.
    pub fn certificate_gate(&self) -> Result<Gate, Error> {
        let url = self
            .certificate_issuer_url
            .as_ref()
            .ok_or(Error::ConfigurationMissing("certificate issuer URL"))?;

        Ok(Gate::new(
            FreshArtifact::certificate(Duration::from_secs(self.certificate_max_age)),
            url.clone(),
            self.store()?,
        )
        .with_passphrase_policy(self.passphrase.clone()))
    }

    /// The gate demanding a fresh Grid proxy.
    pub fn proxy_gate(&self) -> Result<Gate, Error> {
        let url = self
            .proxy_issuer_url
            .as_ref()
            .ok_or(Error::ConfigurationMissing("proxy issuer URL"))?;

        let mut params = QueryParams::new();
        params.extend_values(PARAM_VO, self.virtual_organizations.iter().cloned());

        Ok(Gate::new(
            FreshArtifact::proxy(Duration::from_secs(self.proxy_max_age)),
            append_query(url, &params),
            self.store()?,
        )
        .with_passphrase_policy(self.passphrase.clone()))
    }

    /// Gates for views that need a user certificate.
    pub fn certificate_required(&self) -> Result<GateChain, Error> {
        Ok(GateChain::from(self.certificate_gate()?))
    }

    /// Gates for views that need a Grid proxy: the certificate first, then the proxy.
    pub fn gridproxy_required(&self) -> Result<GateChain, Error> {
        Ok(self.certificate_required()?.then(self.proxy_gate()?))
    }
}
