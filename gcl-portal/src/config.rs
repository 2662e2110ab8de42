use actix_web::cookie::Key;
use base64::{engine::general_purpose::STANDARD, Engine};

use gcl_core::config::GridCertConfig;
use gcl_core::gate::GateChain;
use gcl_core::session::PassphrasePolicy;

use crate::opts::{GateOpts, ServerOpts};
use crate::PortalError;

/// Settings of the authentication front end.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Where unauthenticated users are sent.
    pub login_url: String,

    /// Query parameter carrying the return URL.
    pub redirect_field_name: String,

    /// Header carrying the authenticated username.
    pub user_header: String,
}

/// Everything the server needs, validated before it binds.
pub struct PortalConfig {
    pub gridcert: GridCertConfig,
    pub login: LoginConfig,
    pub session_key: Key,
    pub secure_session_cookie: bool,
    pub x509_tool: String,
}

impl GateOpts {
    pub(crate) fn gridcert_config(&self) -> GridCertConfig {
        GridCertConfig {
            credential_root: self.credential_root.as_ref().map(Into::into),
            certificate_max_age: self.certificate_max_age,
            proxy_max_age: self.proxy_max_age,
            ..Default::default()
        }
    }
}

impl PortalConfig {
    pub fn from_opts(opts: &ServerOpts) -> Result<PortalConfig, PortalError> {
        let mut gridcert = opts.gate.gridcert_config();
        gridcert.certificate_issuer_url = opts.slcs_init_url.clone();
        gridcert.proxy_issuer_url = opts.proxy_init_url.clone();
        gridcert.virtual_organizations = opts.vo.clone();

        if let Some(p) = &opts.fixed_passphrase {
            log::warn!("using a fixed private key passphrase for all sessions");
            gridcert.passphrase = PassphrasePolicy::Fixed(p.clone());
        }

        // Refuse to start rather than failing on the first gated request.
        gridcert.gridproxy_required()?;

        let session_key = match &opts.session_key {
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| PortalError::Setup(format!("session key is not base64: {e}")))?;

                Key::try_from(bytes.as_slice()).map_err(|e| {
                    PortalError::Setup(format!("session key must be at least 64 bytes: {e}"))
                })?
            }
            None => {
                log::warn!("no session key given, sessions will not survive a restart");
                Key::generate()
            }
        };

        Ok(PortalConfig {
            gridcert,
            login: LoginConfig {
                login_url: opts.login_url.clone(),
                redirect_field_name: opts.redirect_field_name.clone(),
                user_header: opts.user_header.clone(),
            },
            session_key,
            secure_session_cookie: !opts.insecure_session_cookie,
            x509_tool: opts.x509_tool.clone(),
        })
    }

    pub fn certificate_required(&self) -> Result<GateChain, PortalError> {
        Ok(self.gridcert.certificate_required()?)
    }

    pub fn gridproxy_required(&self) -> Result<GateChain, PortalError> {
        Ok(self.gridcert.gridproxy_required()?)
    }
}
