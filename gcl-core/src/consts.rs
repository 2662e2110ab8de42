//! Constants shared with the external GridCertLib issuer.
//!
//! File names, the marker prefix and the cookie name form a side-channel protocol with the
//! issuer servlets and must not change.

use std::time::Duration;

/// File name of the user certificate inside a credential directory.
pub const USERCERT_FILE: &str = "usercert.pem";

/// File name of the private key belonging to the user certificate.
pub const USERKEY_FILE: &str = "userkey.pem";

/// File name of the Grid proxy inside a credential directory.
pub const USERPROXY_FILE: &str = "userproxy.pem";

/// Prefix of the empty marker file announcing a session to the issuer.
///
/// The full file name is `SESSION.<correlation token>`.
pub const MARKER_PREFIX: &str = "SESSION.";

/// Environment variable naming the validated user certificate.
pub const X509_USER_CERT: &str = "X509_USER_CERT";

/// Environment variable naming the private key of the validated user certificate.
pub const X509_USER_KEY: &str = "X509_USER_KEY";

/// Environment variable naming the validated Grid proxy.
pub const X509_USER_PROXY: &str = "X509_USER_PROXY";

/// Session key holding the correlation token.
pub const SESSION_TOKEN_KEY: &str = "GridCertLib.sessionId";

/// Session key holding the private key passphrase.
pub const SESSION_PASSPHRASE_KEY: &str = "GridCertLib.privateKeyPassword";

/// Cookie carrying the private key passphrase to the issuer.
pub const PASSPHRASE_COOKIE: &str = "GridCertLib.privateKeyPassword";

/// Query parameter carrying the correlation token.
pub const PARAM_KEY: &str = "key";

/// Query parameter carrying the credential directory.
pub const PARAM_STORE: &str = "store";

/// Query parameter carrying the URL to return to after issuance.
pub const PARAM_NEXT: &str = "next";

/// Query parameter carrying a virtual organization for the proxy issuer.
pub const PARAM_VO: &str = "vo";

/// Number of random bits in a correlation token.
pub const TOKEN_BITS: usize = 128;

/// Default length of a generated private key passphrase.
pub const PASSPHRASE_LENGTH: usize = 32;

/// Certificates are issued for 11 days; accept them for 10.
pub const DEFAULT_CERTIFICATE_MAX_AGE: Duration = Duration::from_secs(10 * 24 * 60 * 60);

/// Proxies are issued for 12 hours; accept them for 11.
pub const DEFAULT_PROXY_MAX_AGE: Duration = Duration::from_secs(11 * 60 * 60);

/// Virtual organization requested from the proxy issuer when none is configured.
pub const DEFAULT_VO: &str = "smscg";
