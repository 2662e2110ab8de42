//! The credential gate and its composition.
//!
//! Evaluating a gate either proceeds, carrying the validated artifact paths, or yields a
//! redirect to the issuer. Gates keep no state of their own; everything persistent lives in
//! the session and in the credential directory.

use std::path::PathBuf;

use crate::consts::*;
use crate::credential::{CredentialKind, ValidatedArtifacts, ValidityPredicate};
use crate::session::{correlation_token, PassphrasePolicy, SessionState};
use crate::store::CredentialStore;
use crate::url::{append_query, QueryParams};
use crate::Error;

/// What a gate needs to know about the incoming request.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    /// The authenticated user.
    pub username: &'a str,
    /// The absolute URL of the request, to return to after issuance.
    pub request_url: &'a str,
}

impl<'a> GateRequest<'a> {
    /// Create a gate request.
    pub fn new(username: &'a str, request_url: &'a str) -> Self {
        Self {
            username,
            request_url,
        }
    }
}

/// A redirect to the credential issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The gate that failed.
    pub kind: CredentialKind,
    /// The issuer URL including `key`, `store` and `next`.
    pub location: String,
    /// Name of the cookie that carries the passphrase.
    pub cookie_name: &'static str,
    /// The passphrase the issuer must protect the private key with.
    pub passphrase: String,
    /// The credential directory the issuer should write to.
    pub store: PathBuf,
}

/// The result of evaluating a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The credentials are present and fresh: invoke the wrapped handler.
    Proceed(ValidatedArtifacts),
    /// Send the browser to the issuer instead of invoking the handler.
    Redirect(Redirect),
}

impl Outcome {
    /// Short lowercase name, used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proceed(_) => "proceed",
            Self::Redirect(_) => "redirect",
        }
    }
}

/// A credential gate: one validity predicate and the issuer that can satisfy it.
#[derive(Debug)]
pub struct Gate {
    predicate: Box<dyn ValidityPredicate>,
    issuer_url: String,
    store: CredentialStore,
    passphrase: PassphrasePolicy,
}

impl Gate {
    /// Create a gate redirecting to `issuer_url` whenever `predicate` fails.
    pub fn new<P>(predicate: P, issuer_url: impl Into<String>, store: CredentialStore) -> Self
    where
        P: ValidityPredicate + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            issuer_url: issuer_url.into(),
            store,
            passphrase: PassphrasePolicy::default(),
        }
    }

    /// Choose how the private key passphrase is generated.
    pub fn with_passphrase_policy(mut self, policy: PassphrasePolicy) -> Self {
        self.passphrase = policy;
        self
    }

    /// The credential this gate demands.
    pub fn kind(&self) -> CredentialKind {
        self.predicate.kind()
    }

    /// The issuer base URL.
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Decide whether the request may proceed.
    ///
    /// The marker file is written on both paths, so the issuer can associate the directory
    /// with this session before the first redirect completes.
    pub fn evaluate<S>(&self, session: &mut S, req: &GateRequest<'_>) -> Result<Outcome, Error>
    where
        S: SessionState + ?Sized,
    {
        let token = correlation_token(session)?;
        let passphrase = self.passphrase.ensure(session)?;

        let dir = self.store.ensure_user_dir(req.username)?;
        self.store.write_marker(&dir, &token)?;

        if let Some(artifacts) = self.predicate.check(&dir)? {
            log::debug!(
                "{} gate: valid credentials for {} in {}",
                self.kind(),
                req.username,
                dir.display()
            );
            return Ok(Outcome::Proceed(artifacts));
        }

        let params = QueryParams::new()
            .with(PARAM_KEY, token)
            .with(PARAM_STORE, dir.to_string_lossy())
            .with(PARAM_NEXT, req.request_url);

        let location = append_query(&self.issuer_url, &params);

        log::info!(
            "{} gate: no fresh {} for {}, redirecting to issuer",
            self.kind(),
            self.kind().artifact(),
            req.username
        );

        Ok(Outcome::Redirect(Redirect {
            kind: self.kind(),
            location,
            cookie_name: PASSPHRASE_COOKIE,
            passphrase,
            store: dir,
        }))
    }
}

/// Gates evaluated in order; the first redirect wins.
///
/// Later gates only run once every earlier gate proceeded. A proxy gate placed after a
/// certificate gate is therefore never evaluated without a valid certificate, which the proxy
/// issuer needs.
#[derive(Debug, Default)]
pub struct GateChain {
    gates: Vec<Gate>,
}

impl GateChain {
    /// An empty chain, which always proceeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `gate` to the chain.
    pub fn then(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    /// The gates, in evaluation order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Evaluate the gates in order, merging the artifacts of all gates that proceed.
    pub fn evaluate<S>(&self, session: &mut S, req: &GateRequest<'_>) -> Result<Outcome, Error>
    where
        S: SessionState + ?Sized,
    {
        let mut artifacts = ValidatedArtifacts::default();

        for gate in &self.gates {
            match gate.evaluate(session, req)? {
                Outcome::Proceed(a) => artifacts.merge(a),
                redirect @ Outcome::Redirect(_) => return Ok(redirect),
            }
        }

        Ok(Outcome::Proceed(artifacts))
    }
}

impl From<Gate> for GateChain {
    fn from(gate: Gate) -> Self {
        Self::new().then(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::FreshArtifact;
    use crate::store::marker_path;
    use crate::test::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const NEXT: &str = "https://portal.example.org/cert-info";

    fn certificate_gate(root: &Path) -> Gate {
        Gate::new(
            FreshArtifact::certificate(DEFAULT_CERTIFICATE_MAX_AGE),
            SLCS_INIT_URL,
            CredentialStore::new(root).unwrap(),
        )
    }

    /// Counts how often it was consulted.
    #[derive(Debug, Default, Clone)]
    struct Counting(Arc<AtomicUsize>);

    impl ValidityPredicate for Counting {
        fn kind(&self) -> CredentialKind {
            CredentialKind::Proxy
        }

        fn check(&self, _dir: &Path) -> Result<Option<ValidatedArtifacts>, Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn test_fresh_certificate_proceeds() {
        let root = tempfile::tempdir().unwrap();
        write_artifact(&root.path().join("alice"), USERCERT_FILE, 9 * DAY);

        let mut session: HashMap<String, String> = HashMap::new();
        let out = certificate_gate(root.path())
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap();

        let dir = root.path().join("alice");
        assert_eq!(
            out,
            Outcome::Proceed(ValidatedArtifacts::for_kind(
                CredentialKind::Certificate,
                &dir
            ))
        );

        // The marker is also written when proceeding.
        let token = session.get(SESSION_TOKEN_KEY).unwrap();
        assert!(marker_path(&dir, token).exists());
    }

    #[test]
    fn test_stale_certificate_redirects() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("alice");
        write_artifact(&dir, USERCERT_FILE, 11 * DAY);

        let mut session: HashMap<String, String> = HashMap::new();
        let out = certificate_gate(root.path())
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap();

        let token = session.get(SESSION_TOKEN_KEY).unwrap().clone();
        let passphrase = session.get(SESSION_PASSPHRASE_KEY).unwrap().clone();

        let expected = append_query(
            SLCS_INIT_URL,
            &QueryParams::new()
                .with("key", token.as_str())
                .with("store", dir.to_string_lossy())
                .with("next", NEXT),
        );

        match out {
            Outcome::Redirect(r) => {
                assert_eq!(r.kind, CredentialKind::Certificate);
                assert_eq!(r.location, expected);
                assert!(r.location.starts_with(&format!("{SLCS_INIT_URL}?key={token}&store=")));
                assert!(r.location.ends_with("&next=https%3A%2F%2Fportal.example.org%2Fcert-info"));
                assert_eq!(r.cookie_name, PASSPHRASE_COOKIE);
                assert_eq!(r.passphrase, passphrase);
                assert_eq!(r.store, dir);
            }
            other => panic!("expected a redirect, got {other:?}"),
        }

        assert!(dir.join(format!("SESSION.{token}")).exists());
    }

    #[test]
    fn test_missing_directory_is_created() {
        let root = tempfile::tempdir().unwrap();

        let mut session: HashMap<String, String> = HashMap::new();
        let out = certificate_gate(root.path())
            .evaluate(&mut session, &GateRequest::new("carol", NEXT))
            .unwrap();

        assert!(matches!(out, Outcome::Redirect(_)));
        assert!(root.path().join("carol").is_dir());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let gate = certificate_gate(root.path());
        let req = GateRequest::new("alice", NEXT);
        let mut session: HashMap<String, String> = HashMap::new();

        let first = gate.evaluate(&mut session, &req).unwrap();
        let second = gate.evaluate(&mut session, &req).unwrap();
        assert_eq!(first, second);

        write_artifact(&root.path().join("alice"), USERCERT_FILE, HOUR);
        let first = gate.evaluate(&mut session, &req).unwrap();
        let second = gate.evaluate(&mut session, &req).unwrap();
        assert_eq!(first, second);
        assert!(matches!(first, Outcome::Proceed(_)));
    }

    #[test]
    fn test_filesystem_failure_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let gate = certificate_gate(&root.path().join("missing-root"));

        let mut session: HashMap<String, String> = HashMap::new();
        let res = gate.evaluate(&mut session, &GateRequest::new("alice", NEXT));

        assert!(matches!(res, Err(Error::Filesystem { .. })));
    }

    #[test]
    fn test_invalid_username_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let mut session: HashMap<String, String> = HashMap::new();

        let res = certificate_gate(root.path()).evaluate(&mut session, &GateRequest::new("..", NEXT));

        assert!(matches!(res, Err(Error::InvalidUsername(_))));
    }

    #[test]
    fn test_chain_stops_at_first_redirect() {
        let root = tempfile::tempdir().unwrap();
        let counting = Counting::default();

        let chain = GateChain::from(certificate_gate(root.path())).then(Gate::new(
            counting.clone(),
            PROXY_INIT_URL,
            CredentialStore::new(root.path()).unwrap(),
        ));

        let mut session: HashMap<String, String> = HashMap::new();
        let out = chain
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap();

        match out {
            Outcome::Redirect(r) => assert_eq!(r.kind, CredentialKind::Certificate),
            other => panic!("expected a redirect, got {other:?}"),
        }
        assert_eq!(counting.0.load(Ordering::SeqCst), 0);

        // With a valid certificate, the proxy gate is consulted.
        write_artifact(&root.path().join("alice"), USERCERT_FILE, HOUR);
        let out = chain
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap();

        match out {
            Outcome::Redirect(r) => {
                assert_eq!(r.kind, CredentialKind::Proxy);
                assert!(r.location.starts_with(PROXY_INIT_URL));
            }
            other => panic!("expected a redirect, got {other:?}"),
        }
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_chain_merges_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("alice");
        write_artifact(&dir, USERCERT_FILE, DAY);
        write_artifact(&dir, USERPROXY_FILE, HOUR);

        let chain = test_config(root.path()).gridproxy_required().unwrap();
        let mut session: HashMap<String, String> = HashMap::new();

        match chain
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap()
        {
            Outcome::Proceed(a) => {
                assert_eq!(a.user_cert(), Some(dir.join(USERCERT_FILE).as_path()));
                assert_eq!(a.user_key(), Some(dir.join(USERKEY_FILE).as_path()));
                assert_eq!(a.user_proxy(), Some(dir.join(USERPROXY_FILE).as_path()));
            }
            other => panic!("expected to proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_chain_proceeds() {
        let mut session: HashMap<String, String> = HashMap::new();
        let out = GateChain::new()
            .evaluate(&mut session, &GateRequest::new("alice", NEXT))
            .unwrap();

        assert_eq!(out, Outcome::Proceed(ValidatedArtifacts::default()));
    }
}
