//! # GridCertLib core library
#![deny(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links
)]
//! Credential gating for Grid portals.
//!
//! Before a protected view runs, the requesting user must own a recently issued X.509
//! certificate and/or Grid proxy in a per-user credential directory. When the credential is
//! missing or stale, the browser is sent to an external issuer (the GridCertLib `SlcsInit` and
//! `VomsProxyInit` servlets) which writes the artifacts to disk and redirects back. The next
//! request re-runs the gate and proceeds.
//!
//! The library is independent of any web framework. A host provides:
//!
//! * a session mapping, through the [`session::SessionState`] trait,
//! * the authenticated username and absolute request URL, through a [`gate::GateRequest`],
//! * the HTTP redirect and cookie primitives, fed from a [`gate::Redirect`].
//!
//! ## Gates and chains
//!
//! A [`gate::Gate`] pairs a [`credential::ValidityPredicate`] with the issuer URL that can
//! produce the credential. A [`gate::GateChain`] evaluates gates in order and stops at the
//! first redirect, so that a proxy is only requested once a valid certificate exists.
//!
//! ```
//! use std::collections::HashMap;
//! use gcl_core::config::GridCertConfig;
//! use gcl_core::gate::{GateRequest, Outcome};
//!
//! let root = tempfile::tempdir().unwrap();
//!
//! let config = GridCertConfig {
//!     credential_root: Some(root.path().to_path_buf()),
//!     certificate_issuer_url: Some("https://portal.example.org/gridcertlib/slcs-init".into()),
//!     proxy_issuer_url: Some("https://portal.example.org/gridcertlib/voms-proxy-init".into()),
//!     ..Default::default()
//! };
//!
//! let chain = config.gridproxy_required().unwrap();
//! let mut session: HashMap<String, String> = HashMap::new();
//!
//! let req = GateRequest::new("alice", "https://portal.example.org/proxy-info");
//! match chain.evaluate(&mut session, &req).unwrap() {
//!     Outcome::Redirect(r) => assert!(r.location.contains("slcs-init?key=")),
//!     Outcome::Proceed(_) => unreachable!("no certificate was issued yet"),
//! }
//! ```

pub mod config;
pub mod consts;
pub mod credential;
pub mod error;
pub mod freshness;
pub mod gate;
pub mod session;
pub mod store;
pub mod url;


pub use error::Error;
