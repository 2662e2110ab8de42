//! Portal middleware module.
//!
//! # Login
//!
//! The login middleware only checks that the front end authenticated the user and makes the
//! username available to the services it wraps. Unauthenticated requests are redirected to the
//! login page.
//!
//! # Credential gates
//!
//! The credential gate middleware wraps a view and demands a fresh certificate and/or Grid
//! proxy for the authenticated user, redirecting to the GridCertLib issuer otherwise. It must
//! be wrapped by the login middleware.
//!
//! # Metrics
//!
//! The metrics middleware collects Prometheus metrics.

pub mod gate;
pub mod login;
pub mod metrics;
