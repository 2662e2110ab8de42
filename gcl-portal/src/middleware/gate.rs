//! Credential gate middleware.
//!
//! Wraps a view so that it only runs once the authenticated user owns fresh credentials. The
//! validated artifact paths are handed to the view through the request extensions.

use actix_session::SessionExt;
use actix_web::{
    cookie::Cookie,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};

use futures::future::{ready, Ready};
use futures::FutureExt;
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use gcl_core::gate::{GateChain, GateRequest, Outcome};

use crate::middleware::login::AuthenticatedUser;
use crate::server::GATE_OUTCOMES;
use crate::util::{request_url, PortalSession};

#[doc(hidden)]
pub struct CredentialRequiredService<S> {
    service: Rc<S>,
    chain: Arc<GateChain>,
}

/// The credential a chain ultimately demands, for metrics.
fn requirement(chain: &GateChain) -> &'static str {
    chain
        .gates()
        .last()
        .map(|g| g.kind().as_str())
        .unwrap_or("none")
}

fn record(gate: &str, outcome: &str) {
    GATE_OUTCOMES.with_label_values(&[gate, outcome]).inc();
}

impl<S> Service<ServiceRequest> for CredentialRequiredService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let chain = self.chain.clone();

        async move {
            let user = req
                .extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(crate::Error::Unauthenticated)?;

            let url = request_url(&req);
            let mut session = PortalSession(req.get_session());

            let outcome = chain
                .evaluate(&mut session, &GateRequest::new(&user.username, &url))
                .map_err(|e| {
                    log::error!("credential gate failed for {}: {e}", user.username);
                    record(requirement(&chain), "error");
                    crate::Error::Core(e)
                })?;

            match outcome {
                Outcome::Proceed(artifacts) => {
                    record(requirement(&chain), "proceed");
                    req.extensions_mut().insert(artifacts);

                    srv.call(req).await
                }
                Outcome::Redirect(redirect) => {
                    record(redirect.kind.as_str(), "redirect");

                    let cookie = Cookie::build(redirect.cookie_name, redirect.passphrase)
                        .path("/")
                        .finish();

                    let res = HttpResponse::Found()
                        .insert_header((header::LOCATION, redirect.location))
                        .cookie(cookie)
                        .finish();

                    Ok(req.into_response(res))
                }
            }
        }
        .boxed_local()
    }
}

/// Credential gate middleware.
///
/// Requires [`AuthenticatedUser`] in the request extensions, so it must be wrapped by the
/// [`LoginRequired`](crate::middleware::login::LoginRequired) middleware.
#[derive(Debug, Clone)]
pub struct CredentialRequired {
    chain: Arc<GateChain>,
}

impl CredentialRequired {
    pub fn new(chain: Arc<GateChain>) -> Self {
        Self { chain }
    }
}

impl<S> Transform<S, ServiceRequest> for CredentialRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type Transform = CredentialRequiredService<S>;
    type InitError = ();

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CredentialRequiredService {
            service: Rc::new(service),
            chain: self.chain.clone(),
        }))
    }
}
