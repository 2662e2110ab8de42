//! Authentication-required middleware.
//!
//! Authentication itself happens in front of the portal (e.g. Shibboleth), which passes the
//! username in a trusted header. The front end must strip that header from client requests.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};

use futures::future::{ready, Ready};
use futures::FutureExt;
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;

use gcl_core::url::{append_query, QueryParams};

use crate::config::LoginConfig;
use crate::util::request_path;

/// The user the front end authenticated, available in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

#[doc(hidden)]
pub struct LoginRequiredService<S> {
    service: Rc<S>,
    config: Rc<LoginConfig>,
}

impl<S> Service<ServiceRequest> for LoginRequiredService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let config = self.config.clone();

        async move {
            let username = req
                .headers()
                .get(config.user_header.as_str())
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string);

            let Some(username) = username else {
                let params =
                    QueryParams::new().with(config.redirect_field_name.as_str(), request_path(&req));
                let location = append_query(&config.login_url, &params);

                log::debug!("unauthenticated request, redirecting to {location}");

                let res = HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish();

                return Ok(req.into_response(res));
            };

            req.extensions_mut().insert(AuthenticatedUser { username });

            srv.call(req).await
        }
        .boxed_local()
    }
}

/// Authentication-required middleware.
///
/// Requests without an authenticated user are redirected to the login page, with the original
/// path in the configured redirect field.
#[derive(Debug, Clone)]
pub struct LoginRequired {
    config: Rc<LoginConfig>,
}

impl LoginRequired {
    pub fn new(config: LoginConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }
}

impl<S> Transform<S, ServiceRequest> for LoginRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type Transform = LoginRequiredService<S>;
    type InitError = ();

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRequiredService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}
