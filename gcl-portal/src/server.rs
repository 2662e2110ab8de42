use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    middleware::Logger,
    web,
    web::{resource, scope, Data, ServiceConfig},
    App, HttpServer,
};
use std::sync::Arc;

use crate::config::{LoginConfig, PortalConfig};
use crate::middleware::gate::CredentialRequired;
use crate::middleware::login::LoginRequired;
use crate::middleware::metrics::collect_metrics;
use crate::opts::*;
use crate::util::*;
use crate::{handlers, PortalError};

use gcl_core::gate::GateChain;

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    pub(crate) static ref GATE_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "gridcert_gate_outcomes",
        "Decisions of the credential gates.",
        &["gate", "outcome"]
    )
    .expect("could not initialize metrics");
    pub(crate) static ref PORTAL_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "gridcert_requests",
        "Requests handled by the portal views.",
        &["path", "status"]
    )
    .expect("could not initialize metrics");
}

/// Name of the cookie holding the session.
pub(crate) const SESSION_COOKIE: &str = "gridcertlib_session";

/// The gate chains wrapping the views.
#[derive(Debug, Clone)]
pub(crate) struct Gates {
    pub certificate: Arc<GateChain>,
    pub gridproxy: Arc<GateChain>,
}

/// Register the portal views.
pub(crate) fn routes(cfg: &mut ServiceConfig, gates: &Gates, login: &LoginConfig, tool: &X509Tool) {
    cfg.service(resource("/metrics").route(web::get().to(handlers::metrics)))
        .service(resource("/health").route(web::get().to(handlers::health)))
        .service(
            scope("")
                .wrap_fn(collect_metrics)
                .service(
                    resource("/")
                        .wrap(LoginRequired::new(login.clone()))
                        .route(web::get().to(handlers::welcome)),
                )
                .service(
                    resource("/cert-info")
                        .app_data(Data::new(tool.clone()))
                        .wrap(CredentialRequired::new(gates.certificate.clone()))
                        .wrap(LoginRequired::new(login.clone()))
                        .route(web::get().to(handlers::cert_info)),
                )
                .service(
                    resource("/proxy-info")
                        .app_data(Data::new(tool.clone()))
                        .wrap(CredentialRequired::new(gates.gridproxy.clone()))
                        .wrap(LoginRequired::new(login.clone()))
                        .route(web::get().to(handlers::proxy_info)),
                ),
        );
}

#[actix_rt::main]
pub async fn exec(server_opts: ServerOpts) -> Result<(), PortalError> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = PortalConfig::from_opts(&server_opts)?;

    let gates = Gates {
        certificate: Arc::new(config.certificate_required()?),
        gridproxy: Arc::new(config.gridproxy_required()?),
    };

    log::info!(
        "serving credentials from {}",
        config.gridcert.store()?.root().display()
    );

    let PortalConfig {
        login,
        session_key,
        secure_session_cookie,
        x509_tool,
        ..
    } = config;
    let tool = X509Tool(x509_tool);

    let ServerOpts { host, port, .. } = server_opts;

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name(SESSION_COOKIE.to_string())
                    .cookie_secure(secure_session_cookie)
                    .build(),
            )
            .wrap(Logger::new(
                "request=%{PATH}xi, status=%s, user=%{USER}xi, response_time=%D ms",
            )
            .custom_request_replace("PATH", |req| {
                req.match_pattern().unwrap_or("-".to_string())
            })
            .custom_request_replace("USER", {
                let header = login.user_header.clone();
                move |req| {
                    req.headers()
                        .get(header.as_str())
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string()
                }
            }))
            .configure(|cfg| routes(cfg, &gates, &login, &tool))
    })
    .bind(format!("{host}:{port}"))?
    .shutdown_timeout(1)
    .run()
    .await?;

    Ok(())
}
