use actix_session::Session;
use actix_web::dev::ServiceRequest;

use gcl_core::session::SessionState;

/// Program printing certificate details, e.g. `openssl`.
#[derive(Debug, Clone)]
pub struct X509Tool(pub String);

/// The absolute URL of the request, as the browser sees it.
pub(crate) fn request_url(req: &ServiceRequest) -> String {
    let info = req.connection_info();

    format!("{}://{}{}", info.scheme(), info.host(), request_path(req))
}

/// The path and query of the request.
pub(crate) fn request_path(req: &ServiceRequest) -> &str {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
}

/// The actix cookie session, as seen by the gates.
pub(crate) struct PortalSession(pub Session);

impl SessionState for PortalSession {
    fn get(&self, key: &str) -> Result<Option<String>, gcl_core::Error> {
        self.0
            .get::<String>(key)
            .map_err(|e| gcl_core::Error::Session(e.to_string()))
    }

    fn insert(&mut self, key: &str, value: String) -> Result<(), gcl_core::Error> {
        self.0
            .insert(key, value)
            .map_err(|e| gcl_core::Error::Session(e.to_string()))
    }
}
