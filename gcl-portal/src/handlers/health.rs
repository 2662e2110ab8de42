use actix_web::{http::header::ContentType, HttpResponse, Responder};

/// Liveness check for the front end; never touches the credential store.
pub async fn health() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("OK")
}
