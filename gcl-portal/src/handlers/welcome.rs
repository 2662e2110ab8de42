use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::middleware::login::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct Welcome {
    pub user: String,
    pub message: String,
}

pub async fn welcome(req: HttpRequest) -> Result<HttpResponse, crate::Error> {
    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(crate::Error::Unauthenticated)?;

    Ok(HttpResponse::Ok().json(Welcome {
        message: format!("Welcome, user {}", user.username),
        user: user.username,
    }))
}
