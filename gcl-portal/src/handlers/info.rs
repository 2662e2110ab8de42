use actix_web::{web, web::Data, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use gcl_core::consts::{X509_USER_CERT, X509_USER_PROXY};
use gcl_core::credential::ValidatedArtifacts;

use crate::middleware::login::AuthenticatedUser;
use crate::util::X509Tool;
use crate::Error;

/// The inspection output of a single artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: String,
    pub details: String,
}

/// The credentials a gated view was given.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialInfo {
    pub user: String,
    pub directory: String,
    pub certificate: ArtifactInfo,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub proxy: Option<ArtifactInfo>,
}

/// Run `<tool> x509 -noout -text -in <artifact>` with the validated paths in the child's
/// environment, returning stdout and stderr merged.
async fn inspect(
    tool: &X509Tool,
    artifacts: &ValidatedArtifacts,
    var: &str,
) -> Result<ArtifactInfo, Error> {
    let path = artifacts.get(var).ok_or(Error::NoCredentials)?.to_path_buf();

    let program = tool.0.clone();
    let envs: Vec<(&'static str, PathBuf)> = artifacts
        .env_vars()
        .map(|(v, p)| (v, p.to_path_buf()))
        .collect();
    let target = path.clone();

    let output = web::block(move || {
        Command::new(program)
            .args(["x509", "-noout", "-text", "-in"])
            .arg(target)
            .envs(envs)
            .stdin(Stdio::null())
            .output()
    })
    .await
    .map_err(|_e| Error::Unexpected)?
    .map_err(|e| {
        log::error!("could not run {}: {e}", tool.0);
        Error::Tool(e.to_string())
    })?;

    let mut details = String::from_utf8_lossy(&output.stdout).into_owned();
    details.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(ArtifactInfo {
        path: path.display().to_string(),
        details,
    })
}

/// The credential directory the artifacts were validated in.
fn directory(artifacts: &ValidatedArtifacts) -> String {
    artifacts
        .user_cert()
        .and_then(Path::parent)
        .map(|d| d.display().to_string())
        .unwrap_or_default()
}

fn gated(req: &HttpRequest) -> Result<(AuthenticatedUser, ValidatedArtifacts), Error> {
    let ext = req.extensions();

    let user = ext
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(Error::Unauthenticated)?;
    let artifacts = ext
        .get::<ValidatedArtifacts>()
        .cloned()
        .ok_or(Error::NoCredentials)?;

    Ok((user, artifacts))
}

pub async fn cert_info(req: HttpRequest, tool: Data<X509Tool>) -> Result<HttpResponse, Error> {
    let (user, artifacts) = gated(&req)?;

    let certificate = inspect(&tool, &artifacts, X509_USER_CERT).await?;

    Ok(HttpResponse::Ok().json(CredentialInfo {
        user: user.username,
        directory: directory(&artifacts),
        certificate,
        proxy: None,
    }))
}

pub async fn proxy_info(req: HttpRequest, tool: Data<X509Tool>) -> Result<HttpResponse, Error> {
    let (user, artifacts) = gated(&req)?;

    let certificate = inspect(&tool, &artifacts, X509_USER_CERT).await?;
    let proxy = inspect(&tool, &artifacts, X509_USER_PROXY).await?;

    Ok(HttpResponse::Ok().json(CredentialInfo {
        user: user.username,
        directory: directory(&artifacts),
        certificate,
        proxy: Some(proxy),
    }))
}
