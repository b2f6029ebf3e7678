//! Request body extractor accepting both HTML-form and JSON payloads.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::errors::BodyRejection;

/// Decodes `application/json` bodies as JSON and everything else as
/// `application/x-www-form-urlencoded`. An empty body decodes like an empty
/// form, so all-optional targets come out as their defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOrJson<T>(pub T);

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[async_trait]
impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(&req);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| BodyRejection(e.body_text()))?;

        let value = if json && !bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(&bytes).map_err(|e| BodyRejection(format!("invalid JSON body: {e}")))?
        } else {
            serde_urlencoded::from_bytes(&bytes).map_err(|e| BodyRejection(format!("invalid form body: {e}")))?
        };
        Ok(FormOrJson(value))
    }
}
