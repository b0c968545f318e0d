//! Request body parsing for `/api/calculate`.
//!
//! Three encodings are accepted, picked by `Content-Type`:
//! - `multipart/form-data` with a `file` upload or a `text` field
//! - `application/x-www-form-urlencoded` with a `text` field
//! - `application/json` as `{"text": ..., "models": [...]}`
//!
//! Form encodings select models with a repeated `models` field.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::ServerError;
use crate::upload::decode_text;

/// Text to count and the models requested for it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CalculateInput {
    pub text: String,
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JsonBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    models: Vec<String>,
}

#[async_trait]
impl<S> FromRequest<S> for CalculateInput
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ServerError::rejected(e.status(), e.body_text()))?;
            from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| ServerError::rejected(e.status(), e.body_text()))?;
            Ok(from_form(&body))
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<JsonBody>::from_request(req, state)
                .await
                .map_err(|e| ServerError::rejected(e.status(), e.body_text()))?;
            Ok(Self {
                text: body.text.unwrap_or_default(),
                models: body.models,
            })
        } else {
            Err(ServerError::InvalidRequest(format!(
                "unsupported content type '{}'",
                content_type
            )))
        }
    }
}

async fn from_multipart(mut multipart: Multipart) -> Result<CalculateInput, ServerError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ServerError::rejected(e.status(), e.body_text())
    };

    let mut input = CalculateInput::default();
    let mut upload: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let has_name = field.file_name().is_some_and(|name| !name.is_empty());
                let bytes = field.bytes().await.map_err(invalid)?;
                if has_name {
                    debug!(size = bytes.len(), "decoding uploaded file");
                    upload = Some(decode_text(&bytes)?);
                }
            }
            "text" => input.text = field.text().await.map_err(invalid)?,
            "models" => input.models.push(field.text().await.map_err(invalid)?),
            _ => {}
        }
    }

    // A non-empty upload wins over the text field
    if let Some(text) = upload.filter(|t| !t.is_empty()) {
        input.text = text;
    }
    Ok(input)
}

fn from_form(body: &[u8]) -> CalculateInput {
    let mut input = CalculateInput::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "text" => input.text = value.into_owned(),
            "models" => input.models.push(value.into_owned()),
            _ => {}
        }
    }
    input
}
