#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod api;
pub mod auth;
pub mod error;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Request, Response as HttpResponse};
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Unix timestamp in seconds, as sent in `X-App-Access-Ts`.
pub type Timestamp = i64;

/// Sends `request` with `headers` merged in and fails on any non-2xx status.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(method = %request.method(), path = %request.url().path()),
        err(level = "warn")
    )
)]
async fn execute(
    client: &ReqwestClient,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<HttpResponse> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    Ok(response)
}

/// Sends `request` and deserializes the JSON body of a successful response.
async fn request<Response: DeserializeOwned>(
    client: &ReqwestClient,
    request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let response = execute(client, request, headers).await?;
    let body = response.bytes().await?;

    #[cfg(feature = "tracing")]
    tracing::trace!(len = body.len(), "received response body");

    Ok(serde_json::from_slice(&body)?)
}
