//! Shared HTTP plumbing for the provider adapters

use crate::error::{Error, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("repomirror/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by one provider adapter
pub(crate) fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Send a request and decode its JSON body. Errors are rendered as text for
/// the caller to wrap in its own error variant.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> std::result::Result<T, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let response = ensure_success(response).await?;

    response
        .json::<T>()
        .await
        .map_err(|e| format!("invalid response body: {}", e))
}

/// Send a listing request and decode one page of records
pub(crate) async fn fetch_page<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
    page: u32,
) -> Result<Vec<T>> {
    send_json(request)
        .await
        .map_err(|message| Error::catalog_fetch(provider, page, message))
}

/// Send a creation request and decode the created record
pub(crate) async fn send_create<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
    name: &str,
) -> Result<T> {
    send_json(request)
        .await
        .map_err(|message| Error::create_failed(provider, name, message))
}

async fn ensure_success(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status, body.trim()))
}
