use std::time::Duration;

use counsel_core::ToolError;
use serde::de::DeserializeOwned;

/// Outbound calls made by tools never wait longer than this.
pub const TOOL_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(TOOL_HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|error| {
            log::warn!("Falling back to default HTTP client: {}", error);
            reqwest::Client::new()
        })
}

/// Send a prepared request and decode a JSON body, mapping every failure to
/// `ToolError::Execution` tagged with `service`.
pub(crate) async fn send_json<T>(request: reqwest::RequestBuilder, service: &str) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|error| ToolError::Execution(format!("{service} request failed: {error}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ToolError::Execution(format!(
            "{service} returned HTTP {}: {}",
            status.as_u16(),
            body
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|error| ToolError::Execution(format!("{service} returned invalid JSON: {error}")))
}
