//! HTTP plumbing shared by the hosted providers.

use std::time::Duration;

use anyhow::Context;
use rehearse_core::error::GenerationFailure;

/// Build a client with a whole-request timeout.
pub(crate) fn client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Classify a failure to get any response at all.
pub(crate) fn transport_failure(err: reqwest::Error, timeout_secs: u64) -> GenerationFailure {
    if err.is_timeout() {
        GenerationFailure::Timeout(timeout_secs)
    } else {
        GenerationFailure::NetworkError(err.to_string())
    }
}

/// Turn an error status into a [`GenerationFailure`], passing successful
/// responses through.
///
/// `error_message` pulls a readable message out of a provider-specific
/// error body; the raw body is used when it returns `None`.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    error_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, GenerationFailure> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    if status == 429 {
        let retry_after_ms = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(5)
            .saturating_mul(1000);
        return Err(GenerationFailure::RateLimited { retry_after_ms });
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    Err(match status {
        401 | 403 => GenerationFailure::AuthenticationFailed(message),
        404 => GenerationFailure::ModelNotFound(model.to_string()),
        _ => GenerationFailure::ApiError { status, message },
    })
}

/// Failure for a 2xx body that does not match the expected shape.
pub(crate) fn malformed_body(err: reqwest::Error) -> GenerationFailure {
    GenerationFailure::ApiError {
        status: 0,
        message: format!("failed to parse response: {err}"),
    }
}
