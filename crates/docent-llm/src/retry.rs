use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const BASE_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 60;

/// Delay before the next attempt: `Retry-After` seconds when present, otherwise
/// exponential backoff capped at one minute.
pub(crate) fn retry_delay(response: &reqwest::Response, attempt: u32) -> Duration {
    if let Some(val) = response.headers().get("retry-after")
        && let Ok(s) = val.to_str()
        && let Ok(secs) = s.trim().parse::<u64>()
    {
        return Duration::from_secs(secs.min(MAX_BACKOFF_SECS));
    }
    Duration::from_secs(backoff_secs(attempt))
}

fn backoff_secs(attempt: u32) -> u64 {
    BASE_BACKOFF_SECS
        .checked_shl(attempt)
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS)
}

/// Send an HTTP request, retrying up to `max_retries` times on 429 responses.
///
/// `f` builds and sends a fresh request for every attempt. The first non-429
/// response is returned to the caller untouched, whatever its status.
///
/// # Errors
///
/// Returns `LlmError::RateLimited` once all attempts are exhausted, or
/// `LlmError::Http` if the request itself fails.
pub(crate) async fn send_with_retry<F, Fut>(
    provider_name: &str,
    max_retries: u32,
    mut f: F,
) -> Result<reqwest::Response, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..=max_retries {
        let response = f().await.map_err(LlmError::Http)?;

        if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }
        if attempt == max_retries {
            break;
        }

        let delay = retry_delay(&response, attempt);
        tracing::warn!(
            provider = provider_name,
            attempt = attempt + 1,
            max_retries,
            delay_secs = delay.as_secs(),
            "rate limited, retrying"
        );
        tokio::time::sleep(delay).await;
    }

    Err(LlmError::RateLimited)
}
