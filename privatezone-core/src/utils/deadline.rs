//! Deadline helper

use std::future::Future;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Run `fut` to completion or fail with [`CoreError::Cancelled`] after `timeout`.
///
/// The future is dropped on expiry, which aborts any in-flight remote call.
/// Remote writes that already landed are not rolled back.
pub async fn with_deadline<T, Fut>(timeout: Duration, what: &str, fut: Fut) -> CoreResult<T>
where
    Fut: Future<Output = CoreResult<T>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, fut).await {
        result
    } else {
        log::warn!("{what} did not finish within {}s", timeout.as_secs_f32());
        Err(CoreError::Cancelled(format!(
            "{what} exceeded deadline of {}s",
            timeout.as_secs_f32()
        )))
    }
}
