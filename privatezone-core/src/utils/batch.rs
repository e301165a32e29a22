//! Fixed-size chunking for bulk remote calls

use std::future::Future;

use crate::error::{CoreError, CoreResult};

/// Apply `apply` to consecutive chunks of at most `batch_size` items, in order.
///
/// Results are concatenated in input order. The first failing chunk aborts the
/// whole run and chunks already applied are not rolled back.
pub async fn batch_for_each<'a, T, R, F, Fut>(
    items: &'a [T],
    batch_size: usize,
    mut apply: F,
) -> CoreResult<Vec<R>>
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = CoreResult<Vec<R>>>,
{
    if batch_size == 0 {
        return Err(CoreError::InvalidArgument(
            "batch size must be greater than 0".to_string(),
        ));
    }

    let mut all = Vec::with_capacity(items.len());
    for chunk in items.chunks(batch_size) {
        all.extend(apply(chunk).await?);
    }
    Ok(all)
}
