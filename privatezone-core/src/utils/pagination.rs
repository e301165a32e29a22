//! Page-number based fetch-all

use std::future::Future;

use privatezone_provider::{PaginatedResponse, PaginationParams};

use crate::error::{CoreError, CoreResult};

/// Fetch every page and concatenate the items in ascending page order.
///
/// Stops once `page * page_size >= total_count`, where `page_size` is the size
/// the remote actually served (it may cap the requested one). The first error
/// aborts the listing; items already fetched are discarded. The remote total
/// is assumed not to shrink while paging.
pub async fn query_all<T, F, Fut>(page_size: u32, mut query: F) -> CoreResult<Vec<T>>
where
    F: FnMut(PaginationParams) -> Fut,
    Fut: Future<Output = CoreResult<PaginatedResponse<T>>>,
{
    if page_size == 0 {
        return Err(CoreError::InvalidArgument(
            "page size must be greater than 0".to_string(),
        ));
    }

    let mut all = Vec::new();
    let mut page: u32 = 1;
    loop {
        let resp = query(PaginationParams::new(page, page_size)).await?;
        let total = u64::from(resp.total_count);
        let fetched = resp.items.len();
        // 远端可能截断 page_size
        let served = match resp.page_size {
            0 => page_size,
            n => n.min(page_size),
        };
        all.extend(resp.items);

        if u64::from(page) * u64::from(served) >= total {
            break;
        }
        // 空页说明 total 不可信，避免死循环
        if fetched == 0 {
            log::warn!("Empty page {page} while {total} items reported, stopping");
            break;
        }
        page += 1;
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use privatezone_provider::ProviderError;

    use super::*;

    /// 模拟固定 total 的远端
    async fn fake_page(params: PaginationParams, total: u32) -> CoreResult<PaginatedResponse<u32>> {
        let start = (params.page - 1) * params.page_size;
        let end = (start + params.page_size).min(total);
        let items = (start..end).collect();
        Ok(PaginatedResponse::new(
            items,
            params.page,
            params.page_size,
            total,
        ))
    }

    #[tokio::test]
    async fn returns_all_items_regardless_of_page_size() {
        for page_size in [1, 2, 3, 7, 10, 100] {
            let calls = AtomicU32::new(0);
            let items = query_all(page_size, |p| {
                calls.fetch_add(1, Ordering::SeqCst);
                fake_page(p, 10)
            })
            .await
            .unwrap();

            assert_eq!(items, (0..10).collect::<Vec<_>>(), "page_size {page_size}");
            assert_eq!(calls.load(Ordering::SeqCst), 10_u32.div_ceil(page_size));
        }
    }

    #[tokio::test]
    async fn remote_page_size_cap_is_followed() {
        let calls = AtomicU32::new(0);
        let items = query_all(500, |p| {
            calls.fetch_add(1, Ordering::SeqCst);
            fake_page(p.validated(100), 250)
        })
        .await
        .unwrap();

        assert_eq!(items, (0..250).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_total_makes_exactly_one_call() {
        let calls = AtomicU32::new(0);
        let items = query_all(100, |p| {
            calls.fetch_add(1, Ordering::SeqCst);
            fake_page(p, 0)
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_page_size_is_invalid() {
        let result = query_all(0, |p| fake_page(p, 3)).await;
        assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn first_error_stops_listing() {
        let calls = AtomicU32::new(0);
        let result: CoreResult<Vec<u32>> = query_all(2, |p| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if p.page == 2 {
                    Err(CoreError::Provider(ProviderError::Timeout {
                        provider: "test".to_string(),
                        detail: "slow".to_string(),
                    }))
                } else {
                    fake_page(p, 10).await
                }
            }
        })
        .await;

        assert!(matches!(result, Err(CoreError::Provider(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_page_with_stale_total_stops() {
        let result = query_all(2, |p| async move {
            Ok::<_, CoreError>(PaginatedResponse::new(
                if p.page == 1 { vec![1, 2] } else { vec![] },
                p.page,
                p.page_size,
                10,
            ))
        })
        .await
        .unwrap();

        assert_eq!(result, vec![1, 2]);
    }
}
