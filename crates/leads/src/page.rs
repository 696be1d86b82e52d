use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 1000;

/// Page/limit query, 1-based. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn info(&self, total_count: u64) -> PageInfo {
        PageInfo::new(*self, total_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total_count,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
            limit: request.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let req = PageRequest::new(None, None);
        assert_eq!(req, PageRequest { page: 1, limit: 50 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn zero_and_oversized_values_are_clamped() {
        let req = PageRequest::new(Some(0), Some(0));
        assert_eq!(req, PageRequest { page: 1, limit: 1 });

        let req = PageRequest::new(Some(3), Some(50_000));
        assert_eq!(req.limit, MAX_LIMIT);
        assert_eq!(req.offset(), 2000);
    }

    #[test]
    fn info_for_partial_last_page() {
        let info = PageRequest::new(Some(2), Some(50)).info(120);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(info.has_prev_page);

        let last = PageRequest::new(Some(3), Some(50)).info(120);
        assert!(!last.has_next_page);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let info = PageRequest::default().info(0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
        assert!(!info.has_prev_page);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the pages before the current one never hold more rows
            /// than exist when another page is advertised.
            #[test]
            fn next_page_implies_remaining_rows(page in 1u32..200, limit in 1u32..1000, total in 0u64..100_000) {
                let req = PageRequest::new(Some(page), Some(limit));
                let info = req.info(total);
                prop_assert_eq!(info.has_next_page, req.offset() + u64::from(req.limit) < total);
                prop_assert!(info.total_pages * u64::from(req.limit) >= total);
                prop_assert_eq!(info.has_prev_page, page > 1);
            }
        }
    }
}
