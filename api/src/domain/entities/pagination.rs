//! Page requests and paged results

/// Upper bound for any page size a client can ask for
pub const MAX_PAGE_SIZE: u64 = 100;

/// A validated page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Clamp raw query values: `page >= 1`, `1 <= limit <= MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: u64) -> Self {
        let page = page.unwrap_or(1).max(1) as u64;
        let limit = limit
            .map(|l| l.clamp(1, MAX_PAGE_SIZE as i64) as u64)
            .unwrap_or(default_limit);
        Self { page, limit }
    }

    /// Rows to skip, saturating at the largest offset SQLite accepts
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let req = PageRequest::new(None, None, 12);
        assert_eq!(req, PageRequest { page: 1, limit: 12 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let req = PageRequest::new(Some(0), Some(1000), 12);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_SIZE);

        let req = PageRequest::new(Some(-3), Some(0), 12);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let req = PageRequest::new(Some(3), Some(20), 12);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let req = PageRequest::new(Some(i64::MAX), Some(100), 12);
        assert_eq!(req.page, i64::MAX as u64);
        assert_eq!(req.offset(), i64::MAX as u64);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(Some(1), Some(12), 12);
        assert_eq!(Page::<()>::new(vec![], 0, req).total_pages(), 0);
        assert_eq!(Page::<()>::new(vec![], 12, req).total_pages(), 1);
        assert_eq!(Page::<()>::new(vec![], 13, req).total_pages(), 2);
        assert_eq!(Page::<()>::new(vec![], 25, req).total_pages(), 3);
    }
}
