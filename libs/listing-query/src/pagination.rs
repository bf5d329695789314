use serde::Serialize;

/// Page/limit pair after normalization. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    page: u64,
    limit: u64,
}

impl PagePlan {
    /// Builds a plan, clamping zero values up to 1.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of documents to skip before the requested page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    pub fn meta(&self, total: u64) -> PaginationMeta {
        PaginationMeta {
            page: self.page,
            pages: self.pages(total),
            limit: self.limit,
        }
    }
}

impl Default for PagePlan {
    fn default() -> Self {
        Self::new(1, crate::params::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_zero_on_first_page() {
        assert_eq!(PagePlan::new(1, 12).skip(), 0);
        assert_eq!(PagePlan::new(3, 12).skip(), 24);
    }

    #[test]
    fn pages_round_up() {
        let plan = PagePlan::new(1, 12);
        assert_eq!(plan.pages(25), 3);
        assert_eq!(plan.pages(24), 2);
        assert_eq!(plan.pages(0), 0);
    }

    #[test]
    fn zero_limit_is_clamped() {
        let plan = PagePlan::new(0, 0);
        assert_eq!(plan.page(), 1);
        assert_eq!(plan.limit(), 1);
        assert_eq!(plan.pages(7), 7);
    }

    #[test]
    fn huge_pages_do_not_overflow_skip() {
        assert_eq!(PagePlan::new(u64::MAX, u64::MAX).skip(), u64::MAX);
    }
}
