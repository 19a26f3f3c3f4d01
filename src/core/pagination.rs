pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn next(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// 換每頁筆數時回到第一頁
    pub fn change_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.page = 1;
    }

    pub fn has_next(&self, total_pages: u32) -> bool {
        self.page < total_pages
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::default();
        assert_eq!((p.page(), p.limit()), (1, 10));
    }

    #[test]
    fn test_navigation_floors_at_first_page() {
        let mut p = Pagination::default();
        p.prev();
        assert_eq!(p.page(), 1);
        p.next();
        p.next();
        assert_eq!(p.page(), 3);
        p.go_to(0);
        assert_eq!(p.page(), 1);
        p.go_to(7);
        assert_eq!(p.page(), 7);
    }

    #[test]
    fn test_change_limit_resets_page() {
        let mut p = Pagination::new(4, 10);
        p.change_limit(50);
        assert_eq!((p.page(), p.limit()), (1, 50));
        assert!(p.has_next(2));
        assert!(!Pagination::new(2, 10).has_next(2));
    }
}
