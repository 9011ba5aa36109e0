use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Position of one page within a result set. Shared by the list endpoint and
/// the client controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Pagination {
    /// `requested_page` may lie past the end; the reported `current_page` is
    /// clamped to `last_page` while the caller still serves an empty page.
    /// In that case `first_item`/`last_item` describe the clamped page, not
    /// the rows served. Use [`served_range`] for the latter.
    pub fn new(requested_page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = Self::last_page_for(total, per_page);
        Pagination {
            current_page: requested_page.clamp(1, last_page),
            last_page,
            per_page,
            total,
        }
    }

    pub fn last_page_for(total: u64, per_page: u32) -> u32 {
        let pages = total.div_ceil(u64::from(per_page.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Row offset of a 1-based page.
    pub fn offset(page: u32, per_page: u32) -> u64 {
        u64::from(page.max(1) - 1) * u64::from(per_page)
    }

    /// 1-based index of the first row on the current page, if any.
    pub fn first_item(&self) -> Option<u64> {
        let first = Self::offset(self.current_page, self.per_page) + 1;
        (first <= self.total).then_some(first)
    }

    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| (first + u64::from(self.per_page) - 1).min(self.total))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// 1-based `(from, to)` of the rows actually served at `offset`, `None` when
/// the page came back empty.
pub fn served_range(offset: u64, rows: usize) -> Option<(u64, u64)> {
    let rows = rows as u64;
    (rows > 0).then(|| (offset + 1, offset + rows))
}

/// Number of rows a page holds: `min(per_page, max(0, total - per_page * (page - 1)))`.
pub fn rows_on_page(page: u32, per_page: u32, total: u64) -> u64 {
    total
        .saturating_sub(Pagination::offset(page, per_page))
        .min(u64::from(per_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 25).last_page, 3);
        assert_eq!(Pagination::new(1, 10, 30).last_page, 3);
        assert_eq!(Pagination::new(1, 10, 31).last_page, 4);
    }

    #[test]
    fn empty_set_has_one_page() {
        let page = Pagination::new(1, 10, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.first_item(), None);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn current_page_never_exceeds_last_page() {
        let page = Pagination::new(9, 10, 25);
        assert_eq!(page.current_page, 3);
        assert!(page.current_page <= page.last_page.max(1));
    }

    #[test]
    fn showing_range_for_partial_last_page() {
        let page = Pagination::new(3, 10, 25);
        assert_eq!(page.first_item(), Some(21));
        assert_eq!(page.last_item(), Some(25));
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn past_the_end_page_serves_no_range() {
        let requested = 4;
        let page = Pagination::new(requested, 10, 25);
        assert_eq!(page.current_page, 3);
        assert_eq!(rows_on_page(requested, 10, 25), 0);
        assert_eq!(served_range(Pagination::offset(requested, 10), 0), None);
        assert_eq!(served_range(Pagination::offset(3, 10), 5), Some((21, 25)));
    }

    #[test]
    fn rows_on_page_matches_closed_form() {
        for total in [0_u64, 1, 9, 10, 11, 25, 100] {
            for per_page in [1_u32, 5, 10, 20] {
                for page in 1..=8_u32 {
                    let expected = std::cmp::min(
                        u64::from(per_page),
                        total.saturating_sub(u64::from(per_page) * u64::from(page - 1)),
                    );
                    assert_eq!(rows_on_page(page, per_page, total), expected);
                }
            }
        }
    }
}
