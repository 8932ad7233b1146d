use serde::Serialize;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Page arithmetic for a list of `total` rows shown `limit` at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    limit: usize,
    page: usize,
}

impl Pager {
    /// Builds a pager, clamping `page` into `[1, page_count]`.
    pub fn new(total: usize, limit: usize, page: usize) -> Self {
        let mut pager = Self {
            total,
            limit: limit.max(1),
            page: 1,
        };
        pager.page = pager.clamp(page);
        pager
    }

    /// Number of pages; at least one so an empty list still has a page.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.limit).max(1)
    }

    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.page_count())
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Offset of the first row of the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    /// Condensed page list, `None` marking an ellipsis.
    pub fn pages(&self) -> Vec<Option<usize>> {
        get_pages(self.page_count(), self.page, 2, 2, 4, 2)
    }

    pub fn view(&self) -> PagerView {
        let first_row = if self.total == 0 { 0 } else { self.offset() + 1 };
        PagerView {
            page: self.page,
            page_count: self.page_count(),
            limit: self.limit,
            total: self.total,
            first_row,
            last_row: (self.offset() + self.limit).min(self.total),
            pages: self.pages(),
            previous: self.has_previous().then(|| self.page - 1),
            next: self.has_next().then(|| self.page + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagerView {
    pub page: usize,
    pub page_count: usize,
    pub limit: usize,
    pub total: usize,
    pub first_row: usize,
    pub last_row: usize,
    pub pages: Vec<Option<usize>>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_five_rows_by_twenty_is_three_pages() {
        let pager = Pager::new(45, 20, 1);
        assert_eq!(pager.page_count(), 3);
        assert_eq!(pager.clamp(4), 3);
        assert_eq!(Pager::new(45, 20, 4).page(), 3);
        assert_eq!(Pager::new(45, 20, 0).page(), 1);
    }

    #[test]
    fn empty_list_has_one_page() {
        let pager = Pager::new(0, 20, 7);
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.offset(), 0);
        let view = pager.view();
        assert_eq!(view.first_row, 0);
        assert_eq!(view.last_row, 0);
        assert_eq!(view.previous, None);
        assert_eq!(view.next, None);
    }

    #[test]
    fn view_reports_row_range() {
        let view = Pager::new(45, 20, 3).view();
        assert_eq!(view.first_row, 41);
        assert_eq!(view.last_row, 45);
        assert_eq!(view.previous, Some(2));
        assert_eq!(view.next, None);
    }

    #[test]
    fn long_lists_are_condensed() {
        let pager = Pager::new(200, 10, 10);
        assert_eq!(
            pager.pages(),
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }
}
