//! Page clamping for listings.

/// The slice of a listing to load for a requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub num_pages: u32,
    pub per_page: u32,
}

impl PageWindow {
    /// Resolves a raw `?page=` value against `total` rows.
    ///
    /// Missing or non-numeric input gives page 1; a number outside `1..=num_pages`
    /// gives the last page, including integers too wide for `i64`. An empty listing
    /// still has one page.
    pub fn resolve(requested: Option<&str>, total: i64, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0) as u64;
        let num_pages = total.div_ceil(per_page as u64).max(1) as u32;
        let page = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Err(_) if is_integer_literal(raw) => num_pages,
                Err(_) => 1,
                Ok(n) if n >= 1 && n <= num_pages as i64 => n as u32,
                Ok(_) => num_pages,
            },
        };
        PageWindow {
            page,
            num_pages,
            per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }
}

/// Optional sign followed by one or more ASCII digits.
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let w = PageWindow::resolve(None, 100, 24);
        assert_eq!((w.page, w.num_pages), (1, 5));
        assert_eq!(w.offset(), 0);
        assert_eq!(w.next_page_number(), Some(2));
    }

    #[test]
    fn garbage_goes_to_first_and_out_of_range_to_last() {
        assert_eq!(PageWindow::resolve(Some("abc"), 100, 24).page, 1);
        assert_eq!(PageWindow::resolve(Some("99"), 100, 24).page, 5);
        assert_eq!(PageWindow::resolve(Some("0"), 100, 24).page, 5);
        assert_eq!(PageWindow::resolve(Some("-2"), 100, 24).page, 5);
    }

    #[test]
    fn overflowing_page_number_goes_to_last() {
        assert_eq!(PageWindow::resolve(Some("99999999999999999999"), 100, 24).page, 5);
        assert_eq!(PageWindow::resolve(Some("-99999999999999999999"), 100, 24).page, 5);
        assert_eq!(PageWindow::resolve(Some("+99999999999999999999"), 100, 24).page, 5);
        assert_eq!(PageWindow::resolve(Some("9999999999999999999x"), 100, 24).page, 1);
        assert_eq!(PageWindow::resolve(Some("-"), 100, 24).page, 1);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let w = PageWindow::resolve(Some("3"), 0, 24);
        assert_eq!((w.page, w.num_pages), (1, 1));
        assert!(!w.has_next());
    }

    #[test]
    fn last_page_offset() {
        let w = PageWindow::resolve(Some("5"), 100, 24);
        assert_eq!(w.offset(), 96);
        assert_eq!(w.next_page_number(), None);
    }
}
