//! Page-number pagination over an eagerly counted collection.

use serde::Serialize;

/// Default number of posts on a listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// The page a client asked for, parsed leniently from the `page` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    #[default]
    First,
    Number(u64),
    Last,
}

impl PageRequest {
    /// Parse a raw `page` value. Anything that is not a positive integer or
    /// `"last"` falls back to the first page; integers too large to
    /// represent mean the last page.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::First;
        };

        if raw.eq_ignore_ascii_case("last") {
            return Self::Last;
        }

        match raw.parse::<u64>() {
            Ok(n) if n > 1 => Self::Number(n),
            Ok(_) => Self::First,
            Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Self::Last,
            Err(_) => Self::First,
        }
    }
}

/// Offset/limit slice of an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// Resolves page requests against a known total.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    page_size: u64,
}

impl Paginator {
    pub fn new(total: u64, page_size: u64) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages; an empty collection still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    /// Page number actually served, clamped into `1..=num_pages`.
    pub fn resolve(&self, request: PageRequest) -> u64 {
        match request {
            PageRequest::First => 1,
            PageRequest::Last => self.num_pages(),
            PageRequest::Number(n) => n.clamp(1, self.num_pages()),
        }
    }

    pub fn window(&self, number: u64) -> Window {
        Window {
            offset: (number.max(1) - 1) * self.page_size,
            limit: self.page_size,
        }
    }

    pub fn page<T>(&self, number: u64, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        let has_previous = number > 1;
        let has_next = number < num_pages;

        Page {
            items,
            number,
            num_pages,
            total: self.total,
            page_size: self.page_size,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| number - 1),
            next_page_number: has_next.then(|| number + 1),
        }
    }
}

/// One page of results plus the navigation data templates need.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_request() {
        assert_eq!(PageRequest::parse(None), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("abc")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("2.5")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("-3")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("0")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some("1")), PageRequest::First);
        assert_eq!(PageRequest::parse(Some(" 3 ")), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("last")), PageRequest::Last);
        assert_eq!(
            PageRequest::parse(Some("99999999999999999999")),
            PageRequest::Last
        );
        assert_eq!(
            PageRequest::parse(Some("-99999999999999999999")),
            PageRequest::First
        );
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let paginator = Paginator::new(0, 5);
        assert_eq!(paginator.num_pages(), 1);
        assert_eq!(paginator.resolve(PageRequest::Number(4)), 1);

        let page = paginator.page::<u32>(1, vec![]);
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_resolve_clamps_past_last_page() {
        let paginator = Paginator::new(12, 5);
        assert_eq!(paginator.num_pages(), 3);
        assert_eq!(paginator.resolve(PageRequest::Number(99)), 3);
        assert_eq!(paginator.resolve(PageRequest::Last), 3);
        assert_eq!(paginator.window(3), Window { offset: 10, limit: 5 });
    }

    #[test]
    fn test_page_navigation() {
        let paginator = Paginator::new(12, 5);
        let page = paginator.page(2, vec![6, 7, 8, 9, 10]);

        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!(page.next_page_number, Some(3));
        assert_eq!(page.total, 12);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let paginator = Paginator::new(3, 0);
        assert_eq!(paginator.num_pages(), 3);
    }
}
