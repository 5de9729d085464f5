//! Pagination state
//!
//! [`PageStateController`] owns the current page and the total count for one
//! list view, and keeps the `pg` query parameter of its location in step with
//! the page number. Fetch results are matched against the state through
//! [`PageTicket`]s so a response for a page the user already left is dropped.

use url::form_urlencoded;

/// Query parameter holding the 1-based page number
pub const PAGE_PARAM: &str = "pg";

/// Query parameter naming the category to show
pub const CATEGORY_PARAM: &str = "category";

/// Page size of the webhook's `pg` paging; fixed on the webhook side
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Snapshot of the pagination numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub items_per_page: usize,
    /// Unknown until a total-count response has been applied
    pub total_items: Option<usize>,
}

impl PageState {
    /// `ceil(total_items / items_per_page)`, once the count is known
    pub fn total_pages(&self) -> Option<usize> {
        self.total_items
            .map(|total| total.div_ceil(self.items_per_page))
    }
}

/// A page transition produced by [`PageStateController::set_page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub from: usize,
    pub to: usize,
}

/// Tag attached to an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub page: usize,
    generation: u64,
}

/// One pagination button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageButton {
    /// Page the button navigates to
    pub page: usize,
    /// Location with `pg` set to `page`
    pub href: String,
    pub active: bool,
    pub disabled: bool,
}

/// Everything needed to draw the pagination controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub prev: PageButton,
    pub pages: Vec<PageButton>,
    pub next: PageButton,
}

/// Owns the page number, the total count and the location they are encoded in
#[derive(Debug, Clone)]
pub struct PageStateController {
    state: PageState,
    path: String,
    /// Decoded query pairs in their original order
    query: Vec<(String, String)>,
    generation: u64,
}

impl PageStateController {
    /// Build the state for `path?query` as loaded.
    ///
    /// `pg` defaults to 1 when absent or not a number and is clamped to at
    /// least 1.
    pub fn init_from_url(path: &str, query: Option<&str>) -> Self {
        let query = query.map(parse_query).unwrap_or_default();
        let current_page = query
            .iter()
            .find(|(key, _)| key == PAGE_PARAM)
            .map(|(_, value)| parse_page_param(value))
            .unwrap_or(1);

        Self {
            state: PageState {
                current_page,
                items_per_page: DEFAULT_ITEMS_PER_PAGE,
                total_items: None,
            },
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            query,
            generation: 0,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    /// First value of a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Category filter from `?category=`, if set
    pub fn category(&self) -> Option<&str> {
        self.param(CATEGORY_PARAM)
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Current location, `path` plus the query with the up-to-date `pg`
    pub fn location(&self) -> String {
        build_location(&self.path, &self.query)
    }

    /// Location for an arbitrary page, leaving the state untouched
    pub fn location_for(&self, page: usize) -> String {
        let mut query = self.query.clone();
        set_param(&mut query, PAGE_PARAM, &page.to_string());
        build_location(&self.path, &query)
    }

    /// Move to page `n`.
    ///
    /// Returns `None` without touching anything when `n` is already the
    /// current page. Otherwise the location's `pg` is rewritten and every
    /// ticket issued so far stops being current.
    pub fn set_page(&mut self, n: usize) -> Option<PageChange> {
        let n = n.max(1);
        if n == self.state.current_page {
            return None;
        }

        let change = PageChange {
            from: self.state.current_page,
            to: n,
        };
        self.state.current_page = n;
        set_param(&mut self.query, PAGE_PARAM, &n.to_string());
        self.generation += 1;

        tracing::debug!("Page {} -> {} ({})", change.from, change.to, self.location());
        Some(change)
    }

    /// Record the total item count.
    ///
    /// A current page past the last page is clamped to the last page (page 1
    /// when there are no items); the resulting change is returned.
    pub fn apply_total_count(&mut self, total: usize) -> Option<PageChange> {
        self.state.total_items = Some(total);
        let last_page = self.state.total_pages().unwrap_or(0).max(1);

        if self.state.current_page > last_page {
            tracing::info!(
                "Page {} is past the last page {}, clamping",
                self.state.current_page,
                last_page
            );
            return self.set_page(last_page);
        }
        None
    }

    /// Tag a request with the page it is issued for
    pub fn begin_request(&self) -> PageTicket {
        PageTicket {
            page: self.state.current_page,
            generation: self.generation,
        }
    }

    /// Whether a response for `ticket` still belongs to the current page
    pub fn is_current(&self, ticket: &PageTicket) -> bool {
        ticket.generation == self.generation && ticket.page == self.state.current_page
    }

    /// The slice of `items` belonging to the current page.
    ///
    /// A webhook that already returns one page yields it unchanged; a longer
    /// collection is cut to the current page's window.
    pub fn page_window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let per_page = self.state.items_per_page;
        if items.len() <= per_page {
            return items;
        }

        let start = (self.state.current_page - 1).saturating_mul(per_page);
        if start >= items.len() {
            return &[];
        }
        let end = (start + per_page).min(items.len());
        &items[start..end]
    }

    /// Pagination controls, available once the total count is known
    pub fn pagination(&self) -> Option<PaginationView> {
        let total_items = self.state.total_items?;
        let total_pages = self.state.total_pages().unwrap_or(0);
        let current = self.state.current_page;

        let button = |page: usize, active: bool, disabled: bool| PageButton {
            page,
            href: self.location_for(page),
            active,
            disabled,
        };

        let pages = (1..=total_pages)
            .map(|page| button(page, page == current, false))
            .collect();

        Some(PaginationView {
            current_page: current,
            total_pages,
            total_items,
            prev: button(current.saturating_sub(1).max(1), false, current == 1),
            pages,
            next: button(current + 1, false, current >= total_pages),
        })
    }
}

/// Parse a `pg` value the way a browser's `parseInt` would, clamped to >= 1
pub fn parse_page_param(value: &str) -> usize {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 1;
    }

    digits[..end].parse::<usize>().unwrap_or(1).max(1)
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Set `key` in place, dropping any repeats of it
fn set_param(query: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut seen = false;
    query.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        query.push((key.to_string(), value.to_string()));
    }
}

fn build_location(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(query: Option<&str>) -> PageStateController {
        PageStateController::init_from_url("/", query)
    }

    #[test]
    fn test_init_from_url() {
        assert_eq!(controller(None).current_page(), 1);
        assert_eq!(controller(Some("pg=3")).current_page(), 3);
        assert_eq!(controller(Some("foo=bar&pg=12")).current_page(), 12);
        assert_eq!(controller(Some("pg=abc")).current_page(), 1);
        assert_eq!(controller(Some("pg=0")).current_page(), 1);
        assert_eq!(controller(Some("pg=-4")).current_page(), 1);
        assert_eq!(controller(Some("pg=")).current_page(), 1);
    }

    #[test]
    fn test_parse_page_param_like_parse_int() {
        assert_eq!(parse_page_param("3abc"), 3);
        assert_eq!(parse_page_param(" 7"), 7);
        assert_eq!(parse_page_param("+2"), 2);
        assert_eq!(parse_page_param("99999999999999999999999999"), 1);
    }

    #[test]
    fn test_total_pages() {
        for total in [0usize, 1, 9, 10, 11, 20, 21, 95, 100, 101] {
            let mut c = controller(None);
            c.apply_total_count(total);
            assert_eq!(c.state().total_pages(), Some(total.div_ceil(10)), "total={}", total);
        }
        assert_eq!(controller(None).state().total_pages(), None);
    }

    #[test]
    fn test_set_same_page_is_noop() {
        let mut c = controller(Some("pg=2&tag=rust"));
        let before = c.location();
        let ticket = c.begin_request();

        assert_eq!(c.set_page(2), None);
        assert_eq!(c.location(), before);
        assert!(c.is_current(&ticket));
    }

    #[test]
    fn test_set_page_rewrites_location() {
        let mut c = controller(Some("tag=rust&pg=2"));
        assert_eq!(c.set_page(5), Some(PageChange { from: 2, to: 5 }));
        assert_eq!(c.current_page(), 5);
        assert_eq!(c.location(), "/?tag=rust&pg=5");

        let mut c = PageStateController::init_from_url("/admin", None);
        c.set_page(2);
        assert_eq!(c.location(), "/admin?pg=2");
    }

    #[test]
    fn test_location_preserves_encoded_params() {
        let c = controller(Some("q=%E6%8A%80%E8%A1%93&pg=1"));
        assert_eq!(c.location_for(2), "/?q=%E6%8A%80%E8%A1%93&pg=2");
    }

    #[test]
    fn test_repeated_page_param_collapses() {
        let mut c = controller(Some("pg=2&tag=a+b&pg=7"));
        assert_eq!(c.current_page(), 2);
        c.set_page(3);
        assert_eq!(c.location(), "/?pg=3&tag=a+b");
        assert_eq!(c.param("tag"), Some("a b"));
    }

    #[test]
    fn test_category_param() {
        let c = controller(Some("category=%E6%8A%80%E8%A1%93&pg=2"));
        assert_eq!(c.category(), Some("技術"));
        assert_eq!(c.location_for(1), "/?category=%E6%8A%80%E8%A1%93&pg=1");

        assert_eq!(controller(Some("category=&pg=2")).category(), None);
        assert_eq!(controller(None).category(), None);
    }

    #[test]
    fn test_page_size_is_fixed() {
        let c = controller(None);
        assert_eq!(c.state().items_per_page, DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let mut c = controller(Some("pg=1"));
        let first = c.begin_request();
        c.set_page(2);
        let second = c.begin_request();

        assert!(!c.is_current(&first));
        assert!(c.is_current(&second));

        // Going back to page 1 does not revive the old ticket
        c.set_page(1);
        assert!(!c.is_current(&first));
    }

    #[test]
    fn test_clamp_past_last_page() {
        let mut c = controller(Some("pg=9"));
        let ticket = c.begin_request();
        assert_eq!(c.apply_total_count(25), Some(PageChange { from: 9, to: 3 }));
        assert_eq!(c.current_page(), 3);
        assert_eq!(c.location(), "/?pg=3");
        assert!(!c.is_current(&ticket));

        let mut c = controller(Some("pg=4"));
        assert_eq!(c.apply_total_count(0), Some(PageChange { from: 4, to: 1 }));

        let mut c = controller(Some("pg=3"));
        assert_eq!(c.apply_total_count(30), None);
    }

    #[test]
    fn test_empty_pagination() {
        let mut c = controller(None);
        assert!(c.pagination().is_none());

        c.apply_total_count(0);
        let view = c.pagination().unwrap();
        assert_eq!(view.total_pages, 0);
        assert!(view.pages.is_empty());
        assert!(view.prev.disabled);
        assert!(view.next.disabled);
    }

    #[test]
    fn test_exactly_one_active_button() {
        for current in 1..=5 {
            let query = format!("pg={}", current);
            let mut c = controller(Some(query.as_str()));
            c.apply_total_count(45);
            let view = c.pagination().unwrap();

            let active: Vec<usize> = view
                .pages
                .iter()
                .filter(|b| b.active)
                .map(|b| b.page)
                .collect();
            assert_eq!(active, vec![current]);
            assert_eq!(view.prev.disabled, current == 1);
            assert_eq!(view.next.disabled, current == 5);
        }
    }

    #[test]
    fn test_button_targets() {
        let mut c = controller(Some("pg=2"));
        c.apply_total_count(30);
        let view = c.pagination().unwrap();
        assert_eq!(view.prev.href, "/?pg=1");
        assert_eq!(view.next.href, "/?pg=3");
        assert_eq!(view.pages[2].href, "/?pg=3");
    }

    #[test]
    fn test_page_window() {
        let items: Vec<usize> = (0..25).collect();

        let c = controller(Some("pg=2"));
        assert_eq!(c.page_window(&items), &items[10..20]);

        let c = controller(Some("pg=3"));
        assert_eq!(c.page_window(&items), &items[20..25]);

        let c = controller(Some("pg=4"));
        assert!(c.page_window(&items).is_empty());

        // A single page from the webhook is shown as-is
        let c = controller(Some("pg=3"));
        assert_eq!(c.page_window(&items[..10]), &items[..10]);
    }
}
