//! Page-based pagination of the admin list screens.

use serde_json::Value;
use url::form_urlencoded;

use crate::errors::AdminError;

const PAGE_WINDOW: u64 = 3;
/// Largest row offset a SQL backend accepts.
const MAX_SKIP: u64 = i64::MAX as u64;

/// List query of an admin screen: `page`, `pageSize`, `sortBy`, `sort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    /// `0` when absent; the view substitutes its default.
    pub page_size: u64,
    pub sort_by: Option<String>,
    pub descending: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 1, page_size: 0, sort_by: None, descending: false }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, AdminError> {
    raw.trim().parse::<u64>().map_err(|_| AdminError::BadRequest(format!("`{key}` must be a non-negative integer")))
}

impl ListParams {
    pub fn from_query(query: &[(String, String)]) -> Result<Self, AdminError> {
        let mut params = Self::default();
        for (key, value) in query {
            match key.as_str() {
                "page" if !value.is_empty() => params.page = parse_number(key, value)?.max(1),
                "pageSize" if !value.is_empty() => params.page_size = parse_number(key, value)?,
                // `sortBy` may be a dotted attribute path; the last segment names the column.
                "sortBy" if !value.is_empty() => {
                    params.sort_by = value.rsplit('.').next().map(str::to_string);
                }
                "sort" => params.descending = value == "desc",
                _ => {}
            }
        }
        Ok(params)
    }

    /// Rows before the current page; a page beyond the addressable range is a bad request.
    pub fn skip(&self, page_size: u64) -> Result<u64, AdminError> {
        (self.page - 1)
            .checked_mul(page_size)
            .filter(|skip| *skip <= MAX_SKIP)
            .ok_or_else(|| AdminError::BadRequest(format!("`page` {} is out of range", self.page)))
    }
}

/// `path` with the current query, where each of `updates` replaces its key.
pub fn replace_query_params(path: &str, query: &[(String, String)], updates: &[(&str, &str)]) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for (k, v) in query.iter().filter(|(k, _)| !updates.iter().any(|(u, _)| u == k)) {
        ser.append_pair(k, v);
    }
    for (k, v) in updates {
        ser.append_pair(k, v);
    }
    format!("{path}?{}", ser.finish())
}

pub fn replace_query_param(path: &str, query: &[(String, String)], key: &str, value: &str) -> String {
    replace_query_params(path, query, &[(key, value)])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControl {
    pub number: u64,
    pub url: String,
}

/// One page of rows plus the links the list screen renders.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// `None` when the data source could not be reached.
    pub rows: Option<Vec<Value>>,
    pub page: u64,
    pub page_size: u64,
    pub count: u64,
    pub page_controls: Vec<PageControl>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    pub fn new(rows: Option<Vec<Value>>, page: u64, page_size: u64, count: u64) -> Self {
        Self { rows, page, page_size, count, page_controls: Vec::new(), previous_url: None, next_url: None }
    }

    /// Build from a `{"objects": [...], "total_count": n}` body.
    pub fn from_objects(data: Option<Value>, page: u64, page_size: u64) -> Self {
        let rows = data.as_ref().and_then(|d| d.get("objects")).and_then(Value::as_array).cloned();
        let count = data.as_ref().and_then(|d| d.get("total_count")).and_then(Value::as_u64).unwrap_or(0);
        Self::new(rows, page, page_size, count)
    }

    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.count.div_ceil(self.page_size).max(1)
    }

    pub fn has_previous(&self) -> bool { self.page > 1 }

    pub fn has_next(&self) -> bool { self.page < self.page_count() }

    /// Fill page links for the pages around the current one, keeping every other
    /// query parameter of the current request.
    pub fn add_pagination_urls(&mut self, path: &str, query: &[(String, String)]) {
        let first = self.page.saturating_sub(PAGE_WINDOW).max(1);
        let last = self.page.saturating_add(PAGE_WINDOW).min(self.page_count());
        self.page_controls = (first..=last)
            .map(|n| PageControl { number: n, url: replace_query_param(path, query, "page", &n.to_string()) })
            .collect();
        self.previous_url =
            self.has_previous().then(|| replace_query_param(path, query, "page", &(self.page - 1).to_string()));
        self.next_url = self.has_next().then(|| replace_query_param(path, query, "page", &(self.page + 1).to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_list_query() {
        let p = ListParams::from_query(&q(&[("page", "3"), ("pageSize", "10"), ("sortBy", "Book.title"), ("sort", "desc")]))
            .unwrap();
        assert_eq!(p, ListParams { page: 3, page_size: 10, sort_by: Some("title".into()), descending: true });
        assert_eq!(p.skip(10).unwrap(), 20);
        assert_eq!(ListParams::from_query(&[]).unwrap(), ListParams::default());
        assert!(ListParams::from_query(&q(&[("page", "two")])).is_err());
        assert_eq!(ListParams::from_query(&q(&[("page", "0")])).unwrap().page, 1);
    }

    #[test]
    fn huge_page_is_a_bad_request() {
        let p = ListParams::from_query(&q(&[("page", "18446744073709551615")])).unwrap();
        assert!(matches!(p.skip(50), Err(AdminError::BadRequest(_))));
        assert!(matches!(p.skip(1), Err(AdminError::BadRequest(_))));
        assert_eq!(p.skip(0).unwrap(), 0);
    }

    #[test]
    fn page_links_near_the_upper_bound_do_not_overflow() {
        let mut p = Pagination::new(Some(vec![]), u64::MAX, 1, u64::MAX);
        p.add_pagination_urls("/admin/book/list", &[]);
        assert!(p.next_url.is_none());
        assert_eq!(p.page_controls.last().map(|c| c.number), Some(u64::MAX));
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Pagination::new(None, 1, 10, 0).page_count(), 1);
        assert_eq!(Pagination::new(None, 1, 10, 21).page_count(), 3);
    }

    #[test]
    fn urls_keep_other_query_params() {
        let mut p = Pagination::new(Some(vec![]), 2, 5, 40);
        p.add_pagination_urls("/admin/book/list", &q(&[("page", "2"), ("sortBy", "title")]));
        assert_eq!(p.previous_url.as_deref(), Some("/admin/book/list?sortBy=title&page=1"));
        assert_eq!(p.next_url.as_deref(), Some("/admin/book/list?sortBy=title&page=3"));
        let numbers: Vec<u64> = p.page_controls.iter().map(|c| c.number).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_objects_reads_rows_and_total() {
        let p = Pagination::from_objects(Some(json!({"objects": [{"id": 1}], "total_count": 7})), 1, 5);
        assert_eq!(p.rows.unwrap().len(), 1);
        assert_eq!(p.count, 7);
        let p = Pagination::from_objects(None, 1, 5);
        assert!(p.rows.is_none());
        assert_eq!(p.count, 0);
    }
}
