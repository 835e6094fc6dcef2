//! List query parameters and the paginated response envelope.
//!
//! Clients either send `order_by=-title,id` or the `sortBy=title&sort=desc` pair;
//! both normalize to a list of `SortKey`s.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::ServiceError;
use crate::schemas::{AuthorResponse, BookResponse, FlowerResponse};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 1000;
/// SQL offsets are signed 64-bit.
pub const MAX_SKIP: u64 = i64::MAX as u64;

/// Query string accepted by every list endpoint.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Rows to skip
    pub skip: Option<u64>,
    /// Max rows to return (1..=1000)
    pub limit: Option<u64>,
    /// Comma-separated columns, `-` prefix for descending
    pub order_by: Option<String>,
    /// Alternative to `order_by`; may be dotted, the last segment is the column
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`, used with `sortBy`
    pub sort: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    /// Parse `col` or `-col`; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (column, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (raw, false),
        };
        if column.is_empty() { return None; }
        Some(Self { column: column.to_string(), descending })
    }
}

impl ListQuery {
    /// Clamp to sane defaults and return `(skip, limit)`; a `skip` past `MAX_SKIP` is rejected.
    pub fn normalize(&self) -> Result<(u64, u64), ServiceError> {
        let skip = self.skip.unwrap_or(0);
        if skip > MAX_SKIP {
            return Err(ServiceError::Validation(format!("skip must be at most {MAX_SKIP}")));
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Ok((skip, limit))
    }

    /// `order_by` wins over `sortBy`/`sort` when both are given.
    pub fn sort_keys(&self) -> Vec<SortKey> {
        if let Some(order_by) = self.order_by.as_deref().filter(|s| !s.trim().is_empty()) {
            return order_by.split(',').filter_map(SortKey::parse).collect();
        }
        let Some(sort_by) = self.sort_by.as_deref() else { return Vec::new() };
        let column = sort_by.rsplit('.').next().unwrap_or(sort_by).trim();
        if column.is_empty() { return Vec::new(); }
        let descending = self.sort.as_deref().map(|s| s.eq_ignore_ascii_case("desc")).unwrap_or(false);
        vec![SortKey { column: column.to_string(), descending }]
    }
}

/// One page of rows plus the unpaginated row count.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[aliases(BookPage = Page<BookResponse>, AuthorPage = Page<AuthorResponse>, FlowerPage = Page<FlowerResponse>)]
pub struct Page<T> {
    pub objects: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { objects: self.objects.into_iter().map(f).collect(), total_count: self.total_count }
    }
}
