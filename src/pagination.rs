use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 10;

/// PageQuery
///
/// Raw `?limit=&offset=` query parameters. Kept as strings so that non-numeric input
/// produces our own 400 message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows per page (default 10, must be at least 1).
    pub limit: Option<String>,
    /// Rows to skip (default 0).
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Result<Pagination, AppError> {
        Pagination::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// Pagination
///
/// A validated limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Validates raw query values. Absent or empty values fall back to the defaults.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, AppError> {
        let limit = parse_bound(limit, 1);
        let offset = parse_bound(offset, 0);

        match (limit, offset) {
            (Ok(limit), Ok(offset)) => Ok(Self {
                limit: limit.unwrap_or(DEFAULT_LIMIT),
                offset: offset.unwrap_or(0),
            }),
            (Err(_), Err(_)) => Err(AppError::BadRequest("Invalid Limit and Offset".to_string())),
            (Err(_), Ok(_)) => Err(AppError::BadRequest("Invalid Limit".to_string())),
            (Ok(_), Err(_)) => Err(AppError::BadRequest("Invalid Offset".to_string())),
        }
    }

    /// Page metadata for a page holding `count` rows out of `total` matches.
    pub fn meta(&self, count: usize, total: i64) -> PageMeta {
        let page_count = if total > 0 {
            ((total as f64 / self.limit as f64).round() as i64).max(1)
        } else {
            0
        };

        PageMeta {
            page: (self.offset / self.limit).saturating_add(1),
            page_count,
            count: count as i64,
            total_count: total,
        }
    }

    pub fn paginate<T>(&self, rows: Vec<T>, total: i64) -> Paginated<T> {
        let meta_data = self.meta(rows.len(), total);
        Paginated { rows, meta_data }
    }
}

/// `Ok(None)` for absent/empty input; `Err` for non-integers or values below `min`.
fn parse_bound(raw: Option<&str>, min: i64) -> Result<Option<i64>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n >= min => Ok(Some(n)),
            _ => Err(()),
        },
    }
}

/// PageMeta
///
/// `page` is 1-based. `count` is the number of rows on this page, `totalCount` the
/// number of rows matching the query overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageMeta {
    pub page: i64,
    pub page_count: i64,
    pub count: i64,
    pub total_count: i64,
}

/// Paginated
///
/// Envelope of every list endpoint: `{ "rows": [...], "metaData": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub meta_data: PageMeta,
}
