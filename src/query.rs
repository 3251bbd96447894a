// query.rs
use crate::db::connection::Database;
use crate::db::listings::{scan, ListingFilter, ScanRequest};
use crate::domain::listing::Listing;
use crate::errors::ServerError;
use serde::Serialize;
use std::num::IntErrorKind;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Raw request input: path filters still percent-encoded, limit as sent.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub state: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Number of items in this response, not of all matches.
    pub count: usize,
    pub items: Vec<Listing>,
}

/// Requested limit capped at `MAX_LIMIT`. Anything that is not a positive
/// integer falls back to `DEFAULT_LIMIT`.
pub fn parse_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_LIMIT;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => (n as u64).min(MAX_LIMIT as u64) as usize,
        Ok(_) => DEFAULT_LIMIT,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_LIMIT,
        Err(_) => DEFAULT_LIMIT,
    }
}

fn decode(value: Option<&str>) -> Result<Option<String>, ServerError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let decoded = urlencoding::decode(value)
        .map_err(|e| ServerError::BadRequest(format!("invalid path segment {value:?}: {e}")))?;
    Ok(Some(decoded.into_owned()).filter(|v| !v.is_empty()))
}

pub fn build_filter(params: &QueryParams) -> Result<ListingFilter, ServerError> {
    Ok(ListingFilter {
        state: decode(params.state.as_deref())?,
        city: decode(params.city.as_deref())?,
        district: decode(params.district.as_deref())?,
    })
}

/// Filtered scan that keeps paging until `limit` items are collected or the
/// table runs out. Each follow-up page only asks for what is still missing.
pub fn query(db: &Database, params: &QueryParams) -> Result<QueryResponse, ServerError> {
    let limit = parse_limit(params.limit.as_deref());
    let filter = build_filter(params)?;

    let mut page = scan(
        db,
        &ScanRequest {
            filter: Some(&filter),
            exclusive_start_key: None,
            limit,
        },
    )?;
    let mut items = std::mem::take(&mut page.items);
    let mut scans = 1;

    while let Some(start_key) = page.last_evaluated_key.take() {
        let remaining = limit.saturating_sub(items.len());
        if remaining == 0 {
            break;
        }
        page = scan(
            db,
            &ScanRequest {
                filter: Some(&filter),
                exclusive_start_key: Some(start_key),
                limit: remaining,
            },
        )?;
        items.append(&mut page.items);
        scans += 1;
    }

    items.truncate(limit);
    tracing::debug!(?filter, limit, scans, count = items.len(), "query served");

    Ok(QueryResponse {
        count: items.len(),
        items,
    })
}
