use crate::db::Database;
use crate::errors::ServerError;
use crate::query::{query, QueryParams};
use crate::responses::{error_to_response, json_response, ResultResp};
use astra::{Request, Response};
use std::collections::HashMap;

const LISTINGS_PREFIX: &str = "/listings";

pub fn handle(req: Request, db: &Database) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, listing_segments(path)) {
        // GET /listings[/{state}[/{city}[/{district}]]]?limit=N
        ("GET", Some(segments)) if segments.len() <= 3 => {
            let mut segments = segments.into_iter().map(str::to_string);
            let params = QueryParams {
                state: segments.next(),
                city: segments.next(),
                district: segments.next(),
                limit: parse_query(&req).remove("limit"),
            };
            json_response(&query(db, &params)?)
        }
        _ => Err(ServerError::NotFound),
    }
}

/// `handle`, with failures turned into JSON error responses.
pub fn respond(req: Request, db: &Database) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    handle(req, db).unwrap_or_else(|err| {
        tracing::warn!(%method, %path, "request failed: {err}");
        error_to_response(err)
    })
}

/// Path segments after `/listings`, still percent-encoded and kept by
/// position: `/listings//Muenster` has an empty state slot. One trailing
/// slash is ignored. `None` when the path is not under `/listings`.
fn listing_segments(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix(LISTINGS_PREFIX)?;
    if rest.is_empty() {
        return Some(vec![]);
    }
    let rest = rest.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Some(vec![]);
    }
    Some(rest.split('/').collect())
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
