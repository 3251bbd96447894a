use crate::db::connection::Database;
use crate::domain::listing::Listing;
use crate::errors::ServerError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

/// Exact-match conditions on the stored address. All given fields must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub state: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

impl ListingFilter {
    fn clauses(&self) -> Vec<(&'static str, &str)> {
        [
            ("$.address.state", self.state.as_deref()),
            ("$.address.city", self.city.as_deref()),
            ("$.address.district", self.district.as_deref()),
        ]
        .into_iter()
        .filter_map(|(path, value)| value.map(|v| (path, v)))
        .collect()
    }
}

/// One step of a scan: at most `limit` stored documents are looked at,
/// starting after `exclusive_start_key`.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest<'a> {
    pub filter: Option<&'a ListingFilter>,
    pub exclusive_start_key: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Default)]
pub struct ScanPage {
    /// Documents among the examined ones that passed the filter.
    pub items: Vec<Listing>,
    /// Set when the table may hold more rows after this page.
    pub last_evaluated_key: Option<String>,
}

/// Upsert listings by id in one transaction. Returns how many were written.
pub fn put_listings(db: &Database, listings: &[Listing]) -> Result<usize, ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO immoscout (id, doc) VALUES (?1, ?2)
                ON CONFLICT(id) DO UPDATE SET doc = excluded.doc
                "#,
            )?;
            for listing in listings {
                let doc = serde_json::to_string(listing)
                    .map_err(|e| ServerError::DbError(format!("encode {}: {e}", listing.id)))?;
                stmt.execute(params![listing.id, doc])?;
            }
        }
        tx.commit()?;
        Ok(listings.len())
    })
}

pub fn count_listings(db: &Database) -> Result<i64, ServerError> {
    db.with_conn(|conn| Ok(conn.query_row("SELECT count(*) FROM immoscout", [], |r| r.get(0))?))
}

/// Examine the next `limit` rows in id order and keep those matching the
/// filter. The predicate runs inside SQLite; a page can therefore come back
/// with fewer items than `limit` while more matches exist further on.
pub fn scan(db: &Database, req: &ScanRequest<'_>) -> Result<ScanPage, ServerError> {
    let clauses = req.filter.map(ListingFilter::clauses).unwrap_or_default();

    let predicate = if clauses.is_empty() {
        "1".to_string()
    } else {
        clauses
            .iter()
            .enumerate()
            .map(|(i, (path, _))| format!("json_extract(doc, '{path}') = ?{}", i + 3))
            .collect::<Vec<_>>()
            .join(" AND ")
    };

    let sql = format!(
        "SELECT id, doc, COALESCE(({predicate}), 0) AS matched
         FROM immoscout
         WHERE ?1 IS NULL OR id > ?1
         ORDER BY id
         LIMIT ?2"
    );

    let mut values = vec![
        req.exclusive_start_key
            .clone()
            .map(Value::Text)
            .unwrap_or(Value::Null),
        Value::Integer(req.limit as i64),
    ];
    values.extend(clauses.iter().map(|(_, v)| Value::Text(v.to_string())));

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? != 0,
            ))
        })?;

        let mut page = ScanPage::default();
        let mut examined = 0;
        let mut last_id = None;
        for r in rows {
            let (id, doc, matched) = r?;
            examined += 1;
            if matched {
                page.items.push(decode(&doc)?);
            }
            last_id = Some(id);
        }

        if req.limit > 0 && examined == req.limit {
            page.last_evaluated_key = last_id;
        }
        Ok(page)
    })
}

fn decode(doc: &str) -> Result<Listing, ServerError> {
    serde_json::from_str(doc).map_err(|e| ServerError::DbError(format!("decode listing: {e}")))
}
