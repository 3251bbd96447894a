// ingest.rs
use crate::config::{IngestConfig, ScraperConfig};
use crate::db::connection::Database;
use crate::db::listings::put_listings;
use crate::domain::listing::Listing;
use crate::errors::ServerError;
use crate::scrape::{ExposeParser, PageSource, ResultList, ScrapeError, Selectors};
use thiserror::Error;
use tracing::{debug, info, warn};

const SEARCH_PATH: &str = "Suche/S-T";
const RENT_SEGMENT: &str = "Wohnung-Miete";
const BUY_SEGMENT: &str = "Wohnung-Kauf";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Store(#[from] ServerError),
}

/// Which listings one run goes after.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestParams {
    pub is_rental: bool,
    pub state: String,
    pub city: String,
    pub district: String,
    /// Stop after this many exposes. `None` walks every result page.
    pub limit: Option<usize>,
}

impl IngestParams {
    pub fn from_defaults(cfg: &IngestConfig) -> Self {
        Self {
            is_rental: false,
            state: cfg.state.clone(),
            city: cfg.city.clone(),
            district: cfg.district.clone(),
            limit: None,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct IngestReport {
    pub written: usize,
    /// Exposes dropped because their scout id could not be read.
    pub skipped: usize,
    pub pages_fetched: usize,
}

/// `{base}/Suche/S-T/{Wohnung-Miete|Wohnung-Kauf}/{state}/{city}/{district}`,
/// leaving out empty location segments.
pub fn search_url(base_url: &str, params: &IngestParams) -> String {
    let mode = if params.is_rental { RENT_SEGMENT } else { BUY_SEGMENT };
    let base = base_url.trim_end_matches('/');

    [
        base,
        SEARCH_PATH,
        mode,
        params.state.as_str(),
        params.city.as_str(),
        params.district.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Walks the result pages, parses every expose and hands the listings to
/// `on_listing` in order.
///
/// A transport failure ends the walk with an error. An expose without a
/// readable scout id is logged and counted, then skipped.
pub fn scrape_listings<S, F>(
    source: &S,
    cfg: &ScraperConfig,
    params: &IngestParams,
    mut on_listing: F,
) -> Result<IngestReport, IngestError>
where
    S: PageSource,
    F: FnMut(Listing) -> Result<(), IngestError>,
{
    let selectors = Selectors::new()?;
    let list = ResultList::new(selectors.clone(), &cfg.base_url)?;
    let parser = ExposeParser::new(selectors, cfg.country.as_str());
    let url = search_url(&cfg.base_url, params);
    info!(%url, limit = ?params.limit, "starting scrape");

    let mut report = IngestReport::default();
    let mut pages = list.pages(source, &url);

    let cap = params.limit.unwrap_or(usize::MAX);
    for expose_url in pages.by_ref().take(cap) {
        let expose_url = expose_url?;
        let html = source.fetch(&expose_url)?;

        match parser.parse(&html, &expose_url, now_timestamp()) {
            Ok(listing) => {
                debug!(id = %listing.id, url = %expose_url, "expose parsed");
                on_listing(listing)?;
            }
            Err(ScrapeError::MissingField(field)) => {
                warn!(url = %expose_url, field, "skipping expose");
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    report.pages_fetched = pages.pages_fetched();
    Ok(report)
}

/// One ingestion pass: scrape and upsert in batches of `batch_size`.
pub struct IngestJob<'a, S: PageSource> {
    source: &'a S,
    db: &'a Database,
    scraper: &'a ScraperConfig,
    batch_size: usize,
}

impl<'a, S: PageSource> IngestJob<'a, S> {
    pub fn new(
        source: &'a S,
        db: &'a Database,
        scraper: &'a ScraperConfig,
        ingest: &IngestConfig,
    ) -> Self {
        Self {
            source,
            db,
            scraper,
            batch_size: ingest.batch_size.max(1),
        }
    }

    pub fn run(&self, params: &IngestParams) -> Result<IngestReport, IngestError> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut written = 0;

        let mut report = scrape_listings(self.source, self.scraper, params, |listing| {
            batch.push(listing);
            if batch.len() >= self.batch_size {
                written += put_listings(self.db, &batch)?;
                batch.clear();
            }
            Ok(())
        })?;

        if !batch.is_empty() {
            written += put_listings(self.db, &batch)?;
        }
        report.written = written;

        info!(
            written = report.written,
            skipped = report.skipped,
            pages = report.pages_fetched,
            "scrape finished"
        );
        Ok(report)
    }
}
