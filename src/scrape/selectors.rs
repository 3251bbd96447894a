use crate::scrape::ScrapeError;
use scraper::Selector;

// Markup contract with immobilienscout24.de. When the site changes, this is
// the only place to touch.
const SCOUT_ID: &str = ".is24-scoutid__content";
const TITLE: &str = "h1#expose-title";
const TYPE: &str = "dd.is24qa-typ";
const PURCHASE_PRICE: &str = ".is24qa-kaufpreis";
const COLD_RENT: &str = ".is24qa-kaltmiete";
const ROOMS: &str = "dd.is24qa-zimmer";
const AREA: &str = "dd.is24qa-wohnflaeche-ca";
const BREADCRUMB: &str = ".breadcrumb__link";
const ADDRESS_BLOCK: &str = ".address-block";
const STREET: &str = ".block";
const ZIP_REGION: &str = ".zip-region-and-country";
const ATTRIBUTES: &str = ".criteriagroup.boolean-listing > span";
const RESULT_ENTRY: &str = ".result-list-entry__data a.result-list-entry__brand-title-container";
const NEXT_PAGE: &str = r#"a[data-is24-qa="paging_bottom_next"]"#;

/// Every selector the scraper uses. Build it once per run and share it
/// between the result-list and expose parsers.
#[derive(Clone)]
pub struct Selectors {
    pub scout_id: Selector,
    pub title: Selector,
    pub listing_type: Selector,
    pub purchase_price: Selector,
    pub cold_rent: Selector,
    pub rooms: Selector,
    pub area: Selector,
    pub breadcrumb: Selector,
    pub address_block: Selector,
    pub street: Selector,
    pub zip_region: Selector,
    pub attributes: Selector,
    pub result_entry: Selector,
    pub next_page: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            scout_id: parse(SCOUT_ID)?,
            title: parse(TITLE)?,
            listing_type: parse(TYPE)?,
            purchase_price: parse(PURCHASE_PRICE)?,
            cold_rent: parse(COLD_RENT)?,
            rooms: parse(ROOMS)?,
            area: parse(AREA)?,
            breadcrumb: parse(BREADCRUMB)?,
            address_block: parse(ADDRESS_BLOCK)?,
            street: parse(STREET)?,
            zip_region: parse(ZIP_REGION)?,
            attributes: parse(ATTRIBUTES)?,
            result_entry: parse(RESULT_ENTRY)?,
            next_page: parse(NEXT_PAGE)?,
        })
    }
}

fn parse(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::HtmlParse(format!("{css}: {e}")))
}
