// expose.rs
use crate::domain::listing::{Address, Listing};
use crate::scrape::text::{element_text, non_empty, parse_integer, parse_number};
use crate::scrape::{ScrapeError, Selectors};
use scraper::{Html, Selector};

/// Turns one expose page into a `Listing`.
///
/// Only the scout id is mandatory. Every other field is looked up on its own
/// and simply left out when the page does not have it.
pub struct ExposeParser {
    selectors: Selectors,
    country: String,
}

impl ExposeParser {
    pub fn new(selectors: Selectors, country: impl Into<String>) -> Self {
        Self {
            selectors,
            country: country.into(),
        }
    }

    pub fn parse(&self, html: &str, url: &str, timestamp: f64) -> Result<Listing, ScrapeError> {
        let doc = Html::parse_document(html);

        Ok(Listing {
            id: self.id(&doc)?,
            name: self.name(&doc),
            url: url.to_string(),
            timestamp,
            is_rental: self.is_rental(&doc),
            price: self.price(&doc),
            area: self.number(&doc, &self.selectors.area),
            rooms: self.number(&doc, &self.selectors.rooms),
            address: self.address(&doc),
            listing_type: self.listing_type(&doc),
            attributes: self.attributes(&doc),
        })
    }

    /// "Scout-ID: | 118026883" -> "118026883"
    fn id(&self, doc: &Html) -> Result<String, ScrapeError> {
        let text =
            first_text(doc, &self.selectors.scout_id).ok_or(ScrapeError::MissingField("id"))?;
        let raw = text.rsplit('|').next().unwrap_or_default();
        parse_integer(raw)
            .map(|id| id.to_string())
            .ok_or(ScrapeError::MissingField("id"))
    }

    fn name(&self, doc: &Html) -> Option<String> {
        first_text(doc, &self.selectors.title).and_then(non_empty)
    }

    fn listing_type(&self, doc: &Html) -> Option<String> {
        first_text(doc, &self.selectors.listing_type).and_then(non_empty)
    }

    fn is_rental(&self, doc: &Html) -> bool {
        doc.select(&self.selectors.purchase_price).next().is_none()
    }

    fn price(&self, doc: &Html) -> Option<f64> {
        let el = doc
            .select(&self.selectors.purchase_price)
            .next()
            .or_else(|| doc.select(&self.selectors.cold_rent).next())?;
        parse_number(&element_text(el))
    }

    fn number(&self, doc: &Html, selector: &Selector) -> Option<f64> {
        first_text(doc, selector).and_then(|t| parse_number(&t))
    }

    // Breadcrumb trail: home, state, city, district. Trimmed, since the
    // query filters compare these exactly.
    fn breadcrumb(&self, doc: &Html, index: usize) -> Option<String> {
        doc.select(&self.selectors.breadcrumb)
            .nth(index)
            .map(|el| element_text(el).trim().to_string())
            .and_then(non_empty)
    }

    fn street(&self, doc: &Html) -> Option<String> {
        let block = doc.select(&self.selectors.address_block).next()?;
        let line = block.select(&self.selectors.street).next()?;
        let street = element_text(line)
            .trim_matches(|c: char| c.is_whitespace() || c == ',')
            .to_string();
        non_empty(street)
    }

    fn zip(&self, doc: &Html) -> Option<String> {
        let block = doc.select(&self.selectors.address_block).next()?;
        let line = block.select(&self.selectors.zip_region).next()?;
        let text = element_text(line);
        text.split_whitespace().next().map(str::to_string)
    }

    fn address(&self, doc: &Html) -> Address {
        Address {
            country: non_empty(self.country.clone()),
            state: self.breadcrumb(doc, 1),
            city: self.breadcrumb(doc, 2),
            zip: self.zip(doc),
            district: self.breadcrumb(doc, 3),
            street: self.street(doc),
        }
    }

    fn attributes(&self, doc: &Html) -> Vec<String> {
        doc.select(&self.selectors.attributes)
            .map(element_text)
            .collect()
    }
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).next().map(element_text)
}
