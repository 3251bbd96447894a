// result_list.rs
use crate::scrape::{PageSource, ScrapeError, Selectors};
use scraper::{Html, Selector};
use std::collections::VecDeque;
use url::Url;

/// What one search-results page tells us.
#[derive(Debug, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<String>,
    pub next: Option<String>,
}

/// Reads search-results pages. Hrefs are joined onto the site's base url.
pub struct ResultList {
    selectors: Selectors,
    base_url: Url,
}

impl ResultList {
    pub fn new(selectors: Selectors, base_url: &str) -> Result<Self, ScrapeError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self { selectors, base_url })
    }

    pub fn parse_page(&self, html: &str) -> ResultPage {
        let doc = Html::parse_document(html);

        let items = self.hrefs(&doc, &self.selectors.result_entry).collect();
        let next = self.hrefs(&doc, &self.selectors.next_page).next();

        ResultPage { items, next }
    }

    /// Lazily walk every page starting at `search_url`.
    pub fn pages<'a, S: PageSource>(
        &'a self,
        source: &'a S,
        search_url: &str,
    ) -> ResultPages<'a, S> {
        ResultPages {
            list: self,
            source,
            pending: VecDeque::new(),
            next_url: Some(search_url.to_string()),
            pages_fetched: 0,
        }
    }

    fn hrefs<'d>(
        &'d self,
        doc: &'d Html,
        selector: &'d Selector,
    ) -> impl Iterator<Item = String> + 'd {
        doc.select(selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(move |href| self.base_url.join(href).ok())
            .map(String::from)
    }
}

/// Item urls across all result pages, one at a time.
///
/// A page is only fetched once every url of the previous page has been
/// handed out, so `take(n)` never downloads more pages than needed. The
/// iterator ends when a page has no "next" control; it also stops after the
/// first fetch error.
pub struct ResultPages<'a, S: PageSource> {
    list: &'a ResultList,
    source: &'a S,
    pending: VecDeque<String>,
    next_url: Option<String>,
    pages_fetched: usize,
}

impl<S: PageSource> ResultPages<'_, S> {
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl<S: PageSource> Iterator for ResultPages<'_, S> {
    type Item = Result<String, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(url) = self.pending.pop_front() {
                return Some(Ok(url));
            }

            let page_url = self.next_url.take()?;
            let html = match self.source.fetch(&page_url) {
                Ok(html) => html,
                Err(e) => return Some(Err(e)),
            };
            self.pages_fetched += 1;

            let page = self.list.parse_page(&html);
            tracing::debug!(
                url = %page_url,
                items = page.items.len(),
                has_next = page.next.is_some(),
                "result page parsed"
            );

            self.pending.extend(page.items);
            self.next_url = page.next;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    pub(crate) const BASE: &str = "https://www.immobilienscout24.de";

    /// Canned pages keyed by url; records every fetch.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub pages: HashMap<String, String>,
        pub fetched: RefCell<Vec<String>>,
    }

    impl FakeSource {
        pub fn with(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }
    }

    impl PageSource for FakeSource {
        fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
            self.fetched.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    pub(crate) fn results_html(exposes: &[&str], next: Option<&str>) -> String {
        let entries: String = exposes
            .iter()
            .map(|href| {
                format!(
                    r#"<li class="result-list__listing"><div class="result-list-entry__data">
                    <a class="result-list-entry__brand-title-container" href="{href}">Wohnung</a>
                    </div></li>"#
                )
            })
            .collect();
        let paging = next
            .map(|href| format!(r#"<a data-is24-qa="paging_bottom_next" href="{href}">Weiter</a>"#))
            .unwrap_or_default();
        format!("<html><body><ul>{entries}</ul>{paging}</body></html>")
    }

    fn list() -> ResultList {
        ResultList::new(Selectors::new().unwrap(), BASE).unwrap()
    }

    #[test]
    fn parses_items_and_next() {
        let html = results_html(
            &["/expose/1", "/expose/2"],
            Some("/Suche/S-T/P-2/Wohnung-Kauf/Nordrhein-Westfalen/Muenster"),
        );
        let page = list().parse_page(&html);

        assert_eq!(
            page.items,
            vec![
                "https://www.immobilienscout24.de/expose/1",
                "https://www.immobilienscout24.de/expose/2",
            ]
        );
        assert_eq!(
            page.next.as_deref(),
            Some("https://www.immobilienscout24.de/Suche/S-T/P-2/Wohnung-Kauf/Nordrhein-Westfalen/Muenster")
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ResultList::new(Selectors::new().unwrap(), "not a url").err().unwrap();
        assert!(matches!(err, ScrapeError::InvalidUrl(_)));
    }

    #[test]
    fn last_page_has_no_next() {
        let page = list().parse_page(&results_html(&["/expose/1"], None));
        assert_eq!(page.next, None);
    }

    #[test]
    fn anchors_outside_result_entries_are_ignored() {
        let html = r#"<html><body>
            <a class="result-list-entry__brand-title-container" href="/expose/9">stray</a>
            <div class="result-list-entry__data"><a class="other" href="/expose/8">x</a></div>
            </body></html>"#;
        assert!(list().parse_page(html).items.is_empty());
    }

    #[test]
    fn walks_pages_lazily() {
        let first = format!("{BASE}/Suche/S-T/Wohnung-Kauf");
        let second = format!("{BASE}/Suche/S-T/P-2/Wohnung-Kauf");
        let source = FakeSource::default()
            .with(&first, results_html(&["/expose/1", "/expose/2"], Some("/Suche/S-T/P-2/Wohnung-Kauf")))
            .with(&second, results_html(&["/expose/3"], None));

        let list = list();
        let mut pages = list.pages(&source, &first);

        assert_eq!(pages.next().unwrap().unwrap(), format!("{BASE}/expose/1"));
        assert_eq!(pages.next().unwrap().unwrap(), format!("{BASE}/expose/2"));
        assert_eq!(pages.pages_fetched(), 1);

        assert_eq!(pages.next().unwrap().unwrap(), format!("{BASE}/expose/3"));
        assert_eq!(pages.pages_fetched(), 2);
        assert!(pages.next().is_none());
    }

    #[test]
    fn take_stops_before_next_page() {
        let first = format!("{BASE}/Suche/S-T/Wohnung-Kauf");
        let source = FakeSource::default().with(
            &first,
            results_html(&["/expose/1", "/expose/2"], Some("/Suche/S-T/P-2/Wohnung-Kauf")),
        );

        let list = list();
        let urls: Vec<_> = list.pages(&source, &first).take(2).collect();

        assert_eq!(urls.len(), 2);
        assert_eq!(source.fetched.borrow().len(), 1);
    }

    #[test]
    fn one_selector_table_serves_both_parsers() {
        use crate::scrape::expose::tests::expose_html;
        use crate::scrape::ExposeParser;

        let selectors = Selectors::new().unwrap();
        let list = ResultList::new(selectors.clone(), BASE).unwrap();
        let parser = ExposeParser::new(selectors, "Germany");

        let page = list.parse_page(&results_html(&["/expose/11"], None));
        let listing = parser
            .parse(&expose_html("11", &["Immobilien", "Bayern"]), &page.items[0], 0.0)
            .unwrap();

        assert_eq!(listing.id, "11");
        assert_eq!(listing.url, format!("{BASE}/expose/11"));
        assert_eq!(listing.address.state.as_deref(), Some("Bayern"));
    }

    #[test]
    fn fetch_error_surfaces_once() {
        let source = FakeSource::default();
        let list = list();
        let mut pages = list.pages(&source, "https://www.immobilienscout24.de/missing");

        assert!(matches!(pages.next(), Some(Err(ScrapeError::Status { status: 404, .. }))));
        assert!(pages.next().is_none());
    }
}
