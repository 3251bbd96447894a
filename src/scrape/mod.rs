mod client;
mod expose;
mod result_list;
mod scrape_error;
mod selectors;
mod text;

pub use client::{HttpClient, PageSource};
pub use expose::ExposeParser;
pub use result_list::ResultList;
pub use scrape_error::ScrapeError;
pub use selectors::Selectors;

#[cfg(test)]
pub(crate) use expose::tests as expose_tests;
#[cfg(test)]
pub(crate) use result_list::tests as result_list_tests;
