use serde::Deserialize;
use url::Url;
use validator::Validate;

use crate::browser::{BrowserSession, By, SessionError};

pub(crate) mod indeed;


/// How search results should be ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortOrder {
    /// Newest postings first
    #[default]
    Date,
    /// The board's own ranking
    Relevance
}


/// What to type into a job board's search form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct SearchQuery {
    /// Words that every posting must contain.
    #[validate(length(min = 1))]
    pub(crate) what: String,
    /// City, region or "remote". Empty searches everywhere.
    #[serde(rename = "where")]
    pub(crate) location: String,
    /// Words that no posting may contain.
    pub(crate) exclude: String,
    #[validate(range(min = 10, max = 50))]
    pub(crate) results_per_page: u32,
    pub(crate) sort: SortOrder
}


impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            what: "software engineer intern".into(),
            location: String::new(),
            exclude: String::new(),
            results_per_page: 20,
            sort: SortOrder::Date
        }
    }
}


/// A site that lists jobs.
///
/// A board knows how to submit its search form, where the result cards are, and how to
/// read the posting that opens when a card is clicked. It never retries: errors go back
/// to the caller.
pub(crate) trait JobBoard {
    const NAME: &'static str;

    fn start_url(&self) -> &Url;

    /// Opens the search page, fills in `query` and submits it.
    fn search<S: BrowserSession>(&self, session: &mut S, query: &SearchQuery) -> Result<(), SessionError>;

    /// Locates the clickable result cards on a results page.
    fn job_cards(&self) -> By;

    /// Something that changes whenever a different posting opens, such as the address of
    /// the posting viewer. Read before a card is clicked. None if nothing is open yet.
    fn posting_marker<S: BrowserSession>(&self, session: &mut S) -> Result<Option<String>, SessionError>;

    /// Waits for the posting opened by the last click to replace the one behind `previous`.
    ///
    /// Returns false if the old posting was still showing when the wait ran out.
    fn wait_for_posting<S: BrowserSession>(&self, session: &mut S, previous: Option<&str>) -> Result<bool, SessionError>;

    /// Reads the visible text of the posting opened by the last card click.
    ///
    /// The session is back in the top-level document when this returns, even on error.
    fn read_description<S: BrowserSession>(&self, session: &mut S) -> Result<String, SessionError>;

    /// Closes whatever overlay the board puts over the results.
    ///
    /// Returns false if there was no overlay to close.
    fn dismiss_overlay<S: BrowserSession>(&self, session: &mut S) -> Result<bool, SessionError>;
}
