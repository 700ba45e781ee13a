use tracing::{debug, warn};
use url::Url;

use crate::{browser::{BrowserSession, By, PageElement, SessionError}, html_text::extract_text};

use super::{JobBoard, SearchQuery, SortOrder};

pub(crate) const ADVANCED_SEARCH_URL: &str = "https://www.indeed.com/advanced_search";

const WHAT_FIELD: &str = "as_and";
const EXCLUDE_FIELD: &str = "as_not";
const WHERE_FIELD: &str = "where";
const LIMIT_SELECT: &str = "limit";
const SORT_SELECT: &str = "sort";
const SUBMIT: &str = r#"//*[@id="fj"]"#;

pub(crate) const JOB_CARDS: &str = r#"//a[@data-hiring-event="false"]"#;
pub(crate) const JOB_FRAME: &str = "vjs-container-iframe";
pub(crate) const DESCRIPTION_ID: &str = "jobDescriptionText";
pub(crate) const OVERLAY_CLOSE: &str = r#"//button[@class="popover-x-button-close icl-CloseButton"]"#;


/// Indeed, searched through its advanced search form.
///
/// Postings open in an iframe next to the result list. Indeed sometimes covers the list
/// with a popover, which also reshuffles the cards underneath it.
#[derive(Debug, Clone)]
pub(crate) struct Indeed {
    start_url: Url
}


impl Indeed {
    pub(crate) fn new(start_url: Url) -> Self {
        Self { start_url }
    }
}


impl Default for Indeed {
    fn default() -> Self {
        Self::new(ADVANCED_SEARCH_URL.parse().expect("Built-in search URL should have been valid"))
    }
}


fn sort_value(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Date => "date",
        SortOrder::Relevance => ""
    }
}


fn description_html<S: BrowserSession>(session: &mut S) -> Result<String, SessionError> {
    let description = session.find_element(&By::id(DESCRIPTION_ID))?;
    Ok(description.attribute("innerHTML")?.unwrap_or_default())
}


impl JobBoard for Indeed {
    const NAME: &'static str = "indeed";

    fn start_url(&self) -> &Url {
        &self.start_url
    }

    fn search<S: BrowserSession>(&self, session: &mut S, query: &SearchQuery) -> Result<(), SessionError> {
        session.navigate_to(self.start_url.as_str())?;

        session.fill_field(WHAT_FIELD, &query.what)?;
        session.fill_field(EXCLUDE_FIELD, &query.exclude)?;
        session.fill_field(WHERE_FIELD, &query.location)?;
        session.select_option(&By::id(LIMIT_SELECT), &query.results_per_page.to_string())?;
        session.select_option(&By::id(SORT_SELECT), sort_value(query.sort))?;

        session.find_element(&By::xpath(SUBMIT))?.click()?;
        session.wait_until_loaded()?;

        match session.find_element(&self.job_cards()) {
            Ok(_) => debug!(what = %query.what, "Search results loaded"),
            Err(SessionError::ElementNotFound(_)) => warn!(what = %query.what, "Search returned no job cards"),
            Err(e) => return Err(e)
        }
        Ok(())
    }

    fn job_cards(&self) -> By {
        By::xpath(JOB_CARDS)
    }

    fn posting_marker<S: BrowserSession>(&self, session: &mut S) -> Result<Option<String>, SessionError> {
        match session.list_elements(&By::id(JOB_FRAME))?.into_iter().next() {
            Some(frame) => frame.attribute("src"),
            None => Ok(None)
        }
    }

    fn wait_for_posting<S: BrowserSession>(&self, session: &mut S, previous: Option<&str>) -> Result<bool, SessionError> {
        match previous {
            Some(src) => session.wait_for_change(&By::id(JOB_FRAME), "src", src),
            None => Ok(true)
        }
    }

    fn read_description<S: BrowserSession>(&self, session: &mut S) -> Result<String, SessionError> {
        session.switch_to_frame(JOB_FRAME)?;
        let html = description_html(session);
        let restored = session.switch_to_parent_frame();
        let html = html?;
        restored?;
        Ok(extract_text(&html))
    }

    fn dismiss_overlay<S: BrowserSession>(&self, session: &mut S) -> Result<bool, SessionError> {
        let Some(close) = session.list_elements(&By::xpath(OVERLAY_CLOSE))?.into_iter().next() else {
            return Ok(false);
        };
        close.click()?;
        Ok(true)
    }
}
