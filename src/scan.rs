use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    browser::{BrowserSession, PageElement, SessionError},
    buzzwords::Buzzwords,
    job_boards::{JobBoard, SearchQuery}
};


/// The buzzwords found in one job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct JobMatch {
    /// Where the card sat in the result list, counting from 0.
    pub(crate) position: usize,
    pub(crate) keywords: Vec<String>
}


/// Every posting that mentioned at least one buzzword, in the order they were visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct RunResult {
    jobs: Vec<JobMatch>
}


impl RunResult {
    /// Records a posting's matches. Postings without any match are not recorded.
    pub(crate) fn record(&mut self, position: usize, keywords: Vec<&str>) -> Option<&JobMatch> {
        if keywords.is_empty() {
            return None;
        }
        self.jobs.push(JobMatch { position, keywords: keywords.into_iter().map(str::to_string).collect() });
        self.jobs.last()
    }

    pub(crate) fn jobs(&self) -> &[JobMatch] {
        &self.jobs
    }

    pub(crate) fn keyword_lists(&self) -> Vec<Vec<String>> {
        self.jobs.iter().map(|job| job.keywords.clone()).collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Cards on the page when the scan started.
    pub(crate) listed: usize,
    pub(crate) visited: usize,
    pub(crate) matched: usize,
    /// Cards skipped because the list had changed under us.
    pub(crate) recovered: usize
}


/// The outcome of trying to pick a card off a freshly fetched result list.
pub(crate) enum Selection {
    /// The card was clicked and its posting is opening.
    Opened,
    /// The list no longer reaches this far.
    ListingChanged { len: usize }
}


/// Walks a board's result list one card at a time.
pub(crate) struct Scanner<'a, S, B> {
    session: &'a mut S,
    board: &'a B,
    /// Wait after each posting, to let the page settle and to go easy on the site.
    pause: Duration
}


impl<'a, S: BrowserSession, B: JobBoard> Scanner<'a, S, B> {
    pub(crate) fn new(session: &'a mut S, board: &'a B, pause: Duration) -> Self {
        Self { session, board, pause }
    }

    /// Fetches the result list again and clicks the card at `index`.
    ///
    /// Cards are never reused between lookups: the page swaps them out as postings load.
    pub(crate) fn select_entry(&mut self, index: usize) -> Result<Selection, SessionError> {
        let cards = self.session.list_elements(&self.board.job_cards())?;
        let len = cards.len();
        let Some(card) = cards.into_iter().nth(index) else {
            return Ok(Selection::ListingChanged { len });
        };
        match card.click() {
            Ok(()) => Ok(Selection::Opened),
            Err(SessionError::StaleElement { len, .. }) => Ok(Selection::ListingChanged { len }),
            Err(e) => Err(e)
        }
    }

    /// Visits every card on the current results page and records the postings that
    /// mention a buzzword.
    ///
    /// Matches go into `results` as they are found, so they survive an error part way.
    /// The only error handled here is a card that has vanished from the list; anything
    /// else ends the scan.
    pub(crate) fn scan(&mut self, buzzwords: &Buzzwords, results: &mut RunResult) -> Result<ScanStats, SessionError> {
        let mut stats = ScanStats {
            listed: self.session.list_elements(&self.board.job_cards())?.len(),
            ..Default::default()
        };
        info!(board = B::NAME, cards = stats.listed, "Scanning results");

        for index in 0..stats.listed {
            let shown = self.board.posting_marker(&mut *self.session)?;
            match self.select_entry(index)? {
                Selection::Opened => {}
                Selection::ListingChanged { len } => {
                    let closed = self.board.dismiss_overlay(&mut *self.session)?;
                    warn!(index, len, closed_overlay = closed, "Result list changed, skipping card");
                    stats.recovered += 1;
                    continue;
                }
            }

            if !self.board.wait_for_posting(&mut *self.session, shown.as_deref())? {
                warn!(index, "Posting did not change after the click, reading what is shown");
            }
            let description = self.board.read_description(&mut *self.session)?;
            stats.visited += 1;
            debug!(index, bytes = description.len(), "Read posting");

            if let Some(job) = results.record(index, buzzwords.find_in(&description)) {
                info!(index, keywords = ?job.keywords, "Buzzwords found");
                stats.matched += 1;
            }

            if !self.pause.is_zero() {
                std::thread::sleep(self.pause);
            }
        }

        info!(
            visited = stats.visited,
            matched = stats.matched,
            recovered = stats.recovered,
            "Scan finished"
        );
        Ok(stats)
    }
}


/// Runs the board's search, then scans the results page.
pub(crate) fn search_and_scan<S: BrowserSession, B: JobBoard>(
    session: &mut S,
    board: &B,
    query: &SearchQuery,
    buzzwords: &Buzzwords,
    pause: Duration,
    results: &mut RunResult
) -> Result<ScanStats, SessionError> {
    info!(board = B::NAME, url = %board.start_url(), what = %query.what, "Searching");
    board.search(session, query)?;
    Scanner::new(session, board, pause).scan(buzzwords, results)
}


/// Like [`search_and_scan`], but closes the session afterwards whether or not the scan
/// went through.
pub(crate) fn scan_and_close<S: BrowserSession, B: JobBoard>(
    session: &mut S,
    board: &B,
    query: &SearchQuery,
    buzzwords: &Buzzwords,
    pause: Duration,
    results: &mut RunResult
) -> anyhow::Result<ScanStats> {
    let scanned = search_and_scan(session, board, query, buzzwords, pause, results);
    let closed = session.close();

    match scanned {
        Ok(stats) => {
            closed.context("Failed to close the browser")?;
            Ok(stats)
        }
        Err(e) => {
            if let Err(close_error) = closed {
                warn!("Failed to close the browser: {close_error}");
            }
            Err(e).with_context(|| format!("Scanning {} failed", B::NAME))
        }
    }
}
