use std::{path::PathBuf, sync::Arc, time::{Duration, Instant}};

use anyhow::anyhow;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::{debug, warn};

use super::{script::{self, Action, Reply}, BrowserSession, By, PageElement, SessionError};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Chrome is killed if it sends nothing for this long. Pages can sit idle between visits.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);


#[derive(Debug, Clone)]
pub(crate) struct ChromeOptions {
    /// The Chrome/Chromium executable. Found automatically when None.
    pub(crate) chrome_path: Option<PathBuf>,
    pub(crate) headless: bool,
    /// How long to wait for elements and frames to show up.
    pub(crate) element_timeout: Duration
}


fn run_script(tab: &Tab, frames: &[String], by: &By, action: Action) -> Result<Reply, SessionError> {
    let js = script::build(frames, by, action);
    let result = tab.evaluate(&js, false)?;
    script::parse_reply(result.value)?.check()
}


/// A positional handle: the `index`th match of `by` inside `frames`.
///
/// The element is looked up again every time it is used, so a handle whose position has
/// disappeared from the page reports [`SessionError::StaleElement`].
pub(crate) struct ChromeElement {
    tab: Arc<Tab>,
    frames: Vec<String>,
    by: By,
    index: usize
}


impl ChromeElement {
    fn stale(&self, len: usize) -> SessionError {
        SessionError::StaleElement { by: self.by.clone(), index: self.index, len }
    }

    fn run(&self, action: Action) -> Result<Reply, SessionError> {
        let reply = run_script(&self.tab, &self.frames, &self.by, action)?;
        if reply.count <= self.index {
            return Err(self.stale(reply.count));
        }
        Ok(reply)
    }

    fn set_value(&self, value: &str) -> Result<(), SessionError> {
        self.run(Action::SetValue { index: self.index, value })?;
        Ok(())
    }

    /// Clicks through the DevTools input domain so the page sees a real mouse event.
    fn click_native(&self) -> Result<(), SessionError> {
        self.run(Action::Count)?;
        let elements = match &self.by {
            By::XPath(xpath) => self.tab.find_elements_by_xpath(xpath)?,
            By::Css(selector) => self.tab.find_elements(selector)?,
            By::Id(id) => self.tab.find_elements(&format!("[id={}]", Value::from(id.as_str())))?
        };
        let len = elements.len();
        let element = elements.into_iter().nth(self.index).ok_or_else(|| self.stale(len))?;
        element.click()?;
        Ok(())
    }
}


impl PageElement for ChromeElement {
    fn click(&self) -> Result<(), SessionError> {
        if self.frames.is_empty() {
            self.click_native()
        } else {
            self.run(Action::Click { index: self.index })?;
            Ok(())
        }
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, SessionError> {
        Ok(self.run(Action::Read { index: self.index, name })?.value)
    }
}


/// A single Chrome tab driven over the DevTools protocol.
pub(crate) struct ChromeSession {
    tab: Arc<Tab>,
    /// Taken on close. Dropping the browser kills the Chrome process.
    browser: Option<Browser>,
    /// Names of the frames entered so far, outermost first.
    frames: Vec<String>,
    element_timeout: Duration
}


impl ChromeSession {
    pub(crate) fn launch(options: &ChromeOptions) -> Result<Self, SessionError> {
        let launch_options = LaunchOptions::default_builder()
            .path(options.chrome_path.clone())
            .headless(options.headless)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Invalid browser launch options: {e}"))?;

        let browser = Browser::new(launch_options)?;
        let tab = browser.new_tab()?;
        tab.set_default_timeout(options.element_timeout);
        debug!(headless = options.headless, "Chrome started");

        Ok(Self { tab, browser: Some(browser), frames: Vec::new(), element_timeout: options.element_timeout })
    }

    fn element_at(&self, by: &By, index: usize) -> ChromeElement {
        ChromeElement { tab: self.tab.clone(), frames: self.frames.clone(), by: by.clone(), index }
    }

    /// Retries `attempt` until it yields something or the element timeout runs out.
    fn poll<T>(&self, mut attempt: impl FnMut() -> Result<Option<T>, SessionError>) -> Result<Option<T>, SessionError> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            if let Some(found) = attempt()? {
                return Ok(Some(found));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}


impl BrowserSession for ChromeSession {
    type Element = ChromeElement;

    fn navigate_to(&mut self, url: &str) -> Result<(), SessionError> {
        self.frames.clear();
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        debug!(url, "Navigated");
        Ok(())
    }

    fn wait_until_loaded(&mut self) -> Result<(), SessionError> {
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn fill_field(&mut self, id: &str, value: &str) -> Result<(), SessionError> {
        self.find_element(&By::id(id))?.set_value(value)
    }

    fn select_option(&mut self, select: &By, value: &str) -> Result<(), SessionError> {
        let element = self.find_element(select)?;
        element.set_value(value)?;
        if element.attribute("value")?.as_deref() != Some(value) {
            return Err(SessionError::ElementNotFound(By::css(format!("option[value={}]", Value::from(value)))));
        }
        Ok(())
    }

    fn list_elements(&mut self, by: &By) -> Result<Vec<ChromeElement>, SessionError> {
        let count = run_script(&self.tab, &self.frames, by, Action::Count)?.count;
        Ok((0..count).map(|index| self.element_at(by, index)).collect())
    }

    fn find_element(&mut self, by: &By) -> Result<ChromeElement, SessionError> {
        let found = self.poll(|| {
            let reply = run_script(&self.tab, &self.frames, by, Action::Count)?;
            Ok((reply.count > 0).then_some(()))
        })?;
        match found {
            Some(()) => Ok(self.element_at(by, 0)),
            None => Err(SessionError::ElementNotFound(by.clone()))
        }
    }

    fn wait_for_change(&mut self, by: &By, name: &str, previous: &str) -> Result<bool, SessionError> {
        let changed = self.poll(|| {
            let reply = run_script(&self.tab, &self.frames, by, Action::Read { index: 0, name })?;
            Ok((reply.count > 0 && reply.value.as_deref() != Some(previous)).then_some(()))
        })?;
        Ok(changed.is_some())
    }

    fn switch_to_frame(&mut self, name: &str) -> Result<(), SessionError> {
        let mut frames = self.frames.clone();
        frames.push(name.to_string());

        let found = self.poll(|| match run_script(&self.tab, &frames, &By::css("html"), Action::Count) {
            Ok(_) => Ok(Some(())),
            Err(SessionError::FrameNotFound(_)) => Ok(None),
            Err(e) => Err(e)
        })?;
        if found.is_none() {
            return Err(SessionError::FrameNotFound(name.to_string()));
        }
        self.frames = frames;
        Ok(())
    }

    fn switch_to_parent_frame(&mut self) -> Result<(), SessionError> {
        self.frames.pop();
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = self.tab.close(true);
        drop(browser);
        closed?;
        debug!("Chrome closed");
        Ok(())
    }
}


impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close the browser cleanly: {e}");
        }
    }
}
