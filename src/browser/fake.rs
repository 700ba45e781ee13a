//! A scripted stand-in for a browser, for driving job boards in tests.

use std::{cell::{Ref, RefCell}, collections::VecDeque, rc::Rc};

use super::{BrowserSession, By, PageElement, SessionError};


/// Everything the fake page knows, plus a record of what was done to it.
#[derive(Debug, Default)]
pub(crate) struct FakePage {
    pub(crate) listing: Option<By>,
    /// Size of the listing on each successive lookup. The last size sticks.
    pub(crate) listing_sizes: VecDeque<usize>,
    pub(crate) frame: String,
    pub(crate) description: Option<By>,
    /// Description html per listing position. None makes the description missing.
    pub(crate) descriptions: Vec<Option<String>>,
    /// Clicks on this locator count as closing the overlay.
    pub(crate) overlay: Option<By>,
    /// Top-level locators that match nothing. Everything else matches one element.
    pub(crate) absent: Vec<By>,
    /// The job frame's `src`. A card click points it at that card's posting.
    pub(crate) frame_src: Option<String>,
    /// Card clicks leave `frame_src` alone, as if the posting never loaded.
    pub(crate) frame_sticks: bool,

    pub(crate) visited: Vec<String>,
    pub(crate) filled: Vec<(String, String)>,
    pub(crate) selected: Vec<(By, String)>,
    pub(crate) clicked: Vec<By>,
    pub(crate) opened_jobs: Vec<usize>,
    pub(crate) overlays_closed: usize,
    pub(crate) listing_lookups: usize,
    pub(crate) frames: Vec<String>,
    pub(crate) closed: bool,
    pub(crate) current_job: Option<usize>
}


impl FakePage {
    fn listing_size(&mut self) -> usize {
        self.listing_lookups += 1;
        if self.listing_sizes.len() > 1 {
            self.listing_sizes.pop_front().unwrap_or_default()
        } else {
            self.listing_sizes.front().copied().unwrap_or_default()
        }
    }

    fn in_job_frame(&self) -> bool {
        self.frames.last() == Some(&self.frame)
    }
}


pub(crate) enum FakeElement {
    Card { page: Rc<RefCell<FakePage>>, index: usize },
    Description { page: Rc<RefCell<FakePage>> },
    Other { page: Rc<RefCell<FakePage>>, by: By }
}


impl PageElement for FakeElement {
    fn click(&self) -> Result<(), SessionError> {
        match self {
            FakeElement::Card { page, index } => {
                let mut page = page.borrow_mut();
                page.current_job = Some(*index);
                page.opened_jobs.push(*index);
                if !page.frame_sticks {
                    page.frame_src = Some(format!("/viewjob?jk={index}"));
                }
            }
            FakeElement::Description { .. } => {}
            FakeElement::Other { page, by } => {
                let mut page = page.borrow_mut();
                if page.overlay.as_ref() == Some(by) {
                    page.overlays_closed += 1;
                }
                page.clicked.push(by.clone());
            }
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, SessionError> {
        match self {
            FakeElement::Description { page } if name == "innerHTML" => {
                let page = page.borrow();
                let job = page.current_job.and_then(|index| page.descriptions.get(index).cloned().flatten());
                Ok(job)
            }
            FakeElement::Other { page, by } if name == "src" => {
                let page = page.borrow();
                Ok((*by == By::id(page.frame.as_str())).then(|| page.frame_src.clone()).flatten())
            }
            _ => Ok(None)
        }
    }
}


#[derive(Default)]
pub(crate) struct FakeSession {
    page: Rc<RefCell<FakePage>>
}


impl FakeSession {
    pub(crate) fn new(page: FakePage) -> Self {
        Self { page: Rc::new(RefCell::new(page)) }
    }

    pub(crate) fn page(&self) -> Ref<'_, FakePage> {
        self.page.borrow()
    }
}


impl BrowserSession for FakeSession {
    type Element = FakeElement;

    fn navigate_to(&mut self, url: &str) -> Result<(), SessionError> {
        let mut page = self.page.borrow_mut();
        page.frames.clear();
        page.visited.push(url.to_string());
        Ok(())
    }

    fn wait_until_loaded(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn fill_field(&mut self, id: &str, value: &str) -> Result<(), SessionError> {
        self.page.borrow_mut().filled.push((id.to_string(), value.to_string()));
        Ok(())
    }

    fn select_option(&mut self, select: &By, value: &str) -> Result<(), SessionError> {
        self.page.borrow_mut().selected.push((select.clone(), value.to_string()));
        Ok(())
    }

    fn list_elements(&mut self, by: &By) -> Result<Vec<FakeElement>, SessionError> {
        let mut page = self.page.borrow_mut();
        if !page.frames.is_empty() || page.absent.contains(by) {
            return Ok(Vec::new());
        }
        if page.listing.as_ref() != Some(by) {
            return Ok(vec![FakeElement::Other { page: self.page.clone(), by: by.clone() }]);
        }
        let size = page.listing_size();
        Ok((0..size).map(|index| FakeElement::Card { page: self.page.clone(), index }).collect())
    }

    fn find_element(&mut self, by: &By) -> Result<FakeElement, SessionError> {
        let page = self.page.borrow();
        if page.in_job_frame() && page.description.as_ref() == Some(by) {
            let present = page.current_job.and_then(|index| page.descriptions.get(index)).map_or(false, Option::is_some);
            if present {
                return Ok(FakeElement::Description { page: self.page.clone() });
            }
            return Err(SessionError::ElementNotFound(by.clone()));
        }
        if page.frames.is_empty() && page.listing.as_ref() == Some(by) {
            drop(page);
            return self
                .list_elements(by)?
                .into_iter()
                .next()
                .ok_or_else(|| SessionError::ElementNotFound(by.clone()));
        }
        if page.frames.is_empty() && !page.absent.contains(by) {
            return Ok(FakeElement::Other { page: self.page.clone(), by: by.clone() });
        }
        Err(SessionError::ElementNotFound(by.clone()))
    }

    fn wait_for_change(&mut self, by: &By, name: &str, previous: &str) -> Result<bool, SessionError> {
        let current = self.find_element(by)?.attribute(name)?;
        Ok(current.as_deref() != Some(previous))
    }

    fn switch_to_frame(&mut self, name: &str) -> Result<(), SessionError> {
        let mut page = self.page.borrow_mut();
        if page.frames.is_empty() && page.frame == name {
            page.frames.push(name.to_string());
            Ok(())
        } else {
            Err(SessionError::FrameNotFound(name.to_string()))
        }
    }

    fn switch_to_parent_frame(&mut self) -> Result<(), SessionError> {
        self.page.borrow_mut().frames.pop();
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        self.page.borrow_mut().closed = true;
        Ok(())
    }
}
