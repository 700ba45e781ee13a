use std::fmt;

pub(crate) mod chrome;
mod script;

#[cfg(test)]
pub(crate) mod fake;


/// How an element is located on the page (or inside the current frame).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum By {
    Id(String),
    Css(String),
    XPath(String)
}


impl By {
    pub(crate) fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub(crate) fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub(crate) fn xpath(xpath: impl Into<String>) -> Self {
        Self::XPath(xpath.into())
    }
}


impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id(id) => write!(f, "#{id}"),
            By::Css(selector) => write!(f, "css `{selector}`"),
            By::XPath(xpath) => write!(f, "xpath `{xpath}`")
        }
    }
}


#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionError {
    /// The element was captured at a position that the page no longer has.
    #[error("element {index} of {by} is gone, the page now has {len}")]
    StaleElement {
        by: By,
        index: usize,
        len: usize
    },
    #[error("no element matches {0}")]
    ElementNotFound(By),
    #[error("frame `{0}` was not found")]
    FrameNotFound(String),
    #[error("page script failed: {0}")]
    Script(String),
    #[error(transparent)]
    Browser(#[from] anyhow::Error)
}


/// Something on the page that can be clicked and read from.
pub(crate) trait PageElement {
    fn click(&self) -> Result<(), SessionError>;

    /// Reads a DOM property (such as `innerHTML`) or, failing that, an attribute.
    ///
    /// Returns None if the element has neither.
    fn attribute(&self, name: &str) -> Result<Option<String>, SessionError>;
}


/// A live browser session owned by a single caller.
///
/// Element lookups are relative to the current frame, which starts as the top-level
/// document and changes with [`BrowserSession::switch_to_frame`].
pub(crate) trait BrowserSession {
    type Element: PageElement;

    /// Loads `url` and waits for the navigation to finish.
    fn navigate_to(&mut self, url: &str) -> Result<(), SessionError>;

    /// Waits for a navigation started by the page itself, such as a form submission.
    fn wait_until_loaded(&mut self) -> Result<(), SessionError>;

    /// Types `value` into the input with the given id.
    fn fill_field(&mut self, id: &str, value: &str) -> Result<(), SessionError>;

    /// Picks the option with the given value in a `<select>`.
    fn select_option(&mut self, select: &By, value: &str) -> Result<(), SessionError>;

    /// Every element currently matching `by`, in document order. May be empty.
    fn list_elements(&mut self, by: &By) -> Result<Vec<Self::Element>, SessionError>;

    /// The first element matching `by`, waiting for it to appear.
    fn find_element(&mut self, by: &By) -> Result<Self::Element, SessionError>;

    /// Waits until the first element matching `by` has a `name` other than `previous`.
    ///
    /// Returns false if it still had `previous` when the wait ran out.
    fn wait_for_change(&mut self, by: &By, name: &str, previous: &str) -> Result<bool, SessionError>;

    fn switch_to_frame(&mut self, name: &str) -> Result<(), SessionError>;

    /// Leaves the current frame. Does nothing at the top-level document.
    fn switch_to_parent_frame(&mut self) -> Result<(), SessionError>;

    fn close(&mut self) -> Result<(), SessionError>;
}
