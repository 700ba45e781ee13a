//! Page scripts for the Chrome session.
//!
//! Chrome's DOM domain only sees the top-level document, so anything inside a frame
//! is located and driven from JavaScript. Every script walks the frame chain, resolves
//! the locator against the innermost document and answers with a JSON string.

use serde::Deserialize;
use serde_json::Value;

use super::{By, SessionError};

const TEMPLATE: &str = r#"(() => {
    let doc = document;
    for (const name of %FRAMES%) {
        const frame = Array.from(doc.querySelectorAll("iframe, frame"))
            .find((f) => f.name === name || f.id === name);
        const inner = frame && frame.contentDocument;
        if (!inner) return JSON.stringify({ missingFrame: name });
        doc = inner;
    }
    let nodes;
    try {
        nodes = %RESOLVE%;
    } catch (e) {
        return JSON.stringify({ error: String(e) });
    }
    const count = nodes.length;
    %ACTION%
})()"#;

const RESOLVE_ID: &str = r#"(() => {
            const el = doc.getElementById(%ARG%);
            return el ? [el] : [];
        })()"#;

const RESOLVE_CSS: &str = r#"Array.from(doc.querySelectorAll(%ARG%))"#;

const RESOLVE_XPATH: &str = r#"(() => {
            const found = doc.evaluate(%ARG%, doc, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
            const out = [];
            for (let i = 0; i < found.snapshotLength; i++) out.push(found.snapshotItem(i));
            return out;
        })()"#;

const ACTION_COUNT: &str = r#"return JSON.stringify({ count });"#;

const ACTION_READ: &str = r#"const el = nodes[%INDEX%];
    if (!el) return JSON.stringify({ count });
    let value = el[%NAME%];
    if (typeof value !== "string") value = el.getAttribute(%NAME%);
    return JSON.stringify({ count, value });"#;

const ACTION_CLICK: &str = r#"const el = nodes[%INDEX%];
    if (!el) return JSON.stringify({ count });
    el.click();
    return JSON.stringify({ count });"#;

const ACTION_SET_VALUE: &str = r#"const el = nodes[%INDEX%];
    if (!el) return JSON.stringify({ count });
    el.focus();
    el.value = %VALUE%;
    el.dispatchEvent(new Event("input", { bubbles: true }));
    el.dispatchEvent(new Event("change", { bubbles: true }));
    return JSON.stringify({ count });"#;


#[derive(Debug, Clone, Copy)]
pub(super) enum Action<'a> {
    Count,
    Read { index: usize, name: &'a str },
    Click { index: usize },
    SetValue { index: usize, value: &'a str }
}


/// What a page script reports back.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(super) struct Reply {
    #[serde(default)]
    pub(super) missing_frame: Option<String>,
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) count: usize,
    #[serde(default)]
    pub(super) value: Option<String>
}


impl Reply {
    /// Turns frame and selector failures into errors, leaving the match count to the caller.
    pub(super) fn check(self) -> Result<Self, SessionError> {
        if let Some(frame) = self.missing_frame {
            return Err(SessionError::FrameNotFound(frame));
        }
        if let Some(error) = self.error {
            return Err(SessionError::Script(error));
        }
        Ok(self)
    }
}


fn js_string(s: &str) -> String {
    Value::from(s).to_string()
}


pub(super) fn build(frames: &[String], by: &By, action: Action) -> String {
    let resolve = match by {
        By::Id(id) => RESOLVE_ID.replace("%ARG%", &js_string(id)),
        By::Css(selector) => RESOLVE_CSS.replace("%ARG%", &js_string(selector)),
        By::XPath(xpath) => RESOLVE_XPATH.replace("%ARG%", &js_string(xpath))
    };
    let action = match action {
        Action::Count => ACTION_COUNT.to_string(),
        Action::Read { index, name } => ACTION_READ
            .replace("%INDEX%", &index.to_string())
            .replace("%NAME%", &js_string(name)),
        Action::Click { index } => ACTION_CLICK.replace("%INDEX%", &index.to_string()),
        Action::SetValue { index, value } => ACTION_SET_VALUE
            .replace("%INDEX%", &index.to_string())
            .replace("%VALUE%", &js_string(value))
    };

    TEMPLATE
        .replace("%FRAMES%", &Value::from(frames.to_vec()).to_string())
        .replace("%RESOLVE%", &resolve)
        .replace("%ACTION%", &action)
}


/// Decodes the value returned by `Runtime.evaluate` for a script made by [`build`].
pub(super) fn parse_reply(value: Option<Value>) -> Result<Reply, SessionError> {
    match value {
        Some(Value::String(json)) => serde_json::from_str(&json)
            .map_err(|e| SessionError::Script(format!("unreadable reply `{json}`: {e}"))),
        other => Err(SessionError::Script(format!("expected a JSON string, got {other:?}")))
    }
}
