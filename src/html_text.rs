use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;

/// Elements whose text never shows up on the page.
const INVISIBLE: [&str; 4] = ["script", "style", "noscript", "template"];


fn blank_runs() -> &'static Regex {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    BLANK_RUNS.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}


/// Converts an HTML fragment into the text a reader would see.
///
/// Text nodes are concatenated in document order without separators, so adjacent
/// inline elements run together the way they do on screen.
pub(crate) fn extract_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);

    let text: String = fragment
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| INVISIBLE.contains(&element.name()));
            (!hidden).then(|| text.replace('\u{a0}', " "))
        })
        .collect();

    blank_runs()
        .replace_all(&text, "\n\n")
        .trim_matches('\n')
        .to_string()
}
