use std::path::Path;

use anyhow::Context;
use fxhash::FxHashSet;


/// Returns every keyword that occurs in `text`, in the order the keywords were given.
///
/// Matching is a plain case-sensitive substring search. There is no tokenization, so
/// `"go"` matches inside `"undergoing"`. Keywords are expected to be non-empty; an empty
/// keyword would match any text.
pub(crate) fn match_keywords<'k, K: AsRef<str>>(text: &str, keywords: &'k [K]) -> Vec<&'k str> {
    keywords
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|keyword| text.contains(keyword))
        .collect()
}


/// The list of words to look for in job descriptions.
///
/// Read once at startup and never modified. Entries are non-empty and unique, and keep
/// the order they had in the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Buzzwords {
    words: Vec<String>
}


impl Buzzwords {
    /// Reads a buzzwords file with one keyword per line.
    pub(crate) fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read buzzwords from {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Trailing whitespace is stripped from every line. Blank lines and repeated
    /// keywords are dropped, the first occurrence wins.
    pub(crate) fn parse(contents: &str) -> Self {
        let mut seen = FxHashSet::default();
        let words = contents
            .lines()
            .map(str::trim_end)
            .filter(|word| !word.is_empty())
            .filter(|word| seen.insert(*word))
            .map(str::to_string)
            .collect();
        Self { words }
    }

    pub(crate) fn find_in(&self, text: &str) -> Vec<&str> {
        match_keywords(text, &self.words)
    }

    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}


/// Takes the keywords as given. Empty ones and repeats are dropped, nothing is trimmed.
impl<S: Into<String>> FromIterator<S> for Buzzwords {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut seen = FxHashSet::default();
        let words = iter
            .into_iter()
            .map(Into::into)
            .filter(|word: &String| !word.is_empty() && seen.insert(word.clone()))
            .collect();
        Self { words }
    }
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn keeps_keyword_order_not_text_order() {
        let keywords = ["rust", "go", "sql"];
        assert_eq!(match_keywords("sql then go then rust", &keywords), ["rust", "go", "sql"]);
    }

    #[test]
    fn no_keywords_means_no_matches() {
        let keywords: [&str; 0] = [];
        assert!(match_keywords("anything at all", &keywords).is_empty());
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert!(match_keywords("", &["java", "python"]).is_empty());
    }

    #[test]
    fn membership_follows_substring_presence() {
        let text = "Experience with Kubernetes and Terraform";
        let keywords = ["Kubernetes", "Docker", "Terraform", "form"];
        let found = match_keywords(text, &keywords);
        for keyword in keywords {
            assert_eq!(found.contains(&keyword), text.contains(keyword), "{keyword}");
        }
    }

    #[test]
    fn result_is_a_subsequence_of_the_keywords() {
        let keywords = ["a", "x", "b", "a", "c"];
        let found = match_keywords("abc", &keywords);
        assert_eq!(found, ["a", "b", "a", "c"]);

        let mut rest = keywords.iter();
        for word in &found {
            assert!(rest.any(|k| k == word));
        }
    }

    #[test]
    fn matching_is_repeatable() {
        let keywords = ["cloud", "aws"];
        let text = "aws cloud";
        assert_eq!(match_keywords(text, &keywords), match_keywords(text, &keywords));
    }

    #[test]
    fn case_sensitive() {
        assert!(match_keywords("Python", &["python"]).is_empty());
        assert_eq!(match_keywords("python", &["python"]), ["python"]);
    }

    #[test]
    fn matches_inside_words() {
        assert_eq!(match_keywords("undergoing", &["go"]), ["go"]);
    }

    #[test]
    fn capitalised_mentions_do_not_count() {
        let keywords = ["java", "python", "cloud"];
        let text = "We use Python and Java daily, no cloud experience needed.";
        assert_eq!(match_keywords(text, &keywords), ["cloud"]);
    }

    #[test]
    fn parse_strips_trailing_whitespace_only() {
        let words = Buzzwords::parse("rust  \n  go\t\r\nc++\n");
        assert_eq!(words.words, ["rust", "  go", "c++"]);
    }

    #[test]
    fn parse_skips_blank_lines_and_duplicates() {
        let words = Buzzwords::parse("java\n\n   \njava\npython\njava \n");
        assert_eq!(words.words, ["java", "python"]);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn find_in_reports_each_keyword_once() {
        let words: Buzzwords = ["go", "rust", "go"].into_iter().collect();
        assert_eq!(words.find_in("go go go, rust"), ["go", "rust"]);
    }

    #[test]
    fn collected_keywords_are_kept_verbatim() {
        let words: Buzzwords = ["c++ ", "line\nbreak", "", "c++ "].into_iter().collect();
        assert_eq!(words.words, ["c++ ", "line\nbreak"]);
        assert_eq!(words.find_in("line\nbreak"), ["line\nbreak"]);
    }

    #[test]
    fn reads_keywords_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "docker").unwrap();
        writeln!(file, "kubernetes   ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "rust").unwrap();

        let words = Buzzwords::from_file(file.path()).unwrap();
        assert_eq!(words.words, ["docker", "kubernetes", "rust"]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let err = Buzzwords::from_file(&path).unwrap_err();
        assert!(format!("{err}").contains("nope.txt"));
    }
}
