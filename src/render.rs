//! Card rendering: highlight segments, summary text, HTML output and the
//! details link.

use std::fmt::Write as _;

use serde::Serialize;

use crate::entry::Entry;
use crate::fold;

/// A run of text, flagged when it is a query match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Text split into plain and matched runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Highlighted(pub Vec<Segment>);

impl Highlighted {
    /// Split `text` around every case-insensitive literal match of `query`.
    pub fn new(text: &str, query: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for range in fold::match_ranges(text, query.trim()) {
            if range.start > cursor {
                segments.push(Segment {
                    text: text[cursor..range.start].to_string(),
                    matched: false,
                });
            }
            segments.push(Segment {
                text: text[range.clone()].to_string(),
                matched: true,
            });
            cursor = range.end;
        }
        if cursor < text.len() {
            segments.push(Segment {
                text: text[cursor..].to_string(),
                matched: false,
            });
        }
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn has_match(&self) -> bool {
        self.0.iter().any(|segment| segment.matched)
    }

    pub fn plain(&self) -> String {
        self.0.iter().map(|segment| segment.text.as_str()).collect()
    }

    /// Escaped HTML with matches wrapped in `<mark class="highlight">`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            if segment.matched {
                out.push_str("<mark class=\"highlight\">");
                out.push_str(&escape_html(&segment.text));
                out.push_str("</mark>");
            } else {
                out.push_str(&escape_html(&segment.text));
            }
        }
        out
    }
}

/// One visible entry, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Index of the entry in the loaded dataset.
    pub index: usize,
    pub name: Highlighted,
    pub description: String,
    pub tags: Vec<Highlighted>,
    pub details_url: String,
}

impl Card {
    pub fn new(index: usize, entry: &Entry, query: &str, details_base: &str) -> Self {
        Self {
            index,
            name: Highlighted::new(&entry.name, query),
            description: entry.description.trim().to_string(),
            tags: entry
                .tags
                .iter()
                .map(|tag| Highlighted::new(tag, query))
                .collect(),
            details_url: details_link(details_base, &entry.name),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<article class=\"card\" data-href=\"{}\">\n  <h3>{}</h3>\n  <p>{}</p>\n",
            escape_html(&self.details_url),
            self.name.to_html(),
            escape_html(&self.description)
        );
        if !self.tags.is_empty() {
            out.push_str("  <div class=\"meta\">");
            for tag in &self.tags {
                let _ = write!(out, "<span class=\"chip\">{}</span>", tag.to_html());
            }
            out.push_str("</div>\n");
        }
        out.push_str("</article>\n");
        out
    }
}

/// Link to the details page for `name`: `<base>?word=<encoded name>`.
pub fn details_link(base: &str, name: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}word={}", base, separator, urlencoding::encode(name))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

pub fn results_summary(count: usize) -> String {
    format!(
        "{} result{} found.",
        count,
        if count == 1 { "" } else { "s" }
    )
}

pub fn sample_summary(shown: usize, total: usize) -> String {
    format!(
        "Showing {} random entr{} out of {}. Pick a letter or search to explore.",
        shown,
        if shown == 1 { "y" } else { "ies" },
        total
    )
}

pub fn loaded_summary(total: usize) -> String {
    format!("{} entries loaded.", total)
}

pub fn error_summary(source: &str, reason: &str) -> String {
    format!("Failed to load {}: {}", source, reason)
}

pub const LOADING_SUMMARY: &str = "Loading data…";

/// Empty-state indicator shown in place of the card list.
pub const NO_RESULTS: &str = "No entries to show.";

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(h: &Highlighted) -> Vec<(&str, bool)> {
        h.segments()
            .iter()
            .map(|s| (s.text.as_str(), s.matched))
            .collect()
    }

    #[test]
    fn test_highlight_segments() {
        let h = Highlighted::new("Sakura saku", "SAKU");
        assert_eq!(
            marks(&h),
            vec![("Saku", true), ("ra ", false), ("saku", true)]
        );
        assert_eq!(h.plain(), "Sakura saku");
    }

    #[test]
    fn test_highlight_without_query() {
        let h = Highlighted::new("Kaze", "");
        assert_eq!(marks(&h), vec![("Kaze", false)]);
        assert!(!h.has_match());
        assert!(Highlighted::new("", "x").segments().is_empty());
    }

    #[test]
    fn test_highlight_html_escapes_everything() {
        let h = Highlighted::new("<b>&a+b</b>", "a+b");
        assert_eq!(
            h.to_html(),
            "&lt;b&gt;&amp;<mark class=\"highlight\">a+b</mark>&lt;/b&gt;"
        );

        // the query must not match inside escape sequences
        let h = Highlighted::new("R&D", "amp");
        assert_eq!(h.to_html(), "R&amp;D");
        assert!(!h.has_match());

        let h = Highlighted::new("<i>", "<i>");
        assert_eq!(h.to_html(), "<mark class=\"highlight\">&lt;i&gt;</mark>");
    }

    #[test]
    fn test_details_link_encodes_name() {
        assert_eq!(
            details_link("details.html", "Été & co"),
            "details.html?word=%C3%89t%C3%A9%20%26%20co"
        );
        assert_eq!(
            details_link("details.html?lang=fr", "kaze"),
            "details.html?lang=fr&word=kaze"
        );
    }

    #[test]
    fn test_card_highlights_tags() {
        let entry = Entry {
            name: "Sakura".into(),
            description: "  cherry blossom ".into(),
            tags: vec!["fleur".into(), "printemps".into()],
            fields: Vec::new(),
        };
        let card = Card::new(3, &entry, "fle", "details.html");
        assert_eq!(card.index, 3);
        assert!(!card.name.has_match());
        assert!(card.tags[0].has_match());
        assert!(!card.tags[1].has_match());
        assert_eq!(card.description, "cherry blossom");

        let html = card.to_html();
        assert!(html.contains("<span class=\"chip\"><mark class=\"highlight\">fle</mark>ur</span>"));
        assert!(html.contains("data-href=\"details.html?word=Sakura\""));
    }

    #[test]
    fn test_summaries() {
        assert_eq!(results_summary(0), "0 results found.");
        assert_eq!(results_summary(1), "1 result found.");
        assert_eq!(results_summary(12), "12 results found.");
        assert!(sample_summary(15, 200).starts_with("Showing 15 random entries out of 200."));
        assert!(sample_summary(1, 1).starts_with("Showing 1 random entry"));
    }
}
