//! Browser state: the loaded entries, the filter controls and the
//! first-load sample, with the transitions user input triggers.

use rand::Rng;
use tracing::debug;

use crate::entry::Entry;
use crate::filter::{FilterState, Letter};
use crate::loader::{self, LoadError};
use crate::render::{self, Card};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// What the result area should show after a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub cards: Vec<Card>,
    pub summary: String,
}

impl View {
    /// The "no results" indicator is shown whenever no card is.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Browser {
    entries: Vec<Entry>,
    filter: FilterState,
    status: LoadStatus,
    first_load: bool,
    sample: Vec<usize>,
    details_base: String,
}

impl Browser {
    pub fn new(details_base: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            filter: FilterState::default(),
            status: LoadStatus::Loading,
            first_load: true,
            sample: Vec::new(),
            details_base: details_base.into(),
        }
    }

    /// Install the outcome of the startup load. A failure leaves the entry
    /// list empty. With `sample_size == 0` the first-load sample is skipped.
    pub fn finish_load<R: Rng + ?Sized>(
        &mut self,
        result: Result<Vec<Entry>, LoadError>,
        source_label: &str,
        sample_size: usize,
        rng: &mut R,
    ) {
        match result {
            Ok(entries) => {
                self.sample = loader::sample(&entries, sample_size, rng);
                self.first_load = sample_size > 0;
                self.entries = entries;
                self.status = LoadStatus::Ready;
            }
            Err(err) => {
                self.entries.clear();
                self.sample.clear();
                self.status =
                    LoadStatus::Failed(render::error_summary(source_label, &err.to_string()));
            }
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    pub fn active_letter(&self) -> Option<Letter> {
        self.filter.letter
    }

    /// Letter button: selecting the active letter clears it. The query is
    /// reset either way.
    pub fn toggle_letter(&mut self, letter: Letter) {
        self.first_load = false;
        self.filter.letter = if self.filter.letter == Some(letter) {
            None
        } else {
            Some(letter)
        };
        self.filter.set_query("");
    }

    /// Search box edit.
    pub fn set_query(&mut self, query: &str) {
        self.first_load = false;
        self.filter.set_query(query);
    }

    /// Search button: re-run the pipeline with the current query.
    pub fn submit(&mut self) {
        self.first_load = false;
    }

    /// Clear button: drop both the letter and the query.
    pub fn clear(&mut self) {
        self.first_load = false;
        self.filter = FilterState::default();
    }

    /// Full render pass over the current state.
    pub fn view(&self) -> View {
        match &self.status {
            LoadStatus::Loading => View {
                cards: Vec::new(),
                summary: render::LOADING_SUMMARY.to_string(),
            },
            LoadStatus::Failed(message) => View {
                cards: Vec::new(),
                summary: message.clone(),
            },
            LoadStatus::Ready if self.first_load => {
                let cards: Vec<Card> = self
                    .sample
                    .iter()
                    .filter_map(|&index| {
                        self.entries
                            .get(index)
                            .map(|entry| Card::new(index, entry, "", &self.details_base))
                    })
                    .collect();
                let summary = render::sample_summary(cards.len(), self.entries.len());
                View { cards, summary }
            }
            LoadStatus::Ready => {
                let query = self.filter.query();
                let cards: Vec<Card> = self
                    .filter
                    .visible_indices(&self.entries)
                    .into_iter()
                    .map(|index| Card::new(index, &self.entries[index], query, &self.details_base))
                    .collect();
                debug!(
                    letter = ?self.filter.letter,
                    query,
                    count = cards.len(),
                    "filter pass"
                );
                View {
                    summary: render::results_summary(cards.len()),
                    cards,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;
    use std::path::PathBuf;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn entry(name: &str, tags: &[&str]) -> Entry {
        Entry {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Entry::default()
        }
    }

    fn dataset() -> Vec<Entry> {
        vec![
            entry("Sakura", &["fleur"]),
            entry("", &["fleur"]),
            entry("Sora", &["ciel"]),
            entry("Été", &["saison"]),
            entry("Ete", &[]),
            entry("Autre", &[]),
        ]
    }

    fn loaded(sample_size: usize) -> Browser {
        let mut browser = Browser::new("details.html");
        browser.finish_load(Ok(dataset()), "output.json", sample_size, &mut StdRng::seed_from_u64(3));
        browser
    }

    fn card_names(view: &View) -> Vec<String> {
        view.cards.iter().map(|card| card.name.plain()).collect()
    }

    #[test]
    fn test_loading_state() {
        let browser = Browser::new("details.html");
        let view = browser.view();
        assert!(view.is_empty());
        assert_eq!(view.summary, render::LOADING_SUMMARY);
    }

    #[test]
    fn test_first_load_shows_sample() {
        let browser = loaded(3);
        assert!(browser.is_first_load());
        let view = browser.view();
        assert_eq!(view.cards.len(), 3);
        assert!(view.summary.starts_with("Showing 3 random entries out of 6."));
        assert!(view.cards.iter().all(|card| !card.name.plain().is_empty()));
    }

    #[test]
    fn test_sample_is_reproducible() {
        assert_eq!(loaded(2).view(), loaded(2).view());
    }

    #[test]
    fn test_zero_sample_size_starts_filtered() {
        let browser = loaded(0);
        assert!(!browser.is_first_load());
        let view = browser.view();
        assert_eq!(view.cards.len(), 5);
        assert_eq!(view.summary, "5 results found.");
    }

    #[test]
    fn test_any_interaction_ends_first_load() {
        let mut browser = loaded(2);
        browser.submit();
        assert!(!browser.is_first_load());

        let mut browser = loaded(2);
        browser.clear();
        assert!(!browser.is_first_load());
        assert_eq!(browser.view().cards.len(), 5);

        let mut browser = loaded(2);
        browser.set_query("");
        assert!(!browser.is_first_load());
    }

    #[test]
    fn test_toggle_letter_resets_query() {
        let mut browser = loaded(2);
        browser.set_query("fleur");
        browser.toggle_letter(Letter::try_from('E').unwrap());
        assert_eq!(browser.filter().query(), "");
        assert_eq!(card_names(&browser.view()), vec!["Été", "Ete"]);

        browser.toggle_letter(Letter::try_from('e').unwrap());
        assert_eq!(browser.active_letter(), None);
        assert_eq!(browser.view().cards.len(), 5);
    }

    #[test]
    fn test_letter_then_query_intersects() {
        let mut browser = loaded(2);
        browser.toggle_letter(Letter::try_from('S').unwrap());
        browser.set_query("  FLE ");
        let view = browser.view();
        assert_eq!(card_names(&view), vec!["Sakura"]);
        assert_eq!(view.summary, "1 result found.");
        assert!(view.cards[0].tags[0].has_match());
        assert_eq!(view.cards[0].details_url, "details.html?word=Sakura");
    }

    #[test]
    fn test_clear_resets_filters() {
        let mut browser = loaded(2);
        browser.toggle_letter(Letter::try_from('A').unwrap());
        browser.clear();
        assert_eq!(browser.filter(), &FilterState::default());
    }

    #[test]
    fn test_load_failure_shows_error() {
        let mut browser = Browser::new("details.html");
        let err = LoadError::Io {
            path: PathBuf::from("output.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        browser.finish_load(Err(err), "output.json", 15, &mut StdRng::seed_from_u64(1));

        let view = browser.view();
        assert!(view.is_empty());
        assert!(view.summary.starts_with("Failed to load output.json"));
        assert!(matches!(browser.status(), LoadStatus::Failed(_)));

        browser.set_query("anything");
        let view = browser.view();
        assert_eq!(view.cards.len(), 0);
        assert!(view.summary.starts_with("Failed to load"));
    }
}
