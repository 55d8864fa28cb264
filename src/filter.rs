use std::convert::TryFrom;
use std::fmt;

use crate::entry::Entry;
use crate::fold;

/// One of the 26 alphabet buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Letter(char);

impl Letter {
    pub const ALL: [char; 26] = [
        'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
        'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    ];

    pub fn as_char(self) -> char {
        self.0
    }

    /// Position in the alphabet, `A` = 0.
    pub fn index(self) -> usize {
        (self.0 as u8 - b'A') as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied().map(Letter)
    }

    /// Whether `name` files under this letter once its first character is
    /// stripped of diacritics and uppercased.
    pub fn matches(self, name: &str) -> bool {
        let mut buf = [0u8; 4];
        fold::initial(name).as_deref() == Some(&*self.0.encode_utf8(&mut buf))
    }
}

impl TryFrom<char> for Letter {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        if c.is_ascii_alphabetic() {
            Ok(Letter(c.to_ascii_uppercase()))
        } else {
            Err(c)
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Active letter plus trimmed query; both must hold when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub letter: Option<Letter>,
    query: String,
}

impl FilterState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    pub fn visible_indices(&self, entries: &[Entry]) -> Vec<usize> {
        visible_indices(entries, self.letter, &self.query)
    }
}

/// Positions in `entries` that pass the letter and query filters, in dataset
/// order. Entries without a display name never pass.
pub fn visible_indices(entries: &[Entry], letter: Option<Letter>, query: &str) -> Vec<usize> {
    let needle = fold::fold_case(query.trim());
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.has_name())
        .filter(|(_, entry)| letter.map_or(true, |letter| letter.matches(&entry.name)))
        .filter(|(_, entry)| needle.is_empty() || matches_query(entry, &needle))
        .map(|(index, _)| index)
        .collect()
}

fn matches_query(entry: &Entry, folded_needle: &str) -> bool {
    fold::contains_folded(&entry.name, folded_needle)
        || entry
            .tags
            .iter()
            .any(|tag| fold::contains_folded(tag, folded_needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, tags: &[&str]) -> Entry {
        Entry {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Entry::default()
        }
    }

    fn visible<'a>(entries: &'a [Entry], letter: Option<Letter>, query: &str) -> Vec<&'a Entry> {
        visible_indices(entries, letter, query)
            .into_iter()
            .map(|index| &entries[index])
            .collect()
    }

    fn names(result: Vec<&Entry>) -> Vec<&str> {
        result.into_iter().map(|e| e.name.as_str()).collect()
    }

    fn letter(c: char) -> Option<Letter> {
        Some(Letter::try_from(c).unwrap())
    }

    #[test]
    fn test_letter_from_char() {
        assert_eq!(Letter::try_from('e').unwrap().as_char(), 'E');
        assert_eq!(Letter::try_from('Z').unwrap().index(), 25);
        assert!(Letter::try_from('É').is_err());
        assert!(Letter::try_from('1').is_err());
        assert_eq!(Letter::from_index(0).unwrap().as_char(), 'A');
        assert!(Letter::from_index(26).is_none());
    }

    #[test]
    fn test_letter_ignores_diacritics_and_case() {
        let entries = vec![entry("Été", &[]), entry("Ete", &[]), entry("Autre", &[])];
        assert_eq!(names(visible(&entries, letter('E'), "")), vec!["Été", "Ete"]);

        let entries = vec![entry("éclair", &[]), entry("ecole", &[]), entry("Bec", &[])];
        assert_eq!(names(visible(&entries, letter('e'), "")), vec!["éclair", "ecole"]);
    }

    #[test]
    fn test_letter_checks_first_character_only() {
        let entries = vec![entry("Bête", &[]), entry("ami", &[])];
        assert!(visible(&entries, letter('E'), "").is_empty());
    }

    #[test]
    fn test_nameless_entries_never_visible() {
        let entries = vec![entry("", &["tag"]), entry("Kaze", &["tag"])];
        assert_eq!(names(visible(&entries, None, "")), vec!["Kaze"]);
        assert_eq!(names(visible(&entries, None, "tag")), vec!["Kaze"]);
        assert_eq!(names(visible(&entries, letter('K'), "")), vec!["Kaze"]);
    }

    #[test]
    fn test_query_matches_name_or_tags() {
        let entries = vec![
            entry("Sakura", &["Fleur", "printemps"]),
            entry("Kaze", &["nature"]),
            entry("Yuki", &[]),
        ];
        assert_eq!(names(visible(&entries, None, "FLEUR")), vec!["Sakura"]);
        assert_eq!(names(visible(&entries, None, "  aze ")), vec!["Kaze"]);
        assert_eq!(names(visible(&entries, None, "u")), vec!["Sakura", "Kaze", "Yuki"]);
    }

    #[test]
    fn test_query_is_literal() {
        let entries = vec![entry("a+b corp", &[]), entry("aab", &[]), entry("x.y", &[])];
        assert_eq!(names(visible(&entries, None, "a+b")), vec!["a+b corp"]);
        assert_eq!(names(visible(&entries, None, ".")), vec!["x.y"]);
        assert!(visible(&entries, None, "(").is_empty());
        assert!(visible(&entries, None, "a*").is_empty());
    }

    #[test]
    fn test_letter_and_query_intersect() {
        let entries = vec![
            entry("Sakura", &["fleur"]),
            entry("Sumire", &["fleur"]),
            entry("Tsubaki", &["fleur"]),
            entry("Sora", &["ciel"]),
        ];
        let by_letter = names(visible(&entries, letter('S'), ""));
        let by_query = names(visible(&entries, None, "fleur"));
        let both = names(visible(&entries, letter('S'), "fleur"));
        let expected: Vec<&str> = by_letter
            .iter()
            .copied()
            .filter(|n| by_query.contains(n))
            .collect();
        assert_eq!(both, expected);
        assert_eq!(both, vec!["Sakura", "Sumire"]);
    }

    #[test]
    fn test_empty_dataset() {
        assert!(visible(&[], letter('A'), "x").is_empty());
        assert!(visible(&[], None, "").is_empty());
    }

    #[test]
    fn test_filter_state_trims_query() {
        let mut state = FilterState::default();
        state.set_query("  kaze \t");
        assert_eq!(state.query(), "kaze");
        state.set_query("   ");
        assert_eq!(state.query(), "");
    }
}
