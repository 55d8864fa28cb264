//! Dataset loading: fetch a JSON document, locate the record array and
//! turn it into [`Entry`] values.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rand::seq::index;
use rand::Rng;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::entry::{Entry, FieldNames};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything that can go wrong while loading the dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("{origin} is not valid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON does not contain an array at top level")]
    NoArray,
}

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Url(trimmed.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(trimmed)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Read the raw document behind `source`.
pub fn fetch(source: &Source) -> Result<Value, LoadError> {
    let body = match source {
        Source::File(path) => fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?,
        Source::Url(url) => fetch_url(url)?,
    };

    serde_json::from_str(&body).map_err(|err| LoadError::Json {
        origin: source.to_string(),
        source: err,
    })
}

fn fetch_url(url: &str) -> Result<String, LoadError> {
    let network = |source: reqwest::Error| LoadError::Network {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let response = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(network)
}

/// Pull the record array out of a document: the document itself, its
/// `items` or `data` field, or else the first array-valued field.
pub fn locate_array(document: Value) -> Result<Vec<Value>, LoadError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => {
            for key in ["items", "data"] {
                if matches!(object.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = object.remove(key) {
                        return Ok(items);
                    }
                }
            }
            object
                .into_iter()
                .find_map(|(_, value)| match value {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or(LoadError::NoArray)
        }
        _ => Err(LoadError::NoArray),
    }
}

/// Fetch and parse the whole dataset.
pub fn load(source: &Source, names: &FieldNames) -> Result<Vec<Entry>, LoadError> {
    let result = fetch(source)
        .and_then(locate_array)
        .map(|records| {
            records
                .iter()
                .map(|record| Entry::from_value(record, names))
                .collect::<Vec<_>>()
        });

    match &result {
        Ok(entries) => info!(source = %source, count = entries.len(), "dataset loaded"),
        Err(err) => error!(source = %source, error = %err, "failed to load dataset"),
    }
    result
}

/// Pick up to `size` distinct named entries at random. Indices come back
/// in dataset order.
pub fn sample<R: Rng + ?Sized>(entries: &[Entry], size: usize, rng: &mut R) -> Vec<usize> {
    let named: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.has_name())
        .map(|(idx, _)| idx)
        .collect();

    let amount = size.min(named.len());
    let mut picked: Vec<usize> = index::sample(rng, named.len(), amount)
        .into_iter()
        .map(|i| named[i])
        .collect();
    picked.sort_unstable();
    picked
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn named(n: usize) -> Vec<Entry> {
        (0..n)
            .map(|i| Entry {
                name: format!("word{}", i),
                ..Entry::default()
            })
            .collect()
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            "https://example.com/output.json".parse::<Source>().unwrap(),
            Source::Url("https://example.com/output.json".into())
        );
        assert_eq!(
            "output.json".parse::<Source>().unwrap(),
            Source::File(PathBuf::from("output.json"))
        );
    }

    #[test]
    fn test_locate_array_shapes() {
        assert_eq!(locate_array(json!([1, 2])).unwrap().len(), 2);
        assert_eq!(locate_array(json!({"items": [1]})).unwrap().len(), 1);
        assert_eq!(
            locate_array(json!({"data": [1, 2, 3], "items": "nope"}))
                .unwrap()
                .len(),
            3
        );
        // `items` wins over `data` when both are arrays
        assert_eq!(
            locate_array(json!({"data": [1, 2, 3], "items": [1]}))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_locate_array_fallback_first_array() {
        let doc = json!({"meta": {"v": 1}, "words": [1, 2], "other": [1]});
        assert_eq!(locate_array(doc).unwrap().len(), 2);
    }

    #[test]
    fn test_locate_array_missing() {
        assert!(matches!(
            locate_array(json!({"meta": 1})),
            Err(LoadError::NoArray)
        ));
        assert!(matches!(locate_array(json!("text")), Err(LoadError::NoArray)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"items": [{{"Nom": "Kaze", "Tags": "nature"}}, {{"Description": "orphan"}}]}}"#
        )
        .unwrap();

        let source = Source::File(file.path().to_path_buf());
        let entries = load(&source, &FieldNames::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Kaze");
        assert!(!entries[1].has_name());
    }

    #[test]
    fn test_load_missing_file_and_bad_json() {
        let source = Source::File(PathBuf::from("/nonexistent/kotoba/output.json"));
        assert!(matches!(
            load(&source, &FieldNames::default()),
            Err(LoadError::Io { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let source = Source::File(file.path().to_path_buf());
        assert!(matches!(
            load(&source, &FieldNames::default()),
            Err(LoadError::Json { .. })
        ));
    }

    #[test]
    fn test_sample_is_deterministic_and_distinct() {
        let entries = named(40);
        let a = sample(&entries, 15, &mut StdRng::seed_from_u64(7));
        let b = sample(&entries, 15, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.len(), 15);
        assert_eq!(a.iter().collect::<HashSet<_>>().len(), 15);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sample_skips_nameless_and_caps_size() {
        let mut entries = named(3);
        entries.insert(1, Entry::default());
        let picked = sample(&entries, 15, &mut StdRng::seed_from_u64(1));
        assert_eq!(picked, vec![0, 2, 3]);
        assert!(sample(&[], 15, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
