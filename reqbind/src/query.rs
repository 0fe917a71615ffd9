//! Query string index and resolver.
//!
//! The index is built once per decode call. Keys are reachable both by
//! their original spelling and lower-cased, and the lower-cased entry
//! collects the values of every case variant in input order.

use std::collections::HashMap;

use crate::tag::Style;

/// Multi-map of query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    /// Decoded pairs in input order.
    pairs: Vec<(String, String)>,
    lookup: HashMap<String, Vec<String>>,
}

impl QueryIndex {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Parses the query component of `uri`. No query means an empty index.
    pub fn from_uri(uri: &http::Uri) -> Self {
        Self::parse(uri.query().unwrap_or_default())
    }

    fn push(&mut self, key: String, value: String) {
        let lower = key.to_lowercase();
        if lower != key {
            self.lookup.entry(lower).or_default().push(value.clone());
        }
        self.lookup.entry(key.clone()).or_default().push(value.clone());
        self.pairs.push((key, value));
    }

    /// Whether the query had no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Raw values of `name`: the exact key first, then the lower-cased one.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.lookup
            .get(name)
            .or_else(|| self.lookup.get(&name.to_lowercase()))
            .map(Vec::as_slice)
    }

    /// Resolves the raw values of a non-deep parameter.
    ///
    /// Returns `None` when the key is absent. A key present with an empty
    /// value resolves to `[""]`. Imploded parameters are split on the
    /// style delimiter; if the key was nonetheless received several times
    /// only the last occurrence is used.
    pub fn resolve(&self, name: &str, style: Style, exploded: bool) -> Option<Vec<String>> {
        let values = self.get(name)?;
        let delimiter = match style.delimiter() {
            Some(delimiter) if !exploded => delimiter,
            _ => return Some(values.to_vec()),
        };
        let Some(last) = values.last() else {
            return Some(Vec::new());
        };
        if values.len() > 1 {
            tracing::debug!(
                target: "reqbind",
                name,
                received = values.len(),
                "imploded query param received several times, using the last one"
            );
        }
        Some(last.split(delimiter).map(str::to_string).collect())
    }

    /// Sub-index of a deep object parameter.
    ///
    /// `name[sub]rest=v` becomes `sub` + `rest` = `v`, so `f[a]=1` yields
    /// `a=1` and `f[a][b]=2` yields `a[b]=2`. The prefix is matched exactly
    /// first, then lower-cased like [`QueryIndex::get`].
    pub fn deep(&self, name: &str) -> QueryIndex {
        self.pairs
            .iter()
            .filter_map(|(key, value)| Some((deep_key(key, name)?, value.clone())))
            .collect()
    }
}

fn deep_key(key: &str, name: &str) -> Option<String> {
    let rest = match key.strip_prefix(name) {
        Some(rest) if rest.starts_with('[') => rest,
        _ => {
            // same case folding as plain lookups
            let (head, _) = key.split_once('[')?;
            if head.to_lowercase() != name.to_lowercase() {
                return None;
            }
            &key[head.len()..]
        }
    };
    let (sub, tail) = rest.strip_prefix('[')?.split_once(']')?;
    Some(format!("{sub}{tail}"))
}

impl FromIterator<(String, String)> for QueryIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut index = QueryIndex::default();
        for (key, value) in iter {
            index.push(key, value);
        }
        index
    }
}
