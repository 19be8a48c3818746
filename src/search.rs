//! Train lookup by id.
//!
//! Train numbers are short and collide under plain substring search
//! (searching "9" would surface "149" and "92"), so all-digit queries go
//! through a cascade, taking the first step that matches anything:
//!
//! 1. exact id match
//! 2. id starting with the query followed by a word boundary, for queries
//!    of at most [`SearchPolicy::boundary_max_len`] digits
//! 3. case-insensitive substring match
//!
//! Any other query goes straight to step 3. Results are always ordered by
//! id, keeping snapshot order among equal ids.

use regex::Regex;

use crate::config::SearchPolicy;
use crate::models::{Snapshot, Train};

/// Search with the default policy.
pub fn search<'a>(snapshot: &'a Snapshot, text: &str) -> Vec<&'a Train> {
    search_with(&SearchPolicy::default(), &snapshot.trains, text)
}

/// Filter and sort `trains` for `text` under `policy`.
pub fn search_with<'a>(policy: &SearchPolicy, trains: &'a [Train], text: &str) -> Vec<&'a Train> {
    let query = text.trim();

    let mut matches = if query.is_empty() {
        trains.iter().collect()
    } else if is_numeric(query) {
        numeric_matches(policy, trains, query)
    } else {
        substring_matches(trains, query)
    };

    tracing::debug!(query, found = matches.len(), "Search");

    sort_by_id(&mut matches);
    matches
}

fn is_numeric(query: &str) -> bool {
    query.chars().all(|c| c.is_ascii_digit())
}

fn numeric_matches<'a>(policy: &SearchPolicy, trains: &'a [Train], query: &str) -> Vec<&'a Train> {
    let exact: Vec<&Train> = trains.iter().filter(|t| t.id == query).collect();
    if !exact.is_empty() {
        return exact;
    }

    if query.len() <= policy.boundary_max_len {
        let bounded = boundary_matches(trains, query);
        if !bounded.is_empty() {
            return bounded;
        }
    }

    substring_matches(trains, query)
}

/// Ids that begin with `query` followed by a word boundary, e.g. "9" matches
/// "9 ex" and "9-A" but not "92".
fn boundary_matches<'a>(trains: &'a [Train], query: &str) -> Vec<&'a Train> {
    let pattern = format!(r"^{}\b", regex::escape(query));
    match Regex::new(&pattern) {
        Ok(re) => trains.iter().filter(|t| re.is_match(&t.id)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, pattern = %pattern, "Invalid boundary pattern");
            Vec::new()
        }
    }
}

fn substring_matches<'a>(trains: &'a [Train], query: &str) -> Vec<&'a Train> {
    let needle = query.to_lowercase();
    trains
        .iter()
        .filter(|t| t.id.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort, so equal ids keep snapshot order.
fn sort_by_id(trains: &mut [&Train]) {
    trains.sort_by(|a, b| a.id.cmp(&b.id));
}
