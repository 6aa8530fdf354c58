//! Topic recommendation engine.
//!
//! Ranks what the student should look at next from the progress record and
//! a predefined topic catalog. Fully deterministic — no randomness and no
//! external calls, so identical inputs always produce the identical order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::{normalize_topic, ProgressRecord};

/// A topic whose most recent quiz accuracy falls below this is due for review.
pub const WEAK_ACCURACY_THRESHOLD: f64 = 0.7;

/// Rank suggested next topics.
///
/// The sequence is finite, restartable (call again for a fresh iterator),
/// and ordered in three tiers:
///
/// 1. catalog topics not yet studied, in catalog order;
/// 2. studied topics whose most recent quiz accuracy is below
///    [`WEAK_ACCURACY_THRESHOLD`], worst first;
/// 3. the remaining studied topics, most recently touched first.
///
/// An empty catalog yields an empty sequence.
pub fn recommend_topics<'a>(
    record: &'a ProgressRecord,
    catalog: &'a [String],
) -> Recommendations<'a> {
    if catalog.is_empty() {
        return Recommendations {
            catalog,
            studied: HashSet::new(),
            emitted: HashSet::new(),
            catalog_pos: 0,
            review: Vec::new(),
            refresh: Vec::new(),
            queue_pos: 0,
        };
    }

    let studied: HashSet<&str> = record.topics_studied.iter().map(String::as_str).collect();

    // Partition studied topics into the review tier (last quiz below the
    // threshold) and the refresh tier (everything else).
    let mut weak: Vec<(usize, &str, f64)> = Vec::new();
    let mut rest: Vec<(usize, &str, Option<DateTime<Utc>>)> = Vec::new();
    for (position, topic) in record.topics_studied.iter().enumerate() {
        match record.latest_accuracy(topic) {
            Some(accuracy) if accuracy < WEAK_ACCURACY_THRESHOLD => {
                weak.push((position, topic, accuracy));
            }
            latest => {
                let last = latest.and_then(|_| record.last_quizzed(topic));
                rest.push((position, topic, last));
            }
        }
    }

    weak.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)));
    // Quizzed topics by timestamp, newest first; never-quizzed topics after
    // them, most recently studied first.
    rest.sort_by(|a, b| match (a.2, b.2) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.0.cmp(&a.0),
    });

    Recommendations {
        catalog,
        studied,
        emitted: HashSet::new(),
        catalog_pos: 0,
        review: weak.into_iter().map(|(_, t, _)| t).collect(),
        refresh: rest.into_iter().map(|(_, t, _)| t).collect(),
        queue_pos: 0,
    }
}

/// Lazy iterator over recommended topics. Created by [`recommend_topics`].
pub struct Recommendations<'a> {
    catalog: &'a [String],
    studied: HashSet<&'a str>,
    emitted: HashSet<String>,
    catalog_pos: usize,
    review: Vec<&'a str>,
    refresh: Vec<&'a str>,
    queue_pos: usize,
}

impl<'a> Iterator for Recommendations<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.catalog_pos < self.catalog.len() {
            let entry = &self.catalog[self.catalog_pos];
            self.catalog_pos += 1;
            let normalized = normalize_topic(entry);
            if normalized.is_empty()
                || self.studied.contains(normalized.as_str())
                || !self.emitted.insert(normalized)
            {
                continue;
            }
            return Some(entry.as_str());
        }

        let idx = self.queue_pos;
        self.queue_pos += 1;
        self.review
            .iter()
            .chain(self.refresh.iter())
            .nth(idx)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn catalog(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn unstudied_catalog_topics_come_first_in_catalog_order() {
        let mut record = ProgressRecord::default();
        record.record_topic_studied("passwords");

        let catalog = catalog(&["phishing", "passwords", "malware"]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(topics, vec!["phishing", "malware", "passwords"]);
    }

    #[test]
    fn weak_topics_ordered_worst_first() {
        let mut record = ProgressRecord::default();
        record.record_quiz_attempt("phishing", 5, 3, ts(1)).unwrap(); // 0.6
        record.record_quiz_attempt("malware", 5, 1, ts(2)).unwrap(); // 0.2
        record.record_quiz_attempt("firewalls", 5, 5, ts(3)).unwrap(); // 1.0

        // Everything in the catalog is already studied, so only the
        // review/refresh tiers are exercised.
        let catalog = catalog(&["phishing", "malware", "firewalls"]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(topics, vec!["malware", "phishing", "firewalls"]);
    }

    #[test]
    fn only_most_recent_attempt_counts_as_weak() {
        let mut record = ProgressRecord::default();
        record.record_quiz_attempt("phishing", 5, 1, ts(1)).unwrap();
        record.record_quiz_attempt("phishing", 5, 5, ts(2)).unwrap();

        let catalog = catalog(&["phishing"]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        // Recovered to 1.0, so it lands in the refresh tier, not review.
        assert_eq!(topics, vec!["phishing"]);
    }

    #[test]
    fn refresh_tier_ordered_by_recency() {
        let mut record = ProgressRecord::default();
        record.record_quiz_attempt("phishing", 4, 4, ts(10)).unwrap();
        record.record_quiz_attempt("malware", 4, 4, ts(20)).unwrap();
        record.record_topic_studied("encryption"); // studied, never quizzed

        let catalog = catalog(&["phishing", "malware", "encryption"]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(topics, vec!["malware", "phishing", "encryption"]);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let mut record = ProgressRecord::default();
        record.record_quiz_attempt("phishing", 5, 2, ts(1)).unwrap();
        record.record_quiz_attempt("malware", 5, 2, ts(2)).unwrap();
        record.record_topic_studied("encryption");
        let catalog = catalog(&["firewalls", "vpn", "phishing"]);

        let first: Vec<&str> = recommend_topics(&record, &catalog).collect();
        let second: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_catalog_yields_empty_sequence() {
        let mut record = ProgressRecord::default();
        record.record_quiz_attempt("phishing", 5, 1, ts(1)).unwrap();
        assert_eq!(recommend_topics(&record, &[]).count(), 0);
        assert_eq!(recommend_topics(&ProgressRecord::default(), &[]).count(), 0);
    }

    #[test]
    fn catalog_membership_is_case_insensitive() {
        let mut record = ProgressRecord::default();
        record.record_topic_studied("phishing");

        let catalog = catalog(&["Phishing", "Malware"]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(topics, vec!["Malware", "phishing"]);
    }

    #[test]
    fn duplicate_catalog_entries_emitted_once() {
        let record = ProgressRecord::default();
        let catalog = catalog(&["vpn", "VPN", "vpn "]);
        let topics: Vec<&str> = recommend_topics(&record, &catalog).collect();
        assert_eq!(topics, vec!["vpn"]);
    }
}
