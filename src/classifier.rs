//! Error-Message Classifier
//!
//! Groups free-text error messages by pairwise similarity so the report can
//! present a handful of clustered failure modes instead of thousands of raw
//! strings.
//!
//! ## Algorithm
//!
//! The classifier keeps an ordered list of groups. Each group is represented
//! by its *prototype*: the first message ever assigned to it, fixed at group
//! creation and never updated. An incoming message is compared against the
//! prototypes in group-creation order, and the first group whose similarity
//! score exceeds the threshold wins (first-match, not best-match). When no
//! group matches, the message founds a new group.
//!
//! Groups are never merged. Two groups with similar prototypes can coexist
//! permanently when both were created before either prototype had company;
//! this matches the grouping the rest of the system was tuned against.
//!
//! Similarity is the Sørensen-Dice coefficient over character bigrams of the
//! whitespace-stripped strings: bounded in [0, 1], symmetric, and 1.0 for
//! identical inputs.
//!
//! Classification cost is O(existing groups) per message. Error traffic is a
//! small minority of total volume and group counts stay small, so the scan
//! stays cheap in practice.

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Default similarity threshold; a match requires a score strictly above it.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// One cluster of similar error messages.
#[derive(Debug, Clone)]
pub struct ClassifierGroup {
    /// First message assigned to the group; fixed at creation.
    pub prototype: String,
    /// Every message classified into the group, duplicates retained.
    pub samples: Vec<String>,
    /// Record id contributed with each sample, in the same order.
    pub ids: Vec<String>,
}

#[derive(Debug)]
pub struct Classifier {
    groups: Vec<ClassifierGroup>,
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            groups: Vec::new(),
            threshold,
        }
    }

    /// Classify one message, attributing it to `record_id`.
    ///
    /// Blank messages are rejected; the aggregator filters those out before
    /// calling in.
    pub fn classify(&mut self, message: &str, record_id: &str) -> Result<()> {
        if message.trim().is_empty() {
            bail!("cannot classify an empty message (record {record_id})");
        }

        let matched = self
            .groups
            .iter_mut()
            .find(|group| similarity(&group.prototype, message) > self.threshold);

        match matched {
            Some(group) => {
                group.samples.push(message.to_string());
                group.ids.push(record_id.to_string());
            }
            None => self.groups.push(ClassifierGroup {
                prototype: message.to_string(),
                samples: vec![message.to_string()],
                ids: vec![record_id.to_string()],
            }),
        }

        Ok(())
    }

    /// Groups in creation order.
    pub fn groups(&self) -> &[ClassifierGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<ClassifierGroup> {
        self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Sørensen-Dice bigram similarity between two strings.
///
/// Whitespace is stripped before comparison so word spacing does not dominate
/// the score. Strings shorter than one bigram only match exactly.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: String = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: String = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len < 2 || b_len < 2 {
        return 0.0;
    }

    let mut first: HashMap<(char, char), usize> = HashMap::new();
    for pair in bigrams(&a) {
        *first.entry(pair).or_insert(0) += 1;
    }

    let mut matches = 0usize;
    for pair in bigrams(&b) {
        if let Some(remaining) = first.get_mut(&pair) {
            if *remaining > 0 {
                *remaining -= 1;
                matches += 1;
            }
        }
    }

    (2.0 * matches as f64) / ((a_len - 1) + (b_len - 1)) as f64
}

fn bigrams(s: &str) -> impl Iterator<Item = (char, char)> + '_ {
    let next = s.chars().skip(1);
    s.chars().zip(next)
}
