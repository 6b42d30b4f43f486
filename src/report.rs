//! Report Builder
//!
//! Turns the final [`AggregationState`] and classifier groups into the
//! immutable [`Report`] a run emits. This is the only place the tally state is
//! read back out, and it happens exactly once per run.
//!
//! Error groups are summarized for output: the raw sample list collapses to a
//! deduplicated preview (first-seen order, at most [`MAX_ERROR_SAMPLES`]), the
//! contributing id list collapses to a distinct count, and groups sort by
//! total sample count descending. The sort is stable, so groups with equal
//! counts keep their creation order.

use crate::aggregator::AggregationState;
use crate::classifier::{Classifier, ClassifierGroup};
use crate::models::{ErrorGroup, Report};
use std::collections::HashSet;

/// Cap on deduplicated sample strings carried into the report per group.
pub const MAX_ERROR_SAMPLES: usize = 10;

/// Build the final report from a completed run's state.
pub fn build_report(state: AggregationState, classifier: Classifier) -> Report {
    let (window, dates, unique_ids, version, os_info) = state.into_parts();

    let active_users_by_date = dates
        .into_iter()
        .map(|(day, active)| (day, active.len() as u64))
        .collect();

    let mut errors: Vec<ErrorGroup> = classifier
        .into_groups()
        .into_iter()
        .map(summarize_group)
        .collect();
    errors.sort_by(|a, b| b.count.cmp(&a.count));

    Report {
        start_date: window.start_key(),
        end_date: window.end_key(),
        unique_users: unique_ids.len() as u64,
        active_users_by_date,
        version,
        os_info,
        errors,
    }
}

fn summarize_group(group: ClassifierGroup) -> ErrorGroup {
    let count = group.samples.len() as u64;
    let id_count = group.ids.iter().collect::<HashSet<_>>().len() as u64;

    let mut seen = HashSet::new();
    let mut samples: Vec<String> = group
        .samples
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect();
    samples.truncate(MAX_ERROR_SAMPLES);

    ErrorGroup {
        prototype: group.prototype,
        samples,
        count,
        id_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{parse_day, ReportWindow};

    fn group(prototype: &str, samples: &[&str], ids: &[&str]) -> ClassifierGroup {
        ClassifierGroup {
            prototype: prototype.to_string(),
            samples: samples.iter().map(|s| s.to_string()).collect(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn empty_state() -> AggregationState {
        let window = ReportWindow::new(
            parse_day("2025-01-01").unwrap(),
            parse_day("2025-01-02").unwrap(),
        )
        .unwrap();
        AggregationState::new(window).unwrap()
    }

    #[test]
    fn quiet_days_report_zero_active_users() {
        let report = build_report(empty_state(), Classifier::new());
        assert_eq!(report.active_users_by_date["2025-01-01"], 0);
        assert_eq!(report.active_users_by_date["2025-01-02"], 0);
        assert_eq!(report.unique_users, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn group_count_keeps_duplicates_but_samples_dedup() {
        let mut classifier = Classifier::new();
        for id in ["a", "b", "a"] {
            classifier.classify("disk full", id).unwrap();
        }

        let report = build_report(empty_state(), classifier);
        let group = &report.errors[0];
        assert_eq!(group.count, 3);
        assert_eq!(group.samples, vec!["disk full"]);
        assert_eq!(group.id_count, 2);
    }

    #[test]
    fn samples_truncate_to_ten_after_dedup() {
        let samples: Vec<String> = (0..15).map(|i| format!("error variant {i}")).collect();
        let sample_refs: Vec<&str> = samples.iter().map(String::as_str).collect();
        let ids = vec!["x"; 15];
        let g = group("error variant 0", &sample_refs, &ids);

        let summarized = summarize_group(g);
        assert_eq!(summarized.count, 15);
        assert_eq!(summarized.samples.len(), MAX_ERROR_SAMPLES);
        assert_eq!(summarized.samples[0], "error variant 0");
        assert_eq!(summarized.id_count, 1);
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let g = group(
            "a",
            &["a", "b", "a", "c", "b"],
            &["1", "2", "3", "4", "5"],
        );
        let summarized = summarize_group(g);
        assert_eq!(summarized.samples, vec!["a", "b", "c"]);
        assert_eq!(summarized.count, 5);
    }

    #[test]
    fn groups_sort_by_count_descending_stable() {
        let mut classifier = Classifier::new();
        // Three groups created in order: sizes 1, 2, 1.
        classifier.classify("out of memory", "a").unwrap();
        classifier.classify("connection timeout", "b").unwrap();
        classifier.classify("connection timed out", "c").unwrap();
        classifier.classify("permission denied", "d").unwrap();

        let report = build_report(empty_state(), classifier);
        let prototypes: Vec<_> = report.errors.iter().map(|g| g.prototype.as_str()).collect();
        // Largest first; the two singletons keep creation order.
        assert_eq!(
            prototypes,
            vec!["connection timeout", "out of memory", "permission denied"]
        );
    }
}
