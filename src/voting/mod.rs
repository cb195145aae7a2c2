pub mod tally;
pub mod weighted;

use crate::models::{LegacyRankingsResponse, LegacyTally, NomineeScore, RankingsResponse, VoteRecord};
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub use weighted::compute_rankings;

// Which column orders the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingView {
    #[default]
    Score,
    Votes,
}

impl RankingView {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "score" => Some(RankingView::Score),
            "votes" => Some(RankingView::Votes),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankingView::Score => "Weighted score",
            RankingView::Votes => "Vote count",
        }
    }
}

/// Re-sorts ranking rows in place. Ties always fall back to nominee name.
pub fn sort_for_view(results: &mut [NomineeScore], view: RankingView) {
    results.sort_by(|a, b| {
        let primary = match view {
            RankingView::Score => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
            RankingView::Votes => b.received_count.cmp(&a.received_count),
        };
        primary.then_with(|| a.nominee.cmp(&b.nominee))
    });
}

// Everything a rankings request needs from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RankingsReport {
    pub results: Vec<NomineeScore>,
    // Distinct voters and nominees
    pub participant_count: usize,
    pub total_votes: usize,
    pub view: RankingView,
}

impl RankingsReport {
    pub fn build(records: &[VoteRecord]) -> Self {
        let results = compute_rankings(records);

        // Every record's voter is listed under its nominee
        let participant_count = results
            .iter()
            .flat_map(|result| std::iter::once(&result.nominee).chain(result.voters.iter()))
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            results,
            participant_count,
            total_votes: records.len(),
            view: RankingView::Score,
        }
    }

    pub fn with_view(mut self, view: RankingView) -> Self {
        if self.view != view {
            sort_for_view(&mut self.results, view);
            self.view = view;
        }
        self
    }

    pub fn response(&self) -> RankingsResponse {
        RankingsResponse {
            results: self.results.clone(),
            total_votes: self.total_votes,
        }
    }

    // Legacy shape is always ordered by vote count
    pub fn legacy_response(&self) -> LegacyRankingsResponse {
        let mut by_votes = self.results.clone();
        sort_for_view(&mut by_votes, RankingView::Votes);

        LegacyRankingsResponse {
            results: by_votes.iter().map(LegacyTally::from).collect(),
            total_votes: self.total_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn records(pairs: &[(&str, &str)]) -> Vec<VoteRecord> {
        let start = Utc::now();
        pairs
            .iter()
            .enumerate()
            .map(|(i, (voter, nominee))| VoteRecord::new(*voter, *nominee, start + Duration::microseconds(i as i64)))
            .collect()
    }

    fn names(results: &[NomineeScore]) -> Vec<&str> {
        results.iter().map(|r| r.nominee.as_str()).collect()
    }

    // A and B trade votes; D, E and F pile onto C but carry no weight
    fn split_snapshot() -> Vec<VoteRecord> {
        records(&[("A", "B"), ("B", "A"), ("A", "A"), ("D", "C"), ("E", "C"), ("F", "C")])
    }

    #[test]
    fn views_disagree_on_order() {
        let report = RankingsReport::build(&split_snapshot());
        assert_eq!(report.view, RankingView::Score);
        assert_eq!(names(&report.results), vec!["A", "B", "C"]);

        let report = report.with_view(RankingView::Votes);
        assert_eq!(names(&report.results), vec!["C", "A", "B"]);
        assert_eq!(report.results[0].score, 0.0);
    }

    #[test]
    fn vote_view_breaks_ties_by_name() {
        let mut results = compute_rankings(&records(&[("X", "b"), ("Y", "a"), ("Z", "c")]));
        sort_for_view(&mut results, RankingView::Votes);
        assert_eq!(names(&results), vec!["a", "b", "c"]);
    }

    #[test]
    fn report_counts_every_record_and_participant() {
        let report = RankingsReport::build(&split_snapshot());
        assert_eq!(report.total_votes, 6);
        assert_eq!(report.participant_count, 6);
        assert_eq!(report.response().total_votes, 6);
    }

    #[test]
    fn legacy_response_sorts_by_received_count() {
        let report = RankingsReport::build(&split_snapshot());
        let legacy = report.legacy_response();

        let order: Vec<&str> = legacy.results.iter().map(|r| r.nominee.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(legacy.results[0].voters, vec!["D", "E", "F"]);
        assert_eq!(legacy.total_votes, 6);
    }

    #[test]
    fn empty_report() {
        let report = RankingsReport::build(&[]);
        assert!(report.results.is_empty());
        assert_eq!(report.participant_count, 0);
        assert_eq!(report.total_votes, 0);
    }

    #[test]
    fn parse_view_names() {
        assert_eq!(RankingView::parse("score"), Some(RankingView::Score));
        assert_eq!(RankingView::parse("votes"), Some(RankingView::Votes));
        assert_eq!(RankingView::parse("stars"), None);
    }
}
