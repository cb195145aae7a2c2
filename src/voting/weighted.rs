//! Trust-weighted ranking.
//!
//! Every participant's influence is `ln(1 + votes received)`. A voter splits
//! that influence evenly over the records they cast, so the total a voter
//! hands out always equals their own weight. A nominee's score is the sum of
//! the shares it collects.

use super::tally::VoteIndex;
use super::{sort_for_view, RankingView};
use crate::models::{NomineeScore, ParticipantWeight, VoteRecord};
use std::collections::BTreeMap;

const DISPLAY_SCALE: f64 = 1000.0;

pub fn weight_for(received: usize) -> f64 {
    (received as f64).ln_1p()
}

// Rounds to three decimals for display
pub fn round3(value: f64) -> f64 {
    (value * DISPLAY_SCALE).round() / DISPLAY_SCALE
}

/// Unrounded weight of every participant, voters who were never nominated
/// included. Sorted by participant name.
pub fn participant_weights(index: &VoteIndex) -> Vec<ParticipantWeight> {
    index
        .participants
        .iter()
        .map(|participant| {
            let received_count = index.received(participant);
            ParticipantWeight {
                participant: participant.clone(),
                received_count,
                weight: weight_for(received_count),
            }
        })
        .collect()
}

fn weight_of<'a>(weights: &'a [ParticipantWeight], participant: &str) -> Option<&'a ParticipantWeight> {
    weights
        .binary_search_by(|entry| entry.participant.as_str().cmp(participant))
        .ok()
        .map(|i| &weights[i])
}

/// Unrounded score of every nominee.
pub fn nominee_scores(index: &VoteIndex, weights: &[ParticipantWeight]) -> BTreeMap<String, f64> {
    let mut scores: BTreeMap<String, f64> = index
        .received_counts
        .keys()
        .map(|nominee| (nominee.clone(), 0.0))
        .collect();

    for (voter, targets) in &index.nominations_by_voter {
        let out_degree = index.out_degree(voter);
        if out_degree == 0 {
            continue;
        }

        let voter_weight = weight_of(weights, voter).map_or(0.0, |entry| entry.weight);
        let share = voter_weight / out_degree as f64;

        // Repeated targets each take their own share
        for target in targets {
            *scores.entry(target.clone()).or_insert(0.0) += share;
        }
    }

    scores
}

/// Display rows for one nominee each, sorted by score.
pub fn rank_nominees(
    index: &VoteIndex,
    weights: &[ParticipantWeight],
    scores: &BTreeMap<String, f64>,
) -> Vec<NomineeScore> {
    let mut results: Vec<NomineeScore> = scores
        .iter()
        .map(|(nominee, score)| {
            let (received_count, weight) =
                weight_of(weights, nominee).map_or((0, 0.0), |entry| (entry.received_count, entry.weight));
            NomineeScore {
                nominee: nominee.clone(),
                received_count,
                weight: round3(weight),
                score: round3(*score),
                voters: index.voters_by_nominee.get(nominee).cloned().unwrap_or_default(),
            }
        })
        .collect();

    sort_for_view(&mut results, RankingView::Score);
    results
}

pub fn compute_rankings(records: &[VoteRecord]) -> Vec<NomineeScore> {
    let index = VoteIndex::build(records);
    let weights = participant_weights(&index);
    let scores = nominee_scores(&index, &weights);
    rank_nominees(&index, &weights, &scores)
}
