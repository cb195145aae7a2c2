use chrono::{DateTime, Utc};
use serde::Serialize;

// One stored nomination: `voter` named `nominee` at `cast_at`
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRecord {
    pub voter: String,
    pub nominee: String,
    pub cast_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new(voter: impl Into<String>, nominee: impl Into<String>, cast_at: DateTime<Utc>) -> Self {
        Self {
            voter: voter.into(),
            nominee: nominee.into(),
            cast_at,
        }
    }
}

// Weight is unrounded; only nominee rows are rounded for display
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantWeight {
    pub participant: String,
    pub received_count: usize,
    pub weight: f64,
}

/// Ranked entry for a single nominee. `score` and `weight` are the
/// display values, rounded to three decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NomineeScore {
    pub nominee: String,
    pub received_count: usize,
    pub weight: f64,
    pub score: f64,
    pub voters: Vec<String>,
}

// Legacy read shape: counts only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyTally {
    pub nominee: String,
    pub received_count: usize,
    pub voters: Vec<String>,
}

impl From<&NomineeScore> for LegacyTally {
    fn from(score: &NomineeScore) -> Self {
        Self {
            nominee: score.nominee.clone(),
            received_count: score.received_count,
            voters: score.voters.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsResponse {
    pub results: Vec<NomineeScore>,
    pub total_votes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRankingsResponse {
    pub results: Vec<LegacyTally>,
    pub total_votes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub voter: String,
    pub votes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rankings_response_uses_camel_case_total() {
        let response = RankingsResponse {
            results: vec![NomineeScore {
                nominee: "Ada".to_string(),
                received_count: 2,
                weight: 1.099,
                score: 0.693,
                voters: vec!["Bo".to_string(), "Cy".to_string()],
            }],
            total_votes: 3,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalVotes"], 3);
        assert_eq!(json["results"][0]["received_count"], 2);
        assert_eq!(json["results"][0]["voters"][1], "Cy");
    }

    #[test]
    fn legacy_projection_drops_weighting() {
        let score = NomineeScore {
            nominee: "Ada".to_string(),
            received_count: 1,
            weight: 0.693,
            score: 0.0,
            voters: vec!["Bo".to_string()],
        };

        let json = serde_json::to_value(LegacyTally::from(&score)).unwrap();
        assert!(json.get("score").is_none());
        assert!(json.get("weight").is_none());
        assert_eq!(json["nominee"], "Ada");
    }
}
