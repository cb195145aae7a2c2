use crate::db::VoteStore;
use crate::error::{SubmitError, ValidationError};
use crate::models::SubmitReceipt;
use log::{info, warn};

/// A validated submission: a trimmed voter name and the nominations in the
/// order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub voter: String,
    pub nominees: Vec<String>,
}

impl Ballot {
    pub fn parse(name: &str, text: &str) -> Result<Self, ValidationError> {
        let voter = name.trim();
        if voter.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let nominees: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if nominees.is_empty() {
            return Err(ValidationError::EmptyNominations);
        }

        Ok(Self {
            voter: voter.to_string(),
            nominees,
        })
    }
}

// Validates and stores a submission, replacing the voter's earlier ballot
pub async fn submit_ballot(store: &dyn VoteStore, name: &str, text: &str) -> Result<SubmitReceipt, SubmitError> {
    let ballot = match Ballot::parse(name, text) {
        Ok(ballot) => ballot,
        Err(e) => {
            warn!("Rejected submission: {}", e);
            return Err(e.into());
        }
    };

    let votes = store.replace_voter_records(&ballot.voter, &ballot.nominees).await?;
    info!("Stored {} nomination(s) for {}", votes, ballot.voter);

    Ok(SubmitReceipt {
        voter: ballot.voter,
        votes,
    })
}
