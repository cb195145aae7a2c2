use crate::models::VoteRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Lookup tables built once from a snapshot of vote records.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VoteIndex {
    pub received_counts: BTreeMap<String, usize>,
    // Nominees in the order each voter cast them
    pub nominations_by_voter: BTreeMap<String, Vec<String>>,
    // Voters of every record naming the nominee, in record order
    pub voters_by_nominee: BTreeMap<String, Vec<String>>,
    pub participants: BTreeSet<String>,
}

impl VoteIndex {
    pub fn build(records: &[VoteRecord]) -> Self {
        let mut index = VoteIndex::default();

        for record in records {
            *index.received_counts.entry(record.nominee.clone()).or_insert(0) += 1;

            index
                .nominations_by_voter
                .entry(record.voter.clone())
                .or_default()
                .push(record.nominee.clone());

            index
                .voters_by_nominee
                .entry(record.nominee.clone())
                .or_default()
                .push(record.voter.clone());

            index.participants.insert(record.voter.clone());
            index.participants.insert(record.nominee.clone());
        }

        index
    }

    pub fn received(&self, participant: &str) -> usize {
        self.received_counts.get(participant).copied().unwrap_or(0)
    }

    // Number of records cast, duplicates included
    pub fn out_degree(&self, voter: &str) -> usize {
        self.nominations_by_voter.get(voter).map_or(0, Vec::len)
    }
}
