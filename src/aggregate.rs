//! Region-level aggregation over winner records. This is the live
//! consumer of the classifier: winners are bucketed by
//! [`classify_district`] and summarized into per-party seat counts for
//! display.

use crate::domain::Candidate;
use crate::region::{classify_district, RegionKey};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    pub key: RegionKey,
    pub total_seats: usize,
    /// Seats per party, most seats first, ties broken by party name.
    pub party_seats: Vec<(String, usize)>,
    pub leading_party: Option<String>,
}

/// Buckets winners into the 17 regions and computes seat counts per
/// party. Candidates the classifier cannot place are left out; see
/// [`unclassified_winners`].
pub fn summarize_by_region(winners: &[Candidate]) -> Vec<RegionSummary> {
    let mut buckets: HashMap<RegionKey, Vec<&Candidate>> = HashMap::new();
    for winner in winners {
        let key = classify_district(Some(&winner.sgg_name), Some(&winner.name));
        buckets.entry(key).or_default().push(winner);
    }

    RegionKey::REGIONS
        .iter()
        .map(|&key| {
            let region_winners = buckets.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            let mut party_seats: HashMap<String, usize> = HashMap::new();
            for winner in region_winners {
                let party = winner
                    .party_name
                    .clone()
                    .unwrap_or_else(|| "무소속".to_string());
                *party_seats.entry(party).or_insert(0) += 1;
            }
            let mut party_seats: Vec<(String, usize)> = party_seats.into_iter().collect();
            party_seats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let leading_party = party_seats.first().map(|(party, _)| party.clone());
            RegionSummary {
                key,
                total_seats: region_winners.len(),
                party_seats,
                leading_party,
            }
        })
        .collect()
}

/// Winners whose district no classification rule covers.
pub fn unclassified_winners(winners: &[Candidate]) -> Vec<&Candidate> {
    winners
        .iter()
        .filter(|w| classify_district(Some(&w.sgg_name), Some(&w.name)) == RegionKey::Unknown)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(hubo_id: i64, name: &str, party: Option<&str>, district: &str) -> Candidate {
        Candidate {
            hubo_id,
            name: name.to_string(),
            party_name: party.map(String::from),
            sgg_name: district.to_string(),
            is_winner: true,
            age: None,
            gender: None,
            job: None,
            edu: None,
            career1: None,
            career2: None,
            votes_won: None,
            vote_percentage: None,
            metro_city: None,
        }
    }

    #[test]
    fn winners_bucket_into_their_regions() {
        let winners = vec![
            winner(1, "가나다", Some("A당"), "종로구"),
            winner(2, "라마바", Some("A당"), "동대문구갑"),
            winner(3, "사아자", Some("B당"), "해운대구갑"),
            winner(4, "차카타", Some("B당"), "수원시갑"),
        ];
        let summaries = summarize_by_region(&winners);
        let seoul = summaries.iter().find(|s| s.key == RegionKey::Seoul).unwrap();
        assert_eq!(seoul.total_seats, 2);
        assert_eq!(seoul.leading_party.as_deref(), Some("A당"));
        let busan = summaries.iter().find(|s| s.key == RegionKey::Busan).unwrap();
        assert_eq!(busan.total_seats, 1);
        let jeju = summaries.iter().find(|s| s.key == RegionKey::Jeju).unwrap();
        assert_eq!(jeju.total_seats, 0);
        assert!(jeju.leading_party.is_none());
    }

    #[test]
    fn leading_party_ties_break_by_name() {
        let winners = vec![
            winner(1, "가나다", Some("나당"), "종로구"),
            winner(2, "라마바", Some("가당"), "용산구"),
        ];
        let summaries = summarize_by_region(&winners);
        let seoul = summaries.iter().find(|s| s.key == RegionKey::Seoul).unwrap();
        assert_eq!(seoul.leading_party.as_deref(), Some("가당"));
    }

    #[test]
    fn missing_party_counts_as_independent() {
        let winners = vec![winner(1, "가나다", None, "종로구")];
        let summaries = summarize_by_region(&winners);
        let seoul = summaries.iter().find(|s| s.key == RegionKey::Seoul).unwrap();
        assert_eq!(seoul.party_seats, vec![("무소속".to_string(), 1)]);
    }

    #[test]
    fn unknown_districts_are_reported_not_dropped_silently() {
        let winners = vec![
            winner(1, "가나다", Some("A당"), "종로구"),
            winner(2, "라마바", Some("A당"), "바다마을"),
        ];
        let unclassified = unclassified_winners(&winners);
        assert_eq!(unclassified.len(), 1);
        assert_eq!(unclassified[0].hubo_id, 2);
        let total: usize = summarize_by_region(&winners)
            .iter()
            .map(|s| s.total_seats)
            .sum();
        assert_eq!(total, 1);
    }
}
