use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A person who ran in the election. Winners are the subset with
/// `is_winner` set; every read operation in this crate is scoped to
/// winners except raw pledge lookups by candidate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub hubo_id: i64,
    pub name: String,
    pub party_name: Option<String>,
    /// Electoral district name, free text. Not globally unique: many
    /// metro cities have a 남구/중구/동구.
    pub sgg_name: String,
    pub is_winner: bool,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub job: Option<String>,
    pub edu: Option<String>,
    pub career1: Option<String>,
    pub career2: Option<String>,
    pub votes_won: Option<i64>,
    pub vote_percentage: Option<f64>,
    /// Korean metro/province label written by the offline backfill
    /// (`enrich::backfill_metro_city`). Absent until that has run.
    #[serde(default)]
    pub metro_city: Option<String>,
}

/// A campaign promise belonging to exactly one candidate.
///
/// `status` is kept as the raw transport string so that values outside
/// the known vocabulary survive a round trip; [`PledgeStatus`] is the
/// closed vocabulary used for filtering and statistics bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pledge {
    pub pledge_id: i64,
    pub hubo_id: i64,
    pub pledge_order: i64,
    pub pledge_realm: Option<String>,
    pub pledge_title: String,
    pub pledge_content: Option<String>,
    pub status: String,
    pub last_updated: Option<String>,
}

impl Pledge {
    pub fn status(&self) -> Option<PledgeStatus> {
        self.status.parse().ok()
    }

    /// Parses `last_updated` into a timestamp where the backend stored
    /// an RFC 3339 value. SQLite sources may store bare strings, in
    /// which case this returns None and callers fall back to the raw
    /// text.
    pub fn last_updated_time(&self) -> Option<DateTime<FixedOffset>> {
        self.last_updated
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

/// A pledge joined with identifying fields of its (winning) candidate,
/// as returned by `get_pledges_by_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPledge {
    #[serde(flatten)]
    pub pledge: Pledge,
    pub candidate_name: String,
    pub sgg_name: String,
    pub party_name: Option<String>,
}

/// Read-only election metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    pub sg_id: String,
    pub election_name: Option<String>,
    pub election_date: Option<String>,
}

/// Pledge lifecycle states as stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PledgeStatus {
    /// 준비중
    Pending,
    /// 진행중
    InProgress,
    /// 완료
    Completed,
    /// 보류
    OnHold,
    /// 중단
    Suspended,
}

impl PledgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PledgeStatus::Pending => "준비중",
            PledgeStatus::InProgress => "진행중",
            PledgeStatus::Completed => "완료",
            PledgeStatus::OnHold => "보류",
            PledgeStatus::Suspended => "중단",
        }
    }

    pub const ALL: [PledgeStatus; 5] = [
        PledgeStatus::Pending,
        PledgeStatus::InProgress,
        PledgeStatus::Completed,
        PledgeStatus::OnHold,
        PledgeStatus::Suspended,
    ];
}

impl fmt::Display for PledgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PledgeStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "준비중" => Ok(PledgeStatus::Pending),
            "진행중" => Ok(PledgeStatus::InProgress),
            "완료" => Ok(PledgeStatus::Completed),
            "보류" => Ok(PledgeStatus::OnHold),
            "중단" => Ok(PledgeStatus::Suspended),
            other => Err(format!("unknown pledge status: {other}")),
        }
    }
}

/// Counts of a candidate's pledges by status bucket. Derived on
/// demand, never persisted. 보류 and 중단 share the `suspended`
/// bucket, matching how the dataset has always been reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeStatistics {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub pending: u32,
    pub suspended: u32,
}

impl PledgeStatistics {
    /// The single bucketing policy. Every adapter that aggregates
    /// client-side goes through here so the buckets cannot drift
    /// between backends.
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = PledgeStatistics::default();
        for status in statuses {
            stats.total += 1;
            match status.parse::<PledgeStatus>() {
                Ok(PledgeStatus::Completed) => stats.completed += 1,
                Ok(PledgeStatus::InProgress) => stats.in_progress += 1,
                Ok(PledgeStatus::Pending) => stats.pending += 1,
                Ok(PledgeStatus::OnHold) | Ok(PledgeStatus::Suspended) => stats.suspended += 1,
                // Unknown statuses count toward the total only.
                Err(_) => {}
            }
        }
        stats
    }

    pub fn from_pledges(pledges: &[Pledge]) -> Self {
        Self::from_statuses(pledges.iter().map(|p| p.status.as_str()))
    }

    /// Sum of the named buckets; equals `total` when every status in
    /// the source was a known vocabulary value.
    pub fn bucket_sum(&self) -> u32 {
        self.completed + self.in_progress + self.pending + self.suspended
    }
}
