use crate::datasource::{ElectionDataSource, SEARCH_LIMIT, STATUS_LIMIT};
use crate::domain::{Candidate, Election, EnrichedPledge, Pledge, PledgeStatistics, PledgeStatus};
use crate::error::{Result, TrackerError};
use crate::region::RegionKey;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Hosted-database adapter speaking to the Supabase PostgREST API.
///
/// One network round trip per operation; connection pooling is
/// whatever `reqwest::Client` provides. No retries and no timeouts at
/// this layer. Filtering, ordering and row caps are pushed to the
/// server so both backends return identically-shaped results; the one
/// exception is pledge statistics, which PostgREST cannot aggregate
/// conditionally in a single request, so they are bucketed client-side
/// from a status-only projection.
pub struct SupabaseDataSource {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
    ready: AtomicBool,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    status: String,
}

#[derive(Debug, Deserialize)]
struct PartyRow {
    party_name: String,
}

/// Row shape of the `pledges` + embedded `candidates!inner` join.
#[derive(Debug, Deserialize)]
struct JoinedPledgeRow {
    #[serde(flatten)]
    pledge: Pledge,
    candidates: JoinedCandidate,
}

#[derive(Debug, Deserialize)]
struct JoinedCandidate {
    name: String,
    sgg_name: String,
    party_name: Option<String>,
}

impl SupabaseDataSource {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            anon_key: anon_key.into(),
            client: reqwest::Client::new(),
            ready: AtomicBool::new(false),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(TrackerError::Uninitialized)
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        self.ensure_ready()?;
        let response = self
            .client
            .get(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Backend {
                message: format!("{table} query returned {status}: {body}"),
            });
        }
        Ok(response.json().await?)
    }
}

/// Quotes a value for a PostgREST `in.(...)` filter.
fn quote_in_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

#[async_trait]
impl ElectionDataSource for SupabaseDataSource {
    async fn init(&self) -> Result<()> {
        info!(url = %self.base_url, "probing Supabase connection");
        let response = self
            .client
            .get(self.rest_url("candidates"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .query(&[("select", "hubo_id"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| TrackerError::Connection(format!("Supabase unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Connection(format!(
                "Supabase connection probe returned {status}: {body}"
            )));
        }

        self.ready.store(true, Ordering::Release);
        info!("Supabase connection established");
        Ok(())
    }

    async fn get_winner_by_district(&self, district_name: &str) -> Result<Option<Candidate>> {
        debug!(district = district_name, "get_winner_by_district");
        let rows: Vec<Candidate> = self
            .fetch(
                "candidates",
                &[
                    ("select", "*".to_string()),
                    ("sgg_name", format!("eq.{district_name}")),
                    ("is_winner", "eq.true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn get_pledges_by_candidate(&self, candidate_id: i64) -> Result<Vec<Pledge>> {
        debug!(candidate_id, "get_pledges_by_candidate");
        self.fetch(
            "pledges",
            &[
                ("select", "*".to_string()),
                ("hubo_id", format!("eq.{candidate_id}")),
                ("order", "pledge_order.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_winners_by_region(
        &self,
        region: RegionKey,
        district_names: &[String],
    ) -> Result<Vec<Candidate>> {
        debug!(region = %region, districts = district_names.len(), "get_winners_by_region");
        if district_names.is_empty() {
            return Ok(Vec::new());
        }
        let names = district_names
            .iter()
            .map(|name| quote_in_value(name))
            .collect::<Vec<_>>()
            .join(",");
        self.fetch(
            "candidates",
            &[
                ("select", "*".to_string()),
                ("sgg_name", format!("in.({names})")),
                ("is_winner", "eq.true".to_string()),
                ("order", "sgg_name.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_pledge_statistics(&self, candidate_id: i64) -> Result<PledgeStatistics> {
        debug!(candidate_id, "get_pledge_statistics");
        let rows: Vec<StatusRow> = self
            .fetch(
                "pledges",
                &[
                    ("select", "status".to_string()),
                    ("hubo_id", format!("eq.{candidate_id}")),
                ],
            )
            .await?;
        Ok(PledgeStatistics::from_statuses(
            rows.iter().map(|row| row.status.as_str()),
        ))
    }

    async fn get_all_winners(&self) -> Result<Vec<Candidate>> {
        debug!("get_all_winners");
        self.fetch(
            "candidates",
            &[
                ("select", "*".to_string()),
                ("is_winner", "eq.true".to_string()),
                ("order", "sgg_name.asc".to_string()),
            ],
        )
        .await
    }

    async fn search_candidates(&self, query: &str) -> Result<Vec<Candidate>> {
        debug!(query, "search_candidates");
        let pattern = format!("*{query}*");
        self.fetch(
            "candidates",
            &[
                ("select", "*".to_string()),
                ("is_winner", "eq.true".to_string()),
                (
                    "or",
                    format!(
                        "(name.ilike.{pattern},party_name.ilike.{pattern},sgg_name.ilike.{pattern})"
                    ),
                ),
                ("order", "sgg_name.asc".to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )
        .await
    }

    async fn get_winners_by_party(&self, party_name: &str) -> Result<Vec<Candidate>> {
        debug!(party = party_name, "get_winners_by_party");
        self.fetch(
            "candidates",
            &[
                ("select", "*".to_string()),
                ("is_winner", "eq.true".to_string()),
                ("party_name", format!("eq.{party_name}")),
                ("order", "sgg_name.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_pledges_by_status(&self, status: PledgeStatus) -> Result<Vec<EnrichedPledge>> {
        debug!(status = %status, "get_pledges_by_status");
        let rows: Vec<JoinedPledgeRow> = self
            .fetch(
                "pledges",
                &[
                    (
                        "select",
                        "*,candidates!inner(name,sgg_name,party_name,is_winner)".to_string(),
                    ),
                    ("status", format!("eq.{status}")),
                    ("candidates.is_winner", "eq.true".to_string()),
                    ("order", "last_updated.desc".to_string()),
                    ("limit", STATUS_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| EnrichedPledge {
                pledge: row.pledge,
                candidate_name: row.candidates.name,
                sgg_name: row.candidates.sgg_name,
                party_name: row.candidates.party_name,
            })
            .collect())
    }

    async fn get_election(&self, election_id: &str) -> Result<Option<Election>> {
        debug!(election_id, "get_election");
        let rows: Vec<Election> = self
            .fetch(
                "elections",
                &[
                    ("select", "*".to_string()),
                    ("sg_id", format!("eq.{election_id}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn get_all_parties(&self) -> Result<Vec<String>> {
        debug!("get_all_parties");
        let rows: Vec<PartyRow> = self
            .fetch(
                "candidates",
                &[
                    ("select", "party_name".to_string()),
                    ("is_winner", "eq.true".to_string()),
                    ("party_name", "not.is.null".to_string()),
                    ("order", "party_name.asc".to_string()),
                ],
            )
            .await?;
        // Server-side DISTINCT is not available through PostgREST;
        // rows arrive sorted, so dedup keeps one per party.
        let mut parties: Vec<String> = rows.into_iter().map(|row| row.party_name).collect();
        parties.dedup();
        Ok(parties)
    }

    async fn close(&self) -> Result<()> {
        // The HTTP client manages its own connections; just bar
        // further queries.
        self.ready.store(false, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_filter_values_are_quoted() {
        assert_eq!(quote_in_value("종로구"), "\"종로구\"");
        assert_eq!(quote_in_value("중구·성동구 갑"), "\"중구·성동구 갑\"");
    }

    #[tokio::test]
    async fn queries_before_init_fail_uninitialized() {
        let source = SupabaseDataSource::new("https://example.supabase.co", "anon");
        let err = source.get_all_winners().await.unwrap_err();
        assert!(matches!(err, TrackerError::Uninitialized));
    }
}
