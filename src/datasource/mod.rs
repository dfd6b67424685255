//! The data-source abstraction: one contract, two interchangeable
//! backends. Consumers hold an `Arc<dyn ElectionDataSource>` built
//! once at startup and passed in explicitly; there is no ambient
//! global instance.

mod local;
mod supabase;

pub use local::LocalDataSource;
pub use supabase::SupabaseDataSource;

use crate::config::{Backend, Config};
use crate::domain::{Candidate, Election, EnrichedPledge, Pledge, PledgeStatistics, PledgeStatus};
use crate::error::Result;
use crate::region::RegionKey;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Maximum rows returned by `search_candidates`.
pub const SEARCH_LIMIT: u32 = 50;
/// Maximum rows returned by `get_pledges_by_status`.
pub const STATUS_LIMIT: u32 = 100;

/// Contract every election-data backend implements. All operations are
/// reads; the underlying data is only ever mutated by offline tooling
/// ([`crate::enrich`]).
///
/// `init` must complete before any query; queries issued earlier fail
/// with [`crate::error::TrackerError::Uninitialized`]. Backend faults
/// propagate as typed errors carrying the cause; absence of a record
/// is `Ok(None)` or an empty `Vec`, never an error. The layer performs
/// no retries and enforces no timeouts.
///
/// For identical underlying data, every implementation must return the
/// same logical records field-for-field; the equivalence test suite
/// holds new adapters to that.
#[async_trait]
pub trait ElectionDataSource: Send + Sync {
    /// Opens the backend. Fails with a connection error when the data
    /// file is missing/malformed or the hosted service is unreachable.
    async fn init(&self) -> Result<()>;

    /// Exact-match lookup of the winner for a district name. When the
    /// source data anomalously holds several winners for one name, any
    /// one of them is returned.
    async fn get_winner_by_district(&self, district_name: &str) -> Result<Option<Candidate>>;

    /// A candidate's pledges ordered by `pledge_order` ascending.
    async fn get_pledges_by_candidate(&self, candidate_id: i64) -> Result<Vec<Pledge>>;

    /// Winners whose district is in `district_names` (exact string
    /// membership), ordered by district name. The region key is
    /// informational; the filter is the name list.
    async fn get_winners_by_region(
        &self,
        region: RegionKey,
        district_names: &[String],
    ) -> Result<Vec<Candidate>>;

    /// Status-bucket counts over a candidate's pledges. Always equals
    /// a manual scan of `get_pledges_by_candidate` grouped by status.
    async fn get_pledge_statistics(&self, candidate_id: i64) -> Result<PledgeStatistics>;

    /// Every winner, ordered by district name ascending.
    async fn get_all_winners(&self) -> Result<Vec<Candidate>>;

    /// Case-insensitive substring search over winner name, party and
    /// district; at most [`SEARCH_LIMIT`] rows, ordered by district.
    async fn search_candidates(&self, query: &str) -> Result<Vec<Candidate>>;

    /// Winners of one party (exact name match), ordered by district.
    async fn get_winners_by_party(&self, party_name: &str) -> Result<Vec<Candidate>>;

    /// Winners' pledges in the given status, enriched with the owning
    /// candidate's name/district/party; newest `last_updated` first,
    /// at most [`STATUS_LIMIT`] rows.
    async fn get_pledges_by_status(&self, status: PledgeStatus) -> Result<Vec<EnrichedPledge>>;

    /// Election metadata by id (e.g. "20240410").
    async fn get_election(&self, election_id: &str) -> Result<Option<Election>>;

    /// Distinct party names among winners, ascending.
    async fn get_all_parties(&self) -> Result<Vec<String>>;

    /// Releases backend resources. Safe to call even if `init` never
    /// completed, and more than once.
    async fn close(&self) -> Result<()>;
}

/// Builds and initializes the configured backend. Call once at process
/// start and pass the handle down to whatever consumes it.
pub async fn create_data_source(config: &Config) -> Result<Arc<dyn ElectionDataSource>> {
    let source: Arc<dyn ElectionDataSource> = match config.backend {
        Backend::Local => {
            info!(db_path = %config.local.db_path, "using embedded SQLite backend");
            Arc::new(LocalDataSource::new(&config.local.db_path))
        }
        Backend::Supabase => {
            let url = config.supabase_url()?;
            let anon_key = config.supabase_anon_key()?;
            info!(%url, "using hosted Supabase backend");
            Arc::new(SupabaseDataSource::new(url, anon_key))
        }
    };
    source.init().await?;
    Ok(source)
}
