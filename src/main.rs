use clap::{Parser, Subcommand};
use pledge_tracker::aggregate::{summarize_by_region, unclassified_winners};
use pledge_tracker::config::{Backend, Config};
use pledge_tracker::datasource::{create_data_source, ElectionDataSource};
use pledge_tracker::domain::PledgeStatus;
use pledge_tracker::enrich::backfill_metro_city;
use pledge_tracker::error::Result;
use pledge_tracker::region::{region_info, RegionKey};
use pledge_tracker::logging;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "pledge_tracker")]
#[command(about = "Query elected officials' campaign pledges")]
#[command(version = "0.1.0")]
struct Cli {
    /// Override the configured backend (local, supabase)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List winners, optionally filtered by party or region
    Winners {
        #[arg(long)]
        party: Option<String>,
        /// Region key, e.g. seoul, busan, gyeongnam
        #[arg(long)]
        region: Option<String>,
    },
    /// List a candidate's pledges
    Pledges {
        #[arg(long)]
        candidate: i64,
    },
    /// Show a candidate's pledge-fulfilment statistics
    Stats {
        #[arg(long)]
        candidate: i64,
    },
    /// Search winners by name, party or district
    Search { query: String },
    /// List winners' pledges in a given status (준비중/진행중/완료/보류/중단)
    Status { status: String },
    /// Show election metadata
    Election { sg_id: String },
    /// List all parties with at least one winner
    Parties,
    /// Per-region seat summary
    Regions,
    /// Populate the metro_city column of the SQLite file
    BackfillRegions {
        /// Database file; defaults to the configured local db_path
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(backend) = &cli.backend {
        config.backend = match backend.as_str() {
            "local" => Backend::Local,
            "supabase" => Backend::Supabase,
            other => anyhow::bail!("unknown backend '{other}' (expected local or supabase)"),
        };
    }

    // The backfill opens its own read-write connection; everything
    // else goes through a data source built once and passed down.
    if let Commands::BackfillRegions { db } = &cli.command {
        let path = db.clone().unwrap_or_else(|| config.local.db_path.clone());
        let outcome = backfill_metro_city(&path)?;
        println!("✅ Backfill complete: {} updated, {} skipped", outcome.updated, outcome.skipped);
        println!("   Distribution:");
        for (label, count) in &outcome.distribution {
            println!("   {label}: {count}");
        }
        return Ok(());
    }

    let source = create_data_source(&config).await.map_err(|e| {
        error!("failed to initialize data source: {e}");
        e
    })?;

    let result = run_command(&cli.command, source.clone()).await;
    source.close().await?;
    result?;
    Ok(())
}

async fn run_command(command: &Commands, source: Arc<dyn ElectionDataSource>) -> Result<()> {
    match command {
        Commands::Winners { party, region } => {
            let winners = match party {
                Some(party) => source.get_winners_by_party(party).await?,
                None => source.get_all_winners().await?,
            };
            let winners = match region {
                Some(region) => {
                    let key: RegionKey = region.parse().map_err(config_err)?;
                    winners
                        .into_iter()
                        .filter(|w| {
                            pledge_tracker::region::classify_district(
                                Some(&w.sgg_name),
                                Some(&w.name),
                            ) == key
                        })
                        .collect()
                }
                None => winners,
            };
            println!("🏛️  {} winners", winners.len());
            for winner in &winners {
                println!(
                    "   {} | {} | {}",
                    winner.sgg_name,
                    winner.name,
                    winner.party_name.as_deref().unwrap_or("무소속")
                );
            }
        }
        Commands::Pledges { candidate } => {
            let pledges = source.get_pledges_by_candidate(*candidate).await?;
            if pledges.is_empty() {
                println!("No pledges found for candidate {candidate}");
            }
            for pledge in &pledges {
                println!("   [{}] {} ({})", pledge.pledge_order, pledge.pledge_title, pledge.status);
            }
        }
        Commands::Stats { candidate } => {
            let stats = source.get_pledge_statistics(*candidate).await?;
            println!("📊 Pledge statistics for candidate {candidate}:");
            println!("   Total: {}", stats.total);
            println!("   완료: {}", stats.completed);
            println!("   진행중: {}", stats.in_progress);
            println!("   준비중: {}", stats.pending);
            println!("   보류/중단: {}", stats.suspended);
        }
        Commands::Search { query } => {
            let results = source.search_candidates(query).await?;
            println!("🔍 {} result(s) for '{query}'", results.len());
            for candidate in &results {
                println!(
                    "   {} | {} | {}",
                    candidate.sgg_name,
                    candidate.name,
                    candidate.party_name.as_deref().unwrap_or("무소속")
                );
            }
        }
        Commands::Status { status } => {
            let status: PledgeStatus = status.parse().map_err(config_err)?;
            let pledges = source.get_pledges_by_status(status).await?;
            println!("📋 {} pledge(s) in status {status}", pledges.len());
            for entry in &pledges {
                println!(
                    "   {} ({}, {}) — {}",
                    entry.candidate_name,
                    entry.sgg_name,
                    entry.party_name.as_deref().unwrap_or("무소속"),
                    entry.pledge.pledge_title
                );
            }
        }
        Commands::Election { sg_id } => match source.get_election(sg_id).await? {
            Some(election) => {
                println!(
                    "🗳️  {} — {} ({})",
                    election.sg_id,
                    election.election_name.as_deref().unwrap_or("?"),
                    election.election_date.as_deref().unwrap_or("?")
                );
            }
            None => println!("No election found with id {sg_id}"),
        },
        Commands::Parties => {
            for party in source.get_all_parties().await? {
                println!("   {party}");
            }
        }
        Commands::Regions => {
            let winners = source.get_all_winners().await?;
            let unclassified = unclassified_winners(&winners);
            if !unclassified.is_empty() {
                warn!(count = unclassified.len(), "winners with unclassifiable districts");
            }
            for summary in summarize_by_region(&winners) {
                let name = region_info(summary.key).map(|i| i.name).unwrap_or("?");
                println!(
                    "   {} ({}): {} seats, leading: {}",
                    name,
                    summary.key,
                    summary.total_seats,
                    summary.leading_party.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::BackfillRegions { .. } => unreachable!("handled before data source setup"),
    }
    Ok(())
}

fn config_err(message: String) -> pledge_tracker::error::TrackerError {
    pledge_tracker::error::TrackerError::Config(message)
}
