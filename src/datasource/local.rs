use crate::datasource::{ElectionDataSource, SEARCH_LIMIT, STATUS_LIMIT};
use crate::domain::{Candidate, Election, EnrichedPledge, Pledge, PledgeStatistics, PledgeStatus};
use crate::error::{Result, TrackerError};
use crate::region::RegionKey;
use async_trait::async_trait;
use rusqlite::backup::Backup;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Embedded-database adapter backed by a SQLite file.
///
/// `init` copies the whole file into an in-memory connection via the
/// SQLite backup API; every subsequent query runs against that copy
/// and never touches disk again. The source file is treated as
/// read-only (the offline backfill opens its own read-write
/// connection).
pub struct LocalDataSource {
    db_path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl LocalDataSource {
    pub fn new<P: Into<PathBuf>>(db_path: P) -> Self {
        Self {
            db_path: db_path.into(),
            conn: Mutex::new(None),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap();
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(TrackerError::Uninitialized),
        }
    }

    fn query_candidates(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Candidate>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params, candidate_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<Candidate> {
    Ok(Candidate {
        hubo_id: row.get("hubo_id")?,
        name: row.get("name")?,
        party_name: row.get("party_name")?,
        sgg_name: row.get("sgg_name")?,
        is_winner: row.get::<_, i64>("is_winner")? != 0,
        age: row.get("age")?,
        gender: row.get("gender")?,
        job: row.get("job")?,
        edu: row.get("edu")?,
        career1: row.get("career1")?,
        career2: row.get("career2")?,
        votes_won: row.get("votes_won")?,
        vote_percentage: row.get("vote_percentage")?,
        // Column only exists once the backfill has run.
        metro_city: row.get("metro_city").unwrap_or(None),
    })
}

fn pledge_from_row(row: &Row<'_>) -> rusqlite::Result<Pledge> {
    Ok(Pledge {
        pledge_id: row.get("pledge_id")?,
        hubo_id: row.get("hubo_id")?,
        pledge_order: row.get("pledge_order")?,
        pledge_realm: row.get("pledge_realm")?,
        pledge_title: row.get("pledge_title")?,
        pledge_content: row.get("pledge_content")?,
        status: row.get("status")?,
        last_updated: row.get("last_updated")?,
    })
}

#[async_trait]
impl ElectionDataSource for LocalDataSource {
    async fn init(&self) -> Result<()> {
        info!(path = %self.db_path.display(), "loading election database");

        let src = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                TrackerError::Connection(format!(
                    "cannot open database file '{}': {e}",
                    self.db_path.display()
                ))
            })?;

        let mut mem = Connection::open_in_memory()?;
        {
            let backup = Backup::new(&src, &mut mem)?;
            backup.run_to_completion(64, Duration::from_millis(0), None)?;
        }
        drop(src);

        // Sanity-check the schema before accepting the file.
        let tables: Vec<String> = {
            let mut stmt =
                mem.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        debug!(?tables, "loaded tables");
        for required in ["Candidates", "Pledges"] {
            if !tables.iter().any(|t| t == required) {
                return Err(TrackerError::Connection(format!(
                    "database file '{}' is missing the {required} table",
                    self.db_path.display()
                )));
            }
        }

        *self.conn.lock().unwrap() = Some(mem);
        info!("election database loaded into memory");
        Ok(())
    }

    async fn get_winner_by_district(&self, district_name: &str) -> Result<Option<Candidate>> {
        debug!(district = district_name, "get_winner_by_district");
        let rows = self.query_candidates(
            "SELECT * FROM Candidates WHERE sgg_name = ?1 AND is_winner = 1 LIMIT 1",
            [district_name],
        )?;
        Ok(rows.into_iter().next())
    }

    async fn get_pledges_by_candidate(&self, candidate_id: i64) -> Result<Vec<Pledge>> {
        debug!(candidate_id, "get_pledges_by_candidate");
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM Pledges WHERE hubo_id = ?1 ORDER BY pledge_order ASC")?;
            let rows = stmt.query_map([candidate_id], pledge_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
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
        let placeholders = district_names
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "SELECT * FROM Candidates WHERE sgg_name IN ({placeholders}) AND is_winner = 1 \
             ORDER BY sgg_name ASC"
        );
        self.query_candidates(&sql, params_from_iter(district_names.iter()))
    }

    async fn get_pledge_statistics(&self, candidate_id: i64) -> Result<PledgeStatistics> {
        debug!(candidate_id, "get_pledge_statistics");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT
                    COUNT(*) AS total,
                    COALESCE(SUM(CASE WHEN status = '완료' THEN 1 ELSE 0 END), 0) AS completed,
                    COALESCE(SUM(CASE WHEN status = '진행중' THEN 1 ELSE 0 END), 0) AS in_progress,
                    COALESCE(SUM(CASE WHEN status = '준비중' THEN 1 ELSE 0 END), 0) AS pending,
                    COALESCE(SUM(CASE WHEN status = '보류' OR status = '중단' THEN 1 ELSE 0 END), 0) AS suspended
                 FROM Pledges WHERE hubo_id = ?1",
            )?;
            let stats = stmt.query_row([candidate_id], |row| {
                Ok(PledgeStatistics {
                    total: row.get::<_, i64>("total")? as u32,
                    completed: row.get::<_, i64>("completed")? as u32,
                    in_progress: row.get::<_, i64>("in_progress")? as u32,
                    pending: row.get::<_, i64>("pending")? as u32,
                    suspended: row.get::<_, i64>("suspended")? as u32,
                })
            })?;
            Ok(stats)
        })
    }

    async fn get_all_winners(&self) -> Result<Vec<Candidate>> {
        debug!("get_all_winners");
        self.query_candidates(
            "SELECT * FROM Candidates WHERE is_winner = 1 ORDER BY sgg_name ASC",
            [],
        )
    }

    async fn search_candidates(&self, query: &str) -> Result<Vec<Candidate>> {
        debug!(query, "search_candidates");
        let pattern = format!("%{query}%");
        self.query_candidates(
            "SELECT * FROM Candidates
             WHERE is_winner = 1
               AND (name LIKE ?1 OR party_name LIKE ?1 OR sgg_name LIKE ?1)
             ORDER BY sgg_name ASC
             LIMIT ?2",
            rusqlite::params![pattern, SEARCH_LIMIT],
        )
    }

    async fn get_winners_by_party(&self, party_name: &str) -> Result<Vec<Candidate>> {
        debug!(party = party_name, "get_winners_by_party");
        self.query_candidates(
            "SELECT * FROM Candidates WHERE is_winner = 1 AND party_name = ?1 \
             ORDER BY sgg_name ASC",
            [party_name],
        )
    }

    async fn get_pledges_by_status(&self, status: PledgeStatus) -> Result<Vec<EnrichedPledge>> {
        debug!(status = %status, "get_pledges_by_status");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.*, c.name AS candidate_name, c.sgg_name, c.party_name
                 FROM Pledges p
                 JOIN Candidates c ON p.hubo_id = c.hubo_id
                 WHERE p.status = ?1 AND c.is_winner = 1
                 ORDER BY p.last_updated DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(rusqlite::params![status.as_str(), STATUS_LIMIT], |row| {
                Ok(EnrichedPledge {
                    pledge: pledge_from_row(row)?,
                    candidate_name: row.get("candidate_name")?,
                    sgg_name: row.get("sgg_name")?,
                    party_name: row.get("party_name")?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    async fn get_election(&self, election_id: &str) -> Result<Option<Election>> {
        debug!(election_id, "get_election");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM Elections WHERE sg_id = ?1 LIMIT 1")?;
            let mut rows = stmt.query_map([election_id], |row| {
                Ok(Election {
                    sg_id: row.get("sg_id")?,
                    election_name: row.get("election_name")?,
                    election_date: row.get("election_date")?,
                })
            })?;
            match rows.next() {
                Some(election) => Ok(Some(election?)),
                None => Ok(None),
            }
        })
    }

    async fn get_all_parties(&self) -> Result<Vec<String>> {
        debug!("get_all_parties");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT party_name FROM Candidates
                 WHERE is_winner = 1 AND party_name IS NOT NULL
                 ORDER BY party_name ASC",
            )?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock().unwrap();
        if guard.take().is_some() {
            info!("election database connection closed");
        }
        Ok(())
    }
}
