//! Offline enrichment: writes the `metro_city` column onto the
//! Candidates table of the SQLite file. This is the only code path in
//! the crate that mutates data, and it runs against its own
//! read-write connection, never through a data source.
//!
//! Classification goes through [`crate::region::classify_district`],
//! the same function the live aggregation uses, so the stored labels
//! cannot drift from what the application computes at render time.

use crate::error::{Result, TrackerError};
use crate::region::classify_district;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct BackfillOutcome {
    pub updated: usize,
    pub skipped: usize,
    /// (metro label, candidate count), largest first.
    pub distribution: Vec<(String, u32)>,
}

pub fn backfill_metro_city<P: AsRef<Path>>(db_path: P) -> Result<BackfillOutcome> {
    let db_path = db_path.as_ref();
    info!(path = %db_path.display(), "backfilling metro_city");

    if !db_path.exists() {
        return Err(TrackerError::Connection(format!(
            "database file '{}' does not exist",
            db_path.display()
        )));
    }
    let mut conn = Connection::open(db_path)?;

    if !has_metro_city_column(&conn)? {
        info!("adding metro_city column");
        conn.execute_batch("ALTER TABLE Candidates ADD COLUMN metro_city TEXT")?;
    }

    let candidates: Vec<(i64, String, Option<String>)> = {
        let mut stmt = conn.prepare("SELECT hubo_id, name, sgg_name FROM Candidates")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    debug!(count = candidates.len(), "classifying candidates");

    let mut outcome = BackfillOutcome::default();
    let tx = conn.transaction()?;
    for (hubo_id, name, sgg_name) in &candidates {
        let region = classify_district(sgg_name.as_deref(), Some(name));
        match region.metro_label() {
            Some(label) => {
                tx.execute(
                    "UPDATE Candidates SET metro_city = ?1 WHERE hubo_id = ?2",
                    params![label, hubo_id],
                )?;
                outcome.updated += 1;
            }
            None => {
                outcome.skipped += 1;
                warn!(hubo_id, district = sgg_name.as_deref(), "no metro city match");
            }
        }
    }
    tx.commit()?;

    outcome.distribution = {
        let mut stmt = conn.prepare(
            "SELECT metro_city, COUNT(*) FROM Candidates
             WHERE metro_city IS NOT NULL
             GROUP BY metro_city
             ORDER BY COUNT(*) DESC, metro_city ASC",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    info!(updated = outcome.updated, skipped = outcome.skipped, "backfill complete");
    Ok(outcome)
}

fn has_metro_city_column(conn: &Connection) -> Result<bool> {
    let mut stmt = conn.prepare("PRAGMA table_info(Candidates)")?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == "metro_city" {
            return Ok(true);
        }
    }
    Ok(false)
}
