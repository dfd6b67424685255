#![allow(dead_code)]

//! Shared fixture for the adapter test suites: one logical dataset,
//! materialized both as a SQLite file (embedded backend) and as
//! PostgREST JSON bodies (hosted backend), so the equivalence suite
//! compares adapters over identical underlying data.

use pledge_tracker::domain::{Candidate, Election, EnrichedPledge, Pledge};
use rusqlite::{params, Connection};
use std::path::Path;

pub fn candidate(
    hubo_id: i64,
    name: &str,
    party: Option<&str>,
    district: &str,
    is_winner: bool,
) -> Candidate {
    Candidate {
        hubo_id,
        name: name.to_string(),
        party_name: party.map(String::from),
        sgg_name: district.to_string(),
        is_winner,
        age: Some(50 + hubo_id % 10),
        gender: Some("남".to_string()),
        job: Some("정치인".to_string()),
        edu: Some("대졸".to_string()),
        career1: Some(format!("{name} 경력1")),
        career2: None,
        votes_won: Some(40_000 + hubo_id * 100),
        vote_percentage: Some(48.5 + hubo_id as f64 / 10.0),
        metro_city: None,
    }
}

pub fn sample_candidates() -> Vec<Candidate> {
    vec![
        candidate(101, "김민준", Some("더불어민주당"), "종로구", true),
        candidate(102, "이서연", Some("국민의힘"), "해운대구갑", true),
        candidate(103, "박수영", Some("국민의힘"), "남구", true),
        candidate(104, "최지우", Some("더불어민주당"), "김해시을", true),
        candidate(105, "정도윤", None, "수원시갑", true),
        candidate(106, "한예은", Some("더불어민주당"), "종로구", false),
    ]
}

fn pledge(
    pledge_id: i64,
    hubo_id: i64,
    order: i64,
    status: &str,
    last_updated: &str,
) -> Pledge {
    Pledge {
        pledge_id,
        hubo_id,
        pledge_order: order,
        pledge_realm: Some("지역".to_string()),
        pledge_title: format!("공약 {pledge_id}"),
        pledge_content: Some(format!("공약 {pledge_id}의 내용")),
        status: status.to_string(),
        last_updated: Some(last_updated.to_string()),
    }
}

pub fn sample_pledges() -> Vec<Pledge> {
    vec![
        pledge(1, 101, 1, "완료", "2024-05-01T09:00:00+09:00"),
        pledge(2, 101, 2, "진행중", "2024-05-03T09:00:00+09:00"),
        pledge(3, 101, 3, "준비중", "2024-05-02T09:00:00+09:00"),
        pledge(4, 101, 4, "보류", "2024-04-30T09:00:00+09:00"),
        pledge(5, 102, 1, "완료", "2024-05-04T09:00:00+09:00"),
        pledge(6, 102, 2, "중단", "2024-04-28T09:00:00+09:00"),
        // Belongs to the non-winner; must never surface in
        // get_pledges_by_status.
        pledge(7, 106, 1, "완료", "2024-05-05T09:00:00+09:00"),
    ]
}

pub fn sample_election() -> Election {
    Election {
        sg_id: "20240410".to_string(),
        election_name: Some("제22대 국회의원선거".to_string()),
        election_date: Some("2024-04-10".to_string()),
    }
}

/// Winners ordered by district name ascending, as every list operation
/// returns them.
pub fn winners_sorted() -> Vec<Candidate> {
    let mut winners: Vec<Candidate> = sample_candidates()
        .into_iter()
        .filter(|c| c.is_winner)
        .collect();
    winners.sort_by(|a, b| a.sgg_name.cmp(&b.sgg_name));
    winners
}

pub fn pledges_for(hubo_id: i64) -> Vec<Pledge> {
    let mut pledges: Vec<Pledge> = sample_pledges()
        .into_iter()
        .filter(|p| p.hubo_id == hubo_id)
        .collect();
    pledges.sort_by_key(|p| p.pledge_order);
    pledges
}

/// Winners' pledges in `status`, newest first, joined with their
/// candidate, as `get_pledges_by_status` returns them.
pub fn enriched_pledges_with_status(status: &str) -> Vec<EnrichedPledge> {
    let candidates = sample_candidates();
    let mut rows: Vec<EnrichedPledge> = sample_pledges()
        .into_iter()
        .filter(|p| p.status == status)
        .filter_map(|p| {
            let owner = candidates
                .iter()
                .find(|c| c.hubo_id == p.hubo_id && c.is_winner)?;
            Some(EnrichedPledge {
                candidate_name: owner.name.clone(),
                sgg_name: owner.sgg_name.clone(),
                party_name: owner.party_name.clone(),
                pledge: p,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.pledge.last_updated.cmp(&a.pledge.last_updated));
    rows
}

pub fn seed_sqlite(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Candidates (
            hubo_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            party_name TEXT,
            sgg_name TEXT NOT NULL,
            is_winner INTEGER NOT NULL DEFAULT 0,
            age INTEGER,
            gender TEXT,
            job TEXT,
            edu TEXT,
            career1 TEXT,
            career2 TEXT,
            votes_won INTEGER,
            vote_percentage REAL,
            metro_city TEXT
        );
        CREATE TABLE Pledges (
            pledge_id INTEGER PRIMARY KEY,
            hubo_id INTEGER NOT NULL,
            pledge_order INTEGER,
            pledge_realm TEXT,
            pledge_title TEXT NOT NULL,
            pledge_content TEXT,
            status TEXT,
            last_updated TEXT
        );
        CREATE TABLE Elections (
            sg_id TEXT PRIMARY KEY,
            election_name TEXT,
            election_date TEXT
        );",
    )
    .unwrap();

    for c in sample_candidates() {
        conn.execute(
            "INSERT INTO Candidates (hubo_id, name, party_name, sgg_name, is_winner, age, gender,
                                     job, edu, career1, career2, votes_won, vote_percentage, metro_city)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                c.hubo_id,
                c.name,
                c.party_name,
                c.sgg_name,
                c.is_winner as i64,
                c.age,
                c.gender,
                c.job,
                c.edu,
                c.career1,
                c.career2,
                c.votes_won,
                c.vote_percentage,
                c.metro_city,
            ],
        )
        .unwrap();
    }
    for p in sample_pledges() {
        conn.execute(
            "INSERT INTO Pledges (pledge_id, hubo_id, pledge_order, pledge_realm, pledge_title,
                                  pledge_content, status, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.pledge_id,
                p.hubo_id,
                p.pledge_order,
                p.pledge_realm,
                p.pledge_title,
                p.pledge_content,
                p.status,
                p.last_updated,
            ],
        )
        .unwrap();
    }
    let e = sample_election();
    conn.execute(
        "INSERT INTO Elections (sg_id, election_name, election_date) VALUES (?1, ?2, ?3)",
        params![e.sg_id, e.election_name, e.election_date],
    )
    .unwrap();
}

/// JSON body for a `pledges` row with the embedded candidate join, as
/// PostgREST renders `candidates!inner(...)`.
pub fn joined_pledge_json(row: &EnrichedPledge) -> serde_json::Value {
    let mut value = serde_json::to_value(&row.pledge).unwrap();
    value["candidates"] = serde_json::json!({
        "name": row.candidate_name,
        "sgg_name": row.sgg_name,
        "party_name": row.party_name,
        "is_winner": true,
    });
    value
}
