//! The result store: one row per (lowercased username, mode).
//!
//! All writes go through [`upsert`], which reads the displaced row, writes the
//! new one and totals the player inside a single immediate transaction, so two
//! submissions for the same pair are applied one after the other and never merged.

use crate::db::{Db, StoreError, WriteTicket};
use crate::models::test_result::{username_key, TestResult};
use crate::ranks::{Mode, Rank};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "username, mode, rank, points, tester, updated_at";

type RawRow = (String, String, String, i64, Option<String>, DateTime<Utc>);

fn from_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode((username, mode, rank, points, tester, updated_at): RawRow) -> Result<TestResult, StoreError> {
    let mode: Mode = mode
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown mode {mode:?} for {username}")))?;
    let rank: Rank = rank
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown rank {rank:?} for {username}")))?;
    Ok(TestResult {
        username,
        mode,
        rank,
        points,
        tester,
        updated_at,
    })
}

fn select_one(conn: &Connection, key: &str, mode: Mode) -> Result<Option<TestResult>, StoreError> {
    let raw = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM test_results WHERE username_key = ?1 AND mode = ?2"),
            params![key, mode.as_str()],
            from_row,
        )
        .optional()?;
    raw.map(decode).transpose()
}

/// Outcome of one [`upsert`], all read inside the writing transaction.
#[derive(Debug)]
pub struct Upserted {
    pub saved: TestResult,
    pub previous: Option<TestResult>,
    pub player_total: i64,
}

/// Writes `result` over whatever was stored for its pair and returns the stored
/// record, the one it displaced and the player's new total across modes.
pub fn upsert(db: &Db, result: TestResult, ticket: &WriteTicket) -> Result<Upserted, StoreError> {
    let key = result.username_key();
    db.with_tx(ticket, |conn| {
        let previous = select_one(conn, &key, result.mode)?;
        conn.execute(
            "INSERT INTO test_results (username_key, mode, username, rank, points, tester, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (username_key, mode) DO UPDATE SET
                username = excluded.username,
                rank = excluded.rank,
                points = excluded.points,
                tester = excluded.tester,
                updated_at = excluded.updated_at",
            params![
                key,
                result.mode.as_str(),
                result.username,
                result.rank.as_str(),
                result.points,
                result.tester,
                result.updated_at,
            ],
        )?;
        let player_total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM test_results WHERE username_key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(Upserted {
            saved: result,
            previous,
            player_total,
        })
    })
}

pub fn find_one(db: &Db, username: &str, mode: Mode) -> Result<Option<TestResult>, StoreError> {
    let key = username_key(username);
    db.with_conn(|conn| select_one(conn, &key, mode))
}

pub fn list_all(db: &Db) -> Result<Vec<TestResult>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM test_results ORDER BY points DESC, updated_at DESC"
        ))?;
        let rows = stmt.query_map([], from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(decode(row?)?);
        }
        Ok(results)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn record(username: &str, mode: Mode, rank: Rank) -> TestResult {
        TestResult {
            username: username.into(),
            mode,
            rank,
            points: rank.points(),
            tester: None,
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn write(db: &Db, result: TestResult) -> Upserted {
        upsert(db, result, &WriteTicket::default()).unwrap()
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let db = Db::open_in_memory().unwrap();
        let first = write(&db, record("Alice", Mode::Mace, Rank::Ht3)).saved;
        let second = write(&db, record("Alice", Mode::Mace, Rank::Ht3));
        assert_eq!(second.saved, first);
        assert_eq!(second.previous.as_ref(), Some(&first));
        assert_eq!(second.player_total, 6);

        let all = list_all(&db).unwrap();
        assert_eq!(all, vec![first]);
    }

    #[test]
    fn test_overwrite_replaces_previous() {
        let db = Db::open_in_memory().unwrap();
        write(&db, record("A", Mode::Mace, Rank::Ht3));
        let written = write(&db, record("A", Mode::Mace, Rank::Lt1));

        assert_eq!(written.previous.map(|p| p.rank), Some(Rank::Ht3));
        assert_eq!(written.saved.points, Rank::Lt1.points());
        assert_eq!(written.player_total, 9);

        let all = list_all(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rank, Rank::Lt1);
        assert_eq!(all[0].points, 9);
    }

    #[test]
    fn test_username_identity_is_case_insensitive() {
        let db = Db::open_in_memory().unwrap();
        write(&db, record("Alice", Mode::Sword, Rank::Lt4));
        write(&db, record("ALICE", Mode::Sword, Rank::Ht4));

        let all = list_all(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].username, "ALICE");
        assert_eq!(all[0].rank, Rank::Ht4);

        let found = find_one(&db, "alice", Mode::Sword).unwrap().unwrap();
        assert_eq!(found, all[0]);
        assert!(find_one(&db, "alice", Mode::Mace).unwrap().is_none());
    }

    #[test]
    fn test_distinct_modes_are_distinct_rows() {
        let db = Db::open_in_memory().unwrap();
        write(&db, record("A", Mode::Sword, Rank::Lt2));
        write(&db, record("B", Mode::Sword, Rank::Ht1));
        let written = write(&db, record("a", Mode::Mace, Rank::Ht3));
        assert_eq!(list_all(&db).unwrap().len(), 3);
        assert_eq!(written.player_total, 7 + 6);
    }

    #[test]
    fn test_tester_and_timestamp_survive_round_trip() {
        let db = Db::open_in_memory().unwrap();
        let mut rec = record("A", Mode::Pot, Rank::Ht2);
        rec.tester = Some("mod#0001".into());
        write(&db, rec.clone());
        assert_eq!(find_one(&db, "a", Mode::Pot).unwrap(), Some(rec));
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO test_results (username_key, mode, username, rank, points, updated_at)
                 VALUES ('a', 'Mace', 'A', 'HT9', 6, '2025-03-01 12:00:00+00:00')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert!(matches!(list_all(&db), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_concurrent_writes_to_one_key_serialize() {
        let db = Arc::new(Db::open_in_memory().unwrap());
        let ranks = [Rank::Lt5, Rank::Ht1, Rank::Lt3, Rank::Ht2];

        let handles: Vec<_> = ranks
            .iter()
            .enumerate()
            .map(|(i, rank)| {
                let db = Arc::clone(&db);
                let mut rec = record("Racer", Mode::Axe, *rank);
                rec.tester = Some(format!("tester-{i}"));
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        write(&db, rec.clone());
                    }
                    rec
                })
            })
            .collect();
        let submitted: Vec<TestResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let all = list_all(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert!(submitted.contains(&all[0]), "stored row is a mix: {:?}", all[0]);
    }
}
