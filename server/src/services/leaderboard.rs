use crate::db::Db;
use crate::error::AppError;
use crate::models::leaderboard::{Leaderboard, Player};
use crate::models::test_result::TestResult;
use crate::ranks::Mode;
use crate::services::store;
use std::collections::HashMap;

/// Parses an optional `?mode=` value. Blank means no filter.
pub fn parse_mode_filter(raw: Option<&str>) -> Result<Option<Mode>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<Mode>()
            .map(Some)
            .map_err(|e| AppError::bad_field("mode", format!("unknown mode: {}", e.0))),
    }
}

pub fn get_leaderboard(db: &Db, mode: Option<Mode>) -> Result<Leaderboard, AppError> {
    let tests = store::list_all(db)?;
    Ok(build_leaderboard(tests, mode))
}

/// Groups current results into players and orders them by total points, then
/// by case-folded name. With a mode filter only that mode's result counts and
/// players without one drop out.
pub fn build_leaderboard(tests: Vec<TestResult>, mode: Option<Mode>) -> Leaderboard {
    let tests: Vec<TestResult> = match mode {
        Some(mode) => tests.into_iter().filter(|t| t.mode == mode).collect(),
        None => tests,
    };

    let mut grouped: HashMap<String, Vec<TestResult>> = HashMap::new();
    for test in &tests {
        grouped.entry(test.username_key()).or_default().push(test.clone());
    }

    let mut players: Vec<(String, Player)> = grouped
        .into_iter()
        .map(|(key, mut results)| {
            results.sort_by(|a, b| a.mode.as_str().cmp(b.mode.as_str()));
            // Latest write decides how the name is shown.
            let username = results
                .iter()
                .max_by_key(|r| r.updated_at)
                .map(|r| r.username.clone())
                .unwrap_or_else(|| key.clone());
            let total_points = results.iter().map(|r| r.points).sum();
            (
                key,
                Player {
                    username,
                    total_points,
                    results,
                },
            )
        })
        .collect();

    players.sort_by(|(a_key, a), (b_key, b)| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a_key.cmp(b_key))
            .then_with(|| a.username.cmp(&b.username))
    });

    Leaderboard {
        tests,
        players: players.into_iter().map(|(_, p)| p).collect(),
    }
}
