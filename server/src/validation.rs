use crate::error::AppError;
use crate::models::test_result::NewTestResult;
use crate::ranks::{Mode, Rank};
use serde_json::{json, Map, Value};

const MAX_USERNAME_LEN: usize = 32;
const MAX_TESTER_LEN: usize = 64;

// Field names sent by different bot and web client versions, in priority order.
const USERNAME_KEYS: &[&str] = &[
    "username",
    "minecraft_name",
    "minecraftName",
    "mc_name",
    "mcName",
    "player",
    "testedplayer",
];
const MODE_KEYS: &[&str] = &["mode", "gamemode", "game_mode", "gameMode", "testmode"];
const RANK_KEYS: &[&str] = &["rank", "tier", "earned_rank", "earnedRank", "result"];
const TESTER_KEYS: &[&str] = &["tester", "tester_id", "testerId", "tested_by", "testedBy"];

/// First alias with a non-blank string or number value, trimmed.
pub fn pick(body: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let text = match body.get(*key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

pub fn validate_username(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("username is required")
    } else if name.chars().count() > MAX_USERNAME_LEN {
        Err("username is too long")
    } else {
        Ok(())
    }
}

/// Explicit point override. Absent, null and blank mean "derive from rank".
pub fn parse_points(value: Option<&Value>) -> Result<Option<i64>, &'static str> {
    let points = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    match points {
        Some(p) if p >= 0 => Ok(Some(p)),
        Some(_) => Err("points cannot be negative"),
        None => Err("points must be a whole number"),
    }
}

/// Extracts, normalizes and validates an ingest body. Every failing field is
/// reported at once so the caller can fix them in one resubmission.
pub fn parse_submission(body: &Value) -> Result<NewTestResult, AppError> {
    let body = body
        .as_object()
        .ok_or_else(|| AppError::InvalidPayload("expected a JSON object".into()))?;

    let username = pick(body, USERNAME_KEYS).unwrap_or_default();
    let mode_raw = pick(body, MODE_KEYS).unwrap_or_default();
    let rank_raw = pick(body, RANK_KEYS).unwrap_or_default();
    let tester = pick(body, TESTER_KEYS)
        .map(|t| t.chars().take(MAX_TESTER_LEN).collect::<String>());

    let mut fields = Vec::new();
    let mut problems = Vec::new();

    if let Err(msg) = validate_username(&username) {
        fields.push("username");
        problems.push(msg.to_string());
    }
    let mode = match mode_raw.parse::<Mode>() {
        Ok(mode) => Some(mode),
        Err(_) if mode_raw.is_empty() => {
            fields.push("mode");
            problems.push("mode is required".to_string());
            None
        }
        Err(e) => {
            fields.push("mode");
            problems.push(format!("unknown mode: {}", e.0));
            None
        }
    };
    let rank = match rank_raw.parse::<Rank>() {
        Ok(rank) => Some(rank),
        Err(_) if rank_raw.is_empty() => {
            fields.push("rank");
            problems.push("rank is required".to_string());
            None
        }
        Err(e) => {
            fields.push("rank");
            problems.push(format!("unknown rank: {}", e.0));
            None
        }
    };

    let points = parse_points(body.get("points")).unwrap_or_else(|msg| {
        fields.push("points");
        problems.push(msg.to_string());
        None
    });

    let (Some(mode), Some(rank), true) = (mode, rank, fields.is_empty()) else {
        return Err(rejected(fields, problems, &username, &mode_raw, &rank_raw));
    };

    Ok(NewTestResult {
        username,
        mode,
        rank,
        points,
        tester,
    })
}

fn rejected(
    fields: Vec<&'static str>,
    problems: Vec<String>,
    username: &str,
    mode: &str,
    rank: &str,
) -> AppError {
    AppError::BadRequest {
        message: problems.join("; "),
        fields,
        received: Some(json!({ "username": username, "mode": mode, "rank": rank })),
    }
}
