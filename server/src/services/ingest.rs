use crate::db::{Db, WriteTicket};
use crate::error::AppError;
use crate::models::test_result::{PreviousResult, SubmitResult};
use crate::services::store;
use crate::validation;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Checks a raw `Authorization` header against the configured bot key.
/// Without a configured key every write is refused.
pub fn authorize(header: Option<&str>, api_key: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = api_key else {
        warn!("rejecting write: no ingest key configured");
        return Err(AppError::Unauthorized("ingest key is not configured"));
    };
    let Some(presented) = header.and_then(|h| h.trim().strip_prefix("Bearer ")) else {
        return Err(AppError::Unauthorized("missing bearer credential"));
    };

    // Compare fixed-size digests instead of the raw strings.
    let presented = Sha256::digest(presented.trim().as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    let diff = presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    if diff == 0 {
        Ok(())
    } else {
        warn!("rejecting write: credential mismatch");
        Err(AppError::Unauthorized("invalid credential"))
    }
}

/// Validates a submission body and writes it over the player's current result
/// for that mode. Nothing is written if `ticket` is abandoned before commit.
pub fn submit_test(
    db: &Db,
    body: &serde_json::Value,
    ticket: &WriteTicket,
) -> Result<SubmitResult, AppError> {
    let submission = validation::parse_submission(body)?;
    let record = submission.into_record(Utc::now());

    let store::Upserted {
        saved,
        previous,
        player_total: total_points,
    } = store::upsert(db, record, ticket)?;

    match &previous {
        Some(prev) => info!(
            username = %saved.username,
            mode = %saved.mode,
            from = %prev.rank,
            to = %saved.rank,
            "test result replaced"
        ),
        None => info!(
            username = %saved.username,
            mode = %saved.mode,
            rank = %saved.rank,
            "test result recorded"
        ),
    }

    Ok(SubmitResult {
        ok: true,
        created: previous.is_none(),
        previous: PreviousResult::from(previous.as_ref()),
        saved,
        total_points,
    })
}
