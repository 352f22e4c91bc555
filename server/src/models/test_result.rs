use crate::ranks::{Mode, Rank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The one current result for a (player, mode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub username: String,
    pub mode: Mode,
    pub rank: Rank,
    pub points: i64,
    pub tester: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TestResult {
    /// Uniqueness key for the username half of the pair.
    pub fn username_key(&self) -> String {
        username_key(&self.username)
    }
}

pub fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}

/// A validated submission, ready to be written.
#[derive(Debug, Clone)]
pub struct NewTestResult {
    pub username: String,
    pub mode: Mode,
    pub rank: Rank,
    pub points: Option<i64>,
    pub tester: Option<String>,
}

impl NewTestResult {
    pub fn into_record(self, updated_at: DateTime<Utc>) -> TestResult {
        let points = self.points.unwrap_or_else(|| self.rank.points());
        TestResult {
            username: self.username,
            mode: self.mode,
            rank: self.rank,
            points,
            tester: self.tester,
            updated_at,
        }
    }
}

/// What a mode looked like for the player before a submission replaced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousResult {
    pub rank: Rank,
    pub points: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<&TestResult>> for PreviousResult {
    fn from(prev: Option<&TestResult>) -> Self {
        match prev {
            Some(r) => PreviousResult {
                rank: r.rank,
                points: r.points,
                updated_at: Some(r.updated_at),
            },
            None => PreviousResult {
                rank: Rank::Unranked,
                points: 0,
                updated_at: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub ok: bool,
    pub saved: TestResult,
    pub previous: PreviousResult,
    pub total_points: i64,
    #[serde(skip)]
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct LookupResult {
    pub test: Option<TestResult>,
}
