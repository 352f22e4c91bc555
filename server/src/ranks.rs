//! Canonical game modes, ranks and the rank to points table.
//!
//! Every place that needs a point value goes through [`Rank::points`], so ingest
//! and aggregation can never disagree about what a rank is worth.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    Vanilla,
    #[serde(rename = "UHC")]
    Uhc,
    Pot,
    NethPot,
    #[serde(rename = "SMP")]
    Smp,
    Sword,
    Axe,
    Mace,
    Cart,
    Creeper,
    #[serde(rename = "DiaSMP")]
    DiaSmp,
    OGVanilla,
    #[serde(rename = "ShieldlessUHC")]
    ShieldlessUhc,
    SpearMace,
    SpearElytra,
}

impl Mode {
    /// Display order used by the leaderboard page.
    pub const ALL: [Mode; 15] = [
        Mode::Vanilla,
        Mode::Uhc,
        Mode::Pot,
        Mode::NethPot,
        Mode::Smp,
        Mode::Sword,
        Mode::Axe,
        Mode::Mace,
        Mode::Cart,
        Mode::Creeper,
        Mode::DiaSmp,
        Mode::OGVanilla,
        Mode::ShieldlessUhc,
        Mode::SpearMace,
        Mode::SpearElytra,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Vanilla => "Vanilla",
            Mode::Uhc => "UHC",
            Mode::Pot => "Pot",
            Mode::NethPot => "NethPot",
            Mode::Smp => "SMP",
            Mode::Sword => "Sword",
            Mode::Axe => "Axe",
            Mode::Mace => "Mace",
            Mode::Cart => "Cart",
            Mode::Creeper => "Creeper",
            Mode::DiaSmp => "DiaSMP",
            Mode::OGVanilla => "OGVanilla",
            Mode::ShieldlessUhc => "ShieldlessUHC",
            Mode::SpearMace => "SpearMace",
            Mode::SpearElytra => "SpearElytra",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownMode(needle.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Unranked,
    #[serde(rename = "LT5")]
    Lt5,
    #[serde(rename = "HT5")]
    Ht5,
    #[serde(rename = "LT4")]
    Lt4,
    #[serde(rename = "HT4")]
    Ht4,
    #[serde(rename = "LT3")]
    Lt3,
    #[serde(rename = "HT3")]
    Ht3,
    #[serde(rename = "LT2")]
    Lt2,
    #[serde(rename = "HT2")]
    Ht2,
    #[serde(rename = "LT1")]
    Lt1,
    #[serde(rename = "HT1")]
    Ht1,
}

impl Rank {
    /// Worst to best.
    pub const ALL: [Rank; 11] = [
        Rank::Unranked,
        Rank::Lt5,
        Rank::Ht5,
        Rank::Lt4,
        Rank::Ht4,
        Rank::Lt3,
        Rank::Ht3,
        Rank::Lt2,
        Rank::Ht2,
        Rank::Lt1,
        Rank::Ht1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Unranked => "Unranked",
            Rank::Lt5 => "LT5",
            Rank::Ht5 => "HT5",
            Rank::Lt4 => "LT4",
            Rank::Ht4 => "HT4",
            Rank::Lt3 => "LT3",
            Rank::Ht3 => "HT3",
            Rank::Lt2 => "LT2",
            Rank::Ht2 => "HT2",
            Rank::Lt1 => "LT1",
            Rank::Ht1 => "HT1",
        }
    }

    pub fn points(self) -> i64 {
        match self {
            Rank::Unranked => 0,
            Rank::Lt5 => 1,
            Rank::Ht5 => 2,
            Rank::Lt4 => 3,
            Rank::Ht4 => 4,
            Rank::Lt3 => 5,
            Rank::Ht3 => 6,
            Rank::Lt2 => 7,
            Rank::Ht2 => 8,
            Rank::Lt1 => 9,
            Rank::Ht1 => 10,
        }
    }

    /// Tier number, 1 is best. `None` for unranked.
    pub fn tier(self) -> Option<u8> {
        match self {
            Rank::Unranked => None,
            Rank::Lt5 | Rank::Ht5 => Some(5),
            Rank::Lt4 | Rank::Ht4 => Some(4),
            Rank::Lt3 | Rank::Ht3 => Some(3),
            Rank::Lt2 | Rank::Ht2 => Some(2),
            Rank::Lt1 | Rank::Ht1 => Some(1),
        }
    }

    pub fn is_high_tier(self) -> bool {
        matches!(
            self,
            Rank::Ht5 | Rank::Ht4 | Rank::Ht3 | Rank::Ht2 | Rank::Ht1
        )
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Rank::ALL
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownRank(needle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_increase_with_rank() {
        let points: Vec<i64> = Rank::ALL.iter().map(|r| r.points()).collect();
        assert_eq!(points, (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_rank_parsing_is_case_insensitive() {
        assert_eq!("unranked".parse::<Rank>(), Ok(Rank::Unranked));
        assert_eq!("UNRANKED".parse::<Rank>(), Ok(Rank::Unranked));
        assert_eq!(" ht3 ".parse::<Rank>(), Ok(Rank::Ht3));
        assert_eq!("Lt1".parse::<Rank>(), Ok(Rank::Lt1));
        assert!("HT6".parse::<Rank>().is_err());
        assert!("".parse::<Rank>().is_err());
    }

    #[test]
    fn test_mode_parsing_returns_canonical_casing() {
        assert_eq!("mace".parse::<Mode>(), Ok(Mode::Mace));
        assert_eq!("shieldlessuhc".parse::<Mode>().map(Mode::as_str), Ok("ShieldlessUHC"));
        assert_eq!("DIASMP".parse::<Mode>().map(Mode::as_str), Ok("DiaSMP"));
        assert_eq!(
            "NotAMode".parse::<Mode>(),
            Err(UnknownMode("NotAMode".to_string()))
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        for mode in Mode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
        for rank in Rank::ALL {
            let json = serde_json::to_string(&rank).unwrap();
            assert_eq!(json, format!("\"{}\"", rank.as_str()));
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(Rank::Unranked.tier(), None);
        assert_eq!(Rank::Ht1.tier(), Some(1));
        assert_eq!(Rank::Lt5.tier(), Some(5));
        assert!(Rank::Ht3.is_high_tier());
        assert!(!Rank::Lt3.is_high_tier());
    }
}
