//! HTML rendering of the leaderboard page.
//!
//! A page is rebuilt from one leaderboard response on every request, so nothing
//! here holds state between renders.

use crate::models::leaderboard::{Leaderboard, Player};
use crate::ranks::{Mode, Rank};
use maud::{html, Markup, DOCTYPE};
use serde::Deserialize;

const STYLE: &str = r#"
body { background: #07060d; color: #e9e6ff; font-family: system-ui, sans-serif; margin: 0; }
main { max-width: 960px; margin: 0 auto; padding: 24px; }
h1 { color: #b58cff; letter-spacing: 2px; }
form { display: flex; gap: 8px; margin-bottom: 20px; }
input, select, button { background: #15122a; color: inherit; border: 1px solid #3a2f6b; border-radius: 6px; padding: 6px 10px; }
.notice { padding: 16px; border-radius: 8px; background: #15122a; }
.notice.error { border: 1px solid #ff5c7a; color: #ff9bb0; }
.player { display: flex; align-items: center; gap: 16px; padding: 12px 16px; margin-bottom: 10px; border: 1px solid #2a2450; border-radius: 10px; background: #0f0c1f; }
.place { font-size: 1.4em; width: 2.5em; color: #8a80c0; }
.name { font-weight: 700; min-width: 10em; }
.pills { display: flex; flex-wrap: wrap; gap: 6px; flex: 1; }
.pill { border: 1px solid #3a2f6b; border-radius: 999px; padding: 2px 10px; font-size: 0.85em; }
.tier-1 { color: #ffd86b; border-color: #ffd86b; box-shadow: 0 0 10px rgba(255, 216, 107, 0.45); }
.tier-2 { color: #e7eef8; border-color: #e7eef8; box-shadow: 0 0 10px rgba(231, 238, 248, 0.35); }
.tier-3 { color: #d7a67a; border-color: #d7a67a; box-shadow: 0 0 10px rgba(215, 166, 122, 0.35); }
.tier-4 { color: #b58cff; border-color: #b58cff; box-shadow: 0 0 10px rgba(181, 140, 255, 0.45); }
.tier-5 { color: #6bb8ff; border-color: #6bb8ff; box-shadow: 0 0 10px rgba(107, 184, 255, 0.35); }
.pill.high { font-weight: 700; }
.points { text-align: right; font-size: 1.6em; font-weight: 800; color: #6bf0ff; }
"#;

#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    pub refresh_secs: u32,
    pub discord_invite: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub q: Option<String>,
    pub mode: Option<String>,
}

/// What the page was able to load.
pub enum Board<'a> {
    Loaded(&'a Leaderboard),
    Failed(String),
}

/// The filters in effect for one render. `mode` has already been validated.
#[derive(Debug, Default)]
pub struct PageFilter {
    pub search: String,
    pub mode: Option<Mode>,
}

/// Players whose name contains `search` (case-insensitive), each paired with
/// their place on the unfiltered board.
pub fn visible_players<'a>(board: &'a Leaderboard, search: &str) -> Vec<(usize, &'a Player)> {
    let needle = search.trim().to_lowercase();
    board
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| needle.is_empty() || p.username.to_lowercase().contains(&needle))
        .map(|(i, p)| (i + 1, p))
        .collect()
}

fn tier_class(rank: Rank) -> String {
    match (rank.tier(), rank.is_high_tier()) {
        (Some(tier), true) => format!("pill tier-{tier} high"),
        (Some(tier), false) => format!("pill tier-{tier}"),
        (None, _) => "pill".to_string(),
    }
}

pub fn render_page(board: Board<'_>, filter: &PageFilter, settings: &PageSettings) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if settings.refresh_secs > 0 {
                    meta http-equiv="refresh" content=(settings.refresh_secs);
                }
                title { "NeonTiers" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { "NEONTIERS" }
                    @if let Some(invite) = &settings.discord_invite {
                        p { a href=(invite) { "Join the Discord" } }
                    }
                    (filter_form(filter))
                    (board_section(board, filter))
                }
            }
        }
    }
}

fn filter_form(filter: &PageFilter) -> Markup {
    html! {
        form method="get" action="/" {
            input type="search" name="q" placeholder="Search player" value=(filter.search);
            select name="mode" {
                option value="" selected[filter.mode.is_none()] { "All modes" }
                @for mode in Mode::ALL {
                    option value=(mode.as_str()) selected[filter.mode == Some(mode)] { (mode.as_str()) }
                }
            }
            button type="submit" { "Filter" }
        }
    }
}

fn board_section(board: Board<'_>, filter: &PageFilter) -> Markup {
    let board = match board {
        Board::Failed(message) => {
            return html! {
                div class="notice error" {
                    strong { "Could not load the leaderboard." }
                    " " (message)
                }
            };
        }
        Board::Loaded(board) => board,
    };

    if board.players.is_empty() {
        return html! {
            div class="notice" {
                @match filter.mode {
                    Some(mode) => { "No players ranked in " (mode.as_str()) " yet." }
                    None => { "No players yet." }
                }
            }
        };
    }

    let players = visible_players(board, &filter.search);
    if players.is_empty() {
        return html! {
            div class="notice" { "No players match \"" (filter.search.trim()) "\"." }
        };
    }

    html! {
        section class="board" {
            @for (place, player) in players {
                div class="player" {
                    div class="place" { "#" (place) }
                    div class="name" { (player.username) }
                    div class="pills" {
                        @for result in &player.results {
                            span class=(tier_class(result.rank)) title=(result.points) {
                                (result.mode.as_str()) " " (result.rank.as_str())
                            }
                        }
                    }
                    div class="points" { (player.total_points) }
                }
            }
        }
    }
}
