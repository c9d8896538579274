//! View structs over the JSON the fetch layer returns.
//!
//! The fetcher deliberately hands back raw `serde_json::Value` (the cache
//! stores payloads verbatim and no schema is enforced); these types are the
//! report layer's typed window onto the fields it actually reads. Defaults
//! everywhere - a missing field degrades the report, it does not fail it.

use serde::Deserialize;

/// The `results` payload of the stats-and-streaks endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatsAndStreaks {
    #[serde(default)]
    pub stats: SolveStats,
    #[serde(default)]
    pub streaks: Streaks,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SolveStats {
    #[serde(default)]
    pub solve_rate: f64,
    #[serde(default)]
    pub puzzles_solved: u32,
    #[serde(default)]
    pub puzzles_attempted: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Streaks {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    /// Streak date ranges as the service sends them: each row is either a
    /// single ISO date (one-day streak) or a `[start, stop]` pair.
    #[serde(default)]
    pub dates: Vec<Vec<String>>,
}

/// One row of the puzzle listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleSummary {
    pub puzzle_id: u64,
    pub print_date: String,
    #[serde(default)]
    pub solved: bool,
}

/// The slice of a puzzle-detail payload the report reads.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PuzzleDetail {
    #[serde(default)]
    pub calcs: PuzzleCalcs,
    #[serde(default)]
    pub board: Board,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PuzzleCalcs {
    #[serde(default, rename = "secondsSpentSolving")]
    pub seconds_spent_solving: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Board {
    #[serde(default)]
    pub cells: Vec<serde_json::Value>,
}
