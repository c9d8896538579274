//! Text reports over the fetched data: streak summary, recent-puzzle
//! counts, and a per-weekday solve-time table.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::warn;

use crate::api::Fetcher;
use crate::models::{PuzzleDetail, PuzzleSummary, StatsAndStreaks};

/// Weekday labels in table order, Monday first (matches the service's
/// `start_on_monday` accounting).
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Print the streak/solve-rate summary and the weekday solve-time table for
/// the trailing `weeks`-week window.
pub fn run(fetcher: &Fetcher, weeks: i64) -> Result<()> {
    let stats_value = fetcher.stats().context("Failed to fetch account stats")?;
    let stats: StatsAndStreaks =
        serde_json::from_value(stats_value).context("Unexpected stats payload shape")?;

    println!("Your current streak: {} days.", stats.streaks.current_streak);
    println!("Your longest streak: {} days.", stats.streaks.longest_streak);
    println!("Your solve rate: {}", stats.stats.solve_rate);
    println!(
        "Lifetime: {} solved of {} attempted.",
        stats.stats.puzzles_solved, stats.stats.puzzles_attempted
    );

    let streaks = parse_streak_ranges(&stats.streaks.dates);
    if let Some((start, stop)) = streaks.last() {
        println!("Most recent streak: {} to {}.", start, stop);
    }

    let today = Utc::now().date_naive();
    let start = today - Duration::weeks(weeks);
    let puzzles_value = fetcher
        .puzzles(start, today)
        .context("Failed to fetch puzzle list")?;
    let puzzles: Vec<PuzzleSummary> =
        serde_json::from_value(puzzles_value).context("Unexpected puzzle list shape")?;

    println!("Found {} puzzles from the last {} weeks.", puzzles.len(), weeks);
    let solved: Vec<&PuzzleSummary> = puzzles.iter().filter(|p| p.solved).collect();
    println!("Of these, you solved {}.", solved.len());

    let mut solves: Vec<(NaiveDate, u64)> = Vec::new();
    for p in &solved {
        let date = match NaiveDate::parse_from_str(&p.print_date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                warn!(puzzle_id = p.puzzle_id, date = %p.print_date, error = %e, "Bad print date");
                continue;
            }
        };
        let detail_value = fetcher
            .puzzle(p.puzzle_id)
            .with_context(|| format!("Failed to fetch puzzle {}", p.puzzle_id))?;
        let detail: PuzzleDetail =
            serde_json::from_value(detail_value).context("Unexpected puzzle detail shape")?;
        solves.push((date, detail.calcs.seconds_spent_solving));
    }

    if !solves.is_empty() {
        println!();
        print_weekday_table(&solve_times_by_weekday(&solves));
    }

    Ok(())
}

/// Print one puzzle's solve record: time spent and the inferred grid shape.
pub fn run_puzzle(fetcher: &Fetcher, puzzle_id: u64) -> Result<()> {
    let detail_value = fetcher
        .puzzle(puzzle_id)
        .with_context(|| format!("Failed to fetch puzzle {}", puzzle_id))?;
    let detail: PuzzleDetail =
        serde_json::from_value(detail_value).context("Unexpected puzzle detail shape")?;

    println!("Puzzle {}:", puzzle_id);
    println!(
        "  Solution time: {}",
        format_duration(detail.calcs.seconds_spent_solving)
    );
    let (rows, cols) = guess_dimensions(detail.board.cells.len());
    println!("  Grid: {} rows x {} columns ({} cells)", rows, cols, rows * cols);
    let blanks = detail
        .board
        .cells
        .iter()
        .filter(|c| is_blank_cell(c))
        .count();
    println!("  Black squares: {}", blanks);
    Ok(())
}

/// Parse the service's streak date rows into closed ranges.
/// A one-element row is a single-day streak; a two-element row is
/// `[start, stop]`. Malformed rows are skipped with a warning rather than
/// failing the whole report.
pub fn parse_streak_ranges(dates: &[Vec<String>]) -> Vec<(NaiveDate, NaiveDate)> {
    let mut ranges = Vec::with_capacity(dates.len());
    for row in dates {
        let parsed: Option<(NaiveDate, NaiveDate)> = match row.as_slice() {
            [single] => parse_iso(single).map(|d| (d, d)),
            [start, stop] => parse_iso(start).zip(parse_iso(stop)),
            _ => None,
        };
        match parsed {
            Some(range) => ranges.push(range),
            None => warn!(?row, "Skipping malformed streak row"),
        }
    }
    ranges
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Infer a rectangular grid's shape from its cell count: the factor pair
/// closest to square, rows <= columns. Standard dailies come out 15x15,
/// Sundays 21x21; a prime count degenerates to 1xN.
pub fn guess_dimensions(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut guess = (n as f64).sqrt() as usize;
    while n % guess != 0 {
        guess -= 1;
    }
    (guess, n / guess)
}

fn is_blank_cell(cell: &Value) -> bool {
    cell.get("blank").is_some()
}

/// Bucket solve seconds by print-date weekday, Monday first.
pub fn solve_times_by_weekday(solves: &[(NaiveDate, u64)]) -> [Vec<u64>; 7] {
    let mut buckets: [Vec<u64>; 7] = Default::default();
    for (date, seconds) in solves {
        buckets[date.weekday().num_days_from_monday() as usize].push(*seconds);
    }
    buckets
}

fn print_weekday_table(buckets: &[Vec<u64>; 7]) {
    println!("Day  Solved  Median    Mean");
    for (label, times) in WEEKDAYS.iter().zip(buckets) {
        if times.is_empty() {
            println!("{}        -       -       -", label);
            continue;
        }
        println!(
            "{}  {:>6}  {:>6}  {:>6}",
            label,
            times.len(),
            format_duration(median(times)),
            format_duration(mean(times)),
        );
    }
}

/// Median solve time in whole seconds (lower middle for even counts).
pub fn median(times: &[u64]) -> u64 {
    let mut sorted = times.to_vec();
    sorted.sort_unstable();
    sorted[(sorted.len() - 1) / 2]
}

fn mean(times: &[u64]) -> u64 {
    times.iter().sum::<u64>() / times.len() as u64
}

/// Render seconds as `MmSSs` or `HhMMm` for readability.
pub fn format_duration(seconds: u64) -> String {
    if seconds >= 3600 {
        format!("{}h{:02}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}m{:02}s", seconds / 60, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_streak_ranges() {
        let rows = vec![
            vec!["2024-01-01".to_string(), "2024-01-05".to_string()],
            vec!["2024-01-09".to_string()],
        ];
        let ranges = parse_streak_ranges(&rows);
        assert_eq!(
            ranges,
            vec![
                (date("2024-01-01"), date("2024-01-05")),
                (date("2024-01-09"), date("2024-01-09")),
            ]
        );
    }

    #[test]
    fn test_parse_streak_ranges_skips_malformed() {
        let rows = vec![
            vec!["not-a-date".to_string()],
            vec![],
            vec!["2024-02-01".to_string()],
        ];
        let ranges = parse_streak_ranges(&rows);
        assert_eq!(ranges, vec![(date("2024-02-01"), date("2024-02-01"))]);
    }

    #[test]
    fn test_guess_dimensions() {
        assert_eq!(guess_dimensions(225), (15, 15)); // daily
        assert_eq!(guess_dimensions(441), (21, 21)); // Sunday
        assert_eq!(guess_dimensions(12), (3, 4));
        assert_eq!(guess_dimensions(13), (1, 13)); // prime
        assert_eq!(guess_dimensions(1), (1, 1));
        assert_eq!(guess_dimensions(0), (0, 0));
    }

    #[test]
    fn test_solve_times_by_weekday() {
        // 2024-03-11 is a Monday
        let solves = vec![
            (date("2024-03-11"), 300),
            (date("2024-03-12"), 400),
            (date("2024-03-18"), 360), // next Monday
        ];
        let buckets = solve_times_by_weekday(&solves);
        assert_eq!(buckets[0], vec![300, 360]);
        assert_eq!(buckets[1], vec![400]);
        assert!(buckets[2].is_empty());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[5]), 5);
        assert_eq!(median(&[9, 1, 5]), 5);
        assert_eq!(median(&[4, 1, 3, 2]), 2); // lower middle
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "0m45s");
        assert_eq!(format_duration(612), "10m12s");
        assert_eq!(format_duration(3725), "1h02m");
    }
}
