use std::collections::BTreeSet;

use chrono::NaiveDate;
use derive_more::Constructor;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Constructor, Serialize)]
pub struct StreakResult {
    /// Consecutive active days ending today, or yesterday when today has no activity yet.
    pub current_streak: u32,
    /// Longest run other than the current one. Without a current streak, the most recent run.
    pub previous_streak: u32,
    /// Only set when there is no current streak but some activity exists.
    pub days_since_last_activity: Option<u32>,
}

/// Maximal run of consecutive active days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor, Serialize)]
pub struct Streak {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Streak {
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Splits active dates into maximal runs, most recent run first. Duplicate dates count once.
pub fn streaks<I>(dates: I) -> Vec<Streak>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let dates = dates.into_iter().collect::<BTreeSet<_>>();
    runs(&dates)
}

/// Computes current and previous streaks as seen on `today`.
///
/// # Arguments
/// * `dates` - active calendar dates, in any order, duplicates allowed
/// * `today` - calendar date the current streak is anchored to
pub fn calculate_streaks<I>(dates: I, today: NaiveDate) -> StreakResult
where
    I: IntoIterator<Item = NaiveDate>,
{
    let dates = dates.into_iter().collect::<BTreeSet<_>>();
    let last_active = match dates.iter().next_back() {
        Some(last) => *last,
        None => return StreakResult::default(),
    };
    let runs = runs(&dates);

    match anchor(&dates, today) {
        Some(anchor) => {
            let current_streak = count_back(&dates, anchor);
            // the current run is the one holding the anchor, not merely the first one of equal length
            let previous_streak = runs
                .iter()
                .filter(|run| !run.contains(anchor))
                .map(Streak::days)
                .max()
                .unwrap_or(0);
            StreakResult::new(current_streak, previous_streak, None)
        }
        None => {
            let previous_streak = runs.first().map(Streak::days).unwrap_or(0);
            let days_since = u32::try_from((today - last_active).num_days()).unwrap_or(0);
            StreakResult::new(0, previous_streak, Some(days_since))
        }
    }
}

/// Today if active, otherwise yesterday if active.
fn anchor(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    std::iter::once(Some(today))
        .chain(std::iter::once(today.pred_opt()))
        .flatten()
        .find(|date| dates.contains(date))
}

fn count_back(dates: &BTreeSet<NaiveDate>, anchor: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = Some(anchor);
    while let Some(date) = day.filter(|date| dates.contains(date)) {
        count += 1;
        day = date.pred_opt();
    }
    count
}

fn runs(dates: &BTreeSet<NaiveDate>) -> Vec<Streak> {
    dates.iter().rev().fold(Vec::new(), |mut runs: Vec<Streak>, date| {
        match runs.last_mut() {
            Some(run) if run.start.pred_opt() == Some(*date) => run.start = *date,
            _ => runs.push(Streak::new(*date, *date)),
        }
        runs
    })
}

/// Tests

#[cfg(test)]
fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn empty_dates_test() {
    let result = calculate_streaks(Vec::new(), date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(0, 0, None));
}

#[test]
fn single_day_today_test() {
    let today = date(2024, 1, 10);
    assert_eq!(calculate_streaks(vec![today], today), StreakResult::new(1, 0, None));
}

#[test]
fn today_and_yesterday_test() {
    let today = date(2024, 1, 10);
    let dates = vec![today, date(2024, 1, 9), date(2024, 1, 7)];
    assert_eq!(calculate_streaks(dates, today), StreakResult::new(2, 1, None));
}

#[test]
fn streak_anchored_yesterday_test() {
    let today = date(2024, 1, 10);
    let dates = vec![date(2024, 1, 9), date(2024, 1, 8), date(2024, 1, 7)];
    assert_eq!(calculate_streaks(dates, today), StreakResult::new(3, 0, None));
}

#[test]
fn current_and_previous_test() {
    let dates = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 10)];
    let result = calculate_streaks(dates, date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(1, 3, None));
}

#[test]
fn no_current_streak_test() {
    let dates = vec![date(2024, 1, 1), date(2024, 1, 2)];
    let result = calculate_streaks(dates, date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(0, 2, Some(8)));
}

#[test]
fn no_current_streak_takes_most_recent_run_test() {
    let dates = vec![
        date(2024, 1, 1),
        date(2024, 1, 2),
        date(2024, 1, 3),
        date(2024, 1, 4),
        date(2024, 1, 6),
    ];
    let result = calculate_streaks(dates, date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(0, 1, Some(4)));
}

#[test]
fn previous_streak_with_equal_lengths_test() {
    // current run [9, 10] and an older run [1, 2] of the same length
    let dates = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 9), date(2024, 1, 10)];
    let result = calculate_streaks(dates, date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(2, 2, None));
}

#[test]
fn longer_previous_streak_test() {
    let dates = vec![
        date(2024, 1, 1),
        date(2024, 1, 2),
        date(2024, 1, 4),
        date(2024, 1, 5),
        date(2024, 1, 6),
        date(2024, 1, 7),
        date(2024, 1, 10),
    ];
    let result = calculate_streaks(dates, date(2024, 1, 10));
    assert_eq!(result, StreakResult::new(1, 4, None));
}

#[test]
fn duplicate_dates_test() {
    let today = date(2024, 1, 10);
    let result = calculate_streaks(vec![today, today, today], today);
    assert_eq!(result, StreakResult::new(1, 0, None));
}

#[test]
fn streak_across_month_boundary_test() {
    let dates = vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
    assert_eq!(calculate_streaks(dates, date(2024, 3, 1)), StreakResult::new(3, 0, None));
}

#[test]
fn streaks_most_recent_first_test() {
    let dates = vec![date(2024, 1, 5), date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 4)];
    let runs = streaks(dates);
    assert_eq!(
        runs,
        vec![
            Streak::new(date(2024, 1, 4), date(2024, 1, 5)),
            Streak::new(date(2024, 1, 1), date(2024, 1, 2)),
        ]
    );
    assert_eq!(runs[0].days(), 2);
}

#[test]
fn idempotent_test() {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let today = date(2024, 6, 30);
    let dates = (0..120)
        .map(|_| today - chrono::Duration::days(rng.gen_range(0..365)))
        .collect::<Vec<_>>();
    let first = calculate_streaks(dates.clone(), today);
    let second = calculate_streaks(dates.clone(), today);
    assert_eq!(first, second);

    let current_run = streaks(dates)
        .into_iter()
        .find(|run| run.contains(today) || today.pred_opt().map_or(false, |d| run.contains(d)));
    assert_eq!(first.current_streak, current_run.map(|run| run.days()).unwrap_or(0));
}
