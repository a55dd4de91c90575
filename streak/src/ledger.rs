use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    #[strum(serialize = "commit")]
    Commit,
    #[strum(serialize = "repo")]
    RepoCreated,
    #[strum(serialize = "issue")]
    IssueCreated,
    #[strum(serialize = "pr")]
    PullRequestCreated,
    #[strum(serialize = "release")]
    ReleaseCreated,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Commit => "Commits",
            ActivityKind::RepoCreated => "Repositories Created",
            ActivityKind::IssueCreated => "Issues Created",
            ActivityKind::PullRequestCreated => "Pull Requests",
            ActivityKind::ReleaseCreated => "Releases Created",
        }
    }
}

/// Period of `days` days ending at the moment of collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookbackWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    days: u32,
}

impl LookbackWindow {
    pub const DEFAULT_DAYS: u32 = 365;

    /// A window reaching past the earliest representable moment starts there.
    pub fn new(now: DateTime<Utc>, days: u32) -> Self {
        LookbackWindow {
            start: now
                .checked_sub_signed(Duration::days(days.into()))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: now,
            days,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }
}

/// Activity kinds observed per calendar date.
///
/// A kind is listed once per occurrence, so several commits on one day show up as several entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityLedger {
    days: BTreeMap<NaiveDate, Vec<ActivityKind>>,
}

impl ActivityLedger {
    pub fn builder(window: LookbackWindow) -> ActivityLedgerBuilder {
        ActivityLedgerBuilder::new(window)
    }

    /// Active dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn activities(&self, date: NaiveDate) -> &[ActivityKind] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    /// Number of occurrences of each kind across the whole ledger.
    pub fn kind_counts(&self) -> BTreeMap<ActivityKind, usize> {
        let mut counts = BTreeMap::new();
        for kind in self.days.values().flatten() {
            *counts.entry(*kind).or_insert(0) += 1;
        }
        counts
    }

    /// Entries dated `date` or later, most recent first.
    pub fn since(&self, date: NaiveDate) -> impl Iterator<Item = (NaiveDate, &[ActivityKind])> + '_ {
        self.days
            .range(date..)
            .rev()
            .map(|(date, kinds)| (*date, kinds.as_slice()))
    }
}

pub struct ActivityLedgerBuilder {
    window: LookbackWindow,
    days: BTreeMap<NaiveDate, Vec<ActivityKind>>,
}

impl ActivityLedgerBuilder {
    pub fn new(window: LookbackWindow) -> Self {
        ActivityLedgerBuilder {
            window,
            days: BTreeMap::new(),
        }
    }

    /// Returns `false` and ignores the entry when `date` lies outside of the window.
    pub fn record(&mut self, date: NaiveDate, kind: ActivityKind) -> bool {
        if !self.window.contains(date) {
            return false;
        }
        self.days.entry(date).or_default().push(kind);
        true
    }

    pub fn record_timestamp(&mut self, timestamp: DateTime<Utc>, kind: ActivityKind) -> bool {
        self.record(timestamp.date_naive(), kind)
    }

    pub fn build(self) -> ActivityLedger {
        ActivityLedger { days: self.days }
    }
}

#[cfg(test)]
fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
fn window_ending(y: i32, m: u32, d: u32, days: u32) -> LookbackWindow {
    LookbackWindow::new(date(y, m, d).and_hms_opt(12, 0, 0).unwrap().and_utc(), days)
}

#[test]
fn window_bounds_test() {
    let window = window_ending(2024, 3, 1, 30);
    assert_eq!(window.start_date(), date(2024, 1, 31));
    assert_eq!(window.end_date(), date(2024, 3, 1));
    assert!(window.contains(date(2024, 1, 31)));
    assert!(window.contains(date(2024, 3, 1)));
    assert!(!window.contains(date(2024, 1, 30)));
    assert!(!window.contains(date(2024, 3, 2)));
}

#[test]
fn huge_window_starts_at_earliest_date_test() {
    let window = window_ending(2024, 3, 1, u32::MAX);
    assert_eq!(window.start(), DateTime::<Utc>::MIN_UTC);
    assert_eq!(window.days(), u32::MAX);
    assert!(window.contains(date(1970, 1, 1)));
    assert!(window.contains(date(2024, 3, 1)));
}

#[test]
fn builder_drops_dates_outside_window_test() {
    let mut builder = ActivityLedger::builder(window_ending(2024, 3, 1, 10));
    assert!(builder.record(date(2024, 2, 25), ActivityKind::Commit));
    assert!(!builder.record(date(2024, 1, 1), ActivityKind::Commit));
    assert!(!builder.record(date(2024, 3, 2), ActivityKind::ReleaseCreated));
    let ledger = builder.build();
    assert_eq!(ledger.dates().collect::<Vec<_>>(), vec![date(2024, 2, 25)]);
}

#[test]
fn builder_keeps_repeated_kinds_test() {
    let mut builder = ActivityLedger::builder(window_ending(2024, 3, 1, 10));
    builder.record(date(2024, 2, 28), ActivityKind::Commit);
    builder.record(date(2024, 2, 28), ActivityKind::Commit);
    builder.record(date(2024, 2, 28), ActivityKind::PullRequestCreated);
    builder.record(date(2024, 2, 27), ActivityKind::IssueCreated);
    let ledger = builder.build();

    assert_eq!(ledger.active_days(), 2);
    assert_eq!(
        ledger.activities(date(2024, 2, 28)),
        &[ActivityKind::Commit, ActivityKind::Commit, ActivityKind::PullRequestCreated]
    );
    assert!(ledger.activities(date(2024, 2, 26)).is_empty());

    let counts = ledger.kind_counts();
    assert_eq!(counts.get(&ActivityKind::Commit), Some(&2));
    assert_eq!(counts.get(&ActivityKind::IssueCreated), Some(&1));
    assert_eq!(counts.get(&ActivityKind::ReleaseCreated), None);
}

#[test]
fn timestamp_is_taken_in_utc_test() {
    let mut builder = ActivityLedger::builder(window_ending(2024, 3, 1, 10));
    let late_evening = DateTime::parse_from_rfc3339("2024-02-27T23:30:00-02:00").unwrap();
    builder.record_timestamp(late_evening.with_timezone(&Utc), ActivityKind::Commit);
    let ledger = builder.build();
    assert_eq!(ledger.dates().collect::<Vec<_>>(), vec![date(2024, 2, 28)]);
}

#[test]
fn since_is_most_recent_first_test() {
    let mut builder = ActivityLedger::builder(window_ending(2024, 3, 1, 30));
    for day in [10, 20, 25, 29] {
        builder.record(date(2024, 2, day), ActivityKind::Commit);
    }
    let ledger = builder.build();
    let recent = ledger.since(date(2024, 2, 20)).map(|(date, _)| date).collect::<Vec<_>>();
    assert_eq!(recent, vec![date(2024, 2, 29), date(2024, 2, 25), date(2024, 2, 20)]);
}

#[test]
fn kind_short_names_test() {
    use std::str::FromStr;
    assert_eq!(ActivityKind::PullRequestCreated.to_string(), "pr");
    assert_eq!(ActivityKind::from_str("repo").unwrap(), ActivityKind::RepoCreated);
}
