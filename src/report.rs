use chrono::{Duration, NaiveDate};
use derive_more::Constructor;
use serde::Serialize;
use std::fmt::Display;
use streak::collector::{CategorySummary, Collection};
use streak::{ActivityKind, LookbackWindow, StreakResult};

/// Days shown in the recent activity section, today excluded.
const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Constructor)]
pub struct KindCount {
    pub kind: ActivityKind,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentDay {
    pub date: NaiveDate,
    pub days_ago: i64,
    pub activities: Vec<KindCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakReport {
    pub user: String,
    pub today: NaiveDate,
    pub window_days: u32,
    pub streak: StreakResult,
    pub active_days: usize,
    /// Share of days in the window with any activity, in percent.
    pub activity_rate: f64,
    pub breakdown: Vec<KindCount>,
    pub recent: Vec<RecentDay>,
    pub categories: Vec<CategorySummary>,
}

impl StreakReport {
    pub fn new(user: String, window: &LookbackWindow, collection: Collection, streak: StreakResult) -> Self {
        let ledger = &collection.ledger;
        let today = window.end_date();
        let active_days = ledger.active_days();
        let breakdown = ledger
            .kind_counts()
            .into_iter()
            .map(|(kind, count)| KindCount::new(kind, count))
            .collect();
        let recent = ledger
            .since(today - Duration::days(RECENT_DAYS))
            .map(|(date, kinds)| RecentDay {
                date,
                days_ago: (today - date).num_days(),
                activities: count_kinds(kinds),
            })
            .collect();
        StreakReport {
            user,
            today,
            window_days: window.days(),
            streak,
            active_days,
            activity_rate: active_days as f64 / window.days() as f64 * 100.0,
            breakdown,
            recent,
            categories: collection.summaries,
        }
    }
}

/// Counts per kind, in order of first appearance.
fn count_kinds(kinds: &[ActivityKind]) -> Vec<KindCount> {
    let mut counts: Vec<KindCount> = Vec::new();
    for kind in kinds {
        match counts.iter_mut().find(|count| count.kind == *kind) {
            Some(count) => count.count += 1,
            None => counts.push(KindCount::new(*kind, 1)),
        }
    }
    counts
}

impl Display for KindCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count > 1 {
            write!(f, "{}({})", self.kind, self.count)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl Display for StreakReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GitHub streak information for {}", self.user)?;
        writeln!(f, "{}", "=".repeat(50))?;

        for category in &self.categories {
            if let Some(failure) = &category.failure {
                writeln!(f, "Error fetching {}: {}", category.kind.label().to_lowercase(), failure)?;
            }
            for warning in &category.warnings {
                writeln!(f, "Warning: {}", warning)?;
            }
        }

        if self.active_days == 0 {
            return writeln!(f, "No GitHub activity found in the last {} days.", self.window_days);
        }

        writeln!(f, "\nCurrent streak:")?;
        if self.streak.current_streak > 0 {
            writeln!(f, "\t{} days and counting!", self.streak.current_streak)?;
        } else {
            writeln!(f, "\tNo current streak")?;
            if let Some(days) = self.streak.days_since_last_activity {
                writeln!(f, "\tLast activity was {} days ago", days)?;
            }
        }

        writeln!(f, "\nPrevious best streak:")?;
        if self.streak.previous_streak > 0 {
            writeln!(f, "\t{} days", self.streak.previous_streak)?;
            if self.streak.current_streak == 0 {
                if let Some(days) = self.streak.days_since_last_activity {
                    writeln!(f, "\tEnded {} days ago", days)?;
                }
            }
        } else {
            writeln!(f, "\tNo previous streak found")?;
        }

        writeln!(f, "\nSummary (last {} days):", self.window_days)?;
        writeln!(f, "\tTotal active days: {}", self.active_days)?;
        writeln!(f, "\tActivity rate: {:.1}%", self.activity_rate)?;

        writeln!(f, "\nActivity breakdown:")?;
        for count in &self.breakdown {
            writeln!(f, "\t{}: {}", count.kind.label(), count.count)?;
        }

        if !self.recent.is_empty() {
            writeln!(f, "\nRecent activity (last {} days):", RECENT_DAYS)?;
            for day in &self.recent {
                let activities = day
                    .activities
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                let when = match day.days_ago {
                    0 => "Today".to_string(),
                    1 => "Yesterday".to_string(),
                    days => format!("{} days ago", days),
                };
                writeln!(f, "\t{} ({}): {}", when, day.date, activities)?;
            }
        }
        Ok(())
    }
}
