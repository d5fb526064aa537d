//! Streak and "logged today" derivations over a snapshot of diary entries.
//!
//! Everything here is recomputed from scratch on each call; nothing is cached.

use crate::diary_entry::DiaryEntry;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MILESTONES: [u32; 7] = [3, 7, 14, 30, 60, 100, 365];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Streak lengths that trigger a milestone, ascending.
    pub milestones: Vec<u32>,
}

impl Default for StreakConfig {
    fn default() -> Self {
        StreakConfig {
            milestones: DEFAULT_MILESTONES.to_vec(),
        }
    }
}

impl StreakConfig {
    pub fn new(mut milestones: Vec<u32>) -> Self {
        milestones.retain(|m| *m > 0);
        milestones.sort_unstable();
        milestones.dedup();
        StreakConfig { milestones }
    }

    pub fn next_milestone(&self, streak: u32) -> Option<u32> {
        self.milestones.iter().copied().find(|m| *m > streak)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub next_milestone: Option<u32>,
    pub days_to_next_milestone: u32,
    pub streak_message: String,
    pub logged_today: bool,
}

fn entry_days(entries: &[DiaryEntry], today: NaiveDate) -> HashSet<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| match entry.calendar_date() {
            Some(day) => Some(day),
            None => {
                log::debug!("skipping diary entry with unparseable date {:?}", entry.date);
                None
            }
        })
        .filter(|day| *day <= today)
        .collect()
}

pub fn has_logged_today(entries: &[DiaryEntry], today: NaiveDate) -> bool {
    entries.iter().any(|e| e.calendar_date() == Some(today))
}

/// Length of the run of consecutive logged days ending today, or ending
/// yesterday when today has not been logged yet.
pub fn current_streak(entries: &[DiaryEntry], today: NaiveDate) -> u32 {
    let days = entry_days(entries, today);

    let anchor = if days.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut day = Some(anchor);
    while let Some(d) = day.filter(|d| days.contains(d)) {
        streak += 1;
        day = d.checked_sub_days(Days::new(1));
    }
    streak
}

fn streak_message(streak: u32, logged_today: bool, next: Option<u32>) -> String {
    match (streak, logged_today, next) {
        (0, _, _) => "Start your streak today".to_string(),
        (_, false, _) => format!("Log today to keep your {}-day streak going", streak),
        (1, true, _) => "Great start! Come back tomorrow".to_string(),
        (_, true, Some(next)) if next - streak == 1 => {
            format!("One more day to reach {} days", next)
        }
        (_, true, Some(_)) => format!("{} days in a row, keep it up", streak),
        (_, true, None) => format!("{} days in a row, every milestone reached", streak),
    }
}

pub fn calculate_streak(
    entries: &[DiaryEntry],
    today: NaiveDate,
    config: &StreakConfig,
) -> StreakState {
    let current_streak = current_streak(entries, today);
    let logged_today = has_logged_today(entries, today);
    let next_milestone = config.next_milestone(current_streak);
    let days_to_next_milestone = next_milestone.map_or(0, |m| m - current_streak);

    StreakState {
        current_streak,
        next_milestone,
        days_to_next_milestone,
        streak_message: streak_message(current_streak, logged_today, next_milestone),
        logged_today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entries(dates: &[&str]) -> Vec<DiaryEntry> {
        dates
            .iter()
            .map(|d| {
                let mut e = DiaryEntry::new(day("2000-01-01"), "Site");
                e.date = d.to_string();
                e
            })
            .collect()
    }

    #[test]
    fn empty_list_has_no_streak() {
        let state = calculate_streak(&[], day("2024-06-03"), &StreakConfig::default());
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.next_milestone, Some(3));
        assert_eq!(state.days_to_next_milestone, 3);
        assert_eq!(state.streak_message, "Start your streak today");
        assert!(!state.logged_today);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let list = entries(&["2024-06-01", "2024-06-02", "2024-06-03"]);
        assert_eq!(current_streak(&list, day("2024-06-03")), 3);

        let gap = entries(&["2024-06-01", "2024-06-03"]);
        assert_eq!(current_streak(&gap, day("2024-06-03")), 1);
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let list = entries(&["2024-06-01", "2024-06-02"]);
        let state = calculate_streak(&list, day("2024-06-03"), &StreakConfig::default());
        assert_eq!(state.current_streak, 2);
        assert!(!state.logged_today);
        assert_eq!(state.streak_message, "Log today to keep your 2-day streak going");
    }

    #[test]
    fn two_days_ago_breaks_streak() {
        let list = entries(&["2024-06-01"]);
        assert_eq!(current_streak(&list, day("2024-06-03")), 0);
    }

    #[test]
    fn duplicates_and_garbage_are_ignored() {
        let list = entries(&["2024-06-02", "2024-06-03", "2024-06-03", "not-a-date", ""]);
        assert_eq!(current_streak(&list, day("2024-06-03")), 2);
    }

    #[test]
    fn future_entries_do_not_count() {
        let list = entries(&["2024-06-04", "2024-06-05"]);
        assert_eq!(current_streak(&list, day("2024-06-03")), 0);
    }

    #[test]
    fn milestone_is_none_past_the_last() {
        let config = StreakConfig::new(vec![3, 7]);
        let list = entries(&[
            "2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04", "2024-06-05", "2024-06-06",
            "2024-06-07",
        ]);
        let state = calculate_streak(&list, day("2024-06-07"), &config);
        assert_eq!(state.current_streak, 7);
        assert_eq!(state.next_milestone, None);
        assert_eq!(state.days_to_next_milestone, 0);
    }

    #[test]
    fn one_day_before_milestone_message() {
        let list = entries(&["2024-06-02", "2024-06-03"]);
        let state = calculate_streak(&list, day("2024-06-03"), &StreakConfig::default());
        assert_eq!(state.streak_message, "One more day to reach 3 days");
    }

    #[test]
    fn config_sorts_and_drops_zero() {
        let config = StreakConfig::new(vec![30, 0, 7, 7, 3]);
        assert_eq!(config.milestones, vec![3, 7, 30]);
    }

    #[test]
    fn today_check_matches_exact_day_only() {
        let list = entries(&["2024-06-02", "garbage"]);
        assert!(has_logged_today(&list, day("2024-06-02")));
        assert!(!has_logged_today(&list, day("2024-06-03")));
    }
}
