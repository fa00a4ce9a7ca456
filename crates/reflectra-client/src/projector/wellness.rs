//! Chart, calendar and summary views over the mood-log history.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use reflectra_shared::types::{MoodLog, SleepQuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub mood: u8,
    pub stress: u8,
}

/// Check-ins of one UTC calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub average_mood: f64,
    pub average_stress: f64,
    pub worst_sleep: SleepQuality,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WellnessSummary {
    pub count: usize,
    pub average_mood: f64,
    pub average_stress: f64,
    pub first: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

pub fn chart_series(logs: &[MoodLog]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = logs
        .iter()
        .map(|log| ChartPoint {
            timestamp: log.timestamp,
            mood: log.mood,
            stress: log.stress,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

pub fn calendar(logs: &[MoodLog]) -> BTreeMap<NaiveDate, CalendarDay> {
    let mut days: BTreeMap<NaiveDate, Vec<&MoodLog>> = BTreeMap::new();
    for log in logs {
        days.entry(log.timestamp.date_naive()).or_default().push(log);
    }

    days.into_iter()
        .filter_map(|(date, day)| {
            let worst_sleep = day.iter().map(|l| l.sleep).max_by_key(|s| s.severity())?;
            let (mood, stress) = averages(&day);
            Some((
                date,
                CalendarDay {
                    date,
                    average_mood: mood,
                    average_stress: stress,
                    worst_sleep,
                    count: day.len(),
                },
            ))
        })
        .collect()
}

pub fn summary(logs: &[MoodLog]) -> Option<WellnessSummary> {
    let first = logs.iter().map(|l| l.timestamp).min()?;
    let latest = logs.iter().map(|l| l.timestamp).max()?;
    let all: Vec<&MoodLog> = logs.iter().collect();
    let (average_mood, average_stress) = averages(&all);
    Some(WellnessSummary {
        count: logs.len(),
        average_mood,
        average_stress,
        first,
        latest,
    })
}

fn averages(logs: &[&MoodLog]) -> (f64, f64) {
    if logs.is_empty() {
        return (0.0, 0.0);
    }
    let n = logs.len() as f64;
    let mood: u32 = logs.iter().map(|l| u32::from(l.mood)).sum();
    let stress: u32 = logs.iter().map(|l| u32::from(l.stress)).sum();
    (f64::from(mood) / n, f64::from(stress) / n)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::mood_log;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_chart_is_ascending() {
        let logs = vec![
            mood_log(2, at(2, 9), 7, 3, SleepQuality::Great),
            mood_log(1, at(1, 9), 4, 8, SleepQuality::Poor),
        ];
        let series = chart_series(&logs);
        assert_eq!(series[0].mood, 4);
        assert_eq!(series[1].mood, 7);
    }

    #[test]
    fn test_calendar_groups_by_utc_day() {
        let logs = vec![
            mood_log(1, at(1, 8), 6, 4, SleepQuality::Great),
            mood_log(2, at(1, 22), 8, 2, SleepQuality::Okay),
            mood_log(3, at(3, 12), 3, 9, SleepQuality::Poor),
        ];
        let days = calendar(&logs);
        assert_eq!(days.len(), 2);

        let first = &days[&NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()];
        assert_eq!(first.count, 2);
        assert_eq!(first.average_mood, 7.0);
        assert_eq!(first.average_stress, 3.0);
        assert_eq!(first.worst_sleep, SleepQuality::Okay);
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(&[]), None);

        let logs = vec![
            mood_log(1, at(1, 8), 5, 5, SleepQuality::Okay),
            mood_log(2, at(4, 8), 9, 1, SleepQuality::Great),
        ];
        let s = summary(&logs).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.average_mood, 7.0);
        assert_eq!(s.average_stress, 3.0);
        assert_eq!(s.first, at(1, 8));
        assert_eq!(s.latest, at(4, 8));
    }
}
