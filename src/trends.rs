use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{Application, JobApplicationCount, WeeklyTrendPoint};

pub const TREND_WEEKS: usize = 12;
pub const TOP_JOBS: usize = 8;

const MAX_LABEL_CHARS: usize = 18;
const UNKNOWN_JOB: &str = "Unknown";

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn weekly_trend(applications: &[Application], now: DateTime<Utc>) -> Vec<WeeklyTrendPoint> {
    let current_week = week_start(now.date_naive());
    let weeks: Vec<NaiveDate> = (0..TREND_WEEKS as i64)
        .rev()
        .map(|offset| current_week - Duration::weeks(offset))
        .collect();

    let mut counts: BTreeMap<NaiveDate, usize> = weeks.iter().map(|week| (*week, 0)).collect();
    for app in applications {
        // Anything older than the window, or created after the current week,
        // has no bucket and is dropped.
        let bucket = week_start(app.created_at.date_naive());
        if let Some(count) = counts.get_mut(&bucket) {
            *count += 1;
        }
    }

    weeks
        .into_iter()
        .map(|week_start| WeeklyTrendPoint {
            week_start,
            count: counts[&week_start],
        })
        .collect()
}

pub fn job_wise_counts(applications: &[Application]) -> Vec<JobApplicationCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for app in applications {
        let title = app
            .job
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_JOB.to_string());
        *counts.entry(title).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_JOBS);

    ranked
        .into_iter()
        .map(|(title, count)| JobApplicationCount {
            job_title: truncate_label(&title),
            count,
        })
        .collect()
}

fn truncate_label(title: &str) -> String {
    if title.chars().count() <= MAX_LABEL_CHARS {
        return title.to_string();
    }
    let mut label: String = title.chars().take(MAX_LABEL_CHARS).collect();
    label.push('…');
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationStatus, CandidateRef, JobRef};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn app_created(created_at: DateTime<Utc>, title: Option<&str>) -> Application {
        Application {
            id: Uuid::new_v4(),
            job: JobRef {
                id: Uuid::new_v4(),
                title: title.map(str::to_string),
            },
            candidate: CandidateRef {
                id: Uuid::new_v4(),
                name: None,
            },
            status: ApplicationStatus::Applied,
            current_round: None,
            created_at,
            updated_at: created_at,
            resume_url: None,
            cover_letter: None,
        }
    }

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2026-03-01 is a Sunday.
        assert_eq!(
            week_start(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert_eq!(
            week_start(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn trend_always_has_twelve_ascending_buckets() {
        let points = weekly_trend(&[], ts(2026, 3, 4));

        assert_eq!(points.len(), TREND_WEEKS);
        for pair in points.windows(2) {
            assert!(pair[0].week_start < pair[1].week_start);
        }
        assert_eq!(
            points[0].week_start,
            NaiveDate::from_ymd_opt(2025, 12, 14).unwrap()
        );
        assert_eq!(
            points[11].week_start,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(points.iter().all(|point| point.count == 0));
    }

    #[test]
    fn trend_buckets_and_excludes_by_window() {
        let now = ts(2026, 3, 4);
        let applications = vec![
            app_created(ts(2026, 3, 3), None),
            app_created(ts(2026, 2, 25), None),
            app_created(ts(2026, 2, 25), None),
            // One week before the oldest bucket.
            app_created(ts(2025, 12, 13), None),
            // After the current week.
            app_created(ts(2026, 3, 9), None),
        ];

        let points = weekly_trend(&applications, now);
        let total: usize = points.iter().map(|point| point.count).sum();
        assert_eq!(total, 3);

        let current = points.last().unwrap();
        assert_eq!(current.count, 1);
        let feb_week = points
            .iter()
            .find(|point| point.week_start == NaiveDate::from_ymd_opt(2026, 2, 22).unwrap())
            .unwrap();
        assert_eq!(feb_week.count, 2);
    }

    #[test]
    fn trend_labels_slice_to_month_and_day() {
        let points = weekly_trend(&[], ts(2026, 3, 4));
        assert_eq!(points[11].label(), "03-01");
    }

    #[test]
    fn job_counts_rank_and_cap_at_eight() {
        let mut applications = Vec::new();
        for (title, count) in [
            ("Alpha", 5),
            ("Beta", 4),
            ("Gamma", 3),
            ("Delta", 3),
            ("Epsilon", 2),
            ("Zeta", 2),
            ("Eta", 1),
            ("Theta", 1),
            ("Iota", 1),
            ("Kappa", 1),
        ] {
            for _ in 0..count {
                applications.push(app_created(ts(2026, 3, 1), Some(title)));
            }
        }

        let ranked = job_wise_counts(&applications);
        assert_eq!(ranked.len(), TOP_JOBS);
        for pair in ranked.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
        assert_eq!(ranked[0].job_title, "Alpha");
        assert_eq!(ranked[0].count, 5);
        let total: usize = ranked.iter().map(|job| job.count).sum();
        assert!(total <= applications.len());
    }

    #[test]
    fn missing_titles_group_under_unknown() {
        let applications = vec![
            app_created(ts(2026, 3, 1), None),
            app_created(ts(2026, 3, 1), None),
            app_created(ts(2026, 3, 1), Some("Data Engineer")),
        ];

        let ranked = job_wise_counts(&applications);
        assert_eq!(ranked[0].job_title, "Unknown");
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let applications = vec![app_created(
            ts(2026, 3, 1),
            Some("Senior Distributed Systems Engineer"),
        )];

        let ranked = job_wise_counts(&applications);
        assert_eq!(ranked[0].job_title, "Senior Distributed…");
        assert_eq!(ranked[0].job_title.chars().count(), MAX_LABEL_CHARS + 1);
    }
}
