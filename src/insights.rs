use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Application, ApplicationStatus, Job, JobFillTime, MostAppliedJob, TopJobInsights,
};

const NO_JOB_TITLE: &str = "—";
const MS_PER_DAY: f64 = 86_400_000.0;

struct JobGroup {
    job_id: Uuid,
    title: String,
    count: usize,
    hire_times: Vec<DateTime<Utc>>,
}

pub fn top_job_insights(
    applications: &[Application],
    jobs: &[Job],
    now: DateTime<Utc>,
) -> TopJobInsights {
    // Groups keep first-encountered order so ties resolve the same way on
    // every run.
    let mut groups: Vec<JobGroup> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for app in applications {
        let slot = *index.entry(app.job.id).or_insert_with(|| {
            groups.push(JobGroup {
                job_id: app.job.id,
                title: app
                    .job
                    .title
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                count: 0,
                hire_times: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        if app.status == ApplicationStatus::Hired {
            group.hire_times.push(app.updated_at);
        }
    }

    let created_at_by_job: HashMap<Uuid, DateTime<Utc>> =
        jobs.iter().map(|job| (job.id, job.created_at)).collect();

    let mut most_applied: Option<&JobGroup> = None;
    for group in &groups {
        if most_applied.is_none_or(|best| group.count > best.count) {
            most_applied = Some(group);
        }
    }

    let mut fastest: Option<(f64, &JobGroup)> = None;
    for group in &groups {
        let first_hire = match group.hire_times.iter().min() {
            Some(hired_at) => *hired_at,
            None => continue,
        };
        let created_at = match created_at_by_job.get(&group.job_id) {
            Some(created_at) => *created_at,
            None => continue,
        };
        let days = days_between(created_at, first_hire);
        if fastest.is_none_or(|(best, _)| days < best) {
            fastest = Some((days, group));
        }
    }

    let mut hardest: Option<(f64, &JobGroup)> = None;
    for group in &groups {
        if group.count < 2 {
            continue;
        }
        let created_at = match created_at_by_job.get(&group.job_id) {
            Some(created_at) => *created_at,
            None => continue,
        };
        let last_hire = group.hire_times.iter().max().copied();
        let days = days_between(created_at, last_hire.unwrap_or(now));
        if hardest.is_none_or(|(best, _)| days > best) {
            hardest = Some((days, group));
        }
    }

    TopJobInsights {
        most_applied: most_applied
            .map(|group| MostAppliedJob {
                title: group.title.clone(),
                count: group.count,
            })
            .unwrap_or_else(|| MostAppliedJob {
                title: NO_JOB_TITLE.to_string(),
                count: 0,
            }),
        fastest_closed: fill_time(fastest),
        hardest_to_fill: fill_time(hardest),
    }
}

fn fill_time(candidate: Option<(f64, &JobGroup)>) -> JobFillTime {
    match candidate {
        Some((days, group)) => JobFillTime {
            title: group.title.clone(),
            days: days.round() as i64,
        },
        None => JobFillTime {
            title: NO_JOB_TITLE.to_string(),
            days: 0,
        },
    }
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MS_PER_DAY
}
