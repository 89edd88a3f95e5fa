use crate::models::{
    Application, ApplicationStatus, FunnelStage, Round, RoundEvaluation, RoundKind, Summary,
};

pub const STAGE_NAMES: [&str; 6] = ["Applications", "Coding", "Technical", "HR", "Offer", "Hired"];

const MS_PER_DAY: f64 = 86_400_000.0;

pub fn summarize(applications: &[Application]) -> Summary {
    Summary {
        total: applications.len(),
        in_interview: count_status(applications, ApplicationStatus::UnderReview),
        offers_released: count_status(applications, ApplicationStatus::Shortlisted),
        hires: count_status(applications, ApplicationStatus::Hired),
    }
}

pub fn build_funnel(
    applications: &[Application],
    _rounds: &[Round],
    evaluations: &[RoundEvaluation],
) -> Vec<FunnelStage> {
    let under_review: Vec<&Application> = applications
        .iter()
        .filter(|app| app.status == ApplicationStatus::UnderReview)
        .collect();

    let typed_count = |kind: RoundKind| {
        under_review
            .iter()
            .filter(|app| app.current_round.as_ref().and_then(|round| round.kind()) == Some(kind))
            .count()
    };

    let mut coding = typed_count(RoundKind::Coding);
    let technical = typed_count(RoundKind::Technical);
    let hr = typed_count(RoundKind::Hr);

    // Pipelines that never tag a round type report every in-review candidate
    // under the first interview stage.
    let has_tagging = under_review
        .iter()
        .any(|app| app.current_round.as_ref().and_then(|round| round.kind()).is_some());
    if !has_tagging {
        coding = under_review.len();
    }

    let counts = [
        applications.len(),
        coding,
        technical,
        hr,
        count_status(applications, ApplicationStatus::Shortlisted),
        count_status(applications, ApplicationStatus::Hired),
    ];

    // TODO: split the average by round type once evaluations can be joined to
    // rounds reliably; today one overall average covers all three interview
    // stages.
    let avg_days = average_stage_days(evaluations);

    let mut stages = Vec::with_capacity(STAGE_NAMES.len());
    for (i, name) in STAGE_NAMES.into_iter().enumerate() {
        let count = counts[i];
        let (conversion, drop_off) = if i == 0 {
            (100, 0)
        } else if counts[i - 1] == 0 {
            (0, 0)
        } else {
            let prev = counts[i - 1] as f64;
            (
                (100.0 * count as f64 / prev).round() as i32,
                (100.0 * (prev - count as f64) / prev).round() as i32,
            )
        };
        stages.push(FunnelStage {
            stage: name,
            count,
            conversion_from_prev: conversion,
            drop_off_rate: drop_off,
            avg_days_in_stage: if (1..=3).contains(&i) { avg_days } else { 0.0 },
        });
    }

    stages
}

fn average_stage_days(evaluations: &[RoundEvaluation]) -> f64 {
    let mut total_days = 0.0;
    let mut samples = 0usize;

    for eval in evaluations {
        if !eval.status.is_terminal() {
            continue;
        }
        if let (Some(scheduled), Some(completed)) = (eval.scheduled_at, eval.completed_at) {
            total_days += (completed - scheduled).num_milliseconds() as f64 / MS_PER_DAY;
            samples += 1;
        }
    }

    if samples == 0 {
        0.0
    } else {
        ((total_days / samples as f64) * 10.0).round() / 10.0
    }
}

fn count_status(applications: &[Application], status: ApplicationStatus) -> usize {
    applications
        .iter()
        .filter(|app| app.status == status)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRef, EvaluationStatus, JobRef, RoundRef};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn app(status: ApplicationStatus, round_type: Option<&str>) -> Application {
        Application {
            id: Uuid::new_v4(),
            job: JobRef {
                id: Uuid::new_v4(),
                title: Some("Backend Engineer".to_string()),
            },
            candidate: CandidateRef {
                id: Uuid::new_v4(),
                name: Some("Avery Lee".to_string()),
            },
            status,
            current_round: round_type.map(|raw| RoundRef {
                round_type: raw.to_string(),
                name: None,
            }),
            created_at: ts(1),
            updated_at: ts(2),
            resume_url: None,
            cover_letter: None,
        }
    }

    fn evaluation(status: EvaluationStatus, days_elapsed: Option<i64>) -> RoundEvaluation {
        let scheduled = ts(1);
        RoundEvaluation {
            id: Uuid::new_v4(),
            round_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            status,
            scheduled_at: Some(scheduled),
            completed_at: days_elapsed.map(|days| scheduled + Duration::days(days)),
        }
    }

    #[test]
    fn summary_counts_by_status() {
        let applications = vec![
            app(ApplicationStatus::Applied, None),
            app(ApplicationStatus::UnderReview, None),
            app(ApplicationStatus::UnderReview, None),
            app(ApplicationStatus::Shortlisted, None),
            app(ApplicationStatus::Hired, None),
            app(ApplicationStatus::Rejected, None),
            app(ApplicationStatus::Hold, None),
        ];

        let summary = summarize(&applications);
        assert_eq!(summary.total, 7);
        assert_eq!(summary.in_interview, 2);
        assert_eq!(summary.offers_released, 1);
        assert_eq!(summary.hires, 1);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn empty_inputs_yield_six_zero_stages() {
        let stages = build_funnel(&[], &[], &[]);

        assert_eq!(stages.len(), 6);
        assert_eq!(stages[0].conversion_from_prev, 100);
        for stage in &stages {
            assert_eq!(stage.count, 0);
            assert_eq!(stage.drop_off_rate, 0);
            assert_eq!(stage.avg_days_in_stage, 0.0);
        }
        for stage in &stages[1..] {
            assert_eq!(stage.conversion_from_prev, 0);
        }
    }

    #[test]
    fn stage_zero_tracks_every_application() {
        let applications = vec![
            app(ApplicationStatus::Applied, None),
            app(ApplicationStatus::Hired, None),
            app(ApplicationStatus::Rejected, None),
        ];

        let stages = build_funnel(&applications, &[], &[]);
        assert_eq!(stages[0].stage, "Applications");
        assert_eq!(stages[0].count, applications.len());
        assert_eq!(stages[0].conversion_from_prev, 100);
    }

    #[test]
    fn typed_rounds_split_the_interview_stages() {
        let applications = vec![
            app(ApplicationStatus::UnderReview, Some("CODING")),
            app(ApplicationStatus::UnderReview, Some("coding")),
            app(ApplicationStatus::UnderReview, Some("Technical")),
            app(ApplicationStatus::UnderReview, Some("hr")),
            app(ApplicationStatus::Shortlisted, None),
            app(ApplicationStatus::Hired, None),
        ];

        let stages = build_funnel(&applications, &[], &[]);
        assert_eq!(stages[1].count, 2);
        assert_eq!(stages[2].count, 1);
        assert_eq!(stages[3].count, 1);
        assert_eq!(stages[4].count, 1);
        assert_eq!(stages[5].count, 1);
    }

    #[test]
    fn coding_absorbs_untagged_reviews() {
        let applications = vec![
            app(ApplicationStatus::UnderReview, None),
            app(ApplicationStatus::UnderReview, Some("screening")),
            app(ApplicationStatus::UnderReview, None),
        ];

        let stages = build_funnel(&applications, &[], &[]);
        assert_eq!(stages[1].count, 3);
        assert_eq!(stages[2].count, 0);
        assert_eq!(stages[3].count, 0);
    }

    #[test]
    fn fallback_stays_off_once_any_round_is_tagged() {
        let applications = vec![
            app(ApplicationStatus::UnderReview, Some("technical")),
            app(ApplicationStatus::UnderReview, None),
        ];

        let stages = build_funnel(&applications, &[], &[]);
        assert_eq!(stages[1].count, 0);
        assert_eq!(stages[2].count, 1);
    }

    #[test]
    fn drop_off_and_conversion_are_complementary() {
        let applications = vec![
            app(ApplicationStatus::UnderReview, Some("coding")),
            app(ApplicationStatus::UnderReview, Some("coding")),
            app(ApplicationStatus::UnderReview, Some("technical")),
            app(ApplicationStatus::Applied, None),
            app(ApplicationStatus::Shortlisted, None),
            app(ApplicationStatus::Shortlisted, None),
            app(ApplicationStatus::Hired, None),
        ];

        let stages = build_funnel(&applications, &[], &[]);
        for i in 1..stages.len() {
            if stages[i - 1].count > 0 {
                let sum = stages[i].conversion_from_prev + stages[i].drop_off_rate;
                assert!((sum - 100).abs() <= 1, "stage {i} sums to {sum}");
            }
        }
    }

    #[test]
    fn terminal_evaluations_drive_one_shared_average() {
        let evaluations = vec![
            evaluation(EvaluationStatus::Completed, Some(1)),
            evaluation(EvaluationStatus::Passed, Some(2)),
            evaluation(EvaluationStatus::Failed, Some(3)),
            evaluation(EvaluationStatus::Completed, Some(4)),
        ];

        let stages = build_funnel(&[], &[], &evaluations);
        assert_eq!(stages[1].avg_days_in_stage, 2.5);
        assert_eq!(stages[2].avg_days_in_stage, 2.5);
        assert_eq!(stages[3].avg_days_in_stage, 2.5);
        assert_eq!(stages[0].avg_days_in_stage, 0.0);
        assert_eq!(stages[4].avg_days_in_stage, 0.0);
        assert_eq!(stages[5].avg_days_in_stage, 0.0);
    }

    #[test]
    fn pending_or_timestampless_evaluations_are_ignored() {
        let evaluations = vec![
            evaluation(EvaluationStatus::Pending, Some(10)),
            evaluation(EvaluationStatus::InProgress, Some(10)),
            evaluation(EvaluationStatus::Completed, None),
            evaluation(EvaluationStatus::Passed, Some(3)),
        ];

        let stages = build_funnel(&[], &[], &evaluations);
        assert_eq!(stages[1].avg_days_in_stage, 3.0);
    }
}
