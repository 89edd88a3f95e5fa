use chrono::{DateTime, Duration, Utc};

use crate::models::{
    Application, ApplicationStatus, EvaluationStatus, PipelineHealth, RoundEvaluation,
};

pub const STUCK_AFTER_DAYS: i64 = 7;

pub fn pipeline_health(
    applications: &[Application],
    evaluations: &[RoundEvaluation],
    now: DateTime<Utc>,
) -> PipelineHealth {
    let stuck_cutoff = now - Duration::days(STUCK_AFTER_DAYS);

    let stuck_applications = applications
        .iter()
        .filter(|app| {
            matches!(
                app.status,
                ApplicationStatus::Applied | ApplicationStatus::UnderReview
            ) && app.updated_at < stuck_cutoff
        })
        .count();

    let overdue_evaluations = evaluations
        .iter()
        .filter(|eval| {
            !eval.status.is_terminal()
                && eval
                    .scheduled_at
                    .is_some_and(|scheduled| scheduled < now)
        })
        .count();

    let awaiting_feedback = evaluations
        .iter()
        .filter(|eval| {
            matches!(
                eval.status,
                EvaluationStatus::Pending | EvaluationStatus::InProgress
            )
        })
        .count();

    PipelineHealth {
        stuck_applications,
        overdue_evaluations,
        awaiting_feedback,
    }
}
