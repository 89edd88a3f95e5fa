use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::dashboard::DashboardAnalytics;
use crate::health::STUCK_AFTER_DAYS;

pub fn build_report(scope: &str, as_of: DateTime<Utc>, analytics: &DashboardAnalytics) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Hiring Pipeline Report");
    let _ = writeln!(
        output,
        "Generated for {} (as of {})",
        scope,
        as_of.format("%Y-%m-%d")
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total applications: {}", analytics.summary.total);
    let _ = writeln!(output, "- In interview: {}", analytics.summary.in_interview);
    let _ = writeln!(
        output,
        "- Offers released: {}",
        analytics.summary.offers_released
    );
    let _ = writeln!(output, "- Hires: {}", analytics.summary.hires);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Funnel");
    let _ = writeln!(output, "| Stage | Count | Conversion % | Drop-off % | Avg days |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for stage in &analytics.funnel {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {:.1} |",
            stage.stage,
            stage.count,
            stage.conversion_from_prev,
            stage.drop_off_rate,
            stage.avg_days_in_stage
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Applications");
    if analytics.weekly_trend.iter().all(|point| point.count == 0) {
        let _ = writeln!(output, "No applications in the last 12 weeks.");
    } else {
        for point in &analytics.weekly_trend {
            let _ = writeln!(output, "- {}: {}", point.label(), point.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Jobs");
    if analytics.top_jobs.is_empty() {
        let _ = writeln!(output, "No applications recorded.");
    } else {
        for job in &analytics.top_jobs {
            let _ = writeln!(output, "- {}: {} applications", job.job_title, job.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pipeline Health");
    let _ = writeln!(
        output,
        "- Applications stuck over {} days: {}",
        STUCK_AFTER_DAYS, analytics.health.stuck_applications
    );
    let _ = writeln!(
        output,
        "- Overdue evaluations: {}",
        analytics.health.overdue_evaluations
    );
    let _ = writeln!(
        output,
        "- Awaiting feedback: {}",
        analytics.health.awaiting_feedback
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Job Insights");
    let _ = writeln!(
        output,
        "- Most applied: {} ({} applications)",
        analytics.insights.most_applied.title, analytics.insights.most_applied.count
    );
    let _ = writeln!(
        output,
        "- Fastest closed: {} ({} days)",
        analytics.insights.fastest_closed.title, analytics.insights.fastest_closed.days
    );
    let _ = writeln!(
        output,
        "- Hardest to fill: {} ({} days)",
        analytics.insights.hardest_to_fill.title, analytics.insights.hardest_to_fill.days
    );

    output
}
