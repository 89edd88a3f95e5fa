use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::funnel;
use crate::health;
use crate::insights;
use crate::models::{
    Dataset, FunnelStage, JobApplicationCount, PipelineHealth, Summary, TopJobInsights,
    WeeklyTrendPoint,
};
use crate::trends;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardAnalytics {
    pub summary: Summary,
    pub funnel: Vec<FunnelStage>,
    pub weekly_trend: Vec<WeeklyTrendPoint>,
    pub top_jobs: Vec<JobApplicationCount>,
    pub health: PipelineHealth,
    pub insights: TopJobInsights,
}

impl DashboardAnalytics {
    pub fn compute(dataset: &Dataset, now: DateTime<Utc>) -> Self {
        Self {
            summary: funnel::summarize(&dataset.applications),
            funnel: funnel::build_funnel(
                &dataset.applications,
                &dataset.rounds,
                &dataset.evaluations,
            ),
            weekly_trend: trends::weekly_trend(&dataset.applications, now),
            top_jobs: trends::job_wise_counts(&dataset.applications),
            health: health::pipeline_health(
                &dataset.applications,
                &dataset.evaluations,
                now,
            ),
            insights: insights::top_job_insights(&dataset.applications, &dataset.jobs, now),
        }
    }
}
