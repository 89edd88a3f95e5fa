use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    UnderReview,
    Shortlisted,
    Hired,
    Rejected,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    InProgress,
    Completed,
    Passed,
    Failed,
}

impl EvaluationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Passed | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundKind {
    Coding,
    Technical,
    Hr,
}

impl RoundKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "coding" => Some(Self::Coding),
            "technical" => Some(Self::Technical),
            "hr" => Some(Self::Hr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRef {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRef {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRef {
    #[serde(rename = "type")]
    pub round_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RoundRef {
    pub fn kind(&self) -> Option<RoundKind> {
        RoundKind::parse(&self.round_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job: JobRef,
    pub candidate: CandidateRef,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub current_round: Option<RoundRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub round_type: String,
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEvaluation {
    pub id: Uuid,
    pub round_id: Uuid,
    pub application_id: Uuid,
    pub status: EvaluationStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub applications: Vec<Application>,
    pub jobs: Vec<Job>,
    pub rounds: Vec<Round>,
    pub evaluations: Vec<RoundEvaluation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub in_interview: usize,
    pub offers_released: usize,
    pub hires: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub count: usize,
    pub conversion_from_prev: i32,
    pub drop_off_rate: i32,
    pub avg_days_in_stage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTrendPoint {
    pub week_start: NaiveDate,
    pub count: usize,
}

impl WeeklyTrendPoint {
    pub fn label(&self) -> String {
        self.week_start.format("%m-%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobApplicationCount {
    pub job_title: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineHealth {
    pub stuck_applications: usize,
    pub overdue_evaluations: usize,
    pub awaiting_feedback: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostAppliedJob {
    pub title: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFillTime {
    pub title: String,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopJobInsights {
    pub most_applied: MostAppliedJob,
    pub fastest_closed: JobFillTime,
    pub hardest_to_fill: JobFillTime,
}
