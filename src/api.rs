use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Application, Dataset, Job, Round, RoundEvaluation};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_dataset(&self, company_id: Uuid) -> anyhow::Result<Dataset> {
        info!(%company_id, "fetching dashboard collections");

        let (applications, jobs) = tokio::try_join!(
            self.fetch_applications(company_id),
            self.fetch_jobs(company_id),
        )?;

        let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
        let application_ids: Vec<Uuid> = applications.iter().map(|app| app.id).collect();

        let (rounds, evaluations) = tokio::try_join!(
            self.fetch_rounds(&job_ids),
            self.fetch_evaluations(&application_ids),
        )?;

        debug!(
            applications = applications.len(),
            jobs = jobs.len(),
            rounds = rounds.len(),
            evaluations = evaluations.len(),
            "collections fetched"
        );

        Ok(Dataset {
            applications,
            jobs,
            rounds,
            evaluations,
        })
    }

    async fn fetch_applications(&self, company_id: Uuid) -> anyhow::Result<Vec<Application>> {
        self.get_list(&format!("/api/companies/{company_id}/applications"))
            .await
    }

    async fn fetch_jobs(&self, company_id: Uuid) -> anyhow::Result<Vec<Job>> {
        self.get_list(&format!("/api/companies/{company_id}/jobs"))
            .await
    }

    async fn fetch_rounds(&self, job_ids: &[Uuid]) -> anyhow::Result<Vec<Round>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_list(&format!("/api/rounds?jobIds={}", join_ids(job_ids)))
            .await
    }

    async fn fetch_evaluations(
        &self,
        application_ids: &[Uuid],
    ) -> anyhow::Result<Vec<RoundEvaluation>> {
        if application_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_list(&format!(
            "/api/round-evaluations?applicationIds={}",
            join_ids(application_ids)
        ))
        .await
    }

    async fn get_list<T>(&self, endpoint: &str) -> anyhow::Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            anyhow::bail!("backend returned {status} for {url}: {body}");
        }

        response
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Dataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

pub fn save_snapshot(path: &Path, dataset: &Dataset) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(dataset).context("failed to serialize dataset")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}
