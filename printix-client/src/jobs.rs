//! Print job queries and control.

use crate::client::{ApiRequest, NoContent, PrintixClient};
use crate::error::ClientResult;
use serde::{Deserialize, Serialize};

/// Job status values reported by the API.
pub mod job_status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const PRINTING: &str = "printing";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const CANCELLED: &str = "cancelled";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub id: String,
    pub printer_id: String,
    pub printer_name: Option<String>,
    pub title: String,
    pub status: String,
    pub source: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Job {
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status.as_str(),
            job_status::COMPLETED | job_status::FAILED | job_status::CANCELLED
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub printer_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct SingleJob {
    job: Job,
}

impl PrintixClient {
    fn jobs_endpoint(&self, operation: &'static str) -> ClientResult<String> {
        let tenant = self.require_tenant(operation)?;
        Ok(format!("/cloudprint/tenants/{}/jobs", tenant))
    }

    pub async fn get_jobs(&self, options: &JobQuery) -> ClientResult<Vec<Job>> {
        let endpoint = self.jobs_endpoint("getting jobs")?;
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let request = ApiRequest::get(endpoint)
            .query_opt("printerId", non_empty(&options.printer_id))
            .query_opt("userId", non_empty(&options.user_id))
            .query_opt("status", non_empty(&options.status))
            .query_opt("limit", options.limit.filter(|l| *l > 0))
            .query_opt("offset", options.offset.filter(|o| *o > 0));
        let list: JobList = self.call("get jobs", request).await?;
        Ok(list.jobs)
    }

    pub async fn get_job(&self, job_id: &str) -> ClientResult<Job> {
        let endpoint = self.jobs_endpoint("getting job")?;
        let single: SingleJob = self
            .call("get job", ApiRequest::get(format!("{}/{}", endpoint, job_id)))
            .await?;
        Ok(single.job)
    }

    pub async fn cancel_job(&self, job_id: &str) -> ClientResult<()> {
        let endpoint = self.jobs_endpoint("cancelling job")?;
        let _: NoContent = self
            .call(
                "cancel job",
                ApiRequest::post(format!("{}/{}/cancel", endpoint, job_id)),
            )
            .await?;
        tracing::info!(job_id, "Cancelled print job");
        Ok(())
    }

    pub async fn delete_job(&self, job_id: &str) -> ClientResult<()> {
        let endpoint = self.jobs_endpoint("deleting job")?;
        let _: NoContent = self
            .call(
                "delete job",
                ApiRequest::delete(format!("{}/{}", endpoint, job_id)),
            )
            .await?;
        Ok(())
    }
}
