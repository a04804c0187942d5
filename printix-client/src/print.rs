//! Two-phase print submission.
//!
//! 1. [`PrintixClient::submit`] registers the job and returns upload links.
//! 2. [`PrintixClient::upload_document`] PUTs the document to the first link.
//! 3. [`PrintixClient::complete_upload`] follows the `uploadCompleted` HAL link.
//!
//! [`PrintixClient::print_data`] and [`PrintixClient::print_file`] chain all three.

use crate::client::{ApiRequest, NoContent, PrintixClient};
use crate::error::{snippet, ClientError, ClientResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Page description languages accepted in the `PDL` query parameter.
pub mod pdl {
    pub const PCL5: &str = "PCL5";
    pub const PCLXL: &str = "PCLXL";
    pub const POSTSCRIPT: &str = "POSTSCRIPT";
    pub const UFRII: &str = "UFRII";
    pub const TEXT: &str = "TEXT";
    pub const XPS: &str = "XPS";
    pub const ZPL: &str = "ZPL";
}

/// PDL implied by a file extension, if any. PDFs and unknown types return `None`.
pub fn pdl_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "zpl" => Some(pdl::ZPL),
        "pcl" => Some(pdl::PCL5),
        "ps" => Some(pdl::POSTSCRIPT),
        "xps" => Some(pdl::XPS),
        _ => None,
    }
}

// ============================================================================
// JOB PROPERTIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Duplex {
    None,
    ShortEdge,
    LongEdge,
}

impl Duplex {
    /// Map `none` / `long-edge` / `short-edge`.
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Duplex::None),
            "long-edge" => Some(Duplex::LongEdge),
            "short-edge" => Some(Duplex::ShortEdge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Auto,
}

impl PageOrientation {
    /// Map `portrait` / `landscape`.
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value {
            "portrait" => Some(PageOrientation::Portrait),
            "landscape" => Some(PageOrientation::Landscape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scaling {
    #[serde(rename = "NOSCALE")]
    NoScale,
    #[serde(rename = "SHRINK")]
    Shrink,
    #[serde(rename = "FIT")]
    Fit,
}

/// Assigns the job to a user looked up by directory attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMapping {
    /// `AzureObjectId`, `AzureUPN`, `SAMAccountName`, `OnPremImmutableId`, `OnPremUpn`, or `Email`.
    pub key: String,
    pub value: String,
}

/// A job to submit. Routing fields go into the URL and query string; the
/// v1.1 properties go into the JSON body.
#[derive(Debug, Clone, Default)]
pub struct PrintJob {
    pub printer_id: String,
    pub queue_id: String,
    pub title: Option<String>,
    pub user: Option<String>,
    pub pdl: Option<String>,

    pub color: Option<bool>,
    pub duplex: Option<Duplex>,
    pub page_orientation: Option<PageOrientation>,
    pub copies: Option<u32>,
    pub media_size: Option<String>,
    pub scaling: Option<Scaling>,
    pub user_mapping: Option<UserMapping>,

    /// Defaults to `true` when unset.
    pub release_immediately: Option<bool>,
    pub test_mode: bool,
    /// Send the v1.1 header and body even when no v1.1 property is set.
    pub use_v11: bool,
}

#[derive(Serialize)]
struct V11Properties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplex: Option<Duplex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_orientation: Option<PageOrientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copies: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scaling: Option<Scaling>,
    #[serde(rename = "userMapping")]
    user_mapping: Option<&'a UserMapping>,
}

impl PrintJob {
    pub fn new(printer_id: impl Into<String>, queue_id: impl Into<String>) -> Self {
        Self {
            printer_id: printer_id.into(),
            queue_id: queue_id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_pdl(mut self, pdl: impl Into<String>) -> Self {
        self.pdl = Some(pdl.into());
        self
    }

    pub fn uses_v11(&self) -> bool {
        self.use_v11
            || self.color.is_some()
            || self.duplex.is_some()
            || self.page_orientation.is_some()
            || self.copies.is_some()
            || self.media_size.as_deref().is_some_and(|m| !m.is_empty())
            || self.scaling.is_some()
    }

    fn v11_properties(&self) -> V11Properties<'_> {
        V11Properties {
            color: self.color,
            duplex: self.duplex,
            page_orientation: self.page_orientation,
            copies: self.copies,
            media_size: self.media_size.as_deref().filter(|m| !m.is_empty()),
            scaling: self.scaling,
            user_mapping: self.user_mapping.as_ref(),
        }
    }
}

/// Caller-facing print options in the older, lowercase vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub copies: Option<u32>,
    pub color: bool,
    /// `none`, `long-edge`, or `short-edge`.
    pub duplex: Option<String>,
    /// `portrait` or `landscape`.
    pub orientation: Option<String>,
    /// A0-A5, B4-B5, LETTER, LEGAL, ...
    pub media_size: Option<String>,
    pub scaling: Option<Scaling>,
}

impl PrintOptions {
    /// Copy these options onto `job`, switching it to v1.1. Unrecognised
    /// duplex or orientation values are dropped.
    pub fn apply_to(&self, job: &mut PrintJob) {
        job.use_v11 = true;
        if let Some(copies) = self.copies.filter(|c| *c > 0) {
            job.copies = Some(copies);
        }
        if self.color {
            job.color = Some(true);
        }
        if let Some(duplex) = self.duplex.as_deref().and_then(Duplex::from_legacy) {
            job.duplex = Some(duplex);
        }
        if let Some(orientation) = self
            .orientation
            .as_deref()
            .and_then(PageOrientation::from_legacy)
        {
            job.page_orientation = Some(orientation);
        }
        if let Some(media) = self.media_size.as_ref().filter(|m| !m.is_empty()) {
            job.media_size = Some(media.clone());
        }
        if self.scaling.is_some() {
            job.scaling = self.scaling;
        }
    }
}

// ============================================================================
// SUBMIT RESPONSE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubmitResponse {
    pub job: SubmittedJob,
    #[serde(rename = "uploadLinks")]
    pub upload_links: Vec<UploadLink>,
    #[serde(rename = "_links")]
    pub links: SubmitLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmittedJob {
    pub id: String,
    /// Observed both as epoch seconds and as ISO strings.
    pub create_time: serde_json::Value,
    pub update_time: serde_json::Value,
    pub status: String,
    pub owner_id: String,
    pub content_type: String,
    pub title: String,
    #[serde(rename = "_links")]
    pub links: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadLink {
    pub url: String,
    pub headers: HashMap<String, String>,
    /// `Azure` or `GCP`. Not always present.
    #[serde(rename = "type")]
    pub storage_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitLinks {
    pub upload_completed: Option<Link>,
    pub change_owner: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Link {
    pub href: String,
    pub templated: bool,
}

// ============================================================================
// OPERATIONS
// ============================================================================

impl PrintixClient {
    /// Register a print job. The document itself is uploaded separately.
    pub async fn submit(&self, job: &PrintJob) -> ClientResult<SubmitResponse> {
        let tenant = self.require_tenant("job submission")?;
        if job.printer_id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "printer ID is required for job submission".to_string(),
            ));
        }
        if job.queue_id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "queue ID is required for job submission".to_string(),
            ));
        }

        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let mut request = ApiRequest::post(format!(
            "/cloudprint/tenants/{}/printers/{}/queues/{}/submit",
            tenant, job.printer_id, job.queue_id
        ))
        .query_opt("title", non_empty(&job.title))
        .query_opt("user", non_empty(&job.user))
        .query_opt("PDL", non_empty(&job.pdl));

        if self.is_test_mode() || job.test_mode {
            request = request.query("test", "true");
        }
        request = request.query(
            "releaseImmediately",
            job.release_immediately.unwrap_or(true),
        );

        if job.uses_v11() {
            request = request
                .header("version", "1.1")
                .json(&job.v11_properties())?;
        }

        let response: SubmitResponse = self.call("submit", request).await?;
        tracing::info!(
            job_id = %response.job.id,
            printer_id = %job.printer_id,
            upload_links = response.upload_links.len(),
            "Submitted print job"
        );
        Ok(response)
    }

    /// PUT the document to a storage upload link. This request is not sent
    /// with the API bearer token; any headers Printix supplied are applied
    /// on top of the default `Content-Type: application/pdf`.
    pub async fn upload_document(
        &self,
        upload_url: &str,
        headers: &HashMap<String, String>,
        data: Vec<u8>,
    ) -> ClientResult<()> {
        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        for (name, value) in headers {
            let invalid = |reason: String| {
                ClientError::InvalidRequest(format!("upload header {}: {}", name, reason))
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            header_map.insert(header_name, header_value);
        }

        let size = data.len();
        let response = self
            .http()
            .put(upload_url)
            .headers(header_map)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UploadFailed {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        tracing::debug!(bytes = size, "Uploaded document");
        Ok(())
    }

    /// Tell Printix the upload finished, via the `uploadCompleted` link.
    pub async fn complete_upload(&self, complete_href: &str) -> ClientResult<()> {
        if complete_href.is_empty() {
            return Err(ClientError::InvalidRequest(
                "missing uploadCompleted link".to_string(),
            ));
        }
        let _: NoContent = self
            .call("complete upload", ApiRequest::post(complete_href))
            .await?;
        Ok(())
    }

    /// Submit, upload, and complete in one call.
    pub async fn print_data(
        &self,
        printer_id: &str,
        queue_id: &str,
        title: &str,
        data: Vec<u8>,
        pdl: Option<&str>,
        options: Option<&PrintOptions>,
    ) -> ClientResult<SubmitResponse> {
        let mut job = PrintJob::new(printer_id, queue_id).with_title(title);
        job.user = self.user_identifier().map(str::to_string);
        job.pdl = pdl.map(str::to_string);
        job.test_mode = self.is_test_mode();
        if let Some(options) = options {
            options.apply_to(&mut job);
        }

        let submitted = self
            .submit(&job)
            .await
            .map_err(|e| e.in_stage("submitting print job"))?;

        let link = submitted
            .upload_links
            .first()
            .ok_or(ClientError::NoUploadLinks)?;
        self.upload_document(&link.url, &link.headers, data)
            .await
            .map_err(|e| e.in_stage("uploading document"))?;

        let complete_href = submitted
            .links
            .upload_completed
            .as_ref()
            .map(|l| l.href.as_str())
            .unwrap_or_default();
        self.complete_upload(complete_href)
            .await
            .map_err(|e| e.in_stage("completing upload"))?;

        Ok(submitted)
    }

    /// Read `path` and print it. The PDL is derived from the file extension.
    pub async fn print_file(
        &self,
        printer_id: &str,
        queue_id: &str,
        title: &str,
        path: impl AsRef<Path>,
        options: Option<&PrintOptions>,
    ) -> ClientResult<SubmitResponse> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::from(e).in_stage("reading file"))?;
        self.print_data(printer_id, queue_id, title, data, pdl_for_path(path), options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdl_for_path() {
        assert_eq!(pdl_for_path(Path::new("label.zpl")), Some(pdl::ZPL));
        assert_eq!(pdl_for_path(Path::new("doc.PCL")), Some(pdl::PCL5));
        assert_eq!(pdl_for_path(Path::new("a.ps")), Some(pdl::POSTSCRIPT));
        assert_eq!(pdl_for_path(Path::new("b.xps")), Some(pdl::XPS));
        assert_eq!(pdl_for_path(Path::new("report.pdf")), None);
        assert_eq!(pdl_for_path(Path::new("noext")), None);
    }

    #[test]
    fn test_v1_job_has_no_body() {
        let job = PrintJob::new("p", "q").with_title("t");
        assert!(!job.uses_v11());
    }

    #[test]
    fn test_v11_body_shape() {
        let mut job = PrintJob::new("p", "q");
        job.color = Some(false);
        job.duplex = Some(Duplex::LongEdge);
        job.copies = Some(2);
        job.scaling = Some(Scaling::NoScale);
        assert!(job.uses_v11());

        let body = serde_json::to_value(job.v11_properties()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "color": false,
                "duplex": "LONG_EDGE",
                "copies": 2,
                "scaling": "NOSCALE",
                "userMapping": null
            })
        );
    }

    #[test]
    fn test_print_options_map_legacy_values() {
        let options = PrintOptions {
            copies: Some(3),
            color: true,
            duplex: Some("short-edge".to_string()),
            orientation: Some("landscape".to_string()),
            media_size: Some("A4".to_string()),
            scaling: Some(Scaling::Fit),
        };
        let mut job = PrintJob::new("p", "q");
        options.apply_to(&mut job);

        assert!(job.use_v11);
        assert_eq!(job.copies, Some(3));
        assert_eq!(job.color, Some(true));
        assert_eq!(job.duplex, Some(Duplex::ShortEdge));
        assert_eq!(job.page_orientation, Some(PageOrientation::Landscape));
        assert_eq!(job.media_size.as_deref(), Some("A4"));
        assert_eq!(job.scaling, Some(Scaling::Fit));
    }

    #[test]
    fn test_print_options_ignore_unknown_and_monochrome() {
        let options = PrintOptions {
            copies: Some(0),
            duplex: Some("both-sides".to_string()),
            orientation: Some("sideways".to_string()),
            ..Default::default()
        };
        let mut job = PrintJob::new("p", "q");
        options.apply_to(&mut job);

        assert!(job.use_v11);
        assert_eq!(job.copies, None);
        assert_eq!(job.color, None);
        assert_eq!(job.duplex, None);
        assert_eq!(job.page_orientation, None);
    }

    #[test]
    fn test_submit_response_accepts_numeric_times() {
        let resp: SubmitResponse = serde_json::from_str(
            r#"{
                "job": {"id": "job-456", "createTime": 1600344674, "status": "Created", "title": "Doc"},
                "uploadLinks": [{"url": "https://storage.example.com/upload", "headers": {}, "type": "Azure"}],
                "_links": {"uploadCompleted": {"href": "https://api.printix.net/cloudprint/jobs/job-456/uploadCompleted"}}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.job.id, "job-456");
        assert_eq!(resp.upload_links[0].storage_type.as_deref(), Some("Azure"));
        assert!(resp
            .links
            .upload_completed
            .unwrap()
            .href
            .ends_with("/uploadCompleted"));
    }
}
