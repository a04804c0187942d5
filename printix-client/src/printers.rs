//! Printer listing and lookup.

use crate::client::{ApiRequest, PrintixClient};
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};

const ALL_PRINTERS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Printer {
    pub id: String,
    pub name: String,
    pub connection_status: Option<String>,
    pub printer_sign_id: Option<String>,
    pub location: Option<String>,
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub serial_no: Option<String>,
    pub capabilities: PrinterCapabilities,
    #[serde(rename = "_links")]
    pub links: serde_json::Value,
}

impl Printer {
    pub fn supports_content_type(&self, content_type: &str) -> bool {
        self.capabilities
            .printer
            .supported_content_type
            .iter()
            .any(|ct| ct.content_type == content_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterCapabilities {
    pub printer: PrinterDescription,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterDescription {
    pub media_size: OptionList<MediaSizeOption>,
    pub supported_content_type: Vec<ContentType>,
    pub copies: CopiesCapability,
    pub color: OptionList<ColorOption>,
    pub vendor_capability: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionList<T> {
    pub option: Vec<T>,
}

impl<T> Default for OptionList<T> {
    fn default() -> Self {
        Self { option: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaSizeOption {
    pub height_microns: i64,
    pub width_microns: i64,
    pub name: String,
    pub is_continuous_feed: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentType {
    pub content_type: String,
    pub min_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopiesCapability {
    pub default: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOption {
    #[serde(rename = "type")]
    pub color_type: String,
    pub default: bool,
}

/// Pagination block shared by list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrintersPage {
    pub printers: Vec<Printer>,
    pub page: PageInfo,
    #[serde(rename = "_links")]
    pub links: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct PrinterQuery {
    /// Free-text search on printer names.
    pub query: Option<String>,
    /// Zero-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PrintixClient {
    pub async fn get_printers(&self, options: &PrinterQuery) -> ClientResult<PrintersPage> {
        let tenant = self.require_tenant("getting printers")?;
        let request = ApiRequest::get(format!("/cloudprint/tenants/{}/printers", tenant))
            .query_opt("query", options.query.as_deref().filter(|q| !q.is_empty()))
            .query_opt("page", options.page.filter(|p| *p > 0))
            .query_opt("pageSize", options.page_size.filter(|s| *s > 0));
        self.call("get printers", request).await
    }

    /// Walk every page of results for `query`.
    pub async fn get_all_printers(&self, query: Option<&str>) -> ClientResult<Vec<Printer>> {
        let mut printers = Vec::new();
        let mut page = 0u32;

        loop {
            let options = PrinterQuery {
                query: query.map(str::to_string),
                page: Some(page),
                page_size: Some(ALL_PRINTERS_PAGE_SIZE),
            };
            let result = self
                .get_printers(&options)
                .await
                .map_err(|e| e.in_stage(format!("getting printers page {}", page)))?;

            let empty = result.printers.is_empty();
            printers.extend(result.printers);

            if empty || i64::from(page) >= result.page.total_pages - 1 {
                break;
            }
            page += 1;
        }

        Ok(printers)
    }

    pub async fn get_printer(&self, printer_id: &str) -> ClientResult<Printer> {
        let tenant = self.require_tenant("getting printer")?;
        let request = ApiRequest::get(format!(
            "/cloudprint/tenants/{}/printers/{}",
            tenant, printer_id
        ));
        self.call("get printer", request).await
    }

    /// Search by name and return the first exact match.
    pub async fn find_printer_by_name(&self, name: &str) -> ClientResult<Printer> {
        self.get_all_printers(Some(name))
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ClientError::PrinterNotFound {
                name: name.to_string(),
            })
    }
}
