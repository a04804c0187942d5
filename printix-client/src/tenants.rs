//! Tenant discovery.

use crate::client::{ApiRequest, PrintixClient};
use crate::error::ClientResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "_links")]
    pub links: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TenantsPage {
    pub tenants: Vec<Tenant>,
    #[serde(rename = "_links")]
    pub links: serde_json::Value,
}

impl PrintixClient {
    /// Tenants reachable with the current credentials. Not tenant-scoped.
    pub async fn get_tenants(&self) -> ClientResult<TenantsPage> {
        self.call("get tenants", ApiRequest::get("/cloudprint")).await
    }
}
