//! Group management and membership.

use crate::client::{ApiRequest, NoContent, PrintixClient};
use crate::error::ClientResult;
use crate::printers::PageInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupsPage {
    pub groups: Vec<Group>,
    pub page: PageInfo,
}

#[derive(Deserialize)]
struct SingleGroup {
    group: Group,
}

impl PrintixClient {
    fn groups_endpoint(&self, operation: &'static str) -> ClientResult<String> {
        let tenant = self.require_tenant(operation)?;
        Ok(format!("/cloudprint/tenants/{}/groups", tenant))
    }

    pub async fn get_groups(&self, options: &GroupQuery) -> ClientResult<GroupsPage> {
        let endpoint = self.groups_endpoint("getting groups")?;
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let request = ApiRequest::get(endpoint)
            .query_opt("name", non_empty(&options.name))
            .query_opt("userId", non_empty(&options.user_id))
            .query_opt("page", options.page.filter(|p| *p > 0))
            .query_opt("pageSize", options.page_size.filter(|s| *s > 0));
        self.call("get groups", request).await
    }

    pub async fn get_group(&self, group_id: &str) -> ClientResult<Group> {
        let endpoint = self.groups_endpoint("getting group")?;
        let single: SingleGroup = self
            .call("get group", ApiRequest::get(format!("{}/{}", endpoint, group_id)))
            .await?;
        Ok(single.group)
    }

    pub async fn create_group(&self, group: &Group) -> ClientResult<Group> {
        let endpoint = self.groups_endpoint("creating group")?;
        let single: SingleGroup = self
            .call("create group", ApiRequest::post(endpoint).json(group)?)
            .await?;
        Ok(single.group)
    }

    pub async fn update_group(&self, group_id: &str, group: &Group) -> ClientResult<Group> {
        let endpoint = self.groups_endpoint("updating group")?;
        let request = ApiRequest::put(format!("{}/{}", endpoint, group_id)).json(group)?;
        let single: SingleGroup = self.call("update group", request).await?;
        Ok(single.group)
    }

    pub async fn delete_group(&self, group_id: &str) -> ClientResult<()> {
        let endpoint = self.groups_endpoint("deleting group")?;
        let _: NoContent = self
            .call(
                "delete group",
                ApiRequest::delete(format!("{}/{}", endpoint, group_id)),
            )
            .await?;
        Ok(())
    }

    pub async fn add_group_member(&self, group_id: &str, user_id: &str) -> ClientResult<()> {
        let endpoint = self.groups_endpoint("adding group member")?;
        let request = ApiRequest::put(format!("{}/{}/members/{}", endpoint, group_id, user_id));
        let _: NoContent = self.call("add group member", request).await?;
        Ok(())
    }

    pub async fn remove_group_member(&self, group_id: &str, user_id: &str) -> ClientResult<()> {
        let endpoint = self.groups_endpoint("removing group member")?;
        let request =
            ApiRequest::delete(format!("{}/{}/members/{}", endpoint, group_id, user_id));
        let _: NoContent = self.call("remove group member", request).await?;
        Ok(())
    }
}
