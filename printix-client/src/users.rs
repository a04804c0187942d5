//! Tenant user management.

use crate::client::{ApiRequest, NoContent, PrintixClient};
use crate::error::ClientResult;
use crate::printers::PageInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set for guest users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// e.g. `GUEST_USER`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub active: Option<bool>,
    pub group_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub page: PageInfo,
}

#[derive(Deserialize)]
struct SingleUser {
    user: User,
}

impl PrintixClient {
    fn users_endpoint(&self, operation: &'static str) -> ClientResult<String> {
        let tenant = self.require_tenant(operation)?;
        Ok(format!("/cloudprint/tenants/{}/users", tenant))
    }

    pub async fn get_users(&self, options: &UserQuery) -> ClientResult<UsersPage> {
        let endpoint = self.users_endpoint("getting users")?;
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let request = ApiRequest::get(endpoint)
            .query_opt("email", non_empty(&options.email))
            .query_opt("userName", non_empty(&options.user_name))
            .query_opt("active", options.active)
            .query_opt("groupId", non_empty(&options.group_id))
            .query_opt("page", options.page.filter(|p| *p > 0))
            .query_opt("pageSize", options.page_size.filter(|s| *s > 0));
        self.call("get users", request).await
    }

    pub async fn get_user(&self, user_id: &str) -> ClientResult<User> {
        let endpoint = self.users_endpoint("getting user")?;
        let single: SingleUser = self
            .call("get user", ApiRequest::get(format!("{}/{}", endpoint, user_id)))
            .await?;
        Ok(single.user)
    }

    pub async fn create_user(&self, user: &User) -> ClientResult<User> {
        let endpoint = self.users_endpoint("creating user")?;
        let single: SingleUser = self
            .call("create user", ApiRequest::post(endpoint).json(user)?)
            .await?;
        Ok(single.user)
    }

    pub async fn update_user(&self, user_id: &str, user: &User) -> ClientResult<User> {
        let endpoint = self.users_endpoint("updating user")?;
        let request = ApiRequest::put(format!("{}/{}", endpoint, user_id)).json(user)?;
        let single: SingleUser = self.call("update user", request).await?;
        Ok(single.user)
    }

    pub async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        let endpoint = self.users_endpoint("deleting user")?;
        let _: NoContent = self
            .call(
                "delete user",
                ApiRequest::delete(format!("{}/{}", endpoint, user_id)),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_serializes_without_empty_fields() {
        let user = User {
            email: "guest@example.com".to_string(),
            full_name: Some("Guest User".to_string()),
            role: Some("GUEST_USER".to_string()),
            active: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "email": "guest@example.com",
                "fullName": "Guest User",
                "role": "GUEST_USER",
                "active": true
            })
        );
    }
}
