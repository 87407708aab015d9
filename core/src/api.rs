//! Typed operations, one per API endpoint.
//!
//! Every method resolves its path template, then hands off to
//! [`NeonClient::execute`]. Path parameters are percent-encoded and must be
//! non-empty; an empty identifier fails with [`Error::EmptyParameter`]
//! before anything is sent.

use std::borrow::Cow;

use urlencoding::encode;
use uuid::Uuid;

use crate::client::{NeonClient, NO_PAYLOAD};
use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::types::*;

fn query_string(params: &[(&str, Option<String>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{k}={}", encode(v))))
        .collect();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

impl NeonClient {
    // -----------------------------------------------------------------------
    // Users and API keys
    // -----------------------------------------------------------------------

    pub fn get_current_user_info(&self) -> Result<CurrentUserInfoResponse> {
        self.execute(HttpMethod::Get, "/users/me", NO_PAYLOAD)
    }

    pub fn list_api_keys(&self) -> Result<Vec<ApiKeysListResponseItem>> {
        self.execute(HttpMethod::Get, "/api_keys", NO_PAYLOAD)
    }

    pub fn create_api_key(&self, request: &ApiKeyCreateRequest) -> Result<ApiKeyCreateResponse> {
        self.execute(HttpMethod::Post, "/api_keys", Some(request))
    }

    pub fn revoke_api_key(&self, key_id: i64) -> Result<ApiKeyRevokeResponse> {
        self.execute(HttpMethod::Delete, &format!("/api_keys/{key_id}"), NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn list_projects(&self, params: &ListProjectsParams) -> Result<ProjectsResponse> {
        let query = query_string(&[
            ("cursor", params.cursor.clone()),
            ("limit", params.limit.map(|l| l.to_string())),
            ("search", params.search.clone()),
        ]);
        self.execute(HttpMethod::Get, &format!("/projects{query}"), NO_PAYLOAD)
    }

    pub fn create_project(&self, request: &ProjectCreateRequest) -> Result<CreatedProject> {
        self.execute(HttpMethod::Post, "/projects", Some(request))
    }

    pub fn get_project(&self, project_id: &str) -> Result<ProjectResponse> {
        self.execute(HttpMethod::Get, &project_path(project_id)?, NO_PAYLOAD)
    }

    pub fn update_project(&self, project_id: &str, request: &ProjectUpdateRequest) -> Result<ProjectOperations> {
        self.execute(HttpMethod::Patch, &project_path(project_id)?, Some(request))
    }

    pub fn delete_project(&self, project_id: &str) -> Result<ProjectResponse> {
        self.execute(HttpMethod::Delete, &project_path(project_id)?, NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn list_project_operations(
        &self,
        project_id: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<OperationsResponse> {
        let query = query_string(&[
            ("cursor", cursor.map(str::to_string)),
            ("limit", limit.map(|l| l.to_string())),
        ]);
        let path = format!("{}/operations{query}", project_path(project_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn get_project_operation(&self, project_id: &str, operation_id: Uuid) -> Result<OperationResponse> {
        let path = format!("{}/operations/{operation_id}", project_path(project_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Branches
    // -----------------------------------------------------------------------

    pub fn list_project_branches(&self, project_id: &str) -> Result<BranchesResponse> {
        let path = format!("{}/branches", project_path(project_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn create_project_branch(&self, project_id: &str, request: &BranchCreateRequest) -> Result<CreatedBranch> {
        let path = format!("{}/branches", project_path(project_id)?);
        self.execute(HttpMethod::Post, &path, Some(request))
    }

    pub fn get_project_branch(&self, project_id: &str, branch_id: &str) -> Result<BranchResponse> {
        self.execute(HttpMethod::Get, &branch_path(project_id, branch_id)?, NO_PAYLOAD)
    }

    pub fn update_project_branch(
        &self,
        project_id: &str,
        branch_id: &str,
        request: &BranchUpdateRequest,
    ) -> Result<BranchOperations> {
        self.execute(HttpMethod::Patch, &branch_path(project_id, branch_id)?, Some(request))
    }

    pub fn delete_project_branch(&self, project_id: &str, branch_id: &str) -> Result<BranchOperations> {
        self.execute(HttpMethod::Delete, &branch_path(project_id, branch_id)?, NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    pub fn list_project_endpoints(&self, project_id: &str) -> Result<EndpointsResponse> {
        let path = format!("{}/endpoints", project_path(project_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn create_project_endpoint(
        &self,
        project_id: &str,
        request: &EndpointCreateRequest,
    ) -> Result<EndpointOperations> {
        let path = format!("{}/endpoints", project_path(project_id)?);
        self.execute(HttpMethod::Post, &path, Some(request))
    }

    pub fn get_project_endpoint(&self, project_id: &str, endpoint_id: &str) -> Result<EndpointResponse> {
        self.execute(HttpMethod::Get, &endpoint_path(project_id, endpoint_id)?, NO_PAYLOAD)
    }

    pub fn delete_project_endpoint(&self, project_id: &str, endpoint_id: &str) -> Result<EndpointOperations> {
        self.execute(HttpMethod::Delete, &endpoint_path(project_id, endpoint_id)?, NO_PAYLOAD)
    }

    pub fn start_project_endpoint(&self, project_id: &str, endpoint_id: &str) -> Result<EndpointOperations> {
        let path = format!("{}/start", endpoint_path(project_id, endpoint_id)?);
        self.execute(HttpMethod::Post, &path, NO_PAYLOAD)
    }

    pub fn suspend_project_endpoint(&self, project_id: &str, endpoint_id: &str) -> Result<EndpointOperations> {
        let path = format!("{}/suspend", endpoint_path(project_id, endpoint_id)?);
        self.execute(HttpMethod::Post, &path, NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Databases
    // -----------------------------------------------------------------------

    pub fn list_project_branch_databases(&self, project_id: &str, branch_id: &str) -> Result<DatabasesResponse> {
        let path = format!("{}/databases", branch_path(project_id, branch_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn create_project_branch_database(
        &self,
        project_id: &str,
        branch_id: &str,
        request: &DatabaseCreateRequest,
    ) -> Result<DatabaseOperations> {
        let path = format!("{}/databases", branch_path(project_id, branch_id)?);
        self.execute(HttpMethod::Post, &path, Some(request))
    }

    pub fn get_project_branch_database(
        &self,
        project_id: &str,
        branch_id: &str,
        database_name: &str,
    ) -> Result<DatabaseResponse> {
        let path = database_path(project_id, branch_id, database_name)?;
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn delete_project_branch_database(
        &self,
        project_id: &str,
        branch_id: &str,
        database_name: &str,
    ) -> Result<DatabaseOperations> {
        let path = database_path(project_id, branch_id, database_name)?;
        self.execute(HttpMethod::Delete, &path, NO_PAYLOAD)
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    pub fn list_project_branch_roles(&self, project_id: &str, branch_id: &str) -> Result<RolesResponse> {
        let path = format!("{}/roles", branch_path(project_id, branch_id)?);
        self.execute(HttpMethod::Get, &path, NO_PAYLOAD)
    }

    pub fn create_project_branch_role(
        &self,
        project_id: &str,
        branch_id: &str,
        request: &RoleCreateRequest,
    ) -> Result<RoleOperations> {
        let path = format!("{}/roles", branch_path(project_id, branch_id)?);
        self.execute(HttpMethod::Post, &path, Some(request))
    }

    pub fn get_project_branch_role(&self, project_id: &str, branch_id: &str, role_name: &str) -> Result<RoleResponse> {
        self.execute(HttpMethod::Get, &role_path(project_id, branch_id, role_name)?, NO_PAYLOAD)
    }

    pub fn delete_project_branch_role(
        &self,
        project_id: &str,
        branch_id: &str,
        role_name: &str,
    ) -> Result<RoleOperations> {
        self.execute(HttpMethod::Delete, &role_path(project_id, branch_id, role_name)?, NO_PAYLOAD)
    }

    pub fn reset_project_branch_role_password(
        &self,
        project_id: &str,
        branch_id: &str,
        role_name: &str,
    ) -> Result<RoleOperations> {
        let path = format!("{}/reset_password", role_path(project_id, branch_id, role_name)?);
        self.execute(HttpMethod::Post, &path, NO_PAYLOAD)
    }
}

fn segment<'a>(name: &'static str, value: &'a str) -> Result<Cow<'a, str>> {
    if value.is_empty() {
        return Err(Error::EmptyParameter(name));
    }
    Ok(encode(value))
}

fn project_path(project_id: &str) -> Result<String> {
    Ok(format!("/projects/{}", segment("project_id", project_id)?))
}

fn branch_path(project_id: &str, branch_id: &str) -> Result<String> {
    Ok(format!("{}/branches/{}", project_path(project_id)?, segment("branch_id", branch_id)?))
}

fn endpoint_path(project_id: &str, endpoint_id: &str) -> Result<String> {
    Ok(format!("{}/endpoints/{}", project_path(project_id)?, segment("endpoint_id", endpoint_id)?))
}

fn database_path(project_id: &str, branch_id: &str, database_name: &str) -> Result<String> {
    Ok(format!(
        "{}/databases/{}",
        branch_path(project_id, branch_id)?,
        segment("database_name", database_name)?
    ))
}

fn role_path(project_id: &str, branch_id: &str, role_name: &str) -> Result<String> {
    Ok(format!("{}/roles/{}", branch_path(project_id, branch_id)?, segment("role_name", role_name)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_skips_unset_params() {
        assert_eq!(query_string(&[("cursor", None), ("limit", None)]), "");
        assert_eq!(
            query_string(&[("cursor", None), ("limit", Some("10".to_string()))]),
            "?limit=10"
        );
        assert_eq!(
            query_string(&[("search", Some("my app".to_string())), ("limit", Some("5".to_string()))]),
            "?search=my%20app&limit=5"
        );
    }

    #[test]
    fn path_parameters_are_percent_encoded() {
        assert_eq!(
            role_path("p-1", "br-1", "app user").unwrap(),
            "/projects/p-1/branches/br-1/roles/app%20user"
        );
        assert_eq!(database_path("p", "b", "a/b").unwrap(), "/projects/p/branches/b/databases/a%2Fb");
        assert_eq!(endpoint_path("p", "ep-1").unwrap(), "/projects/p/endpoints/ep-1");
    }

    #[test]
    fn empty_path_parameters_are_rejected() {
        assert!(matches!(project_path(""), Err(Error::EmptyParameter("project_id"))));
        assert!(matches!(branch_path("p", ""), Err(Error::EmptyParameter("branch_id"))));
        assert!(matches!(endpoint_path("", "ep-1"), Err(Error::EmptyParameter("project_id"))));
        assert!(matches!(database_path("p", "b", ""), Err(Error::EmptyParameter("database_name"))));
        assert!(matches!(role_path("p", "", "alex"), Err(Error::EmptyParameter("branch_id"))));
    }
}
