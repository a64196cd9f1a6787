use crate::models::{AccountInfo, Category, Project};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:8000".to_string();

        // Deployments have shipped `window.ENV.API_URL` and `window.ENV.api_url`;
        // accept both casings.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    // 1) Preferred: API_URL
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    // 2) Fallback: api_url
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub account: AccountInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SignupResponse {
    pub token: String,
    pub account: AccountInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CategoryNameRequest {
    pub name: String,
}

/// Body for `PUT /sources/projects/{id}/category`.
///
/// `category_id` must serialize as an explicit `null` to move a project to
/// "uncategorized", so no `skip_serializing_if` here.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UpdateProjectCategoryRequest {
    pub category_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ClaimProjectsRequest {
    pub project_ids: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let res = self.send(method, path, body).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// For endpoints whose success response is 2xx with an empty body.
    async fn request_empty(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<()> {
        let _ = self.send(method, path, body).await?;
        Ok(())
    }

    // ---- auth ----

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.request(
            reqwest::Method::POST,
            "/auth/login",
            Some(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub async fn signup(&self, email: &str, password: &str) -> ApiResult<SignupResponse> {
        self.request(
            reqwest::Method::POST,
            "/auth/register",
            Some(&SignupRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    // ---- categories ----

    pub async fn get_categories(&self) -> ApiResult<Vec<Category>> {
        let data: serde_json::Value = self
            .request(reqwest::Method::GET, "/categories/", None::<&()>)
            .await?;
        Ok(Self::parse_category_list_response(data))
    }

    pub async fn create_category(&self, name: &str) -> ApiResult<Category> {
        self.request(
            reqwest::Method::POST,
            "/categories/",
            Some(&CategoryNameRequest {
                name: name.to_string(),
            }),
        )
        .await
    }

    pub async fn update_category(&self, category_id: &str, name: &str) -> ApiResult<Category> {
        self.request(
            reqwest::Method::PUT,
            &format!("/categories/{category_id}"),
            Some(&CategoryNameRequest {
                name: name.to_string(),
            }),
        )
        .await
    }

    pub async fn delete_category(&self, category_id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/categories/{category_id}"),
            None::<&()>,
        )
        .await
    }

    // ---- projects ----

    /// `category_id = None` lists all projects. The query parameter is always
    /// present (empty means "all"), matching the backend contract.
    pub async fn get_projects(&self, category_id: Option<&str>) -> ApiResult<Vec<Project>> {
        let q = urlencoding::encode(category_id.unwrap_or_default()).into_owned();
        let data: serde_json::Value = self
            .request(
                reqwest::Method::GET,
                &format!("/sources/projects/?category_id={q}"),
                None::<&()>,
            )
            .await?;
        Ok(Self::parse_project_list_response(data))
    }

    pub async fn update_project_category(
        &self,
        project_id: &str,
        category_id: Option<String>,
    ) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::PUT,
            &format!("/sources/projects/{project_id}/category"),
            Some(&UpdateProjectCategoryRequest { category_id }),
        )
        .await
    }

    pub async fn delete_project(&self, project_id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/sources/projects/{project_id}"),
            None::<&()>,
        )
        .await
    }

    /// Transfer ownership of guest-created projects to the current account.
    pub async fn claim_projects(&self, project_ids: Vec<String>) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::POST,
            "/sources/projects/claim",
            Some(&ClaimProjectsRequest { project_ids }),
        )
        .await
    }

    // ---- response parsing ----

    // The backend has been observed returning both a bare array and an object
    // wrapping the array; accept both and skip malformed records.

    pub(crate) fn parse_category_list_response(data: serde_json::Value) -> Vec<Category> {
        let list = data
            .as_array()
            .cloned()
            .or_else(|| {
                data.get("categories")
                    .and_then(|v| v.as_array())
                    .cloned()
            })
            .unwrap_or_default();

        let mut out: Vec<Category> = Vec::with_capacity(list.len());
        for item in list {
            if let Ok(c) = serde_json::from_value::<Category>(item) {
                if !c.id.trim().is_empty() && !c.name.trim().is_empty() {
                    out.push(c);
                }
            }
        }

        out
    }

    pub(crate) fn parse_project_list_response(data: serde_json::Value) -> Vec<Project> {
        let list = data
            .as_array()
            .cloned()
            .or_else(|| data.get("projects").and_then(|v| v.as_array()).cloned())
            .unwrap_or_default();

        let mut out: Vec<Project> = Vec::with_capacity(list.len());
        for item in list {
            if let Ok(p) = serde_json::from_value::<Project>(item) {
                if !p.id.trim().is_empty() {
                    out.push(p);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:8000".to_string());
        assert_eq!(client.base_url, "http://localhost:8000");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_api_client_set_token() {
        let mut client = ApiClient::new("http://localhost:8000".to_string());
        client.set_token("test-token".to_string());
        assert_eq!(client.token, Some("test-token".to_string()));
    }

    #[test]
    fn test_api_client_is_authenticated() {
        let mut client = ApiClient::new("http://localhost:8000".to_string());
        assert!(!client.is_authenticated());
        client.set_token("t".to_string());
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_move_body_serializes_explicit_null() {
        let req = UpdateProjectCategoryRequest { category_id: None };
        let v = serde_json::to_value(req).expect("should serialize");
        // Moving to "uncategorized" must send `null`, not omit the field.
        assert!(v.get("category_id").is_some());
        assert!(v["category_id"].is_null());
    }

    #[test]
    fn test_move_body_serializes_category_id() {
        let req = UpdateProjectCategoryRequest {
            category_id: Some("cat-1".to_string()),
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["category_id"], "cat-1");
    }

    #[test]
    fn test_claim_request_serialization() {
        let req = ClaimProjectsRequest {
            project_ids: vec!["g1".to_string(), "g2".to_string()],
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["project_ids"], serde_json::json!(["g1", "g2"]));
    }

    #[test]
    fn test_parse_category_list_bare_array() {
        let data = serde_json::json!([
            {"id": "c1", "name": "Work", "created_at": "2024-01-01T00:00:00Z"},
            {"id": "c2", "name": "School"}
        ]);
        let cats = ApiClient::parse_category_list_response(data);
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "Work");
        assert_eq!(cats[1].created_at, "");
    }

    #[test]
    fn test_parse_category_list_wrapped_and_malformed() {
        let data = serde_json::json!({
            "categories": [
                {"id": "c1", "name": "Work"},
                {"id": "", "name": "nameless id"},
                {"name": "missing id"},
                42
            ]
        });
        let cats = ApiClient::parse_category_list_response(data);
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].id, "c1");
    }

    #[test]
    fn test_parse_project_list_skips_malformed() {
        let data = serde_json::json!([
            {
                "id": "p1",
                "title": "Rust book",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "category_id": "c1",
                "source_count": 3
            },
            {"title": "no id"},
            {"id": "", "title": "empty id", "created_at": "", "updated_at": ""}
        ]);
        let projects = ApiClient::parse_project_list_response(data);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].category_id.as_deref(), Some("c1"));
        assert_eq!(projects[0].source_count, 3);
    }

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "account": {"id": 1, "email": "u@example.com"}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        // account is opaque; just ensure it's an object
        assert!(parsed.account.extra.is_object());
    }
}
