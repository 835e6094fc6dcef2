use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use crate::api_view::ApiUrls;
use crate::errors::AdminError;
use crate::site::SiteInfo;

/// Per-request data handed to a view.
#[derive(Clone, Debug)]
pub struct ViewContext {
    pub site: Arc<SiteInfo>,
    /// Request path without the query string.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Bearer token from the session cookie.
    pub token: Option<String>,
}

impl ViewContext {
    pub fn new(site: Arc<SiteInfo>, path: &str, query: Vec<(String, String)>, token: Option<String>) -> Self {
        Self { site, path: path.to_string(), query, token }
    }
}

/// A screen set registered on an [`crate::AdminSite`] under a unique identity.
///
/// `create` and `edit` receive `None` on GET and the submitted form fields on POST.
#[async_trait]
pub trait AdminView: Send + Sync {
    fn identity(&self) -> &str;

    fn name(&self) -> &str;

    fn icon(&self) -> &str { "fa" }

    /// Remote endpoints, for views that proxy a REST API.
    fn api_urls(&self) -> Option<&ApiUrls> { None }

    /// Whether requests need a session token (the login page is shown otherwise).
    fn requires_token(&self) -> bool { false }

    async fn list(&self, ctx: &ViewContext) -> Result<Response, AdminError>;

    async fn details(&self, ctx: &ViewContext, pk: &str) -> Result<Response, AdminError>;

    async fn create(&self, ctx: &ViewContext, form: Option<Vec<(String, String)>>) -> Result<Response, AdminError>;

    async fn edit(&self, ctx: &ViewContext, pk: &str, form: Option<Vec<(String, String)>>) -> Result<Response, AdminError>;

    /// Delete every pk and return the URL of the list screen.
    async fn delete(&self, ctx: &ViewContext, pks: &[String]) -> Result<String, AdminError>;
}
