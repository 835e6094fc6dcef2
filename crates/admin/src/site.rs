//! The admin site: view registry, URL scheme and axum routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;
use url::form_urlencoded;

use crate::api_view::ApiUrls;
use crate::constants::TOKEN_COOKIE;
use crate::errors::AdminError;
use crate::render;
use crate::view::{AdminView, ViewContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub identity: String,
    pub name: String,
    pub icon: String,
}

/// Title, mount point and registered views of a site; shared by every request.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub title: String,
    pub base_path: String,
    pub menu: Vec<MenuItem>,
    /// Remote endpoints of the proxying views, used to link related objects.
    pub related: Vec<(String, ApiUrls)>,
}

impl SiteInfo {
    pub fn new(title: &str, base_path: &str) -> Self {
        Self {
            title: title.to_string(),
            base_path: base_path.trim_end_matches('/').to_string(),
            menu: Vec::new(),
            related: Vec::new(),
        }
    }

    pub fn index_url(&self) -> String { format!("{}/", self.base_path) }

    pub fn list_url(&self, identity: &str) -> String { format!("{}/{identity}/list", self.base_path) }

    pub fn details_url(&self, identity: &str, pk: &str) -> String {
        format!("{}/{identity}/details/{}", self.base_path, urlencoding::encode(pk))
    }

    pub fn create_url(&self, identity: &str) -> String { format!("{}/{identity}/create", self.base_path) }

    pub fn edit_url(&self, identity: &str, pk: &str) -> String {
        format!("{}/{identity}/edit/{}", self.base_path, urlencoding::encode(pk))
    }

    /// `.../{identity}/delete?pks=1,2`.
    pub fn delete_url(&self, identity: &str, pks: &[&str]) -> String {
        let query = form_urlencoded::Serializer::new(String::new()).append_pair("pks", &pks.join(",")).finish();
        format!("{}/{identity}/delete?{query}", self.base_path)
    }

    pub fn login_path(&self) -> String { format!("{}/login", self.base_path) }

    pub fn login_url(&self, next: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new()).append_pair("next", next).finish();
        format!("{}?{query}", self.login_path())
    }

    pub fn logout_url(&self) -> String { format!("{}/logout", self.base_path) }

    pub fn related_views(&self) -> impl Iterator<Item = (&str, &ApiUrls)> {
        self.related.iter().map(|(identity, urls)| (identity.as_str(), urls))
    }
}

/// Registry of admin views, turned into an axum router by [`AdminSite::router`].
pub struct AdminSite {
    info: SiteInfo,
    views: HashMap<String, Arc<dyn AdminView>>,
}

impl AdminSite {
    pub fn new(title: &str, base_path: &str) -> Self {
        Self { info: SiteInfo::new(title, base_path), views: HashMap::new() }
    }

    /// Add a view; identities must be unique within a site.
    pub fn register<V: AdminView + 'static>(&mut self, view: V) -> Result<&mut Self, AdminError> {
        let identity = view.identity().to_string();
        if self.views.contains_key(&identity) {
            return Err(AdminError::DuplicateView(identity));
        }
        self.info.menu.push(MenuItem { identity: identity.clone(), name: view.name().to_string(), icon: view.icon().to_string() });
        if let Some(urls) = view.api_urls() {
            self.info.related.push((identity.clone(), urls.clone()));
        }
        info!(event = "admin_view_registered", %identity);
        self.views.insert(identity, Arc::new(view));
        Ok(self)
    }

    pub fn info(&self) -> &SiteInfo { &self.info }

    pub fn router(self) -> Router {
        let base = self.info.base_path.clone();
        let state = SiteState { info: Arc::new(self.info), views: Arc::new(self.views) };
        Router::new()
            .route(&base, get(index))
            .route(&format!("{base}/"), get(index))
            .route(&format!("{base}/login"), get(login_form).post(login))
            .route(&format!("{base}/logout"), get(logout))
            .route(&format!("{base}/:identity/list"), get(list))
            .route(&format!("{base}/:identity/details/:pk"), get(details))
            .route(&format!("{base}/:identity/create"), get(create_form).post(create_submit))
            .route(&format!("{base}/:identity/edit/:pk"), get(edit_form).post(edit_submit))
            .route(&format!("{base}/:identity/delete"), delete(delete_rows).post(delete_and_redirect))
            .with_state(state)
    }
}

#[derive(Clone)]
struct SiteState {
    info: Arc<SiteInfo>,
    views: Arc<HashMap<String, Arc<dyn AdminView>>>,
}

fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty())
}

impl SiteState {
    fn view(&self, identity: &str) -> Result<Arc<dyn AdminView>, AdminError> {
        self.views.get(identity).cloned().ok_or_else(|| AdminError::UnknownView(identity.to_string()))
    }

    /// Request context for `view`, or a redirect to the login page when the view needs
    /// a token the session does not hold.
    fn context(&self, view: &dyn AdminView, uri: &Uri, jar: &CookieJar) -> Result<ViewContext, Response> {
        let token = session_token(jar);
        if view.requires_token() && token.is_none() {
            let next = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());
            return Err(render::redirect_found(&self.info.login_url(next)));
        }
        Ok(ViewContext::new(Arc::clone(&self.info), uri.path(), query_pairs(uri), token))
    }
}

macro_rules! view_context {
    ($state:expr, $view:expr, $uri:expr, $jar:expr) => {
        match $state.context(&*$view, &$uri, &$jar) {
            Ok(ctx) => ctx,
            Err(redirect) => return Ok(redirect),
        }
    };
}

async fn index(State(state): State<SiteState>) -> Response {
    render::html(StatusCode::OK, render::index_page(&state.info))
}

async fn list(State(state): State<SiteState>, Path(identity): Path<String>, jar: CookieJar, uri: Uri) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.list(&ctx).await
}

async fn details(
    State(state): State<SiteState>,
    Path((identity, pk)): Path<(String, String)>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.details(&ctx, &pk).await
}

async fn create_form(State(state): State<SiteState>, Path(identity): Path<String>, jar: CookieJar, uri: Uri) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.create(&ctx, None).await
}

async fn create_submit(
    State(state): State<SiteState>,
    Path(identity): Path<String>,
    jar: CookieJar,
    uri: Uri,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.create(&ctx, Some(fields)).await
}

async fn edit_form(
    State(state): State<SiteState>,
    Path((identity, pk)): Path<(String, String)>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.edit(&ctx, &pk, None).await
}

async fn edit_submit(
    State(state): State<SiteState>,
    Path((identity, pk)): Path<(String, String)>,
    jar: CookieJar,
    uri: Uri,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    view.edit(&ctx, &pk, Some(fields)).await
}

fn requested_pks(ctx: &ViewContext) -> Vec<String> {
    ctx.query
        .iter()
        .filter(|(k, _)| k == "pks")
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|pk| !pk.is_empty())
        .map(str::to_string)
        .collect()
}

/// `DELETE`: the body is the list URL the page navigates to afterwards.
async fn delete_rows(State(state): State<SiteState>, Path(identity): Path<String>, jar: CookieJar, uri: Uri) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    let list_url = view.delete(&ctx, &requested_pks(&ctx)).await?;
    Ok((StatusCode::OK, list_url).into_response())
}

/// `POST`: same as `DELETE` for clients without JavaScript, redirecting to the list.
async fn delete_and_redirect(
    State(state): State<SiteState>,
    Path(identity): Path<String>,
    jar: CookieJar,
    uri: Uri,
) -> Result<Response, AdminError> {
    let view = state.view(&identity)?;
    let ctx = view_context!(state, view, uri, jar);
    let list_url = view.delete(&ctx, &requested_pks(&ctx)).await?;
    Ok(render::redirect_found(&list_url))
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    token: String,
    next: Option<String>,
}

impl SiteState {
    /// Only redirect back inside the site.
    fn safe_next(&self, next: Option<&str>) -> String {
        match next {
            Some(n) if n.starts_with(&self.info.base_path) && !n.starts_with("//") => n.to_string(),
            _ => self.info.index_url(),
        }
    }
}

async fn login_form(State(state): State<SiteState>, Query(q): Query<LoginQuery>) -> Response {
    let next = state.safe_next(q.next.as_deref());
    render::html(StatusCode::OK, render::login_page(&state.info, &next, None))
}

async fn login(State(state): State<SiteState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let next = state.safe_next(form.next.as_deref());
    let token = form.token.trim();
    if token.is_empty() {
        return render::html(StatusCode::BAD_REQUEST, render::login_page(&state.info, &next, Some("Token is required.")));
    }
    let cookie = Cookie::build((TOKEN_COOKIE, token.to_string())).path("/").http_only(true).same_site(SameSite::Lax);
    info!(event = "admin_login");
    (jar.add(cookie), render::redirect_found(&next)).into_response()
}

async fn logout(State(state): State<SiteState>, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, render::redirect_found(&state.info.index_url())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_under_base_path() {
        let site = SiteInfo::new("Admin", "/service-a/admin/");
        assert_eq!(site.index_url(), "/service-a/admin/");
        assert_eq!(site.list_url("book"), "/service-a/admin/book/list");
        assert_eq!(site.details_url("book", "3"), "/service-a/admin/book/details/3");
        assert_eq!(site.edit_url("book", "3"), "/service-a/admin/book/edit/3");
        assert_eq!(site.delete_url("book", &["1", "2"]), "/service-a/admin/book/delete?pks=1%2C2");
        assert_eq!(site.details_url("book", "a/b?c"), "/service-a/admin/book/details/a%2Fb%3Fc");
        assert_eq!(site.edit_url("book", "x y"), "/service-a/admin/book/edit/x%20y");
        assert_eq!(site.login_url("/service-a/admin/q/list?page=2"), "/service-a/admin/login?next=%2Fservice-a%2Fadmin%2Fq%2Flist%3Fpage%3D2");
    }

    #[test]
    fn pks_are_split_on_commas() {
        let ctx = ViewContext::new(
            Arc::new(SiteInfo::new("Admin", "/admin")),
            "/admin/book/delete",
            vec![("pks".into(), "1, 2,,3".into())],
            None,
        );
        assert_eq!(requested_pks(&ctx), ["1", "2", "3"]);
    }
}
