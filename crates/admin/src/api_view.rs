//! Admin screens for objects owned by a remote REST service.
//!
//! The service is expected to follow the list/detail/create/update/delete layout of
//! [`ApiUrls`], return `{"objects": [...], "total_count": n}` from its list endpoint and
//! publish an OpenAPI document describing its request bodies.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tracing::{error, info, warn};

use common::metrics::FORM_VALIDATION_FAILURES_TOTAL;

use crate::client::ApiClient;
use crate::constants::{AdminFormType, RequestMethod, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::errors::AdminError;
use crate::form::{label_for, BoundForm, FormSchema};
use crate::misc::{display_value, related_object_title};
use crate::openapi::{body_schema, SchemaCache};
use crate::pagination::{ListParams, Pagination};
use crate::path::{insert_params_to_path, related_object_url};
use crate::render::{self, DetailRow, ListScreen};
use crate::view::{AdminView, ViewContext};

/// Endpoints of a remote resource. Paths are relative to `base_url`; templated
/// segments such as `{book_id}` are filled by [`insert_params_to_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrls {
    pub base_url: String,
    pub list_path: String,
    pub create_path: String,
    pub update_path: String,
    pub detail_path: String,
    pub delete_path: String,
    pub openapi_path: String,
}

impl ApiUrls {
    /// Conventional layout: `{prefix}/{entity}/list/`, `{prefix}/{entity}/` and
    /// `{prefix}/{entity}/{{entity}_id}/`.
    pub fn rest(base_url: &str, prefix: &str, entity: &str, openapi_path: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let item = format!("{prefix}/{entity}/{{{entity}_id}}/");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            list_path: format!("{prefix}/{entity}/list/"),
            create_path: format!("{prefix}/{entity}/"),
            update_path: item.clone(),
            detail_path: item.clone(),
            delete_path: item,
            openapi_path: openapi_path.to_string(),
        }
    }

    pub fn list_url(&self) -> String { format!("{}{}", self.base_url, self.list_path) }

    pub fn create_url(&self) -> String { format!("{}{}", self.base_url, self.create_path) }

    pub fn openapi_url(&self) -> String { format!("{}{}", self.base_url, self.openapi_path) }

    pub fn detail_url(&self, params: &[(&str, &str)]) -> String {
        insert_params_to_path(&format!("{}{}", self.base_url, self.detail_path), params)
    }

    pub fn update_url(&self, params: &[(&str, &str)]) -> String {
        insert_params_to_path(&format!("{}{}", self.base_url, self.update_path), params)
    }

    pub fn delete_url(&self, params: &[(&str, &str)]) -> String {
        insert_params_to_path(&format!("{}{}", self.base_url, self.delete_path), params)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> { items.iter().map(|s| s.to_string()).collect() }

fn to_map(items: &[(&str, &str)]) -> HashMap<String, String> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Keys of the first object, in document order.
fn keys_of(obj: Option<&Value>) -> Vec<String> {
    obj.and_then(Value::as_object).map(|o| o.keys().cloned().collect()).unwrap_or_default()
}

/// Admin view proxying a remote REST resource.
pub struct ApiView {
    identity: String,
    name: String,
    icon: String,
    urls: ApiUrls,
    client: ApiClient,
    schemas: SchemaCache,
    page_size: u64,
    page_size_options: Vec<u64>,
    column_list: Vec<String>,
    column_labels: HashMap<String, String>,
    column_detail_list: Vec<String>,
    column_detail_labels: HashMap<String, String>,
    column_sortable_list: Vec<String>,
    use_token: bool,
    create_form: Option<FormSchema>,
    update_form: Option<FormSchema>,
}

impl ApiView {
    pub fn new(identity: &str, name: &str, urls: ApiUrls, client: ApiClient, schemas: SchemaCache) -> Self {
        Self {
            identity: identity.to_string(),
            name: name.to_string(),
            icon: "fa".to_string(),
            urls,
            client,
            schemas,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            column_list: Vec::new(),
            column_labels: HashMap::new(),
            column_detail_list: Vec::new(),
            column_detail_labels: HashMap::new(),
            column_sortable_list: Vec::new(),
            use_token: false,
            create_form: None,
            update_form: None,
        }
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        self
    }

    pub fn page_size_options(mut self, options: &[u64]) -> Self {
        self.page_size_options = options.to_vec();
        self
    }

    /// Columns of the list screen; when empty they are taken from the first row.
    pub fn column_list(mut self, columns: &[&str]) -> Self {
        self.column_list = to_strings(columns);
        self
    }

    pub fn column_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.column_labels = to_map(labels);
        self
    }

    /// Fields of the details screen; when empty every field of the object is shown.
    pub fn column_detail_list(mut self, columns: &[&str]) -> Self {
        self.column_detail_list = to_strings(columns);
        self
    }

    pub fn column_detail_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.column_detail_labels = to_map(labels);
        self
    }

    pub fn column_sortable_list(mut self, columns: &[&str]) -> Self {
        self.column_sortable_list = to_strings(columns);
        self
    }

    /// Forward the session token as a bearer token; the site requires a login first.
    pub fn use_token(mut self, use_token: bool) -> Self {
        self.use_token = use_token;
        self
    }

    /// Use `form` instead of scaffolding the create form from OpenAPI.
    pub fn create_form(mut self, form: FormSchema) -> Self {
        self.create_form = Some(form);
        self
    }

    pub fn update_form(mut self, form: FormSchema) -> Self {
        self.update_form = Some(form);
        self
    }

    pub fn urls(&self) -> &ApiUrls { &self.urls }

    fn token<'a>(&self, ctx: &'a ViewContext) -> Option<&'a str> {
        if self.use_token { ctx.token.as_deref() } else { None }
    }

    fn pk_key(&self) -> String { format!("{}_id", self.identity) }

    /// Effective page size: the requested one (or the default) capped at the largest
    /// offered option.
    pub fn effective_page_size(&self, params: &ListParams) -> u64 {
        let requested = if params.page_size == 0 { self.page_size } else { params.page_size };
        match self.page_size_options.iter().max() {
            Some(max) => requested.min(*max),
            None => requested,
        }
    }

    /// Upstream query of a list screen: `skip`, `limit` and `order_by`, where a
    /// descending sort is written as `-column`.
    pub fn list_request(&self, params: &ListParams) -> Result<(u64, Vec<(String, String)>), AdminError> {
        let page_size = self.effective_page_size(params);
        let skip = params.skip(page_size)?;
        let order_by = match &params.sort_by {
            Some(column) if self.column_list.is_empty() || self.column_list.contains(column) => {
                if params.descending { format!("-{column}") } else { column.clone() }
            }
            Some(column) => {
                warn!(event = "admin_sort_ignored", identity = %self.identity, %column);
                "id".to_string()
            }
            None => "id".to_string(),
        };
        let query = vec![
            ("skip".to_string(), skip.to_string()),
            ("limit".to_string(), page_size.to_string()),
            ("order_by".to_string(), order_by),
        ];
        Ok((page_size, query))
    }

    /// Form of the given kind; `None` when the OpenAPI document is unavailable.
    pub async fn scaffold_form(&self, form_type: AdminFormType) -> Option<FormSchema> {
        let custom = match form_type {
            AdminFormType::Create => &self.create_form,
            AdminFormType::Update => &self.update_form,
        };
        if let Some(form) = custom {
            return Some(form.clone());
        }
        let doc = self.schemas.get_or_fetch(&self.client, &self.urls.openapi_url()).await?;
        let path = match form_type {
            AdminFormType::Create => &self.urls.create_path,
            AdminFormType::Update => &self.urls.update_path,
        };
        let name = format!("{}{}", self.identity, form_type.suffix());
        let schemas = body_schema(&doc, path, form_type.method())?;
        Some(FormSchema::from_openapi(&name, &schemas, &doc).unwrap_or_else(|| FormSchema::new(&name, Vec::new())))
    }

    async fn fetch_object(&self, ctx: &ViewContext, pk: &str) -> Option<Value> {
        let key = self.pk_key();
        let url = self.urls.detail_url(&[(key.as_str(), pk)]);
        self.client.get_data(&url, self.token(ctx), &[]).await
    }

    async fn related_link(&self, ctx: &ViewContext, key: &str, value: &Value) -> Option<(String, String)> {
        let (identity, template) = related_object_url(ctx.site.related_views(), key)?;
        let pk = display_value(value);
        if pk.is_empty() {
            return None;
        }
        let url = insert_params_to_path(&template, &[(key, pk.as_str())]);
        let title = match self.client.get_data(&url, self.token(ctx), &[]).await {
            Some(obj) => related_object_title(&obj),
            None => pk.clone(),
        };
        Some((title, ctx.site.details_url(identity, &pk)))
    }

    async fn detail_rows(&self, ctx: &ViewContext, obj: &Value) -> Vec<DetailRow> {
        let columns = if self.column_detail_list.is_empty() { keys_of(Some(obj)) } else { self.column_detail_list.clone() };
        let own_key = self.pk_key();
        let mut rows = Vec::with_capacity(columns.len());
        for column in columns {
            let value = obj.get(&column).cloned().unwrap_or(Value::Null);
            let label = self.column_detail_labels.get(&column).cloned().unwrap_or_else(|| column.clone());
            let related = if column.ends_with("_id") && column != own_key && !value.is_null() {
                self.related_link(ctx, &column, &value).await
            } else {
                None
            };
            rows.push(match related {
                Some((title, link)) => DetailRow { label, value: title, link: Some(link) },
                None => DetailRow { label, value: display_value(&value), link: None },
            });
        }
        rows
    }

    fn form_response(&self, ctx: &ViewContext, status: StatusCode, action: &str, form: Option<&BoundForm>, error: Option<&str>) -> Response {
        render::html(status, render::form_page(&ctx.site, &self.name, action, form, error))
    }

    /// Validate and forward a submitted form. Returns the page to show.
    async fn submit(
        &self,
        ctx: &ViewContext,
        mut form: BoundForm,
        action: &str,
        method: RequestMethod,
        url: &str,
        expected: StatusCode,
    ) -> Response {
        if !form.validate() {
            FORM_VALIDATION_FAILURES_TOTAL.inc();
            return self.form_response(ctx, StatusCode::BAD_REQUEST, action, Some(&form), None);
        }
        let payload = form.data();
        let Some(res) = self.client.send_request(method, url, self.token(ctx), &[], Some(&payload)).await else {
            return self.form_response(ctx, StatusCode::OK, action, None, None);
        };
        if res.status == expected {
            info!(event = "admin_object_saved", identity = %self.identity, %method, status = res.status.as_u16());
            return match res.object_id() {
                Some(id) => render::redirect_found(&ctx.site.details_url(&self.identity, &id)),
                None => render::redirect_found(&ctx.site.list_url(&self.identity)),
            };
        }
        let message = render::upstream_error_text(&res.body);
        self.form_response(ctx, StatusCode::BAD_REQUEST, action, Some(&form), Some(&message))
    }
}

#[async_trait]
impl AdminView for ApiView {
    fn identity(&self) -> &str { &self.identity }

    fn name(&self) -> &str { &self.name }

    fn icon(&self) -> &str { &self.icon }

    fn api_urls(&self) -> Option<&ApiUrls> { Some(&self.urls) }

    fn requires_token(&self) -> bool { self.use_token }

    async fn list(&self, ctx: &ViewContext) -> Result<Response, AdminError> {
        let params = ListParams::from_query(&ctx.query)?;
        let (page_size, query) = self.list_request(&params)?;
        let data = self.client.get_data(&self.urls.list_url(), self.token(ctx), &query).await;
        let mut pagination = Pagination::from_objects(data, params.page, page_size);
        pagination.add_pagination_urls(&ctx.path, &ctx.query);
        let columns = if self.column_list.is_empty() {
            keys_of(pagination.rows.as_ref().and_then(|rows| rows.first()))
        } else {
            self.column_list.clone()
        };
        let labels: HashMap<String, String> = columns
            .iter()
            .map(|c| (c.clone(), self.column_labels.get(c).cloned().unwrap_or_else(|| label_for(c))))
            .collect();
        let screen = ListScreen {
            site: &ctx.site,
            identity: &self.identity,
            name: &self.name,
            columns: &columns,
            labels: &labels,
            sortable: &self.column_sortable_list,
            pagination: &pagination,
            page_size_options: &self.page_size_options,
            path: &ctx.path,
            query: &ctx.query,
        };
        Ok(render::html(StatusCode::OK, render::list_page(&screen)))
    }

    async fn details(&self, ctx: &ViewContext, pk: &str) -> Result<Response, AdminError> {
        let rows = match self.fetch_object(ctx, pk).await {
            Some(obj) => Some(self.detail_rows(ctx, &obj).await),
            None => None,
        };
        let page = render::details_page(&ctx.site, &self.identity, &self.name, pk, rows.as_deref());
        Ok(render::html(StatusCode::OK, page))
    }

    async fn create(&self, ctx: &ViewContext, submitted: Option<Vec<(String, String)>>) -> Result<Response, AdminError> {
        let action = ctx.site.create_url(&self.identity);
        let Some(schema) = self.scaffold_form(AdminFormType::Create).await else {
            return Ok(self.form_response(ctx, StatusCode::OK, &action, None, None));
        };
        match submitted {
            None => Ok(self.form_response(ctx, StatusCode::OK, &action, Some(&schema.blank()), None)),
            Some(fields) => {
                let url = self.urls.create_url();
                Ok(self.submit(ctx, schema.bind(&fields), &action, RequestMethod::Post, &url, StatusCode::CREATED).await)
            }
        }
    }

    async fn edit(&self, ctx: &ViewContext, pk: &str, submitted: Option<Vec<(String, String)>>) -> Result<Response, AdminError> {
        let action = ctx.site.edit_url(&self.identity, pk);
        let Some(schema) = self.scaffold_form(AdminFormType::Update).await else {
            return Ok(self.form_response(ctx, StatusCode::OK, &action, None, None));
        };
        match submitted {
            None => {
                let form = self.fetch_object(ctx, pk).await.map(|obj| schema.prefill(&obj));
                Ok(self.form_response(ctx, StatusCode::OK, &action, form.as_ref(), None))
            }
            Some(fields) => {
                let key = self.pk_key();
                let url = self.urls.update_url(&[(key.as_str(), pk)]);
                Ok(self.submit(ctx, schema.bind(&fields), &action, RequestMethod::Patch, &url, StatusCode::OK).await)
            }
        }
    }

    async fn delete(&self, ctx: &ViewContext, pks: &[String]) -> Result<String, AdminError> {
        let key = self.pk_key();
        for pk in pks {
            let url = self.urls.delete_url(&[(key.as_str(), pk.as_str())]);
            match self.client.send_request(RequestMethod::Delete, &url, self.token(ctx), &[], None).await {
                Some(res) if res.status == StatusCode::NO_CONTENT => {
                    info!(event = "admin_object_deleted", identity = %self.identity, %pk);
                }
                Some(res) => {
                    error!(event = "admin_delete_failed", identity = %self.identity, %pk, status = res.status.as_u16(), body = %res.body);
                }
                None => error!(event = "admin_delete_failed", identity = %self.identity, %pk, "service unavailable"),
            }
        }
        Ok(ctx.site.list_url(&self.identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn view() -> ApiView {
        let urls = ApiUrls::rest("http://svc:8000/", "/service-b/v1", "book", "/service-b/openapi.json/");
        let client = ApiClient::new(Duration::from_secs(1)).unwrap();
        ApiView::new("book", "Book", urls, client, SchemaCache::new(Duration::from_secs(60)))
            .column_list(&["id", "title"])
            .column_sortable_list(&["id", "title"])
    }

    fn params(query: &[(&str, &str)]) -> ListParams {
        let pairs: Vec<(String, String)> = query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ListParams::from_query(&pairs).unwrap()
    }

    fn value<'a>(query: &'a [(String, String)], key: &str) -> &'a str {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap_or("")
    }

    #[test]
    fn rest_urls_follow_conventional_layout() {
        let urls = ApiUrls::rest("http://svc:8000/", "/service-b/v1/", "author", "/service-b/openapi.json/");
        assert_eq!(urls.list_url(), "http://svc:8000/service-b/v1/author/list/");
        assert_eq!(urls.create_url(), "http://svc:8000/service-b/v1/author/");
        assert_eq!(urls.detail_path, "/service-b/v1/author/{author_id}/");
        assert_eq!(urls.detail_url(&[("author_id", "4")]), "http://svc:8000/service-b/v1/author/4/");
        assert_eq!(urls.openapi_url(), "http://svc:8000/service-b/openapi.json/");
    }

    #[test]
    fn list_request_defaults_to_id_order_and_first_page() {
        let (size, q) = view().list_request(&params(&[])).unwrap();
        assert_eq!(size, 50);
        assert_eq!(value(&q, "skip"), "0");
        assert_eq!(value(&q, "limit"), "50");
        assert_eq!(value(&q, "order_by"), "id");
    }

    #[test]
    fn list_request_translates_page_and_sort() {
        let (size, q) = view().list_request(&params(&[("page", "3"), ("pageSize", "10"), ("sortBy", "title"), ("sort", "desc")])).unwrap();
        assert_eq!(size, 10);
        assert_eq!(value(&q, "skip"), "20");
        assert_eq!(value(&q, "order_by"), "-title");

        let (_, q) = view().list_request(&params(&[("sortBy", "Book.title"), ("sort", "asc")])).unwrap();
        assert_eq!(value(&q, "order_by"), "title");
    }

    #[test]
    fn list_request_rejects_out_of_range_page() {
        let res = view().list_request(&params(&[("page", "18446744073709551615")]));
        assert!(matches!(res, Err(AdminError::BadRequest(_))));
    }

    #[test]
    fn list_request_caps_page_size_and_ignores_unknown_columns() {
        let (size, q) = view().list_request(&params(&[("pageSize", "500"), ("sortBy", "genre")])).unwrap();
        assert_eq!(size, 50);
        assert_eq!(value(&q, "order_by"), "id");
    }
}
