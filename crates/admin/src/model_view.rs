//! Admin screens for tables owned by the running service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tracing::{error, info};

use common::metrics::FORM_VALIDATION_FAILURES_TOTAL;

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::errors::AdminError;
use crate::form::{label_for, BoundForm, FormSchema};
use crate::misc::display_value;
use crate::pagination::{ListParams, Pagination};
use crate::render::{self, DetailRow, ListScreen};
use crate::view::{AdminView, ViewContext};

/// JSON-level access to a local table.
///
/// `order_by` uses the `column` / `-column` convention of the REST services.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn list(&self, skip: u64, limit: u64, order_by: &str) -> Result<(Vec<Value>, u64), AdminError>;

    async fn get(&self, pk: &str) -> Result<Option<Value>, AdminError>;

    async fn insert(&self, data: Value) -> Result<Value, AdminError>;

    async fn update(&self, pk: &str, data: Value) -> Result<Value, AdminError>;

    /// `false` when no row had that pk.
    async fn delete(&self, pk: &str) -> Result<bool, AdminError>;
}

pub struct ModelView {
    identity: String,
    name: String,
    icon: String,
    store: Arc<dyn ModelStore>,
    form: FormSchema,
    column_list: Vec<String>,
    column_labels: HashMap<String, String>,
    column_sortable_list: Vec<String>,
    default_sort: (String, bool),
    page_size: u64,
    page_size_options: Vec<u64>,
}

impl ModelView {
    pub fn new(identity: &str, name: &str, store: Arc<dyn ModelStore>, form: FormSchema) -> Self {
        Self {
            identity: identity.to_string(),
            name: name.to_string(),
            icon: "fa".to_string(),
            store,
            form,
            column_list: vec!["id".to_string()],
            column_labels: HashMap::new(),
            column_sortable_list: Vec::new(),
            default_sort: ("id".to_string(), false),
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn column_list(mut self, columns: &[&str]) -> Self {
        self.column_list = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn column_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.column_labels = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self
    }

    pub fn column_sortable_list(mut self, columns: &[&str]) -> Self {
        self.column_sortable_list = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Sort used when the request names none; `true` means descending.
    pub fn default_sort(mut self, column: &str, descending: bool) -> Self {
        self.default_sort = (column.to_string(), descending);
        self
    }

    /// Page size when the request names none. Added to the offered sizes so it is
    /// never capped below itself.
    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        if !self.page_size_options.contains(&size) {
            self.page_size_options.push(size);
            self.page_size_options.sort_unstable();
        }
        self
    }

    pub fn page_size_options(mut self, options: &[u64]) -> Self {
        self.page_size_options = options.to_vec();
        self
    }

    /// `order_by` for the store, honouring `sortBy` only for sortable columns.
    pub fn order_by(&self, params: &ListParams) -> String {
        let (column, descending) = match &params.sort_by {
            Some(column) if self.column_sortable_list.contains(column) => (column.as_str(), params.descending),
            _ => (self.default_sort.0.as_str(), self.default_sort.1),
        };
        if descending { format!("-{column}") } else { column.to_string() }
    }

    fn effective_page_size(&self, params: &ListParams) -> u64 {
        let requested = if params.page_size == 0 { self.page_size } else { params.page_size };
        match self.page_size_options.iter().max() {
            Some(max) => requested.min(*max),
            None => requested,
        }
    }

    fn form_response(&self, ctx: &ViewContext, status: StatusCode, action: &str, form: &BoundForm, error: Option<&str>) -> Response {
        render::html(status, render::form_page(&ctx.site, &self.name, action, Some(form), error))
    }

    async fn get_or_404(&self, pk: &str) -> Result<Value, AdminError> {
        self.store
            .get(pk)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("{} with id={pk} not found", self.name)))
    }
}

fn object_pk(obj: &Value) -> Option<String> {
    obj.get("id").map(display_value).filter(|pk| !pk.is_empty())
}

#[async_trait]
impl AdminView for ModelView {
    fn identity(&self) -> &str { &self.identity }

    fn name(&self) -> &str { &self.name }

    fn icon(&self) -> &str { &self.icon }

    async fn list(&self, ctx: &ViewContext) -> Result<Response, AdminError> {
        let params = ListParams::from_query(&ctx.query)?;
        let page_size = self.effective_page_size(&params);
        let (rows, count) = self.store.list(params.skip(page_size)?, page_size, &self.order_by(&params)).await?;
        let mut pagination = Pagination::new(Some(rows), params.page, page_size, count);
        pagination.add_pagination_urls(&ctx.path, &ctx.query);
        let labels: HashMap<String, String> = self
            .column_list
            .iter()
            .map(|c| (c.clone(), self.column_labels.get(c).cloned().unwrap_or_else(|| label_for(c))))
            .collect();
        let screen = ListScreen {
            site: &ctx.site,
            identity: &self.identity,
            name: &self.name,
            columns: &self.column_list,
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
        let obj = self.get_or_404(pk).await?;
        let rows: Vec<DetailRow> = obj
            .as_object()
            .into_iter()
            .flatten()
            .map(|(key, value)| DetailRow {
                label: self.column_labels.get(key).cloned().unwrap_or_else(|| label_for(key)),
                value: display_value(value),
                link: None,
            })
            .collect();
        Ok(render::html(StatusCode::OK, render::details_page(&ctx.site, &self.identity, &self.name, pk, Some(rows.as_slice()))))
    }

    async fn create(&self, ctx: &ViewContext, submitted: Option<Vec<(String, String)>>) -> Result<Response, AdminError> {
        let action = ctx.site.create_url(&self.identity);
        let Some(fields) = submitted else {
            return Ok(self.form_response(ctx, StatusCode::OK, &action, &self.form.blank(), None));
        };
        let mut form = self.form.bind(&fields);
        if !form.validate() {
            FORM_VALIDATION_FAILURES_TOTAL.inc();
            return Ok(self.form_response(ctx, StatusCode::BAD_REQUEST, &action, &form, None));
        }
        match self.store.insert(form.data()).await {
            Ok(obj) => {
                info!(event = "admin_object_saved", identity = %self.identity, op = "create");
                let location = match object_pk(&obj) {
                    Some(pk) => ctx.site.details_url(&self.identity, &pk),
                    None => ctx.site.list_url(&self.identity),
                };
                Ok(render::redirect_found(&location))
            }
            Err(e) => {
                error!(event = "admin_save_failed", identity = %self.identity, error = %e);
                Ok(self.form_response(ctx, StatusCode::BAD_REQUEST, &action, &form, Some(&e.to_string())))
            }
        }
    }

    async fn edit(&self, ctx: &ViewContext, pk: &str, submitted: Option<Vec<(String, String)>>) -> Result<Response, AdminError> {
        let action = ctx.site.edit_url(&self.identity, pk);
        let current = self.get_or_404(pk).await?;
        let Some(fields) = submitted else {
            return Ok(self.form_response(ctx, StatusCode::OK, &action, &self.form.prefill(&current), None));
        };
        let mut form = self.form.bind(&fields);
        if !form.validate() {
            FORM_VALIDATION_FAILURES_TOTAL.inc();
            return Ok(self.form_response(ctx, StatusCode::BAD_REQUEST, &action, &form, None));
        }
        match self.store.update(pk, form.data()).await {
            Ok(_) => {
                info!(event = "admin_object_saved", identity = %self.identity, op = "update", %pk);
                Ok(render::redirect_found(&ctx.site.details_url(&self.identity, pk)))
            }
            Err(e) => {
                error!(event = "admin_save_failed", identity = %self.identity, %pk, error = %e);
                Ok(self.form_response(ctx, StatusCode::BAD_REQUEST, &action, &form, Some(&e.to_string())))
            }
        }
    }

    async fn delete(&self, ctx: &ViewContext, pks: &[String]) -> Result<String, AdminError> {
        for pk in pks {
            if !self.store.delete(pk).await? {
                return Err(AdminError::NotFound(format!("{} with id={pk} not found", self.name)));
            }
            info!(event = "admin_object_deleted", identity = %self.identity, %pk);
        }
        Ok(ctx.site.list_url(&self.identity))
    }
}
