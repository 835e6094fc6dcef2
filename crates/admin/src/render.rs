//! Server-side HTML of the admin screens.

use std::collections::HashMap;
use std::fmt::Write;

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde_json::Value;

use crate::form::{BoundForm, FieldKind, FormField};
use crate::misc::display_value;
use crate::pagination::{replace_query_param, replace_query_params, Pagination};
use crate::site::SiteInfo;

/// CSS class of the banner shown when a remote service could not be reached.
pub const SERVICE_UNAVAILABLE_CLASS: &str = "service-unavailable";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

/// `302 Found` to `location`.
pub fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn unavailable_banner() -> String {
    format!(r#"<div class="alert {SERVICE_UNAVAILABLE_CLASS}">Service unavailable. Try again later.</div>"#)
}

pub fn layout(site: &SiteInfo, title: &str, content: &str) -> String {
    let mut menu = String::new();
    for item in &site.menu {
        let _ = write!(
            menu,
            r#"<li><a href="{}"><i class="{}"></i> {}</a></li>"#,
            escape(&site.list_url(&item.identity)),
            escape(&item.icon),
            escape(&item.name)
        );
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} - {site_title}</title></head>
<body>
<nav><a href="{index}">{site_title}</a><ul class="menu">{menu}</ul><a href="{logout}">Logout</a></nav>
<main>
<h1>{title}</h1>
{content}
</main>
</body>
</html>"#,
        title = escape(title),
        site_title = escape(&site.title),
        index = escape(&site.index_url()),
        logout = escape(&site.logout_url()),
    )
}

pub fn index_page(site: &SiteInfo) -> String {
    let mut content = String::from("<ul class=\"views\">");
    for item in &site.menu {
        let _ = write!(content, r#"<li><a href="{}">{}</a></li>"#, escape(&site.list_url(&item.identity)), escape(&item.name));
    }
    content.push_str("</ul>");
    layout(site, &site.title, &content)
}

/// Everything the list screen shows.
pub struct ListScreen<'a> {
    pub site: &'a SiteInfo,
    pub identity: &'a str,
    pub name: &'a str,
    pub columns: &'a [String],
    pub labels: &'a HashMap<String, String>,
    pub sortable: &'a [String],
    pub pagination: &'a Pagination,
    pub page_size_options: &'a [u64],
    pub path: &'a str,
    pub query: &'a [(String, String)],
}

fn label<'a>(labels: &'a HashMap<String, String>, column: &'a str) -> &'a str {
    labels.get(column).map(String::as_str).unwrap_or(column)
}

pub fn list_page(screen: &ListScreen<'_>) -> String {
    let site = screen.site;
    let mut content = format!(
        r#"<a class="btn" href="{}">New {}</a>"#,
        escape(&site.create_url(screen.identity)),
        escape(screen.name)
    );
    let Some(rows) = &screen.pagination.rows else {
        content.push_str(&unavailable_banner());
        return layout(site, screen.name, &content);
    };

    content.push_str("<table><thead><tr>");
    for column in screen.columns {
        let text = escape(label(screen.labels, column));
        if screen.sortable.contains(column) {
            let asc = replace_query_params(screen.path, screen.query, &[("sortBy", column.as_str()), ("sort", "asc")]);
            let desc = replace_query_params(screen.path, screen.query, &[("sortBy", column.as_str()), ("sort", "desc")]);
            let _ = write!(
                content,
                r#"<th><a href="{}">{text}</a> <a href="{}">&#9660;</a></th>"#,
                escape(&asc),
                escape(&desc)
            );
        } else {
            let _ = write!(content, "<th>{text}</th>");
        }
    }
    content.push_str("<th></th></tr></thead><tbody>");
    for row in rows {
        let pk = row.get("id").map(display_value).unwrap_or_default();
        content.push_str("<tr>");
        for column in screen.columns {
            let _ = write!(content, "<td>{}</td>", escape(&row.get(column).map(display_value).unwrap_or_default()));
        }
        let _ = write!(
            content,
            r#"<td><a href="{}">View</a> <a href="{}">Edit</a> <a class="delete" data-url="{}">Delete</a></td></tr>"#,
            escape(&site.details_url(screen.identity, &pk)),
            escape(&site.edit_url(screen.identity, &pk)),
            escape(&site.delete_url(screen.identity, &[pk.as_str()]))
        );
    }
    content.push_str("</tbody></table>");

    let p = screen.pagination;
    let _ = write!(content, r#"<div class="pagination"><span>Showing page {} of {} ({} items)</span>"#, p.page, p.page_count(), p.count);
    if let Some(url) = &p.previous_url {
        let _ = write!(content, r#"<a href="{}">Previous</a>"#, escape(url));
    }
    for control in &p.page_controls {
        let class = if control.number == p.page { "page active" } else { "page" };
        let _ = write!(content, r#"<a class="{class}" href="{}">{}</a>"#, escape(&control.url), control.number);
    }
    if let Some(url) = &p.next_url {
        let _ = write!(content, r#"<a href="{}">Next</a>"#, escape(url));
    }
    content.push_str(r#"<span class="page-size">Show"#);
    for size in screen.page_size_options {
        let url = replace_query_param(screen.path, screen.query, "pageSize", &size.to_string());
        let _ = write!(content, r#" <a href="{}">{size}</a>"#, escape(&url));
    }
    content.push_str("</span></div>");
    layout(site, screen.name, &content)
}

/// One line of the details table.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
    pub link: Option<String>,
}

pub fn details_page(site: &SiteInfo, identity: &str, name: &str, pk: &str, rows: Option<&[DetailRow]>) -> String {
    let mut content = String::new();
    match rows {
        None => content.push_str(&unavailable_banner()),
        Some(rows) => {
            content.push_str("<table class=\"details\"><tbody>");
            for row in rows {
                let value = match &row.link {
                    Some(href) => format!(r#"<a href="{}">{}</a>"#, escape(href), escape(&row.value)),
                    None => escape(&row.value),
                };
                let _ = write!(content, "<tr><th>{}</th><td>{value}</td></tr>", escape(&row.label));
            }
            content.push_str("</tbody></table>");
            let _ = write!(
                content,
                r#"<a class="btn" href="{}">Edit</a> <a class="btn delete" data-url="{}">Delete</a>"#,
                escape(&site.edit_url(identity, pk)),
                escape(&site.delete_url(identity, &[pk]))
            );
        }
    }
    let _ = write!(content, r#" <a href="{}">Back to list</a>"#, escape(&site.list_url(identity)));
    layout(site, name, &content)
}

fn render_field(out: &mut String, field: &FormField, form: &BoundForm) {
    let name = escape(&field.name);
    let value = form.value(&field.name);
    let required = if field.is_required() { " required" } else { "" };
    let _ = write!(out, r#"<div class="field"><label for="{name}">{}</label>"#, escape(&field.label));
    match (&field.kind, &field.choices) {
        (FieldKind::Boolean, _) => {
            let checked = if matches!(value, "y" | "on" | "true" | "1") { " checked" } else { "" };
            let _ = write!(out, r#"<input type="checkbox" id="{name}" name="{name}" value="y"{checked}>"#);
        }
        (_, Some(choices)) => {
            let _ = write!(out, r#"<select id="{name}" name="{name}"{required}>"#);
            if !field.is_required() {
                out.push_str(r#"<option value=""></option>"#);
            }
            for choice in choices {
                let selected = if choice == value { " selected" } else { "" };
                let _ = write!(out, r#"<option value="{0}"{selected}>{0}</option>"#, escape(choice));
            }
            out.push_str("</select>");
        }
        (kind, None) => {
            let step = if *kind == FieldKind::Float { r#" step="any""# } else { "" };
            let _ = write!(
                out,
                r#"<input type="{}" id="{name}" name="{name}" value="{}"{step}{required}>"#,
                kind.input_type(),
                escape(value)
            );
        }
    }
    for err in form.field_errors(&field.name) {
        let _ = write!(out, r#"<span class="error">{}</span>"#, escape(err));
    }
    out.push_str("</div>");
}

/// Create/edit form. `form` is `None` when the schema of a remote service could not
/// be fetched.
pub fn form_page(site: &SiteInfo, title: &str, action: &str, form: Option<&BoundForm>, error: Option<&str>) -> String {
    let mut content = String::new();
    let Some(form) = form else {
        content.push_str(&unavailable_banner());
        return layout(site, title, &content);
    };
    if let Some(err) = error {
        let _ = write!(content, r#"<div class="alert error">{}</div>"#, escape(err));
    }
    let _ = write!(content, r#"<form method="post" action="{}" id="{}">"#, escape(action), escape(&form.schema.name));
    for field in &form.schema.fields {
        render_field(&mut content, field, form);
    }
    content.push_str(r#"<button type="submit">Save</button></form>"#);
    layout(site, title, &content)
}

pub fn login_page(site: &SiteInfo, next: &str, error: Option<&str>) -> String {
    let mut content = String::new();
    if let Some(err) = error {
        let _ = write!(content, r#"<div class="alert error">{}</div>"#, escape(err));
    }
    let _ = write!(
        content,
        r#"<form method="post" action="{}"><input type="hidden" name="next" value="{}"><label for="token">Token</label><input type="password" id="token" name="token" required><button type="submit">Login</button></form>"#,
        escape(&site.login_path()),
        escape(next)
    );
    layout(site, "Login", &content)
}

/// Standalone error page; errors can be raised before any view is resolved.
pub fn error_page(status: u16, title: &str, detail: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{status} {title}</title></head>
<body><h1>{status} {title}</h1><p>{}</p></body>
</html>"#,
        escape(detail),
        title = escape(title),
    )
}

/// Render an upstream error body for the form banner.
pub fn upstream_error_text(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => display_value(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormSchema;
    use serde_json::json;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn redirect_is_302_with_location() {
        let res = redirect_found("/admin/book/details/1");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/admin/book/details/1");
    }

    #[test]
    fn form_renders_selects_errors_and_values() {
        let site = SiteInfo::new("Admin", "/admin");
        let schema = FormSchema::new(
            "bookCreateForm",
            vec![
                FormField::new("title", FieldKind::String, true),
                FormField::new("genre", FieldKind::Select, false).with_choices(&["fiction", "poetry"]),
            ],
        );
        let mut bound = schema.bind(&[("genre".into(), "poetry".into())]);
        bound.validate();
        let page = form_page(&site, "Book", "/admin/book/create", Some(&bound), Some("boom"));
        assert!(page.contains(r#"<option value="poetry" selected>poetry</option>"#));
        assert!(page.contains("This field is required."));
        assert!(page.contains("boom"));
        assert!(!page.contains(SERVICE_UNAVAILABLE_CLASS));

        let page = form_page(&site, "Book", "/admin/book/create", None, None);
        assert!(page.contains(SERVICE_UNAVAILABLE_CLASS));
    }

    #[test]
    fn upstream_error_prefers_detail() {
        assert_eq!(upstream_error_text(&json!({"detail": "Author with id=9 not found"})), "Author with id=9 not found");
        assert_eq!(upstream_error_text(&json!("plain")), "plain");
    }
}
