//! Reading request-body schemas out of a remote OpenAPI document.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::constants::RequestMethod;

/// Last segment of a `$ref` such as `#/components/schemas/BookCreate`.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Download an OpenAPI document; `None` when the service is unreachable.
pub async fn fetch_openapi_json(client: &ApiClient, url: &str) -> Option<Value> {
    client.get_data(url, None, &[]).await
}

/// Request-body schemas of `method` on `path`. `None` when the document has no
/// `paths` or no `components`; an empty list when the operation takes no body.
pub fn body_schema(doc: &Value, path: &str, method: RequestMethod) -> Option<Vec<Value>> {
    let paths = doc.get("paths")?;
    let mut names = Vec::new();
    let mut inline = Vec::new();
    let content = paths
        .get(path)
        .and_then(|p| p.get(method.openapi_key()))
        .and_then(|op| op.get("requestBody"))
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object);
    for media in content.into_iter().flat_map(|c| c.values()) {
        match media.get("schema") {
            Some(Value::String(r)) => names.push(ref_name(r).to_string()),
            Some(schema @ Value::Object(obj)) => {
                if let Some(r) = obj.get("$ref").and_then(Value::as_str) {
                    names.push(ref_name(r).to_string());
                } else if obj.contains_key("properties") {
                    inline.push(schema.clone());
                }
            }
            _ => {}
        }
    }
    let mut schemas = if names.is_empty() { Vec::new() } else { extract_schemas(doc, &names)? };
    schemas.extend(inline);
    Some(schemas)
}

/// Look up named component schemas, skipping unknown names. `None` without `components`.
pub fn extract_schemas(doc: &Value, names: &[String]) -> Option<Vec<Value>> {
    let components = doc.get("components")?;
    let Some(schemas) = components.get("schemas") else { return Some(Vec::new()) };
    Some(names.iter().filter_map(|n| schemas.get(n).cloned()).collect())
}

/// Component schema by name.
pub fn component<'a>(name: &str, doc: &'a Value) -> Option<&'a Value> {
    doc.get("components")?.get("schemas")?.get(name)
}

/// `enum` values of a component schema, rendered as strings.
pub fn component_choices(name: &str, doc: &Value) -> Option<Vec<String>> {
    enum_values(component(name, doc)?)
}

pub(crate) fn enum_values(schema: &Value) -> Option<Vec<String>> {
    let values = schema.get("enum")?.as_array()?;
    let choices: Vec<String> = values
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .collect();
    (!choices.is_empty()).then_some(choices)
}

/// OpenAPI documents keyed by URL, expiring after a TTL. Views of the same service share
/// one cache so the document is fetched once per TTL. Failed fetches are not cached.
#[derive(Clone)]
pub struct SchemaCache {
    inner: Cache<String, Arc<Value>>,
}

impl SchemaCache {
    pub fn new(ttl: Duration) -> Self {
        Self { inner: Cache::builder().max_capacity(64).time_to_live(ttl).build() }
    }

    pub async fn get_or_fetch(&self, client: &ApiClient, url: &str) -> Option<Arc<Value>> {
        if let Some(doc) = self.inner.get(url).await {
            return Some(doc);
        }
        let doc = Arc::new(fetch_openapi_json(client, url).await?);
        debug!(event = "openapi_cached", %url);
        self.inner.insert(url.to_string(), Arc::clone(&doc)).await;
        Some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "openapi": "3.0.3",
            "paths": {
                "/book/": {"post": {"requestBody": {"content": {"application/json": {
                    "schema": {"$ref": "#/components/schemas/BookCreate"}
                }}}}},
                "/book/{book_id}/": {"delete": {"responses": {}}},
                "/tag/": {"post": {"requestBody": {"content": {"application/json": {
                    "schema": {"type": "object", "properties": {"label": {"type": "string"}}}
                }}}}}
            },
            "components": {"schemas": {
                "BookCreate": {"type": "object", "properties": {"title": {"type": "string"}}},
                "Genre": {"type": "string", "enum": ["fiction", "poetry"]}
            }}
        })
    }

    #[test]
    fn body_schema_resolves_component_reference() {
        let schemas = body_schema(&doc(), "/book/", RequestMethod::Post).unwrap();
        assert_eq!(schemas.len(), 1);
        assert!(schemas[0]["properties"]["title"].is_object());
    }

    #[test]
    fn body_schema_keeps_inline_objects() {
        let schemas = body_schema(&doc(), "/tag/", RequestMethod::Post).unwrap();
        assert_eq!(schemas[0]["properties"]["label"]["type"], "string");
    }

    #[test]
    fn body_schema_is_empty_without_request_body() {
        assert!(body_schema(&doc(), "/book/{book_id}/", RequestMethod::Delete).unwrap().is_empty());
        assert!(body_schema(&doc(), "/missing/", RequestMethod::Post).unwrap().is_empty());
        assert!(body_schema(&json!({"info": {}}), "/book/", RequestMethod::Post).is_none());
    }

    #[test]
    fn extract_schemas_skips_unknown_names() {
        let found = extract_schemas(&doc(), &["BookCreate".into(), "Nope".into()]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(extract_schemas(&json!({}), &["BookCreate".into()]).is_none());
    }

    #[test]
    fn component_choices_reads_enum() {
        assert_eq!(component_choices("Genre", &doc()), Some(vec!["fiction".to_string(), "poetry".to_string()]));
        assert_eq!(component_choices("BookCreate", &doc()), None);
        assert_eq!(ref_name("#/components/schemas/Genre"), "Genre");
    }
}
