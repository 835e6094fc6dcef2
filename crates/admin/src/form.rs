//! HTML forms scaffolded from OpenAPI JSON-schema fragments.
//!
//! A [`FormSchema`] describes the fields; binding submitted data produces a
//! [`BoundForm`] that validates the input and converts it into the JSON body sent
//! upstream.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};

use crate::openapi::{component, enum_values, ref_name};

const MAX_REF_DEPTH: usize = 8;
const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Input widget and value conversion of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    DateTime,
    Date,
    Password,
    Email,
    Integer,
    Float,
    Boolean,
    Select,
}

impl FieldKind {
    /// Map an OpenAPI `type` or `format` name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => FieldKind::String,
            "date-time" => FieldKind::DateTime,
            "date" => FieldKind::Date,
            "password" => FieldKind::Password,
            "email" => FieldKind::Email,
            "integer" | "int32" | "int64" => FieldKind::Integer,
            "number" | "float" | "double" => FieldKind::Float,
            "boolean" => FieldKind::Boolean,
            "enum" => FieldKind::Select,
            _ => return None,
        })
    }

    /// `type` attribute of the rendered `<input>`.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::DateTime => "datetime-local",
            FieldKind::Date => "date",
            FieldKind::Password => "password",
            FieldKind::Email => "email",
            FieldKind::Integer | FieldKind::Float => "number",
            FieldKind::Boolean => "checkbox",
            FieldKind::String | FieldKind::Select => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    Required,
    Optional,
    AnyOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub validators: Vec<Validator>,
    pub choices: Option<Vec<String>>,
}

impl FormField {
    pub fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        let validator = if required && kind != FieldKind::Boolean { Validator::Required } else { Validator::Optional };
        Self { name: name.to_string(), label: label_for(name), kind, validators: vec![validator], choices: None }
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
        if self.is_required() {
            self.validators.push(Validator::AnyOf(choices.clone()));
        }
        self.kind = FieldKind::Select;
        self.choices = Some(choices);
        self
    }

    pub fn is_required(&self) -> bool { self.validators.contains(&Validator::Required) }
}

/// `first_name` -> `First Name`.
pub fn label_for(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn type_names(desc: &Value) -> Vec<&str> {
    match desc.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn variants(desc: &Value) -> impl Iterator<Item = &Value> {
    ["anyOf", "oneOf", "allOf"]
        .into_iter()
        .filter_map(move |k| desc.get(k).and_then(Value::as_array))
        .flatten()
}

fn is_null_type(desc: &Value) -> bool {
    let types = type_names(desc);
    !types.is_empty() && types.iter().all(|t| *t == "null")
}

/// Whether the field accepts `null`: `nullable: true`, a `"null"` entry in a type
/// array, or a `{"type": "null"}` alternative.
pub fn is_nullable(desc: &Value) -> bool {
    desc.get("nullable").and_then(Value::as_bool).unwrap_or(false)
        || type_names(desc).contains(&"null")
        || variants(desc).any(is_null_type)
}

fn kind_at(desc: &Value, doc: &Value, depth: usize) -> FieldKind {
    if depth > MAX_REF_DEPTH {
        return FieldKind::String;
    }
    if desc.get("enum").is_some() {
        return FieldKind::Select;
    }
    if let Some(target) = desc.get("$ref").and_then(Value::as_str).and_then(|r| component(ref_name(r), doc)) {
        return kind_at(target, doc, depth + 1);
    }
    if let Some(t) = type_names(desc).into_iter().find(|t| *t != "null") {
        let by_format = desc.get("format").and_then(Value::as_str).and_then(FieldKind::from_type_name);
        return by_format.or_else(|| FieldKind::from_type_name(t)).unwrap_or(FieldKind::String);
    }
    match variants(desc).find(|v| !is_null_type(v)) {
        Some(v) => kind_at(v, doc, depth + 1),
        None => FieldKind::String,
    }
}

/// Widget kind for a property description. `$ref`s are resolved against `doc`; a
/// reference to an enum component becomes a select. Unknown types fall back to text.
pub fn field_kind(desc: &Value, doc: &Value) -> FieldKind {
    kind_at(desc, doc, 0)
}

fn choices_at(desc: &Value, doc: &Value, depth: usize) -> Option<Vec<String>> {
    if depth > MAX_REF_DEPTH {
        return None;
    }
    if let Some(values) = enum_values(desc) {
        return Some(values);
    }
    if let Some(target) = desc.get("$ref").and_then(Value::as_str).and_then(|r| component(ref_name(r), doc)) {
        return choices_at(target, doc, depth + 1);
    }
    variants(desc).find_map(|v| choices_at(v, doc, depth + 1))
}

/// Validators and select choices of a field. A field is required when the schema lists
/// it as required and it is not nullable; booleans are never required since an
/// unchecked box submits nothing.
pub fn field_validators(desc: &Value, doc: &Value, required: bool) -> (Vec<Validator>, Option<Vec<String>>) {
    let choices = choices_at(desc, doc, 0);
    let required = required && !is_nullable(desc) && field_kind(desc, doc) != FieldKind::Boolean;
    let mut validators = vec![if required { Validator::Required } else { Validator::Optional }];
    if let (true, Some(c)) = (required, &choices) {
        validators.push(Validator::AnyOf(c.clone()));
    }
    (validators, choices)
}

/// Ordered field list of one form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub name: String,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new(name: &str, fields: Vec<FormField>) -> Self {
        Self { name: name.to_string(), fields }
    }

    /// Build from request-body schemas; only the first one is used. `None` when there
    /// is no schema or it has no properties.
    pub fn from_openapi(name: &str, schemas: &[Value], doc: &Value) -> Option<Self> {
        let schema = schemas.first()?;
        let properties = schema.get("properties")?.as_object()?;
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let fields = properties
            .iter()
            .map(|(key, desc)| {
                let kind = field_kind(desc, doc);
                let (validators, choices) = field_validators(desc, doc, required.contains(&key.as_str()));
                let label = desc.get("title").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| label_for(key));
                FormField { name: key.clone(), label, kind, validators, choices }
            })
            .collect();
        Some(Self::new(name, fields))
    }

    /// Bind submitted `application/x-www-form-urlencoded` pairs; the last value of a
    /// repeated key wins.
    pub fn bind(&self, submitted: &[(String, String)]) -> BoundForm {
        let mut values = HashMap::new();
        for (k, v) in submitted {
            if self.fields.iter().any(|f| &f.name == k) {
                values.insert(k.clone(), v.clone());
            }
        }
        BoundForm { schema: self.clone(), values, errors: HashMap::new() }
    }

    /// Form pre-filled from an existing object.
    pub fn prefill(&self, obj: &Value) -> BoundForm {
        let mut values = HashMap::new();
        for field in &self.fields {
            let text = match obj.get(&field.name) {
                None | Some(Value::Null) => continue,
                Some(Value::Bool(true)) => "y".to_string(),
                Some(Value::Bool(false)) => continue,
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            values.insert(field.name.clone(), text);
        }
        BoundForm { schema: self.clone(), values, errors: HashMap::new() }
    }

    /// Empty form.
    pub fn blank(&self) -> BoundForm { self.bind(&[]) }
}

/// A form with raw submitted values and, after [`BoundForm::validate`], per-field errors.
#[derive(Debug, Clone)]
pub struct BoundForm {
    pub schema: FormSchema,
    pub values: HashMap<String, String>,
    pub errors: HashMap<String, Vec<String>>,
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
}

fn is_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

impl BoundForm {
    pub fn value(&self, name: &str) -> &str { self.values.get(name).map(String::as_str).unwrap_or("") }

    pub fn field_errors(&self, name: &str) -> &[String] { self.errors.get(name).map(Vec::as_slice).unwrap_or(&[]) }

    fn check(field: &FormField, raw: &str) -> Option<String> {
        if field.kind == FieldKind::Boolean {
            return None;
        }
        if raw.is_empty() {
            return field.is_required().then(|| "This field is required.".to_string());
        }
        let ok = match field.kind {
            FieldKind::Integer => raw.parse::<i64>().is_ok(),
            FieldKind::Float => raw.parse::<f64>().map(f64::is_finite).unwrap_or(false),
            FieldKind::DateTime => parse_datetime(raw).is_some(),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok(),
            FieldKind::Email => is_email(raw),
            _ => true,
        };
        if !ok {
            let what = match field.kind {
                FieldKind::Integer => "Not a valid integer value.",
                FieldKind::Float => "Not a valid float value.",
                FieldKind::DateTime => "Not a valid datetime value.",
                FieldKind::Date => "Not a valid date value.",
                _ => "Invalid email address.",
            };
            return Some(what.to_string());
        }
        match &field.choices {
            Some(choices) if !choices.iter().any(|c| c == raw) => {
                Some(format!("Invalid value, must be one of: {}.", choices.join(", ")))
            }
            _ => None,
        }
    }

    /// Run every field's validators, recording messages in `errors`.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for field in &self.schema.fields {
            let raw = self.values.get(&field.name).map(|v| v.trim()).unwrap_or("");
            if let Some(msg) = Self::check(field, raw) {
                self.errors.entry(field.name.clone()).or_default().push(msg);
            }
        }
        self.errors.is_empty()
    }

    /// Typed JSON object of every field; empty optional fields become `null`.
    /// Only meaningful after a successful [`BoundForm::validate`].
    pub fn data(&self) -> Value {
        let mut out = Map::new();
        for field in &self.schema.fields {
            let raw = self.values.get(&field.name).map(|v| v.trim()).unwrap_or("");
            let value = match field.kind {
                FieldKind::Boolean => Value::Bool(matches!(raw, "y" | "on" | "true" | "1")),
                _ if raw.is_empty() => Value::Null,
                FieldKind::Integer => raw.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
                FieldKind::Float => raw
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                FieldKind::DateTime => parse_datetime(raw)
                    .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
                    .unwrap_or(Value::Null),
                _ => Value::String(raw.to_string()),
            };
            out.insert(field.name.clone(), value);
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({"components": {"schemas": {
            "Genre": {"type": "string", "enum": ["fiction", "poetry"]},
            "Author": {"type": "object"}
        }}})
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn kinds_follow_type_and_format() {
        let d = doc();
        assert_eq!(field_kind(&json!({"type": "string"}), &d), FieldKind::String);
        assert_eq!(field_kind(&json!({"type": "string", "format": "date-time"}), &d), FieldKind::DateTime);
        assert_eq!(field_kind(&json!({"type": "string", "format": "email"}), &d), FieldKind::Email);
        assert_eq!(field_kind(&json!({"type": "integer", "format": "int32"}), &d), FieldKind::Integer);
        assert_eq!(field_kind(&json!({"type": "number"}), &d), FieldKind::Float);
        assert_eq!(field_kind(&json!({"type": "boolean"}), &d), FieldKind::Boolean);
        assert_eq!(field_kind(&json!({"type": "string", "format": "uri"}), &d), FieldKind::String);
        assert_eq!(field_kind(&json!({"type": "blob"}), &d), FieldKind::String);
        assert_eq!(field_kind(&json!({"type": ["integer", "null"]}), &d), FieldKind::Integer);
    }

    #[test]
    fn enum_references_become_selects() {
        let d = doc();
        assert_eq!(field_kind(&json!({"$ref": "#/components/schemas/Genre"}), &d), FieldKind::Select);
        assert_eq!(field_kind(&json!({"enum": ["a", "b"]}), &d), FieldKind::Select);
        let nullable = json!({"allOf": [{"$ref": "#/components/schemas/Genre"}], "nullable": true});
        assert_eq!(field_kind(&nullable, &d), FieldKind::Select);
        let any_of = json!({"anyOf": [{"type": "null"}, {"type": "integer"}]});
        assert_eq!(field_kind(&any_of, &d), FieldKind::Integer);
    }

    #[test]
    fn required_respects_nullability_and_booleans() {
        let d = doc();
        let (v, c) = field_validators(&json!({"$ref": "#/components/schemas/Genre"}), &d, true);
        assert_eq!(v, vec![Validator::Required, Validator::AnyOf(vec!["fiction".into(), "poetry".into()])]);
        assert_eq!(c.unwrap().len(), 2);

        let (v, c) = field_validators(&json!({"anyOf": [{"$ref": "#/components/schemas/Genre"}, {"type": "null"}]}), &d, true);
        assert_eq!(v, vec![Validator::Optional]);
        assert!(c.is_some());

        let (v, _) = field_validators(&json!({"type": "boolean"}), &d, true);
        assert_eq!(v, vec![Validator::Optional]);
        let (v, _) = field_validators(&json!({"type": "string"}), &d, false);
        assert_eq!(v, vec![Validator::Optional]);
    }

    #[test]
    fn schema_from_openapi_keeps_property_order_and_labels() {
        let schema = json!({
            "type": "object",
            "required": ["title", "genre", "author_id"],
            "properties": {
                "title": {"type": "string"},
                "genre": {"$ref": "#/components/schemas/Genre"},
                "extra_genre": {"allOf": [{"$ref": "#/components/schemas/Genre"}], "nullable": true},
                "author_id": {"type": "integer", "format": "int32"}
            }
        });
        let form = FormSchema::from_openapi("bookCreateForm", &[schema], &doc()).unwrap();
        let names: Vec<_> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["title", "genre", "extra_genre", "author_id"]);
        assert_eq!(form.fields[3].label, "Author Id");
        assert!(form.fields[1].is_required());
        assert!(!form.fields[2].is_required());
        assert!(FormSchema::from_openapi("x", &[], &doc()).is_none());
    }

    #[test]
    fn bound_form_validates_and_converts() {
        let form = FormSchema::new(
            "f",
            vec![
                FormField::new("title", FieldKind::String, true),
                FormField::new("pages", FieldKind::Integer, false),
                FormField::new("rating", FieldKind::Float, false),
                FormField::new("published", FieldKind::Boolean, true),
                FormField::new("genre", FieldKind::Select, false).with_choices(&["fiction", "poetry"]),
            ],
        );

        let mut bad = form.bind(&pairs(&[("title", " "), ("pages", "many"), ("genre", "cooking")]));
        assert!(!bad.validate());
        assert_eq!(bad.field_errors("title"), ["This field is required."]);
        assert_eq!(bad.field_errors("pages"), ["Not a valid integer value."]);
        assert!(bad.field_errors("genre")[0].starts_with("Invalid value"));
        assert!(bad.field_errors("published").is_empty());

        let mut good = form.bind(&pairs(&[("title", "Odes"), ("pages", "120"), ("published", "y"), ("genre", "")]));
        assert!(good.validate());
        assert_eq!(
            good.data(),
            json!({"title": "Odes", "pages": 120, "rating": null, "published": true, "genre": null})
        );
    }

    #[test]
    fn prefill_renders_existing_values() {
        let form = FormSchema::new(
            "f",
            vec![FormField::new("title", FieldKind::String, true), FormField::new("author_id", FieldKind::Integer, true)],
        );
        let bound = form.prefill(&json!({"id": 1, "title": "Dune", "author_id": 4}));
        assert_eq!(bound.value("title"), "Dune");
        assert_eq!(bound.value("author_id"), "4");
        assert_eq!(bound.value("missing"), "");
    }

    #[test]
    fn labels_are_title_cased_words() {
        assert_eq!(label_for("first_name"), "First Name");
        assert_eq!(label_for("id"), "Id");
    }
}
