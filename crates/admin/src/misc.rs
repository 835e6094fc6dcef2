use serde_json::Value;

use crate::constants::RELATED_OBJECT_TITLE_KEYS;

/// Display name of a related object: the first of `fullname`, `full_name`, `name`,
/// `title`, falling back to `id`.
pub fn related_object_title(obj: &Value) -> String {
    RELATED_OBJECT_TITLE_KEYS
        .iter()
        .find_map(|k| obj.get(*k))
        .or_else(|| obj.get("id"))
        .map(display_value)
        .unwrap_or_default()
}

/// Plain-text rendering of a JSON scalar; strings lose their quotes, null is empty.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_prefers_name_like_keys_in_order() {
        assert_eq!(related_object_title(&json!({"id": 3, "title": "Dune", "name": "x"})), "x");
        assert_eq!(related_object_title(&json!({"id": 3, "full_name": "Ann Lee", "title": "t"})), "Ann Lee");
        assert_eq!(related_object_title(&json!({"id": 3, "title": "Dune"})), "Dune");
    }

    #[test]
    fn title_falls_back_to_id() {
        assert_eq!(related_object_title(&json!({"id": 12, "first_name": "Ann"})), "12");
        assert_eq!(related_object_title(&json!({})), "");
    }
}
