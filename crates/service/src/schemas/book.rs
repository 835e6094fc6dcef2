use models::book::{self, Genre};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookCreate {
    pub title: String,
    pub genre: Genre,
    #[serde(default)]
    pub extra_genre: Option<Genre>,
    pub author_id: i32,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<Genre>,
    /// `null` clears the secondary genre
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Genre>)]
    pub extra_genre: Option<Option<Genre>>,
    #[serde(default)]
    pub author_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub genre: Genre,
    pub extra_genre: Option<Genre>,
    pub author_id: i32,
}

impl From<book::Model> for BookResponse {
    fn from(m: book::Model) -> Self {
        Self { id: m.id, title: m.title, genre: m.genre, extra_genre: m.extra_genre, author_id: m.author_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let absent: BookUpdate = serde_json::from_str(r#"{"title":"New"}"#).unwrap();
        assert_eq!(absent.extra_genre, None);
        let cleared: BookUpdate = serde_json::from_str(r#"{"extra_genre":null}"#).unwrap();
        assert_eq!(cleared.extra_genre, Some(None));
        let set: BookUpdate = serde_json::from_str(r#"{"extra_genre":"poetry"}"#).unwrap();
        assert_eq!(set.extra_genre, Some(Some(Genre::Poetry)));
    }

    #[test]
    fn create_rejects_unknown_genre() {
        let res = serde_json::from_str::<BookCreate>(r#"{"title":"X","genre":"cooking","author_id":1}"#);
        assert!(res.is_err());
    }
}
