use models::author;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthorCreate {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AuthorUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<author::Model> for AuthorResponse {
    fn from(m: author::Model) -> Self {
        Self { id: m.id, first_name: m.first_name, last_name: m.last_name }
    }
}
