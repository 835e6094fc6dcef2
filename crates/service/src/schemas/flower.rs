use models::flower;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FlowerCreate {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FlowerUpdate {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowerResponse {
    pub id: i32,
    pub title: String,
}

impl From<flower::Model> for FlowerResponse {
    fn from(m: flower::Model) -> Self { Self { id: m.id, title: m.title } }
}
