use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Debug, ToSchema)]
pub struct Health {
    pub status: &'static str,
}

/// Returned by each service's root endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ServiceInfo {
    pub name_service: String,
    pub version: String,
}
