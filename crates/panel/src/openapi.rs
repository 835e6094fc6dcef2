use utoipa::OpenApi;

use common::types::ServiceInfo;
use server::errors::ErrorBody;
use service::pagination::FlowerPage;
use service::schemas::{FlowerCreate, FlowerResponse, FlowerUpdate};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::root,
        crate::routes::flower::list,
        crate::routes::flower::get,
        crate::routes::flower::create,
        crate::routes::flower::update,
        crate::routes::flower::delete,
    ),
    components(schemas(ServiceInfo, ErrorBody, FlowerCreate, FlowerUpdate, FlowerResponse, FlowerPage)),
    tags((name = "root"), (name = "flower"))
)]
pub struct ApiDoc;
