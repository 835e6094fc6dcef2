use utoipa::OpenApi;

use common::types::{Health, ServiceInfo};
use models::book::Genre;
use service::pagination::{AuthorPage, BookPage};
use service::schemas::{AuthorCreate, AuthorResponse, AuthorUpdate, BookCreate, BookResponse, BookUpdate};

use crate::errors::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::root,
        crate::routes::book::list,
        crate::routes::book::get,
        crate::routes::book::create,
        crate::routes::book::update,
        crate::routes::book::delete,
        crate::routes::author::list,
        crate::routes::author::get,
        crate::routes::author::create,
        crate::routes::author::update,
        crate::routes::author::delete,
    ),
    components(
        schemas(
            Health,
            ServiceInfo,
            ErrorBody,
            Genre,
            BookCreate,
            BookUpdate,
            BookResponse,
            BookPage,
            AuthorCreate,
            AuthorUpdate,
            AuthorResponse,
            AuthorPage,
        )
    ),
    tags(
        (name = "health"),
        (name = "root"),
        (name = "book"),
        (name = "author")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_exposes_crud_paths_and_genre_enum() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/service-b/v1/book/"));
        assert!(paths.contains_key("/service-b/v1/book/{book_id}/"));
        assert!(paths.contains_key("/service-b/v1/author/list/"));
        assert!(doc["paths"]["/service-b/v1/book/{book_id}/"]["patch"]["requestBody"].is_object());

        let genre = &doc["components"]["schemas"]["Genre"];
        let values: Vec<_> = genre["enum"].as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
        assert!(values.contains(&"science_fiction"));

        let required = doc["components"]["schemas"]["BookCreate"]["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "title"));
        assert!(!required.iter().any(|v| v == "extra_genre"));
    }
}
