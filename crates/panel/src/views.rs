//! Views registered on the Service A admin site.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use admin::form::{FieldKind, FormField};
use admin::{AdminError, AdminSite, ApiClient, ApiUrls, ApiView, FormSchema, ModelView, SchemaCache};
use configs::{AdminConfig, GameServiceConfig};

use crate::flower_store::FlowerStore;

pub const ADMIN_PATH: &str = "/service-a/admin";

const SERVICE_B_PREFIX: &str = "/service-b/v1";
const SERVICE_B_OPENAPI: &str = "/service-b/openapi.json/";

pub fn book_admin(service_b_url: &str, client: ApiClient, schemas: SchemaCache) -> ApiView {
    let urls = ApiUrls::rest(service_b_url, SERVICE_B_PREFIX, "book", SERVICE_B_OPENAPI);
    ApiView::new("book", "Book", urls, client, schemas)
        .column_list(&["id", "title"])
        .column_labels(&[("id", "id"), ("title", "Title")])
        .column_sortable_list(&["id", "title"])
}

pub fn author_admin(service_b_url: &str, client: ApiClient, schemas: SchemaCache) -> ApiView {
    let urls = ApiUrls::rest(service_b_url, SERVICE_B_PREFIX, "author", SERVICE_B_OPENAPI);
    ApiView::new("author", "Author", urls, client, schemas)
        .column_list(&["id", "first_name", "last_name"])
        .column_labels(&[("id", "id"), ("first_name", "First Name"), ("last_name", "Last Name")])
        .column_sortable_list(&["id", "last_name"])
}

/// Questions of the game service, reached through the API gateway with the session token.
pub fn question_admin(game: &GameServiceConfig, client: ApiClient, schemas: SchemaCache) -> ApiView {
    let base = game.game_service_path.trim_end_matches('/');
    let item = format!("{base}/v1/admin/question/{{question_id}}/");
    let urls = ApiUrls {
        base_url: game.gateway_url.trim_end_matches('/').to_string(),
        list_path: format!("{base}/v1/admin/question/list/"),
        create_path: format!("{base}/v1/admin/question/"),
        update_path: item.clone(),
        detail_path: item.clone(),
        delete_path: item,
        openapi_path: format!("{base}/openapi.json/"),
    };
    let columns = ["id", "title", "difficulty", "game_id", "round", "image", "category_id", "created_at", "updated_at"];
    ApiView::new("question", "Question", urls, client, schemas)
        .column_list(&columns)
        .column_labels(&[
            ("id", "id"),
            ("title", "Title"),
            ("difficulty", "Difficulty"),
            ("game_id", "Game id"),
            ("round", "Round"),
            ("image", "Image"),
            ("category_id", "Category"),
            ("created_at", "Created at"),
            ("updated_at", "Updated at"),
        ])
        .column_sortable_list(&columns)
        .use_token(true)
}

pub fn flower_admin(db: DatabaseConnection) -> ModelView {
    let form = FormSchema::new("flowerForm", vec![FormField::new("title", FieldKind::String, true)]);
    ModelView::new("flower", "Flower", Arc::new(FlowerStore::new(db)), form)
        .column_list(&["id", "title"])
        .column_sortable_list(&["id", "title"])
        .default_sort("id", true)
        .page_size(100)
}

/// Admin site with Service B's book and author, the local flower table and, when a
/// game service is configured, its questions.
pub fn build_admin_site(cfg: &AdminConfig, db: DatabaseConnection) -> Result<AdminSite, AdminError> {
    let client = ApiClient::new(Duration::from_secs(cfg.request_timeout_secs))?;
    let ttl = Duration::from_secs(cfg.openapi_cache_ttl_secs);
    let service_b_schemas = SchemaCache::new(ttl);

    let mut site = AdminSite::new(&cfg.title, ADMIN_PATH);
    site.register(book_admin(&cfg.service_b_url, client.clone(), service_b_schemas.clone()))?;
    site.register(author_admin(&cfg.service_b_url, client.clone(), service_b_schemas))?;
    if let Some(game) = &cfg.game_service {
        site.register(question_admin(game, client, SchemaCache::new(ttl)))?;
    }
    site.register(flower_admin(db))?;
    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_urls_go_through_the_gateway() {
        let game = GameServiceConfig {
            gateway_url: "http://gateway/".into(),
            game_service_path: "/game/".into(),
        };
        let client = ApiClient::new(Duration::from_secs(1)).unwrap();
        let view = question_admin(&game, client, SchemaCache::new(Duration::from_secs(1)));
        let urls = view.urls();
        assert_eq!(urls.list_url(), "http://gateway/game/v1/admin/question/list/");
        assert_eq!(urls.detail_url(&[("question_id", "5")]), "http://gateway/game/v1/admin/question/5/");
        assert_eq!(urls.openapi_url(), "http://gateway/game/openapi.json/");
    }

    #[tokio::test]
    async fn site_lists_question_only_when_configured() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = models::db::connect_in_memory().await?;

        let site = build_admin_site(&AdminConfig::default(), db.clone())?;
        let ids: Vec<_> = site.info().menu.iter().map(|m| m.identity.as_str()).collect();
        assert_eq!(ids, ["book", "author", "flower"]);

        let cfg = AdminConfig {
            game_service: Some(GameServiceConfig {
                gateway_url: "http://gateway".into(),
                game_service_path: "/game/".into(),
            }),
            ..AdminConfig::default()
        };
        let site = build_admin_site(&cfg, db)?;
        assert!(site.info().menu.iter().any(|m| m.identity == "question"));
        Ok(())
    }
}
