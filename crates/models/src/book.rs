use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::author;
use crate::errors;

/// Literary genre, stored as its snake_case name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    #[sea_orm(string_value = "fiction")]
    Fiction,
    #[sea_orm(string_value = "non_fiction")]
    NonFiction,
    #[sea_orm(string_value = "fantasy")]
    Fantasy,
    #[sea_orm(string_value = "science_fiction")]
    ScienceFiction,
    #[sea_orm(string_value = "mystery")]
    Mystery,
    #[sea_orm(string_value = "romance")]
    Romance,
    #[sea_orm(string_value = "poetry")]
    Poetry,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub genre: Genre,
    pub extra_genre: Option<Genre>,
    pub author_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Author => Entity::belongs_to(author::Entity)
                .from(Column::AuthorId)
                .to(author::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<author::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() { return Err(errors::ModelError::Validation("title required".into())); }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    title: &str,
    genre: Genre,
    extra_genre: Option<Genre>,
    author_id: i32,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    let am = ActiveModel {
        title: Set(title.to_string()),
        genre: Set(genre),
        extra_genre: Set(extra_genre),
        author_id: Set(author_id),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
