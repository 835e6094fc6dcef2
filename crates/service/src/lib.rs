//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - `crud` holds the entity-agnostic repository the typed services build on.

pub mod errors;
pub mod crud;
pub mod pagination;
pub mod schemas;
pub mod book_service;
pub mod author_service;
pub mod flower_service;
#[cfg(test)]
pub mod test_support;
