//! Server-rendered admin panel.
//!
//! Views either manage local tables through a [`model_view::ModelStore`] or proxy a
//! remote REST API ([`api_view::ApiView`]) whose create/edit forms are scaffolded from
//! the remote OpenAPI document.

pub mod api_view;
pub mod client;
pub mod constants;
pub mod errors;
pub mod form;
pub mod misc;
pub mod model_view;
pub mod openapi;
pub mod pagination;
pub mod path;
pub mod render;
pub mod site;
pub mod view;

pub use api_view::{ApiUrls, ApiView};
pub use client::ApiClient;
pub use errors::AdminError;
pub use form::FormSchema;
pub use model_view::{ModelStore, ModelView};
pub use openapi::SchemaCache;
pub use site::AdminSite;
pub use view::{AdminView, ViewContext};
