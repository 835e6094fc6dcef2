//! Service A: flower CRUD and the admin panel for the library services.

pub mod flower_store;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod views;

pub use routes::{build_router, PanelState};
pub use startup::run;
