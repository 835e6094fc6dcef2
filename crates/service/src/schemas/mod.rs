//! Request and response bodies of the REST endpoints.

mod author;
mod book;
mod flower;

pub use author::{AuthorCreate, AuthorResponse, AuthorUpdate};
pub use book::{BookCreate, BookResponse, BookUpdate};
pub use flower::{FlowerCreate, FlowerResponse, FlowerUpdate};

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "...")]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
