pub mod errors;
pub mod db;
pub mod author;
pub mod book;
pub mod flower;

#[cfg(test)]
mod tests;
