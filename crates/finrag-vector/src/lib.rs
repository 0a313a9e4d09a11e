//! finrag-vector
//!
//! The persistent chunk collection backed by LanceDB. See [`LanceCollection`].

pub mod collection;
pub mod schema;
pub mod table;

pub use collection::LanceCollection;
