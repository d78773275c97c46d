//! Student records and academic reports behind a small JSON API.
//!
//! Every route answers with the same envelope shape (`success` plus `data`,
//! `error`, `message`), lists are paginated server-side, and rows live in
//! SQLite or in memory behind the [`store::Store`] trait. The [`client`]
//! module holds the typed consumer half: an API client and a fetch resource
//! with last-write-wins semantics.

pub mod client;
pub mod config;
pub mod envelope;
pub mod http;
pub mod models;
pub mod page;
pub mod seed;
pub mod store;
pub mod validate;
