//! Client core for the items service.
//!
//! # Overview
//! Two layers. `client` turns the four list/create/update/delete operations
//! into plain-data HTTP requests and parses the responses into typed results
//! or `ApiError`s. `store` keeps the in-session list on top of it, applying
//! toggles optimistically and rolling them back when the server refuses.
//!
//! # Design
//! - `ItemsClient` is stateless; `build_*` produces a request and `parse_*`
//!   consumes a response, so the I/O boundary is explicit.
//! - `Transport` performs the round trip. `UreqTransport` is the blocking
//!   default; tests substitute scripted transports.
//! - `ItemStore` splits every operation into `begin_*` and `complete` so a
//!   host can run the request itself and render the in-flight state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

pub use client::{ItemsApi, ItemsClient};
pub use config::{ClientConfig, DeleteAckPolicy};
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use store::{ItemStore, Outgoing, Ticket};
pub use transport::UreqTransport;
pub use types::{Item, ItemDraft, ItemFields, ItemId};
