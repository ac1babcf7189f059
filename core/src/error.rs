//! Error types for the items API client and the list store.
//!
//! # Design
//! `ApiError` covers everything that can go wrong between building a request
//! and parsing its response. Non-2xx responses land in `Transport` with the
//! raw status code and body for debugging. `StoreError` adds the one failure
//! the store detects locally without a round trip, plus misuse of the
//! two-phase API.

use thiserror::Error;

use crate::store::Ticket;
use crate::types::ItemId;

/// Errors returned by `ItemsClient` and `ItemsApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No base URL was configured. Raised before any network attempt.
    #[error("API endpoint is not configured; set ITEMS_API_ENDPOINT")]
    Config,

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    Transport { status: u16, body: String },

    /// A delete was acknowledged with a message other than the expected one.
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// The HTTP round trip itself could not be completed.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by `ItemStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The item is not in the local list; no request was sent.
    #[error("item {0} not found")]
    NotFound(ItemId),

    /// `complete` was handed a ticket that is not in flight.
    #[error("no request in flight for {0:?}")]
    UnknownTicket(Ticket),
}
