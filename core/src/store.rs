//! In-session item list with optimistic updates.
//!
//! # Design
//! `ItemStore` is the single owner of the local list, the new-item draft,
//! the requests in flight and the last error message. The presentation layer
//! reads those through accessors and drives the store through its
//! operations.
//!
//! Every operation comes in two phases, mirroring `ItemsClient`'s
//! build/parse split. `begin_*` applies any local change, records the
//! request as in flight and hands back an `Outgoing` request for the host
//! to execute; `complete` takes the answer and reconciles or rolls back.
//! Between the two the store can be read freely: `is_busy` is true and an
//! optimistic toggle is already visible. `load`, `add`, `toggle_completed`,
//! `remove` and `edit` run both phases through the store's own transport.
//!
//! The busy flag is advisory. Nothing stops a second `begin_*` while one is
//! in flight; each keeps its own ticket, and two toggles of the same item
//! settle in whatever order their answers arrive.
//!
//! Failures are logged with their full cause and reduced to one
//! human-readable message that replaces the previous one. The typed error
//! is also returned for callers that want it.
//!
//! Only toggling is optimistic. Create and delete wait for the server, and
//! edit applies the server's answer once it arrives.

use std::collections::BTreeMap;

use crate::client::ItemsApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, StoreError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::transport::UreqTransport;
use crate::types::{Item, ItemDraft, ItemFields, ItemId};

const LOAD_FAILED: &str = "Failed to fetch items";
const ADD_FAILED: &str = "Failed to add item";
const UPDATE_FAILED: &str = "Failed to update item";
const DELETE_FAILED: &str = "Failed to delete item";

/// Identifies one request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// A request the host must execute and feed back through `complete`.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

/// What `complete` needs to settle a request.
#[derive(Debug)]
enum Pending {
    Load,
    Add,
    Toggle {
        id: ItemId,
        snapshot: Item,
        fields: ItemFields,
    },
    Remove {
        id: ItemId,
    },
    Edit {
        id: ItemId,
        fields: ItemFields,
    },
}

impl Pending {
    fn failure(&self) -> &'static str {
        match self {
            Pending::Load => LOAD_FAILED,
            Pending::Add => ADD_FAILED,
            Pending::Toggle { .. } | Pending::Edit { .. } => UPDATE_FAILED,
            Pending::Remove { .. } => DELETE_FAILED,
        }
    }
}

#[derive(Debug)]
pub struct ItemStore<T> {
    api: ItemsApi<T>,
    items: Vec<Item>,
    draft: ItemDraft,
    in_flight: BTreeMap<Ticket, Pending>,
    next_ticket: u64,
    error: Option<String>,
}

impl ItemStore<UreqTransport> {
    /// Store talking to the endpoint named by `ITEMS_API_ENDPOINT`.
    pub fn from_env() -> Self {
        Self::new(&ClientConfig::from_env(), UreqTransport::new())
    }
}

impl<T: Transport> ItemStore<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self::with_api(ItemsApi::new(config, transport))
    }

    pub fn with_api(api: ItemsApi<T>) -> Self {
        Self {
            api,
            items: Vec::new(),
            draft: ItemDraft::default(),
            in_flight: BTreeMap::new(),
            next_ticket: 0,
            error: None,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// True while at least one request is in flight.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Last failure message, kept until replaced or dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    pub fn set_draft(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.draft = ItemDraft::new(title, description);
    }

    pub fn api(&self) -> &ItemsApi<T> {
        &self.api
    }

    /// Replace the local list with the server's. On failure the previous
    /// list is kept.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let outgoing = self.begin_load()?;
        self.drive(outgoing)
    }

    /// Create an item from the current draft and append the server's copy.
    ///
    /// A draft whose title is blank is dropped without a request and without
    /// an error. The draft is cleared only after the server accepts it.
    pub fn add(&mut self) -> Result<(), StoreError> {
        match self.begin_add()? {
            Some(outgoing) => self.drive(outgoing),
            None => Ok(()),
        }
    }

    /// Set `completed` locally, then send the full record. The flag is
    /// restored if the server rejects the change.
    pub fn toggle_completed(&mut self, id: ItemId, completed: bool) -> Result<(), StoreError> {
        let outgoing = self.begin_toggle(id, completed)?;
        self.drive(outgoing)
    }

    /// Delete on the server first; drop the local copy only on success.
    pub fn remove(&mut self, id: ItemId) -> Result<(), StoreError> {
        let outgoing = self.begin_remove(id)?;
        self.drive(outgoing)
    }

    /// Replace title and description. `fields.completed` is ignored: the
    /// outgoing payload always carries the item's current local flag, so
    /// editing never changes completion state.
    pub fn edit(&mut self, id: ItemId, fields: ItemFields) -> Result<(), StoreError> {
        let outgoing = self.begin_edit(id, fields)?;
        self.drive(outgoing)
    }

    pub fn begin_load(&mut self) -> Result<Outgoing, StoreError> {
        match self.api.client().build_list_items() {
            Ok(request) => Ok(self.track(Pending::Load, request)),
            Err(e) => Err(self.fail(LOAD_FAILED, e.into())),
        }
    }

    /// `Ok(None)` when the draft title is blank; nothing is sent.
    pub fn begin_add(&mut self) -> Result<Option<Outgoing>, StoreError> {
        if self.draft.is_blank() {
            tracing::debug!("ignoring add with blank title");
            return Ok(None);
        }
        let draft = ItemDraft {
            completed: false,
            ..self.draft.clone()
        };
        match self.api.client().build_create_item(&draft) {
            Ok(request) => Ok(Some(self.track(Pending::Add, request))),
            Err(e) => Err(self.fail(ADD_FAILED, e.into())),
        }
    }

    /// Applies the new flag to the local item before returning.
    pub fn begin_toggle(&mut self, id: ItemId, completed: bool) -> Result<Outgoing, StoreError> {
        let (snapshot, applied) =
            match self.apply_optimistic(id, |item| item.completed = completed) {
                Ok(pair) => pair,
                Err(e) => return Err(self.fail(UPDATE_FAILED, e)),
            };
        let fields = applied.fields();
        match self.api.client().build_update_item(id, &fields) {
            Ok(request) => Ok(self.track(
                Pending::Toggle {
                    id,
                    snapshot,
                    fields,
                },
                request,
            )),
            Err(e) => {
                self.restore(snapshot);
                Err(self.fail(UPDATE_FAILED, e.into()))
            }
        }
    }

    pub fn begin_remove(&mut self, id: ItemId) -> Result<Outgoing, StoreError> {
        match self.api.client().build_delete_item(id) {
            Ok(request) => Ok(self.track(Pending::Remove { id }, request)),
            Err(e) => Err(self.fail(DELETE_FAILED, e.into())),
        }
    }

    /// Fails with `NotFound` and sends nothing if `id` is not in the list.
    pub fn begin_edit(&mut self, id: ItemId, fields: ItemFields) -> Result<Outgoing, StoreError> {
        let Some(current) = self.get(id) else {
            return Err(self.fail(UPDATE_FAILED, StoreError::NotFound(id)));
        };
        let fields = ItemFields {
            completed: current.completed,
            ..fields
        };
        match self.api.client().build_update_item(id, &fields) {
            Ok(request) => Ok(self.track(Pending::Edit { id, fields }, request)),
            Err(e) => Err(self.fail(UPDATE_FAILED, e.into())),
        }
    }

    /// Settle the request behind `ticket` with the host's answer. A
    /// transport error is treated like a failed response.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        response: Result<HttpResponse, ApiError>,
    ) -> Result<(), StoreError> {
        let Some(pending) = self.in_flight.remove(&ticket) else {
            tracing::warn!(?ticket, "completion for unknown ticket");
            return Err(StoreError::UnknownTicket(ticket));
        };
        let failure = pending.failure();
        self.settle(pending, response)
            .map_err(|e| self.fail(failure, e))
    }

    /// Drop every request in flight, rolling back optimistic changes. For
    /// hosts that lost the answers, e.g. after a panic mid-operation.
    pub fn abandon_in_flight(&mut self) {
        let abandoned = std::mem::take(&mut self.in_flight);
        for (ticket, pending) in abandoned {
            tracing::debug!(?ticket, "abandoning request");
            if let Pending::Toggle { snapshot, .. } = pending {
                self.restore(snapshot);
            }
        }
    }

    fn settle(
        &mut self,
        pending: Pending,
        response: Result<HttpResponse, ApiError>,
    ) -> Result<(), StoreError> {
        match pending {
            Pending::Load => {
                let items = self.api.client().parse_list_items(response?)?;
                tracing::debug!(count = items.len(), "loaded items");
                self.items = items;
            }
            Pending::Add => {
                let item = self.api.client().parse_create_item(response?)?;
                tracing::debug!(id = item.id, "created item");
                self.items.push(item);
                self.draft = ItemDraft::default();
            }
            Pending::Toggle {
                id,
                snapshot,
                fields,
            } => {
                let confirmed =
                    response.and_then(|r| self.api.client().parse_update_item(id, &fields, r));
                match confirmed {
                    Ok(item) => self.merge(id, item),
                    Err(e) => {
                        self.restore(snapshot);
                        tracing::debug!(id, "rolled back optimistic update");
                        return Err(e.into());
                    }
                }
            }
            Pending::Remove { id } => {
                self.api.client().parse_delete_item(response?)?;
                self.items.retain(|item| item.id != id);
                tracing::debug!(id, "removed item");
            }
            Pending::Edit { id, fields } => {
                let updated = self.api.client().parse_update_item(id, &fields, response?)?;
                self.merge(id, updated);
            }
        }
        Ok(())
    }

    fn drive(&mut self, outgoing: Outgoing) -> Result<(), StoreError> {
        let response = self.api.execute(outgoing.request);
        self.complete(outgoing.ticket, response)
    }

    fn track(&mut self, pending: Pending, request: HttpRequest) -> Outgoing {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight.insert(ticket, pending);
        Outgoing { ticket, request }
    }

    /// Apply `mutate` to the item and return `(snapshot, mutated)`. The
    /// snapshot is what `restore` puts back if the server refuses.
    fn apply_optimistic<M>(&mut self, id: ItemId, mutate: M) -> Result<(Item, Item), StoreError>
    where
        M: FnOnce(&mut Item),
    {
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let snapshot = slot.clone();
        mutate(&mut *slot);
        Ok((snapshot, slot.clone()))
    }

    fn restore(&mut self, snapshot: Item) {
        let id = snapshot.id;
        self.merge(id, snapshot);
    }

    /// Server fields win over whatever the local copy holds.
    fn merge(&mut self, id: ItemId, server: Item) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.id == id) {
            *slot = server;
        }
    }

    fn fail(&mut self, failure: &'static str, e: StoreError) -> StoreError {
        tracing::error!(error = %e, "{failure}");
        self.error = Some(failure.to_string());
        e
    }
}
