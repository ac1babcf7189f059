//! C-ABI wrapper around `items-core`'s `ItemStore`.
//!
//! # Overview
//! Lets a presentation layer written in any language with a C FFI drive the
//! item list: load, add, toggle, edit and remove, then read back the list,
//! the busy flag and the last error message.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations return `true` on success. On failure the store keeps a
//!   human-readable message, available through `items_store_error`.
//! - The C caller owns all returned pointers and must call the matching
//!   `items_free_*` / `items_store_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use items_core::{ClientConfig, ItemFields, ItemStore, UreqTransport};

use types::*;

/// Read a borrowed C string. Null and invalid UTF-8 both read as `None`.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_string)
}

/// Run `f` against the store behind `store`, or return `fallback` if the
/// pointer is null or `f` panics. After a panic every request the store
/// had in flight is abandoned so it does not stay busy.
fn with_store<R>(store: *mut FfiItemStore, fallback: R, f: impl FnOnce(&mut FfiItemStore) -> R) -> R {
    if store.is_null() {
        return fallback;
    }
    match catch_unwind(AssertUnwindSafe(|| f(unsafe { &mut *store }))) {
        Ok(value) => value,
        Err(_) => {
            let store = unsafe { &mut *store };
            store.inner.abandon_in_flight();
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// Store lifecycle
// ---------------------------------------------------------------------------

/// Create a store bound to `base_url`.
///
/// A null `base_url` yields a store with no endpoint configured: every
/// operation on it fails and reports the configuration error.
/// The caller must free the returned pointer with `items_store_free`.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_new(base_url: *const c_char) -> *mut FfiItemStore {
    catch_unwind(|| {
        let config = match read_str(base_url) {
            Some(url) => ClientConfig::new(url),
            None => ClientConfig::unconfigured(),
        };
        let inner = ItemStore::new(&config, UreqTransport::new());
        Box::into_raw(Box::new(FfiItemStore { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a store configured from `ITEMS_API_ENDPOINT` / `ITEMS_DELETE_ACK`.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_from_env() -> *mut FfiItemStore {
    catch_unwind(|| {
        let inner = ItemStore::from_env();
        Box::into_raw(Box::new(FfiItemStore { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a store created by `items_store_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_free(store: *mut FfiItemStore) {
    if !store.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(store) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Fetch the full list from the server, replacing the local one.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_load(store: *mut FfiItemStore) -> bool {
    with_store(store, false, |s| s.inner.load().is_ok())
}

/// Set the new-item draft. A null `title` or `description` reads as empty.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_set_draft(
    store: *mut FfiItemStore,
    title: *const c_char,
    description: *const c_char,
) -> bool {
    let title = read_str(title).unwrap_or_default();
    let description = read_str(description).unwrap_or_default();
    with_store(store, false, |s| {
        s.inner.set_draft(title, description);
        true
    })
}

/// Create an item from the draft. A blank title is a successful no-op.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_add(store: *mut FfiItemStore) -> bool {
    with_store(store, false, |s| s.inner.add().is_ok())
}

/// Set an item's completion flag, rolling back locally on failure.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_toggle(store: *mut FfiItemStore, id: i64, completed: bool) -> bool {
    with_store(store, false, |s| s.inner.toggle_completed(id, completed).is_ok())
}

/// Delete an item on the server, then locally.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_remove(store: *mut FfiItemStore, id: i64) -> bool {
    with_store(store, false, |s| s.inner.remove(id).is_ok())
}

/// Replace an item's title and description. Completion state is kept.
/// Returns false without a request if `title` is null.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_edit(
    store: *mut FfiItemStore,
    id: i64,
    title: *const c_char,
    description: *const c_char,
) -> bool {
    let Some(title) = read_str(title) else {
        return false;
    };
    let description = read_str(description).unwrap_or_default();
    with_store(store, false, |s| {
        let fields = ItemFields {
            title,
            description,
            completed: false,
        };
        s.inner.edit(id, fields).is_ok()
    })
}

// ---------------------------------------------------------------------------
// State accessors
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn items_store_is_busy(store: *mut FfiItemStore) -> bool {
    with_store(store, false, |s| s.inner.is_busy())
}

/// The last error message, or null if there is none.
/// Free the returned string with `items_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_error(store: *mut FfiItemStore) -> *mut c_char {
    with_store(store, std::ptr::null_mut(), |s| match s.inner.error() {
        Some(message) => to_c_string(message),
        None => std::ptr::null_mut(),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn items_store_dismiss_error(store: *mut FfiItemStore) {
    with_store(store, (), |s| s.inner.dismiss_error())
}

/// Copy the current list. Free it with `items_free_list`. Null if `store`
/// is null or the list is longer than `u32::MAX`.
#[unsafe(no_mangle)]
pub extern "C" fn items_store_items(store: *mut FfiItemStore) -> *mut FfiItemList {
    with_store(store, std::ptr::null_mut(), |s| FfiItemList::from_core(s.inner.items()))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiItemList` returned by `items_store_items`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn items_free_list(list: *mut FfiItemList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { Box::from_raw(list) };
        if list.items.is_null() || list.len == 0 {
            return;
        }
        let slice = std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize);
        let items = unsafe { Box::from_raw(slice) };
        for item in items.iter() {
            if !item.title.is_null() {
                drop(unsafe { CString::from_raw(item.title) });
            }
            if !item.description.is_null() {
                drop(unsafe { CString::from_raw(item.description) });
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn items_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
