//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String` and raw pointers instead of `Vec`.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use items_core::{Item, ItemStore, UreqTransport};

/// Opaque handle to an `ItemStore`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiItemStore {
    pub(crate) inner: ItemStore<UreqTransport>,
}

/// A single item exposed to C.
#[repr(C)]
pub struct FfiItem {
    pub id: i64,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub completed: bool,
}

/// A snapshot of the store's list exposed to C.
#[repr(C)]
pub struct FfiItemList {
    pub items: *mut FfiItem,
    pub len: u32,
}

/// Copy `s` into a heap C string. Interior NULs are stripped rather than
/// failing the whole conversion.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    let cleaned: String = s.chars().filter(|c| *c != '\0').collect();
    CString::new(cleaned).unwrap_or_default().into_raw()
}

impl FfiItem {
    fn from_core(item: &Item) -> Self {
        FfiItem {
            id: item.id,
            title: to_c_string(&item.title),
            description: to_c_string(&item.description),
            completed: item.completed,
        }
    }
}

/// Length as carried across the boundary; `None` if it does not fit.
pub(crate) fn list_len(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

impl FfiItemList {
    /// Copy `items` into a heap-allocated `FfiItemList`. Null if the list is
    /// longer than `u32::MAX`.
    pub(crate) fn from_core(items: &[Item]) -> *mut Self {
        let Some(len) = list_len(items.len()) else {
            return std::ptr::null_mut();
        };
        let ffi_items: Box<[FfiItem]> = items.iter().map(FfiItem::from_core).collect();

        let items = if ffi_items.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_items) as *mut FfiItem
        };

        Box::into_raw(Box::new(FfiItemList { items, len }))
    }
}
