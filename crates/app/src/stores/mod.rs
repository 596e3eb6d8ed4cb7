//! Client-side stores.
//!
//! Each store owns one slice of remote state, mirrors it after every
//! successful round trip and reports failures through its `error` field and
//! the shared [`Notifier`](crate::notifications::Notifier).

pub mod addresses;
pub mod cart;
pub mod orders;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use addresses::{
    AddressBookError, AddressBookState, AddressBookStore, AssumeYes, Confirm, MockConfirm,
};
pub use cart::{CartState, CartStore, CartStoreError};
pub use orders::{OrderHistoryError, OrderHistoryState, OrderHistoryStore};

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
