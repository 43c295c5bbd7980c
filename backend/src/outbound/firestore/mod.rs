//! Firestore outbound adapter.
//!
//! This module provides thin HTTP implementations of the `RecordStore` and
//! `UserProfileSource` ports over the Firestore REST API.

mod client;
mod dto;
mod http_store;
mod profile_source;

pub use client::FirestoreConfig;
pub use http_store::{COMPLAINTS_COLLECTION, FirestoreRecordStore};
pub use profile_source::{FirestoreUserProfileSource, USERS_COLLECTION};
