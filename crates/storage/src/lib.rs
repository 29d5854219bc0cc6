// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Persisted project list and last input

mod record;
mod store;

pub use record::ProjectRecord;
pub use store::{Store, StoreDocument, StoreError, CURRENT_STORE_VERSION};
