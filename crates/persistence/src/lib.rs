// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod error;
pub mod log_store;

pub use error::{PersistenceError, Result};
pub use log_store::FileKvStore;
