//! External system adapters
//!
//! Each adapter isolates one backend behind a trait: the search index, the
//! artifact object store and the IndexNow receivers.

pub mod indexnow;
pub mod search;
pub mod store;
