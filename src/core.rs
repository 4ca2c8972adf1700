// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

pub mod conduit;
pub mod copy;
pub mod delete;
pub mod get;
pub mod guard;
pub mod head;
pub mod metadata;
pub mod progress;
pub mod request;
pub mod store;
pub mod upload;
