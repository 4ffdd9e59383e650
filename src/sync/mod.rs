//! Client-facing sync layer
//!
//! The contract the UI talks to:
//! - `observer` - live per-owner views: load a snapshot, await changes,
//!   unsubscribe
//! - `commands` - outbound requests to the provider (attach, detach,
//!   set-default, charge)
//! - `notify` - the store-change feed the reconciler publishes into
//! - `view` - snapshot types
//!
//! Commands never mutate local state (one exception: the speculative
//! pending transaction); views never issue commands.

pub mod commands;
pub mod notify;
pub mod observer;
pub mod view;

pub use commands::{CommandGateway, DEFAULT_COMMAND_TIMEOUT};
pub use notify::{ChangeDomain, ChangeFeed, StoreChange};
pub use observer::{ClientSync, OwnerObserver, SyncSignal};
pub use view::OwnerSnapshot;
