//! Coordination-service adapters: the child watch client contract, the
//! subscription that feeds the liveness core, and an in-memory client.

pub mod client;
pub mod memory;
pub mod subscription;

pub use client::{ChildData, ChildEvent, ChildEventKind, ChildListener, ChildWatchClient};
pub use memory::InMemoryCoordinationClient;
pub use subscription::WatchSubscription;
