//! Shared runtime for remote-control-driven media browsing clients:
//! a focus & overlay navigation engine and a time-bounded data cache.
//!
//! Rendering, video playback and the provider wire protocol live
//! outside this crate; the presentation layer registers focusable items
//! and reads cache snapshots, the network layer is consumed as fetch
//! closures.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod session;

pub use cache::{CacheError, TimeBoundedCache};
pub use engine::{NavMode, OverlayId, RemoteInputRouter, RemoteKey, RouterEvent};
pub use session::Session;
