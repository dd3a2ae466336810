pub mod controller;
pub mod focus;
pub mod key;
pub mod overlay;
pub mod router;

pub use controller::{KeyOutcome, NavMode, NavigationController};
pub use focus::FocusRegistry;
pub use key::RemoteKey;
pub use overlay::{OverlayId, OverlayStack};
pub use router::{RemoteInputRouter, RouterEvent, DEFAULT_DIGIT_TIMEOUT};
