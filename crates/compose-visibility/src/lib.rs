//! Lazy visibility notifications for Compose-RS elements.
//!
//! Components register a callback for an element and get notified once when
//! it is about to scroll into view, or every time the document is printed.
//! The platform primitives come from a [`VisibilityHost`]; see the
//! `compose-platform-web` crate for the browser implementation.

pub mod cell;
mod collections;
pub mod config;
pub mod host;
pub mod identity;
pub mod notifier;
mod registry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use cell::NotifierCell;
pub use config::{RootMargin, VisibilityConfig, DEFAULT_PRINT_MEDIA_QUERY, DEFAULT_ROOT_MARGIN_PX};
pub use host::{
    IntersectionDispatcher, IntersectionRecord, PrintDispatcher, VisibilityHost,
    VisibilityObserver,
};
pub use identity::{ElementId, IdentityTable, WeakIdentityTable};
pub use notifier::{VisibilityNotifier, WatchDisposer};
pub use registry::{VisibilityCallback, VisibilityReason};
