//! # Lifebind
//!
//! Bind producers to consumers without holding on to the subscription.
//!
//! Lifebind provides:
//!
//! - **Lifetime-gated release**: [`retain_until_release_of`] keeps a resource
//!   until a watched object becomes unreachable, then releases it
//! - **Liveness tokens**: weak, non-owning probes over watched objects
//! - **A background sweeper**: one per registry, started on first use
//! - **Binding helpers**: one-to-one and fan-out binds over [`bind::Producer`]
//!   and [`bind::Consumer`]
//! - **Resource bags**: release a group of resources together on drop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lifebind::prelude::*;
//! use std::sync::Arc;
//!
//! let feed = Arc::new(PriceFeed::new());
//!
//! // The binding is released shortly after `feed` is dropped.
//! bind(&feed, |price: f64| println!("{price}"));
//! drop(feed);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bind;
pub mod config;
pub mod errors;
pub mod events;
pub mod liveness;
pub mod observability;
pub mod registry;
pub mod resource;
pub mod retain;
pub mod testing;

pub use retain::{retain_until_release_of, RetainExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bind::{
        bind, bind_all, bind_all_optional, bind_optional, bind_with, connect,
        connect_all, Consumer, Producer,
    };
    pub use crate::config::RegistryConfig;
    pub use crate::errors::{LifebindError, ReleaseError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::liveness::{LivenessToken, Watchable};
    pub use crate::registry::{
        configure_global, global, EntryId, ResourceRegistry, SweepReport, Sweeper,
        SweeperHandle,
    };
    pub use crate::resource::{Resource, ResourceBag, Subscription};
    pub use crate::retain::{retain_until_release_of, RetainExt};
}
