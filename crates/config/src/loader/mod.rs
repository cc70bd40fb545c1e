//! Layer declaration and resolution.
//!
//! Responsibilities:
//! - Define the deferred producer every layer is made of (`layer.rs`).
//! - Keep producers in priority order and merge them on demand (`stack.rs`).
//! - Offer fluent helpers for common sources (`builder.rs`) and profile
//!   expansion (`profiles.rs`).
//!
//! Does NOT handle:
//! - Installing a resolved stack as the process default (see `strategy/`).
//!
//! Invariants / Assumptions:
//! - The first layer added has the highest priority.
//! - Resolution re-runs every producer; nothing is memoized.

mod builder;
mod layer;
mod profiles;
mod stack;


pub use builder::LayerSink;
pub use layer::{LayerProducer, SharedProducer, constant};
pub use profiles::{active_profiles_from_property, combine_profiles};
pub use stack::LayerStack;
