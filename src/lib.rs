//! Fabric-waste nesting engine for cut-to-order window coverings.
//!
//! Packs rectangular pieces (width × drop) onto a continuous fabric
//! roll with shelf-based FFDH placement, keeps every shelf inside one
//! 5900 mm marker segment, and reports per-line and order-wide waste
//! and utilization metrics. The engine is a pure function of one
//! [`types::Order`]; transport, auth and persistence belong to callers.

pub mod compact;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod render;
pub mod shelf;
pub mod types;

pub use engine::{PackedOrder, compute_efficiency, compute_layout};
pub use error::{EngineError, Result};
