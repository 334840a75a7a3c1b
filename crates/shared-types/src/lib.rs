//! # Shared Types Crate
//!
//! Single source of truth for every type that crosses a crate boundary in
//! the Quill core: domain entities, the operation identifier model, runtime
//! configuration and the error taxonomy.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-crate types live here and nowhere else.
//! - **Wire Visibility**: everything the host can observe through a payload
//!   derives `Serialize`/`Deserialize`; purely internal types do not.
//! - **Structured Failures**: domain failures are data, not process aborts.

pub mod config;
pub mod entities;
pub mod errors;
pub mod ids;

pub use config::Config;
pub use entities::*;
pub use errors::*;
pub use ids::{OnceId, OperationKind, StreamId};
