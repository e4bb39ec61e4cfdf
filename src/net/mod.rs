//! Network helpers.
//!
//! # Data Flow
//! ```text
//! host string from a pair value
//!     → resolve.rs (literal parse, else DNS)
//!     → IpAddr stored in a typed field or peer entry
//! ```

pub mod resolve;

pub use resolve::{Resolve, ResolveError, StaticResolver, SystemResolver};
