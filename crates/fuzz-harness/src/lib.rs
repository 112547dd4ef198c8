//! ROV Fuzz Harness
//!
//! Property-based testing strategies for the vehicle domain: positions inside
//! and outside the operating envelope, tick lengths and thruster loads.
//!
//! # Usage
//!
//! ```rust
//! use fuzz_harness::prelude::*;
//!
//! proptest! {
//!     #![proptest_config(fuzz_config())]
//!     #[test]
//!     fn my_fuzz_test(depth in depth_m()) {
//!         prop_assert!(depth >= 0.0);
//!     }
//! }
//! ```

pub mod generators;
pub mod runner;

pub mod prelude {
    pub use crate::generators::*;
    pub use crate::runner::{fuzz_config, FuzzConfig};
    pub use proptest::prelude::*;
}

// Re-export proptest for convenience
pub use proptest;
