//! Runtime detection and host side effects
//!
//! This module provides:
//! - Node.js / Yarn / npm detection
//! - The `Toolchain` seam used to run package managers and resolve hosts

pub mod check;
pub mod toolchain;

pub use check::{check_node, check_npm, check_yarn, parse_version, RuntimeInfo};
pub use toolchain::{ExternalCommand, SystemToolchain, Toolchain};
