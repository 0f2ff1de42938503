//! Core workflow engine for the BIMatch platform.
//!
//! Carries a professional's candidacy for a project from submission through
//! interview negotiation to a generated collaboration contract. Persistence,
//! authentication, and rendering stay behind narrow traits so the state
//! machines can be exercised in isolation.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
