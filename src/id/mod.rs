//! Unique identifier generation.
//!
//! # Responsibilities
//! - Generate process-unique, time-ordered snowflake identifiers
//! - Guarantee uniqueness across processes with distinct node ids
//!
//! # Design Decisions
//! - Classic 41/10/12 bit split (millis, node, sequence)
//! - Counter state behind a mutex: the only runtime-mutable shared
//!   state in the core
//! - Sequence exhaustion within one millisecond waits for the clock
//!   rather than erroring

pub mod snowflake;

pub use snowflake::{SnowflakeError, SnowflakeGenerator};
