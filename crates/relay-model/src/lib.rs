//! Wire-level types shared by the relay crates.
//!
//! Everything here is transport agnostic: the worker line protocol, the outcome
//! reports sent to the controller and the initial task payload.

mod domain;
pub use domain::*;
