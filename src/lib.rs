//! Trace-driven front end for the `vm_manager` simulator.

pub mod driver;
pub mod trace;
