//! Coop door controller library.
//!
//! Exposes the control logic and adapters for the binary and for host
//! integration tests.  Real GPIO access is behind the `rpi` feature; without
//! it the simulation backend is compiled in.

#![deny(unused_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod door;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod schedule;
pub mod shutdown;
pub mod trend;

pub mod adapters;
pub mod drivers;
pub mod sensors;
