//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the AirGuard node: session
//! lifecycle, change-gated telemetry, and alarm actuation. All interaction
//! with hardware and the broker happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals
//! or a live broker.

pub mod agent;
pub mod commands;
pub mod events;
pub mod ports;
pub mod session;
pub mod topics;
