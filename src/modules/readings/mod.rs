//! Sensor readings: batch upload, listing and corrections.

pub mod controller;
pub mod router;
pub mod service;
