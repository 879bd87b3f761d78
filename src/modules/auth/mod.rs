//! Registration, login, logout and the current-user lookup.

pub mod controller;
pub mod router;
pub mod service;
