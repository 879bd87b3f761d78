//! Target incubation parameters, managed by administrators.

pub mod controller;
pub mod router;
pub mod service;
