//! Session token handling and credential verification.

pub mod model;
pub mod service;
