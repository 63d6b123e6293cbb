//! API layer - REST and native client adapters

pub mod native;
pub mod rest;
