//! Core logic: types, settings, request bodies, cloud-config, reporting.

pub mod config;
pub mod files;
pub mod report;
pub mod request;
pub mod types;
pub mod userdata;
