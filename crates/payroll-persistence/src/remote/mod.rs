//! # Remote Module
//!
//! Client side of the authoritative master-data API.

pub mod client;

pub use client::{HttpMasterDataClient, MasterDataClient, RemoteConfig, RemoteEmployee, RemoteError};
