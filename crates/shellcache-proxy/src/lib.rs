//! Shellcache Network Layer
//!
//! This crate provides the client for fetching assets over the network,
//! classifying responses relative to the application origin.

pub mod client;
pub mod error;

pub use client::{FetchedResponse, Fetcher, HttpFetcher, ResponseKind};
pub use error::FetchError;
