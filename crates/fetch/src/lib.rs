//! Retrying HTTP fetcher for the price tracking tools.

pub mod client;
pub mod error;

pub use client::{FetchOutcome, FetchedPage, HttpFetcher, USER_AGENT};
pub use error::{AttemptFailure, FetchError, Result};
