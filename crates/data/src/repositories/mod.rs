//! Database repositories for tracked entities.

pub mod timestamp_repo;

pub use timestamp_repo::TimestampRepository;
