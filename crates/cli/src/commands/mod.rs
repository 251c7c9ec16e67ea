//! CLI commands for the price tracking tools.

pub mod clone_table;
pub mod credentials;
pub mod fetch;
pub mod record;
pub mod rename_entity;

pub use clone_table::{run_clone_table, CloneTableArgs};
pub use credentials::{run_credentials, CredentialsArgs};
pub use fetch::{run_fetch, FetchArgs};
pub use record::{run_record, RecordArgs};
pub use rename_entity::{run_rename_entity, RenameEntityArgs};
