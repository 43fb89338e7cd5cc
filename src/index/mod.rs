//! Building, querying and checking the final index file.

pub mod builder;
pub mod reader;
pub mod verify;

pub use builder::{BuildStats, IndexBuilder};
pub use reader::{IndexReader, validate_key};
pub use verify::{VerifyReport, verify_index};
