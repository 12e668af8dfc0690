pub mod client;
pub mod error;
pub mod key;
pub mod mime;
pub mod plan;
pub mod store;
pub mod transport;

pub use client::build_client;
pub use error::{CleanupError, SyncError};
pub use plan::{FilePlan, build_plans};
pub use store::{ObjectPage, ObjectSink, ObjectStore};
pub use transport::{Transport, UploadResult};
