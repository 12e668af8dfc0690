//! Upload local files and directory trees to S3-compatible storage.
//!
//! The library is split into a configuration layer ([`config`]) and the
//! storage engine ([`s3`]): planning local paths into object keys, optional
//! cleanup of existing objects under a prefix, and sequential streaming
//! uploads with overwrite control.

pub mod config;
pub mod s3;
