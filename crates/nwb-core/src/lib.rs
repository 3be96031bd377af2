//! # nwb-core
//!
//! Metadata resolution for the NWB subject export step.
//!
//! This crate holds the pure part of the pipeline, with no I/O:
//! - Raw metadata records ([`metadata`]) as read from disk or the remote store
//! - Date/timezone reconciliation and age text ([`dates`])
//! - Asset-name fingerprinting for remote lookups ([`asset`])
//! - Session and subject builders ([`session`], [`subject`])
//! - Storage backend selection ([`backend`])

pub mod asset;
pub mod backend;
pub mod dates;
pub mod errors;
pub mod metadata;
pub mod session;
pub mod subject;

pub use backend::Backend;
pub use chrono_tz::Tz;
pub use errors::CoreError;
pub use metadata::{MetadataBundle, SessionDescription, SubjectMetadata};
pub use session::ResolvedSession;
pub use subject::ResolvedSubject;
