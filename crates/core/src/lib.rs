//! Domain model and pure transformations for the brief client.
//!
//! Holds the wire types exchanged with the job service, the form
//! extractor that turns raw submission input into a [`BriefRequest`],
//! and the formatter/renderer pair that turns a completed job's result
//! payload into display fragments. Nothing here performs I/O.

pub mod brief;
pub mod error;
pub mod format;
pub mod job;
pub mod render;
pub mod sections;
pub mod types;

pub use brief::{extract, BriefRequest, RawForm};
pub use error::CoreError;
pub use format::format_value;
pub use job::{JobStatus, StatusCategory, StatusResponse, SubmissionAck, SubmitResponse};
pub use render::{attach_copy_affordances, render, Block, Fragment};
pub use sections::{JobResult, ResultSection, SectionKind};
