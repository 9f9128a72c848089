//! sr-types: cross-crate stable contracts (candidate records, probe outcomes, error taxonomy).
//! sr-types：跨 crate 的稳定契约（候选记录、探测结果、错误分类）。
//!
//! Every stage of the discovery pipeline speaks in these types, so the formatter crate can
//! stay free of any I/O dependency and the core crate can stay free of any output concern.

pub mod candidate;
pub mod errors;
pub mod probe;

pub use candidate::{CandidateRecord, EndpointKey};
pub use errors::{ErrorClass, FetchError};
pub use probe::{ProbeOutcome, ProbeResult};
