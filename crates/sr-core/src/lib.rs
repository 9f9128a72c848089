//! Discovery-and-ranking pipeline
//!
//! # Strategic Workflow / 战略工作流
//! `Source` -> `Locale filter` -> `Dedupe` -> `Probe (bounded, concurrent)` -> `Rank`
//! `来源` -> `地区过滤` -> `去重` -> `探测（有界并发）` -> `排序`
//!
//! Only the source fetch can fail the run ([`sr_types::FetchError`]). Every other stage
//! degrades to a smaller or empty sequence, so callers distinguish "nothing matched" and
//! "nothing reachable" by inspecting the [`discover::DiscoveryReport`] counters.
//!
//! ## Key Modules / 关键模块
//! - [`source`]: remote directory adapter and payload validation.
//! - [`locale`]: locale token matching with a configurable alias table.
//! - [`probe`]: TCP reachability probing with a concurrency cap.
//! - [`rank`]: stable latency ordering.
//! - [`cache`]: optional TTL cache for the last successful fetch.

pub mod cache;
pub mod countries;
pub mod dedupe;
pub mod discover;
pub mod locale;
pub mod probe;
pub mod rank;
pub mod source;

pub use cache::{CachedSource, FetchCache};
pub use countries::unique_countries;
pub use dedupe::dedupe;
pub use discover::{Discovery, DiscoveryReport};
pub use locale::{filter_by_locale, LocaleTable};
pub use probe::{probe_all, ProbePolicy, Prober, TcpProber};
pub use rank::{rank, RankedSet};
pub use source::{parse_candidates, CandidateSource, HttpSource, StaticSource};
