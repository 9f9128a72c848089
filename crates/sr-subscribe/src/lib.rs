//! sr-subscribe: output formats for a ranked candidate subset.
//! sr-subscribe：将排序后的候选集合渲染为各种输出格式。
//!
//! - `descriptor`: single `ss://` connection links (and their inverse)
//! - `subscription`: newline-joined link lists, plain, base64 or Hiddify-annotated
//! - `routing`: a complete sing-box client config with selector + urltest groups
//!
//! Every function here is pure over its input order and content. The only time-dependent
//! value (the Hiddify `last update on` line) is passed in by the caller.

pub mod descriptor;
pub mod routing;
pub mod subscription;

pub use descriptor::{parse_connection_descriptor, to_connection_descriptor, DEFAULT_LABEL};
pub use routing::{to_routing_config, RoutingConfig, RoutingOptions};
pub use subscription::{
    format_timestamp, to_encoded_subscription, to_subscription_text, SubscriptionMetadata,
    SubscriptionOptions,
};
