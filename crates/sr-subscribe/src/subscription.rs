//! Subscription blobs: newline-joined descriptors.
//! 订阅内容：按行拼接的连接链接。
//!
//! Three shapes are produced from the same ranked records:
//! - plain: one descriptor per line
//! - encoded: the plain list base64-encoded as a whole blob
//! - Hiddify: `//key: value` metadata lines, then descriptors whose labels carry a
//!   rank-position marker

use crate::descriptor::{descriptor_with_label, to_connection_descriptor, DEFAULT_LABEL};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use sr_types::CandidateRecord;

/// Markers for rank 0, 1, 2.
pub const RANK_MARKERS: [&str; 3] = ["⚪️", "🔴", "🟢"];
/// Marker for ranks past the table.
pub const FALLBACK_MARKER: &str = "⚪️";

/// Header lines understood by Hiddify-style clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionMetadata {
    /// Plain profile title; emitted base64-encoded.
    pub profile_title: String,
    /// Client refresh interval, in hours.
    pub update_interval: u32,
    pub upload: u64,
    pub download: u64,
    pub total: u64,
    pub expire: u64,
    pub web_page_url: String,
}

impl Default for SubscriptionMetadata {
    fn default() -> Self {
        Self {
            profile_title: "Freedom to Dream 🤍".to_string(),
            update_interval: 9,
            upload: 0,
            download: 0,
            total: 0,
            expire: 9_999_999_999,
            web_page_url: "https://github.com/hamiz-jafari/vpn".to_string(),
        }
    }
}

impl SubscriptionMetadata {
    fn header_lines(&self, timestamp: Option<&str>) -> Vec<String> {
        let mut lines = vec![
            format!(
                "//profile-title: base64:{}",
                STANDARD.encode(&self.profile_title)
            ),
            format!("//profile-update-interval: {}", self.update_interval),
            format!(
                "//subscription-userinfo: upload = {}; download = {}; total = {}; expire = {}",
                self.upload, self.download, self.total, self.expire
            ),
            format!("//profile-web-page-url: {}", self.web_page_url),
        ];
        if let Some(ts) = timestamp {
            lines.push(format!("//last update on: {ts}"));
        }
        lines
    }
}

/// How [`to_subscription_text`] renders its input. `Default` is the plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionOptions {
    /// Prepend metadata header lines.
    pub metadata: Option<SubscriptionMetadata>,
    /// Value of the `last update on` line; omitted when `None`.
    pub timestamp: Option<String>,
    /// Prefix each label with its rank-position marker.
    pub rank_markers: bool,
    /// Drop regional-indicator flag symbols from labels.
    pub strip_flags: bool,
    /// Base64-encode the finished text as one blob.
    pub base64: bool,
}

impl SubscriptionOptions {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn base64() -> Self {
        Self {
            base64: true,
            ..Self::default()
        }
    }

    /// The Hiddify profile: default metadata, markers, flags stripped.
    pub fn hiddify(timestamp: impl Into<String>) -> Self {
        Self {
            metadata: Some(SubscriptionMetadata::default()),
            timestamp: Some(timestamp.into()),
            rank_markers: true,
            strip_flags: true,
            base64: false,
        }
    }

    pub fn with_metadata(mut self, metadata: SubscriptionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Render `records` (already in rank order) as a subscription.
pub fn to_subscription_text(records: &[CandidateRecord], options: &SubscriptionOptions) -> String {
    let mut lines = options
        .metadata
        .as_ref()
        .map(|m| m.header_lines(options.timestamp.as_deref()))
        .unwrap_or_default();

    lines.extend(records.iter().enumerate().map(|(rank, record)| {
        if !options.rank_markers && !options.strip_flags {
            return to_connection_descriptor(record);
        }
        let mut label = if record.label.is_empty() {
            DEFAULT_LABEL.to_string()
        } else {
            record.label.clone()
        };
        if options.strip_flags {
            label = strip_flags(&label);
        }
        if options.rank_markers {
            label = format!("{} {}", rank_marker(rank), label);
        }
        descriptor_with_label(record, &label)
    }));

    let text = lines.join("\n");
    if options.base64 {
        STANDARD.encode(text)
    } else {
        text
    }
}

/// Plain descriptor list, base64-encoded as a whole.
pub fn to_encoded_subscription(records: &[CandidateRecord]) -> String {
    to_subscription_text(records, &SubscriptionOptions::base64())
}

/// Hiddify-style timestamp, e.g. `Mon 03:07 PM`.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%a %I:%M %p").to_string()
}

fn rank_marker(rank: usize) -> &'static str {
    RANK_MARKERS.get(rank).copied().unwrap_or(FALLBACK_MARKER)
}

fn strip_flags(label: &str) -> String {
    label
        .chars()
        .filter(|c| !('\u{1F1E6}'..='\u{1F1FF}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}
