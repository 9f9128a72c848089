//! `ss://` connection descriptors.
//!
//! Format: `ss://<base64(method:secret)>@<host>:<port>#<percent-encoded label>`, with
//! standard padded base64 and the label escaped the way browsers' `encodeURIComponent`
//! does it, so links match byte for byte what existing clients already import.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sr_types::CandidateRecord;

/// Label used when a record carries none.
pub const DEFAULT_LABEL: &str = "VPN";

const SCHEME: &str = "ss://";

/// Encode one record as a connection link.
pub fn to_connection_descriptor(record: &CandidateRecord) -> String {
    let label = if record.label.is_empty() {
        DEFAULT_LABEL
    } else {
        record.label.as_str()
    };
    descriptor_with_label(record, label)
}

/// Same as [`to_connection_descriptor`] with the fragment replaced by `label`.
pub(crate) fn descriptor_with_label(record: &CandidateRecord, label: &str) -> String {
    let userinfo = STANDARD.encode(format!("{}:{}", record.method, record.secret));
    format!(
        "{SCHEME}{userinfo}@{}:{}#{}",
        record.host,
        record.port,
        encode_uri_component(label)
    )
}

/// Parse a link back into a record.
///
/// Accepts both base64 and plain `method:secret` userinfo. A missing fragment yields an
/// empty label. Returns `None` for anything that is not a well-formed `ss://` link.
pub fn parse_connection_descriptor(link: &str) -> Option<CandidateRecord> {
    let rest = link.trim().strip_prefix(SCHEME)?;

    let (main, label) = match rest.rfind('#') {
        Some(idx) => (
            &rest[..idx],
            urlencoding::decode(&rest[idx + 1..]).ok()?.into_owned(),
        ),
        None => (rest, String::new()),
    };

    let (userinfo, server) = main.rsplit_once('@')?;
    let credentials = if userinfo.contains(':') {
        userinfo.to_string()
    } else {
        let raw = STANDARD
            .decode(userinfo)
            .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(userinfo))
            .ok()?;
        String::from_utf8(raw).ok()?
    };
    let (method, secret) = credentials.split_once(':')?;

    let (host, port) = server.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    if host.is_empty() || port == 0 || method.is_empty() {
        return None;
    }

    Some(CandidateRecord::new(host, port, method, secret, label))
}

/// `encodeURIComponent`: like `urlencoding::encode`, but the marks `! ' ( ) *` stay literal.
fn encode_uri_component(input: &str) -> String {
    let encoded = urlencoding::encode(input);
    if !encoded.contains("%2") {
        return encoded.into_owned();
    }
    encoded
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}
