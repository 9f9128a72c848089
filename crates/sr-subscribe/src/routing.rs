//! sing-box client configuration.
//! sing-box 客户端配置生成。
//!
//! Field names and nesting follow the sing-box JSON schema; the struct field order is the
//! serialization order. Records are expected in rank order and become `server-1..N`.

use serde::{Deserialize, Serialize};
use sr_types::CandidateRecord;

pub const DEFAULT_LISTEN: &str = "127.0.0.1";
pub const DEFAULT_LISTEN_PORT: u16 = 2080;
pub const DEFAULT_TEST_URL: &str = "https://www.gstatic.com/generate_204";
pub const DEFAULT_TEST_INTERVAL: &str = "5m0s";

const GEOIP_URL: &str = "https://github.com/SagerNet/sing-geoip/releases/latest/download/geoip.db";
const GEOSITE_URL: &str =
    "https://github.com/SagerNet/sing-geosite/releases/latest/download/geosite.db";

/// Knobs for [`to_routing_config`]; defaults produce the stock client profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingOptions {
    /// Local mixed (HTTP + SOCKS) inbound address.
    pub listen: String,
    pub listen_port: u16,
    /// Probe URL of the `auto` urltest group.
    pub test_url: String,
    /// urltest interval in Go duration syntax.
    pub interval: String,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            test_url: DEFAULT_TEST_URL.to_string(),
            interval: DEFAULT_TEST_INTERVAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub dns: DnsConfig,
    pub inbounds: Vec<Inbound>,
    pub outbounds: Vec<Outbound>,
    pub route: RouteConfig,
    pub experimental: Experimental,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    pub servers: Vec<DnsServer>,
    pub rules: Vec<serde_json::Value>,
    #[serde(rename = "final")]
    pub final_server: String,
    pub independent_cache: bool,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsServer {
    pub address: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbound {
    #[serde(rename = "type")]
    pub kind: String,
    pub tag: String,
    pub listen: String,
    pub listen_port: u16,
}

/// Outbound entries, discriminated by sing-box's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    Selector {
        tag: String,
        outbounds: Vec<String>,
    },
    Urltest {
        tag: String,
        outbounds: Vec<String>,
        url: String,
        interval: String,
        interrupt_exist_connections: bool,
    },
    Shadowsocks {
        tag: String,
        server: String,
        server_port: u16,
        method: String,
        password: String,
    },
    Direct {
        tag: String,
    },
    Block {
        tag: String,
    },
}

impl Outbound {
    pub fn tag(&self) -> &str {
        match self {
            Outbound::Selector { tag, .. }
            | Outbound::Urltest { tag, .. }
            | Outbound::Shadowsocks { tag, .. }
            | Outbound::Direct { tag }
            | Outbound::Block { tag } => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub rules: Vec<RouteRule>,
    pub geoip: GeoResource,
    pub geosite: GeoResource,
    pub default_interface: String,
    pub auto_detect_interface: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub protocol: String,
    pub outbound: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoResource {
    pub download_url: String,
    pub download_detour: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experimental {
    pub cache_file: CacheFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFile {
    pub enabled: bool,
    pub path: String,
}

/// Build the client config for `records` (rank order).
pub fn to_routing_config(records: &[CandidateRecord], options: &RoutingOptions) -> RoutingConfig {
    let server_tags: Vec<String> = (1..=records.len()).map(|i| format!("server-{i}")).collect();

    let mut outbounds = Vec::with_capacity(records.len() + 4);
    outbounds.push(Outbound::Selector {
        tag: "proxy".into(),
        outbounds: std::iter::once("auto".to_string())
            .chain(server_tags.iter().cloned())
            .collect(),
    });
    outbounds.push(Outbound::Urltest {
        tag: "auto".into(),
        outbounds: server_tags.clone(),
        url: options.test_url.clone(),
        interval: options.interval.clone(),
        interrupt_exist_connections: false,
    });
    outbounds.extend(
        records
            .iter()
            .zip(server_tags)
            .map(|(record, tag)| Outbound::Shadowsocks {
                tag,
                server: record.host.clone(),
                server_port: record.port,
                method: record.method.clone(),
                password: record.secret.clone(),
            }),
    );
    outbounds.push(Outbound::Direct {
        tag: "direct".into(),
    });
    outbounds.push(Outbound::Block {
        tag: "block".into(),
    });

    RoutingConfig {
        dns: DnsConfig {
            servers: vec![
                DnsServer {
                    address: "1.1.1.1".into(),
                    tag: "dns-1".into(),
                    detour: Some("direct".into()),
                },
                DnsServer {
                    address: "8.8.8.8".into(),
                    tag: "dns-2".into(),
                    detour: None,
                },
            ],
            rules: Vec::new(),
            final_server: "dns-1".into(),
            independent_cache: true,
            strategy: "ipv4_only".into(),
        },
        inbounds: vec![Inbound {
            kind: "mixed".into(),
            tag: "mixed-in".into(),
            listen: options.listen.clone(),
            listen_port: options.listen_port,
        }],
        outbounds,
        route: RouteConfig {
            rules: vec![RouteRule {
                protocol: "dns".into(),
                outbound: "dns-1".into(),
            }],
            geoip: GeoResource {
                download_url: GEOIP_URL.into(),
                download_detour: "direct".into(),
            },
            geosite: GeoResource {
                download_url: GEOSITE_URL.into(),
                download_detour: "direct".into(),
            },
            default_interface: "auto".into(),
            auto_detect_interface: true,
        },
        experimental: Experimental {
            cache_file: CacheFile {
                enabled: true,
                path: "./cache.db".into(),
            },
        },
    }
}
