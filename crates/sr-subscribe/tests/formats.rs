use base64::{engine::general_purpose::STANDARD, Engine as _};
use sr_subscribe::routing::Outbound;
use sr_subscribe::{
    parse_connection_descriptor, to_connection_descriptor, to_encoded_subscription,
    to_routing_config, to_subscription_text, RoutingOptions, SubscriptionOptions,
};
use sr_types::CandidateRecord;

fn ranked() -> Vec<CandidateRecord> {
    vec![
        CandidateRecord::new("198.51.100.7", 8388, "aes-256-gcm", "p@ss:w0rd", "🇳🇱 Amsterdam, Netherlands"),
        CandidateRecord::new("vpn.example.org", 443, "chacha20-ietf-poly1305", "x", ""),
        CandidateRecord::new("2001:db8::1", 990, "aes-128-gcm", "y", "Frankfurt, DE #2"),
    ]
}

#[test]
fn every_subscription_line_parses_back_to_its_record() {
    let records = ranked();
    let text = to_subscription_text(&records, &SubscriptionOptions::plain());
    let parsed: Vec<_> = text
        .lines()
        .map(|l| parse_connection_descriptor(l).expect("valid link"))
        .collect();

    assert_eq!(parsed.len(), records.len());
    for (p, r) in parsed.iter().zip(&records) {
        assert_eq!(p.host, r.host);
        assert_eq!(p.port, r.port);
        assert_eq!(p.method, r.method);
        assert_eq!(p.secret, r.secret);
    }
    assert_eq!(parsed[0].label, records[0].label);
    assert_eq!(parsed[1].label, "VPN");
    assert_eq!(parsed[2].label, "Frankfurt, DE #2");
}

#[test]
fn encoded_subscription_decodes_to_descriptor_list() {
    let records = ranked();
    let decoded = String::from_utf8(STANDARD.decode(to_encoded_subscription(&records)).unwrap())
        .unwrap();
    let expected: Vec<_> = records.iter().map(to_connection_descriptor).collect();
    assert_eq!(decoded, expected.join("\n"));
}

#[test]
fn hiddify_keeps_links_importable() {
    let text = to_subscription_text(&ranked(), &SubscriptionOptions::hiddify("Fri 08:15 AM"));
    let (header, links): (Vec<_>, Vec<_>) = text.lines().partition(|l| l.starts_with("//"));
    assert_eq!(header.len(), 5);
    assert_eq!(links.len(), 3);
    let first = parse_connection_descriptor(links[0]).unwrap();
    assert_eq!(first.label, "⚪️ Amsterdam, Netherlands");
}

#[test]
fn routing_servers_mirror_ranked_records() {
    let records = ranked();
    let cfg = to_routing_config(&records, &RoutingOptions::default());
    let servers: Vec<_> = cfg
        .outbounds
        .iter()
        .filter_map(|o| match o {
            Outbound::Shadowsocks {
                tag,
                server,
                server_port,
                ..
            } => Some((tag.as_str(), server.as_str(), *server_port)),
            _ => None,
        })
        .collect();
    assert_eq!(
        servers,
        vec![
            ("server-1", "198.51.100.7", 8388),
            ("server-2", "vpn.example.org", 443),
            ("server-3", "2001:db8::1", 990),
        ]
    );
}

#[test]
fn routing_with_no_records_still_has_groups() {
    let cfg = to_routing_config(&[], &RoutingOptions::default());
    let tags: Vec<_> = cfg.outbounds.iter().map(Outbound::tag).collect();
    assert_eq!(tags, vec!["proxy", "auto", "direct", "block"]);
}
