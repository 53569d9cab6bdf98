//! Static infrastructure sections merged into the output configuration:
//! DNS, sniffer, TUN, NTP, profile and geo-data source URLs, plus the
//! unconditional general settings. All of this is data assignment; the only
//! inputs are the resolved DNS tiers and address lists from [`Options`].

use crate::config::{ConfigError, Options, RawClashConfig};
use linked_hash_map::LinkedHashMap;
use serde::Serialize;

const EXTERNAL_CONTROLLER: &str = "0.0.0.0:1906";
const MIXED_PORT: u16 = 7890;
const KEEP_ALIVE_INTERVAL: u32 = 30;
const GEO_UPDATE_INTERVAL: u32 = 24;
const GSO_MAX_SIZE: u32 = 65536;
const TUN_MTU: u32 = 9000;
const FAKE_IP_RANGE: &str = "198.18.0.0/16";

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DnsSection {
    pub enable: bool,
    pub listen: &'static str,
    pub ipv6: bool,
    pub log_level: String,
    pub prefer_h3: bool,
    pub use_hosts: bool,
    pub use_system_hosts: bool,
    pub enhanced_mode: &'static str,
    pub fake_ip_range: &'static str,
    pub fake_ip_filter_mode: &'static str,
    pub fake_ip_filter: Vec<&'static str>,
    pub nameserver: Vec<String>,
    pub default_nameserver: Vec<String>,
    pub proxy_server_nameserver: Vec<String>,
    pub fallback: Vec<String>,
    pub fallback_filter: FallbackFilter,
    pub cache_algorithm: &'static str,
    pub nameserver_policy: LinkedHashMap<&'static str, DnsPolicyTarget>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FallbackFilter {
    pub geoip: bool,
    pub geoip_code: &'static str,
    pub geosite: Vec<&'static str>,
    pub ipcidr: Vec<&'static str>,
    pub domain: Vec<&'static str>,
}

/// A nameserver-policy value: either a named resolver class or a server list.
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum DnsPolicyTarget {
    Named(&'static str),
    Servers(Vec<String>),
}

/// Fake-IP blacklist: domains that must resolve to real addresses (LAN,
/// captive-portal checks, NTP, STUN, music and game platforms).
const FAKE_IP_FILTER: &[&str] = &[
    "+.lan",
    "+.local",
    "localhost.ptlogin2.qq.com",
    "dns.msftncsi.com",
    "+.msftconnecttest.com",
    "+.msftncsi.com",
    "network-test.debian.org",
    "detectportal.firefox.com",
    "cable.auth.com",
    "captive.apple.com",
    "connectivitycheck.gstatic.com",
    "nmcheck.gnome.org",
    "+.10010.com",
    "ntp.*.com",
    "time.*.com",
    "time.*.gov",
    "time.*.edu.cn",
    "time.*.apple.com",
    "time1.*.com",
    "time2.*.com",
    "time3.*.com",
    "time4.*.com",
    "time5.*.com",
    "time6.*.com",
    "time7.*.com",
    "ntp1.*.com",
    "ntp2.*.com",
    "ntp3.*.com",
    "ntp4.*.com",
    "ntp5.*.com",
    "ntp6.*.com",
    "ntp7.*.com",
    "*.time.edu.cn",
    "*.ntp.org.cn",
    "+.pool.ntp.org",
    "time1.cloud.tencent.com",
    "stun.*.*",
    "stun.*.*.*",
    "+.stun.*.*",
    "+.stun.*.*.*",
    "+.stun.*.*.*.*",
    "+.stun.*.*.*.*.*",
    "music.163.com",
    "*.music.163.com",
    "*.126.net",
    "musicapi.taihe.com",
    "music.taihe.com",
    "songsearch.kugou.com",
    "trackercdn.kugou.com",
    "*.kuwo.cn",
    "api-jooxtt.sanook.com",
    "api.joox.com",
    "joox.com",
    "+.y.qq.com",
    "xbox.*.microsoft.com",
    "+.xboxlive.com",
    "+.battlenet.com.cn",
    "+.battlenet.com",
    "+.blzstatic.cn",
    "+.battle.net",
];

pub fn dns_section(opts: &Options) -> DnsSection {
    let china = DnsPolicyTarget::Servers(opts.china_dns.clone());
    let foreign = DnsPolicyTarget::Servers(opts.foreign_dns.clone());
    let mut policy = LinkedHashMap::new();
    policy.insert("geosite:private", DnsPolicyTarget::Named("system"));
    for key in [
        "geosite:cn",
        "geosite:tld-cn",
        "geosite:category-companies@cn",
        "geosite:steam@cn",
        "geosite:category-games@cn",
        "geosite:microsoft@cn",
        "geosite:apple@cn",
        "geosite:category-game-platforms-download@cn",
        "geosite:category-public-tracker",
    ] {
        policy.insert(key, china.clone());
    }
    for key in [
        "geosite:gfw",
        "geosite:category-ai-!cn",
        "geosite:category-ai-chat-!cn",
        "geosite:openai",
        "geosite:anthropic",
        "geosite:google@!cn",
        "geosite:github",
        "geosite:telegram",
        "geosite:twitter",
        "geosite:facebook",
        "geosite:youtube",
        "geosite:netflix",
        "geosite:disney",
        "+.openai.com",
        "+.anthropic.com",
        "+.github.com",
        "+.github.io",
        "+.githubusercontent.com",
    ] {
        policy.insert(key, foreign.clone());
    }

    DnsSection {
        enable: true,
        listen: "0.0.0.0:53",
        ipv6: true,
        log_level: opts.log_level.clone(),
        prefer_h3: true,
        use_hosts: true,
        use_system_hosts: true,
        enhanced_mode: "fake-ip",
        fake_ip_range: FAKE_IP_RANGE,
        fake_ip_filter_mode: "blacklist",
        fake_ip_filter: FAKE_IP_FILTER.to_vec(),
        nameserver: opts.china_dns.clone(),
        default_nameserver: opts.default_dns.clone(),
        proxy_server_nameserver: opts.direct_dns.clone(),
        fallback: opts.foreign_dns.clone(),
        fallback_filter: FallbackFilter {
            geoip: true,
            geoip_code: "CN",
            geosite: vec!["gfw"],
            ipcidr: vec!["240.0.0.0/4", "0.0.0.0/32"],
            domain: vec![
                "+.google.com",
                "+.facebook.com",
                "+.youtube.com",
                "+.twitter.com",
                "+.github.com",
            ],
        },
        cache_algorithm: "arc",
        nameserver_policy: policy,
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum PortEntry {
    Num(u16),
    Range(&'static str),
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SniffEntry {
    pub ports: Vec<PortEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_destination: Option<bool>,
}

#[derive(Serialize, Debug, Clone)]
pub struct SniffProtocols {
    #[serde(rename = "HTTP")]
    pub http: SniffEntry,
    #[serde(rename = "TLS")]
    pub tls: SniffEntry,
    #[serde(rename = "QUIC")]
    pub quic: SniffEntry,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SnifferSection {
    pub enable: bool,
    pub force_dns_mapping: bool,
    pub parse_pure_ip: bool,
    pub override_destination: bool,
    pub sniff: SniffProtocols,
    pub skip_src_address: Vec<String>,
    pub skip_dst_address: Vec<String>,
    pub force_domain: Vec<&'static str>,
    pub skip_domain: Vec<&'static str>,
    pub sniff_tls_sni: bool,
}

pub fn sniffer_section(opts: &Options) -> SnifferSection {
    SnifferSection {
        enable: true,
        force_dns_mapping: true,
        parse_pure_ip: true,
        override_destination: true,
        sniff: SniffProtocols {
            http: SniffEntry {
                ports: vec![PortEntry::Num(80), PortEntry::Range("8080-8880")],
                override_destination: Some(true),
            },
            tls: SniffEntry {
                ports: vec![PortEntry::Num(443), PortEntry::Num(8443)],
                override_destination: None,
            },
            quic: SniffEntry {
                ports: vec![PortEntry::Num(443), PortEntry::Num(8443)],
                override_destination: None,
            },
        },
        skip_src_address: opts.skip_ips.clone(),
        skip_dst_address: opts.skip_ips.clone(),
        force_domain: vec![
            "+.google.com",
            "+.googleapis.com",
            "+.googleusercontent.com",
            "+.googlevideo.com",
            "+.gstatic.com",
            "+.youtube.com",
            "+.ytimg.com",
            "+.twitter.com",
            "+.twimg.com",
            "+.facebook.com",
            "+.fbcdn.net",
            "+.messenger.com",
            "+.instagram.com",
            "+.whatsapp.com",
            "+.telegram.org",
            "+.github.com",
            "+.github.io",
            "+.githubusercontent.com",
            "+.netflix.com",
            "+.nflxvideo.net",
            "+.nflximg.net",
            "+.nflxso.net",
            "+.nflxext.com",
        ],
        skip_domain: vec![
            "Mijia Cloud",
            "+.oray.com",
            "+.sunlogin.net",
            "+.awesun.com",
            "+.parsec.app",
            "+.teamviewer.com",
            "+.anydesk.com",
            "+.todesk.com",
            "+.rustdesk.com",
            "captive.apple.com",
            "connectivitycheck.gstatic.com",
            "detectportal.firefox.com",
            "msftconnecttest.com",
            "nmcheck.gnome.org",
        ],
        sniff_tls_sni: true,
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TunSection {
    pub enable: bool,
    pub stack: &'static str,
    pub device: &'static str,
    pub auto_route: bool,
    pub auto_redirect: bool,
    pub auto_detect_interface: bool,
    pub strict_route: bool,
    pub mtu: u32,
    pub gso: bool,
    pub gso_max_size: u32,
    pub udp_timeout: u32,
    pub endpoint_independent_nat: bool,
    pub exclude_interface: Vec<&'static str>,
    pub route_exclude_address: Vec<String>,
    pub route_address: Vec<&'static str>,
    pub dns_hijack: Vec<&'static str>,
}

pub fn tun_section(opts: &Options) -> TunSection {
    TunSection {
        enable: true,
        stack: "mixed",
        device: "Meta",
        auto_route: true,
        auto_redirect: true,
        auto_detect_interface: true,
        strict_route: true,
        mtu: TUN_MTU,
        gso: true,
        gso_max_size: GSO_MAX_SIZE,
        udp_timeout: 300,
        endpoint_independent_nat: true,
        exclude_interface: vec!["NodeBabyLink", "VMware.*", "VirtualBox.*", "Hyper-V.*"],
        // the fake-ip range must stay routed through the TUN device
        route_exclude_address: opts
            .skip_ips
            .iter()
            .filter(|ip| ip.as_str() != FAKE_IP_RANGE)
            .cloned()
            .collect(),
        route_address: vec!["0.0.0.0/1", "128.0.0.0/1", "::/1", "8000::/1"],
        dns_hijack: vec!["any:53", "tcp://any:53"],
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct NtpSection {
    pub enable: bool,
    pub write_to_system: bool,
    pub server: &'static str,
    pub port: u16,
    pub interval: u32,
}

pub fn ntp_section() -> NtpSection {
    NtpSection {
        enable: true,
        write_to_system: false,
        server: "ntp.aliyun.com",
        port: 123,
        interval: 30,
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileSection {
    pub store_selected: bool,
    pub store_fake_ip: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct GeoxUrlSection {
    pub geoip: &'static str,
    pub geosite: &'static str,
    pub mmdb: &'static str,
    pub asn: &'static str,
}

pub fn geox_url_section() -> GeoxUrlSection {
    GeoxUrlSection {
        geoip: "https://cdn.jsdelivr.net/gh/MetaCubeX/meta-rules-dat@release/geoip-lite.dat",
        geosite: "https://cdn.jsdelivr.net/gh/MetaCubeX/meta-rules-dat@release/geosite.dat",
        mmdb: "https://cdn.jsdelivr.net/gh/MetaCubeX/meta-rules-dat@release/country.mmdb",
        asn: "https://cdn.jsdelivr.net/gh/MetaCubeX/meta-rules-dat@release/GeoLite2-ASN.mmdb",
    }
}

/// Writes the general scalar settings and every static section into the
/// configuration, replacing whatever the input carried under those keys.
pub fn apply(cfg: &mut RawClashConfig, opts: &Options) -> Result<(), ConfigError> {
    cfg.insert_section("allow-lan", &true)?;
    cfg.insert_section("bind-address", &"*")?;
    cfg.insert_section("mode", &"rule")?;
    cfg.insert_section("ipv6", &opts.ipv6)?;
    cfg.insert_section("external-controller", &EXTERNAL_CONTROLLER)?;
    cfg.insert_section("mixed-port", &MIXED_PORT)?;
    cfg.insert_section("external-ui", &"ui")?;
    cfg.insert_section(
        "external-ui-url",
        &"https://github.com/Zephyruso/zashboard/releases/latest/download/dist.zip",
    )?;
    cfg.insert_section("unified-delay", &true)?;
    cfg.insert_section("tcp-concurrent", &true)?;
    cfg.insert_section("keep-alive-interval", &KEEP_ALIVE_INTERVAL)?;
    cfg.insert_section("find-process-mode", &"strict")?;
    cfg.insert_section("geodata-mode", &false)?;
    cfg.insert_section("geodata-loader", &"memconservative")?;
    cfg.insert_section("geo-auto-update", &true)?;
    cfg.insert_section("geo-update-interval", &GEO_UPDATE_INTERVAL)?;

    cfg.insert_section("dns", &dns_section(opts))?;
    cfg.insert_section("profile", &ProfileSection {
        store_selected: true,
        store_fake_ip: true,
    })?;
    cfg.insert_section("sniffer", &sniffer_section(opts))?;
    cfg.insert_section("ntp", &ntp_section())?;
    cfg.insert_section("tun", &tun_section(opts))?;
    cfg.insert_section("geox-url", &geox_url_section())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_tiers_follow_options() {
        let opts = Options::default();
        let dns = dns_section(&opts);
        assert_eq!(dns.nameserver, opts.china_dns);
        assert_eq!(dns.default_nameserver, opts.default_dns);
        assert_eq!(dns.fallback, opts.foreign_dns);
        // first policy entry keeps the system resolver for private names
        let (first_key, first_val) = dns.nameserver_policy.iter().next().unwrap();
        assert_eq!(*first_key, "geosite:private");
        assert!(matches!(first_val, DnsPolicyTarget::Named("system")));
    }

    #[test]
    fn tun_keeps_fake_ip_range_routed() {
        let opts = Options::default();
        let tun = tun_section(&opts);
        assert!(opts.skip_ips.contains(&FAKE_IP_RANGE.to_string()));
        assert!(!tun.route_exclude_address.contains(&FAKE_IP_RANGE.to_string()));
        assert_eq!(tun.route_exclude_address.len(), opts.skip_ips.len() - 1);
    }

    #[test]
    fn sections_serialize_with_kebab_keys() {
        let opts = Options::default();
        let yaml = serde_yaml::to_string(&sniffer_section(&opts)).unwrap();
        assert!(yaml.contains("force-dns-mapping: true"));
        assert!(yaml.contains("sniff-tls-sni: true"));
        assert!(yaml.contains("8080-8880"));
        let yaml = serde_yaml::to_string(&dns_section(&opts)).unwrap();
        assert!(yaml.contains("enhanced-mode: fake-ip"));
        assert!(yaml.contains("cache-algorithm: arc"));
    }
}
