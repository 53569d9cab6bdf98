use crate::config::{ProviderBehavior, ProviderFormat, RuleProvider};
use crate::generate::service::SERVICES;
use linked_hash_map::LinkedHashMap;
use std::collections::HashSet;

/// Fixed head of the rule table. Process-name bypasses for remote-desktop and
/// tunnel tooling must precede every domain or geo rule so that local tooling
/// escapes routing policy no matter what later rules would match.
pub const PREFIX_RULES: &[&str] = &[
    "RULE-SET,applications,下载软件",
    "PROCESS-NAME-REGEX,(?i).*Oray.*,直连",
    "PROCESS-NAME-REGEX,(?i).*Sunlogin.*,直连",
    "PROCESS-NAME-REGEX,(?i).*AweSun.*,直连",
    "PROCESS-NAME-REGEX,(?i).*NodeBaby.*,直连",
    "PROCESS-NAME-REGEX,(?i).*Node Baby.*,直连",
    "PROCESS-NAME-REGEX,(?i).*nblink.*,直连",
    "PROCESS-NAME-REGEX,(?i).*vpn.*,直连",
    "PROCESS-NAME-REGEX,(?i).*vnc.*,直连",
    "PROCESS-NAME-REGEX,(?i).*tvnserver.*,直连",
    "PROCESS-NAME-REGEX,(?i).*节点小宝.*,直连",
    "PROCESS-NAME-REGEX,(?i).*AnyDesk.*,直连",
    "PROCESS-NAME-REGEX,(?i).*ToDesk.*,直连",
    "PROCESS-NAME-REGEX,(?i).*RustDesk.*,直连",
    "PROCESS-NAME-REGEX,(?i).*TeamViewer.*,直连",
    "PROCESS-NAME-REGEX,(?i).*Zerotier.*,直连",
    "PROCESS-NAME-REGEX,(?i).*Tailscaled.*,直连",
    "PROCESS-NAME-REGEX,(?i).*phddns.*,直连",
    "PROCESS-NAME-REGEX,(?i).*ngrok.*,直连",
    "PROCESS-NAME-REGEX,(?i).*frpc.*,直连",
    "PROCESS-NAME-REGEX,(?i).*frps.*,直连",
    "PROCESS-NAME-REGEX,(?i).*natapp.*,直连",
    "PROCESS-NAME-REGEX,(?i).*cloudflared.*,直连",
    "PROCESS-NAME-REGEX,(?i).*xmqtunnel.*,直连",
    "PROCESS-NAME-REGEX,(?i).*Navicat.*,直连",
    "DOMAIN-SUFFIX,iepose.com,直连",
    "DOMAIN-SUFFIX,iepose.cn,直连",
    "DOMAIN-SUFFIX,nblink.cc,直连",
    "DOMAIN-SUFFIX,ionewu.com,直连",
    "DOMAIN-SUFFIX,vicp.net,直连",
];

/// Fixed tail: private-network bypass, domestic geo rules, then the
/// unconditional catch-all. Nothing after `MATCH` is reachable.
pub const SUFFIX_RULES: &[&str] = &[
    "GEOSITE,private,直连",
    "GEOSITE,category-public-tracker,直连",
    "GEOSITE,category-game-platforms-download@cn,直连",
    "GEOIP,private,直连,no-resolve",
    "GEOSITE,cn,国内网站",
    "GEOIP,cn,国内网站,no-resolve",
    "MATCH,其他外网",
];

/// The provider table every run starts from; the download rule in
/// [`PREFIX_RULES`] references it.
pub fn base_providers() -> LinkedHashMap<String, RuleProvider> {
    let mut providers = LinkedHashMap::new();
    providers.insert(
        "applications".to_string(),
        RuleProvider::http(
            "https://github.com/DustinWin/ruleset_geodata/raw/refs/heads/mihomo-ruleset/applications.list",
            "./ruleset/DustinWin/applications.list",
            ProviderFormat::Text,
            ProviderBehavior::Classical,
        ),
    );
    providers
}

/// Assembles the final ordered rule table: fixed prefix, then every enabled
/// service's clauses in table-declaration order, then the fixed suffix.
/// Evaluation by the host client is first-match-wins, so this order is
/// routing semantics, not cosmetics.
pub fn assemble(enabled: &HashSet<&'static str>) -> Vec<String> {
    let mut rules: Vec<String> = PREFIX_RULES.iter().map(|s| s.to_string()).collect();
    for svc in SERVICES {
        if enabled.contains(svc.key) {
            rules.extend(svc.rules.iter().map(|s| s.to_string()));
        }
    }
    rules.extend(SUFFIX_RULES.iter().map(|s| s.to_string()));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::service::resolve_enabled;

    #[test]
    fn catch_all_is_always_last() {
        for set in ["all", "openai;youtube", "doesnotexist", ""] {
            let rules = assemble(&resolve_enabled(set));
            assert_eq!(rules.last().map(String::as_str), Some("MATCH,其他外网"));
        }
    }

    #[test]
    fn three_part_structure() {
        let enabled = resolve_enabled("openai;youtube");
        let rules = assemble(&enabled);
        let clause_count: usize = SERVICES
            .iter()
            .filter(|s| enabled.contains(s.key))
            .map(|s| s.rules.len())
            .sum();
        assert_eq!(
            rules.len(),
            PREFIX_RULES.len() + clause_count + SUFFIX_RULES.len()
        );
        let prefix: Vec<String> = PREFIX_RULES.iter().map(|s| s.to_string()).collect();
        assert_eq!(&rules[..PREFIX_RULES.len()], prefix.as_slice());
        // openai clauses precede youtube clauses, as declared in the table
        let openai = rules.iter().position(|r| r.contains("category-ai-!cn")).unwrap();
        let youtube = rules
            .iter()
            .position(|r| r == "GEOSITE,youtube,YouTube")
            .unwrap();
        assert!(openai < youtube);
    }

    #[test]
    fn process_rules_precede_domain_and_geo_rules() {
        let rules = assemble(&resolve_enabled("all"));
        let last_process = rules
            .iter()
            .rposition(|r| r.starts_with("PROCESS-NAME-REGEX") && r.ends_with("直连"))
            .unwrap();
        let first_geo = rules.iter().position(|r| r.starts_with("GEOSITE")).unwrap();
        assert!(last_process < first_geo);
    }

    #[test]
    fn disabled_service_leaves_no_clause() {
        let rules = assemble(&resolve_enabled("openai"));
        assert!(!rules.iter().any(|r| r == "GEOSITE,youtube,YouTube"));
    }

    #[test]
    fn base_provider_table() {
        let providers = base_providers();
        assert_eq!(providers.len(), 1);
        assert!(providers.contains_key("applications"));
    }
}
