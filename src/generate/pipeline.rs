use crate::config::{ConfigError, Options, RawClashConfig, RawProxyNode};
use crate::generate::names::{DIRECT, REJECT_NODE};
use crate::generate::region::{classify, enabled_regions};
use crate::generate::rules::{assemble, base_providers};
use crate::generate::service::resolve_enabled;
use crate::generate::{groups, statics};

/// Drives the whole pipeline over one configuration. Every accumulator (rule
/// list, provider table, buckets) is allocated inside this call, so repeated
/// invocations in one process are independent and reproducible.
pub fn run(mut cfg: RawClashConfig, opts: &Options) -> Result<RawClashConfig, ConfigError> {
    if !opts.enable {
        return Ok(cfg);
    }
    if !cfg.has_proxy_source() {
        return Err(ConfigError::NoProxySource);
    }

    statics::apply(&mut cfg, opts)?;

    cfg.proxies.push(RawProxyNode::synthetic(DIRECT, "direct"));
    cfg.proxies.push(RawProxyNode::synthetic(REJECT_NODE, "reject"));

    let regions = enabled_regions(&opts.region_set);
    let classification = classify(
        &cfg.proxies,
        &regions,
        opts.exclude_high_percentage,
        opts.global_ratio_limit,
    );
    tracing::debug!(
        "classified {} proxies into {} buckets ({} unmatched)",
        cfg.proxies.len(),
        classification.buckets.len(),
        classification.other.len()
    );

    let enabled = resolve_enabled(&opts.rule_set);
    let mut providers = base_providers();
    let group_list = groups::build_groups(&classification, &enabled, &mut providers);
    let rule_table = assemble(&enabled);
    tracing::info!(
        "generated {} policy groups, {} rules, {} rule providers",
        group_list.len(),
        rule_table.len(),
        providers.len()
    );

    cfg.insert_section("proxy-groups", &group_list)?;
    cfg.insert_section("rules", &rule_table)?;
    cfg.insert_section("rule-providers", &providers)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionsOverride;

    fn base_config(proxy_names: &[&str]) -> RawClashConfig {
        RawClashConfig {
            proxies: proxy_names
                .iter()
                .map(|n| RawProxyNode {
                    name: n.to_string(),
                    extra: serde_yaml::Mapping::new(),
                })
                .collect(),
            proxy_providers: None,
            extra: serde_yaml::Mapping::new(),
        }
    }

    fn section<'a>(cfg: &'a RawClashConfig, key: &str) -> &'a serde_yaml::Value {
        cfg.extra
            .get(key)
            .unwrap_or_else(|| panic!("section {key} missing"))
    }

    #[test]
    fn no_proxy_source_is_fatal() {
        let err = run(base_config(&[]), &Options::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoProxySource));
    }

    #[test]
    fn provider_only_config_is_accepted() {
        let mut cfg = base_config(&[]);
        let mut providers = linked_hash_map::LinkedHashMap::new();
        providers.insert(
            "sub1".to_string(),
            serde_yaml::Value::String("stub".to_string()),
        );
        cfg.proxy_providers = Some(providers);
        let out = run(cfg, &Options::default()).unwrap();
        // only the synthetic nodes exist; they end up in the unmatched bucket
        assert_eq!(out.proxies.len(), 2);
        assert!(section(&out, "proxy-groups").as_sequence().is_some());
    }

    #[test]
    fn disabled_pipeline_echoes_input() {
        let opts = Options::resolve(&OptionsOverride {
            enable: Some(false),
            ..Default::default()
        });
        let out = run(base_config(&[]), &opts).unwrap();
        assert!(out.extra.is_empty());
        assert!(out.proxies.is_empty());
    }

    #[test]
    fn synthetic_nodes_are_appended() {
        let out = run(base_config(&["HK-01"]), &Options::default()).unwrap();
        let names: Vec<&str> = out.proxies.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["HK-01", DIRECT, REJECT_NODE]);
    }

    #[test]
    fn all_output_sections_present() {
        let out = run(base_config(&["HK-01"]), &Options::default()).unwrap();
        for key in [
            "dns",
            "sniffer",
            "tun",
            "ntp",
            "profile",
            "geox-url",
            "proxy-groups",
            "rules",
            "rule-providers",
        ] {
            section(&out, key);
        }
        let rules = section(&out, "rules").as_sequence().unwrap();
        assert_eq!(
            rules.last().unwrap().as_str().unwrap(),
            "MATCH,其他外网"
        );
    }

    #[test]
    fn scenario_restricted_rule_set() {
        let opts = Options::resolve(&OptionsOverride {
            rule_set: Some("openai;youtube".to_string()),
            ..Default::default()
        });
        let out = run(base_config(&["HK-01", "US west"]), &opts).unwrap();
        let groups = section(&out, "proxy-groups").as_sequence().unwrap();
        let group_names: Vec<&str> = groups
            .iter()
            .map(|g| g.get("name").unwrap().as_str().unwrap())
            .collect();
        assert!(group_names.contains(&"国外AI"));
        assert!(group_names.contains(&"YouTube"));
        assert!(!group_names.contains(&"Spotify"));
        let rules = section(&out, "rules").as_sequence().unwrap();
        assert!(rules
            .iter()
            .any(|r| r.as_str() == Some("GEOSITE,youtube,YouTube")));
        assert!(!rules
            .iter()
            .any(|r| r.as_str() == Some("GEOSITE,spotify,Spotify")));
        // neither service pulls extra providers; only the base table remains
        let providers = section(&out, "rule-providers").as_mapping().unwrap();
        assert_eq!(providers.len(), 1);
        assert!(providers.get("applications").is_some());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let opts = Options::default();
        let a = run(base_config(&["HK-01", "JP 2x", "other"]), &opts).unwrap();
        let b = run(base_config(&["HK-01", "JP 2x", "other"]), &opts).unwrap();
        assert_eq!(
            serde_yaml::to_string(&a).unwrap(),
            serde_yaml::to_string(&b).unwrap()
        );
    }

    #[test]
    fn stale_input_sections_are_replaced() {
        let mut cfg = base_config(&["HK-01"]);
        cfg.extra.insert("rules".into(), "stale".into());
        let out = run(cfg, &Options::default()).unwrap();
        assert!(section(&out, "rules").as_sequence().is_some());
    }
}
