use crate::config::RuleProvider;
use crate::generate::names::{
    DEFAULT_SELECTOR, DIRECT, DOMESTIC, DOWNLOADS, OTHER_FOREIGN, OTHER_NODES, REJECT,
};
use crate::generate::region::Classification;
use crate::generate::service::{ServiceDef, LOW_PRIORITY_SERVICES, SERVICES};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const GROUP_TEST_URL: &str = "http://www.gstatic.com/generate_204";
const DOMESTIC_TEST_URL: &str = "https://wifi.vivo.com.cn/generate_204";
const GROUP_INTERVAL: u32 = 300;
const GROUP_TIMEOUT: u32 = 3000;
const URL_TEST_TOLERANCE: u32 = 50;

const ICON_PROXY: &str =
    "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Proxy.png";
const ICON_WORLD_MAP: &str =
    "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/World_Map.png";
const ICON_DOWNLOAD: &str =
    "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Download.png";
const ICON_STREAMING: &str =
    "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Streaming!CN.png";
const ICON_STREAMING_CN: &str =
    "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/StreamingCN.png";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    #[serde(rename = "select")]
    Selector,
    #[serde(rename = "url-test")]
    UrlTest,
}

/// One emitted policy group. Member order is preserved for UI display.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PolicyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub proxies: Vec<String>,
    pub url: String,
    pub interval: u32,
    pub timeout: u32,
    pub lazy: bool,
    #[serde(rename = "max-failed-times")]
    pub max_failed_times: u32,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    pub icon: String,
}

impl PolicyGroup {
    fn base(name: &str, kind: GroupKind, proxies: Vec<String>, icon: &str) -> PolicyGroup {
        PolicyGroup {
            name: name.to_string(),
            kind,
            proxies,
            url: GROUP_TEST_URL.to_string(),
            interval: GROUP_INTERVAL,
            timeout: GROUP_TIMEOUT,
            lazy: true,
            max_failed_times: 3,
            hidden: false,
            tolerance: None,
            icon: icon.to_string(),
        }
    }

    pub fn selector(name: &str, proxies: Vec<String>, icon: &str) -> PolicyGroup {
        Self::base(name, GroupKind::Selector, proxies, icon)
    }

    pub fn url_test(name: &str, proxies: Vec<String>, icon: &str) -> PolicyGroup {
        let mut g = Self::base(name, GroupKind::UrlTest, proxies, icon);
        g.tolerance = Some(URL_TEST_TOLERANCE);
        g
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Member list for one enabled service's selector group.
fn service_members(svc: &ServiceDef, region_names: &[String]) -> Vec<String> {
    if svc.reject {
        owned(&[REJECT, DIRECT, DEFAULT_SELECTOR])
    } else if LOW_PRIORITY_SERVICES.contains(&svc.key) {
        let mut members = owned(&[DEFAULT_SELECTOR, DIRECT]);
        members.extend_from_slice(region_names);
        members
    } else {
        let mut members = vec![DEFAULT_SELECTOR.to_string()];
        members.extend_from_slice(region_names);
        members.push(DIRECT.to_string());
        members
    }
}

/// Builds the full ordered `proxy-groups` list: functional groups (default
/// selector first, then one per enabled service), the three fallback groups,
/// then the region groups with the catch-all "other" group last. Region
/// groups exist only for non-empty buckets, so no member list can reference
/// an absent group. Each enabled service's rule-set references are registered
/// into `providers` exactly once.
pub fn build_groups(
    classification: &Classification,
    enabled: &HashSet<&'static str>,
    providers: &mut LinkedHashMap<String, RuleProvider>,
) -> Vec<PolicyGroup> {
    let mut region_groups: Vec<PolicyGroup> = classification
        .buckets
        .iter()
        .filter(|(_, bucket)| !bucket.is_empty())
        .map(|(region, bucket)| PolicyGroup::url_test(region.name, bucket.clone(), region.icon))
        .collect();
    let region_names: Vec<String> = region_groups.iter().map(|g| g.name.clone()).collect();

    if !classification.other.is_empty() {
        region_groups.push(PolicyGroup::selector(
            OTHER_NODES,
            classification.other.clone(),
            ICON_WORLD_MAP,
        ));
    }

    let mut groups = Vec::new();

    let mut default_members = region_names.clone();
    if !classification.other.is_empty() {
        default_members.push(OTHER_NODES.to_string());
    }
    default_members.push(DIRECT.to_string());
    groups.push(PolicyGroup::selector(
        DEFAULT_SELECTOR,
        default_members,
        ICON_PROXY,
    ));

    for svc in SERVICES {
        if !enabled.contains(svc.key) {
            continue;
        }
        for p in svc.providers {
            providers.insert(
                p.key.to_string(),
                RuleProvider::http(p.url, p.path, p.format, p.behavior),
            );
        }
        let mut group = PolicyGroup::selector(svc.name, service_members(svc, &region_names), svc.icon);
        if let Some(url) = svc.test_url {
            group.url = url.to_string();
        }
        groups.push(group);
    }

    let mut downloads = owned(&[DIRECT, REJECT, DEFAULT_SELECTOR, DOMESTIC]);
    downloads.extend_from_slice(&region_names);
    groups.push(PolicyGroup::selector(DOWNLOADS, downloads, ICON_DOWNLOAD));

    let mut other_foreign = owned(&[DEFAULT_SELECTOR, DOMESTIC]);
    other_foreign.extend_from_slice(&region_names);
    groups.push(PolicyGroup::selector(
        OTHER_FOREIGN,
        other_foreign,
        ICON_STREAMING,
    ));

    let mut domestic = owned(&[DIRECT, DEFAULT_SELECTOR]);
    domestic.extend_from_slice(&region_names);
    let mut domestic_group = PolicyGroup::selector(DOMESTIC, domestic, ICON_STREAMING_CN);
    domestic_group.url = DOMESTIC_TEST_URL.to_string();
    groups.push(domestic_group);

    groups.extend(region_groups);
    groups
}
