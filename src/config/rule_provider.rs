use serde::{Deserialize, Serialize};

/// Interval between remote rule-set refreshes by the host client, in seconds.
pub const RULE_UPDATE_INTERVAL: u32 = 86400;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBehavior {
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "ipcidr")]
    IpCidr,
    #[serde(rename = "classical")]
    Classical,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFormat {
    #[serde(rename = "yaml")]
    Yaml,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "mrs")]
    Mrs,
}

/// An externally hosted rule-set reference, fetched by the host client at
/// runtime. This tool only writes the reference; it never fetches anything.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RuleProvider {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub behavior: ProviderBehavior,
    pub format: ProviderFormat,
    pub url: String,
    pub path: String,
    pub interval: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    #[serde(rename = "http")]
    Http,
}

impl RuleProvider {
    pub fn http(url: &str, path: &str, format: ProviderFormat, behavior: ProviderBehavior) -> Self {
        Self {
            kind: ProviderKind::Http,
            behavior,
            format,
            url: url.to_string(),
            path: path.to_string(),
            interval: RULE_UPDATE_INTERVAL,
        }
    }
}
