use crate::config::{ConfigError, FileError};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One proxy node from the subscription. Only the display name matters to the
/// pipeline; everything else is carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawProxyNode {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl RawProxyNode {
    /// A synthetic node of the given proxy type, e.g. `direct` or `reject`.
    pub fn synthetic(name: &str, proxy_type: &str) -> Self {
        let mut extra = serde_yaml::Mapping::new();
        extra.insert("type".into(), proxy_type.into());
        extra.insert("udp".into(), true.into());
        Self {
            name: name.to_string(),
            extra,
        }
    }
}

/// The base configuration object as handed over by the subscription converter.
/// Unknown keys survive a round trip through the flattened mapping; sections
/// produced by the pipeline are inserted into the same mapping, replacing any
/// stale value the input may have carried.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawClashConfig {
    #[serde(default)]
    pub proxies: Vec<RawProxyNode>,
    #[serde(
        rename = "proxy-providers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub proxy_providers: Option<LinkedHashMap<String, serde_yaml::Value>>,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl RawClashConfig {
    /// Whether any proxy source exists at all. Presence of a provider entry is
    /// enough; this tool never validates that the provider is reachable.
    pub fn has_proxy_source(&self) -> bool {
        !self.proxies.is_empty()
            || self
                .proxy_providers
                .as_ref()
                .is_some_and(|m| !m.is_empty())
    }

    pub fn insert_section<T: Serialize>(
        &mut self,
        key: &'static str,
        section: &T,
    ) -> Result<(), ConfigError> {
        let value = serde_yaml::to_value(section)?;
        self.extra.insert(key.into(), value);
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<RawClashConfig, FileError> {
    let text = fs::read_to_string(path)
        .map_err(|e| FileError::Io(path.to_string_lossy().to_string(), e))?;
    serde_yaml::from_str(&text).map_err(|e| FileError::Serde(path.to_string_lossy().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_survive_round_trip() {
        let text = "
mixed-port: 7890
proxies:
  - name: hk-01
    type: ss
    server: 1.2.3.4
secret: abc
";
        let cfg: RawClashConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(cfg.proxies.len(), 1);
        assert_eq!(cfg.proxies[0].name, "hk-01");
        let out = serde_yaml::to_string(&cfg).unwrap();
        assert!(out.contains("secret: abc"));
        assert!(out.contains("server: 1.2.3.4"));
    }

    #[test]
    fn provider_presence_counts_as_source() {
        let empty: RawClashConfig = serde_yaml::from_str("{}").unwrap();
        assert!(!empty.has_proxy_source());
        let with_provider: RawClashConfig = serde_yaml::from_str(
            "proxy-providers:\n  sub1:\n    type: http\n    url: https://example.com/sub\n",
        )
        .unwrap();
        assert!(with_provider.has_proxy_source());
    }
}
