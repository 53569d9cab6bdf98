use crate::config::FileError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const SKIP_IPS: &str = "10.0.0.0/8;100.64.0.0/10;127.0.0.0/8;169.254.0.0/16;172.16.0.0/12;192.168.0.0/16;198.18.0.0/16;FC00::/7;FE80::/10;::1/128";

pub const CHINA_DOH: &str = "https://doh.pub/dns-query;https://dns.alidns.com/dns-query";
pub const FOREIGN_DOH: &str = "https://dns.google/dns-query;https://dns.adguard-dns.com/dns-query";
pub const CHINA_IP: &str = "119.29.29.29;223.5.5.5";
pub const FOREIGN_IP: &str = "8.8.8.8;94.140.14.14";

/// Splits a `;`/`,`-delimited option value into trimmed, non-empty items.
pub fn split_list(val: &str) -> Vec<String> {
    val.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Caller-supplied overrides: the third layer of the option merge. Every
/// field is optional so that untouched options keep their default or preset
/// value. A misspelled key in the options file is an error, not a silently
/// dropped override.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OptionsOverride {
    pub enable: Option<bool>,
    pub rule_set: Option<String>,
    pub region_set: Option<String>,
    pub exclude_high_percentage: Option<bool>,
    pub global_ratio_limit: Option<f64>,
    pub skip_ips: Option<String>,
    #[serde(rename = "defaultDNS")]
    pub default_dns: Option<String>,
    #[serde(rename = "directDNS")]
    pub direct_dns: Option<String>,
    #[serde(rename = "chinaDNS")]
    pub china_dns: Option<String>,
    #[serde(rename = "foreignDNS")]
    pub foreign_dns: Option<String>,
    pub mode: Option<String>,
    pub ipv6: Option<bool>,
    pub log_level: Option<String>,
}

impl OptionsOverride {
    /// Lays `other` on top of `self`, field by field.
    pub fn overlay(mut self, other: OptionsOverride) -> OptionsOverride {
        macro_rules! take {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field;
                }
            };
        }
        take!(enable);
        take!(rule_set);
        take!(region_set);
        take!(exclude_high_percentage);
        take!(global_ratio_limit);
        take!(skip_ips);
        take!(default_dns);
        take!(direct_dns);
        take!(china_dns);
        take!(foreign_dns);
        take!(mode);
        take!(ipv6);
        take!(log_level);
        self
    }
}

/// Fully resolved options consumed by the pipeline. List-valued fields are
/// already split.
#[derive(Debug, Clone)]
pub struct Options {
    pub enable: bool,
    pub rule_set: String,
    pub region_set: String,
    pub exclude_high_percentage: bool,
    pub global_ratio_limit: f64,
    pub skip_ips: Vec<String>,
    pub default_dns: Vec<String>,
    pub direct_dns: Vec<String>,
    pub china_dns: Vec<String>,
    pub foreign_dns: Vec<String>,
    pub mode: String,
    pub ipv6: bool,
    pub log_level: String,
}

/// A named DNS-tier preset; `None` fields leave the previous layer untouched.
struct ModePreset {
    default_dns: Option<&'static str>,
    direct_dns: Option<&'static str>,
    china_dns: Option<&'static str>,
    foreign_dns: Option<&'static str>,
}

fn mode_preset(name: &str) -> Option<ModePreset> {
    match name {
        "securest" => Some(ModePreset {
            default_dns: Some(FOREIGN_IP),
            direct_dns: Some(FOREIGN_DOH),
            china_dns: None,
            foreign_dns: None,
        }),
        "secure" => Some(ModePreset {
            default_dns: Some(FOREIGN_IP),
            direct_dns: Some(CHINA_DOH),
            china_dns: Some(CHINA_DOH),
            foreign_dns: Some(FOREIGN_DOH),
        }),
        "default" => Some(ModePreset {
            default_dns: Some(CHINA_IP),
            direct_dns: Some(CHINA_IP),
            china_dns: Some(CHINA_DOH),
            foreign_dns: Some(FOREIGN_DOH),
        }),
        "fast" => Some(ModePreset {
            default_dns: Some(CHINA_IP),
            direct_dns: Some(CHINA_IP),
            china_dns: Some(CHINA_IP),
            foreign_dns: Some(CHINA_DOH),
        }),
        "fastest" => Some(ModePreset {
            default_dns: Some(CHINA_IP),
            direct_dns: Some(CHINA_IP),
            china_dns: Some(CHINA_IP),
            foreign_dns: Some(CHINA_IP),
        }),
        _ => None,
    }
}

impl Options {
    /// Three-layer merge: built-in defaults, then the named mode preset over
    /// the DNS-tier fields, then explicit caller overrides. An unrecognized
    /// mode name leaves the prior DNS-tier values untouched.
    pub fn resolve(overrides: &OptionsOverride) -> Options {
        let mode = overrides.mode.clone().unwrap_or_else(|| "fast".to_string());

        let mut default_dns = CHINA_IP.to_string();
        let mut direct_dns = CHINA_IP.to_string();
        let mut china_dns = CHINA_DOH.to_string();
        let mut foreign_dns = FOREIGN_DOH.to_string();

        if let Some(preset) = mode_preset(&mode) {
            if let Some(v) = preset.default_dns {
                default_dns = v.to_string();
            }
            if let Some(v) = preset.direct_dns {
                direct_dns = v.to_string();
            }
            if let Some(v) = preset.china_dns {
                china_dns = v.to_string();
            }
            if let Some(v) = preset.foreign_dns {
                foreign_dns = v.to_string();
            }
        }

        if let Some(v) = &overrides.default_dns {
            default_dns = v.clone();
        }
        if let Some(v) = &overrides.direct_dns {
            direct_dns = v.clone();
        }
        if let Some(v) = &overrides.china_dns {
            china_dns = v.clone();
        }
        if let Some(v) = &overrides.foreign_dns {
            foreign_dns = v.clone();
        }

        Options {
            enable: overrides.enable.unwrap_or(true),
            rule_set: overrides.rule_set.clone().unwrap_or_else(|| "all".to_string()),
            region_set: overrides
                .region_set
                .clone()
                .unwrap_or_else(|| "all".to_string()),
            exclude_high_percentage: overrides.exclude_high_percentage.unwrap_or(true),
            global_ratio_limit: overrides.global_ratio_limit.unwrap_or(2.0),
            skip_ips: split_list(overrides.skip_ips.as_deref().unwrap_or(SKIP_IPS)),
            default_dns: split_list(&default_dns),
            direct_dns: split_list(&direct_dns),
            china_dns: split_list(&china_dns),
            foreign_dns: split_list(&foreign_dns),
            mode,
            ipv6: overrides.ipv6.unwrap_or(true),
            log_level: overrides
                .log_level
                .clone()
                .unwrap_or_else(|| "error".to_string()),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::resolve(&OptionsOverride::default())
    }
}

pub fn load_options(path: &Path) -> Result<OptionsOverride, FileError> {
    let text = fs::read_to_string(path)
        .map_err(|e| FileError::Io(path.to_string_lossy().to_string(), e))?;
    serde_yaml::from_str(&text).map_err(|e| FileError::Serde(path.to_string_lossy().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_accepts_both_delimiters() {
        assert_eq!(
            split_list("openai; youtube,ads;"),
            vec!["openai", "youtube", "ads"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn defaults_follow_fast_mode() {
        let opts = Options::default();
        assert_eq!(opts.mode, "fast");
        assert_eq!(opts.china_dns, split_list(CHINA_IP));
        assert_eq!(opts.foreign_dns, split_list(CHINA_DOH));
        assert!(opts.enable);
        assert_eq!(opts.global_ratio_limit, 2.0);
    }

    #[test]
    fn explicit_override_beats_preset() {
        let overrides = OptionsOverride {
            mode: Some("securest".to_string()),
            default_dns: Some("1.1.1.1".to_string()),
            ..Default::default()
        };
        let opts = Options::resolve(&overrides);
        // preset applied where not explicitly overridden
        assert_eq!(opts.direct_dns, split_list(FOREIGN_DOH));
        // explicit value wins over the preset
        assert_eq!(opts.default_dns, vec!["1.1.1.1"]);
    }

    #[test]
    fn unknown_mode_leaves_dns_tiers_untouched() {
        let overrides = OptionsOverride {
            mode: Some("warp-speed".to_string()),
            ..Default::default()
        };
        let opts = Options::resolve(&overrides);
        assert_eq!(opts.china_dns, split_list(CHINA_DOH));
        assert_eq!(opts.foreign_dns, split_list(FOREIGN_DOH));
    }

    #[test]
    fn overlay_prefers_later_layer() {
        let file = OptionsOverride {
            rule_set: Some("openai".to_string()),
            mode: Some("secure".to_string()),
            ..Default::default()
        };
        let flags = OptionsOverride {
            rule_set: Some("youtube".to_string()),
            ..Default::default()
        };
        let merged = file.overlay(flags);
        assert_eq!(merged.rule_set.as_deref(), Some("youtube"));
        assert_eq!(merged.mode.as_deref(), Some("secure"));
    }
}
