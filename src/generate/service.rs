use crate::config::{split_list, ProviderBehavior, ProviderFormat};
use std::collections::HashSet;

/// A rule-set reference a service pulls in when enabled.
pub struct ServiceProviderDef {
    pub key: &'static str,
    pub url: &'static str,
    pub path: &'static str,
    pub format: ProviderFormat,
    pub behavior: ProviderBehavior,
}

/// One optional service: a selector group plus its routing clauses.
/// `SERVICES` declaration order is also emission order for both groups and
/// rule clauses.
pub struct ServiceDef {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub test_url: Option<&'static str>,
    pub rules: &'static [&'static str],
    pub providers: &'static [ServiceProviderDef],
    pub reject: bool,
}

impl ServiceDef {
    const fn plain(
        key: &'static str,
        name: &'static str,
        icon: &'static str,
        rules: &'static [&'static str],
    ) -> ServiceDef {
        ServiceDef {
            key,
            name,
            icon,
            test_url: Some(GENERATE_204),
            rules,
            providers: &[],
            reject: false,
        }
    }
}

const GENERATE_204: &str = "http://www.gstatic.com/generate_204";

/// Services whose selector offers the direct option before the region
/// groups; low-priority entertainment only.
pub const LOW_PRIORITY_SERVICES: &[&str] = &["biliintl", "bahamut"];

/// Every key the `ruleSet` option recognizes. `tvb` has a toggle but no
/// service definition upstream; enabling it is inert.
const TOGGLE_KEYS: &[&str] = &[
    "apple",
    "microsoft",
    "github",
    "google",
    "openai",
    "spotify",
    "youtube",
    "bahamut",
    "netflix",
    "tiktok",
    "disney",
    "pixiv",
    "hbo",
    "mediaHMT",
    "bilibili",
    "tvb",
    "hulu",
    "primevideo",
    "telegram",
    "line",
    "whatsapp",
    "games",
    "japan",
    "ads",
];

/// Resolves the `ruleSet` option into the set of enabled service keys.
/// Unrecognized keys are dropped silently.
pub fn resolve_enabled(rule_set: &str) -> HashSet<&'static str> {
    if rule_set == "all" {
        TOGGLE_KEYS.iter().copied().collect()
    } else {
        split_list(rule_set)
            .into_iter()
            .filter_map(|key| TOGGLE_KEYS.iter().find(|t| **t == key).copied())
            .collect()
    }
}

pub static SERVICES: &[ServiceDef] = &[
    ServiceDef::plain(
        "openai",
        "国外AI",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/ChatGPT.png",
        &[
            "GEOSITE,jetbrains-ai,国外AI",
            "GEOSITE,category-ai-!cn,国外AI",
            "GEOSITE,category-ai-chat-!cn,国外AI",
            "DOMAIN-SUFFIX,meta.ai,国外AI",
            "DOMAIN-SUFFIX,meta.com,国外AI",
            "PROCESS-NAME-REGEX,(?i).*Antigravity.*,国外AI",
            "PROCESS-NAME-REGEX,(?i).*language_server_.*,国外AI",
        ],
    ),
    ServiceDef::plain(
        "youtube",
        "YouTube",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/YouTube.png",
        &["GEOSITE,youtube,YouTube"],
    ),
    ServiceDef {
        key: "mediaHMT",
        name: "港澳台媒体",
        icon: "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/TVB.png",
        test_url: Some(GENERATE_204),
        rules: &[
            "GEOSITE,tvb,港澳台媒体",
            "GEOSITE,hkt,港澳台媒体",
            "GEOSITE,hkbn,港澳台媒体",
            "GEOSITE,hkopentv,港澳台媒体",
            "GEOSITE,hkedcity,港澳台媒体",
            "GEOSITE,hkgolden,港澳台媒体",
            "GEOSITE,hketgroup,港澳台媒体",
            "RULE-SET,hk-media,港澳台媒体",
            "RULE-SET,tw-media,港澳台媒体",
        ],
        providers: &[
            ServiceProviderDef {
                key: "hk-media",
                url: "https://ruleset.skk.moe/Clash/non_ip/stream_hk.txt",
                path: "./ruleset/ruleset.skk.moe/stream_hk.txt",
                format: ProviderFormat::Text,
                behavior: ProviderBehavior::Classical,
            },
            ServiceProviderDef {
                key: "tw-media",
                url: "https://ruleset.skk.moe/Clash/non_ip/stream_tw.txt",
                path: "./ruleset/ruleset.skk.moe/stream_tw.txt",
                format: ProviderFormat::Text,
                behavior: ProviderBehavior::Classical,
            },
        ],
        reject: false,
    },
    ServiceDef::plain(
        "bilibili",
        "哔哩哔哩",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/bilibili_3.png",
        &["GEOSITE,bilibili,哔哩哔哩"],
    ),
    ServiceDef::plain(
        "bahamut",
        "巴哈姆特",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Bahamut.png",
        &["GEOSITE,bahamut,巴哈姆特"],
    ),
    ServiceDef::plain(
        "disney",
        "Disney+",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Disney+.png",
        &["GEOSITE,disney,Disney+"],
    ),
    ServiceDef::plain(
        "netflix",
        "NETFLIX",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Netflix.png",
        &["GEOSITE,netflix,NETFLIX"],
    ),
    ServiceDef::plain(
        "tiktok",
        "Tiktok",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/TikTok.png",
        &["GEOSITE,tiktok,Tiktok"],
    ),
    ServiceDef::plain(
        "spotify",
        "Spotify",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Spotify.png",
        &["GEOSITE,spotify,Spotify"],
    ),
    ServiceDef::plain(
        "pixiv",
        "Pixiv",
        "https://play-lh.googleusercontent.com/8pFuLOHF62ADcN0ISUAyEueA5G8IF49mX_6Az6pQNtokNVHxIVbS1L2NM62H-k02rLM=w240-h480-rw",
        &["GEOSITE,pixiv,Pixiv"],
    ),
    ServiceDef::plain(
        "hbo",
        "HBO",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/HBO.png",
        &["GEOSITE,hbo,HBO"],
    ),
    ServiceDef::plain(
        "primevideo",
        "Prime Video",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Prime_Video.png",
        &["GEOSITE,primevideo,Prime Video"],
    ),
    ServiceDef::plain(
        "hulu",
        "Hulu",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Hulu.png",
        &["GEOSITE,hulu,Hulu"],
    ),
    ServiceDef::plain(
        "telegram",
        "Telegram",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Telegram.png",
        &["GEOIP,telegram,Telegram"],
    ),
    ServiceDef::plain(
        "whatsapp",
        "WhatsApp",
        "https://static.whatsapp.net/rsrc.php/v3/yP/r/rYZqPCBaG70.png",
        &["GEOSITE,whatsapp,WhatsApp"],
    ),
    ServiceDef::plain(
        "line",
        "Line",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Line.png",
        &["GEOSITE,line,Line"],
    ),
    ServiceDef {
        key: "games",
        name: "游戏专用",
        icon: "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Game.png",
        test_url: None,
        rules: &[
            "GEOSITE,category-games@cn,国内网站",
            "GEOSITE,category-games,游戏专用",
        ],
        providers: &[],
        reject: false,
    },
    ServiceDef {
        key: "ads",
        name: "广告过滤",
        icon: "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Advertising.png",
        test_url: None,
        rules: &[
            "GEOSITE,category-ads-all,广告过滤",
            "RULE-SET,adblockmihomo,广告过滤",
        ],
        providers: &[ServiceProviderDef {
            key: "adblockmihomo",
            url: "https://github.com/217heidai/adblockfilters/raw/refs/heads/main/rules/adblockmihomo.mrs",
            path: "./ruleset/adblockfilters/adblockmihomo.mrs",
            format: ProviderFormat::Mrs,
            behavior: ProviderBehavior::Domain,
        }],
        reject: true,
    },
    ServiceDef::plain(
        "apple",
        "苹果服务",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Apple_2.png",
        &["GEOSITE,apple-cn,苹果服务"],
    ),
    ServiceDef::plain(
        "google",
        "谷歌服务",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Google_Search.png",
        &["GEOSITE,google,谷歌服务"],
    ),
    ServiceDef::plain(
        "github",
        "Github",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/GitHub.png",
        &["GEOSITE,github,Github"],
    ),
    ServiceDef::plain(
        "microsoft",
        "微软服务",
        "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Microsoft.png",
        &["GEOSITE,microsoft@cn,国内网站", "GEOSITE,microsoft,微软服务"],
    ),
    ServiceDef {
        key: "japan",
        name: "日本网站",
        icon: "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/JP.png",
        test_url: Some(GENERATE_204),
        rules: &[
            "RULE-SET,category-bank-jp,日本网站",
            "GEOIP,jp,日本网站,no-resolve",
        ],
        providers: &[ServiceProviderDef {
            key: "category-bank-jp",
            url: "https://raw.githubusercontent.com/MetaCubeX/meta-rules-dat/meta/geo/geosite/category-bank-jp.mrs",
            path: "./ruleset/MetaCubeX/category-bank-jp.mrs",
            format: ProviderFormat::Mrs,
            behavior: ProviderBehavior::Domain,
        }],
        reject: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_enables_every_toggle() {
        let enabled = resolve_enabled("all");
        assert_eq!(enabled.len(), TOGGLE_KEYS.len());
        assert!(enabled.contains("openai"));
        assert!(enabled.contains("tvb"));
    }

    #[test]
    fn list_selection_ignores_unknown_keys() {
        let enabled = resolve_enabled("openai;youtube;doesnotexist");
        assert_eq!(enabled.len(), 2);
        assert!(enabled.contains("openai"));
        assert!(enabled.contains("youtube"));
    }

    #[test]
    fn every_service_key_has_a_toggle() {
        for svc in SERVICES {
            assert!(
                TOGGLE_KEYS.contains(&svc.key),
                "service {} missing from toggles",
                svc.key
            );
        }
    }

    #[test]
    fn reject_flag_only_on_ads() {
        let rejecting: Vec<_> = SERVICES.iter().filter(|s| s.reject).map(|s| s.key).collect();
        assert_eq!(rejecting, vec!["ads"]);
    }
}
