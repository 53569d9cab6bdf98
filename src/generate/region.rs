use crate::config::{split_list, RawProxyNode};
use crate::generate::ratio;
use regex::Regex;
use std::sync::LazyLock;

/// One geographic bucket definition. Declaration order in [`ALL_REGIONS`] is
/// match priority: the first definition whose matcher accepts a name claims
/// the proxy.
///
/// `exclude` replaces the negative lookahead of the upstream patterns, which
/// the regex crate does not support: a name matches only if `pattern` accepts
/// it and `exclude` does not.
pub struct RegionDef {
    pub name: &'static str,
    pattern: Regex,
    exclude: Option<Regex>,
    pub icon: &'static str,
}

impl RegionDef {
    fn new(
        name: &'static str,
        pattern: &str,
        exclude: Option<&str>,
        icon: &'static str,
    ) -> RegionDef {
        RegionDef {
            name,
            pattern: Regex::new(&format!("(?i){pattern}")).expect("region pattern"),
            exclude: exclude.map(|e| Regex::new(&format!("(?i){e}")).expect("region exclusion")),
            icon,
        }
    }

    pub fn matches(&self, proxy_name: &str) -> bool {
        self.pattern.is_match(proxy_name)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|e| e.is_match(proxy_name))
    }

    /// The 2-character prefix used by the `regionSet` option.
    pub fn prefix(&self) -> &'static str {
        &self.name[..2]
    }
}

pub static ALL_REGIONS: LazyLock<Vec<RegionDef>> = LazyLock::new(|| {
    vec![
        RegionDef::new(
            "HK香港",
            "港|🇭🇰|hk|hongkong|hong kong",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Hong_Kong.png",
        ),
        // "us" must not swallow "aus" (Australia) or "ust"; upstream uses
        // lookaround here, expressed lookaround-free below.
        RegionDef::new(
            "US美国",
            "美|🇺🇸|us([^t]|$)|usa|american|united states",
            Some("aus"),
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/United_States.png",
        ),
        RegionDef::new(
            "JP日本",
            "日本|🇯🇵|jp|japan",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Japan.png",
        ),
        RegionDef::new(
            "KR韩国",
            "韩|🇰🇷|kr|korea",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Korea.png",
        ),
        RegionDef::new(
            "SG新加坡",
            "新加坡|🇸🇬|sg|singapore",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Singapore.png",
        ),
        RegionDef::new(
            "CN中国大陆",
            "中国|🇨🇳|cn|china",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/China_Map.png",
        ),
        RegionDef::new(
            "TW台湾省",
            "台湾|台灣|🇹🇼|tw|taiwan|tai wan",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/China.png",
        ),
        RegionDef::new(
            "GB英国",
            "英|🇬🇧|uk|united kingdom|great britain",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/United_Kingdom.png",
        ),
        RegionDef::new(
            "DE德国",
            "德国|🇩🇪|de|germany",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Germany.png",
        ),
        RegionDef::new(
            "MY马来西亚",
            "马来|🇲🇾|my|malaysia",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Malaysia.png",
        ),
        RegionDef::new(
            "TK土耳其",
            "土耳其|🇹🇷|tk|turkey",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Turkey.png",
        ),
        RegionDef::new(
            "CA加拿大",
            "加拿大|🇨🇦|ca|canada",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Canada.png",
        ),
        RegionDef::new(
            "AU澳大利亚",
            "澳大利亚|🇦🇺|au|australia|sydney",
            None,
            "https://raw.githubusercontent.com/Koolson/Qure/master/IconSet/Color/Australia.png",
        ),
    ]
});

/// Regions enabled by the `regionSet` option, in declaration order.
pub fn enabled_regions(region_set: &str) -> Vec<&'static RegionDef> {
    if region_set == "all" {
        ALL_REGIONS.iter().collect()
    } else {
        let enabled = split_list(region_set);
        ALL_REGIONS
            .iter()
            .filter(|r| enabled.iter().any(|p| p == r.prefix()))
            .collect()
    }
}

/// Classification output: one bucket per enabled region in declaration order
/// (possibly empty), and the unmatched remainder. Bucket contents keep the
/// input proxy order.
pub struct Classification {
    pub buckets: Vec<(&'static RegionDef, Vec<String>)>,
    pub other: Vec<String>,
}

/// Partitions proxies over the enabled regions with first-match-wins
/// priority. Proxies excluded by the ratio filter are absent from all
/// buckets.
pub fn classify(
    proxies: &[RawProxyNode],
    regions: &[&'static RegionDef],
    ratio_filter: bool,
    ratio_limit: f64,
) -> Classification {
    let mut buckets: Vec<(&'static RegionDef, Vec<String>)> =
        regions.iter().map(|r| (*r, Vec::new())).collect();
    let mut other = Vec::new();

    for proxy in proxies {
        if !ratio::include_proxy(&proxy.name, ratio_filter, ratio_limit) {
            continue;
        }
        match buckets.iter_mut().find(|(r, _)| r.matches(&proxy.name)) {
            Some((_, bucket)) => bucket.push(proxy.name.clone()),
            None => other.push(proxy.name.clone()),
        }
    }

    Classification { buckets, other }
}
