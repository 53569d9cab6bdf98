//! Policy-group and synthetic-node names shared across the pipeline stages.
//! The Chinese names are part of the generated configuration's surface and
//! must match the rule targets verbatim.

/// Synthetic pass-through node appended to every proxy list.
pub const DIRECT: &str = "直连";
/// Synthetic blackhole node appended to every proxy list.
pub const REJECT_NODE: &str = "拒绝";
/// Built-in reject policy of the host client.
pub const REJECT: &str = "REJECT";

/// The mandatory selector offered by every functional group.
pub const DEFAULT_SELECTOR: &str = "默认节点";
/// Catch-all group for proxies no region pattern claimed.
pub const OTHER_NODES: &str = "其他节点";

/// Fallback group for download traffic.
pub const DOWNLOADS: &str = "下载软件";
/// Fallback group for uncategorized external traffic; the rule table's
/// unconditional catch-all points here.
pub const OTHER_FOREIGN: &str = "其他外网";
/// Fallback group for domestic/local traffic.
pub const DOMESTIC: &str = "国内网站";
