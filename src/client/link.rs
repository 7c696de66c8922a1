use crate::models::Link;
use regex::Regex;
use std::sync::LazyLock;

/// 发票明细 self 链接: `.../invoice/{id}/item/{itemId}`
pub static ITEM_SELF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/item/(\d+)").unwrap());

/// 付款核销单据 self 链接: `.../customerpayment/{id}/apply/doc={docId}`
pub static APPLY_DOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/apply/doc=(\d+)").unwrap());

/// 从链接列表中按关系名取第一个链接, 用模式的第一个捕获组提取 id。
///
/// 关系不存在或 href 不匹配都返回 `None`, 由调用方决定跳过还是当作空结果。
pub fn resolve_link(links: &[Link], rel: &str, pattern: &Regex) -> Option<String> {
    let link = links.iter().find(|link| link.rel == rel)?;
    pattern
        .captures(&link.href)?
        .get(1)
        .map(|id| id.as_str().to_string())
}
