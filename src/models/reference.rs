use super::upstream::string_or_number;
use serde::{Deserialize, Serialize};

/// 超媒体链接 (rel + href)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// 列表页条目: 仅有 id 与链接, 尚未解析为完整资源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// 列表 / 子集合接口的响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<Reference>,
    /// `None` 表示上游没有返回 links 字段 (无翻页信号)
    #[serde(default)]
    pub links: Option<Vec<Link>>,
    #[serde(default)]
    pub has_more: Option<bool>,
    /// 上游回报的 offset 与总数, 仅用于日志
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

impl ListResponse {
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .as_ref()?
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| link.href.as_str())
    }
}

/// 详情接口结果; `data == None` 表示资源不存在, 不是传输错误
#[derive(Debug, Clone, PartialEq)]
pub struct DetailEnvelope<T> {
    pub data: Option<T>,
}

impl<T> DetailEnvelope<T> {
    pub fn absent() -> Self {
        Self { data: None }
    }

    pub fn present(data: T) -> Self {
        Self { data: Some(data) }
    }
}
