//! 上游 NetSuite 记录的部分字段视图。
//!
//! 所有字段都可能缺失, 缺省策略统一在 `service::mapper` 中处理。

use serde::{Deserialize, Deserializer};

/// id 字段: 上游可能返回字符串或数字
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Integer(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// 字符串或数字 id -> String; null 视为空字符串
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

/// 可缺失 / 可为 null 的字符串或数字 id
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// 数值字段: 上游可能返回 JSON 数字或十进制字符串
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

/// 引用字段, 如 `entity` / `currency` / `status`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsRef {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub ref_name: Option<String>,
}

/// 发票详情 (GET /invoice/{id})
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsInvoice {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub entity: Option<NsRef>,
    #[serde(default)]
    pub currency: Option<NsRef>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub tran_date: Option<String>,
    #[serde(default)]
    pub total: Option<Numeric>,
    #[serde(default)]
    pub status: Option<NsRef>,
}

/// 发票明细详情 (GET /invoice/{id}/item/{itemId})
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsItem {
    #[serde(default)]
    pub item: Option<NsRef>,
    #[serde(default)]
    pub quantity: Option<Numeric>,
    #[serde(default)]
    pub amount: Option<Numeric>,
    #[serde(default)]
    pub tax_details_reference: Option<String>,
}

/// 客户付款详情 (GET /customerpayment/{id})
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsPayment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub tran_date: Option<String>,
    #[serde(default)]
    pub customer: Option<NsRef>,
    #[serde(default)]
    pub payment: Option<Numeric>,
    #[serde(default)]
    pub currency: Option<NsRef>,
    #[serde(default)]
    pub tran_id: Option<String>,
    #[serde(default)]
    pub status: Option<NsRef>,
    #[serde(default)]
    pub memo: Option<String>,
}
