use serde::{Deserialize, Serialize};

/// 可写入 sink 的规范记录: 按 `id` upsert
pub trait CanonicalRecord: Serialize + Send + Sync {
    /// sink 中的模型名
    const MODEL_NAME: &'static str;

    fn record_id(&self) -> &str;
}

/// 规范发票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalInvoice {
    pub id: String,
    pub customer_id: String,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: String,
    pub lines: Vec<CanonicalInvoiceLine>,
    pub total: f64,
    pub status: String,
}

/// 规范发票明细; 可选字段仅在上游提供时出现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalInvoiceLine {
    pub item_id: String,
    pub quantity: f64,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 规范付款
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPayment {
    pub id: String,
    pub created_at: Option<String>,
    pub customer_id: Option<String>,
    pub amount: f64,
    pub currency: Option<String>,
    pub payment_reference: Option<String>,
    pub status: Option<String>,
    /// 本次付款核销的单据 id, 按上游列出顺序
    pub apply_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CanonicalRecord for CanonicalInvoice {
    const MODEL_NAME: &'static str = "NetsuiteInvoice";

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl CanonicalRecord for CanonicalPayment {
    const MODEL_NAME: &'static str = "NetsuitePayment";

    fn record_id(&self) -> &str {
        &self.id
    }
}
