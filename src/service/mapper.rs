//! 上游字段 -> 规范记录的唯一转换边界。
//!
//! 缺省策略:
//! - 数值字段缺失 -> `0`
//! - 必填文本字段缺失 -> `""`, 可空文本字段缺失 -> `None` (序列化为 null)
//! - 可选字段仅在上游提供时出现, 原样复制
//! - 空字符串视同缺失
//! - 数值字符串按十进制解析, 无法解析时返回 [`MapError::InvalidNumber`]

use crate::models::{
    CanonicalInvoice, CanonicalInvoiceLine, CanonicalPayment, NsInvoice, NsItem, NsPayment,
    NsRef, Numeric,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// 解析数值字段; 缺失或空字符串为 0
pub fn parse_number(field: &'static str, value: Option<&Numeric>) -> Result<f64, MapError> {
    let parsed = match value {
        None => return Ok(0.0),
        Some(Numeric::Number(n)) => *n,
        Some(Numeric::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed.parse::<f64>().map_err(|_| MapError::InvalidNumber {
                field,
                value: text.clone(),
            })?
        }
    };

    if !parsed.is_finite() {
        return Err(MapError::InvalidNumber {
            field,
            value: parsed.to_string(),
        });
    }
    Ok(parsed)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn ref_id(value: Option<&NsRef>) -> Option<String> {
    non_empty(value.and_then(|r| r.id.as_ref()))
}

fn ref_name(value: Option<&NsRef>) -> Option<String> {
    non_empty(value.and_then(|r| r.ref_name.as_ref()))
}

/// 发票头; 明细在装配阶段另行获取
pub fn map_invoice(
    invoice: &NsInvoice,
    lines: Vec<CanonicalInvoiceLine>,
) -> Result<CanonicalInvoice, MapError> {
    Ok(CanonicalInvoice {
        id: invoice.id.clone(),
        customer_id: ref_id(invoice.entity.as_ref()).unwrap_or_default(),
        currency: ref_name(invoice.currency.as_ref()).unwrap_or_default(),
        description: non_empty(invoice.memo.as_ref()),
        created_at: non_empty(invoice.tran_date.as_ref()).unwrap_or_default(),
        lines,
        total: parse_number("total", invoice.total.as_ref())?,
        status: ref_id(invoice.status.as_ref()).unwrap_or_default(),
    })
}

pub fn map_invoice_line(item: &NsItem) -> Result<CanonicalInvoiceLine, MapError> {
    Ok(CanonicalInvoiceLine {
        item_id: ref_id(item.item.as_ref()).unwrap_or_default(),
        quantity: parse_number("quantity", item.quantity.as_ref())?,
        amount: parse_number("amount", item.amount.as_ref())?,
        vat_code: non_empty(item.tax_details_reference.as_ref()),
        description: ref_name(item.item.as_ref()),
    })
}

pub fn map_payment(
    payment: &NsPayment,
    apply_to: Vec<String>,
) -> Result<CanonicalPayment, MapError> {
    Ok(CanonicalPayment {
        id: payment.id.clone(),
        created_at: non_empty(payment.tran_date.as_ref()),
        customer_id: ref_id(payment.customer.as_ref()),
        amount: parse_number("payment", payment.payment.as_ref())?,
        currency: ref_name(payment.currency.as_ref()),
        payment_reference: non_empty(payment.tran_id.as_ref()),
        status: ref_id(payment.status.as_ref()),
        apply_to,
        description: non_empty(payment.memo.as_ref()),
    })
}
