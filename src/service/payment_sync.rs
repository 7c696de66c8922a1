use crate::client::{fetch_collection, fetch_detail, resolve_link, Fetcher, Paginator, APPLY_DOC};
use crate::error::Result;
use crate::models::{CanonicalPayment, CanonicalRecord, NsPayment, Reference};
use crate::service::mapper;
use crate::service::{record_endpoint, skip_undecodable, SyncSettings, SyncSummary};
use crate::sink::BatchSink;
use futures::TryStreamExt;

pub const PAYMENT_ENDPOINT: &str = "/customerpayment";

/// 付款同步
pub async fn sync_payments<F, S>(
    fetcher: &F,
    sink: &S,
    settings: &SyncSettings,
) -> Result<SyncSummary>
where
    F: Fetcher + ?Sized,
    S: BatchSink,
{
    let mut summary = SyncSummary::new(CanonicalPayment::MODEL_NAME);
    let pages = Paginator::new(fetcher, settings.list_endpoint(PAYMENT_ENDPOINT)).into_stream();
    futures::pin_mut!(pages);

    while let Some(references) = pages.try_next().await? {
        tracing::info!(total = references.len(), "Listed payments");

        let mut batch = Vec::with_capacity(references.len());
        for reference in &references {
            match assemble_payment(fetcher, reference, settings.retries).await? {
                Some(payment) => batch.push(payment),
                None => summary.skipped += 1,
            }
        }

        sink.batch_save(&batch, CanonicalPayment::MODEL_NAME).await?;
        summary.pages += 1;
        summary.saved += batch.len();
    }

    tracing::info!(
        pages = summary.pages,
        saved = summary.saved,
        skipped = summary.skipped,
        "Payment sync finished"
    );
    Ok(summary)
}

/// 装配单笔付款; 核销单据链接无法解析的条目直接丢弃
pub async fn assemble_payment<F>(
    fetcher: &F,
    reference: &Reference,
    retries: u32,
) -> Result<Option<CanonicalPayment>>
where
    F: Fetcher + ?Sized,
{
    let Some(endpoint) = record_endpoint(PAYMENT_ENDPOINT, &reference.id) else {
        tracing::warn!("Payment reference without id skipped");
        return Ok(None);
    };
    let detail = fetch_detail::<NsPayment, F>(fetcher, &endpoint, retries).await;
    let Some(detail) = skip_undecodable(detail, &reference.id)? else {
        return Ok(None);
    };
    let Some(payment) = detail.data else {
        tracing::info!(id = %reference.id, "Payment not found");
        return Ok(None);
    };

    let apply = fetch_collection(fetcher, &format!("{}/apply", endpoint), retries).await;
    let Some(apply) = skip_undecodable(apply, &reference.id)? else {
        return Ok(None);
    };
    let apply_to: Vec<String> = apply
        .items
        .iter()
        .filter_map(|entry| resolve_link(&entry.links, "self", &APPLY_DOC))
        .collect();
    if apply_to.len() < apply.items.len() {
        tracing::debug!(
            id = %reference.id,
            dropped = apply.items.len() - apply_to.len(),
            "Apply links without document id dropped"
        );
    }

    match mapper::map_payment(&payment, apply_to) {
        Ok(mapped) => Ok(Some(mapped)),
        Err(e) => {
            tracing::warn!(id = %reference.id, error = %e, "Payment skipped: unmappable field");
            Ok(None)
        }
    }
}
