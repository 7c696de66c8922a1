use crate::client::{fetch_collection, fetch_detail, resolve_link, Fetcher, Paginator, ITEM_SELF};
use crate::error::Result;
use crate::models::{CanonicalInvoice, CanonicalRecord, NsInvoice, NsItem, Reference};
use crate::service::mapper;
use crate::service::{record_endpoint, skip_undecodable, SyncSettings, SyncSummary};
use crate::sink::BatchSink;
use futures::TryStreamExt;

pub const INVOICE_ENDPOINT: &str = "/invoice";

/// 发票同步: 逐页列出发票, 逐张装配后按页写入 sink
pub async fn sync_invoices<F, S>(
    fetcher: &F,
    sink: &S,
    settings: &SyncSettings,
) -> Result<SyncSummary>
where
    F: Fetcher + ?Sized,
    S: BatchSink,
{
    let mut summary = SyncSummary::new(CanonicalInvoice::MODEL_NAME);
    let pages = Paginator::new(fetcher, settings.list_endpoint(INVOICE_ENDPOINT)).into_stream();
    futures::pin_mut!(pages);

    while let Some(references) = pages.try_next().await? {
        tracing::info!(total = references.len(), "Listed invoices");

        let mut batch = Vec::with_capacity(references.len());
        for reference in &references {
            match assemble_invoice(fetcher, reference, settings.retries).await? {
                Some(invoice) => batch.push(invoice),
                None => summary.skipped += 1,
            }
        }

        sink.batch_save(&batch, CanonicalInvoice::MODEL_NAME).await?;
        summary.pages += 1;
        summary.saved += batch.len();
    }

    tracing::info!(
        pages = summary.pages,
        saved = summary.saved,
        skipped = summary.skipped,
        "Invoice sync finished"
    );
    Ok(summary)
}

/// 装配单张发票; `Ok(None)` 表示该发票被跳过 (不存在、响应体无法解码或字段无法映射)
pub async fn assemble_invoice<F>(
    fetcher: &F,
    reference: &Reference,
    retries: u32,
) -> Result<Option<CanonicalInvoice>>
where
    F: Fetcher + ?Sized,
{
    let Some(endpoint) = record_endpoint(INVOICE_ENDPOINT, &reference.id) else {
        tracing::warn!("Invoice reference without id skipped");
        return Ok(None);
    };
    let detail = fetch_detail::<NsInvoice, F>(fetcher, &endpoint, retries).await;
    let Some(detail) = skip_undecodable(detail, &reference.id)? else {
        return Ok(None);
    };
    let Some(invoice) = detail.data else {
        tracing::info!(id = %reference.id, "Invoice not found");
        return Ok(None);
    };

    let header = match mapper::map_invoice(&invoice, Vec::new()) {
        Ok(header) => header,
        Err(e) => {
            tracing::warn!(id = %reference.id, error = %e, "Invoice skipped: unmappable field");
            return Ok(None);
        }
    };

    let items = fetch_collection(fetcher, &format!("{}/item", endpoint), retries).await;
    let Some(items) = skip_undecodable(items, &reference.id)? else {
        return Ok(None);
    };
    let mut lines = Vec::with_capacity(items.items.len());
    for item_ref in &items.items {
        let Some(item_id) = resolve_link(&item_ref.links, "self", &ITEM_SELF) else {
            tracing::warn!(id = %reference.id, "Invoice item link unresolvable, dropped");
            continue;
        };

        let item_endpoint = format!("{}/item/{}", endpoint, item_id);
        let item = fetch_detail::<NsItem, F>(fetcher, &item_endpoint, retries).await;
        let Some(item) = skip_undecodable(item, &reference.id)? else {
            return Ok(None);
        };
        let Some(item) = item.data else {
            tracing::info!(id = %reference.id, item_id = %item_id, "Invoice item not found");
            continue;
        };

        match mapper::map_invoice_line(&item) {
            Ok(line) => lines.push(line),
            Err(e) => {
                tracing::warn!(
                    id = %reference.id,
                    item_id = %item_id,
                    error = %e,
                    "Invoice skipped: unmappable line"
                );
                return Ok(None);
            }
        }
    }

    Ok(Some(CanonicalInvoice { lines, ..header }))
}
