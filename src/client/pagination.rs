//! 列表接口分页游标。
//!
//! 每次同步新建一个 [`Paginator`], 从 offset 0 开始; 游标不可在中途重启。

use super::{fetch_collection, Fetcher};
use crate::error::{Result, SyncError};
use crate::models::{ListResponse, Reference};
use futures::stream::{self, Stream};
use url::form_urlencoded;

/// 列表接口描述
#[derive(Debug, Clone)]
pub struct ListEndpoint {
    pub path: String,
    pub page_size: usize,
    pub retries: u32,
    /// 短页且没有翻页信号时再请求一页确认结束
    pub confirm_short_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Offset(usize),
    Href(String),
    Exhausted,
}

pub struct Paginator<'a, F: ?Sized> {
    fetcher: &'a F,
    endpoint: ListEndpoint,
    cursor: Cursor,
    offset: usize,
}

impl<'a, F: Fetcher + ?Sized> Paginator<'a, F> {
    pub fn new(fetcher: &'a F, endpoint: ListEndpoint) -> Self {
        Self {
            fetcher,
            endpoint,
            cursor: Cursor::Offset(0),
            offset: 0,
        }
    }

    /// 取下一页; `Ok(None)` 表示已无更多页。空页也会作为一页返回。
    pub async fn next_page(&mut self) -> Result<Option<Vec<Reference>>> {
        let request = match &self.cursor {
            Cursor::Exhausted => return Ok(None),
            Cursor::Offset(offset) => self.offset_request(*offset),
            Cursor::Href(href) => href.clone(),
        };

        let page = fetch_collection(self.fetcher, &request, self.endpoint.retries).await?;
        self.offset += page.items.len();
        self.cursor = self.continuation(&page);

        tracing::debug!(
            endpoint = %request,
            received = page.items.len(),
            upstream_offset = ?page.offset,
            total_results = ?page.total_results,
            exhausted = self.cursor == Cursor::Exhausted,
            "Fetched list page"
        );

        Ok(Some(page.items))
    }

    /// 转为按页产出的流
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Reference>>> + 'a {
        stream::try_unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Ok::<_, SyncError>(page.map(|references| (references, paginator)))
        })
    }

    fn offset_request(&self, offset: usize) -> String {
        let separator = if self.endpoint.path.contains('?') { '&' } else { '?' };
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("limit", &self.endpoint.page_size.to_string())
            .append_pair("offset", &offset.to_string())
            .finish();
        format!("{}{}{}", self.endpoint.path, separator, query)
    }

    fn continuation(&self, page: &ListResponse) -> Cursor {
        let received = page.items.len();
        if received == 0 || page.has_more == Some(false) {
            return Cursor::Exhausted;
        }
        if let Some(href) = page.next_href() {
            return Cursor::Href(href.to_string());
        }
        if page.has_more == Some(true) {
            return Cursor::Offset(self.offset);
        }
        // 有 links 但没有 next: 明确的结束标记
        if page.links.is_some() {
            return Cursor::Exhausted;
        }
        if received < self.endpoint.page_size && !self.endpoint.confirm_short_page {
            return Cursor::Exhausted;
        }
        Cursor::Offset(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct PageFetcher {
        pages: HashMap<String, Value>,
        requests: Mutex<Vec<String>>,
    }

    impl PageFetcher {
        fn with(mut self, endpoint: &str, body: Value) -> Self {
            self.pages.insert(endpoint.to_string(), body);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for PageFetcher {
        async fn get(&self, endpoint: &str, _retries: u32) -> Result<Option<Value>> {
            self.requests.lock().unwrap().push(endpoint.to_string());
            Ok(self.pages.get(endpoint).cloned())
        }
    }

    fn endpoint(page_size: usize, confirm_short_page: bool) -> ListEndpoint {
        ListEndpoint {
            path: "/invoice".to_string(),
            page_size,
            retries: 3,
            confirm_short_page,
        }
    }

    fn refs(ids: &[&str]) -> Value {
        Value::Array(ids.iter().map(|id| json!({ "id": id, "links": [] })).collect())
    }

    #[tokio::test]
    async fn test_follows_next_link_until_absent() {
        let fetcher = PageFetcher::default()
            .with(
                "/invoice?limit=2&offset=0",
                json!({
                    "items": refs(&["1", "2"]),
                    "links": [{ "rel": "next", "href": "https://ns/invoice?limit=2&offset=2" }],
                    "hasMore": true
                }),
            )
            .with(
                "https://ns/invoice?limit=2&offset=2",
                json!({ "items": refs(&["3"]), "links": [{ "rel": "self", "href": "x" }], "hasMore": false }),
            );

        let mut paginator = Paginator::new(&fetcher, endpoint(2, false));
        let first = paginator.next_page().await.unwrap().unwrap();
        let second = paginator.next_page().await.unwrap().unwrap();
        assert_eq!(first.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["1", "2"]);
        assert_eq!(second.len(), 1);
        assert!(paginator.next_page().await.unwrap().is_none());
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_is_yielded_then_exhausted() {
        let fetcher =
            PageFetcher::default().with("/invoice?limit=10&offset=0", json!({ "items": [] }));

        let mut paginator = Paginator::new(&fetcher, endpoint(10, false));
        assert_eq!(paginator.next_page().await.unwrap(), Some(vec![]));
        assert_eq!(paginator.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_has_more_without_links_advances_offset() {
        let fetcher = PageFetcher::default()
            .with(
                "/invoice?limit=2&offset=0",
                json!({ "items": refs(&["1", "2"]), "hasMore": true }),
            )
            .with(
                "/invoice?limit=2&offset=2",
                json!({ "items": refs(&["3", "4"]), "hasMore": false }),
            );

        let pages: Vec<_> = Paginator::new(&fetcher, endpoint(2, false))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn test_short_page_without_signal_stops() {
        let fetcher = PageFetcher::default()
            .with("/invoice?limit=5&offset=0", json!({ "items": refs(&["1", "2"]) }));

        let pages: Vec<_> = Paginator::new(&fetcher, endpoint(5, false))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(fetcher.requests(), ["/invoice?limit=5&offset=0"]);
    }

    #[tokio::test]
    async fn test_short_page_confirmation_fetch() {
        let fetcher = PageFetcher::default()
            .with("/invoice?limit=5&offset=0", json!({ "items": refs(&["1", "2"]) }))
            .with("/invoice?limit=5&offset=2", json!({ "items": [] }));

        let pages: Vec<_> = Paginator::new(&fetcher, endpoint(5, true))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].is_empty());
        assert_eq!(
            fetcher.requests(),
            ["/invoice?limit=5&offset=0", "/invoice?limit=5&offset=2"]
        );
    }

    #[tokio::test]
    async fn test_full_page_without_signal_keeps_going() {
        let fetcher = PageFetcher::default()
            .with("/invoice?limit=2&offset=0", json!({ "items": refs(&["1", "2"]) }))
            .with("/invoice?limit=2&offset=2", json!({ "items": refs(&["3"]) }));

        let pages: Vec<_> = Paginator::new(&fetcher, endpoint(2, false))
            .into_stream()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn test_absent_list_is_single_empty_page() {
        let fetcher = PageFetcher::default();
        let mut paginator = Paginator::new(&fetcher, endpoint(2, false));
        assert_eq!(paginator.next_page().await.unwrap(), Some(vec![]));
        assert_eq!(paginator.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offset_query_appends_to_existing_query() {
        let fetcher = PageFetcher::default().with(
            "/invoice?q=status+IS+open&limit=3&offset=0",
            json!({ "items": refs(&["1"]) }),
        );
        let list = ListEndpoint {
            path: "/invoice?q=status+IS+open".to_string(),
            ..endpoint(3, false)
        };
        let mut paginator = Paginator::new(&fetcher, list);
        let page = paginator.next_page().await.unwrap().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(
            fetcher.requests(),
            ["/invoice?q=status+IS+open&limit=3&offset=0"]
        );
    }
}
