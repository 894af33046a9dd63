use super::{
    ArchiveApi, ArchiveError, BookRecord, DownloadLink, LinkStatus, MetadataResponse,
    SearchResponse,
};
use crate::config::ArchiveSettings;
use crate::query::SearchQuery;
use crate::utils::retry_transient;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Fields requested from `advancedsearch.php`
const SEARCH_FIELDS: [&str; 3] = ["identifier", "title", "creator"];

/// HTTP client for the Internet Archive
#[derive(Clone)]
pub struct ArchiveClient {
    http: HttpClient,
    base_url: String,
    max_retries: usize,
}

impl ArchiveClient {
    /// Create a client with the configured timeout and retry budget.
    #[must_use]
    pub fn new(settings: &ArchiveSettings) -> Self {
        let http = HttpClient::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            http,
            base_url: settings.base_url().to_string(),
            max_retries: settings.archive_max_retries,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ArchiveError> {
        retry_transient(self.max_retries, || async {
            let response = self.http.get(url).query(params).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ArchiveError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(response.json::<T>().await?)
        })
        .await
    }
}

#[async_trait]
impl ArchiveApi for ArchiveClient {
    async fn search_books(
        &self,
        query: &SearchQuery,
        rows: u32,
    ) -> Result<Vec<BookRecord>, ArchiveError> {
        let q = query.to_query_string();
        let mut params = vec![("q", q.clone())];
        params.extend(SEARCH_FIELDS.iter().map(|f| ("fl[]", (*f).to_string())));
        params.push(("rows", rows.to_string()));
        params.push(("page", "1".to_string()));
        params.push(("output", "json".to_string()));

        let body: SearchResponse = self
            .get_json(&self.endpoint("advancedsearch.php"), &params)
            .await?;
        let records = body.into_records();

        debug!(query = %q, count = records.len(), "Archive search finished");
        Ok(records)
    }

    async fn resolve_download_link(
        &self,
        identifier: &str,
    ) -> Result<Option<DownloadLink>, ArchiveError> {
        let url = self.endpoint(&format!("metadata/{identifier}"));
        let metadata: MetadataResponse = self.get_json(&url, &[]).await?;
        let link = metadata.download_link();

        debug!(identifier, found = link.is_some(), "Resolved download link");
        Ok(link)
    }

    async fn check_link(&self, link: &DownloadLink) -> Result<LinkStatus, ArchiveError> {
        let status = retry_transient(self.max_retries, || async {
            let response = self.http.head(link.as_str()).send().await?;
            Ok(response.status().as_u16())
        })
        .await?;

        debug!(url = %link, status, "Checked download link");
        Ok(LinkStatus::from_status(status))
    }

    fn read_online_url(&self, identifier: &str) -> String {
        self.endpoint(&format!("details/{identifier}"))
    }
}
