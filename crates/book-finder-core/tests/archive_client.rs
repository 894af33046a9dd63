use book_finder_core::archive::{
    ArchiveApi, ArchiveClient, ArchiveError, BookRecord, DownloadLink, LinkStatus,
};
use book_finder_core::config::ArchiveSettings;
use book_finder_core::query::{QueryFields, SearchQuery};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, max_retries: usize) -> ArchiveClient {
    let mut settings = ArchiveSettings::with_base_url(server.uri());
    settings.archive_max_retries = max_retries;
    settings.archive_http_timeout_secs = 5;
    ArchiveClient::new(&settings)
}

#[tokio::test]
async fn test_search_sends_expected_parameters() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("q", "title:dune AND creator:frank herbert AND mediatype:texts"))
        .and(query_param("fl[]", "identifier"))
        .and(query_param("fl[]", "title"))
        .and(query_param("fl[]", "creator"))
        .and(query_param("rows", "10"))
        .and(query_param("page", "1"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "docs": [
                    { "identifier": "dune00", "title": "Dune", "creator": ["Frank Herbert"] }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let query = SearchQuery::relaxed(&QueryFields::parse("Dune, Frank Herbert"));
    let records = client.search_books(&query, 10).await?;

    assert_eq!(records, vec![BookRecord::new("Dune", "Frank Herbert", "dune00")]);
    Ok(())
}

#[tokio::test]
async fn test_search_without_docs_is_empty() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responseHeader": {} })))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let query = SearchQuery::menu(&QueryFields::parse("Nonexistent Title Zzz"));

    assert!(client.search_books(&query, 100).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_non_json_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let query = SearchQuery::menu(&QueryFields::parse("Dune"));
    let result = client.search_books(&query, 100).await;

    assert!(matches!(result, Err(ArchiveError::Decode(_))));
}

#[tokio::test]
async fn test_server_error_is_retried_once() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "docs": [ { "identifier": "x", "title": "X" } ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let query = SearchQuery::menu(&QueryFields::parse("X"));
    let records = client.search_books(&query, 100).await?;

    assert_eq!(records.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let result = client.resolve_download_link("missing").await;

    assert!(matches!(result, Err(ArchiveError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_resolve_download_link_encodes_spaces() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/mybook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": "ia800.us.archive.org",
            "dir": "/3/items/mybook",
            "files": [
                { "name": "mybook_meta.xml", "format": "Metadata" },
                { "name": "My Book.pdf", "format": "Text PDF" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let link = client.resolve_download_link("mybook").await?;

    assert_eq!(
        link,
        Some(DownloadLink::new(
            "https://ia800.us.archive.org/3/items/mybook/My%20Book.pdf"
        ))
    );
    Ok(())
}

#[tokio::test]
async fn test_resolve_unknown_item_is_none() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metadata/nothing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    assert_eq!(client.resolve_download_link("nothing").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_head_check_classifies_status() -> Result<(), ArchiveError> {
    let server = MockServer::start().await;

    for (file, status) in [("/ok.pdf", 200), ("/locked.pdf", 403), ("/gone.pdf", 404)] {
        Mock::given(method("HEAD"))
            .and(path(file))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let client = client_for(&server, 0);
    let link_at = |file: &str| DownloadLink::new(format!("{}{file}", server.uri()));

    assert_eq!(client.check_link(&link_at("/ok.pdf")).await?, LinkStatus::Reachable);
    assert_eq!(client.check_link(&link_at("/locked.pdf")).await?, LinkStatus::Forbidden);
    assert_eq!(client.check_link(&link_at("/gone.pdf")).await?, LinkStatus::Other(404));
    Ok(())
}

#[tokio::test]
async fn test_read_online_url_uses_base() {
    let settings = ArchiveSettings::with_base_url("https://archive.example/");
    let client = ArchiveClient::new(&settings);
    assert_eq!(
        client.read_online_url("dune00"),
        "https://archive.example/details/dune00"
    );
}
