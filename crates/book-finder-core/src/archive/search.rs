use super::{BookRecord, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use serde::Deserialize;

/// Body of an `advancedsearch.php?output=json` response.
///
/// Only `response.docs` is read; every level is optional so an unexpected
/// shape degrades to "no results".
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    response: Option<SearchBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    docs: Option<Vec<SearchDoc>>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    title: Option<TextField>,
    #[serde(default)]
    creator: Option<TextField>,
}

/// The archive returns `title`/`creator` as a string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Single(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl TextField {
    fn first(self) -> Option<String> {
        match self {
            Self::Single(s) => Some(s),
            Self::List(list) => list.into_iter().next(),
            Self::Other(_) => None,
        }
    }
}

impl SearchResponse {
    /// Convert documents into records, in response order.
    ///
    /// Documents without an identifier are dropped since they cannot be
    /// resolved to a file.
    #[must_use]
    pub fn into_records(self) -> Vec<BookRecord> {
        self.response
            .and_then(|body| body.docs)
            .unwrap_or_default()
            .into_iter()
            .filter_map(SearchDoc::into_record)
            .collect()
    }
}

impl SearchDoc {
    fn into_record(self) -> Option<BookRecord> {
        let identifier = self.identifier.filter(|id| !id.is_empty())?;
        let title = self
            .title
            .and_then(TextField::first)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let author = self
            .creator
            .and_then(TextField::first)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Some(BookRecord {
            title,
            author,
            identifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Vec<BookRecord> {
        serde_json::from_value::<SearchResponse>(value)
            .map(SearchResponse::into_records)
            .unwrap_or_else(|e| panic!("response should deserialize: {e}"))
    }

    #[test]
    fn test_docs_become_records_in_order() {
        let records = parse(json!({
            "responseHeader": { "status": 0 },
            "response": {
                "numFound": 2,
                "docs": [
                    { "identifier": "dune00", "title": "Dune", "creator": ["Frank Herbert"] },
                    { "identifier": "dunemessiah0000", "title": "Dune Messiah", "creator": ["Frank Herbert", "Someone Else"] }
                ]
            }
        }));

        assert_eq!(
            records,
            vec![
                BookRecord::new("Dune", "Frank Herbert", "dune00"),
                BookRecord::new("Dune Messiah", "Frank Herbert", "dunemessiah0000"),
            ]
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let records = parse(json!({
            "response": { "docs": [ { "identifier": "anon" } ] }
        }));
        assert_eq!(
            records,
            vec![BookRecord::new(UNKNOWN_TITLE, UNKNOWN_AUTHOR, "anon")]
        );
    }

    #[test]
    fn test_creator_as_plain_string() {
        let records = parse(json!({
            "response": { "docs": [ { "identifier": "x", "title": ["Emma"], "creator": "Jane Austen" } ] }
        }));
        assert_eq!(records[0].title, "Emma");
        assert_eq!(records[0].author, "Jane Austen");
    }

    #[test]
    fn test_unexpected_creator_type_falls_back() {
        let records = parse(json!({
            "response": { "docs": [ { "identifier": "x", "title": "T", "creator": 42 } ] }
        }));
        assert_eq!(records[0].author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_documents_without_identifier_are_dropped() {
        let records = parse(json!({
            "response": { "docs": [ { "title": "Orphan" }, { "identifier": "", "title": "Blank" } ] }
        }));
        assert!(records.is_empty());
    }

    #[test]
    fn test_absent_response_shape_is_empty() {
        assert!(parse(json!({})).is_empty());
        assert!(parse(json!({ "error": "bad query" })).is_empty());
        assert!(parse(json!({ "response": {} })).is_empty());
        assert!(parse(json!({ "response": { "docs": [] } })).is_empty());
    }
}
