//! Query builder
//!
//! Users type `Title, Author, Year, Language, Subject` with everything after
//! the title optional. [`QueryFields`] holds the split input and
//! [`SearchQuery`] renders it as an archive `advancedsearch` boolean query.

use std::fmt;

/// Maximum number of comma-separated fields taken from user input
pub const MAX_FIELDS: usize = 5;

/// Clause restricting results to textual works
pub const TEXTS_FILTER: &str = "mediatype:texts";

/// A positional search field and the archive key it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Book title (field 1)
    Title,
    /// Author (field 2)
    Author,
    /// Publication year (field 3)
    Year,
    /// Language code or name (field 4)
    Language,
    /// Subject (field 5)
    Subject,
}

impl Field {
    /// Fields in input order
    pub const ORDER: [Self; MAX_FIELDS] = [
        Self::Title,
        Self::Author,
        Self::Year,
        Self::Language,
        Self::Subject,
    ];

    /// Archive search key for this field
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "creator",
            Self::Year => "date",
            Self::Language => "language",
            Self::Subject => "subject",
        }
    }
}

/// Ordered, trimmed fields split from a user message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFields(Vec<String>);

impl QueryFields {
    /// Split a message on commas, trimming each part and keeping at most
    /// [`MAX_FIELDS`] parts. Empty parts keep their position.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_finder_core::query::QueryFields;
    ///
    /// let fields = QueryFields::parse(" Dune , Frank Herbert ");
    /// assert_eq!(fields.as_slice(), ["Dune", "Frank Herbert"]);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self(
            text.split(',')
                .map(|part| part.trim().to_string())
                .take(MAX_FIELDS)
                .collect(),
        )
    }

    /// Number of fields, including empty ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no fields at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw field values
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Fields joined back with `", "`, as shown to the user
    #[must_use]
    pub fn display(&self) -> String {
        self.0.join(", ")
    }

    /// Field lists tried by the relaxation loop, strictest first.
    ///
    /// Each step drops the last field. Trailing empty fields are dropped along
    /// with it, so consecutive attempts never render the same query.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_finder_core::query::QueryFields;
    ///
    /// let steps: Vec<_> = QueryFields::parse("Dune, Herbert, , eng")
    ///     .relaxations()
    ///     .map(|f| f.display())
    ///     .collect();
    /// assert_eq!(steps, ["Dune, Herbert, , eng", "Dune, Herbert", "Dune"]);
    /// ```
    #[must_use]
    pub fn relaxations(&self) -> Relaxations {
        Relaxations {
            remaining: self.0.clone(),
        }
    }
}

/// Iterator returned by [`QueryFields::relaxations`]
#[derive(Debug, Clone)]
pub struct Relaxations {
    remaining: Vec<String>,
}

impl Iterator for Relaxations {
    type Item = QueryFields;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining.last().is_some_and(String::is_empty) {
            self.remaining.pop();
        }
        if self.remaining.is_empty() {
            return None;
        }

        let current = QueryFields(self.remaining.clone());
        self.remaining.pop();
        Some(current)
    }
}

/// A structured archive search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    clauses: Vec<(Field, String)>,
    texts_only: bool,
}

impl SearchQuery {
    /// Query used by the menu bot: title and optional author, nothing else.
    #[must_use]
    pub fn menu(fields: &QueryFields) -> Self {
        Self::from_fields(fields, 2, false)
    }

    /// Query used by the relaxed bot: all five fields plus the texts filter.
    #[must_use]
    pub fn relaxed(fields: &QueryFields) -> Self {
        Self::from_fields(fields, MAX_FIELDS, true)
    }

    fn from_fields(fields: &QueryFields, limit: usize, texts_only: bool) -> Self {
        let clauses = Field::ORDER
            .iter()
            .zip(fields.as_slice())
            .take(limit)
            .filter_map(|(field, value)| clean_value(value).map(|v| (*field, v)))
            .collect();

        Self {
            clauses,
            texts_only,
        }
    }

    /// True when at least one user-supplied field made it into the query
    #[must_use]
    pub fn has_terms(&self) -> bool {
        !self.clauses.is_empty()
    }

    /// Number of `AND`-joined clauses, including the texts filter
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.clauses.len() + usize::from(self.texts_only)
    }

    /// Render the boolean query string sent as `q=`.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_finder_core::query::{QueryFields, SearchQuery};
    ///
    /// let q = SearchQuery::relaxed(&QueryFields::parse("The Secret, Rhonda Byrne"));
    /// assert_eq!(
    ///     q.to_query_string(),
    ///     "title:the secret AND creator:rhonda byrne AND mediatype:texts"
    /// );
    /// ```
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self
            .clauses
            .iter()
            .map(|(field, value)| format!("{}:{value}", field.key()))
            .collect();
        if self.texts_only {
            parts.push(TEXTS_FILTER.to_string());
        }
        parts.join(" AND ")
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn clean_value(value: &str) -> Option<String> {
    let cleaned = value.trim().to_lowercase();
    (!cleaned.is_empty()).then_some(cleaned)
}
