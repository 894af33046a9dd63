use super::DownloadLink;
use serde::Deserialize;

/// Body of a `metadata/<identifier>` response. Unknown identifiers come back
/// as `{}`, which parses to all-`None`.
#[derive(Debug, Default, Deserialize)]
pub struct MetadataResponse {
    /// Storage node hosting the item, e.g. `ia800300.us.archive.org`
    #[serde(default)]
    pub server: Option<String>,
    /// Item directory on that node, e.g. `/7/items/dune00`
    #[serde(default)]
    pub dir: Option<String>,
    /// Files in the item
    #[serde(default)]
    pub files: Option<Vec<MetadataFile>>,
}

/// One entry of the item's file list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataFile {
    /// File name relative to the item directory
    #[serde(default)]
    pub name: String,
    /// Declared format, e.g. `Text PDF` or `Additional Text PDF`
    #[serde(default)]
    pub format: String,
}

impl MetadataFile {
    /// A `.pdf` file whose declared format mentions PDF or text
    #[must_use]
    pub fn is_readable_pdf(&self) -> bool {
        if !self.name.ends_with(".pdf") {
            return false;
        }
        let format = self.format.to_lowercase();
        format.contains("pdf") || format.contains("text")
    }
}

impl MetadataResponse {
    /// Build the direct URL of the first readable PDF, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use book_finder_core::archive::{MetadataFile, MetadataResponse};
    ///
    /// let metadata = MetadataResponse {
    ///     server: Some("ia800.us.archive.org".into()),
    ///     dir: Some("/1/items/mybook".into()),
    ///     files: Some(vec![MetadataFile {
    ///         name: "My Book.pdf".into(),
    ///         format: "Text PDF".into(),
    ///     }]),
    /// };
    /// let link = metadata.download_link().expect("pdf present");
    /// assert_eq!(link.as_str(), "https://ia800.us.archive.org/1/items/mybook/My%20Book.pdf");
    /// ```
    #[must_use]
    pub fn download_link(&self) -> Option<DownloadLink> {
        let server = self.server.as_deref()?;
        let dir = self.dir.as_deref()?;
        let file = self.files.as_ref()?.iter().find(|f| f.is_readable_pdf())?;

        Some(DownloadLink::new(format!(
            "https://{server}{dir}/{}",
            encode_file_name(&file.name)
        )))
    }
}

fn encode_file_name(name: &str) -> String {
    name.replace(' ', "%20")
}
