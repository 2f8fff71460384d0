//! Output naming and rendering of finished document text.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lexskill_core::error::{Error, Result};
use std::path::Path;
use tracing::debug;

const MAX_NAME_CHARS: usize = 30;

/// Turns document text into a file.
///
/// Binary formats (Word, PDF) live outside this crate; they plug in here.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &str;

    async fn render(&self, content: &str, path: &Path) -> Result<()>;
}

/// Writes the text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileRenderer;

#[async_trait]
impl DocumentRenderer for TextFileRenderer {
    fn extension(&self) -> &str {
        "txt"
    }

    async fn render(&self, content: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Document(format!("Cannot create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| Error::Document(format!("Cannot write {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = content.len(), "Document written");
        Ok(())
    }
}

/// `<name>[_case<id>]_<YYYYMMDD_HHMMSS>.<ext>`
///
/// Anything other than a word character or hyphen in the template name
/// becomes `_`, and the name is cut to 30 characters.
pub fn output_filename(
    template_name: &str,
    case_id: Option<u64>,
    timestamp: NaiveDateTime,
    extension: &str,
) -> String {
    let safe: String = template_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(MAX_NAME_CHARS)
        .collect();
    let case_part = case_id.map(|id| format!("_case{id}")).unwrap_or_default();
    format!(
        "{safe}{case_part}_{}.{extension}",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn filename_sanitized_and_stamped() {
        let name = output_filename("DWI Plea - Hamilton Municipal", Some(42), ts(), "txt");
        assert_eq!(name, "DWI_Plea_-_Hamilton_Municipal_case42_20250314_090507.txt");
    }

    #[test]
    fn filename_truncated_without_case() {
        let name = output_filename(
            "Motion to Suppress Evidence (Warrantless Search)",
            None,
            ts(),
            "docx",
        );
        assert_eq!(name, "Motion_to_Suppress_Evidence__W_20250314_090507.docx");
    }

    #[tokio::test]
    async fn text_renderer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out").join("doc.txt");
        TextFileRenderer.render("Comes now the defendant", &path).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Comes now the defendant"
        );
        assert_eq!(TextFileRenderer.extension(), "txt");
    }
}
