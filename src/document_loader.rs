use std::fs;
use std::path::{Path, PathBuf};

use pdf_extract::extract_text;
use regex::Regex;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Document, IngestionWarning};

/// Result of loading a directory: the documents that parsed plus a warning
/// for every file that did not.
#[derive(Debug)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub warnings: Vec<IngestionWarning>,
}

/// Reads a directory of document files and extracts their text.
///
/// PDF files go through `pdf-extract`; plain-text files (`.txt`, `.md`) are
/// read directly. Files with other extensions are skipped. A file that
/// fails extraction becomes an [`IngestionWarning`], never a batch-wide
/// error.
pub struct DocumentLoader {
    re_blank_lines: Regex,
    re_spaces: Regex,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self {
            re_blank_lines: Regex::new(r"\n{3,}").unwrap(),
            re_spaces: Regex::new(r"[ \t]+").unwrap(),
        }
    }

    /// Load every supported file in `documents_dir`, in filename order.
    pub fn load(&self, documents_dir: &Path) -> Result<LoadOutcome> {
        let mut documents = Vec::new();
        let mut warnings = Vec::new();

        let mut paths: Vec<PathBuf> = fs::read_dir(documents_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };

            let extracted = match extension.to_ascii_lowercase().as_str() {
                "pdf" => extract_text(&path).map_err(|e| e.to_string()),
                "txt" | "md" => fs::read_to_string(&path).map_err(|e| e.to_string()),
                _ => continue,
            };

            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            match extracted {
                Ok(raw) => {
                    let content = self.normalize_text(&raw);
                    if content.is_empty() {
                        log::warn!("Skipping {}: no extractable text", filename);
                        warnings.push(IngestionWarning {
                            path,
                            reason: "no extractable text".to_string(),
                        });
                        continue;
                    }

                    log::info!("Loaded {} ({} characters)", filename, content.chars().count());
                    documents.push(Document {
                        id: Uuid::new_v4(),
                        filename,
                        path,
                        content,
                    });
                }
                Err(reason) => {
                    log::warn!("Skipping {}: {}", filename, reason);
                    warnings.push(IngestionWarning { path, reason });
                }
            }
        }

        log::info!(
            "Loaded {} documents ({} skipped)",
            documents.len(),
            warnings.len()
        );
        Ok(LoadOutcome {
            documents,
            warnings,
        })
    }

    /// Collapse extraction artifacts: CRLF line endings, runs of blank
    /// lines, and runs of spaces. Paragraph breaks are kept as `\n\n` for
    /// the chunker's separator preference.
    fn normalize_text(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let text = self.re_blank_lines.replace_all(&text, "\n\n");
        let text = self.re_spaces.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn loads_text_files_in_filename_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "Grass is green.").unwrap();
        fs::write(dir.path().join("a.txt"), "The sky is blue.").unwrap();

        let outcome = DocumentLoader::new().load(dir.path()).unwrap();

        assert_eq!(outcome.documents.len(), 2);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.documents[0].filename, "a.txt");
        assert_eq!(outcome.documents[0].content, "The sky is blue.");
        assert_eq!(outcome.documents[1].filename, "b.txt");
    }

    #[test]
    fn corrupt_pdf_becomes_warning_not_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), "The sky is blue.").unwrap();
        let mut corrupt = File::create(dir.path().join("bad.pdf")).unwrap();
        corrupt.write_all(b"this is not a pdf").unwrap();

        let outcome = DocumentLoader::new().load(dir.path()).unwrap();

        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].filename, "good.txt");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].path.ends_with("bad.pdf"));
    }

    #[test]
    fn unsupported_extensions_are_skipped_silently() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.xyz"), "ignored").unwrap();

        let outcome = DocumentLoader::new().load(dir.path()).unwrap();

        assert!(outcome.documents.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn empty_file_becomes_warning() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("empty.txt"), "   \n\n  ").unwrap();

        let outcome = DocumentLoader::new().load(dir.path()).unwrap();

        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].reason, "no extractable text");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = DocumentLoader::new().load(&missing);
        assert!(matches!(result, Err(crate::error::RagError::Io(_))));
    }

    #[test]
    fn normalization_collapses_extraction_artifacts() {
        let loader = DocumentLoader::new();
        let raw = "First  line.\r\n\r\n\r\n\r\nSecond\tline.";
        assert_eq!(loader.normalize_text(raw), "First line.\n\nSecond line.");
    }
}
