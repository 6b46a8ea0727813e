//! Checks that root-relative links and images point at files that exist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::permalink::url_to_output_path;
use super::pipeline::ProcessingDocument;

/// A document references a root-relative path that is not in the output.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: referenced file '{reference}' does not exist", .document.display())]
pub struct MissingAssetError {
    /// Source path of the referencing document
    pub document: PathBuf,
    /// The reference as written in the document
    pub reference: String,
}

/// Check every document's asset references against the written output tree.
///
/// References are resolved the way the dev server resolves URLs, after
/// stripping `baseurl`. Each missing reference is reported once per document.
pub fn check_assets(
    docs: &[ProcessingDocument],
    output_dir: &Path,
    baseurl: &str,
) -> Vec<MissingAssetError> {
    let baseurl = baseurl.trim_end_matches('/');
    let mut missing = Vec::new();

    for doc in docs {
        let mut seen = HashSet::new();
        for reference in &doc.assets {
            if !seen.insert(reference.as_str()) {
                continue;
            }
            let url = match reference.strip_prefix(baseurl) {
                Some(rest) if !baseurl.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
                    rest
                }
                _ => reference.as_str(),
            };
            if !url_to_output_path(url, output_dir).exists() {
                missing.push(MissingAssetError {
                    document: doc.doc.source_path.clone(),
                    reference: reference.clone(),
                });
            }
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::{Document, DocumentKind};

    fn doc_with_assets(path: &str, assets: &[&str]) -> ProcessingDocument {
        let mut doc = ProcessingDocument::new(Document::discovered(
            PathBuf::from(path),
            DocumentKind::Page,
        ));
        doc.assets = assets.iter().map(|a| a.to_string()).collect();
        doc
    }

    #[test]
    fn test_reports_missing_files_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/present.png"), "png").unwrap();
        std::fs::create_dir_all(dir.path().join("about")).unwrap();
        std::fs::write(dir.path().join("about/index.html"), "about").unwrap();

        let docs = vec![doc_with_assets(
            "post.md",
            &["/assets/present.png", "/assets/gone.png", "/about/", "/assets/gone.png"],
        )];

        let missing = check_assets(&docs, dir.path(), "");
        assert_eq!(
            missing,
            vec![MissingAssetError {
                document: PathBuf::from("post.md"),
                reference: "/assets/gone.png".to_string(),
            }]
        );
        assert_eq!(
            missing[0].to_string(),
            "post.md: referenced file '/assets/gone.png' does not exist"
        );
    }

    #[test]
    fn test_strips_baseurl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/logo.svg"), "svg").unwrap();

        let docs = vec![doc_with_assets(
            "index.md",
            &["/blog/assets/logo.svg", "/blogroll/"],
        )];

        let missing = check_assets(&docs, dir.path(), "/blog/");
        let references: Vec<&str> = missing.iter().map(|m| m.reference.as_str()).collect();
        assert_eq!(references, vec!["/blogroll/"]);
    }
}
