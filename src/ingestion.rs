use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    repository::{IngestFailure, IngestReport, Repository},
    walker,
};

/// A file read from disk, ready to ingest.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub name: String,
    pub text: Result<String>,
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| {
        Error::Validation(format!("{} is not valid UTF-8 text", path.display()))
    })
}

/// Read files in parallel. Read and decode errors are kept per file.
pub fn load_files(paths: &[PathBuf]) -> Vec<LoadedFile> {
    paths
        .par_iter()
        .map(|path| LoadedFile {
            path: path.clone(),
            name: walker::display_name(path),
            text: read_text(path),
        })
        .collect()
}

/// Import files and directories into the repository.
///
/// Files are read in parallel, then stored one by one in input order
/// (the store serializes writes anyway). Unreadable files become
/// failures in the report and never stop the rest of the batch.
pub fn ingest_paths(
    repo: &Repository,
    inputs: &[PathBuf],
) -> Result<IngestReport> {
    let files = walker::expand_inputs(inputs)?;
    let mut report = IngestReport::default();

    let mut readable = Vec::with_capacity(files.len());
    for file in load_files(&files) {
        match file.text {
            Ok(text) => readable.push((file.name, text)),
            Err(error) => {
                tracing::warn!(
                    path = %file.path.display(),
                    %error,
                    "skipping unreadable file"
                );
                report.failed.push(IngestFailure {
                    name: file.name,
                    error,
                });
            }
        }
    }

    let stored = repo.ingest_batch(readable);
    report.created = stored.created;
    report.failed.extend(stored.failed);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Category;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let tmp = tempfile::tempdir().unwrap();
        let repo =
            Repository::open(&tmp.path().join("documents.redb")).unwrap();
        (tmp, repo)
    }

    #[test]
    fn imports_directory_with_titles_from_file_names() {
        let (_db_dir, repo) = test_repo();
        let docs = tempfile::tempdir().unwrap();
        let write = |name: &str, text: &str| {
            std::fs::write(docs.path().join(name), text).unwrap();
        };
        write("A.txt", "contains rule text");
        write("B.txt", "contains case text");

        let report = ingest_paths(&repo, &[docs.path().to_path_buf()]).unwrap();
        assert!(report.failed.is_empty());

        let stored: Vec<_> = repo
            .list()
            .unwrap()
            .into_iter()
            .map(|d| (d.title, d.category))
            .collect();
        assert_eq!(
            stored,
            vec![
                ("A.txt".to_string(), Category::Rules),
                ("B.txt".to_string(), Category::Cases)
            ]
        );
    }

    #[test]
    fn bad_files_do_not_block_the_batch() {
        let (_db_dir, repo) = test_repo();
        let docs = tempfile::tempdir().unwrap();
        let good = docs.path().join("good.txt");
        let binary = docs.path().join("binary.txt");
        let empty = docs.path().join("empty.txt");
        std::fs::write(&good, "사례 분석").unwrap();
        std::fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(&empty, "").unwrap();

        let report = ingest_paths(&repo, &[binary, good, empty]).unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].category, Category::Cases);
        let failed: Vec<_> =
            report.failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["binary.txt", "empty.txt"]);
        assert!(
            report
                .failed
                .iter()
                .all(|f| matches!(f.error, Error::Validation(_)))
        );
    }

    #[test]
    fn missing_input_fails_fast() {
        let (_db_dir, repo) = test_repo();
        let missing = PathBuf::from("/definitely/not/here.txt");
        let err = ingest_paths(&repo, &[missing]).unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn read_faults_are_kept_per_file() {
        let docs = tempfile::tempdir().unwrap();
        let folder = docs.path().join("folder.txt");
        let good = docs.path().join("good.txt");
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(&good, "plain words").unwrap();

        let loaded = load_files(&[folder, good]);

        let err = loaded[0].text.as_ref().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_storage_fault());
        assert_eq!(loaded[1].name, "good.txt");
        assert_eq!(loaded[1].text.as_deref().unwrap(), "plain words");
    }
}
