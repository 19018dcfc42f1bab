use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Environment variable that overrides the XDG location.
pub const DATA_DIR_ENV: &str = "DOCSHELF_DATA_DIR";

const DOCUMENTS_DB: &str = "documents.redb";

/// Where the data directory setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Flag,
    Env,
    Xdg,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Flag => "flag",
            Origin::Env => "env",
            Origin::Xdg => "xdg",
        })
    }
}

/// The directory holding the document database.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    origin: Origin,
}

impl DataDir {
    /// Resolve and create the data directory. `--data-dir` wins over
    /// `DOCSHELF_DATA_DIR`, which wins over `$XDG_DATA_HOME/docshelf`.
    /// An empty environment value counts as unset.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env = std::env::var_os(DATA_DIR_ENV);
        let (root, origin) = pick(explicit, env)?;

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;
        Ok(Self { root, origin })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn documents_db(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DB)
    }
}

fn pick(
    explicit: Option<&Path>,
    env: Option<OsString>,
) -> Result<(PathBuf, Origin)> {
    if let Some(path) = explicit {
        return Ok((path.to_path_buf(), Origin::Flag));
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Ok((PathBuf::from(value), Origin::Env));
    }
    let home = xdg::BaseDirectories::with_prefix("docshelf")
        .get_data_home()
        .ok_or_else(|| {
            Error::Config("could not determine XDG data home directory".into())
        })?;
    Ok((home, Origin::Xdg))
}
