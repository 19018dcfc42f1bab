use crate::{
    document_db::DocumentDb,
    error::{Error, Result},
    fuzzy::Threshold,
};

pub const THRESHOLD_KEY: &str = "search.threshold";
pub const LIMIT_KEY: &str = "search.limit";

pub const DEFAULT_LIMIT: usize = 10;

/// Keys accepted by [`Settings::set`].
pub const KEYS: &[&str] = &[THRESHOLD_KEY, LIMIT_KEY];

/// Persistent search defaults, stored in the database's settings table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub threshold: Threshold,
    pub limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Settings {
    /// Read stored settings, falling back to defaults for unset keys.
    pub fn load(db: &DocumentDb) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(raw) = db.get_setting(THRESHOLD_KEY)? {
            settings.threshold = parse_threshold(&raw)?;
        }
        if let Some(raw) = db.get_setting(LIMIT_KEY)? {
            settings.limit = parse_limit(&raw)?;
        }
        Ok(settings)
    }

    /// Validate and persist one setting.
    pub fn set(db: &DocumentDb, key: &str, value: &str) -> Result<()> {
        match key {
            THRESHOLD_KEY => {
                parse_threshold(value)?;
            }
            LIMIT_KEY => {
                parse_limit(value)?;
            }
            _ => return Err(unknown_key(key)),
        }
        db.set_setting(key, value.trim())
    }

    /// Remove a stored setting so the default applies again.
    pub fn clear(db: &DocumentDb, key: &str) -> Result<bool> {
        if !KEYS.contains(&key) {
            return Err(unknown_key(key));
        }
        db.remove_setting(key)
    }

    /// `(key, value)` pairs of the effective settings.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (THRESHOLD_KEY, self.threshold.get().to_string()),
            (LIMIT_KEY, self.limit.to_string()),
        ]
    }
}

fn parse_threshold(raw: &str) -> Result<Threshold> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        Error::Config(format!("{THRESHOLD_KEY} must be a number, got '{raw}'"))
    })?;
    Threshold::new(value)
}

fn parse_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(Error::Config(format!(
            "{LIMIT_KEY} must be a positive integer, got '{raw}'"
        ))),
    }
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown setting '{key}' (expected one of: {})",
        KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, DocumentDb) {
        let tmp = tempfile::tempdir().unwrap();
        let db = DocumentDb::open(&tmp.path().join("documents.redb")).unwrap();
        (tmp, db)
    }

    #[test]
    fn defaults_when_unset() {
        let (_tmp, db) = test_db();
        let settings = Settings::load(&db).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.threshold.get(), 0.3);
        assert_eq!(settings.limit, 10);
    }

    #[test]
    fn set_then_load() {
        let (_tmp, db) = test_db();
        Settings::set(&db, THRESHOLD_KEY, "0.45").unwrap();
        Settings::set(&db, LIMIT_KEY, " 25 ").unwrap();

        let settings = Settings::load(&db).unwrap();
        assert_eq!(settings.threshold.get(), 0.45);
        assert_eq!(settings.limit, 25);

        assert!(Settings::clear(&db, LIMIT_KEY).unwrap());
        assert_eq!(Settings::load(&db).unwrap().limit, DEFAULT_LIMIT);
    }

    #[test]
    fn rejects_invalid_values() {
        let (_tmp, db) = test_db();
        assert!(Settings::set(&db, THRESHOLD_KEY, "1.5").is_err());
        assert!(Settings::set(&db, THRESHOLD_KEY, "abc").is_err());
        assert!(Settings::set(&db, LIMIT_KEY, "0").is_err());
        assert!(Settings::set(&db, "search.color", "red").is_err());
        assert!(Settings::clear(&db, "search.color").is_err());
        assert_eq!(db.list_settings().unwrap(), vec![]);
    }
}
