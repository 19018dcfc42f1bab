use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    doc_id::DocumentId,
    error::{Error, Result},
};

/// Classification label assigned at ingestion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rules,
    Cases,
    Concepts,
}

impl Category {
    pub const ALL: [Category; 3] =
        [Category::Rules, Category::Cases, Category::Concepts];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Rules => "rules",
            Category::Cases => "cases",
            Category::Concepts => "concepts",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" => Ok(Category::Rules),
            "cases" | "case" => Ok(Category::Cases),
            "concepts" | "concept" => Ok(Category::Concepts),
            other => Err(Error::Validation(format!(
                "unknown category '{other}' (expected rules, cases or concepts)"
            ))),
        }
    }
}

/// A stored text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub category: Category,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// Fields supplied by the caller when creating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    pub category: Category,
    pub content: String,
}

impl NewDocument {
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        Ok(())
    }

    /// Merge the provided fields into `doc`. `id` and `created_at` are
    /// never touched.
    pub fn apply(self, doc: &mut Document) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(content) = self.content {
            doc.content = content;
        }
        if let Some(category) = self.category {
            doc.category = category;
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".into()));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation("content must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document {
            id: DocumentId::new(1),
            title: "a.txt".into(),
            category: Category::Concepts,
            content: "body".into(),
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn category_parse_and_display() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!("Rule".parse::<Category>().unwrap(), Category::Rules);
        assert!("misc".parse::<Category>().is_err());
    }

    #[test]
    fn patch_leaves_missing_fields() {
        let mut doc = sample();
        DocumentPatch {
            title: Some("b.txt".into()),
            ..Default::default()
        }
        .apply(&mut doc);

        assert_eq!(doc.title, "b.txt");
        assert_eq!(doc.content, "body");
        assert_eq!(doc.category, Category::Concepts);
        assert_eq!(doc.id, DocumentId::new(1));
        assert_eq!(doc.created_at, 1_700_000_000_000);
    }

    #[test]
    fn blank_content_is_rejected() {
        let new = NewDocument {
            title: "x".into(),
            category: Category::Rules,
            content: "  \n\t".into(),
        };
        assert!(matches!(new.validate(), Err(Error::Validation(_))));

        let patch = DocumentPatch {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn json_uses_camel_case_and_lowercase_category() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000u64);
        assert_eq!(json["category"], "concepts");
        assert_eq!(json["id"], 1);
    }
}
