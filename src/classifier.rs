use crate::document::Category;

/// Assigns a category to raw document text.
///
/// Implementations must be pure: no I/O and the same answer for the same
/// text. Any `Fn(&str) -> Category` closure qualifies.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Category;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Category + Send + Sync,
{
    fn classify(&self, text: &str) -> Category {
        self(text)
    }
}

/// Substring-marker classifier.
///
/// Rule markers are checked before case markers; the first hit wins and
/// text with neither falls through to [`Category::Concepts`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rule_markers: Vec<String>,
    case_markers: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(
        rule_markers: impl IntoIterator<Item = impl Into<String>>,
        case_markers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            rule_markers: rule_markers.into_iter().map(Into::into).collect(),
            case_markers: case_markers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(["규칙", "rule"], ["사례", "case"])
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Category {
        let contains_any =
            |markers: &[String]| {
                markers.iter().any(|m| text.contains(m.as_str()))
            };

        if contains_any(&self.rule_markers) {
            Category::Rules
        } else if contains_any(&self.case_markers) {
            Category::Cases
        } else {
            Category::Concepts
        }
    }
}
