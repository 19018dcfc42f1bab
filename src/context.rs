use crate::document::Document;

/// Assemble the context block handed to a question-answering service:
/// each document as its title line followed by its content, separated
/// by a blank line.
pub fn build_context<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
) -> String {
    documents
        .into_iter()
        .map(|d| format!("{}\n{}", d.title, d.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{doc_id::DocumentId, document::Category};

    fn doc(id: u64, title: &str, content: &str) -> Document {
        Document {
            id: DocumentId::new(id),
            title: title.into(),
            category: Category::Concepts,
            content: content.into(),
            created_at: 0,
        }
    }

    #[test]
    fn joins_title_and_content_blocks() {
        let docs = [doc(1, "a.txt", "alpha"), doc(2, "b.txt", "beta\ngamma")];
        assert_eq!(build_context(&docs), "a.txt\nalpha\n\nb.txt\nbeta\ngamma");
    }

    #[test]
    fn empty_input_gives_empty_context() {
        assert_eq!(build_context(std::iter::empty::<&Document>()), "");
    }
}
