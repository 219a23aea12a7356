use crate::model::{Collection, Prompt};

/// A parsed free-text search term.
///
/// `#tag` switches to tag-only matching on the first token after the `#`.
/// Everything else is a case-insensitive substring match over title,
/// description, content and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    Any,
    Text(String),
    Tag(String),
}

impl SearchTerm {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return SearchTerm::Any;
        }
        match trimmed.strip_prefix('#') {
            Some(rest) => match rest.split_whitespace().next() {
                Some(token) => SearchTerm::Tag(token.to_lowercase()),
                None => SearchTerm::Any,
            },
            None => SearchTerm::Text(trimmed.to_lowercase()),
        }
    }

    pub fn matches_prompt(&self, prompt: &Prompt) -> bool {
        self.matches_fields(
            &[
                Some(prompt.title.as_str()),
                prompt.description.as_deref(),
                Some(prompt.content.as_str()),
            ],
            &prompt.tags,
        )
    }

    pub fn matches_collection(&self, collection: &Collection) -> bool {
        self.matches_fields(
            &[
                Some(collection.title.as_str()),
                Some(collection.description.as_str()),
            ],
            &collection.tags,
        )
    }

    fn matches_fields(&self, fields: &[Option<&str>], tags: &[String]) -> bool {
        match self {
            SearchTerm::Any => true,
            SearchTerm::Tag(needle) => contains_ci(tags.iter().map(String::as_str), needle),
            SearchTerm::Text(needle) => {
                contains_ci(fields.iter().flatten().copied(), needle)
                    || contains_ci(tags.iter().map(String::as_str), needle)
            }
        }
    }
}

fn contains_ci<'a>(mut haystacks: impl Iterator<Item = &'a str>, needle: &str) -> bool {
    haystacks.any(|h| h.to_lowercase().contains(needle))
}
