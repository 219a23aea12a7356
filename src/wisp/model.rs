use crate::error::{Result, WispError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Who can see a prompt or collection. Closed set: anything else fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = WispError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            other => Err(WispError::Validation(format!(
                "Unknown visibility '{}' (expected public, private or unlisted)",
                other
            ))),
        }
    }
}

// Wire records may carry pre-joined `isFavorite`/`isSaved`/`isOwner` flags.
// They are ignored here: membership is derived from the User record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub owner_id: String,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    pub fn new(owner_id: impl Into<String>, insert: PromptInsert) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: insert.title,
            description: insert.description,
            content: insert.content,
            tags: insert.tags,
            visibility: insert.visibility,
            owner_id: owner_id.into(),
            collections: insert.collections,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: Option<&User>) -> bool {
        user.is_some_and(|u| u.id == self.owner_id)
    }

    pub fn in_collection(&self, collection_id: &str) -> bool {
        self.collections.iter().any(|c| c == collection_id)
    }

    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    pub visibility: Visibility,
    pub owner_id: String,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(owner_id: impl Into<String>, insert: CollectionInsert) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: insert.title,
            description: insert.description,
            tags: insert.tags,
            images: insert.images,
            prompts: Vec::new(),
            collaborators: Vec::new(),
            visibility: insert.visibility,
            owner_id: owner_id.into(),
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: Option<&User>) -> bool {
        user.is_some_and(|u| u.id == self.owner_id)
    }

    pub fn contains_prompt(&self, prompt_id: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Prompt and collection ids, mixed.
    #[serde(default)]
    pub favorites: Vec<String>,
    /// Items saved but not owned.
    #[serde(default)]
    pub bought: Vec<String>,
    #[serde(default)]
    pub owned_prompts: Vec<String>,
    #[serde(default)]
    pub owned_collections: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn has_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn has_saved(&self, id: &str) -> bool {
        self.bought.iter().any(|b| b == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInsert {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub collections: Vec<String>,
}

impl PromptInsert {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Normalizes tags and rejects an empty title.
    pub fn validated(mut self) -> Result<Self> {
        require_title(&self.title, "Prompt")?;
        self.title = self.title.trim().to_string();
        self.tags = normalize_tags(self.tags);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
}

impl PromptUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validated(mut self) -> Result<Self> {
        if let Some(title) = &self.title {
            require_title(title, "Prompt")?;
            self.title = Some(title.trim().to_string());
        }
        self.tags = self.tags.map(normalize_tags);
        Ok(self)
    }

    pub fn apply_to(&self, prompt: &mut Prompt) {
        if let Some(title) = &self.title {
            prompt.title = title.clone();
        }
        if let Some(description) = &self.description {
            prompt.description = Some(description.clone());
        }
        if let Some(content) = &self.content {
            prompt.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            prompt.tags = tags.clone();
        }
        if let Some(visibility) = self.visibility {
            prompt.visibility = visibility;
        }
        if let Some(collections) = &self.collections {
            prompt.collections = collections.clone();
        }
        prompt.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInsert {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub visibility: Visibility,
}

impl CollectionInsert {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validated(mut self) -> Result<Self> {
        require_title(&self.title, "Collection")?;
        self.title = self.title.trim().to_string();
        self.tags = normalize_tags(self.tags);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl CollectionUpdate {
    pub fn validated(mut self) -> Result<Self> {
        if let Some(title) = &self.title {
            require_title(title, "Collection")?;
            self.title = Some(title.trim().to_string());
        }
        self.tags = self.tags.map(normalize_tags);
        Ok(self)
    }

    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(title) = &self.title {
            collection.title = title.clone();
        }
        if let Some(description) = &self.description {
            collection.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            collection.tags = tags.clone();
        }
        if let Some(images) = &self.images {
            collection.images = images.clone();
        }
        if let Some(prompts) = &self.prompts {
            collection.prompts = prompts.clone();
        }
        if let Some(collaborators) = &self.collaborators {
            collection.collaborators = collaborators.clone();
        }
        if let Some(visibility) = self.visibility {
            collection.visibility = visibility;
        }
        collection.updated_at = Utc::now();
    }
}

/// Request body for the favorite, save and restore endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRef {
    pub prompt_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteState {
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub is_saved: bool,
}

/// Trims tags, drops empty ones and collapses duplicates (first occurrence wins).
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

fn require_title(title: &str, what: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(WispError::Validation(format!("{} title cannot be empty", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_rejects_values_outside_the_closed_set() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(
            "unlisted".parse::<Visibility>().unwrap(),
            Visibility::Unlisted
        );
        assert!("secret".parse::<Visibility>().is_err());
        assert!("PUBLIC".parse::<Visibility>().is_err());
    }

    #[test]
    fn prompt_decode_ignores_prejoined_flags() {
        let json = r#"{
            "id": "p1",
            "title": "Email Writer",
            "content": "Write an email",
            "tags": ["email"],
            "visibility": "public",
            "ownerId": "u1",
            "isFavorite": true,
            "isSaved": true,
            "isOwner": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert_eq!(prompt.id, "p1");
        assert!(!prompt.deleted);
        assert!(prompt.collections.is_empty());

        let back = serde_json::to_value(&prompt).unwrap();
        assert!(back.get("isFavorite").is_none());
    }

    #[test]
    fn prompt_decode_fails_on_unknown_visibility() {
        let json = r#"{
            "id": "p1", "title": "T", "visibility": "friends", "ownerId": "u1",
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Prompt>(json).is_err());
    }

    #[test]
    fn normalize_tags_trims_and_dedups_in_order() {
        let tags = vec![
            " email".to_string(),
            "work".to_string(),
            "".to_string(),
            "email".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["email", "work"]);
    }

    #[test]
    fn insert_with_blank_title_is_rejected() {
        let err = PromptInsert::new("   ", "body").validated().unwrap_err();
        assert!(matches!(err, WispError::Validation(_)));

        let err = CollectionInsert::new("").validated().unwrap_err();
        assert!(matches!(err, WispError::Validation(_)));
    }

    #[test]
    fn update_only_validates_fields_it_sets() {
        let update = PromptUpdate {
            content: Some("new".into()),
            ..Default::default()
        };
        assert!(update.validated().is_ok());

        let update = PromptUpdate {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(update.validated().is_err());
    }

    #[test]
    fn update_apply_replaces_set_fields_only() {
        let mut prompt = Prompt::new("u1", PromptInsert::new("Old", "body"));
        let update = PromptUpdate {
            title: Some("New".into()),
            tags: Some(vec!["a".into()]),
            ..Default::default()
        };
        update.apply_to(&mut prompt);
        assert_eq!(prompt.title, "New");
        assert_eq!(prompt.content, "body");
        assert_eq!(prompt.tags, vec!["a"]);
    }

    #[test]
    fn toggle_payloads_use_camel_case() {
        let body = serde_json::to_string(&PromptRef {
            prompt_id: "p1".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"promptId":"p1"}"#);

        let state: FavoriteState = serde_json::from_str(r#"{"isFavorite":true}"#).unwrap();
        assert!(state.is_favorite);
    }
}
