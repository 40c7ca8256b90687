use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub profile_picture_url: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, profile_picture_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            profile_picture_url: profile_picture_url.into(),
        }
    }

    /// Initials shown in place of the avatar image.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// One page of the static content document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
}

/// The static content document: `{ "pages": [ { "users": [...] } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPagesDocument {
    pub pages: Vec<UserPage>,
}

impl UserPagesDocument {
    /// Flatten every page, in order, into a single pool.
    pub fn into_pool(self) -> Vec<User> {
        self.pages.into_iter().flat_map(|page| page.users).collect()
    }
}
