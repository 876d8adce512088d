//! User identity type for core events.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Best human-readable name for relay notices: first name, then username, then the id.
    pub fn display_name(&self) -> String {
        if let Some(first) = &self.first_name {
            first.clone()
        } else if let Some(username) = &self.username {
            format!("@{}", username)
        } else {
            self.id.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_first_name() {
        let user = User {
            id: 1,
            username: Some("handle".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: None,
        };
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn test_display_name_falls_back_to_username_then_id() {
        let user = User {
            id: 7,
            username: Some("handle".to_string()),
            first_name: None,
            last_name: None,
        };
        assert_eq!(user.display_name(), "@handle");

        let bare = User {
            id: 7,
            username: None,
            first_name: None,
            last_name: None,
        };
        assert_eq!(bare.display_name(), "7");
    }
}
