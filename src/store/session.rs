use std::path::Path;

use tracing::debug;

use super::{DataStore, JsonFileStore};

/// Authentication state of the caller. Resolved outside this crate's core;
/// here it only decides which backing store serves the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No signed-in owner; data lives in the shared local document.
    Anonymous,
    /// A signed-in owner; data is scoped to that owner.
    Authenticated { user: String },
}

impl AuthState {
    /// Builds the state from an optional user name, the way the CLI passes
    /// it in.
    pub fn from_user(user: Option<String>) -> Self {
        match user {
            Some(user) if !user.trim().is_empty() => AuthState::Authenticated { user },
            _ => AuthState::Anonymous,
        }
    }
}

/// Opens the store matching the authentication state. Both backends expose
/// the same shape; the projection engine never sees the difference.
pub fn open_store(state: &AuthState, data_dir: &Path) -> Box<dyn DataStore> {
    let file = match state {
        AuthState::Authenticated { user } => format!("{}.json", sanitize(user)),
        AuthState::Anonymous => "local.json".to_string(),
    };
    debug!(file = %file, "opening data store");
    Box::new(JsonFileStore::new(data_dir.join(file)))
}

/// Keeps owner-derived file names to a safe character set.
fn sanitize(user: &str) -> String {
    user.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_is_anonymous() {
        assert_eq!(AuthState::from_user(None), AuthState::Anonymous);
        assert_eq!(AuthState::from_user(Some("  ".into())), AuthState::Anonymous);
    }

    #[test]
    fn user_names_are_sanitized() {
        assert_eq!(sanitize("alice@example.com"), "alice_example_com");
    }
}
