/// Authentication seam
///
/// Exposes the current caller identity, or none. Every mutating operation
/// consults it synchronously before touching the store; session management
/// itself lives outside the engine.
#[cfg_attr(test, mockall::automock)]
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// Fixed-identity context, useful for tests and single-user tooling
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<String>,
}

impl StaticAuth {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl AuthContext for StaticAuth {
    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_auth() {
        assert_eq!(
            StaticAuth::user("u1").current_user(),
            Some("u1".to_string())
        );
        assert_eq!(StaticAuth::anonymous().current_user(), None);
    }
}
