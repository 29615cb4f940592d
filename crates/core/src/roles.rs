//! Role names carried in access tokens and stored on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";

/// Every role a user row may hold.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR];

/// Whether the role may create, modify, or delete site content.
pub fn can_edit_content(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_EDITOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_editing_roles() {
        assert!(can_edit_content(ROLE_ADMIN));
        assert!(can_edit_content(ROLE_EDITOR));
        assert!(!can_edit_content("viewer"));
        assert!(!can_edit_content(""));
    }
}
