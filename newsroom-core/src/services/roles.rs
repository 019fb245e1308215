//! Role and permission checks.
//!
//! Roles are a closed set with a fixed permission mapping, checked at the
//! authorization boundary; there is no dynamic lookup by name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::{NewsroomError, Result};
use crate::domain::Author;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Every registered user.
    Common,
    /// Users allowed to publish and edit posts.
    Author,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Common => "common",
            Role::Author => "author",
        }
    }

    /// The permission set a role carries. Derived, never stored, so a
    /// repeated grant cannot duplicate it.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Common => &[],
            Role::Author => &[Permission::AddPost, Permission::ChangePost],
        }
    }
}

impl std::str::FromStr for Role {
    type Err = NewsroomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "common" => Ok(Role::Common),
            "author" => Ok(Role::Author),
            other => Err(NewsroomError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AddPost,
    ChangePost,
}

/// Grant author status: ensure an Author row exists and add the role.
/// Safe to repeat; returns the author row either way.
pub async fn grant_author(storage: &dyn Storage, user_id: Uuid) -> Result<Author> {
    let author = match storage.get_author_by_user(user_id).await? {
        Some(author) => author,
        None => {
            let author = Author::new(user_id);
            storage.create_author(&author).await?;
            author
        }
    };
    storage.grant_role(user_id, Role::Author).await?;
    Ok(author)
}

/// Remove the author role. The Author row (and its posts) stays.
pub async fn revoke_author(storage: &dyn Storage, user_id: Uuid) -> Result<bool> {
    storage.revoke_role(user_id, Role::Author).await
}

pub async fn has_role(storage: &dyn Storage, user_id: Uuid, role: Role) -> Result<bool> {
    Ok(storage.roles_of_user(user_id).await?.contains(&role))
}

pub async fn has_permission(
    storage: &dyn Storage,
    user_id: Uuid,
    permission: Permission,
) -> Result<bool> {
    let roles = storage.roles_of_user(user_id).await?;
    Ok(roles
        .iter()
        .any(|role| role.permissions().contains(&permission)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_role_carries_post_permissions() {
        assert!(Role::Author.permissions().contains(&Permission::AddPost));
        assert!(Role::Author.permissions().contains(&Permission::ChangePost));
        assert!(Role::Common.permissions().is_empty());
    }

    #[test]
    fn roles_round_trip_through_str() {
        assert_eq!("author".parse::<Role>().unwrap(), Role::Author);
        assert_eq!("common".parse::<Role>().unwrap(), Role::Common);
        assert!("staff".parse::<Role>().is_err());
    }
}
