use thiserror::Error;

use crate::models::User;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("user not found")]
pub struct UserNotFound(pub i64);

/// Read-only table of the users the publisher knows about. Built once at
/// startup and shared by every request.
#[derive(Clone, Debug)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    // ids are expected to be unique but duplicates are tolerated, first one wins
    pub fn find(&self, id: i64) -> Result<&User, UserNotFound> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or(UserNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new(vec![
            User::new(1, "John"),
            User::new(2, "Jane"),
            User::new(3, "Doe"),
            User::new(4, "Smith"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_users() {
        let directory = UserDirectory::default();

        assert_eq!(directory.find(2), Ok(&User::new(2, "Jane")));
        assert_eq!(directory.find(4), Ok(&User::new(4, "Smith")));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let directory = UserDirectory::default();

        let err = directory.find(99).unwrap_err();

        assert_eq!(err, UserNotFound(99));
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn first_match_wins() {
        let directory = UserDirectory::new(vec![User::new(7, "First"), User::new(7, "Second")]);

        assert_eq!(directory.find(7).map(|user| user.name.as_str()), Ok("First"));
    }
}
