//! User Entity

/// A database-backed account. `password` holds the bcrypt hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}
