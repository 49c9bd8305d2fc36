use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::error::StoreError;
use crate::models::{PostRow, UserRow};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, StoreError> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            )?;
            query_user_by_id(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, created_at FROM users
                 ORDER BY created_at DESC",
            )?;

            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Partial update: `None` fields keep their current value. Returns
    /// `Ok(None)` when no such user exists.
    pub fn update_user(
        &self,
        id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserRow>, StoreError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                     username = COALESCE(?2, username),
                     email    = COALESCE(?3, email)
                 WHERE id = ?1",
                rusqlite::params![id, username, email],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user_by_id(conn, id)
        })
    }

    pub fn update_user_password(&self, id: &str, password_hash: &str) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?2 WHERE id = ?1",
                (id, password_hash),
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete an account. Posts and bookings go with it via ON DELETE
    /// CASCADE.
    pub fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Posts --

    pub fn create_post(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        content: Option<&str>,
    ) -> Result<PostRow, StoreError> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (id, user_id, title, content) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, title, content],
            )?;
            query_post_by_id(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_post_by_id(&self, id: &str) -> Result<Option<PostRow>, StoreError> {
        self.with_conn(|conn| query_post_by_id(conn, id))
    }

    pub fn list_posts(&self) -> Result<Vec<PostRow>, StoreError> {
        self.with_conn(|conn| {
            // JOIN users so listings carry the author name in one query
            let mut stmt = conn.prepare(
                "SELECT p.id, p.user_id, p.title, p.content, p.created_at, u.username
                 FROM posts p
                 LEFT JOIN users u ON p.user_id = u.id
                 ORDER BY p.created_at DESC",
            )?;

            let rows = stmt
                .query_map([], post_from_joined_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn list_posts_by_user(&self, user_id: &str) -> Result<Vec<PostRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, content, created_at FROM posts
                 WHERE user_id = ?1
                 ORDER BY created_at DESC",
            )?;

            let rows = stmt
                .query_map([user_id], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Delete a post only if `user_id` owns it. The ownership condition is
    /// part of the DELETE itself; a miss and a foreign post are
    /// indistinguishable in the result.
    pub fn delete_post(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM posts WHERE id = ?1 AND user_id = ?2",
                (id, user_id),
            )?;
            Ok(changed > 0)
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        username: None,
    })
}

fn post_from_joined_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        username: row.get(5)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_from_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password, created_at FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], user_from_row).optional()?;
    Ok(row)
}

fn query_post_by_id(conn: &Connection, id: &str) -> Result<Option<PostRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.user_id, p.title, p.content, p.created_at, u.username
         FROM posts p
         LEFT JOIN users u ON p.user_id = u.id
         WHERE p.id = ?1",
    )?;

    let row = stmt.query_row([id], post_from_joined_row).optional()?;
    Ok(row)
}
