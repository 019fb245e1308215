use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Connection, Row};
use uuid::Uuid;

use super::traits::{PostSearch, Storage};
use crate::common::error::{NewsroomError, Result};
use crate::database::DatabaseManager;
use crate::domain::*;
use crate::services::roles::Role;
use crate::tasks::TaskRecord;

/// Relational storage implementation over Turso/libSQL.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    async fn conn(&self) -> Result<Connection> {
        self.db.get_connection().await
    }
}

fn db_err(context: &str, e: impl std::fmt::Display) -> NewsroomError {
    NewsroomError::Database {
        message: format!("{context}: {e}"),
    }
}

/// Unique-constraint violations surface as conflicts so the web layer can
/// show a form error instead of a server error.
fn insert_err(context: &str, e: libsql::Error) -> NewsroomError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        NewsroomError::Conflict(format!("{context}: already exists"))
    } else {
        db_err(context, message)
    }
}

fn get_text(row: &Row, idx: i32, col: &str) -> Result<String> {
    row.get::<String>(idx)
        .map_err(|e| db_err(&format!("Failed to read column {col}"), e))
}

fn get_int(row: &Row, idx: i32, col: &str) -> Result<i64> {
    row.get::<i64>(idx)
        .map_err(|e| db_err(&format!("Failed to read column {col}"), e))
}

fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| db_err("Invalid UUID in database", e))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| db_err("Invalid timestamp in database", e))
}

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: parse_id(&get_text(row, 0, "id")?)?,
        username: get_text(row, 1, "username")?,
        email: get_text(row, 2, "email")?,
        password_hash: get_text(row, 3, "password_hash")?,
        created_at: parse_timestamp(&get_text(row, 4, "created_at")?)?,
    })
}

fn row_to_profile(row: &Row) -> Result<Profile> {
    let birth_date: Option<String> = row.get::<String>(3).ok();
    Ok(Profile {
        user_id: parse_id(&get_text(row, 0, "user_id")?)?,
        bio: get_text(row, 1, "bio")?,
        location: get_text(row, 2, "location")?,
        birth_date: birth_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| db_err("Invalid birth_date in database", e))
            })
            .transpose()?,
    })
}

fn row_to_author(row: &Row) -> Result<Author> {
    Ok(Author {
        id: parse_id(&get_text(row, 0, "id")?)?,
        user_id: parse_id(&get_text(row, 1, "user_id")?)?,
        rating: get_int(row, 2, "rating")?,
    })
}

fn row_to_category(row: &Row) -> Result<Category> {
    Ok(Category {
        id: parse_id(&get_text(row, 0, "id")?)?,
        name: get_text(row, 1, "name")?,
    })
}

const POST_COLUMNS: &str = "id, author_id, kind, title, content, rating, created_at";

fn row_to_post(row: &Row) -> Result<Post> {
    Ok(Post {
        id: parse_id(&get_text(row, 0, "id")?)?,
        author_id: parse_id(&get_text(row, 1, "author_id")?)?,
        kind: get_text(row, 2, "kind")?.parse()?,
        title: get_text(row, 3, "title")?,
        content: get_text(row, 4, "content")?,
        rating: get_int(row, 5, "rating")?,
        created_at: parse_timestamp(&get_text(row, 6, "created_at")?)?,
    })
}

const COMMENT_COLUMNS: &str = "id, post_id, user_id, body, rating, created_at";

fn row_to_comment(row: &Row) -> Result<Comment> {
    Ok(Comment {
        id: parse_id(&get_text(row, 0, "id")?)?,
        post_id: parse_id(&get_text(row, 1, "post_id")?)?,
        user_id: parse_id(&get_text(row, 2, "user_id")?)?,
        body: get_text(row, 3, "body")?,
        rating: get_int(row, 4, "rating")?,
        created_at: parse_timestamp(&get_text(row, 5, "created_at")?)?,
    })
}

fn row_to_task(row: &Row) -> Result<TaskRecord> {
    Ok(TaskRecord {
        id: parse_id(&get_text(row, 0, "id")?)?,
        name: get_text(row, 1, "name")?,
        args: get_text(row, 2, "args")?,
        attempts: get_int(row, 3, "attempts")?,
        created_at: parse_timestamp(&get_text(row, 4, "created_at")?)?,
    })
}

impl DatabaseStorage {
    async fn query_one<T>(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
        map: fn(&Row) -> Result<T>,
    ) -> Result<Option<T>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| db_err("Query failed", e))?;
        match rows.next().await.map_err(|e| db_err("Failed to read row", e))? {
            Some(row) => Ok(Some(map(&row)?)),
            None => Ok(None),
        }
    }

    async fn query_all<T>(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
        map: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| db_err("Query failed", e))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| db_err("Failed to read row", e))? {
            results.push(map(&row)?);
        }
        Ok(results)
    }

    async fn query_sum(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<i64> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| db_err("Query failed", e))?;
        match rows.next().await.map_err(|e| db_err("Failed to read row", e))? {
            Some(row) => get_int(&row, 0, "sum"),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username.clone(),
                user.email.clone(),
                user.password_hash.clone(),
                user.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to insert user", e))?;
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![user_id.to_string()],
            row_to_user,
        )
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .await
    }

    async fn users_without_profiles(&self) -> Result<Vec<User>> {
        self.query_all(
            &format!(
                "SELECT {USER_COLUMNS} FROM users u
                 LEFT JOIN profiles p ON p.user_id = u.id
                 WHERE p.user_id IS NULL"
            ),
            (),
            row_to_user,
        )
        .await
    }

    async fn create_profile(&self, profile: &Profile) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO profiles (user_id, bio, location, birth_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                profile.user_id.to_string(),
                profile.bio.clone(),
                profile.location.clone(),
                profile.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to insert profile", e))?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.query_one(
            "SELECT user_id, bio, location, birth_date FROM profiles WHERE user_id = ?1",
            params![user_id.to_string()],
            row_to_profile,
        )
        .await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<()> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "UPDATE profiles SET bio = ?2, location = ?3, birth_date = ?4 WHERE user_id = ?1",
                params![
                    profile.user_id.to_string(),
                    profile.bio.clone(),
                    profile.location.clone(),
                    profile.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                ],
            )
            .await
            .map_err(|e| db_err("Failed to update profile", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("profile", profile.user_id));
        }
        Ok(())
    }

    async fn create_author(&self, author: &Author) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO authors (id, user_id, rating) VALUES (?1, ?2, ?3)",
            params![
                author.id.to_string(),
                author.user_id.to_string(),
                author.rating,
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to insert author", e))?;
        Ok(())
    }

    async fn get_author_by_id(&self, author_id: Uuid) -> Result<Option<Author>> {
        self.query_one(
            "SELECT id, user_id, rating FROM authors WHERE id = ?1",
            params![author_id.to_string()],
            row_to_author,
        )
        .await
    }

    async fn get_author_by_user(&self, user_id: Uuid) -> Result<Option<Author>> {
        self.query_one(
            "SELECT id, user_id, rating FROM authors WHERE user_id = ?1",
            params![user_id.to_string()],
            row_to_author,
        )
        .await
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        self.query_all("SELECT id, user_id, rating FROM authors", (), row_to_author)
            .await
    }

    async fn set_author_rating(&self, author_id: Uuid, rating: i64) -> Result<()> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "UPDATE authors SET rating = ?2 WHERE id = ?1",
                params![author_id.to_string(), rating],
            )
            .await
            .map_err(|e| db_err("Failed to update author rating", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("author", author_id));
        }
        Ok(())
    }

    async fn sum_post_ratings(&self, author_id: Uuid) -> Result<i64> {
        self.query_sum(
            "SELECT COALESCE(SUM(rating), 0) FROM posts WHERE author_id = ?1",
            params![author_id.to_string()],
        )
        .await
    }

    async fn sum_comment_ratings_by_author_user(&self, author_id: Uuid) -> Result<i64> {
        self.query_sum(
            "SELECT COALESCE(SUM(c.rating), 0) FROM comments c
             JOIN authors a ON a.user_id = c.user_id
             WHERE a.id = ?1",
            params![author_id.to_string()],
        )
        .await
    }

    async fn sum_comment_ratings_on_author_posts(&self, author_id: Uuid) -> Result<i64> {
        self.query_sum(
            "SELECT COALESCE(SUM(c.rating), 0) FROM comments c
             JOIN posts p ON p.id = c.post_id
             WHERE p.author_id = ?1",
            params![author_id.to_string()],
        )
        .await
    }

    async fn top_author(&self) -> Result<Option<Author>> {
        self.query_one(
            "SELECT id, user_id, rating FROM authors ORDER BY rating DESC LIMIT 1",
            (),
            row_to_author,
        )
        .await
    }

    async fn create_category(&self, category: &Category) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2)",
            params![category.id.to_string(), category.name.clone()],
        )
        .await
        .map_err(|e| insert_err("Failed to insert category", e))?;
        Ok(())
    }

    async fn get_category_by_id(&self, category_id: Uuid) -> Result<Option<Category>> {
        self.query_one(
            "SELECT id, name FROM categories WHERE id = ?1",
            params![category_id.to_string()],
            row_to_category,
        )
        .await
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.query_one(
            "SELECT id, name FROM categories WHERE name = ?1",
            params![name],
            row_to_category,
        )
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.query_all("SELECT id, name FROM categories ORDER BY name", (), row_to_category)
            .await
    }

    async fn create_post(&self, post: &Post) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO posts (id, author_id, kind, title, content, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                post.id.to_string(),
                post.author_id.to_string(),
                post.kind.as_str(),
                post.title.clone(),
                post.content.clone(),
                post.rating,
                post.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to insert post", e))?;
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.query_one(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
            params![post_id.to_string()],
            row_to_post,
        )
        .await
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "UPDATE posts SET kind = ?2, title = ?3, content = ?4 WHERE id = ?1",
                params![
                    post.id.to_string(),
                    post.kind.as_str(),
                    post.title.clone(),
                    post.content.clone(),
                ],
            )
            .await
            .map_err(|e| db_err("Failed to update post", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("post", post.id));
        }
        Ok(())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "DELETE FROM posts WHERE id = ?1",
                params![post_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to delete post", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("post", post_id));
        }
        Ok(())
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        self.query_all(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts
                 ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
            ),
            params![limit, offset],
            row_to_post,
        )
        .await
    }

    async fn count_posts(&self) -> Result<i64> {
        self.query_sum("SELECT COUNT(*) FROM posts", ()).await
    }

    async fn search_posts(&self, search: &PostSearch) -> Result<Vec<Post>> {
        // Unused filters are bound as NULL and short-circuit in SQL, so one
        // statement covers every filter combination.
        self.query_all(
            "SELECT p.id, p.author_id, p.kind, p.title, p.content, p.rating, p.created_at
             FROM posts p
             JOIN authors a ON a.id = p.author_id
             JOIN users u ON u.id = a.user_id
             WHERE (?1 IS NULL OR p.title LIKE '%' || ?1 || '%')
               AND (?2 IS NULL OR u.username = ?2)
               AND (?3 IS NULL OR p.created_at >= ?3)
             ORDER BY p.created_at DESC",
            params![
                search.title.clone(),
                search.author_username.clone(),
                search.since.map(|s| s.to_rfc3339()),
            ],
            row_to_post,
        )
        .await
    }

    async fn posts_in_category_since(
        &self,
        category_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        self.query_all(
            &format!(
                "SELECT p.id, p.author_id, p.kind, p.title, p.content, p.rating, p.created_at
                 FROM posts p
                 JOIN post_categories pc ON pc.post_id = p.id
                 WHERE pc.category_id = ?1 AND p.created_at >= ?2
                 ORDER BY p.created_at DESC"
            ),
            params![category_id.to_string(), since.to_rfc3339()],
            row_to_post,
        )
        .await
    }

    async fn adjust_post_rating(&self, post_id: Uuid, delta: i64) -> Result<i64> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "UPDATE posts SET rating = rating + ?2 WHERE id = ?1",
                params![post_id.to_string(), delta],
            )
            .await
            .map_err(|e| db_err("Failed to adjust post rating", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("post", post_id));
        }
        self.query_sum(
            "SELECT rating FROM posts WHERE id = ?1",
            params![post_id.to_string()],
        )
        .await
    }

    async fn top_post(&self) -> Result<Option<Post>> {
        self.query_one(
            &format!("SELECT {POST_COLUMNS} FROM posts ORDER BY rating DESC LIMIT 1"),
            (),
            row_to_post,
        )
        .await
    }

    async fn attach_category(&self, post_id: Uuid, category_id: Uuid) -> Result<bool> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?1, ?2)",
                params![post_id.to_string(), category_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to attach category", e))?;
        Ok(affected > 0)
    }

    async fn categories_of_post(&self, post_id: Uuid) -> Result<Vec<Category>> {
        self.query_all(
            "SELECT c.id, c.name FROM categories c
             JOIN post_categories pc ON pc.category_id = c.id
             WHERE pc.post_id = ?1
             ORDER BY c.name",
            params![post_id.to_string()],
            row_to_category,
        )
        .await
    }

    async fn create_comment(&self, comment: &Comment) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO comments (id, post_id, user_id, body, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                comment.id.to_string(),
                comment.post_id.to_string(),
                comment.user_id.to_string(),
                comment.body.clone(),
                comment.rating,
                comment.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to insert comment", e))?;
        Ok(())
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        self.query_one(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            params![comment_id.to_string()],
            row_to_comment,
        )
        .await
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.query_all(
            &format!(
                "SELECT {COMMENT_COLUMNS} FROM comments
                 WHERE post_id = ?1 ORDER BY created_at"
            ),
            params![post_id.to_string()],
            row_to_comment,
        )
        .await
    }

    async fn adjust_comment_rating(&self, comment_id: Uuid, delta: i64) -> Result<i64> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "UPDATE comments SET rating = rating + ?2 WHERE id = ?1",
                params![comment_id.to_string(), delta],
            )
            .await
            .map_err(|e| db_err("Failed to adjust comment rating", e))?;
        if affected == 0 {
            return Err(NewsroomError::not_found("comment", comment_id));
        }
        self.query_sum(
            "SELECT rating FROM comments WHERE id = ?1",
            params![comment_id.to_string()],
        )
        .await
    }

    async fn add_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO category_subscribers (category_id, user_id) VALUES (?1, ?2)",
                params![category_id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to add subscriber", e))?;
        Ok(affected > 0)
    }

    async fn remove_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "DELETE FROM category_subscribers WHERE category_id = ?1 AND user_id = ?2",
                params![category_id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| db_err("Failed to remove subscriber", e))?;
        Ok(affected > 0)
    }

    async fn category_subscribers(&self, category_id: Uuid) -> Result<Vec<User>> {
        self.query_all(
            &format!(
                "SELECT u.id, u.username, u.email, u.password_hash, u.created_at
                 FROM users u
                 JOIN category_subscribers cs ON cs.user_id = u.id
                 WHERE cs.category_id = ?1
                 ORDER BY u.username"
            ),
            params![category_id.to_string()],
            row_to_user,
        )
        .await
    }

    async fn is_subscribed(&self, category_id: Uuid, user_id: Uuid) -> Result<bool> {
        let count = self
            .query_sum(
                "SELECT COUNT(*) FROM category_subscribers WHERE category_id = ?1 AND user_id = ?2",
                params![category_id.to_string(), user_id.to_string()],
            )
            .await?;
        Ok(count > 0)
    }

    async fn subscribed_category_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = self
            .query_all(
                "SELECT category_id FROM category_subscribers WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| get_text(row, 0, "category_id"),
            )
            .await?;
        rows.iter().map(|s| parse_id(s)).collect()
    }

    async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
                params![user_id.to_string(), role.as_str()],
            )
            .await
            .map_err(|e| db_err("Failed to grant role", e))?;
        Ok(affected > 0)
    }

    async fn revoke_role(&self, user_id: Uuid, role: Role) -> Result<bool> {
        let conn = self.conn().await?;
        let affected = conn
            .execute(
                "DELETE FROM user_roles WHERE user_id = ?1 AND role = ?2",
                params![user_id.to_string(), role.as_str()],
            )
            .await
            .map_err(|e| db_err("Failed to revoke role", e))?;
        Ok(affected > 0)
    }

    async fn roles_of_user(&self, user_id: Uuid) -> Result<Vec<Role>> {
        let names = self
            .query_all(
                "SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY role",
                params![user_id.to_string()],
                |row| get_text(row, 0, "role"),
            )
            .await?;
        names.iter().map(|s| s.parse()).collect()
    }

    async fn enqueue_task(&self, task: &TaskRecord) -> Result<()> {
        let conn = self.conn().await?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO tasks (id, name, args, status, attempts, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6)",
            params![
                task.id.to_string(),
                task.name.clone(),
                task.args.clone(),
                task.attempts,
                task.created_at.to_rfc3339(),
                now,
            ],
        )
        .await
        .map_err(|e| insert_err("Failed to enqueue task", e))?;
        Ok(())
    }

    async fn claim_pending_tasks(&self, limit: i64) -> Result<Vec<TaskRecord>> {
        let pending = self
            .query_all(
                "SELECT id, name, args, attempts, created_at FROM tasks
                 WHERE status = 'pending' ORDER BY created_at LIMIT ?1",
                params![limit],
                row_to_task,
            )
            .await?;

        let conn = self.conn().await?;
        let mut claimed = Vec::with_capacity(pending.len());
        for mut task in pending {
            let affected = conn
                .execute(
                    "UPDATE tasks SET status = 'running', attempts = attempts + 1, updated_at = ?2
                     WHERE id = ?1 AND status = 'pending'",
                    params![task.id.to_string(), Utc::now().to_rfc3339()],
                )
                .await
                .map_err(|e| db_err("Failed to claim task", e))?;
            if affected > 0 {
                task.attempts += 1;
                claimed.push(task);
            }
        }
        Ok(claimed)
    }

    async fn mark_task_done(&self, task_id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "UPDATE tasks SET status = 'done', updated_at = ?2 WHERE id = ?1",
            params![task_id.to_string(), Utc::now().to_rfc3339()],
        )
        .await
        .map_err(|e| db_err("Failed to mark task done", e))?;
        Ok(())
    }

    async fn mark_task_failed(&self, task_id: Uuid) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "UPDATE tasks SET status = 'failed', updated_at = ?2 WHERE id = ?1",
            params![task_id.to_string(), Utc::now().to_rfc3339()],
        )
        .await
        .map_err(|e| db_err("Failed to mark task failed", e))?;
        Ok(())
    }

    async fn pending_tasks(&self) -> Result<Vec<TaskRecord>> {
        self.query_all(
            "SELECT id, name, args, attempts, created_at FROM tasks
             WHERE status = 'pending' ORDER BY created_at",
            (),
            row_to_task,
        )
        .await
    }
}
