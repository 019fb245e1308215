use libsql::{Builder, Connection, Database};
use tracing::info;

use crate::common::error::{NewsroomError, Result};
use crate::config::DatabaseSettings;

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Connect to the configured database: remote Turso when the URL says
    /// so, a local file otherwise.
    pub async fn new(settings: &DatabaseSettings) -> Result<Self> {
        let db = if settings.is_remote() {
            let auth_token = settings.auth_token.clone().ok_or_else(|| {
                NewsroomError::database("NEWSROOM_DB_AUTH_TOKEN not set for remote database")
            })?;

            info!("Connecting to remote database at {}", settings.url);

            Builder::new_remote(settings.url.clone(), auth_token)
                .build()
                .await
                .map_err(|e| NewsroomError::Database {
                    message: format!("Failed to connect to database: {e}"),
                })?
        } else {
            let path = settings.url.trim_start_matches("file:");
            info!("Opening local database at {}", path);

            Builder::new_local(path)
                .build()
                .await
                .map_err(|e| NewsroomError::Database {
                    message: format!("Failed to open local database: {e}"),
                })?
        };

        Ok(Self { db })
    }

    /// Open a throwaway local database file, for tests and tooling.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| NewsroomError::Database {
                message: format!("Failed to open local database: {e}"),
            })?;
        Ok(Self { db })
    }

    /// Get a connection to the database
    pub async fn get_connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| NewsroomError::Database {
            message: format!("Failed to get database connection: {e}"),
        })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;

        let migration_sql_001 = include_str!("../migrations/001_create_schema.sql");
        conn.execute_batch(migration_sql_001)
            .await
            .map_err(|e| NewsroomError::Database {
                message: format!("Failed to run base migration: {e}"),
            })?;

        let migration_sql_002 = include_str!("../migrations/002_indexes.sql");
        conn.execute_batch(migration_sql_002)
            .await
            .map_err(|e| NewsroomError::Database {
                message: format!("Failed to run index migration: {e}"),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}
