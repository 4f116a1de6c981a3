//! Process-wide state shared by every request.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;

use crate::config::ServerConfig;
use crate::db;
use crate::pipeline::llm::{ChatCompletionClient, CourseAi, LlmError};

/// Configuration plus the model clients. Wrapped in `Arc` at startup.
///
/// Holds no open database connection: each request opens its own.
pub struct CoreState {
    pub config: ServerConfig,
    ai: CourseAi,
}

impl CoreState {
    /// Build state from configuration: create the database (running
    /// migrations) and the HTTP clients for both providers.
    ///
    /// Call outside the async runtime; the provider clients are blocking.
    pub fn from_config(config: ServerConfig) -> Result<Self, CoreError> {
        let structuring = ChatCompletionClient::new(&config.structuring)?;
        let refining = ChatCompletionClient::new(&config.refining)?;
        for provider in [&config.structuring, &config.refining] {
            if provider.api_key.is_none() {
                tracing::warn!(
                    provider = %provider.name,
                    "No API key configured, generation will use placeholders"
                );
            }
        }
        let ai = CourseAi::new(Arc::new(structuring), Arc::new(refining));
        Self::with_ai(config, ai)
    }

    /// Build state around an existing `CourseAi`.
    pub fn with_ai(config: ServerConfig, ai: CourseAi) -> Result<Self, CoreError> {
        let conn = db::open_database(&config.db_path)?;
        let tables = db::count_tables(&conn)?;
        tracing::info!(path = %config.db_path.display(), tables, "Database ready");
        Ok(Self { config, ai })
    }

    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }

    /// Open a fresh connection to the application database.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::open_database(self.db_path()).map_err(CoreError::Database)
    }

    pub fn ai(&self) -> &CourseAi {
        &self.ai
    }

    pub fn password_iterations(&self) -> u32 {
        self.config.password_iterations
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.config.max_upload_bytes
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),
}

/// Test state: a temp-dir database, fast password hashing, scripted models.
#[cfg(test)]
pub(crate) fn test_core_state(
    structuring: crate::pipeline::llm::MockLlmClient,
    refining: crate::pipeline::llm::MockLlmClient,
) -> (Arc<CoreState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::from_lookup(|_| None).unwrap();
    config.db_path = dir.path().join("piggychef.db");
    config.password_iterations = 1_000;
    let ai = CourseAi::new(Arc::new(structuring), Arc::new(refining));
    (Arc::new(CoreState::with_ai(config, ai).unwrap()), dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::MockLlmClient;

    #[test]
    fn connections_share_one_database() {
        let (core, _dir) = test_core_state(MockLlmClient::new(), MockLlmClient::new());
        let a = core.open_db().unwrap();
        db::get_or_create_student(&a, "ari").unwrap();
        let b = core.open_db().unwrap();
        assert!(db::get_student_by_username(&b, "ari").unwrap().is_some());
    }

    #[test]
    fn builds_real_clients_without_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::from_lookup(|_| None).unwrap();
        config.db_path = dir.path().join("state.db");
        let core = CoreState::from_config(config).unwrap();
        assert!(core.db_path().exists());
        assert!(core.ai().refine_syllabus("raw text").is_none());
    }
}
