//! Application State
//!
//! Shared services handed to every HTTP handler. Cloning is cheap; all
//! members share the same connection pool and provider clients.

use crate::models::settings::ServerConfig;
use crate::services::{AccountService, AiGateway, AnalysisStore, SubmissionService};
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    /// SQLite database with connection pool
    database: Database,
    gateway: AiGateway,
    analyses: AnalysisStore,
    submissions: SubmissionService,
    accounts: AccountService,
}

impl AppState {
    pub fn new(database: Database, gateway: AiGateway) -> Self {
        let analyses = AnalysisStore::new(database.clone());
        Self {
            submissions: SubmissionService::new(gateway.clone(), analyses.clone()),
            accounts: AccountService::new(database.clone()),
            analyses,
            gateway,
            database,
        }
    }

    /// Open the database and build the providers. Any missing piece is fatal.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::config("DATABASE_URL is not set"))?;
        let database = Database::open(url)?;
        let gateway = AiGateway::from_config(config)?;
        Ok(Self::new(database, gateway))
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    pub fn analyses(&self) -> &AnalysisStore {
        &self.analyses
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn is_database_healthy(&self) -> bool {
        self.database.is_healthy()
    }
}
