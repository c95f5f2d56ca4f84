//! Analysis Store
//!
//! Append-only log of completed analyses keyed by user. Records are written
//! once and never updated or deleted; a newer record supersedes an older one.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use noviq_core::AnswerSet;

use crate::models::analysis::{AnalysisRecord, AnalysisRecordInput};
use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, business_idea, answers, analysis, created_at_ms FROM analyses";

/// Row as stored, before JSON columns are decoded
struct RawRecord {
    id: String,
    user_id: Option<String>,
    business_idea: String,
    answers: String,
    analysis: String,
    created_at_ms: i64,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            business_idea: row.get(2)?,
            answers: row.get(3)?,
            analysis: row.get(4)?,
            created_at_ms: row.get(5)?,
        })
    }

    fn decode(self) -> AppResult<AnalysisRecord> {
        let answers: AnswerSet = serde_json::from_str(&self.answers)?;
        let analysis: serde_json::Value = serde_json::from_str(&self.analysis)?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at_ms)
            .ok_or_else(|| AppError::internal(format!("bad timestamp on record {}", self.id)))?;
        Ok(AnalysisRecord {
            id: self.id,
            user_id: self.user_id,
            business_idea: self.business_idea,
            answers,
            analysis,
            created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AnalysisStore {
    db: Database,
}

impl AnalysisStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append a record stamped with the current time; returns its id.
    pub fn save(&self, input: AnalysisRecordInput) -> AppResult<String> {
        let record = self.insert_at(input, Utc::now())?;
        Ok(record.id)
    }

    /// Append a record with an explicit creation time.
    pub(crate) fn insert_at(
        &self,
        input: AnalysisRecordInput,
        created_at: DateTime<Utc>,
    ) -> AppResult<AnalysisRecord> {
        let created_at_ms = created_at.timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(created_at_ms).unwrap_or(created_at);
        let record = AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            business_idea: input.business_idea,
            answers: input.answers,
            analysis: input.analysis.into_value(),
            created_at,
        };

        let conn = self.db.get_connection()?;
        conn.execute(
            "INSERT INTO analyses (id, user_id, business_idea, answers, analysis, created_at, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.user_id,
                record.business_idea,
                serde_json::to_string(&record.answers)?,
                serde_json::to_string(&record.analysis)?,
                record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                created_at_ms,
            ],
        )?;

        tracing::info!(
            id = %record.id,
            user_id = ?record.user_id,
            "analysis saved"
        );
        Ok(record)
    }

    /// The newest record for `user_id`, if any.
    pub fn get_latest(&self, user_id: &str) -> AppResult<Option<AnalysisRecord>> {
        let conn = self.db.get_connection()?;
        let raw = conn
            .query_row(
                &format!(
                    "{} WHERE user_id = ?1 ORDER BY created_at_ms DESC, seq DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![user_id],
                RawRecord::from_row,
            )
            .optional()?;
        raw.map(RawRecord::decode).transpose()
    }

    /// Every record for `user_id`, newest first. No user means no records.
    pub fn get_all(&self, user_id: Option<&str>) -> AppResult<Vec<AnalysisRecord>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };
        let conn = self.db.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ?1 ORDER BY created_at_ms DESC, seq DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], RawRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawRecord::decode).collect()
    }
}
