//! NCM Service - business logic for the MERCOSUL classification master table
//!
//! This module contains the import run (batched upserts) and the lookup
//! queries, called through Axum handlers or directly by the one-shot import
//! mode of the server binary.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::collections::HashMap;
use std::fmt;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::import::{self, NcmRecord};
use crate::models::Ncm;
use crate::models::ncm::{self, ActiveModel as NcmActiveModel, Entity as NcmEntity};
use crate::utils::batch::run_in_batches;

/// Upserts issued concurrently per import batch.
pub const IMPORT_BATCH_SIZE: usize = 500;

/// Queries shorter than this return nothing (autocomplete guard).
pub const MIN_QUERY_LEN: usize = 4;

pub const DEFAULT_SEARCH_LIMIT: u64 = 20;
pub const MAX_SEARCH_LIMIT: u64 = 50;

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    Feed(String),
    NotFound,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Database(msg) => write!(f, "Database error: {}", msg),
            ServiceError::Feed(msg) => write!(f, "Feed error: {}", msg),
            ServiceError::NotFound => write!(f, "Resource not found"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Tag with count for UI display
#[derive(Debug, Clone, serde::Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Upsert canonical records in fixed-size concurrent batches. A single
/// failing upsert aborts the whole run; a rerun is safe because upserts are
/// keyed by code.
pub async fn import_ncms(
    db: &DatabaseConnection,
    records: &[NcmRecord],
) -> Result<usize, ServiceError> {
    tracing::info!("Importing {} unique NCMs", records.len());

    run_in_batches(records, IMPORT_BATCH_SIZE, |record| upsert_ncm(db, record)).await
}

/// Load the MERCOSUL feed from disk and import it.
pub async fn import_feed(db: &DatabaseConnection, path: &str) -> Result<usize, ServiceError> {
    let raw = import::load_feed(path).map_err(ServiceError::Feed)?;
    let records = import::canonicalize(raw);

    import_ncms(db, &records).await
}

async fn upsert_ncm(db: &DatabaseConnection, record: &NcmRecord) -> Result<(), ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();

    let active = NcmActiveModel {
        code: Set(record.code.clone()),
        description: Set(record.description.clone()),
        classification: Set(record.classification.clone()),
        tags: Set(serde_json::to_string(&record.tags).unwrap_or_else(|_| "[]".to_string())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    NcmEntity::insert(active)
        .on_conflict(
            OnConflict::column(ncm::Column::Code)
                .update_columns([
                    ncm::Column::Description,
                    ncm::Column::Classification,
                    ncm::Column::Tags,
                    ncm::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT)
}

/// Smart search: code prefix or case-insensitive description substring,
/// ordered by code.
pub async fn search_ncms(
    db: &DatabaseConnection,
    query: &str,
    limit: Option<u64>,
) -> Result<Vec<Ncm>, ServiceError> {
    let query = query.trim();

    if query.chars().count() < MIN_QUERY_LEN {
        return Ok(Vec::new());
    }

    let models = NcmEntity::find()
        .filter(
            Condition::any()
                .add(ncm::Column::Code.starts_with(query))
                .add(ncm::Column::Description.contains(query)),
        )
        .order_by_asc(ncm::Column::Code)
        .limit(clamp_limit(limit))
        .all(db)
        .await?;

    Ok(models.into_iter().map(Ncm::from).collect())
}

/// List records, optionally restricted to those whose tag set intersects
/// `tags`.
pub async fn list_ncms(
    db: &DatabaseConnection,
    tags: &[String],
    limit: Option<u64>,
) -> Result<Vec<Ncm>, ServiceError> {
    let mut query = NcmEntity::find();

    if let Some(condition) = tags_condition(tags) {
        query = query.filter(condition);
    }

    let models = query
        .order_by_asc(ncm::Column::Code)
        .limit(clamp_limit(limit))
        .all(db)
        .await?;

    Ok(models.into_iter().map(Ncm::from).collect())
}

/// Count records, optionally restricted by tag intersection.
pub async fn count_ncms(db: &DatabaseConnection, tags: &[String]) -> Result<u64, ServiceError> {
    let mut query = NcmEntity::find();

    if let Some(condition) = tags_condition(tags) {
        query = query.filter(condition);
    }

    Ok(query.count(db).await?)
}

// Tags are stored as a JSON array, so membership is a quoted-substring match.
fn tags_condition(tags: &[String]) -> Option<Condition> {
    let mut condition = Condition::any();
    let mut any = false;

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        condition = condition.add(ncm::Column::Tags.contains(&format!("\"{}\"", tag)));
        any = true;
    }

    any.then_some(condition)
}

/// Fetch a specific record by its 8-digit code.
pub async fn get_by_code(db: &DatabaseConnection, code: &str) -> Result<Ncm, ServiceError> {
    let model = NcmEntity::find()
        .filter(ncm::Column::Code.eq(code))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Ncm::from(model))
}

/// Fetch one arbitrary record. Used to smoke-test the data shape after an
/// import run.
pub async fn first_ncm(db: &DatabaseConnection) -> Result<Option<Ncm>, ServiceError> {
    Ok(NcmEntity::find().one(db).await?.map(Ncm::from))
}

/// Full table ordered by code, for the spreadsheet export.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Ncm>, ServiceError> {
    let models = NcmEntity::find()
        .order_by_asc(ncm::Column::Code)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Ncm::from).collect())
}

/// All tags in use with per-tag record counts, most frequent first.
pub async fn list_tag_counts(db: &DatabaseConnection) -> Result<Vec<TagCount>, ServiceError> {
    let models = NcmEntity::find().all(db).await?;

    let mut counts: HashMap<String, usize> = HashMap::new();

    for model in models {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(&model.tags) {
            for tag in tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();

    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    Ok(tags)
}
