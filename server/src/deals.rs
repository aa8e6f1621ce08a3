//! Deal service layer: the three operations of the REST surface,
//! mutations wrapped in a single transaction each.

use chrono::{DateTime, Utc};
use entity::{deal, version};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPayload {
    pub use_cases: String,
    pub roadblocks: String,
    pub solution_recommendations: String,
    #[serde(default)]
    pub additional_comments: Option<String>,
    pub edited_by: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub deal_id: String,
    pub customer_name: String,
    pub current_stage: deal::Stage,
    #[serde(rename = "TAOwner")]
    pub ta_owner: String,
    pub version: VersionPayload,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendVersionRequest {
    pub version: VersionPayload,
    /// Absent or empty means "leave the stage unchanged".
    #[serde(default)]
    pub current_stage: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealWithVersions {
    pub id: Uuid,
    pub deal_id: String,
    pub customer_name: String,
    pub current_stage: deal::Stage,
    pub ta_owner: String,
    pub created_at: DateTime<Utc>,
    pub versions: Vec<VersionView>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionView {
    pub id: Uuid,
    pub version_number: i32,
    pub use_cases: String,
    pub roadblocks: String,
    pub solution_recommendations: String,
    pub additional_comments: Option<String>,
    pub edited_by: String,
    pub timestamp: DateTime<Utc>,
}

impl DealWithVersions {
    fn from_models(deal: deal::Model, versions: Vec<version::Model>) -> Self {
        Self {
            id: deal.id,
            deal_id: deal.deal_id,
            customer_name: deal.customer_name,
            current_stage: deal.current_stage,
            ta_owner: deal.ta_owner,
            created_at: deal.created_at.into(),
            versions: versions.into_iter().map(VersionView::from).collect(),
        }
    }
}

impl From<version::Model> for VersionView {
    fn from(model: version::Model) -> Self {
        Self {
            id: model.id,
            version_number: model.version_number,
            use_cases: model.use_cases,
            roadblocks: model.roadblocks,
            solution_recommendations: model.solution_recommendations,
            additional_comments: model.additional_comments,
            edited_by: model.edited_by,
            timestamp: model.created_at.into(),
        }
    }
}

#[derive(Debug)]
pub enum DealError {
    NotFound,
    DuplicateDealId(String),
    InvalidStage(String),
    Db(DbErr),
}

impl From<DbErr> for DealError {
    fn from(value: DbErr) -> Self {
        DealError::Db(value)
    }
}

/// All deals, newest first, with their full version history embedded
/// in ascending version order.
pub async fn list_deals(db: &DatabaseConnection) -> Result<Vec<DealWithVersions>, DealError> {
    let rows = deal::Entity::find()
        .find_with_related(version::Entity)
        .order_by_desc(deal::Column::CreatedAt)
        .order_by_asc(version::Column::VersionNumber)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(deal, versions)| DealWithVersions::from_models(deal, versions))
        .collect())
}

/// Insert a deal and its first version in one transaction. Either both
/// rows land or neither does.
pub async fn create_deal(
    db: &DatabaseConnection,
    input: CreateDealRequest,
) -> Result<(), DealError> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let deal_pk = Uuid::new_v4();
    let business_id = input.deal_id.clone();

    let row = deal::ActiveModel {
        id: Set(deal_pk),
        deal_id: Set(input.deal_id),
        customer_name: Set(input.customer_name),
        current_stage: Set(input.current_stage),
        ta_owner: Set(input.ta_owner),
        created_at: Set(now),
    };
    // exec_without_returning: the key is client-assigned, nothing to read back.
    let inserted = deal::Entity::insert(row).exec_without_returning(&txn).await;
    if let Err(err) = inserted {
        // Dropping the transaction rolls it back.
        return Err(match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => DealError::DuplicateDealId(business_id),
            _ => DealError::Db(err),
        });
    }

    insert_version(&txn, deal_pk, 1, input.version, now).await?;
    txn.commit().await?;
    info!(deal = %business_id, "deal created");
    Ok(())
}

/// Append a version to an existing deal, optionally moving its stage,
/// atomically. The exclusive row lock on the deal serializes
/// concurrent appends so version numbers stay gapless.
pub async fn append_version(
    db: &DatabaseConnection,
    deal_pk: Uuid,
    input: AppendVersionRequest,
) -> Result<(), DealError> {
    let stage = parse_optional_stage(input.current_stage.as_deref())?;

    let txn = db.begin().await?;
    let existing = deal::Entity::find_by_id(deal_pk)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(DealError::NotFound)?;

    let max: Option<Option<i32>> = version::Entity::find()
        .filter(version::Column::DealId.eq(deal_pk))
        .select_only()
        .column_as(version::Column::VersionNumber.max(), "max_number")
        .into_tuple()
        .one(&txn)
        .await?;
    let next = max.flatten().unwrap_or(0) + 1;

    if let Some(stage) = stage {
        let mut active: deal::ActiveModel = existing.into();
        active.current_stage = Set(stage);
        active.update(&txn).await?;
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    insert_version(&txn, deal_pk, next, input.version, now).await?;
    txn.commit().await?;
    info!(deal = %deal_pk, version = next, "version appended");
    Ok(())
}

async fn insert_version(
    txn: &DatabaseTransaction,
    deal_pk: Uuid,
    number: i32,
    payload: VersionPayload,
    at: DateTimeWithTimeZone,
) -> Result<(), DealError> {
    let row = version::ActiveModel {
        id: Set(Uuid::new_v4()),
        deal_id: Set(deal_pk),
        version_number: Set(number),
        use_cases: Set(payload.use_cases),
        roadblocks: Set(payload.roadblocks),
        solution_recommendations: Set(payload.solution_recommendations),
        additional_comments: Set(payload.additional_comments),
        edited_by: Set(payload.edited_by),
        created_at: Set(at),
    };
    version::Entity::insert(row)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

fn parse_optional_stage(raw: Option<&str>) -> Result<Option<deal::Stage>, DealError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DealError::InvalidStage(s.to_string())),
    }
}
