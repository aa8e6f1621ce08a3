//! Postgres-backed tests, skipped unless TEST_DATABASE_URL is set.
//! Each run migrates a throwaway database and drops it afterwards.

use std::sync::Arc;

use entity::{deal, version};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait, QueryOrder,
    Statement,
};
use server::deals::{self, AppendVersionRequest, CreateDealRequest, VersionPayload};
use url::Url;
use uuid::Uuid;

struct PgTestContext {
    db: Arc<DatabaseConnection>,
    admin_url: String,
    db_name: String,
}

impl PgTestContext {
    async fn new() -> Option<Self> {
        let base = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping Postgres tests: TEST_DATABASE_URL not set");
                return None;
            }
        };
        let (admin_url, db_name, test_url) = build_urls(&base)?;
        let admin = Database::connect(&admin_url).await.ok()?;
        let drop_sql = format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE);");
        let create_sql = format!("CREATE DATABASE \"{db_name}\";");
        let _ = admin
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_sql))
            .await;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                create_sql,
            ))
            .await
            .ok()?;
        let conn = Database::connect(&test_url).await.ok()?;
        Migrator::up(&conn, None).await.ok()?;
        Some(Self {
            db: Arc::new(conn),
            admin_url,
            db_name,
        })
    }

    async fn cleanup(self) {
        let Self {
            db,
            admin_url,
            db_name,
        } = self;
        drop(db);
        if let Ok(admin) = Database::connect(&admin_url).await {
            let drop_sql = format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE);");
            let _ = admin
                .execute(Statement::from_string(DatabaseBackend::Postgres, drop_sql))
                .await;
        }
    }
}

fn build_urls(base: &str) -> Option<(String, String, String)> {
    let url = Url::parse(base).ok()?;
    let db_path = url.path().trim_start_matches('/').to_string();
    let base_name = if db_path.is_empty() {
        "deal_tracker_test".to_string()
    } else {
        db_path
    };
    let db_name = format!("{}_{}", base_name, Uuid::new_v4().simple());
    let mut admin_url = url.clone();
    admin_url.set_path("/postgres");
    let mut test_url = url.clone();
    test_url.set_path(&format!("/{db_name}"));
    Some((admin_url.to_string(), db_name, test_url.to_string()))
}

fn payload(edited_by: &str) -> VersionPayload {
    VersionPayload {
        use_cases: "x".into(),
        roadblocks: "y".into(),
        solution_recommendations: "z".into(),
        additional_comments: None,
        edited_by: edited_by.into(),
    }
}

#[tokio::test]
async fn concurrent_appends_keep_version_numbers_gapless() {
    let Some(ctx) = PgTestContext::new().await else {
        return;
    };

    deals::create_deal(
        ctx.db.as_ref(),
        CreateDealRequest {
            deal_id: "D-1".into(),
            customer_name: "Acme".into(),
            current_stage: deal::Stage::Discovery,
            ta_owner: "Alice".into(),
            version: payload("Alice"),
        },
    )
    .await
    .unwrap();

    let pk = deal::Entity::find()
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .unwrap()
        .id;

    // Appends race on "read max, insert max + 1"; the exclusive row
    // lock on the deal must serialize them.
    let mut handles = Vec::new();
    for n in 0..8 {
        let db = ctx.db.clone();
        handles.push(tokio::spawn(async move {
            deals::append_version(
                db.as_ref(),
                pk,
                AppendVersionRequest {
                    version: payload(&format!("editor-{n}")),
                    current_stage: None,
                },
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let numbers: Vec<i32> = version::Entity::find()
        .order_by_asc(version::Column::VersionNumber)
        .all(ctx.db.as_ref())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(numbers, (1..=9).collect::<Vec<i32>>());

    ctx.cleanup().await;
}
