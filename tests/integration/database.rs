//! PostgreSQL-backed test fixtures.
//!
//! Tests run against the server named by `QUESTHUB_TEST_DATABASE_URL` and are
//! skipped when it is unset. Each test migrates a schema of its own, so tests
//! run in parallel without seeing each other's rows.

#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use questhub_database::migration::run_migrations;
use questhub_database::repositories::{PartnerRepository, UserRepository};
use questhub_entity::ReviewStatus;
use questhub_entity::partner::{CreatePartner, Partner};
use questhub_entity::user::{CreateUser, User, UserRole};

/// Environment variable naming the test server.
pub const DATABASE_URL_VAR: &str = "QUESTHUB_TEST_DATABASE_URL";

/// A migrated, throwaway schema.
pub struct TestDatabase {
    /// Pool whose connections resolve names in the test schema
    pub pool: PgPool,
    schema: String,
    admin_pool: PgPool,
}

impl TestDatabase {
    /// Create and migrate a fresh schema, or `None` when no test server is
    /// configured.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{DATABASE_URL_VAR} is not set, skipping database test");
            return None;
        };
        let schema = format!("qh_test_{}", Uuid::new_v4().simple());

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&url)
            .await
            .expect("Failed to connect to test database");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("Invalid test database URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .expect("Failed to connect to test schema");
        run_migrations(&pool).await.expect("Failed to run migrations");

        Some(Self {
            pool,
            schema,
            admin_pool,
        })
    }

    /// Drop the schema and everything in it.
    pub async fn cleanup(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin_pool)
            .await
            .expect("Failed to drop test schema");
        self.admin_pool.close().await;
    }

    /// Insert an account with a placeholder password hash.
    pub async fn user(&self, role: UserRole) -> User {
        let name = format!("u{}", &Uuid::new_v4().simple().to_string()[..12]);
        UserRepository::new(self.pool.clone())
            .create(&CreateUser {
                username: name,
                email: None,
                phone: None,
                password_hash: Some("$argon2id$placeholder".to_string()),
                facebook_id: None,
                display_name: None,
                province: None,
                role,
            })
            .await
            .expect("Failed to create user")
    }

    /// Insert an approved partner working in `province`.
    pub async fn approved_partner(&self, province: &str, reviewer: Uuid) -> Partner {
        let owner = self.user(UserRole::User).await;
        let repo = PartnerRepository::new(self.pool.clone());
        let partner = repo
            .create(
                &CreatePartner {
                    user_id: owner.id,
                    full_name: format!("Partner {}", owner.username),
                    phone: "0812345678".to_string(),
                    province: province.to_string(),
                    bank_name: None,
                    bank_account_name: None,
                    bank_account_number: None,
                },
                1_000,
            )
            .await
            .expect("Failed to create partner");
        let code = owner.username[1..9].to_uppercase();
        repo.approve(partner.id, ReviewStatus::Pending, reviewer, &code, 1_000)
            .await
            .expect("Failed to approve partner")
            .expect("Partner was not pending")
    }

    /// Reload a partner row.
    pub async fn partner(&self, id: Uuid) -> Partner {
        PartnerRepository::new(self.pool.clone())
            .find_by_id(id)
            .await
            .expect("Failed to load partner")
            .expect("Partner not found")
    }

    /// Reload a user row.
    pub async fn reload_user(&self, id: Uuid) -> User {
        UserRepository::new(self.pool.clone())
            .find_by_id(id)
            .await
            .expect("Failed to load user")
            .expect("User not found")
    }
}
