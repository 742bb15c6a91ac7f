//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use questhub_auth::jwt::{JwtDecoder, JwtEncoder};
use questhub_auth::password::{PasswordHasher, PasswordValidator};
use questhub_auth::rbac::RbacEnforcer;
use questhub_auth::social::{FacebookVerifier, SocialTokenVerifier};
use questhub_cache::CacheManager;
use questhub_core::config::AppConfig;
use questhub_core::result::AppResult;
use questhub_database::DatabasePool;
use questhub_database::repositories::{
    AttractionRepository, FeeSplitRepository, MediaRepository, PartnerRepository,
    PointRepository, QuestRepository, RiderRepository, ShopRepository, ShopRequestRepository,
    SubmissionRepository, UserRepository,
};
use questhub_service::{
    AdminUserService, AttractionService, AuthService, CommissionService, MediaService,
    PartnerService, QuestService, RiderService, ShopRequestService, ShopService,
    SubmissionService, UserService,
};
use questhub_storage::StorageManager;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// Cache manager (Redis or in-memory)
    pub cache: CacheManager,
    /// Image storage
    pub storage: Arc<StorageManager>,
    /// Access token validation
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Per-IP request budgets
    pub rate_limiter: RateLimiter,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub admin_user_service: Arc<AdminUserService>,
    pub partner_service: Arc<PartnerService>,
    pub shop_request_service: Arc<ShopRequestService>,
    pub shop_service: Arc<ShopService>,
    pub rider_service: Arc<RiderService>,
    pub quest_service: Arc<QuestService>,
    pub submission_service: Arc<SubmissionService>,
    pub attraction_service: Arc<AttractionService>,
    pub commission_service: Arc<CommissionService>,
    pub media_service: Arc<MediaService>,
}

impl AppState {
    /// Wire repositories, auth and services on top of a database pool.
    ///
    /// The cache and storage providers are built from configuration here, so
    /// a misconfigured provider fails start-up rather than the first request.
    pub async fn build(config: AppConfig, db: DatabasePool) -> AppResult<Self> {
        let cache = CacheManager::new(&config.cache).await?;
        let storage = Arc::new(StorageManager::from_config(&config.storage).await?);
        let social: Arc<dyn SocialTokenVerifier> =
            Arc::new(FacebookVerifier::new(&config.facebook)?);
        Ok(Self::with_providers(config, db, cache, storage, social))
    }

    /// Wire everything around already-built providers.
    pub fn with_providers(
        config: AppConfig,
        db: DatabasePool,
        cache: CacheManager,
        storage: Arc<StorageManager>,
        social: Arc<dyn SocialTokenVerifier>,
    ) -> Self {
        let pool = db.pool().clone();

        // ── Repositories ─────────────────────────────────────
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let point_repo = Arc::new(PointRepository::new(pool.clone()));
        let partner_repo = Arc::new(PartnerRepository::new(pool.clone()));
        let request_repo = Arc::new(ShopRequestRepository::new(pool.clone()));
        let shop_repo = Arc::new(ShopRepository::new(pool.clone()));
        let rider_repo = Arc::new(RiderRepository::new(pool.clone()));
        let quest_repo = Arc::new(QuestRepository::new(pool.clone()));
        let submission_repo = Arc::new(SubmissionRepository::new(pool.clone()));
        let attraction_repo = Arc::new(AttractionRepository::new(pool.clone()));
        let fee_repo = Arc::new(FeeSplitRepository::new(pool.clone()));
        let media_repo = Arc::new(MediaRepository::new(pool));

        // ── Auth ─────────────────────────────────────────────
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, cache.clone()));
        let rbac = Arc::new(RbacEnforcer::new());

        // ── Services ─────────────────────────────────────────
        let market = &config.marketplace;
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repo),
            Arc::clone(&hasher),
            Arc::clone(&validator),
            jwt_encoder,
            Arc::clone(&jwt_decoder),
            social,
            &config.auth,
        ));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&user_repo),
            point_repo,
            Arc::clone(&hasher),
            Arc::clone(&validator),
            Arc::clone(&jwt_decoder),
        ));
        let admin_user_service = Arc::new(AdminUserService::new(
            user_repo,
            hasher,
            validator,
            Arc::clone(&jwt_decoder),
            Arc::clone(&rbac),
        ));
        let partner_service = Arc::new(PartnerService::new(
            Arc::clone(&partner_repo),
            Arc::clone(&shop_repo),
            Arc::clone(&request_repo),
            Arc::clone(&fee_repo),
            Arc::clone(&attraction_repo),
            Arc::clone(&rbac),
            market,
        ));
        let shop_request_service = Arc::new(ShopRequestService::new(
            request_repo,
            Arc::clone(&partner_repo),
            Arc::clone(&shop_repo),
            Arc::clone(&rbac),
            market,
        ));
        let shop_service = Arc::new(ShopService::new(
            Arc::clone(&shop_repo),
            Arc::clone(&partner_repo),
            Arc::clone(&media_repo),
            Arc::clone(&rbac),
            market,
        ));
        let rider_service = Arc::new(RiderService::new(
            rider_repo,
            Arc::clone(&partner_repo),
            Arc::clone(&media_repo),
            Arc::clone(&rbac),
        ));
        let quest_service = Arc::new(QuestService::new(
            quest_repo,
            Arc::clone(&shop_repo),
            Arc::clone(&rbac),
            market,
        ));
        let submission_service = Arc::new(SubmissionService::new(
            submission_repo,
            Arc::clone(&media_repo),
            Arc::clone(&quest_service),
            Arc::clone(&rbac),
            market,
        ));
        let attraction_service = Arc::new(AttractionService::new(
            attraction_repo,
            Arc::clone(&partner_repo),
            Arc::clone(&media_repo),
            Arc::clone(&rbac),
            market,
        ));
        let commission_service = Arc::new(CommissionService::new(
            fee_repo,
            shop_repo,
            partner_repo,
            Arc::clone(&rbac),
        ));
        let media_service = Arc::new(MediaService::new(media_repo, Arc::clone(&storage), rbac));

        let rate_limiter = RateLimiter::new(cache.clone(), &config.rate_limit);

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            db,
            cache,
            storage,
            jwt_decoder,
            rate_limiter,
            auth_service,
            user_service,
            admin_user_service,
            partner_service,
            shop_request_service,
            shop_service,
            rider_service,
            quest_service,
            submission_service,
            attraction_service,
            commission_service,
            media_service,
        }
    }
}
