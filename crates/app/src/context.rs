//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{PgSessionsService, SessionSettings, SessionsService},
    database::{self, Db},
    domain::{
        baskets::{BasketsService, PgBasketsService},
        courses::{CoursesService, PgCoursesService},
        enrollments::{EnrollmentsService, PgEnrollmentsService},
        orders::{OrdersService, PgOrdersService},
        payments::{
            PaymentSettings, PaymentsService, PgPaymentsService,
            stripe::{StripeConfig, StripeGateway},
        },
        users::{PgUserDirectory, UserDirectory},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Everything the services need besides a database connection.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub sessions: SessionSettings,
    pub payments: PaymentSettings,
    pub stripe: StripeConfig,

    /// Apply pending migrations before serving.
    pub run_migrations: bool,
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserDirectory>,
    pub courses: Arc<dyn CoursesService>,
    pub baskets: Arc<dyn BasketsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub enrollments: Arc<dyn EnrollmentsService>,
    pub sessions: Arc<dyn SessionsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        Ok(Self::from_db(Db::new(pool), settings))
    }

    /// Wire every service onto one shared database handle.
    #[must_use]
    pub fn from_db(db: Db, settings: AppSettings) -> Self {
        let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(db.clone()));
        let gateway = Arc::new(StripeGateway::new(settings.stripe));

        Self {
            sessions: Arc::new(PgSessionsService::new(
                db.clone(),
                Arc::clone(&users),
                &settings.sessions,
            )),
            users,
            courses: Arc::new(PgCoursesService::new(db.clone())),
            baskets: Arc::new(PgBasketsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            payments: Arc::new(PgPaymentsService::new(
                db.clone(),
                gateway,
                settings.payments,
            )),
            enrollments: Arc::new(PgEnrollmentsService::new(db)),
        }
    }
}
