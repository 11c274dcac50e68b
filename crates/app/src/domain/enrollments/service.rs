//! Enrollments service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        courses::records::CourseUuid,
        enrollments::{
            errors::EnrollmentsServiceError,
            records::{EnrollmentRecord, EnrollmentUuid},
            repository::PgEnrollmentsRepository,
        },
        orders::{PgOrdersRepository, models::OrderStatus},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgEnrollmentsService {
    db: Db,
    repository: PgEnrollmentsRepository,
    orders_repository: PgOrdersRepository,
}

impl PgEnrollmentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgEnrollmentsRepository::new(),
            orders_repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl EnrollmentsService for PgEnrollmentsService {
    async fn enroll(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<EnrollmentRecord, EnrollmentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        if self
            .repository
            .find_active_enrollment(&mut tx, user, course)
            .await?
            .is_some()
        {
            return Err(EnrollmentsServiceError::AlreadyEnrolled);
        }

        let completed = self
            .orders_repository
            .list_orders(&mut tx, user, Some(OrderStatus::Completed))
            .await?;

        if completed.is_empty() {
            return Err(EnrollmentsServiceError::NoCompletedOrders);
        }

        if !completed.iter().any(|order| order.contains_course(course)) {
            return Err(EnrollmentsServiceError::NotPurchased);
        }

        let enrollment = self
            .repository
            .create_enrollment(&mut tx, EnrollmentUuid::new(), user, course)
            .await?;

        tx.commit().await?;

        tracing::info!(
            enrollment_uuid = %enrollment.uuid,
            user_uuid = %user,
            course_uuid = %course,
            "enrolled user in course"
        );

        Ok(enrollment)
    }

    async fn unenroll(&self, user: UserUuid, course: CourseUuid) -> Result<(), EnrollmentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let rows_affected = self.repository.delete_enrollment(&mut tx, user, course).await?;

        if rows_affected == 0 {
            return Err(EnrollmentsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_enrollments(
        &self,
        user: UserUuid,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let enrollments = self.repository.list_enrollments(&mut tx, user).await?;

        tx.commit().await?;

        Ok(enrollments)
    }

    async fn is_enrolled(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<bool, EnrollmentsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let enrollment = self
            .repository
            .find_active_enrollment(&mut tx, user, course)
            .await?;

        tx.commit().await?;

        Ok(enrollment.is_some())
    }
}

#[automock]
#[async_trait]
pub trait EnrollmentsService: Send + Sync {
    /// Enroll a user in a course they have bought through a completed order.
    async fn enroll(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<EnrollmentRecord, EnrollmentsServiceError>;

    /// Soft-delete the user's active enrollment in a course.
    async fn unenroll(&self, user: UserUuid, course: CourseUuid) -> Result<(), EnrollmentsServiceError>;

    /// Active enrollments, oldest first.
    async fn list_enrollments(
        &self,
        user: UserUuid,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentsServiceError>;

    async fn is_enrolled(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<bool, EnrollmentsServiceError>;
}
