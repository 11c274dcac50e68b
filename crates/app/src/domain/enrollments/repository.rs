//! Enrollments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    audit::AuditMetadata,
    domain::{
        courses::records::CourseUuid,
        enrollments::records::{EnrollmentRecord, EnrollmentUuid},
        users::records::UserUuid,
    },
};

const FIND_ACTIVE_ENROLLMENT_SQL: &str = include_str!("sql/find_active_enrollment.sql");
const CREATE_ENROLLMENT_SQL: &str = include_str!("sql/create_enrollment.sql");
const DELETE_ENROLLMENT_SQL: &str = include_str!("sql/delete_enrollment.sql");
const LIST_ENROLLMENTS_SQL: &str = include_str!("sql/list_enrollments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgEnrollmentsRepository;

impl PgEnrollmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_active_enrollment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<Option<EnrollmentRecord>, sqlx::Error> {
        query_as::<Postgres, EnrollmentRecord>(FIND_ACTIVE_ENROLLMENT_SQL)
            .bind(user.into_uuid())
            .bind(course.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_enrollment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: EnrollmentUuid,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<EnrollmentRecord, sqlx::Error> {
        query_as::<Postgres, EnrollmentRecord>(CREATE_ENROLLMENT_SQL)
            .bind(uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(course.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Soft-delete the active enrollment, if any.
    pub(crate) async fn delete_enrollment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ENROLLMENT_SQL)
            .bind(user.into_uuid())
            .bind(course.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_enrollments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<EnrollmentRecord>, sqlx::Error> {
        query_as::<Postgres, EnrollmentRecord>(LIST_ENROLLMENTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for EnrollmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: EnrollmentUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            course: CourseUuid::from_uuid(row.try_get("course_uuid")?),
            enrolled_at: row.try_get::<SqlxTimestamp, _>("enrolled_at")?.to_jiff(),
            audit: AuditMetadata::from_row(row)?,
        })
    }
}
