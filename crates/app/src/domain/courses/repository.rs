//! Courses Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    audit::AuditMetadata,
    database::{amount_to_i64, try_get_amount},
    domain::courses::{
        data::NewCourse,
        records::{CourseRecord, CourseUuid},
    },
};

const GET_COURSE_SQL: &str = include_str!("sql/get_course.sql");
const CREATE_COURSE_SQL: &str = include_str!("sql/create_course.sql");
const UPDATE_COURSE_PRICE_SQL: &str = include_str!("sql/update_course_price.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCoursesRepository;

impl PgCoursesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_course(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        course: CourseUuid,
    ) -> Result<CourseRecord, sqlx::Error> {
        query_as::<Postgres, CourseRecord>(GET_COURSE_SQL)
            .bind(course.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_course(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        course: &NewCourse,
    ) -> Result<CourseRecord, sqlx::Error> {
        query_as::<Postgres, CourseRecord>(CREATE_COURSE_SQL)
            .bind(course.uuid.into_uuid())
            .bind(&course.title)
            .bind(amount_to_i64(course.price, "price")?)
            .bind(course.published)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_course_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        course: CourseUuid,
        price: u64,
    ) -> Result<CourseRecord, sqlx::Error> {
        query_as::<Postgres, CourseRecord>(UPDATE_COURSE_PRICE_SQL)
            .bind(course.into_uuid())
            .bind(amount_to_i64(price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CourseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CourseUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            price: try_get_amount(row, "price")?,
            published: row.try_get("published")?,
            audit: AuditMetadata::from_row(row)?,
        })
    }
}
