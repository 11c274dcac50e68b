//! Courses service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::courses::{
        data::NewCourse,
        errors::CoursesServiceError,
        records::{CourseRecord, CourseUuid},
        repository::PgCoursesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCoursesService {
    db: Db,
    repository: PgCoursesRepository,
}

impl PgCoursesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCoursesRepository::new(),
        }
    }
}

#[async_trait]
impl CoursesService for PgCoursesService {
    async fn get_course(&self, course: CourseUuid) -> Result<CourseRecord, CoursesServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let course = self.repository.get_course(&mut tx, course).await?;

        tx.commit().await?;

        Ok(course)
    }

    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, CoursesServiceError> {
        if course.title.trim().is_empty() {
            return Err(CoursesServiceError::InvalidData);
        }

        let mut tx = self.db.begin_unit_of_work().await?;

        let created = self.repository.create_course(&mut tx, &course).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn reprice_course(
        &self,
        course: CourseUuid,
        price: u64,
    ) -> Result<CourseRecord, CoursesServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let updated = self
            .repository
            .update_course_price(&mut tx, course, price)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait CoursesService: Send + Sync {
    /// Retrieve a single live course.
    async fn get_course(&self, course: CourseUuid) -> Result<CourseRecord, CoursesServiceError>;

    /// Seed a course into the catalog.
    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, CoursesServiceError>;

    /// Change a course's list price. Existing basket and order prices are unaffected.
    async fn reprice_course(
        &self,
        course: CourseUuid,
        price: u64,
    ) -> Result<CourseRecord, CoursesServiceError>;
}
