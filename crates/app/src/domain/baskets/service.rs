//! Baskets service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        baskets::{
            errors::BasketsServiceError,
            models::{Basket, BasketStatus, BasketUuid},
            repositories::{PgBasketItemsRepository, PgBasketsRepository},
        },
        courses::{PgCoursesRepository, records::CourseUuid},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgBasketsService {
    db: Db,
    baskets_repository: PgBasketsRepository,
    items_repository: PgBasketItemsRepository,
    courses_repository: PgCoursesRepository,
}

impl PgBasketsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            baskets_repository: PgBasketsRepository::new(),
            items_repository: PgBasketItemsRepository::new(),
            courses_repository: PgCoursesRepository::new(),
        }
    }

    async fn find_current_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<Basket>, BasketsServiceError> {
        let Some(header) = self.baskets_repository.find_current_basket(tx, user).await? else {
            return Ok(None);
        };

        let items = self.items_repository.get_basket_items(tx, header.uuid).await?;

        Ok(Some(header.with_items(items)))
    }

    /// The user's current basket, created when absent. A concurrent creator
    /// wins silently and its basket is used instead.
    async fn current_basket_or_create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Basket, BasketsServiceError> {
        if let Some(basket) = self.find_current_basket(tx, user).await? {
            return Ok(basket);
        }

        let created = self
            .baskets_repository
            .create_basket_if_absent(tx, BasketUuid::new(), user)
            .await?;

        if created > 0 {
            tracing::debug!(user_uuid = %user, "created basket");
        }

        self.find_current_basket(tx, user)
            .await?
            .ok_or(BasketsServiceError::NotFound)
    }
}

#[async_trait]
impl BasketsService for PgBasketsService {
    async fn get_active_basket(&self, user: UserUuid) -> Result<Option<Basket>, BasketsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let basket = self.find_current_basket(&mut tx, user).await?;

        tx.commit().await?;

        Ok(basket)
    }

    async fn add_course(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let course = self
            .courses_repository
            .get_course(&mut tx, course)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => BasketsServiceError::CourseNotFound,
                other => other.into(),
            })?;

        let mut basket = self.current_basket_or_create(&mut tx, user).await?;

        let item = basket.add_course(&course)?.clone();

        self.items_repository
            .create_basket_item(&mut tx, basket.uuid(), &item)
            .await?;

        self.baskets_repository
            .touch_basket(&mut tx, basket.uuid())
            .await?;

        tx.commit().await?;

        Ok(basket)
    }

    async fn remove_course(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let mut basket = self.current_basket_or_create(&mut tx, user).await?;

        basket.remove_course(course)?;

        let rows_affected = self
            .items_repository
            .delete_basket_item(&mut tx, basket.uuid(), course)
            .await?;

        if rows_affected == 0 {
            return Err(BasketsServiceError::Conflict);
        }

        // An emptied checked-out basket can never become an order.
        if basket.status() == BasketStatus::Completed && basket.is_empty() {
            basket.retire();

            self.baskets_repository
                .retire_basket(&mut tx, basket.uuid())
                .await?;

            tracing::debug!(basket_uuid = %basket.uuid(), "retired emptied basket");
        } else {
            self.baskets_repository
                .touch_basket(&mut tx, basket.uuid())
                .await?;
        }

        tx.commit().await?;

        Ok(basket)
    }

    async fn clear_basket(&self, user: UserUuid) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let mut basket = self.current_basket_or_create(&mut tx, user).await?;

        let removed = basket.clear()?;

        self.items_repository
            .delete_basket_items(&mut tx, basket.uuid())
            .await?;

        self.baskets_repository
            .touch_basket(&mut tx, basket.uuid())
            .await?;

        tx.commit().await?;

        tracing::debug!(
            basket_uuid = %basket.uuid(),
            removed = removed.len(),
            "cleared basket"
        );

        Ok(basket)
    }

    async fn complete_basket(&self, user: UserUuid) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_unit_of_work().await?;

        let mut basket = self.current_basket_or_create(&mut tx, user).await?;

        basket.complete()?;

        self.baskets_repository
            .update_basket_status(&mut tx, basket.uuid(), basket.status())
            .await?;

        tx.commit().await?;

        tracing::info!(
            basket_uuid = %basket.uuid(),
            user_uuid = %user,
            total = basket.total(),
            "completed basket"
        );

        Ok(basket)
    }
}

#[automock]
#[async_trait]
pub trait BasketsService: Send + Sync {
    /// The user's current basket, if one exists. Never creates one.
    async fn get_active_basket(&self, user: UserUuid) -> Result<Option<Basket>, BasketsServiceError>;

    /// Add a course at its current list price, creating the basket if needed.
    async fn add_course(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<Basket, BasketsServiceError>;

    /// Remove a course from the current basket. Removing the last course from
    /// a completed basket retires it, so the next mutation starts a new one.
    async fn remove_course(
        &self,
        user: UserUuid,
        course: CourseUuid,
    ) -> Result<Basket, BasketsServiceError>;

    /// Remove every item from the current basket.
    async fn clear_basket(&self, user: UserUuid) -> Result<Basket, BasketsServiceError>;

    /// Mark the current basket as checked out.
    async fn complete_basket(&self, user: UserUuid) -> Result<Basket, BasketsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            baskets::{errors::BasketError, models::BasketStatus},
            courses::{CoursesService, data::NewCourse},
        },
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn get_active_basket_is_none_for_new_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn add_course_creates_basket_with_price_snapshot() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(50_00).await;

        let basket = ctx.baskets.add_course(user.uuid, course.uuid).await?;

        assert_eq!(basket.user(), user.uuid);
        assert_eq!(basket.status(), BasketStatus::Active);
        assert_eq!(basket.total(), 50_00);

        ctx.courses.reprice_course(course.uuid, 80_00).await?;

        let reloaded = ctx
            .baskets
            .get_active_basket(user.uuid)
            .await?
            .ok_or("basket should exist")?;

        assert_eq!(reloaded.uuid(), basket.uuid());
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.total(), 50_00);

        Ok(())
    }

    #[tokio::test]
    async fn items_are_returned_in_insertion_order() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let first = ctx.create_course(10_00).await;
        let second = ctx.create_course(20_00).await;

        ctx.baskets.add_course(user.uuid, second.uuid).await?;
        ctx.baskets.add_course(user.uuid, first.uuid).await?;

        let basket = ctx
            .baskets
            .get_active_basket(user.uuid)
            .await?
            .ok_or("basket should exist")?;

        let courses: Vec<_> = basket.items().iter().map(|item| item.course()).collect();

        assert_eq!(courses, vec![second.uuid, first.uuid]);

        Ok(())
    }

    #[tokio::test]
    async fn add_same_course_twice_returns_duplicate_item() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        ctx.baskets.add_course(user.uuid, course.uuid).await?;

        let result = ctx.baskets.add_course(user.uuid, course.uuid).await;

        assert!(
            matches!(
                result,
                Err(BasketsServiceError::Basket(BasketError::DuplicateItem(c))) if c == course.uuid
            ),
            "expected DuplicateItem, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_unknown_course_returns_course_not_found_without_creating_basket() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        let result = ctx.baskets.add_course(user.uuid, CourseUuid::new()).await;

        assert!(
            matches!(result, Err(BasketsServiceError::CourseNotFound)),
            "expected CourseNotFound, got {result:?}"
        );
        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn add_unpublished_course_returns_course_unavailable() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        let draft = ctx
            .courses
            .create_course(NewCourse {
                uuid: CourseUuid::new(),
                title: "Draft".to_string(),
                price: 10_00,
                published: false,
            })
            .await?;

        let result = ctx.baskets.add_course(user.uuid, draft.uuid).await;

        assert!(
            matches!(
                result,
                Err(BasketsServiceError::Basket(BasketError::CourseUnavailable(_)))
            ),
            "expected CourseUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_missing_course_returns_item_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        let result = ctx.baskets.remove_course(user.uuid, CourseUuid::new()).await;

        assert!(
            matches!(
                result,
                Err(BasketsServiceError::Basket(BasketError::ItemNotFound(_)))
            ),
            "expected ItemNotFound, got {result:?}"
        );

        // The failed request rolls back the lazily created basket.
        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn remove_course_deletes_only_that_item() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let kept = ctx.create_course(10_00).await;
        let removed = ctx.create_course(20_00).await;

        ctx.baskets.add_course(user.uuid, kept.uuid).await?;
        ctx.baskets.add_course(user.uuid, removed.uuid).await?;

        let basket = ctx.baskets.remove_course(user.uuid, removed.uuid).await?;

        assert!(basket.contains(kept.uuid));
        assert!(!basket.contains(removed.uuid));
        assert_eq!(basket.total(), 10_00);

        Ok(())
    }

    #[tokio::test]
    async fn clear_basket_empties_and_keeps_basket_active() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;

        let before = ctx.baskets.add_course(user.uuid, course.uuid).await?;
        let cleared = ctx.baskets.clear_basket(user.uuid).await?;

        assert_eq!(cleared.uuid(), before.uuid());
        assert!(cleared.is_empty());
        assert_eq!(cleared.status(), BasketStatus::Active);

        Ok(())
    }

    #[tokio::test]
    async fn complete_empty_basket_returns_empty_basket() {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;

        let result = ctx.baskets.complete_basket(user.uuid).await;

        assert!(
            matches!(
                result,
                Err(BasketsServiceError::Basket(BasketError::EmptyBasket))
            ),
            "expected EmptyBasket, got {result:?}"
        );
    }

    #[tokio::test]
    async fn completed_basket_cannot_be_modified_or_completed_again() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;
        let other = ctx.create_course(5_00).await;

        ctx.baskets.add_course(user.uuid, course.uuid).await?;

        let completed = ctx.baskets.complete_basket(user.uuid).await?;

        assert_eq!(completed.status(), BasketStatus::Completed);

        let add = ctx.baskets.add_course(user.uuid, other.uuid).await;

        assert!(
            matches!(
                add,
                Err(BasketsServiceError::Basket(BasketError::NotModifiable))
            ),
            "expected NotModifiable, got {add:?}"
        );

        let again = ctx.baskets.complete_basket(user.uuid).await;

        assert!(
            matches!(
                again,
                Err(BasketsServiceError::Basket(BasketError::AlreadyCompleted))
            ),
            "expected AlreadyCompleted, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn emptying_completed_basket_retires_it() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let course = ctx.create_course(10_00).await;
        let other = ctx.create_course(5_00).await;

        ctx.baskets.add_course(user.uuid, course.uuid).await?;

        let completed = ctx.baskets.complete_basket(user.uuid).await?;

        let emptied = ctx.baskets.remove_course(user.uuid, course.uuid).await?;

        assert_eq!(emptied.uuid(), completed.uuid());
        assert!(emptied.is_empty());
        assert!(ctx.baskets.get_active_basket(user.uuid).await?.is_none());

        let fresh = ctx.baskets.add_course(user.uuid, other.uuid).await?;

        assert_ne!(fresh.uuid(), completed.uuid());
        assert_eq!(fresh.status(), BasketStatus::Active);
        assert_eq!(fresh.total(), 5_00);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_first_adds_share_one_basket() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user().await;
        let first = ctx.create_course(10_00).await;
        let second = ctx.create_course(20_00).await;

        let (a, b) = tokio::join!(
            ctx.baskets.add_course(user.uuid, first.uuid),
            ctx.baskets.add_course(user.uuid, second.uuid),
        );

        assert_eq!(a?.uuid(), b?.uuid());

        let basket = ctx
            .baskets
            .get_active_basket(user.uuid)
            .await?
            .ok_or("basket should exist")?;

        assert_eq!(basket.items().len(), 2);
        assert_eq!(basket.total(), 30_00);

        Ok(())
    }
}
