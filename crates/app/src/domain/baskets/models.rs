//! Basket aggregate.

use std::{fmt, str::FromStr};

use jiff::Timestamp;

use crate::{
    audit::AuditMetadata,
    domain::{
        baskets::errors::BasketError,
        courses::records::{CourseRecord, CourseUuid},
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Basket UUID
pub type BasketUuid = TypedUuid<Basket>;

/// Basket lifecycle. `Active` moves to `Completed` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasketStatus {
    Active,
    Completed,
}

impl BasketStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BasketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasketStatus {
    type Err = BasketError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(BasketError::UnknownStatus(other.to_string())),
        }
    }
}

/// A course placed in a basket, priced when it was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketItem {
    course: CourseUuid,
    price: u64,
    added_at: Timestamp,
}

impl BasketItem {
    pub(crate) const fn restore(course: CourseUuid, price: u64, added_at: Timestamp) -> Self {
        Self {
            course,
            price,
            added_at,
        }
    }

    #[must_use]
    pub const fn course(&self) -> CourseUuid {
        self.course
    }

    /// Price snapshot taken at insertion; later catalog price changes do not apply.
    #[must_use]
    pub const fn price(&self) -> u64 {
        self.price
    }

    #[must_use]
    pub const fn added_at(&self) -> Timestamp {
        self.added_at
    }
}

/// A user's in-progress course selection.
#[derive(Debug, Clone)]
pub struct Basket {
    uuid: BasketUuid,
    user: UserUuid,
    status: BasketStatus,
    items: Vec<BasketItem>,
    audit: AuditMetadata,
}

impl Basket {
    /// An empty, active basket.
    #[must_use]
    pub fn new(uuid: BasketUuid, user: UserUuid) -> Self {
        Self {
            uuid,
            user,
            status: BasketStatus::Active,
            items: Vec::new(),
            audit: AuditMetadata::now(),
        }
    }

    pub(crate) fn restore(
        uuid: BasketUuid,
        user: UserUuid,
        status: BasketStatus,
        items: Vec<BasketItem>,
        audit: AuditMetadata,
    ) -> Self {
        Self {
            uuid,
            user,
            status,
            items,
            audit,
        }
    }

    #[must_use]
    pub const fn uuid(&self) -> BasketUuid {
        self.uuid
    }

    #[must_use]
    pub const fn user(&self) -> UserUuid {
        self.user
    }

    #[must_use]
    pub const fn status(&self) -> BasketStatus {
        self.status
    }

    #[must_use]
    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    #[must_use]
    pub const fn audit(&self) -> &AuditMetadata {
        &self.audit
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, course: CourseUuid) -> bool {
        self.items.iter().any(|item| item.course == course)
    }

    /// Sum of item prices.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |total, item| total.saturating_add(item.price))
    }

    /// Append a course at its current price.
    ///
    /// # Errors
    ///
    /// Fails when the basket is no longer active, the course is already in the
    /// basket, or the course is not published.
    pub fn add_course(&mut self, course: &CourseRecord) -> Result<&BasketItem, BasketError> {
        self.ensure_active()?;

        if self.contains(course.uuid) {
            return Err(BasketError::DuplicateItem(course.uuid));
        }

        if !course.published {
            return Err(BasketError::CourseUnavailable(course.uuid));
        }

        self.items.push(BasketItem {
            course: course.uuid,
            price: course.price,
            added_at: Timestamp::now(),
        });

        self.audit.touch();

        self.items.last().ok_or(BasketError::ItemNotFound(course.uuid))
    }

    /// Remove a single course, regardless of status.
    ///
    /// # Errors
    ///
    /// Fails when the course is not in the basket.
    pub fn remove_course(&mut self, course: CourseUuid) -> Result<BasketItem, BasketError> {
        let index = self
            .items
            .iter()
            .position(|item| item.course == course)
            .ok_or(BasketError::ItemNotFound(course))?;

        let removed = self.items.remove(index);

        self.audit.touch();

        Ok(removed)
    }

    /// Empty the basket, which stays active.
    ///
    /// # Errors
    ///
    /// Fails when the basket is no longer active.
    pub fn clear(&mut self) -> Result<Vec<BasketItem>, BasketError> {
        self.ensure_active()?;

        self.audit.touch();

        Ok(std::mem::take(&mut self.items))
    }

    /// Mark the basket as checked out. This does not create an order.
    ///
    /// # Errors
    ///
    /// Fails when the basket is empty or already completed.
    pub fn complete(&mut self) -> Result<(), BasketError> {
        if self.status == BasketStatus::Completed {
            return Err(BasketError::AlreadyCompleted);
        }

        if self.items.is_empty() {
            return Err(BasketError::EmptyBasket);
        }

        self.status = BasketStatus::Completed;
        self.audit.touch();

        Ok(())
    }

    /// Soft-delete once an order has been taken from this basket.
    pub(crate) fn retire(&mut self) {
        self.audit.mark_deleted();
    }

    fn ensure_active(&self) -> Result<(), BasketError> {
        match self.status {
            BasketStatus::Active => Ok(()),
            BasketStatus::Completed => Err(BasketError::NotModifiable),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn course(price: u64) -> CourseRecord {
        CourseRecord {
            uuid: CourseUuid::new(),
            title: "Course".to_string(),
            price,
            published: true,
            audit: AuditMetadata::now(),
        }
    }

    fn basket() -> Basket {
        Basket::new(BasketUuid::new(), UserUuid::new())
    }

    #[test]
    fn new_basket_is_active_and_empty() {
        let basket = basket();

        assert_eq!(basket.status(), BasketStatus::Active);
        assert!(basket.is_empty());
        assert_eq!(basket.total(), 0);
    }

    #[test]
    fn add_course_snapshots_price() -> TestResult {
        let mut basket = basket();
        let mut course = course(50_00);

        let item = basket.add_course(&course)?.clone();

        course.price = 75_00;

        assert_eq!(item.course(), course.uuid);
        assert_eq!(item.price(), 50_00);
        assert_eq!(basket.total(), 50_00);

        Ok(())
    }

    #[test]
    fn adding_same_course_twice_fails_and_leaves_items_unchanged() -> TestResult {
        let mut basket = basket();
        let course = course(10_00);

        basket.add_course(&course)?;

        let result = basket.add_course(&course);

        assert_eq!(result, Err(BasketError::DuplicateItem(course.uuid)));
        assert_eq!(basket.items().len(), 1);

        Ok(())
    }

    #[test]
    fn unpublished_course_cannot_be_added() {
        let mut basket = basket();
        let mut course = course(10_00);
        course.published = false;

        assert_eq!(
            basket.add_course(&course),
            Err(BasketError::CourseUnavailable(course.uuid))
        );
        assert!(basket.is_empty());
    }

    #[test]
    fn completed_basket_rejects_add_and_clear() -> TestResult {
        let mut basket = basket();

        basket.add_course(&course(10_00))?;
        basket.complete()?;

        assert_eq!(
            basket.add_course(&course(5_00)),
            Err(BasketError::NotModifiable)
        );
        assert_eq!(basket.clear(), Err(BasketError::NotModifiable));
        assert_eq!(basket.items().len(), 1);

        Ok(())
    }

    #[test]
    fn remove_unknown_course_fails_without_changes() -> TestResult {
        let mut basket = basket();
        let kept = course(10_00);

        basket.add_course(&kept)?;

        let missing = CourseUuid::new();

        assert_eq!(
            basket.remove_course(missing),
            Err(BasketError::ItemNotFound(missing))
        );
        assert!(basket.contains(kept.uuid));
        assert_eq!(basket.total(), 10_00);

        Ok(())
    }

    #[test]
    fn remove_course_is_allowed_after_completion() -> TestResult {
        let mut basket = basket();
        let course = course(10_00);

        basket.add_course(&course)?;
        basket.complete()?;

        let removed = basket.remove_course(course.uuid)?;

        assert_eq!(removed.course(), course.uuid);
        assert!(basket.is_empty());

        Ok(())
    }

    #[test]
    fn clear_empties_and_stays_active() -> TestResult {
        let mut basket = basket();

        basket.add_course(&course(10_00))?;
        basket.add_course(&course(20_00))?;

        let removed = basket.clear()?;

        assert_eq!(removed.len(), 2);
        assert!(basket.is_empty());
        assert_eq!(basket.status(), BasketStatus::Active);

        Ok(())
    }

    #[test]
    fn complete_empty_basket_fails() {
        let mut basket = basket();

        assert_eq!(basket.complete(), Err(BasketError::EmptyBasket));
        assert_eq!(basket.status(), BasketStatus::Active);
    }

    #[test]
    fn complete_succeeds_exactly_once() -> TestResult {
        let mut basket = basket();

        basket.add_course(&course(10_00))?;
        basket.complete()?;

        assert_eq!(basket.status(), BasketStatus::Completed);
        assert_eq!(basket.complete(), Err(BasketError::AlreadyCompleted));

        Ok(())
    }

    #[test]
    fn status_round_trips_through_storage_text() -> TestResult {
        for status in [BasketStatus::Active, BasketStatus::Completed] {
            assert_eq!(status.as_str().parse::<BasketStatus>()?, status);
        }

        assert!("archived".parse::<BasketStatus>().is_err());

        Ok(())
    }
}
