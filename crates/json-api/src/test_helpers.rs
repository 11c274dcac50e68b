//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use coursemart_app::{
    audit::AuditMetadata,
    auth::{AccessClaims, MockSessionsService},
    context::AppContext,
    domain::{
        baskets::{
            BasketError, MockBasketsService,
            models::{Basket, BasketUuid},
        },
        courses::{
            MockCoursesService,
            records::{CourseRecord, CourseUuid},
        },
        enrollments::{
            MockEnrollmentsService,
            records::{EnrollmentRecord, EnrollmentUuid},
        },
        orders::{
            MockOrdersService, OrderError,
            models::{Order, OrderUuid},
        },
        payments::{
            MockPaymentsService, PaymentError,
            models::{Payment, PaymentUuid},
        },
        users::{MockUserDirectory, records::UserUuid},
    },
};

use crate::{envelope, extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

/// Unconfigured mocks: any call without a matching expectation fails the test.
pub(crate) struct Mocks {
    pub(crate) users: MockUserDirectory,
    pub(crate) courses: MockCoursesService,
    pub(crate) baskets: MockBasketsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
    pub(crate) enrollments: MockEnrollmentsService,
    pub(crate) sessions: MockSessionsService,
}

impl Mocks {
    pub(crate) fn new() -> Self {
        Self {
            users: MockUserDirectory::new(),
            courses: MockCoursesService::new(),
            baskets: MockBasketsService::new(),
            orders: MockOrdersService::new(),
            payments: MockPaymentsService::new(),
            enrollments: MockEnrollmentsService::new(),
            sessions: MockSessionsService::new(),
        }
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            users: Arc::new(self.users),
            courses: Arc::new(self.courses),
            baskets: Arc::new(self.baskets),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
            enrollments: Arc::new(self.enrollments),
            sessions: Arc::new(self.sessions),
        })
    }
}

pub(crate) fn test_claims() -> AccessClaims {
    AccessClaims {
        sub: TEST_USER_UUID.into_uuid(),
        email: "ada@example.com".to_string(),
        name: "Ada Lovelace".to_string(),
        roles: vec!["student".to_string()],
        iat: 0,
        exp: i64::MAX,
    }
}

#[salvo::handler]
pub(crate) async fn inject_claims(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_claims(test_claims());
    ctrl.call_next(req, depot, res).await;
}

/// Route served as [`TEST_USER_UUID`].
pub(crate) fn service_with(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_claims)
            .push(route),
    )
    .catcher(envelope::catcher())
}

/// Route served without any caller identity.
pub(crate) fn anonymous_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .push(route),
    )
    .catcher(envelope::catcher())
}

pub(crate) fn make_course(price: u64) -> CourseRecord {
    CourseRecord {
        uuid: CourseUuid::new(),
        title: format!("Course priced {price}"),
        price,
        published: true,
        audit: AuditMetadata::now(),
    }
}

pub(crate) fn make_basket(user: UserUuid, prices: &[u64]) -> Result<Basket, BasketError> {
    let mut basket = Basket::new(BasketUuid::new(), user);

    for price in prices {
        basket.add_course(&make_course(*price))?;
    }

    Ok(basket)
}

pub(crate) fn make_order(basket: &Basket) -> Result<Order, OrderError> {
    Order::from_basket(OrderUuid::new(), basket)
}

pub(crate) fn make_payment(order: &Order) -> Result<Payment, PaymentError> {
    Payment::new(PaymentUuid::new(), order, "stripe", "usd")
}

pub(crate) fn make_enrollment(user: UserUuid, course: CourseUuid) -> EnrollmentRecord {
    EnrollmentRecord {
        uuid: EnrollmentUuid::new(),
        user,
        course,
        enrolled_at: Timestamp::UNIX_EPOCH,
        audit: AuditMetadata::now(),
    }
}
