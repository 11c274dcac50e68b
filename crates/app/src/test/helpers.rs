//! Test Helpers

use crate::domain::payments::gateway::CardDetails;

/// Password given to every user made by `TestContext::create_user`.
pub(crate) const TEST_PASSWORD: &str = "correct-horse-battery";

/// Stripe's documented always-approved test card.
pub(crate) fn test_card() -> CardDetails {
    CardDetails {
        number: "4242424242424242".to_string(),
        exp_month: 12,
        exp_year: 2034,
        cvc: "123".to_string(),
        holder_name: "Grace Hopper".to_string(),
    }
}
