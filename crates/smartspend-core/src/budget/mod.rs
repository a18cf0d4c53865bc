//! Budget recommendation
//!
//! - **validator** - clamps any recommendation into the budget policy
//! - **fallback** - local recommendation from recent averages
//! - **advisor** - the request pipeline tying analysis, completion and both of the above

pub mod advisor;
pub mod fallback;
pub mod validator;

pub use advisor::{
    compute_budget_recommendation, validate_transactions, BudgetAdvisor, BudgetRequest,
};
pub use fallback::{fallback_recommendation, FALLBACK_INSIGHTS};
pub use validator::validate;

/// Money value usable in policy arithmetic: NaN, infinities and negatives become zero
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(12.5), 12.5);
        assert_eq!(non_negative(0.0), 0.0);
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
        assert_eq!(non_negative(f64::NEG_INFINITY), 0.0);
    }
}
