//! Autoscaling profile validation.
//!
//! The resolution policy for numeric fields is explicit: `None` is the only
//! "unset". A literal zero is a caller-written value — it is preserved where
//! zero is in-domain (`min_capacity`) and rejected as out of range where it
//! is not (`max_capacity`, `target_utilization`). No field is ever silently
//! reinterpreted as absent.

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    resource::AutoscalingProfile,
};

/// Validate an autoscaling profile before it is attached to a function.
pub fn validate_profile(profile: &AutoscalingProfile) -> KeystoneResult<()> {
    if profile.max_capacity == 0 {
        return Err(KeystoneError::configuration(
            "autoscaling max_capacity must be at least 1",
        ));
    }

    if !(profile.target_utilization > 0.0 && profile.target_utilization <= 1.0) {
        return Err(KeystoneError::Configuration {
            reason: format!(
                "autoscaling target_utilization {} is outside (0.0, 1.0]",
                profile.target_utilization
            ),
        });
    }

    if let Some(min) = profile.min_capacity {
        if min > profile.max_capacity {
            return Err(KeystoneError::Configuration {
                reason: format!(
                    "autoscaling min_capacity {} exceeds max_capacity {}",
                    min, profile.max_capacity
                ),
            });
        }
    }

    if let Some(provisioned) = profile.provisioned_concurrency {
        if provisioned > profile.max_capacity {
            return Err(KeystoneError::Configuration {
                reason: format!(
                    "provisioned_concurrency {} exceeds max_capacity {}",
                    provisioned, profile.max_capacity
                ),
            });
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AutoscalingProfile {
        AutoscalingProfile {
            min_capacity: None,
            max_capacity: 10,
            target_utilization: 0.7,
            provisioned_concurrency: None,
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(validate_profile(&profile()).is_ok());
    }

    #[test]
    fn zero_target_utilization_is_rejected_not_treated_as_unset() {
        let mut p = profile();
        p.target_utilization = 0.0;

        match validate_profile(&p) {
            Err(KeystoneError::Configuration { reason }) => {
                assert!(reason.contains("target_utilization"), "got: {reason}");
            }
            other => panic!("expected Configuration, got {:?}", other),
        }
    }

    #[test]
    fn zero_min_capacity_is_a_preserved_value() {
        // The other branch of the zero policy: zero is in-domain here.
        let mut p = profile();
        p.min_capacity = Some(0);
        assert!(validate_profile(&p).is_ok());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let mut p = profile();
        p.min_capacity = Some(20);
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn zero_max_capacity_is_rejected() {
        let mut p = profile();
        p.max_capacity = 0;
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn target_above_one_is_rejected() {
        let mut p = profile();
        p.target_utilization = 1.5;
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn provisioned_concurrency_above_max_is_rejected() {
        let mut p = profile();
        p.provisioned_concurrency = Some(11);
        assert!(validate_profile(&p).is_err());
    }
}
