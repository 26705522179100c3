//! Splitting a sample budget across workers.

use crate::error::EstimateError;

/// Smallest sample budget that can be estimated.
pub const MIN_SAMPLES: u64 = 2;

/// Number of workers actually used for a request.
///
/// More workers than trials (or no workers at all) cannot form a sensible
/// pool, so the whole budget runs on a single worker instead.
pub fn effective_workers(total: u64, requested: usize) -> usize {
    let oversubscribed = u64::try_from(requested).map_or(true, |workers| workers > total);

    if requested == 0 || oversubscribed {
        1
    } else {
        requested
    }
}

/// Per-worker sample counts for one run, in spawn order.
///
/// Every worker gets `total / workers`; the last one also takes the
/// remainder, so the shares always add up to `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAssignment {
    requested: usize,
    shares: Vec<u64>,
}

impl WorkAssignment {
    /// Validate the budget, apply the clamp policy and split.
    ///
    /// # Errors
    /// [`EstimateError::InvalidInput`] when `total < 2`.
    ///
    /// # Examples
    /// ```
    /// use piapprox::WorkAssignment;
    ///
    /// let plan = WorkAssignment::new(10, 3).unwrap();
    /// assert_eq!(plan.shares(), &[3, 3, 4]);
    /// ```
    pub fn new(total: u64, requested: usize) -> Result<Self, EstimateError> {
        if total < MIN_SAMPLES {
            return Err(EstimateError::InvalidInput { total });
        }

        let workers = effective_workers(total, requested);
        let base = total / workers as u64;
        let remainder = total % workers as u64;

        let mut shares = vec![base; workers];
        if let Some(last) = shares.last_mut() {
            *last += remainder;
        }

        Ok(WorkAssignment {
            requested,
            shares,
        })
    }

    pub fn shares(&self) -> &[u64] {
        &self.shares
    }

    pub fn workers(&self) -> usize {
        self.shares.len()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Whether the requested worker count was replaced by a single worker.
    pub fn is_clamped(&self) -> bool {
        self.requested != self.workers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_samples_one_worker() {
        let plan = WorkAssignment::new(2, 1).unwrap();
        assert_eq!(plan.shares(), &[2]);
        assert!(!plan.is_clamped());
    }

    #[test]
    fn test_remainder_goes_to_last_worker() {
        let plan = WorkAssignment::new(10, 3).unwrap();
        assert_eq!(plan.shares(), &[3, 3, 4]);
    }

    #[test]
    fn test_even_split_has_no_remainder() {
        let plan = WorkAssignment::new(12, 4).unwrap();
        assert_eq!(plan.shares(), &[3, 3, 3, 3]);
    }

    #[test]
    fn test_budget_below_two_is_rejected() {
        for total in [0, 1] {
            match WorkAssignment::new(total, 4) {
                Err(EstimateError::InvalidInput { total: rejected }) => assert_eq!(rejected, total),
                other => panic!("expected InvalidInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_oversubscribed_request_clamps_to_one() {
        let plan = WorkAssignment::new(5, 100).unwrap();
        assert_eq!(plan.shares(), &[5]);
        assert_eq!(plan.requested(), 100);
        assert!(plan.is_clamped());
    }

    #[test]
    fn test_zero_workers_clamps_to_one() {
        let plan = WorkAssignment::new(7, 0).unwrap();
        assert_eq!(plan.shares(), &[7]);
        assert!(plan.is_clamped());
    }

    #[test]
    fn test_workers_equal_to_total_is_not_clamped() {
        let plan = WorkAssignment::new(4, 4).unwrap();
        assert_eq!(plan.shares(), &[1, 1, 1, 1]);
        assert!(!plan.is_clamped());
    }

    #[test]
    fn test_effective_workers() {
        assert_eq!(effective_workers(10, 3), 3);
        assert_eq!(effective_workers(10, 10), 10);
        assert_eq!(effective_workers(10, 11), 1);
        assert_eq!(effective_workers(10, 0), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn test_shares_conserve_total(total in 2_u64..1_000_000, workers in 1_usize..512) {
            let plan = WorkAssignment::new(total, workers).unwrap();
            prop_assert_eq!(plan.shares().iter().sum::<u64>(), total);
        }

        #[test]
        fn test_share_shape(total in 2_u64..1_000_000, workers in 1_usize..512) {
            let plan = WorkAssignment::new(total, workers).unwrap();
            let n = plan.workers() as u64;
            let base = total / n;
            let (last, rest) = plan.shares().split_last().unwrap();

            prop_assert!(rest.iter().all(|&share| share == base));
            prop_assert_eq!(*last, base + total % n);
        }

        #[test]
        fn test_clamp_when_oversubscribed(total in 2_u64..256, extra in 1_usize..256) {
            let plan = WorkAssignment::new(total, total as usize + extra).unwrap();
            prop_assert_eq!(plan.workers(), 1);
            prop_assert_eq!(plan.shares(), &[total][..]);
        }

        #[test]
        fn test_split_is_deterministic(total in 2_u64..1_000_000, workers in 0_usize..512) {
            prop_assert_eq!(
                WorkAssignment::new(total, workers).unwrap(),
                WorkAssignment::new(total, workers).unwrap()
            );
        }
    }
}
