//! Collateral / threshold allocation policy.
//!
//! Both branches share one shape: draw a target margin-call amount as a
//! ratio of MTA, split `MTM - target` between collateral and threshold,
//! floor each side, then apply a branch-specific correction when the
//! resulting call lands outside the branch's intended band.

use serde::{Deserialize, Serialize};

use crate::random::CellStream;

/// Minimum collateral held against any exposure.
pub const COLLATERAL_FLOOR: f64 = 100_000.0;
/// Minimum threshold buffer.
pub const THRESHOLD_FLOOR: f64 = 50_000.0;
/// Call amount the below-MTA correction pins to.
pub const PINNED_BELOW_MTA_CALL: f64 = 100_000.0;

const COLLATERAL_RATIO_MIN: f64 = 0.7;
const COLLATERAL_RATIO_SPAN: f64 = 0.2;

/// Round half to even, to whole currency units.
pub fn round_whole(x: f64) -> f64 {
    x.round_ties_even()
}

/// Which side of MTA the cell is steered towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationBranch {
    AboveMta,
    BelowMta,
}

impl AllocationBranch {
    /// Above-MTA with probability 0.6.
    pub fn draw(stream: &mut CellStream) -> Self {
        if stream.next_uniform() > 0.4 {
            Self::AboveMta
        } else {
            Self::BelowMta
        }
    }

    pub fn policy(self) -> BranchPolicy {
        match self {
            Self::AboveMta => BranchPolicy {
                target_ratio: (1.0, 1.5),
                needs_correction: |amount, mta| amount < mta,
                pinned_call: |mta| mta,
            },
            Self::BelowMta => BranchPolicy {
                target_ratio: (0.3, 0.9),
                needs_correction: |amount, mta| amount >= mta || amount <= 0.0,
                pinned_call: |_| PINNED_BELOW_MTA_CALL,
            },
        }
    }
}

/// Parameters that distinguish the two branches.
#[derive(Debug, Clone, Copy)]
pub struct BranchPolicy {
    /// Target call amount as `[low, high)` multiples of MTA.
    pub target_ratio: (f64, f64),
    /// Given `(call_amount, mta)`, whether collateral must be re-derived.
    pub needs_correction: fn(f64, f64) -> bool,
    /// Call amount the correction aims for, given MTA.
    pub pinned_call: fn(f64) -> f64,
}

/// Collateral and threshold after floors and any branch correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub branch: AllocationBranch,
    pub target_call: f64,
    pub collateral: f64,
    pub threshold: f64,
    pub corrected: bool,
}

impl Allocation {
    pub fn call_amount(&self, mtm: f64) -> f64 {
        mtm - self.collateral - self.threshold
    }
}

/// Split `mtm` into collateral and threshold for `branch`.
///
/// Consumes two draws from `stream`: the target ratio, then the collateral
/// ratio. `mtm` and `mta` are whole currency units.
pub fn allocate(
    mtm: f64,
    mta: f64,
    branch: AllocationBranch,
    stream: &mut CellStream,
) -> Allocation {
    let policy = branch.policy();
    let (low, high) = policy.target_ratio;
    let target_call = mta * (low + stream.next_uniform() * (high - low));

    let total_deduction = mtm - target_call;
    let collateral_ratio = COLLATERAL_RATIO_MIN + stream.next_uniform() * COLLATERAL_RATIO_SPAN;

    let mut collateral = round_whole(total_deduction * collateral_ratio).max(COLLATERAL_FLOOR);
    let threshold = round_whole(total_deduction * (1.0 - collateral_ratio)).max(THRESHOLD_FLOOR);

    let corrected = (policy.needs_correction)(mtm - collateral - threshold, mta);
    if corrected {
        collateral = (mtm - (policy.pinned_call)(mta) - threshold).max(COLLATERAL_FLOOR);
    }

    Allocation {
        branch,
        target_call,
        collateral,
        threshold,
        corrected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_whole_ties_to_even() {
        assert_eq!(round_whole(2.5), 2.0);
        assert_eq!(round_whole(3.5), 4.0);
        assert_eq!(round_whole(-1.4), -1.0);
    }

    #[test]
    fn test_floors_hold_for_every_draw() {
        for seed in 0..500 {
            let mut stream = CellStream::from_seed(seed);
            let branch = AllocationBranch::draw(&mut stream);
            let a = allocate(1_200_000.0, 2_500_000.0, branch, &mut stream);
            assert!(a.collateral >= COLLATERAL_FLOOR);
            assert!(a.threshold >= THRESHOLD_FLOOR);
        }
    }

    #[test]
    fn test_above_branch_reaches_mta_with_ample_mtm() {
        for seed in 0..500 {
            let mut stream = CellStream::from_seed(seed);
            let a = allocate(5_000_000.0, 100_000.0, AllocationBranch::AboveMta, &mut stream);
            assert!(a.call_amount(5_000_000.0) >= 100_000.0, "seed {seed}: {a:?}");
            assert!(a.target_call >= 100_000.0 && a.target_call < 150_000.0);
        }
    }

    #[test]
    fn test_above_branch_correction_blocked_by_collateral_floor() {
        // Target exceeds MTM, so both sides floor and the correction cannot
        // reduce collateral any further.
        let mut stream = CellStream::from_seed(11);
        let a = allocate(1_000_000.0, 2_500_000.0, AllocationBranch::AboveMta, &mut stream);
        assert!(a.corrected);
        assert_eq!(a.collateral, COLLATERAL_FLOOR);
        assert_eq!(a.threshold, THRESHOLD_FLOOR);
        assert_eq!(a.call_amount(1_000_000.0), 850_000.0);
    }

    #[test]
    fn test_below_branch_stays_between_zero_and_mta() {
        for seed in 0..500 {
            let mut stream = CellStream::from_seed(seed);
            let a = allocate(4_000_000.0, 200_000.0, AllocationBranch::BelowMta, &mut stream);
            let call = a.call_amount(4_000_000.0);
            assert!(!a.corrected, "seed {seed}: {a:?}");
            assert!(call > 0.0 && call < 200_000.0, "seed {seed}: {call}");
        }
    }

    #[test]
    fn test_below_branch_undershoot_triggers_correction() {
        // 120k of MTM cannot cover both floors, so the call goes negative.
        let mut stream = CellStream::from_seed(3);
        let a = allocate(120_000.0, 100_000.0, AllocationBranch::BelowMta, &mut stream);
        assert!(a.corrected);
        assert_eq!(a.collateral, COLLATERAL_FLOOR);
        assert_eq!(a.call_amount(120_000.0), -30_000.0);
    }

    #[test]
    fn test_below_branch_pins_call_when_correction_has_room() {
        let policy = AllocationBranch::BelowMta.policy();
        assert!((policy.needs_correction)(250_000.0, 200_000.0));
        assert!((policy.needs_correction)(0.0, 200_000.0));
        assert!(!(policy.needs_correction)(150_000.0, 200_000.0));
        assert_eq!((policy.pinned_call)(200_000.0), PINNED_BELOW_MTA_CALL);
    }

    #[test]
    fn test_above_branch_policy() {
        let policy = AllocationBranch::AboveMta.policy();
        assert!((policy.needs_correction)(99_999.0, 100_000.0));
        assert!(!(policy.needs_correction)(100_000.0, 100_000.0));
        assert_eq!((policy.pinned_call)(100_000.0), 100_000.0);
    }
}
