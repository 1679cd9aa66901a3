// ============================================
// Size Class Assigner (尺寸分层)
// ============================================
//
// Partitions a score-ranked list into three tiers:
// - large  = max(2, floor(n * 0.08))
// - medium = max(6, floor(n * 0.40))
// - small  = remainder
//
// The floors can exceed n for short lists. Quotas are then clamped in tier
// order so large fills first, medium takes what is left and small gets
// nothing; no count ever goes negative.

use tracing::debug;

use crate::models::SizeClass;

/// Tier sizes for one ranked list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierQuotas {
    pub large: usize,
    pub medium: usize,
    pub small: usize,
}

impl TierQuotas {
    pub fn total(&self) -> usize {
        self.large + self.medium + self.small
    }
}

#[derive(Debug, Clone)]
pub struct SizeClassAssigner {
    large_ratio: f64,
    large_floor: usize,
    medium_ratio: f64,
    medium_floor: usize,
}

impl Default for SizeClassAssigner {
    fn default() -> Self {
        Self {
            large_ratio: 0.08,
            large_floor: 2,
            medium_ratio: 0.40,
            medium_floor: 6,
        }
    }
}

impl SizeClassAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quotas(&self, n: usize) -> TierQuotas {
        let large_target = proportional(n, self.large_ratio).max(self.large_floor);
        let medium_target = proportional(n, self.medium_ratio).max(self.medium_floor);

        let large = large_target.min(n);
        let medium = medium_target.min(n - large);
        let small = n - large - medium;

        TierQuotas {
            large,
            medium,
            small,
        }
    }

    /// Size class per ranked position (index 0 = highest score).
    pub fn assign(&self, n: usize) -> Vec<SizeClass> {
        let quotas = self.quotas(n);

        debug!(
            n = n,
            large = quotas.large,
            medium = quotas.medium,
            small = quotas.small,
            "Size tiers assigned"
        );

        std::iter::repeat(SizeClass::Large)
            .take(quotas.large)
            .chain(std::iter::repeat(SizeClass::Medium).take(quotas.medium))
            .chain(std::iter::repeat(SizeClass::Small).take(quotas.small))
            .collect()
    }
}

fn proportional(n: usize, ratio: f64) -> usize {
    (n as f64 * ratio).floor() as usize
}
