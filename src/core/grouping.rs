use crate::core::{compatibility::compatibility_score, distance::haversine_distance};
use crate::models::{CompatibilityWeights, DiningGroup, UserCandidate};

/// Bounds and thresholds for one grouping pass
#[derive(Debug, Clone, Copy)]
pub struct GroupingConfig {
    pub max_radius_km: f64,
    pub compatibility_threshold: f64,
    pub max_group_size: usize,
    pub min_group_size: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_radius_km: 50.0,
            compatibility_threshold: 0.3,
            max_group_size: 6,
            min_group_size: 2,
        }
    }
}

/// Result of one grouping pass: disjoint groups plus the users left out
#[derive(Debug)]
pub struct GroupingResult {
    pub groups: Vec<DiningGroup>,
    pub unplaced: Vec<String>,
}

/// Greedy single-pass clustering of the eligible pool into dining groups
///
/// The pool is walked in caller-supplied order. Each unused user seeds a
/// group, then the rest of the pool is scanned forward for unused candidates
/// within radius of the seed and above the compatibility threshold against
/// the seed. Candidates are accepted against the seed only, not against
/// previously added members, and no sorting happens before the pass, so the
/// result is deterministic for a fixed input order but not globally optimal.
/// That is the intended behavior; do not replace it with an optimal matching.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    config: GroupingConfig,
    weights: CompatibilityWeights,
}

impl GroupBuilder {
    pub fn new(config: GroupingConfig, weights: CompatibilityWeights) -> Self {
        Self { config, weights }
    }

    pub fn with_defaults() -> Self {
        Self {
            config: GroupingConfig::default(),
            weights: CompatibilityWeights::default(),
        }
    }

    /// Partition the pool into disjoint groups of min_group_size..=max_group_size
    ///
    /// Users not placed into a keepable group are returned in `unplaced` and
    /// are not retried within this run.
    pub fn build_groups(&self, pool: &[UserCandidate]) -> GroupingResult {
        // Placement state is scoped to this call, indexed by pool position
        let mut used = vec![false; pool.len()];
        let mut groups = Vec::new();
        let mut unplaced = Vec::new();

        for i in 0..pool.len() {
            if used[i] {
                continue;
            }
            used[i] = true;

            let seed = &pool[i];
            let mut members = vec![seed.clone()];

            for j in (i + 1)..pool.len() {
                if members.len() >= self.config.max_group_size {
                    break;
                }
                if used[j] {
                    continue;
                }

                let candidate = &pool[j];
                let distance_km = haversine_distance(
                    seed.latitude,
                    seed.longitude,
                    candidate.latitude,
                    candidate.longitude,
                );
                if distance_km > self.config.max_radius_km {
                    continue;
                }
                if compatibility_score(seed, candidate, &self.weights)
                    <= self.config.compatibility_threshold
                {
                    continue;
                }

                used[j] = true;
                members.push(candidate.clone());
            }

            if members.len() >= self.config.min_group_size {
                groups.push(DiningGroup { members });
            } else {
                // Lone seed: stays consumed, never retried this run
                unplaced.push(seed.id.clone());
            }
        }

        GroupingResult { groups, unplaced }
    }
}

impl Default for GroupBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}
