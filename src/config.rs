/// How many particles a swarm carries.
pub const DEFAULT_PARTICLE_COUNT: usize = 200;

/// Fixed swarm parameters chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwarmConfig {
    pub particle_count: usize,
    /// Seed for the swarm's RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: None,
        }
    }
}

impl SwarmConfig {
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
