use rand::{SeedableRng as _, rngs::StdRng};

use crate::select::guard::{Dna, UniquenessGuard, max_attempts};

/// Run-scoped draw state: the random source, accepted fingerprints, the token counter,
/// and the attempt budget. Owned by one thread for the whole draw phase.
#[derive(Debug)]
pub struct GenerationSession {
    seed: u64,
    rng: StdRng,
    guard: UniquenessGuard,
    next_token: u64,
    attempts: usize,
    max_attempts: usize,
}

impl GenerationSession {
    /// Session for a batch of `batch_size`, drawing from `seed`.
    pub fn new(seed: u64, batch_size: usize) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            guard: UniquenessGuard::new(),
            next_token: 1,
            attempts: 0,
            max_attempts: max_attempts(batch_size),
        }
    }

    /// Seed the random source started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws consumed so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Draw budget for the run.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Unique fingerprints accepted so far.
    pub fn accepted(&self) -> usize {
        self.guard.len()
    }

    /// Random source for the next draw.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Count one draw against the budget. Returns `false` once the budget is spent.
    pub fn begin_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Accept `dna` if unseen, handing out the next token id.
    pub fn accept(&mut self, dna: &Dna) -> Option<u64> {
        if !self.guard.try_accept(dna) {
            return None;
        }
        let id = self.next_token;
        self.next_token += 1;
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/session.rs"]
mod tests;
