//! Permuted-block condition assignment.
//!
//! Each block holds `block_size / conditions` copies of every condition in a
//! shuffled order. Prior assignments are passed in on every call, so the
//! randomizer can tell where in the current block the study is. The cached
//! block lives only in memory; when it is missing or disagrees with the
//! recorded assignments (after a restart) the randomizer falls back to the
//! least-used condition so balance survives.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomizerError {
    #[error("at least one condition is required")]
    NoConditions,

    #[error("block size {block_size} is not a positive multiple of {conditions} conditions")]
    InvalidBlockSize { block_size: usize, conditions: usize },
}

#[derive(Debug)]
pub struct BlockRandomizer {
    conditions: Vec<String>,
    block_size: usize,
    current_block: Option<Vec<String>>,
    rng: StdRng,
}

impl BlockRandomizer {
    pub fn new(conditions: Vec<String>, block_size: usize) -> Result<Self, RandomizerError> {
        Self::with_rng(conditions, block_size, StdRng::from_entropy())
    }

    /// Deterministic randomizer for reproducible runs.
    pub fn with_seed(
        conditions: Vec<String>,
        block_size: usize,
        seed: u64,
    ) -> Result<Self, RandomizerError> {
        Self::with_rng(conditions, block_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        conditions: Vec<String>,
        block_size: usize,
        rng: StdRng,
    ) -> Result<Self, RandomizerError> {
        if conditions.is_empty() {
            return Err(RandomizerError::NoConditions);
        }
        if block_size == 0 || block_size % conditions.len() != 0 {
            return Err(RandomizerError::InvalidBlockSize {
                block_size,
                conditions: conditions.len(),
            });
        }
        Ok(Self {
            conditions,
            block_size,
            current_block: None,
            rng,
        })
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.conditions.iter().any(|c| c == code)
    }

    /// Picks the next condition.
    ///
    /// `history` is every prior non-forced assignment in creation order;
    /// codes that are not configured conditions are ignored.
    pub fn assign(&mut self, history: &[String]) -> String {
        let history: Vec<&str> = history
            .iter()
            .map(String::as_str)
            .filter(|code| self.is_valid(code))
            .collect();
        let position = history.len() % self.block_size;

        if position == 0 {
            let block = self.shuffled_block();
            let first = block[0].clone();
            self.current_block = Some(block);
            return first;
        }

        let tail = &history[history.len() - position..];
        if let Some(block) = &self.current_block {
            let prefix_matches = block[..position]
                .iter()
                .zip(tail)
                .all(|(expected, actual)| expected == actual);
            if prefix_matches {
                return block[position].clone();
            }
        }

        tracing::debug!(position, "Block cache missing or stale, assigning by deficit");
        self.current_block = None;
        self.least_used(&history)
    }

    fn shuffled_block(&mut self) -> Vec<String> {
        let copies = self.block_size / self.conditions.len();
        let mut block: Vec<String> = self
            .conditions
            .iter()
            .flat_map(|c| std::iter::repeat(c.clone()).take(copies))
            .collect();
        block.shuffle(&mut self.rng);
        block
    }

    fn least_used(&mut self, history: &[&str]) -> String {
        let mut counts: BTreeMap<&str, usize> =
            self.conditions.iter().map(|c| (c.as_str(), 0)).collect();
        for code in history {
            if let Some(count) = counts.get_mut(code) {
                *count += 1;
            }
        }
        let min = counts.values().copied().min().unwrap_or(0);
        let candidates: Vec<String> = self
            .conditions
            .iter()
            .filter(|c| counts.get(c.as_str()) == Some(&min))
            .cloned()
            .collect();
        candidates
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| self.conditions[0].clone())
    }
}
