//! Synthetic key streams and the read-through driver loop

use std::time::Instant;

use anyhow::{bail, Result};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sievecache::SharedSieveCache;
use tracing::debug;

use crate::report::Report;

/// Shape of the generated key stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// 0, 1, 2, ... never repeating
    Sequential,
    /// 0..keys, repeated in order
    Loop,
    /// Uniformly random over 0..keys
    Uniform,
    /// A small hot set receives most of the traffic
    Hotset,
}

/// Parameters for one simulation run
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,
    pub capacity: usize,
    pub ops: u64,
    pub keys: u64,
    pub hot_fraction: f64,
    pub hot_weight: f64,
    pub get_ratio: f64,
    pub seed: u64,
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            bail!("capacity must be greater than 0");
        }
        if self.keys == 0 {
            bail!("key space must be greater than 0");
        }
        for (name, value) in [
            ("hot-fraction", self.hot_fraction),
            ("hot-weight", self.hot_weight),
            ("get-ratio", self.get_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be between 0 and 1, got {}", name, value);
            }
        }
        Ok(())
    }
}

/// Infinite stream of keys for a workload
pub struct KeyStream {
    kind: WorkloadKind,
    keys: u64,
    hot_keys: u64,
    hot_weight: f64,
    counter: u64,
    rng: StdRng,
}

impl KeyStream {
    pub fn new(config: &WorkloadConfig) -> Self {
        let hot_keys = ((config.keys as f64 * config.hot_fraction) as u64).clamp(1, config.keys);

        Self {
            kind: config.kind,
            keys: config.keys,
            hot_keys,
            hot_weight: config.hot_weight,
            counter: 0,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl Iterator for KeyStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let key = match self.kind {
            WorkloadKind::Sequential => self.counter,
            WorkloadKind::Loop => self.counter % self.keys,
            WorkloadKind::Uniform => self.rng.gen_range(0..self.keys),
            WorkloadKind::Hotset => {
                if self.hot_keys == self.keys || self.rng.gen_bool(self.hot_weight) {
                    self.rng.gen_range(0..self.hot_keys)
                } else {
                    self.rng.gen_range(self.hot_keys..self.keys)
                }
            }
        };
        self.counter += 1;
        Some(key)
    }
}

/// Drive a fresh cache with the configured workload
///
/// Reads fall through to an insert on a miss; writes insert directly.
pub fn run(config: &WorkloadConfig) -> Result<Report> {
    config.validate()?;

    let cache: SharedSieveCache<u64, u64> = SharedSieveCache::new(config.capacity)?;
    let mut stream = KeyStream::new(config);
    // Separate generator so the op mix does not perturb the key stream
    let mut mix = StdRng::seed_from_u64(config.seed.wrapping_add(1));

    let started = Instant::now();
    for _ in 0..config.ops {
        let Some(key) = stream.next() else { break };

        if mix.gen_bool(config.get_ratio) {
            if cache.get(&key).is_none() {
                cache.put(key, key)?;
            }
        } else {
            cache.put(key, key)?;
        }
    }
    let elapsed = started.elapsed();

    debug!(len = cache.len(), "workload finished");
    Ok(Report::new(config, cache.snapshot(), elapsed))
}
