//! Simulation results

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use sievecache::StatsSnapshot;

use crate::workload::{WorkloadConfig, WorkloadKind};

/// Outcome of one workload run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub workload: WorkloadKind,
    pub capacity: usize,
    pub ops: u64,
    pub keys: u64,
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub touches: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

impl Report {
    pub fn new(config: &WorkloadConfig, stats: StatsSnapshot, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let ops_per_sec = if secs > 0.0 { config.ops as f64 / secs } else { 0.0 };

        Self {
            workload: config.kind,
            capacity: config.capacity,
            ops: config.ops,
            keys: config.keys,
            hits: stats.hits,
            misses: stats.misses,
            inserts: stats.inserts,
            touches: stats.touches,
            evictions: stats.evictions,
            hit_ratio: stats.hit_ratio(),
            elapsed_ms: secs * 1_000.0,
            ops_per_sec,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workload:   {:?}", self.workload)?;
        writeln!(f, "capacity:   {}", self.capacity)?;
        writeln!(f, "key space:  {}", self.keys)?;
        writeln!(f, "operations: {}", self.ops)?;
        writeln!(f, "hits:       {}", self.hits)?;
        writeln!(f, "misses:     {}", self.misses)?;
        writeln!(f, "inserts:    {}", self.inserts)?;
        writeln!(f, "touches:    {}", self.touches)?;
        writeln!(f, "evictions:  {}", self.evictions)?;
        writeln!(f, "hit ratio:  {:.4}", self.hit_ratio)?;
        write!(
            f,
            "elapsed:    {:.2} ms ({:.0} ops/sec)",
            self.elapsed_ms, self.ops_per_sec
        )
    }
}
