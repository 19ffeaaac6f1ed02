//! Step-by-step replay of a small SIEVE trace

use anyhow::{ensure, Result};
use sievecache::SieveCache;

enum Step {
    Put(u64, u64),
    Get(u64),
}

/// Capacity 3; the visited 30 survives the second eviction and 20 goes instead
const STEPS: &[Step] = &[
    Step::Put(10, 100),
    Step::Put(20, 200),
    Step::Put(30, 300),
    Step::Put(40, 400),
    Step::Get(30),
    Step::Put(50, 500),
    Step::Get(10),
    Step::Get(20),
];

/// Replay the trace, returning one line per step
pub fn run() -> Result<Vec<String>> {
    let mut cache = SieveCache::new(3)?;
    let mut lines = Vec::with_capacity(STEPS.len() + 1);

    for step in STEPS {
        let action = match *step {
            Step::Put(key, value) => {
                let inserted = cache.put(key, value)?;
                format!(
                    "put({}, {}) -> {}",
                    key,
                    value,
                    if inserted { "inserted" } else { "touched" }
                )
            }
            Step::Get(key) => match cache.get(&key) {
                Some(value) => format!("get({}) -> {}", key, value),
                None => format!("get({}) -> not found", key),
            },
        };
        lines.push(format!("{:<22} {}", action, describe(&cache)));
    }

    ensure!(
        cache.head_key() == Some(&50) && cache.tail_key() == Some(&30),
        "unexpected final order: {}",
        describe(&cache)
    );
    lines.push("final: 10 and 20 evicted, 30 kept by its second chance".to_string());

    Ok(lines)
}

fn describe(cache: &SieveCache<u64, u64>) -> String {
    let entries: Vec<String> = cache
        .keys()
        .map(|key| match cache.is_visited(key) {
            Some(true) => format!("{}*", key),
            _ => key.to_string(),
        })
        .collect();
    let hand = cache
        .hand_key()
        .map_or_else(|| "tail".to_string(), |key| key.to_string());

    format!("[{}] hand={}", entries.join(" "), hand)
}
