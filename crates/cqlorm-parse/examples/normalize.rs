//! Placeholder normalization and the parsed-query cache
//!
//! Run with: cargo run --example normalize -p cqlorm-parse

use cqlorm_parse::{ParseCache, ParseCacheConfig, ParseError};
use std::collections::HashMap;
use std::time::Duration;

fn main() -> Result<(), ParseError> {
    let cache = ParseCache::new(
        ParseCacheConfig::new()
            .with_capacity(128)
            .with_idle_timeout(Duration::from_secs(60)),
    );

    for sql in [
        "SELECT * FROM users WHERE id = ?",
        "SELECT * FROM users WHERE name = :name AND age > :age",
        "UPDATE users SET name = #{name} WHERE id = #{id}",
    ] {
        let parsed = cache.parse(sql)?;
        println!(
            "{sql}\n  -> {} ({} parameters, names {:?})",
            parsed.canonical(),
            parsed.parameter_count(),
            parsed.ordered_names()
        );
    }

    // Named values are arranged into slot order
    let parsed = cache.parse("UPDATE users SET name = #{name} WHERE id = #{id}")?;
    let values = HashMap::from([("id", "42"), ("name", "alice")]);
    let bound = parsed.bind_named(|name| values.get(name).copied())?;
    println!("bound: {bound:?}");

    // Mixing placeholder styles is rejected
    if let Err(err) = cache.parse("SELECT * FROM t WHERE a = ? AND b = :b") {
        println!("rejected: {err}");
    }

    let stats = cache.stats();
    println!(
        "hits {} misses {} size {} hit ratio {:.2}",
        stats.hits,
        stats.misses,
        stats.size,
        stats.hit_ratio()
    );
    Ok(())
}
