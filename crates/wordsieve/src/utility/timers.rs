//! # Time Utilities

use std::time::{Duration, Instant};

/// Time an operation; return (duration, result).
pub fn timeit<F, R>(f: F) -> (Duration, R)
where
    F: FnOnce() -> R,
{
    let t0 = Instant::now();
    let ret = f();
    let t1 = Instant::now();
    (t1 - t0, ret)
}

/// Time a fallible stage and log its duration at `info` on success.
pub fn log_stage<F, T, E>(
    name: &str,
    f: F,
) -> Result<(Duration, T), E>
where
    F: FnOnce() -> Result<T, E>,
{
    log::info!("{name}: starting");
    let (elapsed, ret) = timeit(f);
    let value = ret?;
    log::info!("{name}: done in {elapsed:.2?}");
    Ok((elapsed, value))
}
