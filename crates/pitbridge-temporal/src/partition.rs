//! Data-parallel map over independent partitions.

use rayon::prelude::*;

use pitbridge_core::config::ExecutionConfig;

/// Map `f` over `items`, in parallel when enabled. Output order always
/// matches input order.
pub fn map_partitions<T, R, F>(items: Vec<T>, execution: &ExecutionConfig, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    if execution.parallel && items.len() > 1 {
        items
            .into_par_iter()
            .with_min_len(execution.min_parallel_len.max(1))
            .map(f)
            .collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

/// Collect per-partition results, surfacing the first error in input order
/// so failures are reported deterministically.
pub fn first_error<R, E>(results: Vec<Result<R, E>>) -> Result<Vec<R>, E> {
    let mut out = Vec::with_capacity(results.len());
    for result in results {
        out.push(result?);
    }
    Ok(out)
}
