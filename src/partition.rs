// src/partition.rs
use std::ops::Range;

use crate::error::PartitionError;

/// Contiguous slice of `total` items owned by worker `worker_index` out of
/// `worker_count`. The first `total % worker_count` workers take one extra
/// item, so ranges differ in length by at most one and cover `0..total`.
pub fn partition_range(
    total: usize,
    worker_count: usize,
    worker_index: usize,
) -> Result<Range<usize>, PartitionError> {
    if worker_count == 0 {
        return Err(PartitionError::NoWorkers);
    }
    if worker_index >= worker_count {
        return Err(PartitionError::IndexOutOfRange {
            index: worker_index,
            count: worker_count,
        });
    }

    let base = total / worker_count;
    let extra = total % worker_count;
    let start = worker_index * base + worker_index.min(extra);
    let len = base + usize::from(worker_index < extra);
    Ok(start..start + len)
}
