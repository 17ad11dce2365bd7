//! Binary searches driven by asynchronous lookups.

use core::future::Future;

/// Returns the index of the first element for which `pred` is `false`, over `0..len`.
///
/// `pred` must be `true` for a prefix of the range and `false` for the rest, the same contract
/// as [`slice::partition_point`]. Each probe may hit the chain, so only `O(log len)` probes are
/// made.
pub async fn partition_point<F, Fut, E>(len: usize, mut pred: F) -> Result<usize, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let (mut left, mut right) = (0, len);
    while left < right {
        let mid = left + (right - left) / 2;
        if pred(mid).await? {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    Ok(left)
}

/// Finds the first block in `min..=max` whose parent block number is `target`.
///
/// If none is and `allow_greater` is set, the first block whose parent block number exceeds
/// `target` is returned instead. Blocks that do not report a parent block number are skipped.
pub async fn first_block_for_parent_block<F, Fut, E>(
    target: u64,
    allow_greater: bool,
    min: u64,
    max: u64,
    mut parent_block_of: F,
) -> Result<Option<u64>, E>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Option<u64>, E>>,
{
    let (mut start, mut end) = (min, max);
    let mut exact = None;
    let mut greater = None;
    while start <= end {
        let mid = start + (end - start) / 2;
        let parent = parent_block_of(mid).await?;
        match parent {
            Some(parent) if parent < target => start = mid + 1,
            _ => {
                match parent {
                    Some(parent) if parent == target => exact = Some(mid),
                    Some(_) if allow_greater => greater = Some(mid),
                    _ => {}
                }
                match mid.checked_sub(1) {
                    Some(next) => end = next,
                    None => break,
                }
            }
        }
    }
    Ok(exact.or(greater))
}
