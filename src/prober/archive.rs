//! Archive depth search
//!
//! How far back a lite-server can look up masterchain blocks, either as a
//! quick check of fixed offsets or as a binary search over days.

use crate::adnl::AdnlResult;
use crate::types::ArchiveDepth;
use async_trait::async_trait;

/// Unix time of the first masterchain block
pub const FIRST_BLOCK_UTIME: u32 = 1_573_822_385;

const DAY: u32 = 86_400;

/// Offsets tried by the quick check, shallowest first
pub const QUICK_OFFSETS: [(&str, u32); 9] = [
    ("1d", 1),
    ("3d", 3),
    ("7d", 7),
    ("14d", 14),
    ("1m", 30),
    ("3m", 3 * 30),
    ("6m", 6 * 30),
    ("9m", 9 * 30),
    ("1y", 365),
];

/// Source of "is there a masterchain block at this time" answers
#[async_trait]
pub trait BlockLookup: Send {
    /// `Ok(false)` when the server answered that it has no such block.
    /// `Err` means the session can no longer be used.
    async fn has_block_at(&mut self, utime: u32) -> AdnlResult<bool>;
}

/// Deepest fixed offset that could be looked up
pub async fn quick_depth<L: BlockLookup + ?Sized>(lookup: &mut L, now: u32) -> ArchiveDepth {
    let mut deepest = None;

    for (label, days) in QUICK_OFFSETS {
        match lookup.has_block_at(now.saturating_sub(days * DAY)).await {
            Ok(true) => deepest = Some(label),
            Ok(false) => {}
            Err(_) => break,
        }
    }

    match deepest {
        Some(label) => ArchiveDepth::AtLeast(label.to_string()),
        None => ArchiveDepth::Unknown,
    }
}

/// Binary search for the largest number of days back that can be looked up
pub async fn exact_depth<L: BlockLookup + ?Sized>(lookup: &mut L, now: u32) -> ArchiveDepth {
    let max_days = now.saturating_sub(FIRST_BLOCK_UTIME) / DAY;

    let mut left: i64 = 0;
    let mut right: i64 = max_days as i64;
    let mut best: u32 = 0;

    while left <= right {
        let mid = (left + right) / 2;
        let utime = now.saturating_sub(mid as u32 * DAY);
        match lookup.has_block_at(utime).await {
            Ok(true) => {
                best = mid as u32;
                left = mid + 1;
            }
            Ok(false) => right = mid - 1,
            Err(_) => break,
        }
    }

    if best == 0 {
        ArchiveDepth::Unknown
    } else {
        ArchiveDepth::Days(best)
    }
}
