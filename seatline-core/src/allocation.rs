use serde::Serialize;
use std::collections::BTreeMap;

/// A currently-unbooked seat, snapshotted inside the booking transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAvailability {
    pub seat_number: i32,
    pub row_number: i32,
}

/// How the planner satisfied a request.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStrategy {
    /// Every seat came from a single row.
    SameRow,
    /// No row could hold the whole party; nearest seats overall.
    Scattered,
}

/// The seats chosen for one booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    pub seat_numbers: Vec<i32>,
    pub strategy: AllocationStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("all seats are fully booked")]
    FullyBooked,
}

/// Pick seats for a party of `requested`.
///
/// Preference order:
/// 1. the lowest-numbered row with at least `requested` available seats,
///    taking that row's lowest seat numbers;
/// 2. otherwise the `requested` lowest-numbered available seats overall,
///    ignoring row grouping.
///
/// When fewer than `requested` seats remain the plan holds what exists; an
/// empty snapshot is the only failure.
pub fn plan(
    free: &[SeatAvailability],
    requested: usize,
) -> Result<AllocationPlan, AllocationError> {
    if free.is_empty() {
        return Err(AllocationError::FullyBooked);
    }

    let mut by_row: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for seat in free {
        by_row.entry(seat.row_number).or_default().push(seat.seat_number);
    }

    // BTreeMap iteration is ascending, so the first row that fits is the
    // lowest-numbered one.
    for (_, mut seats) in by_row {
        if seats.len() >= requested {
            seats.sort_unstable();
            seats.truncate(requested);
            return Ok(AllocationPlan {
                seat_numbers: seats,
                strategy: AllocationStrategy::SameRow,
            });
        }
    }

    let mut seat_numbers: Vec<i32> = free.iter().map(|s| s.seat_number).collect();
    seat_numbers.sort_unstable();
    seat_numbers.dedup();
    seat_numbers.truncate(requested);

    Ok(AllocationPlan {
        seat_numbers,
        strategy: AllocationStrategy::Scattered,
    })
}
