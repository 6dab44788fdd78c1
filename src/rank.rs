//! Per-question rank computation.
//!
//! Placed items are ordered by bucket weight (descending), then by scale
//! position of the bucket (later buckets first, only relevant if two buckets
//! ever share a weight), then by position inside the bucket (ascending).
//! Ranks run 1..=K over the K placed items. Unsorted items never reach this
//! module.

use std::cmp::Ordering;

/// Ordered contents of one scale bucket.
#[derive(Debug, Clone, Copy)]
pub struct RankInput<'a, T> {
    pub weight: u32,
    pub items: &'a [T],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked<T> {
    pub item: T,
    pub rank: u32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<T> {
    item: T,
    weight: u32,
    bucket: usize,
    position: usize,
}

fn precedence<T>(a: &Candidate<T>, b: &Candidate<T>) -> Ordering {
    b.weight
        .cmp(&a.weight)
        .then_with(|| b.bucket.cmp(&a.bucket))
        .then_with(|| a.position.cmp(&b.position))
}

/// Ranks every item in `buckets`, which are given in scale order.
pub fn rank<T: Copy>(buckets: &[RankInput<'_, T>]) -> Vec<Ranked<T>> {
    let mut candidates: Vec<Candidate<T>> = buckets
        .iter()
        .enumerate()
        .flat_map(|(bucket, input)| {
            input
                .items
                .iter()
                .enumerate()
                .map(move |(position, item)| Candidate {
                    item: *item,
                    weight: input.weight,
                    bucket,
                    position,
                })
        })
        .collect();

    candidates.sort_by(precedence);

    candidates
        .into_iter()
        .zip(1u32..)
        .map(|(candidate, rank)| Ranked {
            item: candidate.item,
            rank,
        })
        .collect()
}
