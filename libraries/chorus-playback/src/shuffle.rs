//! Shuffle algorithms for queue randomization
//!
//! Fisher-Yates permutation plus the merge rule that keeps the
//! currently-playing item reachable after the queue is replaced.

use crate::types::TrackItem;
use rand::{thread_rng, Rng};

/// Return a uniformly random permutation of `tracks`
///
/// The input slice is left untouched.
pub fn shuffle(tracks: &[TrackItem]) -> Vec<TrackItem> {
    shuffle_with_rng(tracks, &mut thread_rng())
}

/// Fisher-Yates with a caller-supplied RNG
///
/// Walks from the last index down to 1, swapping each element with a
/// uniformly chosen element at or before it.
pub fn shuffle_with_rng<R: Rng + ?Sized>(tracks: &[TrackItem], rng: &mut R) -> Vec<TrackItem> {
    let mut shuffled = tracks.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Pick a uniformly random index into a sequence of `len` items
///
/// Returns `None` for an empty sequence.
pub fn random_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.gen_range(0..len))
    }
}

/// Merge the current item into a replacement sequence
///
/// If `current` is present its first position becomes the new index.
/// If it is absent it is prepended, so the track in progress is never
/// dropped. Without a current item the index is 0.
pub fn place_current(
    mut tracks: Vec<TrackItem>,
    current: Option<&TrackItem>,
) -> (Vec<TrackItem>, usize) {
    let Some(current) = current else {
        return (tracks, 0);
    };

    match tracks.iter().position(|t| t.id == current.id) {
        Some(index) => (tracks, index),
        None => {
            tracks.insert(0, current.clone());
            (tracks, 0)
        }
    }
}
