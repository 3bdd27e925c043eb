//! # Stroke Ordering
//!
//! Reorders strokes to cut pen-up travel. Both strategies keep the first
//! input stroke first and break ties by input order.
//!
//! The length-weighted strategy scores each candidate at step `k` of `N` as
//! `α·len_norm − β·dist_norm` with `α = 1 − k/(N+1)` and `β = k/(N+1)`: long
//! strokes are placed early, proximity wins toward the end of the tour.

use penkit_core::{Point, Polyline};

/// Greedy nearest neighbour: always continue with the stroke starting
/// closest to where the pen is
pub fn greedy_order<F>(strokes: &[Polyline], mut progress: F) -> Vec<usize>
where
    F: FnMut(usize, usize),
{
    order_by(strokes, &mut progress, |remaining, last_end, _step| {
        let mut best: Option<(usize, f64)> = None;
        for &i in remaining {
            let d = travel(last_end, &strokes[i]);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    })
}

/// Length-weighted ordering
pub fn length_weighted_order<F>(strokes: &[Polyline], mut progress: F) -> Vec<usize>
where
    F: FnMut(usize, usize),
{
    let total = strokes.len();
    let longest = strokes.iter().map(Polyline::length).fold(0.0, f64::max);

    order_by(strokes, &mut progress, |remaining, last_end, step| {
        let beta = step as f64 / (total + 1) as f64;
        let alpha = 1.0 - beta;
        let max_dist = remaining
            .iter()
            .map(|&i| travel(last_end, &strokes[i]))
            .fold(0.0, f64::max);

        let mut best: Option<(usize, f64)> = None;
        for &i in remaining {
            let len_norm = if longest > 0.0 {
                strokes[i].length() / longest
            } else {
                0.0
            };
            let dist_norm = if max_dist > 0.0 {
                travel(last_end, &strokes[i]) / max_dist
            } else {
                0.0
            };
            let score = alpha * len_norm - beta * dist_norm;
            if best.map_or(true, |(_, bs)| score > bs) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    })
}

/// Rearrange strokes by an index permutation
pub fn apply_order(strokes: Vec<Polyline>, order: &[usize]) -> Vec<Polyline> {
    let mut slots: Vec<Option<Polyline>> = strokes.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots.get_mut(i).and_then(Option::take)).collect()
}

/// Total pen-up distance between consecutive strokes
pub fn travel_distance(strokes: &[Polyline]) -> f64 {
    strokes
        .windows(2)
        .filter_map(|w| Some(w[0].end()?.distance_to(&w[1].start()?)))
        .sum()
}

fn travel(from: Point, stroke: &Polyline) -> f64 {
    stroke.start().map_or(0.0, |s| from.distance_to(&s))
}

/// Shared driver: `pick` chooses the next stroke among `remaining` (kept in
/// input order) given the current pen position and the step number
fn order_by<F, P>(strokes: &[Polyline], progress: &mut F, mut pick: P) -> Vec<usize>
where
    F: FnMut(usize, usize),
    P: FnMut(&[usize], Point, usize) -> Option<usize>,
{
    let total = strokes.len();
    if total == 0 {
        return Vec::new();
    }

    let mut order = Vec::with_capacity(total);
    let mut remaining: Vec<usize> = (1..total).collect();
    order.push(0);
    progress(1, total);
    let mut last_end = strokes[0].end().unwrap_or_else(Point::origin);

    for step in 1..total {
        let Some(next) = pick(&remaining, last_end, step) else {
            break;
        };
        remaining.retain(|&i| i != next);
        order.push(next);
        if let Some(end) = strokes[next].end() {
            last_end = end;
        }
        progress(step + 1, total);
    }
    order
}
