//! Math helpers for shaping choice weights and weighted shuffling.

use rand::seq::SliceRandom;
use rand::Rng;

/// Poisson probability mass at `x` for an average of `mu`.
///
/// Useful for weighting a choice emitter so that items near position
/// `mu` are selected most frequently.
pub fn poisson(x: u32, mu: f64) -> f64 {
    mu.powi(x as i32) * (-mu).exp() / factorial(x)
}

fn factorial(x: u32) -> f64 {
    (1..=x).fold(1.0_f64, |acc, n| acc * n as f64)
}

/// Gaussian probability density at `x` for the given mean and standard
/// deviation.
pub fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    let exponent = -((x - mu) / sigma).powi(2) / 2.0;
    exponent.exp() / ((2.0 * std::f64::consts::PI).sqrt() * sigma)
}

/// Limits a number to an optional minimum and/or maximum value.
///
/// ```
/// use fixturegen::math::clamp;
///
/// assert_eq!(clamp(35.0, Some(50.0), Some(100.0)), 50.0);
/// assert_eq!(clamp(35.0, Some(20.0), None), 35.0);
/// assert_eq!(clamp(35.0, None, Some(20.0)), 20.0);
/// ```
pub fn clamp(number: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    if let Some(mn) = min {
        if number < mn {
            return mn;
        }
    }
    if let Some(mx) = max {
        if number > mx {
            return mx;
        }
    }
    number
}

/// Returns the first `count` positions of a weighted random permutation.
///
/// Positions with larger weights have proportionally higher probability
/// of appearing earlier. Zero-weight positions are appended at the tail
/// in uniformly random order. Runs in O(n log n).
///
/// The ordering is produced by assigning each position an exponential
/// key (`ln(u) / w`) and sorting descending, so taking the first `k`
/// positions is a weighted sample without replacement.
pub fn weighted_shuffle<R: Rng + ?Sized>(weights: &[f64], rng: &mut R, count: usize) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = Vec::with_capacity(weights.len());
    let mut zeros: Vec<usize> = Vec::new();
    for (pos, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            // 1.0 - random() lies in (0, 1], keeping ln() finite.
            let u = 1.0 - rng.random::<f64>();
            keyed.push((u.ln() / weight, pos));
        } else {
            zeros.push(pos);
        }
    }
    keyed.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
    zeros.shuffle(rng);

    let mut order: Vec<usize> = keyed.into_iter().map(|(_, pos)| pos).collect();
    order.extend(zeros);
    order.truncate(count);
    order
}
