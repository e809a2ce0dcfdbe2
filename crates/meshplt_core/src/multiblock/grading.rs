use crate::multiblock::Zoning;

/// Cumulative parametric positions of the `n + 1` lattice points along one graded axis.
///
/// The first entry is `0.0` and the last is `1.0`. Without symmetric bias every step is `ratio`
/// times the previous one. With symmetric bias the steps grow by `ratio` up to the midpoint and
/// shrink by the same factor after it; for even `n` the two middle steps are equal and for odd `n`
/// the single middle step is not repeated.
pub fn positions(zoning: Zoning) -> Vec<f64> {
	let Zoning { n, ratio, symmetric } = zoning;
	let mut out = Vec::with_capacity(n + 1);
	out.push(0.0);
	if n == 0 {
		return out;
	}

	let mut factor = ratio;
	let mut step = 1.0 / step_sum(n, ratio, symmetric);
	let mut at = 0.0;
	for j in 0..n {
		at += step;
		step *= factor;
		if symmetric && j + 1 == n / 2 {
			if n % 2 == 0 {
				step /= factor;
			}
			factor = 1.0 / factor;
		}
		out.push(at);
	}

	// accumulated rounding must not move the far end
	out[n] = 1.0;
	out
}

fn step_sum(n: usize, ratio: f64, symmetric: bool) -> f64 {
	if !symmetric {
		let mut sum = 1.0;
		for _ in 1..n {
			sum = ratio * sum + 1.0;
		}
		return sum;
	}

	if n == 1 {
		return 1.0;
	}
	let mut sum = 2.0;
	if n % 2 == 1 {
		sum += ratio;
	}
	for _ in 1..n / 2 {
		sum = ratio * sum + 2.0;
	}
	sum
}
