//! "Nice number" tick and level selection for axes and automatic contour levels.

/// Step mantissas tried within each decade, ascending.
const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Ticks at multiples of a nice step that fall inside `[lo, hi]`, at most
/// `max_ticks` of them. Picks the smallest step that satisfies the bound.
pub fn axis_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo || max_ticks == 0 {
        return Vec::new();
    }
    let step = smallest_step(lo, hi, max_ticks, |lo, hi, step| {
        ((hi / step).floor() - (lo / step).ceil() + 1.0).max(0.0) as usize
    });
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| clean(k as f64 * step, step)).collect()
}

/// Levels at multiples of a nice step covering `[lo, hi]`, with at most `bins`
/// intervals. The first level is `<= lo` and the last is `>= hi`.
pub fn covering_levels(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return Vec::new();
    }
    // a range straddling zero always needs two intervals
    let bins = bins.max(2);
    let step = smallest_step(lo, hi, bins, |lo, hi, step| {
        ((hi / step).ceil() - (lo / step).floor()) as usize
    });
    let first = (lo / step).floor() as i64;
    let last = (hi / step).ceil() as i64;
    (first..=last).map(|k| clean(k as f64 * step, step)).collect()
}

/// Number of decimals needed to print values that are multiples of `step`.
pub fn decimals_for_step(step: f64) -> usize {
    if !(step.is_finite() && step > 0.0) {
        return 0;
    }
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 10 && (scaled - scaled.round()).abs() > 1e-9 * scaled.max(1.0) {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

/// Formats tick values with a shared number of decimals.
pub fn format_ticks(ticks: &[f64]) -> Vec<String> {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    let decimals = if step.is_finite() {
        decimals_for_step(step)
    } else {
        ticks.first().map_or(0, |v| decimals_for_step(v.abs()))
    };
    ticks
        .iter()
        .map(|v| {
            let s = format!("{v:.decimals$}");
            // avoid "-0"
            if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                s.trim_start_matches('-').to_string()
            } else {
                s
            }
        })
        .collect()
}

fn smallest_step(
    lo: f64,
    hi: f64,
    max_count: usize,
    count: impl Fn(f64, f64, f64) -> usize,
) -> f64 {
    let raw = (hi - lo) / max_count as f64;
    let mut exponent = raw.log10().floor() as i32 - 1;
    loop {
        let decade = 10f64.powi(exponent);
        for mantissa in NICE_STEPS {
            let step = mantissa * decade;
            if count(lo, hi, step) <= max_count {
                return step;
            }
        }
        exponent += 1;
    }
}

/// Snaps `k * step` products back onto the decimal grid of `step`.
fn clean(value: f64, step: f64) -> f64 {
    let decimals = decimals_for_step(step) as i32;
    let scale = 10f64.powi(decimals);
    let cleaned = (value * scale).round() / scale;
    if cleaned == 0.0 { 0.0 } else { cleaned }
}
