//! Numeric primitives for the DiD estimate.
//!
//! Every function is total: degenerate inputs (empty slices, a single sample, zero
//! spread) produce a neutral value instead of `NaN` so nothing downstream has to
//! special-case them.

/// Arithmetic mean. `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. `0.0` for fewer than two samples.
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let avg = mean(values);
    let squared_diffs: Vec<f64> = values.iter().map(|v| (v - avg).powi(2)).collect();
    mean(&squared_diffs).sqrt()
}

/// Standard error of the mean. `0.0` for fewer than two samples.
pub fn standard_error(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    standard_deviation(values) / (values.len() as f64).sqrt()
}

/// Cohen's d with a pooled standard deviation over `(n1 - 1) + (n2 - 1)` degrees of
/// freedom.
///
/// Returns `0.0` when either group is empty or the pooled deviation is zero (or not a
/// number, which happens when both groups hold a single sample).
pub fn cohens_d(treatment: &[f64], control: &[f64]) -> f64 {
    if treatment.is_empty() || control.is_empty() {
        return 0.0;
    }

    let n1 = treatment.len() as f64;
    let n2 = control.len() as f64;
    let sd_treatment = standard_deviation(treatment);
    let sd_control = standard_deviation(control);

    let pooled_sd = (((n1 - 1.0) * sd_treatment.powi(2) + (n2 - 1.0) * sd_control.powi(2))
        / (n1 + n2 - 2.0))
        .sqrt();

    if !pooled_sd.is_finite() || pooled_sd == 0.0 {
        return 0.0;
    }
    (mean(treatment) - mean(control)) / pooled_sd
}

/// Degrees of freedom for a two-sample t-test.
pub fn degrees_of_freedom(n1: usize, n2: usize) -> i64 {
    n1 as i64 + n2 as i64 - 2
}

/// Combined standard error of the difference between two means.
pub fn combined_standard_error(treatment: &[f64], control: &[f64]) -> f64 {
    (standard_error(treatment).powi(2) + standard_error(control).powi(2)).sqrt()
}

/// Independent-samples t-statistic. `0.0` when either group is empty or the combined
/// standard error is zero.
pub fn t_statistic(treatment: &[f64], control: &[f64]) -> f64 {
    if treatment.is_empty() || control.is_empty() {
        return 0.0;
    }
    let se_diff = combined_standard_error(treatment, control);
    if se_diff == 0.0 {
        return 0.0;
    }
    (mean(treatment) - mean(control)) / se_diff
}

/// Two-tailed p-value from a fixed threshold table on `|t|`.
///
/// This is deliberately coarse: only the buckets 0.01, 0.05, 0.1, 0.2 and 0.5 are ever
/// returned, plus 1.0 when there are no degrees of freedom.
pub fn approximate_p_value(t_stat: f64, df: i64) -> f64 {
    if df <= 0 {
        return 1.0;
    }

    let abs_t = t_stat.abs();
    if abs_t >= 2.576 {
        0.01
    } else if abs_t >= 1.96 {
        0.05
    } else if abs_t >= 1.645 {
        0.1
    } else if abs_t >= 1.282 {
        0.2
    } else {
        0.5
    }
}

/// Critical z-value for a confidence level given in percent. Unknown levels use 95%.
pub fn critical_value(confidence_level: u32) -> f64 {
    match confidence_level {
        90 => 1.645,
        95 => 1.96,
        99 => 2.576,
        _ => 1.96,
    }
}

/// Symmetric interval `mean_diff ± z * se`, returned as `(lower, upper)`.
pub fn confidence_interval(mean_diff: f64, standard_error: f64, confidence_level: u32) -> (f64, f64) {
    let margin = critical_value(confidence_level) * standard_error;
    (mean_diff - margin, mean_diff + margin)
}
