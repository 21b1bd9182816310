use envelope_shared::ConfigurationError;

/// Fixed-step RK4 integration of `dt/ds = derivative(s, t)` from `s0` to `s_end`.
///
/// The number of steps is `ceil(|s_end - s0| / |step|)`; the step is shrunk
/// uniformly so the last stage lands exactly on `s_end`. Direction follows the
/// sign of `s_end - s0`, so the sign of `step` is ignored.
pub fn integrate<F>(derivative: F, s0: f64, t0: f64, s_end: f64, step: f64) -> Result<f64, ConfigurationError>
where
    F: Fn(f64, f64) -> f64,
{
    try_integrate(|s, t| Ok(derivative(s, t)), s0, t0, s_end, step)
}

/// Like [`integrate`], for derivatives that can fail part way.
pub fn try_integrate<F, E>(
    mut derivative: F,
    s0: f64,
    t0: f64,
    s_end: f64,
    step: f64,
) -> Result<f64, E>
where
    F: FnMut(f64, f64) -> Result<f64, E>,
    E: From<ConfigurationError>,
{
    if !step.is_finite() || step == 0.0 {
        return Err(ConfigurationError::InvalidStep(step).into());
    }
    for v in [s0, t0, s_end] {
        if !v.is_finite() {
            return Err(ConfigurationError::NonFiniteParameter(v).into());
        }
    }

    let span = s_end - s0;
    if span == 0.0 {
        return Ok(t0);
    }

    let steps = (span.abs() / step.abs()).ceil().max(1.0) as usize;
    let h = span / steps as f64;

    let mut s = s0;
    let mut t = t0;
    for i in 0..steps {
        let k1 = derivative(s, t)?;
        let k2 = derivative(s + 0.5 * h, t + 0.5 * h * k1)?;
        let k3 = derivative(s + 0.5 * h, t + 0.5 * h * k2)?;
        let k4 = derivative(s + h, t + h * k3)?;
        t += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        // Recompute from the index to avoid drift past s_end.
        s = s0 + h * (i + 1) as f64;
    }
    Ok(t)
}
