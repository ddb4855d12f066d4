//! Root finding for the ultimate tolerance estimates.
//!
//! The function is only available as a black box (cycles to failure
//! minus one) so the secant method is used, started from a single
//! guess in the same way as the classic `newton` routine without a
//! derivative.

use log::{debug, warn};

/// Settings for the secant iteration.
#[derive(Debug, Clone, Copy)]
pub struct SecantOptions {
    /// absolute tolerance on the step between successive estimates
    pub tol: f64,
    /// maximum number of iterations before giving up
    pub max_iter: usize,
}

impl Default for SecantOptions {
    fn default() -> Self {
        Self {
            tol: 1.48e-8,
            max_iter: 50,
        }
    }
}

/// Find a root of `f` near `x0` with the default settings.
pub fn secant<F>(f: F, x0: f64) -> Result<f64, String>
where
    F: Fn(f64) -> f64,
{
    secant_with(f, x0, SecantOptions::default())
}

/// Find a root of `f` near `x0`.
///
/// The second starting point is a small relative step away from `x0`.
pub fn secant_with<F>(f: F, x0: f64, options: SecantOptions) -> Result<f64, String>
where
    F: Fn(f64) -> f64,
{
    let step = 1e-4;
    let mut p0 = x0;
    let mut p1 = if x0 >= 0.0 {
        x0 * (1.0 + step) + step
    } else {
        x0 * (1.0 + step) - step
    };
    let mut q0 = f(p0);
    let mut q1 = f(p1);

    if !q0.is_finite() || !q1.is_finite() {
        return Err(format!(
            "Secant: the function is not finite at the starting point {}",
            x0
        ));
    }

    if q1.abs() < q0.abs() {
        std::mem::swap(&mut p0, &mut p1);
        std::mem::swap(&mut q0, &mut q1);
    }

    for iter in 0..options.max_iter {
        if q1 == q0 {
            if p1 != p0 {
                warn!(
                    "***Warning: Secant: tolerance of {} reached, the function is flat between {} and {}",
                    p1 - p0,
                    p0,
                    p1
                );
            }
            return Ok((p1 + p0) / 2.0);
        }

        // written as a weighted average to limit cancellation
        let p = if q1.abs() > q0.abs() {
            (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
        } else {
            (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
        };

        if !p.is_finite() {
            return Err(format!(
                "Secant: the iteration diverged after {} iterations (last estimate {})",
                iter, p1
            ));
        }

        if (p - p1).abs() < options.tol {
            debug!("Secant: converged to {} in {} iterations", p, iter + 1);
            return Ok(p);
        }

        p0 = p1;
        q0 = q1;
        p1 = p;
        q1 = f(p1);
    }

    Err(format!(
        "Secant: failed to converge after {} iterations, value is {}",
        options.max_iter, p1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secant_finds_square_root() {
        let root = secant(|x| x * x - 2.0, 1.0).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn secant_handles_negative_start() {
        let root = secant(|x| x * x - 4.0, -3.0).unwrap();
        assert!((root + 2.0).abs() < 1e-10);
    }

    #[test]
    fn secant_finds_root_of_exponential_decay() {
        // the shape of a cycles to failure curve
        let root = secant(|x: f64| 1e5 * (-0.002 * x).exp() - 1.0, 1000.0).unwrap();
        assert!((root - 1e5_f64.ln() / 0.002).abs() < 1e-6);
    }

    #[test]
    fn secant_reports_failure_without_root() {
        let options = SecantOptions {
            tol: 1e-12,
            max_iter: 20,
        };
        assert!(secant_with(|x| x * x + 1.0, 0.5, options).is_err());
    }

    #[test]
    fn secant_returns_midpoint_on_a_plateau() {
        // a step function is flat around the start, so both starting
        // points give the same value
        let step = |x: f64| if x < 3.0 { -1.0 } else { 1.0 };
        let x1 = 1.0 * (1.0 + 1e-4) + 1e-4;
        let root = secant(step, 1.0).unwrap();
        assert!((root - (1.0 + x1) / 2.0).abs() < 1e-15);

        let root = secant(|_x: f64| 0.5, -2.0).unwrap();
        let x1 = -2.0 * (1.0 + 1e-4) - 1e-4;
        assert!((root - (-2.0 + x1) / 2.0).abs() < 1e-15);
    }

    #[test]
    fn secant_rejects_non_finite_start() {
        assert!(secant(|x: f64| 1.0 / (x - x), 1.0).is_err());
    }
}
