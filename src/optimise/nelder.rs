//! Numerical optimisation using the Nelder-Mead algorithm
//!
//! Reference: <https://en.wikipedia.org/wiki/Nelder%E2%80%93Mead_method>

use log::{debug, info, warn};
use std::cmp::Ordering;

use super::{sum_prediction_error_factorised, Optimisation, Sample};

/// A point on the simplex.
#[derive(Debug, Clone)]
struct Eval {
    x: Vec<f64>,
    score: f64,
}

// finds the centroid of a list of points
fn centroid(simplex: &[Eval]) -> Vec<f64> {
    let n = simplex[0].x.len();
    let mut sum = vec![0.0; n];
    for point in simplex {
        for (s, x) in sum.iter_mut().zip(&point.x) {
            *s += x;
        }
    }
    sum.iter().map(|s| s / simplex.len() as f64).collect()
}

// origin + factor * (to - from)
fn step_from(origin: &[f64], factor: f64, to: &[f64], from: &[f64]) -> Vec<f64> {
    origin
        .iter()
        .zip(to.iter().zip(from))
        .map(|(o, (t, f))| o + factor * (t - f))
        .collect()
}

// Keep track of each type of modification.
#[derive(Debug)]
enum Operation {
    Reflection,
    Expansion,
    Contraction,
    Reduction,
}

/// Nelder-Mead specific optimisation parameters.
#[derive(Debug, Clone, Copy)]
pub struct Parameters {
    /// step increment in each direction from the starting point
    pub step: f64,
    /// reflection factor (reflects the worst point through the centroid)
    pub alpha: f64,
    /// expansion factor (extends the reflected point)
    pub gamma: f64,
    /// contraction factor (away from the worst point)
    pub rho: f64,
    /// shrinking factor (around the best point)
    pub sigma: f64,
}

impl Parameters {
    /// Parameters in the order step, alpha, gamma, rho, sigma.
    pub fn new(values: &[f64]) -> Result<Parameters, String> {
        match values {
            [step, alpha, gamma, rho, sigma] => Ok(Parameters {
                step: *step,
                alpha: *alpha,
                gamma: *gamma,
                rho: *rho,
                sigma: *sigma,
            }),
            _ => Err(format!(
                "Nelder-Mead needs 5 parameters (step, alpha, gamma, rho, sigma) but {} were given",
                values.len()
            )),
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            step: 0.1,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

#[derive(Debug)]
pub struct Nelder {
    /// Nelder-Mead specific parameters
    nelder_parameters: Parameters,
    /// Parameters to be optimised
    parameters: Vec<f64>,
    converge_tol: f64,
    /// Maximum number of iterations to run
    max_iter: usize,
    /// Printable result
    result: String,
}

impl Nelder {
    pub fn new(nelder_parameters: Parameters, parameters: Vec<f64>, converge_tol: f64, max_iter: usize) -> Self {
        let result = "N/A".to_string();
        Self {
            nelder_parameters,
            parameters,
            converge_tol,
            max_iter,
            result,
        }
    }

    /// Nelder-Mead non-linear optimisation
    ///
    /// This routine works best if each of the parameters being optimised are
    /// roughly the same size. If this is not the case then they should
    /// be normalised to ensure they are.
    fn minimise<F>(&mut self, mut objective_function: F) -> f64
    where
        F: FnMut(&[f64]) -> f64,
    {
        check_nelder_limits(&self.nelder_parameters);
        let p = self.nelder_parameters;

        // a NaN score would break the ordering of the simplex
        let mut evaluate = |x: &[f64]| {
            let score = objective_function(x);
            if score.is_nan() {
                std::f64::INFINITY
            } else {
                score
            }
        };

        let x_start = self.parameters.clone();
        let mut results = vec![Eval {
            score: evaluate(&x_start),
            x: x_start.clone(),
        }];

        // initialise the simplex by taking a step in each direction.
        for i in 0..x_start.len() {
            let mut x_init = x_start.clone();
            x_init[i] += p.step;
            results.push(Eval {
                score: evaluate(&x_init),
                x: x_init,
            });
        }
        debug!("Nelder: starting simplex {:?}", results);

        let mut ops = Vec::new();
        let mut iter = 0;
        let n = results.len();

        loop {
            results.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

            // Check if exceeding the iteration limit.
            if iter >= self.max_iter {
                warn!(
                    "***Warning: The optimisation has failed to converge within the specified maximum iteration limit {}.
    The answer may not be optimum. Try increasing the limit.",
                    self.max_iter
                );
                break;
            }
            iter += 1;

            // check for convergence
            let change_tol = (results[0].score - results[n - 1].score).abs();
            debug!("Nelder: {} best: {} spread: {}", iter, results[0].score, change_tol);
            if change_tol < self.converge_tol {
                info!("Nelder: Success. Converged tol {}", change_tol);
                break;
            }

            let x0 = centroid(&results[0..n - 1]);

            // reflection
            // if the reflected point is better than the second worst,
            // but not better than the best, then replace the worst point
            // with the reflected point
            let xr = step_from(&x0, p.alpha, &x0, &results[n - 1].x);
            let rscore = evaluate(&xr);

            if rscore >= results[0].score && results[n - 2].score > rscore {
                ops.push(Operation::Reflection);
                results[n - 1] = Eval { x: xr, score: rscore };
                continue;
            }

            // expansion
            // If the reflected point is the best point so far
            // then compute the expanded point
            if rscore < results[0].score {
                let xe = step_from(&x0, p.gamma, &xr, &x0);
                let escore = evaluate(&xe);

                results[n - 1] = if escore < rscore {
                    ops.push(Operation::Expansion);
                    Eval { x: xe, score: escore }
                } else {
                    ops.push(Operation::Reflection);
                    Eval { x: xr, score: rscore }
                };
                continue;
            }

            // contraction
            // If the contracted point is better than the worst point,
            // replace the worst point with the contracted point
            let xc = step_from(&x0, p.rho, &results[n - 1].x, &x0);
            let cscore = evaluate(&xc);

            if cscore < results[n - 1].score {
                ops.push(Operation::Contraction);
                results[n - 1] = Eval { x: xc, score: cscore };
                continue;
            }

            // reduction
            // For all but the best point, replace the point with
            // xi = x1 + sigma(xi - x1)
            // This is a shrinking of the simplex around the best point
            ops.push(Operation::Reduction);
            let best = results[0].x.clone();
            for r in results.iter_mut().skip(1) {
                r.x = step_from(&best, p.sigma, &r.x, &best);
                r.score = evaluate(&r.x);
            }
        }

        let count = count_nelder_ops(&ops);
        info!(
            "Nelder: Iterations: {}. Operations: reflection {}, expansion {}, contraction {}, reduction {}",
            iter, count.reflection, count.expansion, count.contraction, count.reduction
        );

        self.parameters = results[0].x.clone();
        info!("Nelder: Score: {}", results[0].score);

        results[0].score
    }
}

impl Optimisation for Nelder {
    fn get_parameters(&self) -> &[f64] {
        &self.parameters
    }

    fn get_result(&self) -> String {
        self.result.to_owned()
    }

    fn run(&mut self, sample: &mut Sample) -> Result<(), String> {
        // number of variables to be optimised
        let n = self.parameters.len();
        let m = sample.targets.len();

        info!("Fit: n (variables) {} m (targets) {}", n, m);
        if n == 0 {
            return Err(format!("The {} model has no parameters to fit", sample.model.label()));
        }
        if m < n {
            return Err(format!(
                "Insufficient number of target forces {} to fit {} parameters",
                m, n
            ));
        }

        // Optimise non-dimensional factors on the starting values so that
        // parameters of very different sizes move together.
        let starting = self.parameters.to_owned();
        let start_score = sum_prediction_error_factorised(sample, &starting, &vec![1.0; n]);
        self.parameters = vec![1.0; n];

        let score = self.minimise(|factors: &[f64]| sum_prediction_error_factorised(sample, &starting, factors));

        if score <= start_score {
            for (param, start) in self.parameters.iter_mut().zip(&starting) {
                *param = start * param.max(0.0);
            }
        } else {
            warn!("***Warning: The fit did not improve on the starting parameters, keeping them.");
            self.parameters = starting;
        }

        // leave the model holding the result
        let final_score = sum_prediction_error_factorised(sample, &self.parameters, &vec![1.0; n]);

        self.result = format!(
            "{}: {:?} (rms error in log10 cycles {:.4}, was {:.4})",
            sample.model.label(),
            sample.model.parameters(),
            final_score,
            start_score
        );
        Ok(())
    }
}

struct NelderSum {
    reflection: usize,
    expansion: usize,
    contraction: usize,
    reduction: usize,
}

// Count the number of each type of operation in the nelder search.
fn count_nelder_ops(ops: &[Operation]) -> NelderSum {
    ops.iter().fold(
        NelderSum {
            reflection: 0,
            expansion: 0,
            contraction: 0,
            reduction: 0,
        },
        |mut count, op| {
            match *op {
                Operation::Reflection => count.reflection += 1,
                Operation::Expansion => count.expansion += 1,
                Operation::Contraction => count.contraction += 1,
                Operation::Reduction => count.reduction += 1,
            };

            count
        },
    )
}

/// Check that the Nelder parameters are acceptable.
fn check_nelder_limits(params: &Parameters) {
    // recommended parameter limits (wikipedia)
    if params.gamma < 0.0 {
        warn!(
            "***Warning: Wikipedia recommends using a Nelder-Mead value for gamma > 0.0, using {} .",
            params.gamma
        );
    }
    if params.rho < 0.0 || params.rho > 0.5 {
        warn!(
            "***Warning: Wikipedia recommends using a Nelder-Mead value 0.0 < rho < 0.5, using {}.",
            params.rho
        );
    }
    if params.sigma < 0.0 {
        warn!(
            "***Warning: Wikipedia recommends using a Nelder-Mead value for sigma > 0.0, using {}.",
            params.sigma
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimise::{get_targets, Sample};
    use ergo::damage::{BarrettCallaghan, DamageModel, LiFFT};
    use ergo::units::kN;

    #[test]
    fn test_centroid() {
        let x = vec![
            Eval {
                x: vec![0.0, 0.0, 0.0],
                score: 0.0,
            },
            Eval {
                x: vec![1.0, 2.5, 1.0],
                score: 0.0,
            },
            Eval {
                x: vec![2.0, 3.5, 2.0],
                score: 0.0,
            },
        ];

        let cent = centroid(&x);
        let ans = [1.0, 2.0, 1.0];

        for i in 0..3 {
            assert!((ans[i] - cent[i]).abs() < std::f64::EPSILON);
        }
    }

    #[test]
    fn parameters_need_five_values() {
        assert!(Parameters::new(&[0.1, 1.0, 2.0, 0.5, 0.5]).is_ok());
        assert!(Parameters::new(&[0.1, 1.0]).is_err());
    }

    #[test]
    fn test_nelder_rosenbrock() {
        let mut nelder = Nelder::new(Parameters::default(), vec![2.0, 3.0], 1e-12, 500);
        let result = nelder.minimise(rosenbrock2d);
        let optimised_params = nelder.get_parameters();

        assert!(result.abs() < 1e-9);
        assert!(optimised_params.iter().fold(0.0, |s, x| s + (x - 1.0).powi(2)) < 1e-6);
    }

    fn rosenbrock2d(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2)
    }

    #[test]
    fn test_nelder_himmelblau() {
        let x_all = [[5.0, -5.0], [-5.0, 5.0], [-5.0, -5.0], [0.0, 0.0]];
        let ans_all = [
            [3.584_428, -1.848_126],
            [-2.805_118, 3.131_312],
            [-3.779_310, -3.283_186],
            [3.0, 2.0],
        ];

        for (x, ans) in x_all.iter().zip(ans_all.iter()) {
            let mut nelder = Nelder::new(Parameters::default(), x.to_vec(), 1e-10, 100);
            nelder.minimise(himmelblau);

            let vec_error = nelder
                .get_parameters()
                .iter()
                .zip(ans.iter())
                .fold(0.0, |s, (x, a)| s + (x - a).powi(2));
            assert!(vec_error < 1e-5);
        }
    }

    fn himmelblau(x: &[f64]) -> f64 {
        // four identical local minima at
        // f(3.0, 2.0) = 0.0
        // f(-2.805118, 3.131312) = 0.0
        // f(-3.779310, -3.283186) = 0.0
        // f(3.584428, -1.848126) = 0.0
        (x[0].powi(2) + x[1] - 11.0).powi(2) + (x[0] + x[1].powi(2) - 7.0).powi(2)
    }

    #[test]
    fn fit_barrett_callaghan_to_lifft() {
        let lifft = LiFFT::default();
        let forces = (1..=8).map(|i| f64::from(i) * kN).collect::<Vec<_>>();
        let start = BarrettCallaghan::from_lifft(&lifft);
        let mut sample = Sample {
            model: Box::new(start.clone()),
            targets: get_targets(&lifft, &forces),
        };

        let mut nelder = Nelder::new(Parameters::default(), vec![start.a(), start.b()], 1e-10, 200);
        nelder.run(&mut sample).unwrap();

        let fitted = nelder.get_parameters();
        let start_error = crate::optimise::sum_prediction_error_factorised(
            &mut sample,
            &[start.a(), start.b()],
            &[1.0, 1.0],
        );
        let fitted_error = crate::optimise::sum_prediction_error_factorised(&mut sample, fitted, &[1.0, 1.0]);

        assert!(fitted_error < 0.1);
        assert!(fitted_error < start_error / 2.0);
        assert!(nelder.get_result().contains("Barrett-Callaghan"));
    }

    #[test]
    fn fit_needs_enough_targets() {
        let lifft = LiFFT::default();
        let mut sample = Sample {
            model: Box::new(BarrettCallaghan::default()),
            targets: get_targets(&lifft, &[1.0 * kN]),
        };
        let mut nelder = Nelder::new(Parameters::default(), sample.model.parameters().values().cloned().collect(), 1e-10, 10);
        assert!(nelder.run(&mut sample).is_err());
    }
}
