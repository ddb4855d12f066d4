//! This module fits the parameters of one damage model family so
//! that its cycles to failure match those of a reference model.
//!
//! The comparison is made on log10 of the cycles to failure at a set
//! of constant forces, since the cycles span many orders of magnitude
//! over the working force range.

use ergo::damage::{relabel_parameters, DamageModel};
use log::debug;

pub mod nelder;

/// Error given to a prediction that is not a finite positive number
/// of cycles, e.g. after a parameter has been driven to zero.
const PENALTY: f64 = 1e3;

pub trait Optimisation {
    fn run(&mut self, sample: &mut Sample) -> Result<(), String>;

    fn get_parameters(&self) -> &[f64];

    fn get_result(&self) -> String;
}

/// The cycles to failure of the reference model at a single force.
#[derive(Debug, Clone)]
pub struct Target {
    pub force: f64,
    pub cycles: f64,
}

/// The model being fitted together with the targets it is fitted to.
#[derive(Clone)]
pub struct Sample {
    pub model: Box<dyn DamageModel + Send + Sync>,
    pub targets: Vec<Target>,
}

/// Sample the reference model at each force.
pub fn get_targets(reference: &dyn DamageModel, forces: &[f64]) -> Vec<Target> {
    forces
        .iter()
        .map(|&force| Target {
            force,
            cycles: reference.cycles_to_failure(force),
        })
        .filter(|target| target.cycles.is_finite() && target.cycles > 0.0)
        .collect()
}

/// Error between the predicted and target log cycles to failure for
/// each target, after installing `params` into the model.
pub fn prediction_error(sample: &mut Sample, params: &[f64]) -> Result<Vec<f64>, String> {
    let labelled = relabel_parameters(params, sample.model.get_name())?;
    sample.model.update_parameters(&labelled)?;

    Ok(sample
        .targets
        .iter()
        .map(|target| {
            let predicted = sample.model.cycles_to_failure(target.force);
            if predicted.is_finite() && predicted > 0.0 {
                predicted.log10() - target.cycles.log10()
            } else {
                PENALTY
            }
        })
        .collect())
}

/// Root mean square of a list of errors.
pub fn rms(errors: &[f64]) -> f64 {
    if errors.is_empty() {
        return 0.0;
    }
    (errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64).sqrt()
}

/// Calculates the total error for the parameters `params` scaled by
/// the non-dimensional `factors`.
pub fn sum_prediction_error_factorised(sample: &mut Sample, params: &[f64], factors: &[f64]) -> f64 {
    // a negative factor would flip the sign of a parameter
    let scaled = params
        .iter()
        .zip(factors)
        .map(|(p, f)| p * f.max(0.0))
        .collect::<Vec<f64>>();

    match prediction_error(sample, &scaled) {
        Ok(errors) => {
            let total = rms(&errors);
            debug!("Fit: params {:?} error {}", scaled, total);
            total
        }
        Err(why) => {
            debug!("Fit: could not evaluate {:?}: {}", scaled, why);
            std::f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergo::damage::{BarrettCallaghan, LiFFT};
    use ergo::units::kN;

    fn sample() -> Sample {
        let lifft = LiFFT::default();
        let forces = (1..=8).map(|i| f64::from(i) * kN).collect::<Vec<_>>();
        Sample {
            model: Box::new(BarrettCallaghan::from_lifft(&lifft)),
            targets: get_targets(&lifft, &forces),
        }
    }

    #[test]
    fn targets_follow_reference_model() {
        let lifft = LiFFT::default();
        let targets = get_targets(&lifft, &[1.0 * kN, 2.0 * kN]);
        assert_eq!(targets.len(), 2);
        assert!((targets[0].cycles - lifft.cycles_to_failure(1.0 * kN)).abs() < 1e-6);
    }

    #[test]
    fn prediction_error_is_zero_for_identical_models() {
        let lifft = LiFFT::default();
        let mut sample = Sample {
            model: Box::new(lifft.clone()),
            targets: get_targets(&lifft, &[1.0 * kN, 4.0 * kN]),
        };
        let params = [lifft.a(), lifft.b(), lifft.ultimate_tolerance()];
        let errors = prediction_error(&mut sample, &params).unwrap();
        assert!(errors.iter().all(|e| e.abs() < 1e-12));
    }

    #[test]
    fn zero_parameters_are_penalised() {
        let mut sample = sample();
        let errors = prediction_error(&mut sample, &[0.0, 1e-3]).unwrap();
        assert!(errors.iter().all(|&e| e == PENALTY));
        assert!(prediction_error(&mut sample, &[1.0]).is_err());
    }

    #[test]
    fn factorised_error_at_unit_factors_is_starting_error() {
        let mut sample = sample();
        let params = sample.model.parameters().values().cloned().collect::<Vec<_>>();
        let error = sum_prediction_error_factorised(&mut sample, &params, &[1.0, 1.0]);
        assert!((error - 0.887_012_631_214_091).abs() < 1e-9);
    }

    #[test]
    fn rms_of_errors() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[3.0, -3.0]) - 3.0).abs() < 1e-15);
    }
}
