use crate::optimise::{get_targets, nelder::Nelder, Sample};
use crate::options::DamageOptions;
use ergo::damage::DamageModel;

/// Pair each comparison model with the cycles to failure of the
/// reference model at the fit forces.
pub fn get_samples(
    options: &DamageOptions,
    reference: &dyn DamageModel,
    comparisons: &[Box<dyn DamageModel + Send + Sync>],
) -> Vec<Sample> {
    let targets = get_targets(reference, &options.fit.forces);
    comparisons
        .iter()
        .map(|model| Sample {
            model: model.clone(),
            targets: targets.clone(),
        })
        .collect()
}

/// Set up the optimisation starting from the current parameters of
/// the sample model.
pub fn get_optimisation(options: &DamageOptions, sample: &Sample) -> Nelder {
    let params = sample.model.parameters().values().cloned().collect::<Vec<f64>>();
    Nelder::new(options.fit.nelder_params, params, options.fit.tol, options.fit.maxiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimise::Optimisation;
    use crate::options::get_default_options;
    use ergo::damage::{BarrettCallaghan, LiFFT, MinerPalmgren};

    #[test]
    fn samples_share_the_reference_targets() {
        let options = get_default_options();
        let lifft = LiFFT::default();
        let comparisons: Vec<Box<dyn DamageModel + Send + Sync>> = vec![
            Box::new(BarrettCallaghan::from_lifft(&lifft)),
            Box::new(MinerPalmgren::from_lifft(&lifft)),
        ];

        let samples = get_samples(&options, &lifft, &comparisons);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].targets.len(), 8);
        assert_eq!(samples[1].model.get_name(), MinerPalmgren::NAME);
    }

    #[test]
    fn optimisation_starts_from_model_parameters() {
        let options = get_default_options();
        let lifft = LiFFT::default();
        let comparisons: Vec<Box<dyn DamageModel + Send + Sync>> = vec![Box::new(BarrettCallaghan::default())];
        let samples = get_samples(&options, &lifft, &comparisons);

        let nelder = get_optimisation(&options, &samples[0]);
        assert_eq!(nelder.get_parameters(), &[2.47e-11, 0.00203]);
    }
}
