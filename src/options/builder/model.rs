use crate::options::DamageOptions;
use ergo::calibration::{self, DERIVED};
use ergo::damage::{self, DamageModel};
use ergo::COMMENT;
use std::collections::BTreeMap;

/// Create the reference damage model.
///
/// A stored calibration supplies the parameters, with any given
/// parameters replacing the calibrated values. A model name without a
/// calibration needs the complete set of parameters.
pub fn get_reference_model(options: &DamageOptions) -> Result<(Box<dyn DamageModel + Send + Sync>, String), String> {
    if calibration::get_calibration(&options.model).is_some() || options.model.contains(':') {
        let model = calibration::make_calibrated_model(&options.model, &options.params)?;
        let message = if options.params.is_empty() {
            format!("{}Using the calibration {}", COMMENT, options.model)
        } else {
            format!(
                "{}Using the calibration {} with the provided parameters {:?}",
                COMMENT, options.model, options.params
            )
        };
        Ok((model, message))
    } else {
        let model = damage::make_model(&options.model, &options.params)?;
        Ok((model, format!("{}Using the provided parameters", COMMENT)))
    }
}

/// Create the models compared with the reference model.
///
/// A comparison named model:derived is derived from the reference
/// model, any other name must be a stored calibration.
pub fn get_comparison_models(
    options: &DamageOptions,
    reference: &dyn DamageModel,
) -> Result<Vec<Box<dyn DamageModel + Send + Sync>>, String> {
    options
        .compare
        .iter()
        .map(|name| {
            let mut parts = name.splitn(2, ':');
            let model = parts.next().unwrap_or("");
            match parts.next() {
                Some(DERIVED) => damage::derive(model, reference),
                Some(_) => calibration::make_calibrated_model(name, &BTreeMap::new()),
                None => Err(format!(
                    "The comparison model '{}' needs a calibration, e.g. {}:{}",
                    name, model, DERIVED
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::get_default_options;
    use ergo::damage::{BarrettCallaghan, LiFFT, ParameterLabel};

    #[test]
    fn default_models_are_lifft_and_derived_barrett_callaghan() {
        let options = get_default_options();
        let (reference, _message) = get_reference_model(&options).unwrap();
        assert_eq!(reference.get_name(), LiFFT::NAME);

        let comparisons = get_comparison_models(&options, &*reference).unwrap();
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].get_name(), BarrettCallaghan::NAME);
        let b = comparisons[0].parameters()[&ParameterLabel::b];
        assert!((b - 0.00162).abs() < 1e-15);
    }

    #[test]
    fn parameters_replace_the_calibration() {
        let mut options = get_default_options();
        options.params = BTreeMap::from([(ParameterLabel::ut, 5000.0)]);
        let (reference, message) = get_reference_model(&options).unwrap();
        assert_eq!(reference.parameters()[&ParameterLabel::ut], 5000.0);
        assert!(message.contains("provided parameters"));

        // the derived model follows the new ultimate tolerance
        let comparisons = get_comparison_models(&options, &*reference).unwrap();
        let b = comparisons[0].parameters()[&ParameterLabel::b];
        assert!((b - 0.00324).abs() < 1e-15);
    }

    #[test]
    fn model_without_calibration_needs_all_parameters() {
        let mut options = get_default_options();
        options.model = "barrett-callaghan".to_string();
        assert!(get_reference_model(&options).is_err());

        options.params = BTreeMap::from([(ParameterLabel::a, 1e-10), (ParameterLabel::b, 1e-3)]);
        let (reference, _message) = get_reference_model(&options).unwrap();
        assert_eq!(reference.get_name(), BarrettCallaghan::NAME);
    }

    #[test]
    fn derived_comparison_needs_lifft_reference() {
        let mut options = get_default_options();
        options.model = "barrett-callaghan:default".to_string();
        let (reference, _message) = get_reference_model(&options).unwrap();
        assert!(get_comparison_models(&options, &*reference).is_err());

        options.compare = vec!["lifft:default".to_string()];
        assert_eq!(get_comparison_models(&options, &*reference).unwrap().len(), 1);

        options.compare = vec!["lifft".to_string()];
        assert!(get_comparison_models(&options, &*reference).is_err());
    }
}
