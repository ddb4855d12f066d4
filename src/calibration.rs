#![allow(clippy::unreadable_literal)]

//! Database of published damage model parameters.
//!
//! A calibration is selected with the `model:calibration` format,
//! e.g. `lifft:default`.

use std::collections::BTreeMap;

use crate::damage::*;

/// Calibration name meaning "derive the parameters from the reference
/// model" rather than looking them up.
pub const DERIVED: &str = "derived";

pub struct Calibration {
    pub name: &'static str,
    pub cite: &'static str,
    pub units: &'static str,
    // A BTreeMap is being used to guarantee ordering during iteration for
    // use in the parameter fitting.
    pub params: BTreeMap<ParameterLabel, f64>,
}

lazy_static! {
    static ref CALIBRATIONS: BTreeMap<&'static str, Calibration> = {
        let mut calibrations = BTreeMap::new();

        let mut name = "lifft:default";
        calibrations.insert(
            name,
            Calibration {
                name,
                cite: "[Gallagher 17]",
                units: LiFFT::UNITS,
                params: LiFFT::default().parameters(),
            },
        );

        name = "barrett-callaghan:default";
        calibrations.insert(
            name,
            Calibration {
                name,
                cite: "[Barrett-Callaghan]",
                units: BarrettCallaghan::UNITS,
                params: BarrettCallaghan::default().parameters(),
            },
        );

        // The S-N curve that accumulates damage in the same way as
        // lifft:default, i.e. b = 0.162 * 100 / 10 kN.
        name = "miner-palmgren:lifft";
        calibrations.insert(
            name,
            Calibration {
                name,
                cite: "[Gallagher 17]",
                units: MinerPalmgren::UNITS,
                params: BTreeMap::from([
                    (ParameterLabel::a, 1.0 / 902416.0),
                    (ParameterLabel::b, 0.00162),
                ]),
            },
        );

        calibrations
    };
}

/// Return the full map of calibrations as <name, calibration>
pub fn get_all_calibrations() -> &'static BTreeMap<&'static str, Calibration> {
    &CALIBRATIONS
}

/// Get a single calibration using the model:calibration format
pub fn get_calibration(name: &str) -> Option<&'static Calibration> {
    CALIBRATIONS.get(name)
}

/// Build a model from a stored calibration, optionally replacing some
/// of its parameters.
pub fn make_calibrated_model(
    name: &str,
    overrides: &BTreeMap<ParameterLabel, f64>,
) -> Result<Box<dyn DamageModel + Send + Sync>, String> {
    let calibration = get_calibration(name).ok_or_else(|| {
        format!(
            "Unknown calibration '{}'. Use --list to see the available calibrations",
            name
        )
    })?;

    let mut params = calibration.params.clone();
    for (label, value) in overrides {
        if !params.contains_key(label) {
            return Err(format!("The parameter '{}' is not used by '{}'", label, name));
        }
        params.insert(*label, *value);
    }

    make_model(name, &params)
}
