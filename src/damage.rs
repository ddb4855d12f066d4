//! Collection of cumulative damage models.
//!
//! A damage model translates a series of applied forces, one per
//! repetition, into an accumulated damage fraction. Failure is
//! expected when the damage reaches 1.0. The models differ in how the
//! damage increment for a repetition depends on the force and on the
//! damage already accumulated.
//!
//! Forces are in newtons (see `units`) and time is counted in
//! repetitions (lift durations).

use crate::solve;
use crate::special::e1;
use crate::units::kN;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Starting guess used when searching for the ultimate tolerance.
pub const UCT_GUESS: f64 = 1.0 * kN;

/// A standard definition of variable names used in the damage models.
///
/// The rust style is being intentionally disregarded here, as the
/// labels are typed by the user in the --parameters argument.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterLabel {
    a,
    b,
    ut,
}

impl ParameterLabel {
    /// Return a printable value for the label.
    fn text(self) -> &'static str {
        match self {
            ParameterLabel::a => "a",
            ParameterLabel::b => "b",
            ParameterLabel::ut => "ut",
        }
    }

    pub fn from_text(input: &str) -> Option<ParameterLabel> {
        match input {
            "a" => Some(ParameterLabel::a),
            "b" => Some(ParameterLabel::b),
            "ut" | "ultimate_tolerance" => Some(ParameterLabel::ut),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Trait for a cumulative damage model.
pub trait DamageModel {
    /// Display the damage equation and its parameters
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result;

    /// Damage increment for a single repetition at `force` given the
    /// damage `state` accumulated so far.
    fn rate(&self, state: f64, force: f64) -> f64;

    /// Number of repetitions at a constant force until failure.
    fn cycles_to_failure(&self, force: f64) -> f64;

    /// Accumulate damage over a force history.
    ///
    /// The returned history has one entry per force, holding the
    /// damage at the end of that repetition. The initial state is not
    /// included.
    fn simulate(&self, forces: &[f64], init: f64) -> Vec<f64> {
        accumulate(|state, force| self.rate(state, force), forces, init)
    }

    /// The ultimate tolerance: the force that is expected to cause
    /// failure in a single repetition.
    fn estimate_uct(&self) -> Result<f64, String> {
        solve::secant(|force| self.cycles_to_failure(force) - 1.0, UCT_GUESS)
            .map_err(|why| format!("Could not estimate the ultimate tolerance for {}: {}", self.label(), why))
    }

    /// Current parameter values
    fn parameters(&self) -> BTreeMap<ParameterLabel, f64>;

    /// Replace all the parameter values
    fn update_parameters(&mut self, params: &BTreeMap<ParameterLabel, f64>) -> Result<(), String>;

    /// Name used to select the model
    fn get_name(&self) -> &str;

    /// Name used in reports and plot legends
    fn label(&self) -> &str;

    fn inner_clone(&self) -> Box<dyn DamageModel + Send + Sync>;
}

impl Clone for Box<dyn DamageModel + Send + Sync> {
    fn clone(&self) -> Self {
        self.inner_clone()
    }
}

impl fmt::Display for dyn DamageModel + Send + Sync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        DamageModel::fmt(self, f)
    }
}

fn accumulate<F>(rate: F, forces: &[f64], init: f64) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let mut state = init;
    forces
        .iter()
        .map(|&force| {
            state += rate(state, force);
            state
        })
        .collect()
}

fn get_parameter(
    params: &BTreeMap<ParameterLabel, f64>,
    label: ParameterLabel,
    model: &str,
) -> Result<f64, String> {
    params
        .get(&label)
        .cloned()
        .ok_or_else(|| format!("Missing parameter '{}' for the {} model", label, model))
}

/// LiFFT cumulative damage model (Gallagher et al. 2017).
///
/// $$ dD/dn = A \exp(B \cdot 100 F / F_{ut}) $$
///
/// The damage increment is independent of the damage state so the
/// damage grows linearly under a constant force and is not limited
/// to 1.0.
#[derive(Debug, Clone)]
pub struct LiFFT {
    a: f64,
    b: f64,
    ut: f64,
}

impl LiFFT {
    pub const NAME: &'static str = "lifft";
    pub const LABEL: &'static str = "LiFFT";
    const CITE: &'static str = "Gallagher17";
    pub const UNITS: &'static str = "force in N, damage per lift repetition";
    const PARAMETER_LABELS: &'static [ParameterLabel] =
        &[ParameterLabel::a, ParameterLabel::b, ParameterLabel::ut];

    pub fn new(a: f64, b: f64, ut: f64) -> Self {
        Self { a, b, ut }
    }

    pub fn from_parameters(params: &BTreeMap<ParameterLabel, f64>) -> Result<Self, String> {
        Ok(Self {
            a: get_parameter(params, ParameterLabel::a, Self::NAME)?,
            b: get_parameter(params, ParameterLabel::b, Self::NAME)?,
            ut: get_parameter(params, ParameterLabel::ut, Self::NAME)?,
        })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn ultimate_tolerance(&self) -> f64 {
        self.ut
    }

    /// The exponent coefficient expressed per newton rather than per
    /// percent of the ultimate tolerance.
    pub fn force_coefficient(&self) -> f64 {
        self.b * 100.0 / self.ut
    }
}

impl Default for LiFFT {
    fn default() -> Self {
        Self {
            a: 1.0 / 902_416.0,
            b: 0.162,
            ut: 10.0 * kN,
        }
    }
}

impl DamageModel for LiFFT {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#  dD/dn = {a:e} * exp({b} * 100 * F / {ut}) [{name}:{cite}]",
            a = self.a,
            b = self.b,
            ut = self.ut,
            name = Self::LABEL,
            cite = Self::CITE
        )
    }

    fn rate(&self, _state: f64, force: f64) -> f64 {
        self.a * (self.b * 100.0 * force / self.ut).exp()
    }

    fn cycles_to_failure(&self, force: f64) -> f64 {
        1.0 / self.rate(0.0, force)
    }

    fn parameters(&self) -> BTreeMap<ParameterLabel, f64> {
        BTreeMap::from([
            (ParameterLabel::a, self.a),
            (ParameterLabel::b, self.b),
            (ParameterLabel::ut, self.ut),
        ])
    }

    fn update_parameters(&mut self, params: &BTreeMap<ParameterLabel, f64>) -> Result<(), String> {
        *self = Self::from_parameters(params)?;
        Ok(())
    }

    fn get_name(&self) -> &str {
        Self::NAME
    }

    fn label(&self) -> &str {
        Self::LABEL
    }

    fn inner_clone(&self) -> Box<dyn DamageModel + Send + Sync> {
        Box::new(self.clone())
    }
}

/// Barrett-Callaghan cumulative damage model.
///
/// $$ dD/dn = A (1 - D) \exp(B F / (1 - D)) $$
///
/// Time is measured in lift durations, for which the default A and B
/// were calibrated. The damage rate accelerates as the damage grows so
/// the damage is bounded to [0, 1] and stops growing once it reaches
/// failure.
#[derive(Debug, Clone)]
pub struct BarrettCallaghan {
    a: f64,
    b: f64,
}

impl BarrettCallaghan {
    pub const NAME: &'static str = "barrett-callaghan";
    pub const LABEL: &'static str = "Barrett-Callaghan";
    const CITE: &'static str = "BarrettCallaghan";
    pub const UNITS: &'static str = "force in N, time in lift durations";
    const PARAMETER_LABELS: &'static [ParameterLabel] = &[ParameterLabel::a, ParameterLabel::b];

    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn from_parameters(params: &BTreeMap<ParameterLabel, f64>) -> Result<Self, String> {
        Ok(Self {
            a: get_parameter(params, ParameterLabel::a, Self::NAME)?,
            b: get_parameter(params, ParameterLabel::b, Self::NAME)?,
        })
    }

    /// Carry the LiFFT parameters over by rescaling the exponent from
    /// percent of the ultimate tolerance to newtons.
    pub fn from_lifft(lifft: &LiFFT) -> Self {
        Self {
            a: lifft.a(),
            b: lifft.force_coefficient(),
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }
}

impl Default for BarrettCallaghan {
    fn default() -> Self {
        Self {
            a: 2.47e-11,
            b: 0.00203,
        }
    }
}

impl DamageModel for BarrettCallaghan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#  dD/dn = {a:e} * (1 - D) * exp({b} * F / (1 - D)) [{name}:{cite}]",
            a = self.a,
            b = self.b,
            name = Self::LABEL,
            cite = Self::CITE
        )
    }

    fn rate(&self, state: f64, force: f64) -> f64 {
        // A failed state has no capacity left, and (1 - D) = 0 would
        // otherwise give 0 * inf.
        if state < 1.0 {
            let remaining = 1.0 - state;
            self.a * remaining * (self.b * force / remaining).exp()
        } else {
            0.0
        }
    }

    fn cycles_to_failure(&self, force: f64) -> f64 {
        e1(self.b * force) / self.a
    }

    fn simulate(&self, forces: &[f64], init: f64) -> Vec<f64> {
        accumulate(|state, force| self.rate(state, force), forces, init)
            .into_iter()
            .map(|damage| damage.max(0.0).min(1.0))
            .collect()
    }

    fn parameters(&self) -> BTreeMap<ParameterLabel, f64> {
        BTreeMap::from([(ParameterLabel::a, self.a), (ParameterLabel::b, self.b)])
    }

    fn update_parameters(&mut self, params: &BTreeMap<ParameterLabel, f64>) -> Result<(), String> {
        *self = Self::from_parameters(params)?;
        Ok(())
    }

    fn get_name(&self) -> &str {
        Self::NAME
    }

    fn label(&self) -> &str {
        Self::LABEL
    }

    fn inner_clone(&self) -> Box<dyn DamageModel + Send + Sync> {
        Box::new(self.clone())
    }
}

/// Number of repetitions to failure as a function of force.
#[derive(Clone)]
pub enum SnCurve {
    /// $$ N = (1/A) \exp(-B F) $$
    Exponential { a: f64, b: f64 },
    /// Any user supplied curve
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl SnCurve {
    pub fn cycles(&self, force: f64) -> f64 {
        match self {
            SnCurve::Exponential { a, b } => (1.0 / a) * (-b * force).exp(),
            SnCurve::Custom(curve) => curve(force),
        }
    }
}

impl fmt::Debug for SnCurve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnCurve::Exponential { a, b } => write!(f, "Exponential {{ a: {:?}, b: {:?} }}", a, b),
            SnCurve::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Linear damage accumulation (Palmgren 1924, Miner 1945).
///
/// $$ dD/dn = 1 / N(F) $$
///
/// where N(F) is the S-N curve giving the repetitions to failure at a
/// constant force.
#[derive(Debug, Clone)]
pub struct MinerPalmgren {
    sn_curve: SnCurve,
}

impl MinerPalmgren {
    pub const NAME: &'static str = "miner-palmgren";
    pub const LABEL: &'static str = "Miner-Palmgren";
    const CITE: &'static str = "Miner45";
    pub const UNITS: &'static str = "force in N, damage per repetition";
    const PARAMETER_LABELS: &'static [ParameterLabel] = &[ParameterLabel::a, ParameterLabel::b];

    pub fn new(sn_curve: SnCurve) -> Self {
        Self { sn_curve }
    }

    pub fn exponential(a: f64, b: f64) -> Self {
        Self::new(SnCurve::Exponential { a, b })
    }

    pub fn from_parameters(params: &BTreeMap<ParameterLabel, f64>) -> Result<Self, String> {
        Ok(Self::exponential(
            get_parameter(params, ParameterLabel::a, Self::NAME)?,
            get_parameter(params, ParameterLabel::b, Self::NAME)?,
        ))
    }

    /// The S-N curve that accumulates damage exactly as LiFFT does.
    pub fn from_lifft(lifft: &LiFFT) -> Self {
        Self::exponential(lifft.a(), lifft.force_coefficient())
    }

    pub fn sn_curve(&self) -> &SnCurve {
        &self.sn_curve
    }
}

impl DamageModel for MinerPalmgren {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.sn_curve {
            SnCurve::Exponential { a, b } => write!(
                f,
                "#  dD/dn = 1 / N(F), N(F) = (1 / {a:e}) * exp(-{b} * F) [{name}:{cite}]",
                a = a,
                b = b,
                name = Self::LABEL,
                cite = Self::CITE
            ),
            SnCurve::Custom(_) => write!(
                f,
                "#  dD/dn = 1 / N(F), N(F) user supplied [{name}:{cite}]",
                name = Self::LABEL,
                cite = Self::CITE
            ),
        }
    }

    fn rate(&self, _state: f64, force: f64) -> f64 {
        1.0 / self.sn_curve.cycles(force)
    }

    fn cycles_to_failure(&self, force: f64) -> f64 {
        self.sn_curve.cycles(force)
    }

    fn parameters(&self) -> BTreeMap<ParameterLabel, f64> {
        match self.sn_curve {
            SnCurve::Exponential { a, b } => {
                BTreeMap::from([(ParameterLabel::a, a), (ParameterLabel::b, b)])
            }
            SnCurve::Custom(_) => BTreeMap::new(),
        }
    }

    fn update_parameters(&mut self, params: &BTreeMap<ParameterLabel, f64>) -> Result<(), String> {
        match self.sn_curve {
            SnCurve::Exponential { .. } => {
                *self = Self::from_parameters(params)?;
                Ok(())
            }
            SnCurve::Custom(_) if params.is_empty() => Ok(()),
            SnCurve::Custom(_) => {
                Err("A user supplied S-N curve has no parameters to update".to_string())
            }
        }
    }

    fn get_name(&self) -> &str {
        Self::NAME
    }

    fn label(&self) -> &str {
        Self::LABEL
    }

    fn inner_clone(&self) -> Box<dyn DamageModel + Send + Sync> {
        Box::new(self.clone())
    }
}

/// Parameter labels expected by a model name of the form
/// `model[:calibration]`.
pub fn parameter_labels(model_name: &str) -> Result<&'static [ParameterLabel], String> {
    let model = model_name.split(':').next().unwrap_or("");
    match model {
        LiFFT::NAME => Ok(LiFFT::PARAMETER_LABELS),
        BarrettCallaghan::NAME => Ok(BarrettCallaghan::PARAMETER_LABELS),
        MinerPalmgren::NAME => Ok(MinerPalmgren::PARAMETER_LABELS),
        _ => Err(format!("Unknown damage model: {:?}", model_name)),
    }
}

/// Create a damage model.
///
/// The model name is specified by two parts separated by a colon e.g.
/// `lifft:default`. Only the model part is used here, the
/// parameters must be the complete set for the model.
pub fn make_model(
    model_name: &str,
    params: &BTreeMap<ParameterLabel, f64>,
) -> Result<Box<dyn DamageModel + Send + Sync>, String> {
    let labels = parameter_labels(model_name)?;

    if !verify_parameters(params, labels) {
        return Err(format!(
            "Incorrect parameters given for {}: {:?}, expected {:?}",
            model_name, params, labels
        ));
    }

    let model = model_name.split(':').next().unwrap_or("");
    match model {
        LiFFT::NAME => Ok(Box::new(LiFFT::from_parameters(params)?) as Box<dyn DamageModel + Send + Sync>),
        BarrettCallaghan::NAME => {
            Ok(Box::new(BarrettCallaghan::from_parameters(params)?) as Box<dyn DamageModel + Send + Sync>)
        }
        MinerPalmgren::NAME => {
            Ok(Box::new(MinerPalmgren::from_parameters(params)?) as Box<dyn DamageModel + Send + Sync>)
        }
        _ => Err(format!("Cannot create damage model: {:?}", model_name)),
    }
}

/// Create a model of the family `target` from a LiFFT reference model
/// using the unit rescaling of the LiFFT exponent.
pub fn derive(target: &str, reference: &dyn DamageModel) -> Result<Box<dyn DamageModel + Send + Sync>, String> {
    if reference.get_name() != LiFFT::NAME {
        return Err(format!(
            "Models can only be derived from a {} model, not from {}",
            LiFFT::NAME,
            reference.get_name()
        ));
    }
    let lifft = LiFFT::from_parameters(&reference.parameters())?;

    let target = target.split(':').next().unwrap_or("");
    let derived = match target {
        LiFFT::NAME => Box::new(lifft.clone()) as Box<dyn DamageModel + Send + Sync>,
        BarrettCallaghan::NAME => Box::new(BarrettCallaghan::from_lifft(&lifft)) as Box<dyn DamageModel + Send + Sync>,
        MinerPalmgren::NAME => Box::new(MinerPalmgren::from_lifft(&lifft)) as Box<dyn DamageModel + Send + Sync>,
        _ => return Err(format!("Unknown damage model: {:?}", target)),
    };
    debug!("Derived {:?} from {:?}", derived.parameters(), lifft);

    Ok(derived)
}

/// Verify that the parameters given are complete and correct
pub fn verify_parameters(given: &BTreeMap<ParameterLabel, f64>, expected: &[ParameterLabel]) -> bool {
    given.len() == expected.len() && expected.iter().all(|key| given.contains_key(key))
}

/// Attach labels to a list of parameter values given in the sorted
/// order of the model's labels.
pub fn relabel_parameters(data: &[f64], model_name: &str) -> Result<BTreeMap<ParameterLabel, f64>, String> {
    let mut labels = parameter_labels(model_name)?.to_owned();

    if data.len() != labels.len() {
        return Err(format!(
            "Number of values does not match number of labels: {:?} {:?}",
            data, labels
        ));
    }

    labels.sort();
    Ok(labels.into_iter().zip(data.iter().cloned()).collect())
}

/// Simulate several models over the same force history in parallel.
///
/// The histories are returned in the order of the models.
pub fn simulate_all(models: &[Box<dyn DamageModel + Send + Sync>], forces: &[f64], init: f64) -> Vec<Vec<f64>> {
    info!(
        "Simulating {} models over {} repetitions",
        models.len(),
        forces.len()
    );
    models
        .par_iter()
        .map(|model| model.simulate(forces, init))
        .collect()
}

/// The repetition (counting from 1) at which the damage first reaches
/// failure.
pub fn failure_repetition(damage: &[f64]) -> Option<usize> {
    damage.iter().position(|&d| d >= 1.0).map(|i| i + 1)
}
