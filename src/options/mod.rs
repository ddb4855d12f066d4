/// These are the data structures for command line options as well as
/// the initial default values.

use std::collections::BTreeMap;
use std::string::String;
use ergo::calibration::DERIVED;
use ergo::damage::{BarrettCallaghan, LiFFT, ParameterLabel};
use ergo::plot::PlotData;
use ergo::units::kN;
use ergo::COMMENT;

use crate::optimise::nelder;

pub mod builder;
pub mod clap;

arg_enum!{
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum LoadKind {
        Constant,
        Ramp,
        Random,
        File,
    }
}

/// Force history applied to the models, one force per repetition.
#[derive(Debug, Clone)]
pub struct Load {
    pub kind: LoadKind,
    /// Constant force, or the maximum of a ramp or random load (N)
    pub force: f64,
    /// Minimum of a random load (N)
    pub force_min: f64,
    /// Number of repetitions for the generated loads
    pub repetitions: i64,
    pub seed: u64,
    /// File of forces, one force per repetition
    pub infile: String,
    /// Scale the forces read from file by this factor
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct Fit {
    /// Constant forces at which the cycles to failure are matched
    pub forces: Vec<f64>,
    pub maxiter: usize,
    pub tol: f64,
    pub nelder_params: nelder::Parameters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verbosity {
    Verbose,
    Terse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerminatingOutput {
    List,
    Fit,
    None,
}

/// Option data for a cumulative damage calculation.
#[derive(Debug, Clone)]
pub struct DamageOptions {
    /// Reference damage model in the form model:calibration
    pub model: String,
    /// Parameters replacing those of the reference calibration.
    // A BTreeMap is being used to guarantee ordering during iteration for
    // use in the fitting.
    pub params: BTreeMap<ParameterLabel, f64>,
    /// Models compared with the reference model
    pub compare: Vec<String>,
    pub load: Load,
    /// Damage at the start of the first repetition
    pub init_damage: f64,
    /// Print the damage every N repetitions
    pub output_every: Option<usize>,
    pub plot: PlotData,
    pub fit: Fit,
    /// Type of output
    pub output: TerminatingOutput,
    /// Level of verbosity
    pub verbosity: Verbosity,
}

impl DamageOptions {
    /// Returns true if the plot has been switched off.
    pub fn is_plot_disabled(&self) -> bool {
        self.plot.file.is_empty() || self.plot.file == "none"
    }
}

impl std::fmt::Display for DamageOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}model: {:?}", COMMENT, self.model)?;
        writeln!(f, "{}params: {:?}", COMMENT, self.params)?;
        writeln!(f, "{}compare: {:?}", COMMENT, self.compare)?;
        writeln!(f, "{}load: {:?}", COMMENT, self.load)?;
        writeln!(f, "{}init_damage: {:?}", COMMENT, self.init_damage)?;
        writeln!(f, "{}output_every: {:?}", COMMENT, self.output_every)?;

        if self.output == TerminatingOutput::Fit {
            writeln!(f, "{}fit: {:?}", COMMENT, self.fit)?;
        }
        write!(f, "{}plot: {:?}", COMMENT, self.plot)
    }
}

pub fn get_default_options() -> DamageOptions {
    // default options reproduce the LiFFT versus Barrett-Callaghan comparison
    DamageOptions {
        model: format!("{}:default", LiFFT::NAME),
        params: BTreeMap::new(),
        compare: vec![format!("{}:{}", BarrettCallaghan::NAME, DERIVED)],

        // a single lift of 1 kN repeated
        load: Load {
            kind: LoadKind::Constant,
            force: 1.0 * kN,
            force_min: 0.0,
            repetitions: 100_000,
            seed: 0,
            infile: "".to_string(),
            scale: 1.0,
        },
        init_damage: 0.0,

        fit: Fit {
            forces: (1..=8).map(|i| f64::from(i) * kN).collect(),
            maxiter: 200,
            tol: 1e-10,
            nelder_params: nelder::Parameters::default(),
        },

        // output options
        output_every: None,
        plot: PlotData::default(),
        output: TerminatingOutput::None,
        verbosity: Verbosity::Terse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compare_derived_barrett_callaghan_with_lifft() {
        let options = get_default_options();
        assert_eq!(options.model, "lifft:default");
        assert_eq!(options.compare, vec!["barrett-callaghan:derived".to_string()]);
        assert_eq!(options.load.kind, LoadKind::Constant);
        assert_eq!(options.load.force, 1000.0);
        assert_eq!(options.load.repetitions, 100_000);
        assert_eq!(options.fit.forces.len(), 8);
        assert!(!options.is_plot_disabled());
    }

    #[test]
    fn display_prefixes_every_line() {
        let text = format!("{}", get_default_options());
        assert!(text.lines().all(|line| line.starts_with(COMMENT)));
    }
}
