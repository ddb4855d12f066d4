use std::collections::BTreeMap;

use ergo::damage::ParameterLabel;
use ergo::units;
use crate::options::{DamageOptions, LoadKind, TerminatingOutput, Verbosity};
use crate::optimise::nelder;
use clap::{App, AppSettings, Arg, ArgMatches, ErrorKind};
use log::error;

/// Get the options from the command line.
pub fn get_options_clap(line: &str, options: &mut DamageOptions) {
    let process = App::new("ergodamage: cumulative fatigue damage under repetitive loading")
        .version(crate_version!())
        .about(include_str!("../description.md"))
        .setting(AppSettings::AllowLeadingHyphen)

        .arg(Arg::with_name("model")
             .short("m")
             .long("model")
             .value_name("NAME")
             .help("select the reference damage model as model:calibration (default lifft:default)")
             .takes_value(true))

        .arg(Arg::with_name("params")
             .short("p")
             .long("parameters")
             .value_name("p1=v1,p2=v2,...,pM=vM")
             .help("set parameters of the reference damage model, e.g. a=1.1e-6,b=0.162,ut=10kN")
             .takes_value(true))

        .arg(Arg::with_name("compare")
             .long("compare")
             .value_name("NAME1,NAME2,...")
             .help("select the models compared with the reference model. Use model:derived to derive a model from a LiFFT reference, or none (default barrett-callaghan:derived)")
             .takes_value(true)
             .require_delimiter(true))

        .arg(Arg::with_name("load")
             .long("load")
             .value_name("KIND")
             .possible_values(&LoadKind::variants())
             .help("select the kind of force history applied to the models (default constant)")
             .case_insensitive(true)
             .takes_value(true))

        .arg(Arg::with_name("force")
             .short("f")
             .long("force")
             .value_name("FORCE")
             .help("set the constant force, or the maximum force of a ramp or random load, e.g. 1kN (default 1kN)")
             .takes_value(true))

        .arg(Arg::with_name("force_min")
             .long("force_min")
             .value_name("FORCE")
             .help("set the minimum force of a random load (default 0)")
             .takes_value(true))

        .arg(Arg::with_name("repetitions")
             .short("N")
             .long("repetitions")
             .value_name("N")
             .help("set the number of repetitions of a generated load (default 100000)")
             .takes_value(true))

        .arg(Arg::with_name("seed")
             .long("seed")
             .value_name("SEED")
             .help("set the seed of the random load generator (default 0)")
             .takes_value(true))

        .arg(Arg::with_name("load_infile")
             .short("q")
             .long("load_infile")
             .value_name("FILE")
             .help("read the force history from a file, one force in N per repetition")
             .takes_value(true))

        .arg(Arg::with_name("load_scale")
             .short("s")
             .long("load_scale")
             .value_name("SCALE")
             .help("scale the forces read from file into newtons (default 1.0)")
             .takes_value(true))

        .arg(Arg::with_name("init_damage")
             .long("init_damage")
             .value_name("DAMAGE")
             .help("set the damage at the start of the first repetition (default 0.0)")
             .takes_value(true))

        .arg(Arg::with_name("output_every")
             .short("n")
             .long("output_every")
             .value_name("N")
             .help("output the damage of every model every N repetitions")
             .takes_value(true))

        .arg(Arg::with_name("plot_outfile")
             .short("o")
             .long("plot_outfile")
             .value_name("FILE")
             .help("write the damage histories to an svg file, or none for no plot (default damage.svg)")
             .takes_value(true))

        .arg(Arg::with_name("plot_size")
             .long("plot_size")
             .value_name("W,H")
             .help("set the size of the plot in pixels (default 800,500)")
             .takes_value(true)
             .require_delimiter(true))

        .arg(Arg::with_name("fit")
             .long("fit")
             .help("fit the parameters of the comparison models to the cycles to failure of the reference model and exit"))

        .arg(Arg::with_name("fit_forces")
             .long("fit_forces")
             .value_name("F1,F2,...")
             .help("set the constant forces at which the cycles to failure are matched (default 1kN,2kN,...,8kN)")
             .takes_value(true)
             .require_delimiter(true))

        .arg(Arg::with_name("opt_max")
             .long("opt_max")
             .value_name("N")
             .help("set maximum number of iterations for the fit (default 200)")
             .takes_value(true))

        .arg(Arg::with_name("opt_tol")
             .long("opt_tol")
             .value_name("TOL")
             .help("terminate the Nelder-Mead fit when the spread of errors in the simplex falls below this threshold (default 1e-10)")
             .takes_value(true))

        .arg(Arg::with_name("opt_nelder")
             .long("opt_nelder")
             .value_name("p1,...,p5")
             .help("change parameters controlling the Nelder-Mead fit (default step: 0.1, alpha: 1.0, gamma: 2.0, rho: 0.5, sigma: 0.5)")
             .takes_value(true)
             .require_delimiter(true))

        .arg(Arg::with_name("list")
             .short("l")
             .long("list")
             .help("list all available damage models, calibrations, units and references"))

        .arg(Arg::with_name("verbose")
             .short("v")
             .long("verbose")
             .help("print the options in use"));

    // turn the commands into matches
    let matches = if line.is_empty() {
        // this will get them directly from the command line
        process.get_matches()
    } else {
        // get them from the string
        // add command word since it skips first argument
        process.get_matches_from(("ergodamage ".to_string() + line.trim()).split(' '))
    };

    // damage models
    if let Some(model) = matches.value_of("model") {
        options.model = model.to_string();
    }
    if let Some(params) = matches.value_of("params") {
        options.params = parse_parameters(params).unwrap_or_else(|why| exit_with(&why));
    }
    if let Some(compare) = given(values_t!(matches, "compare", String)) {
        options.compare = if compare.len() == 1 && compare[0] == "none" {
            vec![]
        } else {
            compare
        };
    }

    // load options
    if let Some(kind) = given(value_t!(matches.value_of("load"), LoadKind)) {
        options.load.kind = kind;
    }
    if let Some(force) = quantity_of(&matches, "force") {
        options.load.force = force;
    }
    if let Some(force_min) = quantity_of(&matches, "force_min") {
        options.load.force_min = force_min;
    }
    if let Some(repetitions) = given(value_t!(matches, "repetitions", i64)) {
        options.load.repetitions = repetitions;
    }
    if let Some(seed) = given(value_t!(matches, "seed", u64)) {
        options.load.seed = seed;
    }
    if let Some(file) = matches.value_of("load_infile") {
        options.load.infile = file.to_string();
        options.load.kind = LoadKind::File;
    }
    if let Some(scale) = given(value_t!(matches, "load_scale", f64)) {
        options.load.scale = scale;
    }
    if let Some(init_damage) = given(value_t!(matches, "init_damage", f64)) {
        options.init_damage = init_damage;
    }

    // output options
    if let Some(output_every) = given(value_t!(matches, "output_every", usize)) {
        options.output_every = Some(output_every);
    }
    if let Some(file) = matches.value_of("plot_outfile") {
        options.plot.file = file.to_string();
    }
    if let Some(plot_size) = given(values_t!(matches, "plot_size", u32)) {
        if plot_size.len() != 2 {
            exit_with(&format!("Error: --plot_size needs two values W,H but was given {:?}", plot_size));
        }
        options.plot.xsize = plot_size[0];
        options.plot.ysize = plot_size[1];
    }
    if matches.is_present("list") {
        options.output = TerminatingOutput::List;
    }
    if matches.is_present("verbose") {
        options.verbosity = Verbosity::Verbose;
    }

    // fit options
    if matches.is_present("fit") && options.output != TerminatingOutput::List {
        options.output = TerminatingOutput::Fit;
    }
    if let Some(forces) = matches.values_of("fit_forces") {
        options.fit.forces = forces
            .map(units::parse_quantity)
            .collect::<Result<Vec<f64>, String>>()
            .unwrap_or_else(|why| exit_with(&why));
    }
    if let Some(opt_nelder) = given(values_t!(matches, "opt_nelder", f64)) {
        options.fit.nelder_params = nelder::Parameters::new(&opt_nelder).unwrap_or_else(|why| exit_with(&why));
    }
    if let Some(opt_max) = given(value_t!(matches, "opt_max", usize)) {
        options.fit.maxiter = opt_max;
    }
    if let Some(opt_tol) = given(value_t!(matches, "opt_tol", f64)) {
        options.fit.tol = opt_tol;
    }
}

// Separate an option that was not given from one whose value cannot
// be read.
fn checked<T>(result: Result<T, clap::Error>) -> Result<Option<T>, clap::Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ref e) if e.kind == ErrorKind::ArgumentNotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// The value of an option if it was given, exiting when it cannot be read.
fn given<T>(result: Result<T, clap::Error>) -> Option<T> {
    checked(result).unwrap_or_else(|e| e.exit())
}

fn exit_with(why: &str) -> ! {
    error!("{}", why);
    std::process::exit(1)
}

// A force with an optional unit, e.g. 1.5kN
fn quantity_of(matches: &ArgMatches, name: &str) -> Option<f64> {
    matches
        .value_of(name)
        .map(|text| units::parse_quantity(text).unwrap_or_else(|why| exit_with(&why)))
}

// Input expected as a comma separated list of paired values, of the
// form label=value where the value may carry a unit
// e.g a=1.1e-6,b=0.162,ut=10kN
fn parse_parameters(input: &str) -> Result<BTreeMap<ParameterLabel, f64>, String> {
    let mut result = BTreeMap::new();

    for pair in input.split(',') {
        let key_value = pair.split('=').collect::<Vec<&str>>();
        if key_value.len() != 2 {
            return Err(format!("Error: Invalid parameter format: {}", pair));
        }

        let key = ParameterLabel::from_text(key_value[0].trim())
            .ok_or_else(|| format!("Error: Unknown parameter label: {}", key_value[0]))?;
        let value = units::parse_quantity(key_value[1])
            .map_err(|why| format!("Error: Invalid parameter value for {}: {}", key, why))?;

        result.insert(key, value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::get_default_options;

    #[test]
    fn parse_parameters_accepts_units() {
        let params = parse_parameters("a=1e-6,b=0.2,ut=12kN").unwrap();
        assert_eq!(params[&ParameterLabel::a], 1e-6);
        assert_eq!(params[&ParameterLabel::b], 0.2);
        assert_eq!(params[&ParameterLabel::ut], 12_000.0);
    }

    #[test]
    fn parse_parameters_rejects_bad_input() {
        assert!(parse_parameters("a").is_err());
        assert!(parse_parameters("k=1.0").is_err());
        assert!(parse_parameters("a=x").is_err());
    }

    #[test]
    fn command_line_overrides_defaults() {
        let mut options = get_default_options();
        get_options_clap(
            "--load random --force 3kN --force_min 500 --repetitions 50 --seed 4 --compare miner-palmgren:derived,barrett-callaghan:default --plot_outfile none",
            &mut options,
        );

        assert_eq!(options.load.kind, LoadKind::Random);
        assert_eq!(options.load.force, 3000.0);
        assert_eq!(options.load.force_min, 500.0);
        assert_eq!(options.load.repetitions, 50);
        assert_eq!(options.load.seed, 4);
        assert_eq!(options.compare.len(), 2);
        assert!(options.is_plot_disabled());
        assert_eq!(options.output, TerminatingOutput::None);
    }

    #[test]
    fn load_infile_implies_file_load() {
        let mut options = get_default_options();
        get_options_clap("--load_infile forces.txt --load_scale 1000", &mut options);

        assert_eq!(options.load.kind, LoadKind::File);
        assert_eq!(options.load.infile, "forces.txt");
        assert_eq!(options.load.scale, 1000.0);
    }

    #[test]
    fn fit_options() {
        let mut options = get_default_options();
        get_options_clap("--fit --fit_forces 1kN,2kN,4kN --opt_max 50 --opt_nelder 0.2,1,2,0.5,0.5", &mut options);

        assert_eq!(options.output, TerminatingOutput::Fit);
        assert_eq!(options.fit.forces, vec![1000.0, 2000.0, 4000.0]);
        assert_eq!(options.fit.maxiter, 50);
        assert_eq!(options.fit.nelder_params.step, 0.2);
    }

    #[test]
    fn unreadable_values_are_errors_not_defaults() {
        let app = || {
            App::new("check")
                .arg(Arg::with_name("repetitions").long("repetitions").takes_value(true))
                .arg(Arg::with_name("plot_size").long("plot_size").takes_value(true).require_delimiter(true))
        };

        let matches = app().get_matches_from(vec!["check", "--repetitions", "abc", "--plot_size", "10,x"]);
        assert!(checked(value_t!(matches, "repetitions", i64)).is_err());
        assert!(checked(values_t!(matches, "plot_size", u32)).is_err());

        let matches = app().get_matches_from(vec!["check", "--repetitions", "20", "--plot_size", "10,20"]);
        assert_eq!(checked(value_t!(matches, "repetitions", i64)).unwrap(), Some(20));
        assert_eq!(checked(values_t!(matches, "plot_size", u32)).unwrap(), Some(vec![10, 20]));

        let matches = app().get_matches_from(vec!["check"]);
        assert_eq!(checked(value_t!(matches, "repetitions", i64)).unwrap(), None);
        assert_eq!(checked(values_t!(matches, "plot_size", u32)).unwrap(), None);
    }

    #[test]
    fn compare_none_removes_comparisons() {
        let mut options = get_default_options();
        get_options_clap("--compare none", &mut options);
        assert!(options.compare.is_empty());
    }
}
