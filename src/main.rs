/// ergodamage
///
/// A program to compare cumulative fatigue damage models under
/// repetitive loading.
///
/// The program instantiates a reference damage model (LiFFT by
/// default) and one or more comparison models, reports each model's
/// parameters and ultimate tolerance, accumulates damage over a force
/// history of one force per repetition and plots the damage histories.
///
/// Most of the calculations are done through calls to the associated
/// **ergo** library. The main program is for doing anything that
/// explicitly uses the command line flags including the parameter
/// fitting module. These flags are used to build the **DamageOptions**
/// data structure which is then used to build the models and the force
/// history.
///
/// Think of the program flow as
///
/// 1. Build the reference and comparison models
/// 2. Report their parameters and ultimate tolerance
/// 3. If required, fit the comparison models to the reference and exit
/// 4. Build the force history and accumulate damage for every model
/// 5. Write out the summary, the damage table and the plot

#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate ergo;
extern crate log;

use ergo::damage::{self, DamageModel};
use ergo::load;
use ergo::plot::{self, Series};
use ergo::COMMENT;
use log::error;
use options::{builder, clap::get_options_clap, DamageOptions, LoadKind, TerminatingOutput};

mod list;
mod optimise;
mod options;

use optimise::Optimisation;

fn main() {
    env_logger::init();

    let options = {
        let mut options = options::get_default_options();
        get_options_clap("", &mut options);
        options
    };
    println!("{}ergodamage: version {}", COMMENT, crate_version!());
    println!("{}", COMMENT);
    if options.verbosity == options::Verbosity::Verbose {
        println!("{}Options: ", COMMENT);
        println!("{}", options);
    }

    // Check if we're just running to output data
    if options.output == TerminatingOutput::List {
        list::print_list();
        std::process::exit(0);
    }

    if options.output == TerminatingOutput::Fit && options.compare.is_empty() {
        error!("Error: --fit needs at least one model given with --compare but comparisons have been switched off.");
        std::process::exit(2)
    }

    // Perform logic checks on the given inputs to ensure valid data
    // has been provided
    if let Err(why) = is_input_data_consistent(&options) {
        error!("{}", why);
        std::process::exit(1)
    }

    let models = get_models(&options);

    // Fit the comparison models to the cycles to failure of the
    // reference model.
    if options.output == TerminatingOutput::Fit {
        fit_models(&options, &models);
        std::process::exit(0);
    }

    let forces = match builder::load::get_forces(&options.load) {
        Ok((forces, message)) => {
            println!("{}", message);
            forces
        }
        Err(why) => {
            error!("{}", why);
            std::process::exit(1)
        }
    };

    let history = damage::simulate_all(&models, &forces, options.init_damage);
    let repetitions = load::repetitions(forces.len());

    display_summary(&models, &history);

    if let Some(output_every) = options.output_every {
        display_history(&models, &history, output_every);
    }

    if !options.is_plot_disabled() {
        let series = models
            .iter()
            .zip(history)
            .map(|(model, damage)| Series {
                label: model.label().to_string(),
                x: repetitions.clone(),
                y: damage,
            })
            .collect::<Vec<_>>();

        match plot::write_svg_plot(&series, &options.plot) {
            Ok(()) => println!("{}Plot written to file '{}'", COMMENT, options.plot.file),
            Err(why) => {
                error!("Error: {}", why);
                std::process::exit(1)
            }
        }
    }
}

// Build the reference model followed by the comparison models and
// report their parameters.
fn get_models(options: &DamageOptions) -> Vec<Box<dyn DamageModel + Send + Sync>> {
    let reference = match builder::model::get_reference_model(options) {
        Ok((model, message)) => {
            println!("{}", message);
            model
        }
        Err(why) => {
            error!("Error: {}", why);
            std::process::exit(1)
        }
    };

    let comparisons = match builder::model::get_comparison_models(options, &*reference) {
        Ok(models) => models,
        Err(why) => {
            error!("Error: {}", why);
            std::process::exit(1)
        }
    };

    let mut models = vec![reference];
    models.extend(comparisons);

    for model in &models {
        println!("{}{} damage model:", COMMENT, model.label());
        println!("{}", model);
        println!("{}  parameters: {:?}", COMMENT, model.parameters());
        match model.estimate_uct() {
            Ok(uct) => println!("{}  ultimate tolerance: {:.1} N", COMMENT, uct),
            Err(why) => error!("Error: {}", why),
        }
    }
    println!("{}", COMMENT);

    models
}

fn fit_models(options: &DamageOptions, models: &[Box<dyn DamageModel + Send + Sync>]) {
    let (reference, comparisons) = models.split_at(1);
    let samples = builder::optimise::get_samples(options, &*reference[0], comparisons);

    for mut sample in samples {
        let mut optimisation = builder::optimise::get_optimisation(options, &sample);

        println!(
            "{}Now fitting {} with params {:?} to {} at forces {:?} ...",
            COMMENT,
            sample.model.label(),
            optimisation.get_parameters(),
            reference[0].label(),
            options.fit.forces
        );

        if let Err(why) = optimisation.run(&mut sample) {
            error!("Error: {}", why);
            std::process::exit(1)
        }

        println!("{}...finished the fit. ", COMMENT);
        println!("{}The fitted parameters are: \n{}", COMMENT, optimisation.get_result());
        println!("{}", sample.model);
        match sample.model.estimate_uct() {
            Ok(uct) => println!("{}  ultimate tolerance: {:.1} N", COMMENT, uct),
            Err(why) => error!("Error: {}", why),
        }
    }
}

fn display_summary(models: &[Box<dyn DamageModel + Send + Sync>], history: &[Vec<f64>]) {
    println!("{}Summary", COMMENT);
    for (model, damage) in models.iter().zip(history) {
        let last = damage.last().cloned().unwrap_or(0.0);
        let failure = match damage::failure_repetition(damage) {
            Some(repetition) => format!("failed at repetition {}", repetition),
            None => "no failure".to_string(),
        };
        println!(
            "{}  {:20} final damage {:.6e}, {}",
            COMMENT,
            model.label(),
            last,
            failure
        );
    }
}

// Print the damage of every model every `output_every` repetitions,
// always including the last repetition.
fn display_history(models: &[Box<dyn DamageModel + Send + Sync>], history: &[Vec<f64>], output_every: usize) {
    print!("{:>12}", "repetition");
    for model in models {
        print!(" {:>20}", model.label());
    }
    println!();

    let n = history.first().map(|damage| damage.len()).unwrap_or(0);
    for i in output_rows(n, output_every) {
        print!("{:>12}", i + 1);
        for damage in history {
            print!(" {:>20.8e}", damage[i]);
        }
        println!();
    }
}

// Zero based indexes of the rows printed in the damage table.
fn output_rows(n: usize, output_every: usize) -> Vec<usize> {
    if n == 0 {
        return vec![];
    }
    let step = output_every.max(1);
    let mut rows = (step - 1..n).step_by(step).collect::<Vec<_>>();
    if rows.last() != Some(&(n - 1)) {
        rows.push(n - 1);
    }
    rows
}

fn is_input_data_consistent(options: &DamageOptions) -> Result<(), String> {
    if options.load.kind == LoadKind::File && options.load.infile.is_empty() {
        return Err("Error: --load file needs the forces given with --load_infile".to_string());
    }

    if options.load.kind != LoadKind::File && options.load.repetitions <= 0 {
        return Err(format!(
            "Error: the number of repetitions ({}) must be positive",
            options.load.repetitions
        ));
    }

    if !options.init_damage.is_finite() {
        return Err(format!("Error: the initial damage ({}) must be finite", options.init_damage));
    }

    if !options.is_plot_disabled() && !options.plot.file.ends_with(".svg") {
        return Err(format!(
            "Error: Currently ergodamage can only generate svg. Please use a '.svg' suffix for '{}'",
            options.plot.file
        ));
    }

    Ok(())
}
