use ergo::damage::{self, BarrettCallaghan, LiFFT, MinerPalmgren};
use ergo::{calibration, units};

static HIGHLIGHTS: &str =
"    - Cumulative fatigue damage from repeated forces, one force per repetition
    - LiFFT, Barrett-Callaghan and Miner-Palmgren damage models
    - Estimate of the ultimate tolerance (the force that causes failure in a
      single repetition) for each model
    - Derivation of a model from LiFFT by rescaling its force coefficient
    - Fitting of a model's parameters to the cycles to failure of another
    - Constant, ramp, random and file force histories
    - SVG plot of damage against repetitions
";

static UNITS: &str =
"All quantities are held in SI base units: force in newtons (N), time in
seconds (s), length in metres (m), mass in kilograms (kg) and amount in moles
(mol). Time in the damage models is counted in repetitions, i.e. lift
durations. Forces and parameters given on the command line may carry any of the
unit symbols below, e.g. --force 1.5kN or --parameters ut=10kN. A number
without a unit is in base units. Unit symbols are case sensitive, so mN and MN
differ.
";

static OUTPUT: &str =
"For each model the program prints its equation, parameters and ultimate
tolerance, followed by a summary of the simulation: the damage after the last
repetition and the repetition at which the damage first reaches 1.0 (failure).

With --output_every N a table of the damage of every model is printed every N
repetitions. The damage histories are plotted against the repetition number in
the SVG file given by --plot_outfile.

The LiFFT damage is not limited, so a damage greater than 1.0 means the
repetitions exceed the predicted life. The Barrett-Callaghan damage is limited
to [0, 1] and stops growing at failure.
";

/// Prints out lists of data. Sort of an extended help.
pub fn print_list() {
    let models = [
        (
            LiFFT::NAME,
            "dD/dn = A exp(B 100 F / UT)",
            "LiFFT [Gallagher 17]. Damage per repetition grows exponentially with the
                     force as a percentage of the ultimate tolerance UT.",
        ),
        (
            BarrettCallaghan::NAME,
            "dD/dn = A (1 - D) exp(B F / (1 - D))",
            "[Barrett-Callaghan]. The damage rate increases with the damage already
                     accumulated. Time is measured in lift durations.",
        ),
        (
            MinerPalmgren::NAME,
            "dD/dn = 1 / N(F), N(F) = (1/A) exp(-B F)",
            "Linear damage accumulation [Palmgren 24] [Miner 45] with an exponential
                     S-N curve.",
        ),
    ];

    let formats = [(
        "Force files",
        "A force file read with --load_infile holds one force per repetition. The
forces are separated by whitespace and may be spread over any number of lines.
Blank lines and lines starting with '#' are ignored. The forces are multiplied
by --load_scale to convert them into newtons, e.g.

# lift forces in kN, use --load_scale 1000
1.2 0.8 1.5
2.0
",
    )];

    let biblio = [
["[Gallagher 17]", "Gallagher, S., Sesek, R. F., Schall, M. C. and Huangfu, R. (2017)
               Development and validation of an easy-to-use risk assessment tool
               for cumulative low back loading: The Lifting Fatigue Failure Tool
               (LiFFT). Applied Ergonomics 63 142-150"],

["[Barrett-Callaghan]", "Barrett, J. M. and Callaghan, J. P. A cumulative damage model
                    with a damage dependent rate. Manuscript in preparation"],

["[Miner 45]", "Miner, M. A. (1945) Cumulative Damage in Fatigue. Journal of Applied
           Mechanics 12 A159-A164"],

["[Palmgren 24]", "Palmgren, A. (1924) Die Lebensdauer von Kugellagern. Zeitschrift
              des Vereines Deutscher Ingenieure 68 339-341"],
    ];

    // Set up a new counter to automatically label the section headers
    let mut header = Counter::new();

    header.section("Program Highlights");
    print!("{}", HIGHLIGHTS);

    header.section("Units");
    print!("{}", UNITS);
    println!();
    println!("{:12} {:>14} Description", "Symbol", "Value");
    for &(symbol, value, description) in units::UNITS {
        println!("{:12} {:>14e} {}", symbol, value, description);
    }

    header.section("Output");
    print!("{}", OUTPUT);

    header.section("Damage Models");
    println!(
"Damage models are specified according to MODEL:calibration.

MODEL       = the name of the damage model.
calibration = the name of a stored set of parameters, or 'derived' to derive the
              parameters from a LiFFT reference model (--compare only).

If parameter values are specified via the --parameters option, these will be
used instead of the calibrated values. A MODEL without a calibration needs
every parameter.\n");

    println!("{:20} {:42} Parameters", "Name", "Equation");
    for &(name, equation, description) in &models {
        let labels = damage::parameter_labels(name)
            .map(|labels| labels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(","))
            .unwrap_or_default();
        println!("{:20} {:42} {}", name, equation, labels);
        println!("{:20} {}\n", "", description);
    }

    header.section("Calibrations");
    println!("{:28} {:20} Coefficients", "Name", "Ref.");
    for (name, calibration) in calibration::get_all_calibrations() {
        print!("{:28} {:20} ", name, calibration.cite);
        for (label, value) in &calibration.params {
            if (*value).abs() < 1.0 {
                print!("{}={:e} ", label, value);
            } else {
                print!("{}={} ", label, value);
            }
        }
        println!();
        println!("{:28} {:20} {}", "", "", calibration.units);
    }
    println!(
        "{:28} {:20} {}",
        format!("MODEL:{}", calibration::DERIVED),
        " ",
        "Derive from the LiFFT reference model, B' = B 100 / UT, A' = A."
    );

    header.section("File formats");

    for &(file, form) in &formats {
        header.subsection(file);
        println!("{}", form);
    }

    header.section("References");

    for bib in &biblio {
        println!("{} {}\n", bib[0], bib[1]);
    }

    println!();
}

struct Counter {
    section: usize,
    subsection: usize,
}

impl Counter {
    fn new() -> Counter {
        Counter {
            section: 0,
            subsection: 0,
        }
    }

    // print as a header
    fn section(&mut self, head: &str) {
        self.section += 1;
        let header = format!("{}. {}", self.section, head);
        println!("\n{}", header);
        // Underline
        println!("{}\n", "=".repeat(header.len()));
    }

    fn subsection(&mut self, head: &str) {
        self.subsection += 1;
        let header = format!("{}.{}. {}", self.section, self.subsection, head);
        println!("{}", header);
        // Underline
        println!("{}\n", "-".repeat(header.len()));
    }
}
