use crate::options::{Load, LoadKind};
use ergo::load;
use ergo::COMMENT;

/// Create the force history, one force per repetition.
pub fn get_forces(options: &Load) -> Result<(Vec<f64>, String), String> {
    if options.kind == LoadKind::File {
        if options.infile.is_empty() {
            return Err("Error: a file load needs the forces given with --load_infile".to_string());
        }
        let forces = load::scale(&load::read_forces(&options.infile)?, options.scale);
        if forces.is_empty() {
            return Err(format!("Error: there are no forces in the file '{}'", options.infile));
        }
        let message = format!(
            "{}Read {} forces from '{}' scaled by {}",
            COMMENT,
            forces.len(),
            options.infile,
            options.scale
        );
        return Ok((forces, message));
    }

    if options.repetitions <= 0 {
        return Err(format!(
            "Error: the number of repetitions must be positive, not {}",
            options.repetitions
        ));
    }
    let n = options.repetitions as usize;

    let (forces, message) = match options.kind {
        LoadKind::Ramp => (
            load::ramp(options.force, n),
            format!("{}Ramp load from 0 to {} N over {} repetitions", COMMENT, options.force, n),
        ),
        LoadKind::Random => (
            load::random(options.force_min, options.force, n, options.seed)?,
            format!(
                "{}Random load between {} N and {} N over {} repetitions (seed {})",
                COMMENT, options.force_min, options.force, n, options.seed
            ),
        ),
        _ => (
            load::constant(options.force, n),
            format!("{}Constant load of {} N over {} repetitions", COMMENT, options.force, n),
        ),
    };

    Ok((forces, message))
}
