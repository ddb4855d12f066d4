//! Generate and read force histories, one force per repetition.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Repetition numbers 1, 2, ..., n used as the x axis of a damage
/// history.
pub fn repetitions(n: usize) -> Vec<f64> {
    (1..=n).map(|i| i as f64).collect()
}

/// The same force applied for every repetition.
pub fn constant(force: f64, n: usize) -> Vec<f64> {
    vec![force; n]
}

/// Forces increasing linearly from zero up to `max` over `n`
/// repetitions, both ends included.
pub fn ramp(max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![0.0],
        _ => {
            let step = max / (n - 1) as f64;
            (0..n).map(|i| i as f64 * step).collect()
        }
    }
}

/// Forces drawn uniformly from [min, max).
///
/// The generator is seeded so that a run can be repeated.
pub fn random(min: f64, max: f64, n: usize, seed: u64) -> Result<Vec<f64>, String> {
    if !(min < max) {
        return Err(format!(
            "The minimum force {} must be less than the maximum force {} for a random load",
            min, max
        ));
    }
    if !(max - min).is_finite() {
        return Err(format!(
            "The forces {} and {} for a random load must be finite with a finite range",
            min, max
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n).map(|_| rng.gen_range(min..max)).collect())
}

/// Multiply every force by `factor`.
pub fn scale(forces: &[f64], factor: f64) -> Vec<f64> {
    forces.iter().map(|f| f * factor).collect()
}

/// Read a force history from a file.
///
/// Forces are separated by whitespace and may be spread over any
/// number of lines. Blank lines and lines starting with '#' are
/// skipped.
pub fn read_forces<P: AsRef<Path>>(path: P) -> Result<Vec<f64>, String> {
    let path = path.as_ref();
    let display = path.display();

    let file = File::open(path).map_err(|why| format!("Could not open the file '{}': {}", display, why))?;

    let mut forces = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|why| format!("Could not read the file '{}': {}", display, why))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for value in line.split_whitespace() {
            let force = value.parse::<f64>().map_err(|_| {
                format!(
                    "Could not read the force '{}' on line {} of '{}'",
                    value,
                    i + 1,
                    display
                )
            })?;
            forces.push(force);
        }
    }

    info!("Read {} forces from '{}'", forces.len(), display);
    Ok(forces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;
    use std::io::Write;

    #[test]
    fn repetitions_count_from_one() {
        assert_eq!(repetitions(3), vec![1.0, 2.0, 3.0]);
        assert!(repetitions(0).is_empty());
    }

    #[test]
    fn ramp_includes_both_ends() {
        assert_eq!(ramp(4.0, 5), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ramp(4.0, 1), vec![0.0]);
        assert!(ramp(4.0, 0).is_empty());
    }

    #[test]
    fn random_is_repeatable_and_in_range() {
        let first = random(100.0, 200.0, 1000, 7).unwrap();
        let second = random(100.0, 200.0, 1000, 7).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|&f| (100.0..200.0).contains(&f)));
        assert_ne!(first, random(100.0, 200.0, 1000, 8).unwrap());
    }

    #[test]
    fn random_rejects_empty_range() {
        assert!(random(200.0, 100.0, 10, 0).is_err());
        assert!(random(100.0, 100.0, 10, 0).is_err());
    }

    #[test]
    fn random_rejects_infinite_forces_and_ranges() {
        assert!(random(0.0, std::f64::INFINITY, 3, 0).is_err());
        assert!(random(std::f64::NEG_INFINITY, 0.0, 3, 0).is_err());
        assert!(random(-1e308, 1e308, 3, 0).is_err());
        assert!(random(-1e300, 1e300, 3, 0).is_ok());
    }

    #[test]
    fn read_forces_skips_comments_and_blank_lines() {
        let dir = TempDir::new("load").unwrap();
        let path = dir.path().join("forces.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "# lift forces in N").unwrap();
        writeln!(file, "100 200").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  300.5").unwrap();

        assert_eq!(read_forces(&path).unwrap(), vec![100.0, 200.0, 300.5]);
    }

    #[test]
    fn read_forces_reports_bad_values() {
        let dir = TempDir::new("load").unwrap();
        let path = dir.path().join("forces.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "100").unwrap();
        writeln!(file, "1kN").unwrap();

        let why = read_forces(&path).unwrap_err();
        assert!(why.contains("line 2"));
        assert!(read_forces(dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn scale_multiplies_every_force() {
        assert_eq!(scale(&[1.0, 2.0], 1000.0), vec![1000.0, 2000.0]);
    }
}
