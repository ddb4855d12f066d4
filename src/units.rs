#![allow(non_upper_case_globals)]
#![allow(clippy::unreadable_literal)]

//! Unit system used for forces, times and the other quantities that
//! appear in damage model parameters.
//!
//! Every quantity is stored as an `f64` in SI base units (N, s, m, kg,
//! mol) so a value is converted into a unit by multiplying with the
//! unit constant, and out of it by dividing:
//!
//! ```
//! use ergo::units::{kN, N};
//! let force = 2.5 * kN;
//! assert_eq!(force / N, 2500.0);
//! ```
//!
//! The names keep their usual symbol case because `mN` and `MN` are
//! different units.

// Time
pub const s: f64 = 1.0;
pub const minute: f64 = 60.0 * s;
pub const hour: f64 = 60.0 * minute;
pub const day: f64 = 24.0 * hour;

// Force
pub const N: f64 = 1.0;
pub const kN: f64 = 1e3 * N;
pub const MN: f64 = 1e6 * N;
pub const GN: f64 = 1e9 * N;
pub const mN: f64 = 1e-3 * N;
pub const uN: f64 = 1e-6 * N;
pub const nN: f64 = 1e-9 * N;

// Length
pub const m: f64 = 1.0;
pub const km: f64 = 1e3 * m;
pub const cm: f64 = 1e-2 * m;
pub const mm: f64 = 1e-3 * m;
pub const um: f64 = 1e-6 * m;
pub const nm: f64 = 1e-9 * m;
pub const inch: f64 = 0.0254 * m;
pub const ft: f64 = 0.3048 * m;

// Volume
pub const m3: f64 = m * m * m;
pub const cm3: f64 = 1e-6 * m3;
pub const mm3: f64 = 1e-9 * m3;
pub const L: f64 = 1e-3 * m3;
pub const mL: f64 = cm3;
pub const uL: f64 = 1e-6 * L;
pub const nL: f64 = 1e-9 * L;
pub const gallon: f64 = 3.78541 * L;
pub const quart: f64 = 0.946353 * L;
pub const pint: f64 = 0.473176 * L;
pub const cup: f64 = 0.24 * L;
pub const tablespoon: f64 = 0.0147868 * L;
pub const teaspoon: f64 = 0.00492892 * L;

// Mass
pub const kg: f64 = 1.0;
pub const g: f64 = 1e-3 * kg;
pub const mg: f64 = 1e-6 * kg;
pub const ug: f64 = 1e-9 * kg;
pub const tonne: f64 = 1e3 * kg;
pub const lb: f64 = 0.453592 * kg;

// Amount
pub const mol: f64 = 1.0;
pub const mmol: f64 = 1e-3 * mol;
pub const umol: f64 = 1e-6 * mol;
pub const nmol: f64 = 1e-9 * mol;
pub const mol_per_L: f64 = mol / L;

// Energy
pub const J: f64 = N * m;
pub const kJ: f64 = 1e3 * J;
pub const MJ: f64 = 1e6 * J;
pub const cal: f64 = 4.184 * J;
pub const kcal: f64 = 1e3 * cal;

// Power
pub const W: f64 = J / s;
pub const kW: f64 = 1e3 * W;
pub const MW: f64 = 1e6 * W;

// Pressure
pub const Pa: f64 = N / (m * m);
pub const kPa: f64 = 1e3 * Pa;
pub const MPa: f64 = 1e6 * Pa;
pub const atm: f64 = 101325.0 * Pa;
pub const bar: f64 = 1e5 * Pa;
pub const mmHg: f64 = 133.322 * Pa;
pub const psi: f64 = 6894.76 * Pa;

// Cumulative load
pub const MNs: f64 = MN * s;
pub const GNs: f64 = GN * s;

/// Symbols accepted by `lookup` and `parse_quantity` as
/// (symbol, value in base units, description).
pub static UNITS: &[(&str, f64, &str)] = &[
    ("s", s, "second"),
    ("minute", minute, "minute"),
    ("hour", hour, "hour"),
    ("day", day, "day"),
    ("N", N, "newton"),
    ("kN", kN, "kilonewton"),
    ("MN", MN, "meganewton"),
    ("GN", GN, "giganewton"),
    ("mN", mN, "millinewton"),
    ("uN", uN, "micronewton"),
    ("nN", nN, "nanonewton"),
    ("m", m, "metre"),
    ("km", km, "kilometre"),
    ("cm", cm, "centimetre"),
    ("mm", mm, "millimetre"),
    ("um", um, "micrometre"),
    ("nm", nm, "nanometre"),
    ("inch", inch, "inch"),
    ("ft", ft, "foot"),
    ("m3", m3, "cubic metre"),
    ("cm3", cm3, "cubic centimetre"),
    ("mm3", mm3, "cubic millimetre"),
    ("L", L, "litre"),
    ("mL", mL, "millilitre"),
    ("uL", uL, "microlitre"),
    ("nL", nL, "nanolitre"),
    ("gallon", gallon, "US gallon"),
    ("quart", quart, "US quart"),
    ("pint", pint, "US pint"),
    ("cup", cup, "US cup"),
    ("tablespoon", tablespoon, "US tablespoon"),
    ("teaspoon", teaspoon, "US teaspoon"),
    ("kg", kg, "kilogram"),
    ("g", g, "gram"),
    ("mg", mg, "milligram"),
    ("ug", ug, "microgram"),
    ("tonne", tonne, "metric tonne"),
    ("lb", lb, "pound mass"),
    ("mol", mol, "mole"),
    ("mmol", mmol, "millimole"),
    ("umol", umol, "micromole"),
    ("nmol", nmol, "nanomole"),
    ("mol_per_L", mol_per_L, "mole per litre"),
    ("J", J, "joule"),
    ("kJ", kJ, "kilojoule"),
    ("MJ", MJ, "megajoule"),
    ("cal", cal, "calorie"),
    ("kcal", kcal, "kilocalorie"),
    ("W", W, "watt"),
    ("kW", kW, "kilowatt"),
    ("MW", MW, "megawatt"),
    ("Pa", Pa, "pascal"),
    ("kPa", kPa, "kilopascal"),
    ("MPa", MPa, "megapascal"),
    ("atm", atm, "standard atmosphere"),
    ("bar", bar, "bar"),
    ("mmHg", mmHg, "millimetre of mercury"),
    ("psi", psi, "pound per square inch"),
    ("MNs", MNs, "meganewton second (cumulative load)"),
    ("GNs", GNs, "giganewton second (cumulative load)"),
];

/// Value of a unit symbol in base units. Symbols are case sensitive.
pub fn lookup(symbol: &str) -> Option<f64> {
    UNITS
        .iter()
        .find(|(name, _, _)| *name == symbol)
        .map(|&(_, value, _)| value)
}

/// Parse a quantity such as `1kN`, `2.5 MN` or `1e3` into base units.
///
/// A number without a unit is taken to already be in base units.
pub fn parse_quantity(text: &str) -> Result<f64, String> {
    let text = text.trim();

    // The number ends at the first character that cannot be part of a
    // float. An exponent 'e' only counts when a digit or sign follows,
    // otherwise it would swallow the start of a unit name.
    let chars: Vec<char> = text.chars().collect();
    let mut split = 0;
    while split < chars.len() {
        let c = chars[split];
        let exponent = (c == 'e' || c == 'E')
            && split > 0
            && chars
                .get(split + 1)
                .map_or(false, |n| n.is_ascii_digit() || *n == '-' || *n == '+');
        let sign = (c == '-' || c == '+')
            && (split == 0 || chars[split - 1] == 'e' || chars[split - 1] == 'E');
        if c.is_ascii_digit() || c == '.' || exponent || sign {
            split += 1;
        } else {
            break;
        }
    }

    let number: String = chars[..split].iter().collect();
    let symbol: String = chars[split..].iter().collect();
    let symbol = symbol.trim();

    let value = number
        .parse::<f64>()
        .map_err(|_| format!("Could not read a number from the quantity '{}'", text))?;

    let value = if symbol.is_empty() {
        value
    } else {
        match lookup(symbol) {
            Some(unit) => value * unit,
            None => return Err(format!("Unknown unit '{}' in the quantity '{}'", symbol, text)),
        }
    };

    if !value.is_finite() {
        return Err(format!("The quantity '{}' is out of range", text));
    }
    Ok(value)
}
