//! Conversions between strength (bits of entropy) and length (output units).
//!
//! A generator exposes the entropy of one output unit (a character or a
//! word). Everything else derives from it:
//! - strength → iterations: `ceil(bits / per_unit)`, at least 1
//! - iterations → achieved strength: `iterations * per_unit`
//!
//! Rounding is always up, so a password never carries less entropy than asked.
//!
//! Targets are bounded by `MAX_LENGTH` and `MAX_STRENGTH_BITS`, and no
//! generator draws more than `MAX_LENGTH` units for one password.

use serde::{Deserialize, Serialize};

use crate::error::{PwgenError, Result};

/// Bits of entropy in one strength level.
pub const ENTROPY_PER_LEVEL: u32 = 32;

/// Longest password that can be requested, in characters.
pub const MAX_LENGTH: usize = 4096;

/// Strongest password that can be requested, in bits (128 levels).
pub const MAX_STRENGTH_BITS: f64 = 4096.0;

/// At or below this many bits a password is weak.
pub const STRENGTH_WEAK: f64 = 64.0;

/// At or above this many bits a password is strong.
pub const STRENGTH_STRONG: f64 = 96.0;

/// What the caller asks a generator for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum Target {
	/// Minimum entropy in bits, in `(0, MAX_STRENGTH_BITS]`.
	Strength(f64),
	/// Output length in characters, at most `MAX_LENGTH`. Zero yields an empty password.
	Length(usize),
}

impl Target {
	/// Creates a strength target.
	///
	/// # Errors
	/// `InvalidTarget` if `bits` is not positive, not finite or above `MAX_STRENGTH_BITS`.
	pub fn strength(bits: f64) -> Result<Self> {
		let target = Target::Strength(bits);
		target.check()?;
		Ok(target)
	}

	/// Creates a length target.
	///
	/// # Errors
	/// `InvalidTarget` if `units` is above `MAX_LENGTH`.
	pub fn length(units: usize) -> Result<Self> {
		let target = Target::Length(units);
		target.check()?;
		Ok(target)
	}

	/// Builds a target from optional parts. Exactly one must be supplied.
	pub fn from_parts(strength: Option<f64>, length: Option<usize>) -> Result<Self> {
		match (strength, length) {
			(Some(bits), None) => Target::strength(bits),
			(None, Some(units)) => Target::length(units),
			(Some(_), Some(_)) => Err(PwgenError::InvalidTarget("supply either a strength or a length, not both".to_owned())),
			(None, None) => Err(PwgenError::InvalidTarget("a strength or a length is required".to_owned())),
		}
	}

	/// Checks the target against its bounds.
	///
	/// The variants are public, so generators call this again before drawing.
	pub fn check(&self) -> Result<()> {
		match *self {
			Target::Strength(bits) if !bits.is_finite() || bits <= 0.0 => {
				Err(PwgenError::InvalidTarget(format!("strength must be a positive number of bits, got {bits}")))
			}
			Target::Strength(bits) if bits > MAX_STRENGTH_BITS => {
				Err(PwgenError::InvalidTarget(format!("strength {bits} exceeds {MAX_STRENGTH_BITS} bits")))
			}
			Target::Length(units) if units > MAX_LENGTH => {
				Err(PwgenError::InvalidTarget(format!("length {units} exceeds {MAX_LENGTH} characters")))
			}
			_ => Ok(()),
		}
	}

	/// Number of units to draw for this target, given per-unit entropy.
	///
	/// Length targets map one-to-one onto units; only meaningful for
	/// character generators.
	///
	/// # Errors
	/// `InvalidTarget` if the target is out of bounds or would need more than
	/// `MAX_LENGTH` units (a generator with a tiny per-unit entropy).
	pub fn iterations(&self, per_unit_entropy: f64) -> Result<usize> {
		self.check()?;
		let iterations = match *self {
			Target::Strength(bits) => iterations_for(bits, per_unit_entropy)?,
			Target::Length(units) => units,
		};
		if iterations > MAX_LENGTH {
			return Err(PwgenError::InvalidTarget(format!("{iterations} units needed, at most {MAX_LENGTH} allowed")));
		}
		Ok(iterations)
	}
}

/// Rating of a password's entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
	/// `STRENGTH_WEAK` bits or less.
	Weak,
	Okay,
	/// `STRENGTH_STRONG` bits or more.
	Strong,
}

impl Strength {
	pub fn of(entropy: f64) -> Self {
		if entropy <= STRENGTH_WEAK {
			Strength::Weak
		} else if entropy >= STRENGTH_STRONG {
			Strength::Strong
		} else {
			Strength::Okay
		}
	}
}

/// Strength levels reached by `entropy`: whole levels and extra quarter levels (0 to 3).
///
/// `80` bits → `(2, 2)`: two levels and a half.
pub fn levels(entropy: f64) -> (u32, u8) {
	if !entropy.is_finite() || entropy <= 0.0 {
		return (0, 0);
	}
	let levels = entropy / ENTROPY_PER_LEVEL as f64;
	let whole = levels.floor();
	let quarters = ((levels - whole) * 4.0).floor() as u8;
	(whole as u32, quarters.min(3))
}

/// Number of units needed to reach `strength_bits`.
///
/// # Errors
/// - `InvalidTarget` if `per_unit_entropy` is not positive (empty or single-entry alphabet)
/// - `InvalidTarget` if `strength_bits` is not positive
pub fn iterations_for(strength_bits: f64, per_unit_entropy: f64) -> Result<usize> {
	if !per_unit_entropy.is_finite() || per_unit_entropy <= 0.0 {
		return Err(PwgenError::InvalidTarget(format!("per-unit entropy must be positive, got {per_unit_entropy}")));
	}
	if !strength_bits.is_finite() || strength_bits <= 0.0 {
		return Err(PwgenError::InvalidTarget(format!("strength must be positive, got {strength_bits}")));
	}
	let mut iterations = ((strength_bits / per_unit_entropy).ceil() as usize).max(1);
	// the division may round down by one ulp
	if entropy_for(iterations, per_unit_entropy) < strength_bits {
		iterations += 1;
	}
	Ok(iterations)
}

/// Entropy achieved by drawing `iterations` units.
pub fn entropy_for(iterations: usize, per_unit_entropy: f64) -> f64 {
	iterations as f64 * per_unit_entropy
}

/// Entropy of one uniform choice among `size` options.
pub fn entropy_of_choice(size: usize) -> f64 {
	if size == 0 {
		return 0.0;
	}
	(size as f64).log2()
}

/// Parses a strength value.
///
/// - `"96b"` → 96 bits
/// - `"3"` → 3 levels → 96 bits
/// - `""` → `None` (caller falls back to its default)
///
/// # Errors
/// `InvalidTarget` on anything non-numeric or non-positive.
pub fn parse_strength(value: &str) -> Result<Option<f64>> {
	let value = value.trim();
	if value.is_empty() {
		return Ok(None);
	}

	let (number, is_bits) = match value.strip_suffix('b') {
		Some(bits) => (bits.trim(), true),
		None => (value, false),
	};
	let n: u32 = number
		.parse()
		.map_err(|_| PwgenError::InvalidTarget(format!("`{value}` is not a number")))?;
	if n == 0 {
		return Err(PwgenError::InvalidTarget(format!("`{value}` is not a positive strength")));
	}

	let bits = if is_bits { n as f64 } else { n as f64 * ENTROPY_PER_LEVEL as f64 };
	if bits > MAX_STRENGTH_BITS {
		return Err(PwgenError::InvalidTarget(format!("`{value}` exceeds {MAX_STRENGTH_BITS} bits")));
	}
	Ok(Some(bits))
}

/// Parses a length value. `""` → `None`.
///
/// # Errors
/// `InvalidTarget` on anything non-numeric or above `MAX_LENGTH`.
pub fn parse_length(value: &str) -> Result<Option<usize>> {
	let value = value.trim();
	if value.is_empty() {
		return Ok(None);
	}
	if !value.chars().all(|c| c.is_ascii_digit()) {
		return Err(PwgenError::InvalidTarget(format!("`{value}` is not a number")));
	}
	let too_large = || PwgenError::InvalidTarget(format!("`{value}` exceeds {MAX_LENGTH} characters"));
	let length: usize = value.parse().map_err(|_| too_large())?;
	if length > MAX_LENGTH {
		return Err(too_large());
	}
	Ok(Some(length))
}
