// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale-style number rendering.

use serde::{Deserialize, Serialize};

/// Decimal places beyond this are clamped; `f64` carries no more precision.
pub const MAX_DECIMALS: usize = 20;

/// 2^53. Scaled magnitudes at or above this are rounded from the exact decimal
/// expansion instead of in floating point.
const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Overrides for [`I18n::number_format_with`](crate::I18n::number_format_with).
///
/// Omitted fields fall back to the active locale's settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormatOptions {
	pub decimals: Option<usize>,
	pub dec_point: Option<String>,
	pub thousands_sep: Option<String>,
}

impl NumberFormatOptions {
	pub fn with_decimals(decimals: usize) -> Self {
		Self {
			decimals: Some(decimals),
			..Self::default()
		}
	}

	pub fn dec_point(mut self, dec_point: impl Into<String>) -> Self {
		self.dec_point = Some(dec_point.into());
		self
	}

	pub fn thousands_sep(mut self, thousands_sep: impl Into<String>) -> Self {
		self.thousands_sep = Some(thousands_sep.into());
		self
	}
}

impl From<usize> for NumberFormatOptions {
	fn from(decimals: usize) -> Self {
		Self::with_decimals(decimals)
	}
}

/// Render `value` rounded half-up to `decimals` places, grouping the integer
/// part in threes with `thousands_sep`.
///
/// Non-finite values render as zero. Ties round towards positive infinity,
/// so `-0.5` becomes `0` and `-1.25` at one place becomes `-1.2`.
pub fn format_number(
	value: f64,
	decimals: usize,
	dec_point: &str,
	thousands_sep: &str,
) -> String {
	let decimals = decimals.min(MAX_DECIMALS);
	let value = if value.is_finite() { value } else { 0.0 };

	let scaled = value * 10f64.powi(decimals as i32);
	let (negative, mut digits) = if scaled.abs() < EXACT_LIMIT {
		let rounded = (scaled + 0.5).floor();
		(rounded < 0.0, format!("{:.0}", rounded.abs()))
	} else {
		let negative = value < 0.0;
		(negative, round_decimal(value.abs(), decimals, negative))
	};
	if digits.len() <= decimals {
		digits = format!("{digits:0>width$}", width = decimals + 1);
	}

	let (int_part, frac_part) = digits.split_at(digits.len() - decimals);

	let capacity = digits.len() + int_part.len() / 3 * thousands_sep.len() + 2;
	let mut out = String::with_capacity(capacity);
	if negative {
		out.push('-');
	}
	for (i, c) in int_part.chars().enumerate() {
		if i > 0 && (int_part.len() - i) % 3 == 0 {
			out.push_str(thousands_sep);
		}
		out.push(c);
	}
	if decimals > 0 {
		out.push_str(dec_point);
		out.push_str(frac_part);
	}
	out
}

/// Round a non-negative magnitude to `decimals` places from its decimal
/// expansion and return the digits with the point removed.
///
/// Only used past [`EXACT_LIMIT`], where the value has at most `4 * decimals`
/// fractional bits, so the expansion below is exact.
fn round_decimal(magnitude: f64, decimals: usize, negative: bool) -> String {
	let expansion = format!("{:.*}", decimals * 4 + 4, magnitude);
	let (int_part, frac_part) = expansion.split_once('.').unwrap_or((expansion.as_str(), ""));
	let (kept, rest) = frac_part.split_at(decimals.min(frac_part.len()));

	let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
	let round_up = match rest.as_bytes().split_first() {
		// An exact tie moves a negative value towards zero.
		Some((&first, tail)) if negative => {
			first > b'5' || (first == b'5' && tail.iter().any(|&d| d != b'0'))
		}
		Some((&first, _)) => first >= b'5',
		None => false,
	};

	let mut carry = round_up;
	for digit in digits.iter_mut().rev() {
		if !carry {
			break;
		}
		if *digit == b'9' {
			*digit = b'0';
		} else {
			*digit += 1;
			carry = false;
		}
	}
	if carry {
		digits.insert(0, b'1');
	}
	digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_rounds_to_integer() {
		assert_eq!(format_number(150.15, 0, ".", ","), "150");
		assert_eq!(format_number(150.5, 0, ".", ","), "151");
	}

	#[test]
	fn test_groups_thousands() {
		assert_eq!(format_number(1500.0, 0, ",", "."), "1.500");
		assert_eq!(format_number(1234567.0, 0, ".", ","), "1,234,567");
		assert_eq!(format_number(999.0, 0, ".", ","), "999");
	}

	#[test]
	fn test_decimals() {
		assert_eq!(format_number(150.0, 2, ",", "."), "150,00");
		assert_eq!(format_number(150.312, 2, ",", "."), "150,31");
		assert_eq!(format_number(2500.33, 3, "@", "*"), "2*500@330");
		assert_eq!(format_number(0.05, 3, ".", ","), "0.050");
	}

	#[test]
	fn test_small_and_negative_values() {
		assert_eq!(format_number(0.004, 2, ".", ","), "0.00");
		assert_eq!(format_number(-1234.5, 1, ".", ","), "-1,234.5");
		assert_eq!(format_number(-0.2, 0, ".", ","), "0");
	}

	#[test]
	fn test_non_finite() {
		assert_eq!(format_number(f64::NAN, 2, ".", ","), "0.00");
		assert_eq!(format_number(f64::INFINITY, 0, ".", ","), "0");
	}

	#[test]
	fn test_huge_values_stay_finite() {
		let formatted = format_number(1e306, 3, ".", ",");
		assert!(formatted.starts_with("1,000,000,000,000,000,017,216,064,596,73"));
		assert!(formatted.ends_with(".000"));
		assert!(!formatted.contains("inf"));
		assert_eq!(formatted.matches(',').count(), 102);

		assert_eq!(format_number(f64::MAX, 0, ".", "").len(), 309);
	}

	#[test]
	fn test_rounds_beyond_float_precision() {
		// 2^50 + 0.25 is exact, but scaled by 10 it is past 2^53.
		let value = 1_125_899_906_842_624.25;
		assert_eq!(format_number(value, 1, ".", ","), "1,125,899,906,842,624.3");
		assert_eq!(format_number(-value, 1, ".", ","), "-1,125,899,906,842,624.2");
		assert_eq!(format_number(-value, 2, ".", ","), "-1,125,899,906,842,624.25");
		assert_eq!(
			format_number(9_007_199_254_740_992.0, 1, ".", ","),
			"9,007,199,254,740,992.0"
		);
		assert_eq!(
			format_number(99_999_999_999_999_984.0, 0, ".", ","),
			"99,999,999,999,999,984"
		);
	}

	#[test]
	fn test_options_from_json() {
		let json = r#"{"decimals": 3, "thousandsSep": "*", "decPoint": "@"}"#;
		let options: NumberFormatOptions = serde_json::from_str(json).unwrap();
		assert_eq!(
			options,
			NumberFormatOptions::with_decimals(3).dec_point("@").thousands_sep("*")
		);
	}

	proptest! {
		/// Removing the separators gives back the plain integer.
		#[test]
		fn grouping_preserves_digits(n in 0u64..1_000_000_000_000) {
			let formatted = format_number(n as f64, 0, ".", "'");
			prop_assert_eq!(formatted.replace('\'', ""), n.to_string());
		}

		/// Every group after the first has exactly three digits.
		#[test]
		fn groups_have_three_digits(n in 1_000u64..1_000_000_000_000) {
			let formatted = format_number(n as f64, 0, ".", ",");
			let groups: Vec<&str> = formatted.split(',').collect();
			prop_assert!(groups[0].len() <= 3);
			for group in &groups[1..] {
				prop_assert_eq!(group.len(), 3);
			}
		}
	}
}
