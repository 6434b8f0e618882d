// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! sprintf-style interpolation of translated strings.
//!
//! Placeholder syntax:
//!
//! ```text
//! %[argnum$ | (name)][+][0 | 'c][-][width][.precision]type
//! ```
//!
//! Supported types are `b c d i e f o s u x X j`; `%%` is a literal percent.
//! Named placeholders read from the mapping in first argument position, and
//! a format may not mix named and positional placeholders.
//!
//! `b o x X` print the sign and magnitude of the truncated value, so `-255`
//! is `-ff`. Only `u` wraps to an unsigned 32-bit integer.

use serde_json::Value;

use crate::error::SprintfError;
use crate::request::InterpolationArgs;

/// Largest accepted width, and precision for `s`.
const MAX_WIDTH: usize = 1024;

/// Largest accepted precision for `e` and `f`.
const MAX_FLOAT_PRECISION: usize = 100;

/// Interpolate `args` into `format`.
pub fn sprintf(format: &str, args: &InterpolationArgs) -> Result<String, SprintfError> {
	format_values(format, &args.to_argv())
}

/// Interpolate a positional argument list into `format`.
pub fn format_values(format: &str, argv: &[Value]) -> Result<String, SprintfError> {
	let mut out = String::with_capacity(format.len());
	let mut cursor = 0usize;
	let mut uses_named = false;
	let mut uses_positional = false;

	let mut rest = format;
	while let Some(idx) = rest.find('%') {
		out.push_str(&rest[..idx]);
		let start = format.len() - rest.len() + idx;
		let tail = &rest[idx + 1..];

		if let Some(after) = tail.strip_prefix('%') {
			out.push('%');
			rest = after;
			continue;
		}

		let (placeholder, consumed) =
			Placeholder::parse(tail).ok_or(SprintfError::UnexpectedPlaceholder(start))?;
		rest = &tail[consumed..];

		let arg = match &placeholder.key {
			ArgKey::Named(path) => {
				uses_named = true;
				lookup_path(argv.first(), path)?
			}
			ArgKey::Index(n) => {
				uses_positional = true;
				argv.get(n - 1).ok_or(SprintfError::MissingArgument(*n))?
			}
			ArgKey::Next => {
				uses_positional = true;
				cursor += 1;
				argv.get(cursor - 1).ok_or(SprintfError::MissingArgument(cursor))?
			}
		};
		if uses_named && uses_positional {
			return Err(SprintfError::MixedPlaceholders);
		}

		out.push_str(&placeholder.render(arg)?);
	}
	out.push_str(rest);
	Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgKey {
	Next,
	Index(usize),
	Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
	key: ArgKey,
	plus: bool,
	pad: char,
	left_align: bool,
	width: Option<usize>,
	precision: Option<usize>,
	conversion: char,
}

impl Placeholder {
	/// Parse a placeholder following a `%`. Returns it and the number
	/// of bytes consumed.
	fn parse(input: &str) -> Option<(Self, usize)> {
		let bytes = input.as_bytes();
		let mut pos = 0;

		let mut key = ArgKey::Next;
		if bytes.first() == Some(&b'(') {
			let close = input.find(')')?;
			let name = &input[1..close];
			if name.is_empty() {
				return None;
			}
			key = ArgKey::Named(name.split('.').map(str::to_string).collect());
			pos = close + 1;
		} else {
			let digits = count_digits(&bytes[pos..]);
			if digits > 0 && bytes.get(pos + digits) == Some(&b'$') {
				let index: usize = input[pos..pos + digits].parse().ok()?;
				if index == 0 {
					return None;
				}
				key = ArgKey::Index(index);
				pos += digits + 1;
			}
		}

		let mut plus = false;
		if bytes.get(pos) == Some(&b'+') {
			plus = true;
			pos += 1;
		}

		let mut pad = ' ';
		match bytes.get(pos) {
			Some(b'0') => {
				pad = '0';
				pos += 1;
			}
			Some(b'\'') => {
				let c = input[pos + 1..].chars().next()?;
				pad = c;
				pos += 1 + c.len_utf8();
			}
			_ => {}
		}

		let mut left_align = false;
		if bytes.get(pos) == Some(&b'-') {
			left_align = true;
			pos += 1;
		}

		let digits = count_digits(&bytes[pos..]);
		let width = if digits > 0 {
			let width = input[pos..pos + digits].parse::<usize>().ok().filter(|w| *w <= MAX_WIDTH)?;
			pos += digits;
			Some(width)
		} else {
			None
		};

		let mut precision = None;
		if bytes.get(pos) == Some(&b'.') {
			let digits = count_digits(&bytes[pos + 1..]);
			if digits == 0 {
				return None;
			}
			let value = input[pos + 1..pos + 1 + digits].parse::<usize>().ok();
			precision = Some(value.filter(|p| *p <= MAX_WIDTH)?);
			pos += 1 + digits;
		}

		let conversion = input[pos..].chars().next()?;
		if !"bcdieofsuxXj".contains(conversion) {
			return None;
		}
		if matches!(conversion, 'e' | 'f') && precision.is_some_and(|p| p > MAX_FLOAT_PRECISION) {
			return None;
		}
		pos += conversion.len_utf8();

		Some((
			Self {
				key,
				plus,
				pad,
				left_align,
				width,
				precision,
				conversion,
			},
			pos,
		))
	}

	fn render(&self, arg: &Value) -> Result<String, SprintfError> {
		let numeric = matches!(
			self.conversion,
			'b' | 'c' | 'd' | 'i' | 'e' | 'f' | 'o' | 'u' | 'x' | 'X'
		);
		let number = if numeric {
			Some(to_number(arg).ok_or_else(|| SprintfError::ExpectingNumber {
				conversion: self.conversion,
				found: arg.to_string(),
			})?)
		} else {
			None
		};
		let n = number.unwrap_or_default();

		let body = match self.conversion {
			'b' | 'o' | 'x' | 'X' => signed_radix(n, self.conversion),
			'c' => char::from_u32(n.trunc() as u32).map(String::from).unwrap_or_default(),
			'd' | 'i' => format!("{}", n.trunc() as i64),
			'e' => match self.precision {
				Some(p) => js_exponent(format!("{n:.p$e}")),
				None => js_exponent(format!("{n:e}")),
			},
			'f' => match self.precision {
				Some(p) => format!("{n:.p$}"),
				None => js_number(n),
			},
			'u' => format!("{}", n.trunc() as i64 as u32),
			'j' => arg.to_string(),
			_ => {
				let text = to_display(arg);
				match self.precision {
					Some(p) => text.chars().take(p).collect(),
					None => text,
				}
			}
		};

		let negative = matches!(self.conversion, 'b' | 'd' | 'i' | 'e' | 'f' | 'o' | 'x' | 'X');
		let plus = matches!(self.conversion, 'd' | 'i' | 'e' | 'f');
		let (sign, body) = if negative && body.starts_with('-') {
			("-", body[1..].to_string())
		} else if plus && self.plus && n >= 0.0 {
			("+", body)
		} else {
			("", body)
		};

		let len = sign.chars().count() + body.chars().count();
		let pad_len = self.width.map_or(0, |w| w.saturating_sub(len));
		let padding: String = std::iter::repeat(self.pad).take(pad_len).collect();

		Ok(if self.left_align {
			format!("{sign}{body}{padding}")
		} else if self.pad == '0' {
			format!("{sign}{padding}{body}")
		} else {
			format!("{padding}{sign}{body}")
		})
	}
}

/// Render the truncated value in base 2, 8 or 16 with a leading `-` for
/// negatives. Magnitudes past `u64::MAX` saturate.
fn signed_radix(n: f64, conversion: char) -> String {
	let magnitude = n.trunc().abs() as u64;
	let digits = match conversion {
		'b' => format!("{magnitude:b}"),
		'o' => format!("{magnitude:o}"),
		'x' => format!("{magnitude:x}"),
		_ => format!("{magnitude:X}"),
	};
	if magnitude > 0 && n < 0.0 {
		format!("-{digits}")
	} else {
		digits
	}
}

fn count_digits(bytes: &[u8]) -> usize {
	bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn lookup_path<'a>(root: Option<&'a Value>, path: &[String]) -> Result<&'a Value, SprintfError> {
	let missing = || SprintfError::MissingProperty(path.join("."));
	let mut current = root.ok_or_else(missing)?;
	for segment in path {
		current = current.get(segment.as_str()).ok_or_else(missing)?;
	}
	Ok(current)
}

fn to_number(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
		_ => None,
	}
}

fn to_display(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Number(n) => match n.as_f64() {
			Some(f) if n.is_f64() => js_number(f),
			_ => n.to_string(),
		},
		other => other.to_string(),
	}
}

/// Render a float the way a JavaScript number prints: no trailing `.0`.
fn js_number(n: f64) -> String {
	if n.fract() == 0.0 && n.abs() < 1e21 {
		format!("{}", n as i64)
	} else {
		format!("{n}")
	}
}

/// Rust prints `1.5e2`; sprintf prints `1.5e+2`.
fn js_exponent(rendered: String) -> String {
	match rendered.split_once('e') {
		Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
		_ => rendered,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	fn fmt(format: &str, args: Value) -> Result<String, SprintfError> {
		sprintf(format, &InterpolationArgs::from_value(args))
	}

	#[test]
	fn test_named_string() {
		assert_eq!(fmt("foo %(test)s", json!({"test": "bar"})).unwrap(), "foo bar");
	}

	#[test]
	fn test_named_number() {
		assert_eq!(fmt("foo %(test)d", json!({"test": 1})).unwrap(), "foo 1");
	}

	#[test]
	fn test_named_float() {
		assert_eq!(fmt("foo %(test)f", json!({"test": 1.005})).unwrap(), "foo 1.005");
	}

	#[test]
	fn test_positional_array() {
		assert_eq!(
			fmt("test1 %1$s test3 %2$s", json!(["test2", "test4"])).unwrap(),
			"test1 test2 test3 test4"
		);
	}

	#[test]
	fn test_reordered_positional() {
		assert_eq!(fmt("%2$s %1$s", json!(["world", "hello"])).unwrap(), "hello world");
	}

	#[test]
	fn test_single_argument() {
		assert_eq!(fmt("test1 %s test3", json!("test2")).unwrap(), "test1 test2 test3");
	}

	#[test]
	fn test_sequential_arguments() {
		assert_eq!(fmt("%s and %s", json!(["a", "b"])).unwrap(), "a and b");
	}

	#[test]
	fn test_literal_percent() {
		assert_eq!(fmt("100%% of %d", json!(5)).unwrap(), "100% of 5");
	}

	#[test]
	fn test_no_placeholders() {
		assert_eq!(fmt("plain text", json!(["unused"])).unwrap(), "plain text");
	}

	#[test]
	fn test_nested_named_path() {
		assert_eq!(
			fmt("hi %(user.name)s", json!({"user": {"name": "Ada"}})).unwrap(),
			"hi Ada"
		);
	}

	#[test]
	fn test_precision_and_padding() {
		assert_eq!(fmt("%.2f", json!(3.14159)).unwrap(), "3.14");
		assert_eq!(fmt("%05d", json!(42)).unwrap(), "00042");
		assert_eq!(fmt("%5s|", json!("ab")).unwrap(), "   ab|");
		assert_eq!(fmt("%-5s|", json!("ab")).unwrap(), "ab   |");
		assert_eq!(fmt("%'*6s", json!("ab")).unwrap(), "****ab");
		assert_eq!(fmt("%.3s", json!("abcdef")).unwrap(), "abc");
	}

	#[test]
	fn test_signs() {
		assert_eq!(fmt("%+d", json!(5)).unwrap(), "+5");
		assert_eq!(fmt("%+d", json!(-5)).unwrap(), "-5");
		assert_eq!(fmt("%05d", json!(-42)).unwrap(), "-0042");
	}

	#[test]
	fn test_integer_conversions() {
		assert_eq!(fmt("%b", json!(5)).unwrap(), "101");
		assert_eq!(fmt("%o", json!(8)).unwrap(), "10");
		assert_eq!(fmt("%x %X", json!([255, 255])).unwrap(), "ff FF");
		assert_eq!(fmt("%c", json!(65)).unwrap(), "A");
		assert_eq!(fmt("%d", json!(7.9)).unwrap(), "7");
		assert_eq!(fmt("%d", json!("12")).unwrap(), "12");
	}

	#[test]
	fn test_negative_radix_conversions() {
		assert_eq!(fmt("%x", json!(-255)).unwrap(), "-ff");
		assert_eq!(fmt("%X", json!(4_294_967_551u64)).unwrap(), "1000000FF");
		assert_eq!(fmt("%o", json!(-8)).unwrap(), "-10");
		assert_eq!(fmt("%b", json!(-5)).unwrap(), "-101");
		assert_eq!(fmt("%x", json!(-0.5)).unwrap(), "0");
		assert_eq!(fmt("%05x", json!(-255)).unwrap(), "-00ff");
		assert_eq!(fmt("%+x", json!(255)).unwrap(), "ff");
	}

	#[test]
	fn test_unsigned_wraps() {
		assert_eq!(fmt("%u", json!(-1)).unwrap(), "4294967295");
		assert_eq!(fmt("%u", json!(4_294_967_297u64)).unwrap(), "1");
	}

	#[test]
	fn test_field_limits() {
		assert_eq!(
			fmt("%99999999999s", json!("x")).unwrap_err(),
			SprintfError::UnexpectedPlaceholder(0)
		);
		assert_eq!(
			fmt("pad %1025d", json!(1)).unwrap_err(),
			SprintfError::UnexpectedPlaceholder(4)
		);
		assert_eq!(
			fmt("%.5000f", json!(1.5)).unwrap_err(),
			SprintfError::UnexpectedPlaceholder(0)
		);
		assert!(fmt("%.101e", json!(1.5)).is_err());

		assert_eq!(fmt("%1024s", json!("x")).unwrap().len(), 1024);
		assert_eq!(fmt("%.100f", json!(0.5)).unwrap().len(), 102);
		assert_eq!(fmt("%.1024s", json!("abc")).unwrap(), "abc");
	}

	#[test]
	fn test_exponent() {
		assert_eq!(fmt("%.1e", json!(150)).unwrap(), "1.5e+2");
	}

	#[test]
	fn test_json_conversion() {
		assert_eq!(fmt("%j", json!([[1, 2]])).unwrap(), "[1,2]");
	}

	#[test]
	fn test_missing_argument() {
		assert_eq!(
			fmt("%s %s", json!(["only"])).unwrap_err(),
			SprintfError::MissingArgument(2)
		);
	}

	#[test]
	fn test_missing_property() {
		assert_eq!(
			fmt("%(nope)s", json!({"test": 1})).unwrap_err(),
			SprintfError::MissingProperty("nope".to_string())
		);
	}

	#[test]
	fn test_not_a_number() {
		assert!(matches!(
			fmt("%d", json!("many")).unwrap_err(),
			SprintfError::ExpectingNumber { conversion: 'd', .. }
		));
	}

	#[test]
	fn test_mixed_placeholders() {
		assert_eq!(
			fmt("%(a)s %s", json!({"a": 1})).unwrap_err(),
			SprintfError::MixedPlaceholders
		);
	}

	#[test]
	fn test_malformed_placeholder() {
		assert_eq!(
			fmt("50% off", json!("x")).unwrap_err(),
			SprintfError::UnexpectedPlaceholder(2)
		);
		assert!(fmt("trailing %", json!("x")).is_err());
	}

	proptest! {
		/// Text without a percent sign passes through untouched.
		#[test]
		fn percent_free_text_is_unchanged(text in "[^%]*") {
			prop_assert_eq!(fmt(&text, json!(["x"])).unwrap(), text);
		}
	}
}
