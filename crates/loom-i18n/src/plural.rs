// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! gettext `Plural-Forms` rules.
//!
//! The expression language is the C subset gettext uses: `n`, integer
//! literals, `!`, `%`, comparisons, `&&`, `||`, `?:` and parentheses, with C
//! operator precedence. The gettext catalog parser splits on operators
//! without regard to precedence, so rules are handed to it fully
//! parenthesized via [`PluralRule::to_header`].

use std::fmt;

use winnow::ascii::{digit1, space0};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::literal;

use crate::error::PluralFormsError;

type PResult<O> = Result<O, ContextError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Or,
	And,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	Rem,
}

impl BinaryOp {
	fn symbol(self) -> &'static str {
		match self {
			Self::Or => "||",
			Self::And => "&&",
			Self::Eq => "==",
			Self::Ne => "!=",
			Self::Lt => "<",
			Self::Le => "<=",
			Self::Gt => ">",
			Self::Ge => ">=",
			Self::Rem => "%",
		}
	}

	fn apply(self, left: u64, right: u64) -> u64 {
		match self {
			Self::Or => u64::from(left != 0 || right != 0),
			Self::And => u64::from(left != 0 && right != 0),
			Self::Eq => u64::from(left == right),
			Self::Ne => u64::from(left != right),
			Self::Lt => u64::from(left < right),
			Self::Le => u64::from(left <= right),
			Self::Gt => u64::from(left > right),
			Self::Ge => u64::from(left >= right),
			Self::Rem => left.checked_rem(right).unwrap_or(0),
		}
	}
}

/// Parsed plural expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluralExpr {
	N,
	Int(u64),
	Not(Box<PluralExpr>),
	Binary {
		op: BinaryOp,
		left: Box<PluralExpr>,
		right: Box<PluralExpr>,
	},
	Ternary {
		condition: Box<PluralExpr>,
		then: Box<PluralExpr>,
		otherwise: Box<PluralExpr>,
	},
}

impl PluralExpr {
	pub fn parse(source: &str) -> Result<Self, PluralFormsError> {
		let source = source.trim();
		let expr = ternary
			.parse(source)
			.map_err(|e| PluralFormsError::Syntax {
				expression: source.to_string(),
				offset: e.offset(),
			})?;
		expr.check_modulus()?;
		Ok(expr)
	}

	/// Evaluate for `n`; booleans are `0`/`1`.
	pub fn eval(&self, n: u64) -> u64 {
		match self {
			Self::N => n,
			Self::Int(value) => *value,
			Self::Not(inner) => u64::from(inner.eval(n) == 0),
			Self::Binary { op, left, right } => op.apply(left.eval(n), right.eval(n)),
			Self::Ternary {
				condition,
				then,
				otherwise,
			} => {
				if condition.eval(n) != 0 {
					then.eval(n)
				} else {
					otherwise.eval(n)
				}
			}
		}
	}

	// A zero divisor panics inside the gettext evaluator.
	fn check_modulus(&self) -> Result<(), PluralFormsError> {
		match self {
			Self::N | Self::Int(_) => Ok(()),
			Self::Not(inner) => inner.check_modulus(),
			Self::Binary { op, left, right } => {
				if *op == BinaryOp::Rem && !matches!(**right, Self::Int(d) if d > 0) {
					return Err(PluralFormsError::InvalidModulus);
				}
				left.check_modulus()?;
				right.check_modulus()
			}
			Self::Ternary {
				condition,
				then,
				otherwise,
			} => {
				condition.check_modulus()?;
				then.check_modulus()?;
				otherwise.check_modulus()
			}
		}
	}

	fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
		Self::Binary {
			op,
			left: Box::new(left),
			right: Box::new(right),
		}
	}
}

/// Renders with every compound operand parenthesized.
impl fmt::Display for PluralExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::N => f.write_str("n"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Not(inner) => write!(f, "!{}", Grouped(inner)),
			Self::Binary { op, left, right } => {
				write!(f, "{} {} {}", Grouped(left), op.symbol(), Grouped(right))
			}
			Self::Ternary {
				condition,
				then,
				otherwise,
			} => write!(
				f,
				"{} ? {} : {}",
				Grouped(condition),
				Grouped(then),
				Grouped(otherwise)
			),
		}
	}
}

struct Grouped<'a>(&'a PluralExpr);

impl fmt::Display for Grouped<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			PluralExpr::N | PluralExpr::Int(_) => write!(f, "{}", self.0),
			compound => write!(f, "({compound})"),
		}
	}
}

/// A locale's plural rule: form count and selection expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
	nplurals: Option<usize>,
	expr: PluralExpr,
}

impl PluralRule {
	/// Parse a `Plural-Forms` value such as `nplurals=2; plural=(n != 1);`.
	pub fn parse(header: &str) -> Result<Self, PluralFormsError> {
		let mut nplurals = None;
		let mut expr = None;

		for part in header.split(';') {
			let Some((name, value)) = part.split_once('=') else {
				continue;
			};
			match name.trim() {
				"nplurals" => {
					let count = value
						.trim()
						.parse::<usize>()
						.map_err(|_| PluralFormsError::InvalidCount(value.trim().to_string()))?;
					nplurals = Some(count);
				}
				"plural" => expr = Some(PluralExpr::parse(value)?),
				_ => {}
			}
		}

		Ok(Self {
			nplurals,
			expr: expr.ok_or(PluralFormsError::MissingExpression)?,
		})
	}

	pub fn nplurals(&self) -> Option<usize> {
		self.nplurals
	}

	pub fn expr(&self) -> &PluralExpr {
		&self.expr
	}

	/// Index of the plural form used for `n`.
	pub fn form(&self, n: u64) -> usize {
		usize::try_from(self.expr.eval(n)).unwrap_or(usize::MAX)
	}

	/// The rule as a `Plural-Forms` value the gettext parser evaluates
	/// correctly.
	pub fn to_header(&self) -> String {
		match self.nplurals {
			Some(count) => format!("nplurals={count}; plural={};", self.expr),
			None => format!("plural={};", self.expr),
		}
	}
}

impl Default for PluralRule {
	/// Germanic default: singular for one, plural otherwise.
	fn default() -> Self {
		Self {
			nplurals: Some(2),
			expr: PluralExpr::binary(BinaryOp::Ne, PluralExpr::N, PluralExpr::Int(1)),
		}
	}
}

fn skip_space(input: &mut &str) {
	let _: PResult<&str> = space0.parse_next(input);
}

/// Consume `symbol` after optional whitespace; the input is untouched on a
/// mismatch.
fn eat(input: &mut &str, symbol: &'static str) -> bool {
	let checkpoint = *input;
	skip_space(input);
	let matched: PResult<&str> = literal(symbol).parse_next(input);
	if matched.is_err() {
		*input = checkpoint;
	}
	matched.is_ok()
}

fn expect(input: &mut &str, symbol: &'static str) -> PResult<()> {
	skip_space(input);
	let matched: PResult<&str> = literal(symbol).parse_next(input);
	matched.map(|_| ())
}

fn ternary(input: &mut &str) -> PResult<PluralExpr> {
	let condition = logical_or(input)?;
	if !eat(input, "?") {
		return Ok(condition);
	}
	let then = ternary(input)?;
	expect(input, ":")?;
	let otherwise = ternary(input)?;
	Ok(PluralExpr::Ternary {
		condition: Box::new(condition),
		then: Box::new(then),
		otherwise: Box::new(otherwise),
	})
}

/// Left-associative run of `operand (op operand)*`. Longer symbols must come
/// first in `ops`.
fn binary_level(
	input: &mut &str,
	ops: &[(&'static str, BinaryOp)],
	operand: fn(&mut &str) -> PResult<PluralExpr>,
) -> PResult<PluralExpr> {
	let mut left = operand(input)?;
	'next: loop {
		for &(symbol, op) in ops {
			if eat(input, symbol) {
				let right = operand(input)?;
				left = PluralExpr::binary(op, left, right);
				continue 'next;
			}
		}
		return Ok(left);
	}
}

fn logical_or(input: &mut &str) -> PResult<PluralExpr> {
	binary_level(input, &[("||", BinaryOp::Or)], logical_and)
}

fn logical_and(input: &mut &str) -> PResult<PluralExpr> {
	binary_level(input, &[("&&", BinaryOp::And)], equality)
}

fn equality(input: &mut &str) -> PResult<PluralExpr> {
	binary_level(
		input,
		&[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)],
		relational,
	)
}

fn relational(input: &mut &str) -> PResult<PluralExpr> {
	binary_level(
		input,
		&[
			("<=", BinaryOp::Le),
			(">=", BinaryOp::Ge),
			("<", BinaryOp::Lt),
			(">", BinaryOp::Gt),
		],
		remainder,
	)
}

fn remainder(input: &mut &str) -> PResult<PluralExpr> {
	binary_level(input, &[("%", BinaryOp::Rem)], unary)
}

fn unary(input: &mut &str) -> PResult<PluralExpr> {
	if eat(input, "!") {
		return Ok(PluralExpr::Not(Box::new(unary(input)?)));
	}
	primary(input)
}

fn primary(input: &mut &str) -> PResult<PluralExpr> {
	if eat(input, "(") {
		let inner = ternary(input)?;
		expect(input, ")")?;
		return Ok(inner);
	}
	if eat(input, "n") {
		return Ok(PluralExpr::N);
	}

	skip_space(input);
	let digits: PResult<&str> = digit1.parse_next(input);
	digits?
		.parse::<u64>()
		.map(PluralExpr::Int)
		.map_err(|_| ContextError::new())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const POLISH: &str =
		"nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";

	const RUSSIAN: &str = "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : \
		n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";

	fn polish_form(n: u64) -> usize {
		if n == 1 {
			0
		} else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
			1
		} else {
			2
		}
	}

	fn russian_form(n: u64) -> usize {
		if n % 10 == 1 && n % 100 != 11 {
			0
		} else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
			1
		} else {
			2
		}
	}

	#[test]
	fn test_default_rule() {
		let rule = PluralRule::default();
		assert_eq!(rule.form(1), 0);
		assert_eq!(rule.form(0), 1);
		assert_eq!(rule.form(7), 1);
		assert_eq!(rule.to_header(), "nplurals=2; plural=n != 1;");
	}

	#[test]
	fn test_precedence() {
		let rule = PluralRule::parse(POLISH).unwrap();
		assert_eq!(rule.nplurals(), Some(3));
		assert_eq!(rule.form(1), 0);
		assert_eq!(rule.form(3), 1);
		assert_eq!(rule.form(5), 2);
		assert_eq!(rule.form(22), 1);
		assert_eq!(rule.form(12), 2);
	}

	#[test]
	fn test_renders_fully_grouped() {
		let expr = PluralExpr::parse("n%10==1 && n%100!=11 ? 0 : 1").unwrap();
		assert_eq!(
			expr.to_string(),
			"(((n % 10) == 1) && ((n % 100) != 11)) ? 0 : 1"
		);
	}

	#[test]
	fn test_rendering_reparses_to_same_tree() {
		let rule = PluralRule::parse(RUSSIAN).unwrap();
		let reparsed = PluralExpr::parse(&rule.expr().to_string()).unwrap();
		assert_eq!(&reparsed, rule.expr());
	}

	#[test]
	fn test_not_and_single_form() {
		assert_eq!(PluralExpr::parse("!(n == 1)").unwrap().eval(1), 0);
		assert_eq!(PluralExpr::parse("!n").unwrap().eval(0), 1);

		let rule = PluralRule::parse("nplurals=1; plural=0;").unwrap();
		assert_eq!(rule.form(42), 0);
	}

	#[test]
	fn test_rejects_bad_rules() {
		assert_eq!(
			PluralRule::parse("nplurals=2;"),
			Err(PluralFormsError::MissingExpression)
		);
		assert!(matches!(
			PluralRule::parse("nplurals=two; plural=n != 1;"),
			Err(PluralFormsError::InvalidCount(_))
		));
		assert!(matches!(
			PluralRule::parse("plural=n +;"),
			Err(PluralFormsError::Syntax { .. })
		));
		assert!(matches!(
			PluralRule::parse("plural=(n != 1;"),
			Err(PluralFormsError::Syntax { .. })
		));
		assert_eq!(
			PluralRule::parse("plural=n % 0;"),
			Err(PluralFormsError::InvalidModulus)
		);
		assert_eq!(
			PluralRule::parse("plural=n % n;"),
			Err(PluralFormsError::InvalidModulus)
		);
	}

	proptest! {
		#[test]
		fn polish_matches_reference(n in 0u64..100_000) {
			let rule = PluralRule::parse(POLISH).unwrap();
			prop_assert_eq!(rule.form(n), polish_form(n));
		}

		#[test]
		fn russian_matches_reference(n in 0u64..100_000) {
			let rule = PluralRule::parse(RUSSIAN).unwrap();
			prop_assert_eq!(rule.form(n), russian_form(n));
		}
	}
}
