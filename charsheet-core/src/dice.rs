//! Dice formula parsing and evaluation.
//!
//! Supports free-form additive dice notation: `2d6 + 1d8 + 3`, with
//! advantage and disadvantage evaluated as two full passes over the
//! whole formula.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advantage state for a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Suffix appended to a roll label, e.g. `"Athletics (Adv)"`.
    pub fn label_suffix(&self) -> &'static str {
        match self {
            Advantage::Normal => "",
            Advantage::Advantage => " (Adv)",
            Advantage::Disadvantage => " (Dis)",
        }
    }
}

/// A single signed term of a dice formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// A dice group: `2d6` rolls two six-sided dice.
    Dice { sign: i32, count: u32, sides: u32 },
    /// A flat integer modifier.
    Flat { sign: i32, value: i32 },
}

/// A parsed dice formula: an ordered list of signed terms.
///
/// Parsing is deliberately permissive. The formula is scanned left to
/// right for fragments shaped like `<sign><count>d<sides>` or
/// `<sign><integer>`; anything that matches neither is skipped without
/// error. There is no precedence beyond left-to-right accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceFormula {
    pub terms: Vec<Term>,
}

impl DiceFormula {
    /// Parse a formula string. Never fails; unrecognized fragments are
    /// dropped from the term list.
    pub fn parse(formula: &str) -> Self {
        let chars: Vec<char> = formula
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let mut terms = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let mut j = i;
            let mut sign: i32 = 1;
            if chars[j] == '+' || chars[j] == '-' {
                if chars[j] == '-' {
                    sign = -1;
                }
                j += 1;
            }

            let digits_start = j;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j == digits_start {
                // No digits where a term would need them; skip one
                // character and rescan.
                i += 1;
                continue;
            }
            let leading: String = chars[digits_start..j].iter().collect();

            if j < chars.len() && chars[j] == 'd' {
                let sides_start = j + 1;
                let mut k = sides_start;
                while k < chars.len() && chars[k].is_ascii_digit() {
                    k += 1;
                }
                if k > sides_start {
                    let sides_str: String = chars[sides_start..k].iter().collect();
                    if let (Ok(count), Ok(sides)) =
                        (leading.parse::<u32>(), sides_str.parse::<u32>())
                    {
                        terms.push(Term::Dice { sign, count, sides });
                    }
                    i = k;
                    continue;
                }
            }

            if let Ok(value) = leading.parse::<i32>() {
                terms.push(Term::Flat { sign, value });
            }
            i = j;
        }

        DiceFormula { terms }
    }

    /// Evaluate once with the thread-local RNG.
    pub fn roll(&self) -> RollOutcome {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Evaluate once with a specific RNG (useful for testing).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> RollOutcome {
        let mut total: i32 = 0;
        let mut parts: Vec<String> = Vec::new();
        let mut dice_type: Option<String> = None;

        for term in &self.terms {
            match *term {
                Term::Dice { sign, count, sides } => {
                    dice_type = Some(format!("d{sides}"));
                    // A zero-sided die rolls as d1.
                    let faces = sides.clamp(1, i32::MAX as u32);
                    let rolls: Vec<i32> =
                        (0..count).map(|_| rng.gen_range(1..=faces as i32)).collect();
                    let sum: i32 = rolls.iter().sum();
                    total += sign * sum;

                    let rendered = if count > 1 {
                        let joined = rolls
                            .iter()
                            .map(|r| r.to_string())
                            .collect::<Vec<_>>()
                            .join(" + ");
                        format!("({joined})")
                    } else {
                        rolls.first().copied().unwrap_or(0).to_string()
                    };
                    parts.push(format!("{} {rendered}", sign_marker(sign)));
                }
                Term::Flat { sign, value } => {
                    total += sign * value;
                    parts.push(format!("{} {value}", sign_marker(sign)));
                }
            }
        }

        let joined = parts.join(" ");
        let details = joined.strip_prefix("+ ").unwrap_or(&joined).to_string();

        RollOutcome {
            total,
            details,
            dice_type: dice_type.unwrap_or_else(|| "d20".to_string()),
        }
    }

    /// Evaluate under an advantage mode with the thread-local RNG.
    pub fn evaluate(&self, mode: Advantage) -> RollOutcome {
        self.evaluate_with_rng(mode, &mut rand::thread_rng())
    }

    /// Evaluate under an advantage mode with a specific RNG.
    ///
    /// Advantage and disadvantage evaluate the entire formula twice,
    /// independently, then keep the higher or lower total. Ties keep
    /// the first pass.
    pub fn evaluate_with_rng<R: Rng>(&self, mode: Advantage, rng: &mut R) -> RollOutcome {
        match mode {
            Advantage::Normal => self.roll_with_rng(rng),
            Advantage::Advantage | Advantage::Disadvantage => {
                let first = self.roll_with_rng(rng);
                let second = self.roll_with_rng(rng);
                let first_selected = match mode {
                    Advantage::Advantage => first.total >= second.total,
                    _ => first.total <= second.total,
                };

                let details = format!(
                    "Roll 1: {} = {}{}\nRoll 2: {} = {}{}",
                    first.details,
                    first.total,
                    if first_selected { " <<" } else { "" },
                    second.details,
                    second.total,
                    if first_selected { "" } else { " <<" },
                );

                RollOutcome {
                    total: if first_selected {
                        first.total
                    } else {
                        second.total
                    },
                    details,
                    dice_type: first.dice_type,
                }
            }
        }
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|term| match *term {
                Term::Dice { sign, count, sides } => {
                    format!("{} {count}d{sides}", sign_marker(sign))
                }
                Term::Flat { sign, value } => format!("{} {value}", sign_marker(sign)),
            })
            .collect();
        let joined = parts.join(" ");
        write!(f, "{}", joined.strip_prefix("+ ").unwrap_or(&joined))
    }
}

fn sign_marker(sign: i32) -> &'static str {
    if sign < 0 {
        "-"
    } else {
        "+"
    }
}

/// Outcome of evaluating a dice formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub total: i32,
    pub details: String,
    /// `"d<sides>"` of the last dice term in the formula, `"d20"` when
    /// the formula contains no dice.
    pub dice_type: String,
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.details, self.total)
    }
}

/// Convenience function: parse and evaluate in one step.
pub fn evaluate(formula: &str, mode: Advantage) -> RollOutcome {
    DiceFormula::parse(formula).evaluate(mode)
}
