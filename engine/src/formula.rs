use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::error::{invalid, EngineError, Result};

/// Upper bound on dice in a single term.
pub const MAX_DICE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keep {
    Highest(u32),
    Lowest(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    pub count: u32,
    pub sides: u32,
    #[serde(default)]
    pub keep: Option<Keep>,
}

impl DiceTerm {
    pub fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            keep: None,
        }
    }

    pub fn keep(mut self, keep: Keep) -> Self {
        self.keep = Some(keep);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.count == 0 || self.count > MAX_DICE {
            return Err(invalid(format!(
                "dice count must be 1..={} (capped to bound memory use), got {}",
                MAX_DICE, self.count
            )));
        }
        if self.sides < 2 {
            return Err(invalid(format!("dice need at least 2 sides, got {}", self.sides)));
        }
        if let Some(Keep::Highest(k) | Keep::Lowest(k)) = self.keep {
            if k == 0 || k > self.count {
                return Err(invalid(format!(
                    "cannot keep {} of {}d{}",
                    k, self.count, self.sides
                )));
            }
        }
        Ok(())
    }

    fn roll(&self, dice: &mut Dice) -> Vec<DieResult> {
        let mut results: Vec<DieResult> = (0..self.count)
            .map(|_| DieResult {
                face: dice.roll(self.sides),
                active: true,
            })
            .collect();

        if let Some(keep) = self.keep {
            // Stable sort, so ties keep the earlier die.
            let mut order: Vec<usize> = (0..results.len()).collect();
            let kept = match keep {
                Keep::Highest(k) => {
                    order.sort_by(|&a, &b| results[b].face.cmp(&results[a].face));
                    k
                }
                Keep::Lowest(k) => {
                    order.sort_by_key(|&i| results[i].face);
                    k
                }
            };
            for &idx in order.iter().skip(kept as usize) {
                results[idx].active = false;
            }
        }
        results
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.keep {
            Some(Keep::Highest(k)) => write!(f, "kh{}", k),
            Some(Keep::Lowest(k)) => write!(f, "kl{}", k),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Dice { negative: bool, dice: DiceTerm },
    Flat(i64),
}

/// A signed sum of dice terms and flat modifiers, such as `3d6`, `2d6+1` or
/// `4d6kh3`. Dice dropped by a keep suffix stay in the roll, marked inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    terms: Vec<Term>,
}

impl DiceFormula {
    /// `count` dice with `sides` faces and nothing else.
    pub fn pool(count: u32, sides: u32) -> Result<Self> {
        let dice = DiceTerm::new(count, sides);
        dice.validate()?;
        let terms = vec![Term::Dice {
            negative: false,
            dice,
        }];
        check_bounds(&terms, &dice.to_string())?;
        Ok(Self { terms })
    }

    pub(crate) fn from_terms(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn roll(&self, dice: &mut Dice) -> Roll {
        let mut terms = Vec::new();
        let mut modifier = 0i64;
        for term in &self.terms {
            match *term {
                Term::Dice { negative, dice: d } => terms.push(RolledTerm {
                    dice: d,
                    negative,
                    results: d.roll(dice),
                }),
                Term::Flat(n) => modifier = modifier.saturating_add(n),
            }
        }
        let total = terms
            .iter()
            .map(RolledTerm::subtotal)
            .fold(modifier, i64::saturating_add);
        let roll = Roll {
            formula: self.to_string(),
            terms,
            modifier,
            total,
        };
        tracing::trace!(formula = %roll.formula, total = roll.total, "rolled formula");
        roll
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let (negative, body) = match term {
                Term::Dice { negative, dice } => (*negative, dice.to_string()),
                Term::Flat(n) => (*n < 0, n.unsigned_abs().to_string()),
            };
            let sign = if negative {
                "-"
            } else if i > 0 {
                "+"
            } else {
                ""
            };
            write!(f, "{}{}", sign, body)?;
        }
        Ok(())
    }
}

impl FromStr for DiceFormula {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if cleaned.is_empty() {
            return Err(invalid("empty dice formula"));
        }

        let mut terms = Vec::new();
        let mut current = String::new();
        let mut negative = false;
        let mut signed = false;
        for ch in cleaned.chars() {
            match ch {
                '+' | '-' => {
                    // A sign may lead the formula; anywhere else it closes a term.
                    if current.is_empty() {
                        if signed {
                            return Err(invalid(format!("dangling operator in '{}'", s)));
                        }
                    } else {
                        terms.push(parse_term(&current, negative, s)?);
                        current.clear();
                    }
                    negative = ch == '-';
                    signed = true;
                }
                _ => current.push(ch),
            }
        }
        if current.is_empty() {
            return Err(invalid(format!("dangling operator in '{}'", s)));
        }
        terms.push(parse_term(&current, negative, s)?);
        check_bounds(&terms, s)?;

        Ok(Self { terms })
    }
}

fn parse_term(part: &str, negative: bool, formula: &str) -> Result<Term> {
    let bad = || invalid(format!("invalid dice formula '{}' at '{}'", formula, part));

    let Some((count, rest)) = part.split_once('d') else {
        let n: i64 = part.parse().map_err(|_| bad())?;
        return Ok(Term::Flat(if negative { -n } else { n }));
    };

    let count: u32 = if count.is_empty() {
        1
    } else {
        count.parse().map_err(|_| bad())?
    };
    let (sides, keep) = if let Some((sides, k)) = rest.split_once("kh") {
        (sides, Some(Keep::Highest(k.parse().map_err(|_| bad())?)))
    } else if let Some((sides, k)) = rest.split_once("kl") {
        (sides, Some(Keep::Lowest(k.parse().map_err(|_| bad())?)))
    } else {
        (rest, None)
    };
    let sides: u32 = sides.parse().map_err(|_| bad())?;

    let dice = DiceTerm { count, sides, keep };
    dice.validate()?;
    Ok(Term::Dice { negative, dice })
}

/// Largest magnitude a roll of `terms` can reach must fit an `i64`.
fn check_bounds(terms: &[Term], formula: &str) -> Result<()> {
    let out_of_range = || invalid(format!("dice formula '{}' is out of range", formula));
    terms.iter().try_fold(0i64, |bound, term| {
        let reach = match *term {
            Term::Flat(n) => n.checked_abs().ok_or_else(out_of_range)?,
            Term::Dice { dice, .. } => i64::from(dice.count) * i64::from(dice.sides),
        };
        bound.checked_add(reach).ok_or_else(out_of_range)
    })?;
    Ok(())
}

/// One die as rolled. Inactive dice were dropped by the formula and count
/// toward nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    pub face: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledTerm {
    pub dice: DiceTerm,
    pub negative: bool,
    pub results: Vec<DieResult>,
}

impl RolledTerm {
    pub fn active_faces(&self) -> impl Iterator<Item = u32> + '_ {
        self.results.iter().filter(|r| r.active).map(|r| r.face)
    }

    pub fn subtotal(&self) -> i64 {
        let sum: i64 = self.active_faces().map(i64::from).sum();
        if self.negative { -sum } else { sum }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub formula: String,
    pub terms: Vec<RolledTerm>,
    pub modifier: i64,
    pub total: i64,
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =", self.formula)?;
        for term in &self.terms {
            let faces: Vec<String> = term
                .results
                .iter()
                .map(|r| {
                    if r.active {
                        r.face.to_string()
                    } else {
                        format!("({})", r.face)
                    }
                })
                .collect();
            write!(
                f,
                " {}[{}]",
                if term.negative { "-" } else { "" },
                faces.join(" ")
            )?;
        }
        if self.modifier != 0 {
            write!(f, " {:+}", self.modifier)?;
        }
        write!(f, " → {}", self.total)
    }
}
