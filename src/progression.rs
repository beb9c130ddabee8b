//! Named numeric transforms from tier to value.
//!
//! Data files name a transform and its parameters; the kind selects an entry
//! in a fixed function table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionKind {
    Constant,
    Linear,
    Geometric,
    Stepped,
}

impl ProgressionKind {
    pub const ALL: [ProgressionKind; 4] = [
        ProgressionKind::Constant,
        ProgressionKind::Linear,
        ProgressionKind::Geometric,
        ProgressionKind::Stepped,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgressionKind::Constant => "constant",
            ProgressionKind::Linear => "linear",
            ProgressionKind::Geometric => "geometric",
            ProgressionKind::Stepped => "stepped",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

type Transform = fn(&[f64; 3], u32) -> f64;

const TRANSFORMS: [Transform; 4] = [constant, linear, geometric, stepped];

fn constant(params: &[f64; 3], _tier: u32) -> f64 {
    params[0]
}

fn linear(params: &[f64; 3], tier: u32) -> f64 {
    params[0] + params[1] * f64::from(tier)
}

fn geometric(params: &[f64; 3], tier: u32) -> f64 {
    params[0] * params[1].powf(f64::from(tier))
}

fn stepped(params: &[f64; 3], tier: u32) -> f64 {
    let every = params[2].max(1.0);
    params[0] + params[1] * (f64::from(tier) / every).floor()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Progression {
    Constant { value: f64 },
    Linear { base: f64, per_tier: f64 },
    Geometric { base: f64, ratio: f64 },
    /// Adds `step` once every `every` tiers.
    Stepped { base: f64, step: f64, every: u32 },
}

impl Progression {
    pub fn kind(&self) -> ProgressionKind {
        match self {
            Progression::Constant { .. } => ProgressionKind::Constant,
            Progression::Linear { .. } => ProgressionKind::Linear,
            Progression::Geometric { .. } => ProgressionKind::Geometric,
            Progression::Stepped { .. } => ProgressionKind::Stepped,
        }
    }

    fn params(&self) -> [f64; 3] {
        match *self {
            Progression::Constant { value } => [value, 0.0, 0.0],
            Progression::Linear { base, per_tier } => [base, per_tier, 0.0],
            Progression::Geometric { base, ratio } => [base, ratio, 0.0],
            Progression::Stepped { base, step, every } => [base, step, f64::from(every)],
        }
    }

    /// Builds a progression from a kind name and positional parameters, as
    /// found in flat data tables. Missing parameters default to zero.
    pub fn from_parts(name: &str, params: &[f64]) -> Option<Self> {
        let param = |index: usize| params.get(index).copied().unwrap_or(0.0);
        let progression = match ProgressionKind::from_name(name)? {
            ProgressionKind::Constant => Progression::Constant { value: param(0) },
            ProgressionKind::Linear => Progression::Linear {
                base: param(0),
                per_tier: param(1),
            },
            ProgressionKind::Geometric => Progression::Geometric {
                base: param(0),
                ratio: param(1),
            },
            ProgressionKind::Stepped => Progression::Stepped {
                base: param(0),
                step: param(1),
                every: param(2).max(1.0) as u32,
            },
        };
        Some(progression)
    }

    pub fn evaluate(&self, tier: u32) -> f64 {
        TRANSFORMS[self.kind() as usize](&self.params(), tier)
    }
}
