//! Affix rolling.
//!
//! Every affix definition is entered into one lottery by index. A roll
//! blacklists the affixes locked above the requested tier and batch-draws,
//! so no affix appears twice on one item.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::lottery::{Lottery, LotteryError};
use crate::progression::Progression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffixDef {
    pub name: String,
    pub weight: usize,
    #[serde(default)]
    pub min_tier: u32,
    pub progression: Progression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledAffix {
    pub name: String,
    pub value: f64,
}

pub struct AffixTable {
    defs: Vec<AffixDef>,
    lottery: Lottery<usize>,
}

impl AffixTable {
    pub fn new(defs: Vec<AffixDef>, seed: u64) -> Result<Self, LotteryError> {
        let mut lottery = Lottery::new(seed);
        for (index, def) in defs.iter().enumerate() {
            lottery.enter(index, def.weight)?;
        }
        Ok(Self { defs, lottery })
    }

    pub fn defs(&self) -> &[AffixDef] {
        &self.defs
    }

    /// Affixes available at `tier`.
    pub fn eligible(&self, tier: u32) -> impl Iterator<Item = &AffixDef> {
        self.defs.iter().filter(move |def| def.min_tier <= tier)
    }

    /// Rolls up to `count` distinct affixes valid at `tier`. Fewer come back
    /// when the eligible pool runs out.
    pub fn roll(&mut self, tier: u32, count: usize) -> Result<Vec<RolledAffix>, LotteryError> {
        let locked: HashSet<usize> = self
            .defs
            .iter()
            .enumerate()
            .filter(|(_, def)| def.min_tier > tier)
            .map(|(index, _)| index)
            .collect();

        self.lottery.start_batch_draw_excluding(&locked);
        let mut rolled = Vec::with_capacity(count);
        for _ in 0..count {
            let index = match self.lottery.draw() {
                Ok(Some(index)) => index,
                Ok(None) => break,
                Err(err) => {
                    self.lottery.end_batch_draw();
                    return Err(err);
                }
            };
            if let Some(def) = self.defs.get(index) {
                rolled.push(RolledAffix {
                    name: def.name.clone(),
                    value: def.progression.evaluate(tier),
                });
            }
        }
        self.lottery.end_batch_draw();

        tracing::debug!(
            target: "hexworld::loot",
            tier,
            requested = count,
            rolled = rolled.len(),
            "loot.roll"
        );
        Ok(rolled)
    }
}
