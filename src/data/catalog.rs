//! Static game catalog: unit and buff definitions parsed once per session.
//! Everything downstream (indices, parameter assembly) treats the catalog as
//! immutable after [GameCatalog::parse] returns.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Which facility kind a buff effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoomKind {
    Manufacture,
    Trading,
}

/// Upgrade phase of a unit. Phase3 exists only as the sentinel upper bound
/// used while walking a unit's unlock sequence; real units stop at Phase2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvolvePhase {
    Phase0,
    Phase1,
    Phase2,
    Phase3,
}

impl EvolvePhase {
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::Phase0),
            1 => Some(Self::Phase1),
            2 => Some(Self::Phase2),
            3 => Some(Self::Phase3),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Phase0 => 0,
            Self::Phase1 => 1,
            Self::Phase2 => 2,
            Self::Phase3 => 3,
        }
    }
}

impl fmt::Display for EvolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PHASE_{}", self.index())
    }
}

impl Serialize for EvolvePhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

// Game data of different vintages carries the phase either as an integer or
// as a "PHASE_n" string; both are accepted.
impl<'de> Deserialize<'de> for EvolvePhase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PhaseVisitor;

        impl Visitor<'_> for PhaseVisitor {
            type Value = EvolvePhase;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an evolve phase (0..=3 or \"PHASE_n\")")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<EvolvePhase, E> {
                EvolvePhase::from_index(value)
                    .ok_or_else(|| E::custom(format!("evolve phase out of range: {value}")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<EvolvePhase, E> {
                u64::try_from(value)
                    .ok()
                    .and_then(EvolvePhase::from_index)
                    .ok_or_else(|| E::custom(format!("evolve phase out of range: {value}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<EvolvePhase, E> {
                value
                    .strip_prefix("PHASE_")
                    .and_then(|digits| digits.parse::<u64>().ok())
                    .and_then(EvolvePhase::from_index)
                    .ok_or_else(|| E::custom(format!("unrecognized evolve phase '{value}'")))
            }
        }

        deserializer.deserialize_any(PhaseVisitor)
    }
}

/// The (phase, level) a unit must reach before an unlock item takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UnlockRequirement {
    pub phase: EvolvePhase,
    pub level: i32,
}

impl UnlockRequirement {
    /// Lexicographic on (phase, level): levels reset when a unit is promoted,
    /// so anything unlocked in an earlier phase stays unlocked.
    pub fn satisfied_by(&self, phase: EvolvePhase, level: i32) -> bool {
        (phase, level) >= (self.phase, self.level)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnlockItem {
    #[serde(rename = "buffId")]
    pub buff_id: String,
    pub cond: UnlockRequirement,
}

/// One skill slot. A slot holds at most one active buff at a time; a later
/// unlock in the same slot replaces the earlier one.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillSlot {
    #[serde(rename = "buffData", default)]
    pub unlocks: Vec<UnlockItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitDefinition {
    pub name: String,
    #[serde(default)]
    pub appellation: String,
    #[serde(rename = "buffChar", default)]
    pub skills: Vec<SkillSlot>,
}

impl UnitDefinition {
    /// Buff ids active at the given upgrade state, one per slot at most:
    /// the highest satisfied unlock item of each slot wins.
    pub fn active_buffs(&self, phase: EvolvePhase, level: i32) -> Vec<&str> {
        let mut active = Vec::new();
        for slot in &self.skills {
            let mut best: Option<&UnlockItem> = None;
            for item in &slot.unlocks {
                if !item.cond.satisfied_by(phase, level) {
                    continue;
                }
                let replace = match best {
                    None => true,
                    Some(current) => {
                        (item.cond.phase, item.cond.level)
                            >= (current.cond.phase, current.cond.level)
                    }
                };
                if replace {
                    best = Some(item);
                }
            }
            if let Some(item) = best {
                active.push(item.buff_id.as_str());
            }
        }
        active
    }
}

/// Display numbers attached to a buff (and to a trading room's order board).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffDisplay {
    pub base: i64,
    pub buff: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuffDefinition {
    #[serde(rename = "buffName")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display: BuffDisplay,
}

/// Facility kind a buff id classifies to, keyed off the id prefix the game
/// data uses ("manu_…" / "trade_…"). Buffs outside these families have no
/// effect on the rooms this optimizer models.
pub fn classify_buff_effect(buff_id: &str) -> Option<RoomKind> {
    if buff_id.starts_with("manu") {
        Some(RoomKind::Manufacture)
    } else if buff_id.starts_with("trade") {
        Some(RoomKind::Trading)
    } else {
        None
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(err) => write!(f, "catalog parse error: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(rename = "chars")]
    units: HashMap<String, UnitDefinition>,
    buffs: HashMap<String, BuffDefinition>,
}

/// Immutable catalog of unit and buff definitions. Single owner of every
/// entry; lookups hand out borrowed references.
#[derive(Debug)]
pub struct GameCatalog {
    units: HashMap<String, UnitDefinition>,
    buffs: HashMap<String, BuffDefinition>,
}

impl GameCatalog {
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(text)?;
        let mut units = document.units;

        // Unlock items within a slot are kept sorted by (phase, level) so
        // per-slot "highest satisfied" walks stay monotonic.
        for unit in units.values_mut() {
            for slot in &mut unit.skills {
                slot.unlocks
                    .sort_by_key(|item| (item.cond.phase, item.cond.level));
            }
        }

        let catalog = GameCatalog {
            units,
            buffs: document.buffs,
        };

        let unclassified = catalog
            .buffs
            .keys()
            .filter(|id| classify_buff_effect(id.as_str()).is_none())
            .count();
        log::info!(
            "catalog loaded: {} unit definitions, {} buff definitions",
            catalog.units.len(),
            catalog.buffs.len()
        );
        if unclassified > 0 {
            log::debug!("{unclassified} buff definition(s) have no modeled room effect");
        }

        Ok(catalog)
    }

    pub fn unit(&self, id: &str) -> Option<&UnitDefinition> {
        self.units.get(id)
    }

    pub fn buff(&self, id: &str) -> Option<&BuffDefinition> {
        self.buffs.get(id)
    }

    pub fn units(&self) -> impl Iterator<Item = (&String, &UnitDefinition)> {
        self.units.iter()
    }

    pub fn buffs(&self) -> impl Iterator<Item = (&String, &BuffDefinition)> {
        self.buffs.iter()
    }
}
