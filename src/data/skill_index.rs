//! Buff-combination resolution: maps a set of simultaneously active buff
//! identifiers (optionally qualified by the owning unit) back to the unique
//! (unit, phase, level) state that unlocks exactly that set.
//!
//! The game grants buffs incrementally as a unit is upgraded, but callers
//! only observe the resulting effect set. The index is built once per
//! session by replaying every unit's unlock sequence and recording each
//! breakpoint where the active set changes.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::catalog::{EvolvePhase, GameCatalog, SkillSlot, UnlockItem, UnlockRequirement};
use super::character_index::CharacterIndex;

// Discriminator tags folded into the composite key so that a single-buff
// query, a multi-buff query, and a unit qualifier can never alias each other.
const SINGLE_BUFF_TAG: &str = "__single_buff__";
const MULTI_BUFF_TAG: &str = "__multi_buff__";
const UNIT_TAG: &str = "__unit__";

/// A fully resolved unlock state: the unit and the (phase, level) it must
/// have reached for the queried buff set to be active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockState {
    pub char_id: String,
    pub phase: EvolvePhase,
    pub level: i32,
}

impl UnlockState {
    /// Whether `next` may replace `self` without making the entry ambiguous:
    /// same unit, and both phase and level moved (weakly) forward. Any other
    /// collision means two unrelated upgrade paths produced the same key.
    fn can_be_overwritten_by(&self, next: &UnlockState) -> bool {
        self.char_id == next.char_id && self.phase <= next.phase && self.level <= next.level
    }
}

#[derive(Debug)]
struct IndexSlot {
    has_entry: bool,
    terminal: bool,
    state: Option<UnlockState>,
}

impl Default for IndexSlot {
    fn default() -> Self {
        IndexSlot {
            has_entry: false,
            terminal: true,
            state: None,
        }
    }
}

impl IndexSlot {
    fn record(&mut self, state: UnlockState) {
        let compatible = match &self.state {
            None => true,
            Some(previous) => previous.can_be_overwritten_by(&state),
        };
        // Once a slot has seen an incompatible write it stays non-terminal
        // forever; cleanup purges it.
        self.terminal = self.terminal && compatible;
        self.has_entry = true;
        self.state = Some(state);
    }

    fn is_valid(&self) -> bool {
        self.has_entry && self.terminal
    }
}

fn hash_str(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// Symmetric XOR fold: the buff *set*, not sequence, determines the key, so
// callers may supply the members in any order. XOR is a degenerate multiset
// digest (duplicate members cancel, complementary sets can alias); kept
// anyway because the resolvable-combination set was validated against the
// full catalog with exactly this combiner. Do not swap in a stronger digest
// without re-validating which combinations resolve uniquely.
fn hash_key_set<'a>(keys: impl IntoIterator<Item = &'a str>) -> u64 {
    keys.into_iter().fold(0, |seed, key| seed ^ hash_str(key))
}

fn multi_buff_key<'a>(buff_keys: impl IntoIterator<Item = &'a str>, unit_key: Option<&str>) -> u64 {
    let mut key = hash_key_set(buff_keys);
    key ^= hash_str(MULTI_BUFF_TAG);
    if let Some(unit) = unit_key {
        key ^= hash_str(unit);
        key ^= hash_str(UNIT_TAG);
    }
    key
}

fn single_buff_key(buff_key: &str, unit_key: Option<&str>) -> u64 {
    let mut key = hash_str(buff_key);
    key ^= hash_str(SINGLE_BUFF_TAG);
    if let Some(unit) = unit_key {
        key ^= hash_str(unit);
        key ^= hash_str(UNIT_TAG);
    }
    key
}

/// Composite-keyed lookup from buff combinations to unlock states, plus the
/// buff name⇄id surface. Built once over the catalog; read-only afterwards.
#[derive(Debug)]
pub struct SkillIndex {
    entries: HashMap<u64, IndexSlot>,
    buff_name_to_id: HashMap<String, String>,
    buff_id_to_name: HashMap<String, String>,
}

impl SkillIndex {
    pub fn build(catalog: &GameCatalog, characters: &CharacterIndex) -> Self {
        let mut index = SkillIndex {
            entries: HashMap::new(),
            buff_name_to_id: HashMap::new(),
            buff_id_to_name: HashMap::new(),
        };

        for (id, buff) in catalog.buffs() {
            index.buff_name_to_id.insert(buff.name.clone(), id.clone());
            index.buff_id_to_name.insert(id.clone(), buff.name.clone());
        }

        for (char_id, unit) in catalog.units() {
            let char_name = characters.id_to_name(catalog, char_id);
            index.index_unit(char_id, &unit.skills, char_name);
        }

        index.cleanup();
        index
    }

    /// Resolve a multi-buff combination. Order of `buff_keys` is irrelevant.
    /// An empty query or an unknown/ambiguous combination is a miss.
    pub fn resolve_combination(
        &self,
        buff_keys: &[&str],
        unit_key: Option<&str>,
    ) -> Option<&UnlockState> {
        if buff_keys.is_empty() {
            return None;
        }
        self.lookup(multi_buff_key(buff_keys.iter().copied(), unit_key))
    }

    /// Resolve a single buff identifier.
    pub fn resolve_single(&self, buff_key: &str, unit_key: Option<&str>) -> Option<&UnlockState> {
        if buff_key.is_empty() {
            return None;
        }
        self.lookup(single_buff_key(buff_key, unit_key))
    }

    pub fn has_id(&self, buff_id: &str) -> bool {
        self.buff_id_to_name.contains_key(buff_id)
    }

    pub fn has_name(&self, buff_name: &str) -> bool {
        self.buff_name_to_id.contains_key(buff_name)
    }

    pub fn name_to_id(&self, buff_name: &str) -> Option<&str> {
        self.buff_name_to_id.get(buff_name).map(String::as_str)
    }

    pub fn id_to_name(&self, buff_id: &str) -> Option<&str> {
        self.buff_id_to_name.get(buff_id).map(String::as_str)
    }

    /// Number of resolvable entries surviving cleanup.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: u64) -> Option<&UnlockState> {
        self.entries
            .get(&key)
            .filter(|slot| slot.is_valid())
            .and_then(|slot| slot.state.as_ref())
    }

    /// Replay one unit's unlock sequence and register a lookup entry at every
    /// breakpoint where the active buff set changes.
    fn index_unit(&mut self, char_id: &str, skills: &[SkillSlot], char_name: Option<&str>) {
        // Flatten (slot ordinal, unlock item), then force one final
        // breakpoint with a sentinel that no real state satisfies.
        let mut items: Vec<(usize, UnlockItem)> = Vec::new();
        for (slot_no, slot) in skills.iter().enumerate() {
            for item in &slot.unlocks {
                items.push((slot_no, item.clone()));
            }
        }
        items.push((
            usize::MAX,
            UnlockItem {
                buff_id: String::new(),
                cond: UnlockRequirement {
                    phase: EvolvePhase::Phase3,
                    level: i32::MAX,
                },
            },
        ));
        items.sort_by_key(|(_, item)| (item.cond.phase, item.cond.level));

        let mut cursor_phase = EvolvePhase::Phase0;
        let mut cursor_level = 1;
        let mut active_ids: Vec<String> = Vec::new();
        let mut active_names: Vec<String> = Vec::new();
        // slot ordinal -> buff id currently occupying that slot
        let mut slot_active: HashMap<usize, String> = HashMap::new();

        for (slot_no, item) in items {
            if !item.cond.satisfied_by(cursor_phase, cursor_level) {
                if !active_ids.is_empty() {
                    let state = UnlockState {
                        char_id: char_id.to_string(),
                        phase: cursor_phase,
                        level: cursor_level,
                    };
                    self.register_breakpoint(&state, &active_ids, &active_names, char_id, char_name);
                }
                cursor_phase = item.cond.phase;
                cursor_level = item.cond.level;
            }

            if slot_no == usize::MAX || item.buff_id.is_empty() {
                break;
            }

            let buff_name = self
                .buff_id_to_name
                .get(&item.buff_id)
                .cloned()
                .unwrap_or_default();
            match slot_active.get(&slot_no).cloned() {
                None => {
                    slot_active.insert(slot_no, item.buff_id.clone());
                    active_ids.push(item.buff_id.clone());
                    active_names.push(buff_name);
                }
                Some(previous) => {
                    // A newer unlock in the same slot replaces the older one,
                    // at the same list position.
                    if let Some(position) = active_ids.iter().position(|id| *id == previous) {
                        active_ids[position] = item.buff_id.clone();
                        active_names[position] = buff_name;
                    }
                    slot_active.insert(slot_no, item.buff_id.clone());
                }
            }
        }
    }

    /// Register one breakpoint under all key variants: {ids, names} ×
    /// {unqualified, unit-id-qualified, unit-name-qualified}.
    fn register_breakpoint(
        &mut self,
        state: &UnlockState,
        ids: &[String],
        names: &[String],
        char_id: &str,
        char_name: Option<&str>,
    ) {
        let char_name = char_name.map(str::to_string);
        self.register_variants(state, ids, None);
        self.register_variants(state, names, None);
        self.register_variants(state, ids, Some(char_id));
        self.register_variants(state, names, Some(char_id));
        if let Some(name) = char_name.as_deref() {
            self.register_variants(state, ids, Some(name));
            self.register_variants(state, names, Some(name));
        }
    }

    fn register_variants(&mut self, state: &UnlockState, keys: &[String], unit_key: Option<&str>) {
        self.insert(multi_buff_key(keys.iter().map(String::as_str), unit_key), state);
        for key in keys {
            self.insert(single_buff_key(key, unit_key), state);
        }
    }

    fn insert(&mut self, key: u64, state: &UnlockState) {
        self.entries.entry(key).or_default().record(state.clone());
    }

    /// Purge every slot that never got an entry or went non-terminal. Called
    /// once at the end of the build; ambiguity degrades lookup coverage but
    /// never fails construction.
    fn cleanup(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.is_valid());
        let dropped = before - self.entries.len();
        if dropped > 0 {
            log::debug!("skill index: dropped {dropped} ambiguous combination entries");
        }
        log::info!("skill index: {} resolvable combination entries", self.entries.len());
    }
}
