use crate::duel::Phase;
use crate::error::{WandClashError, WcResult};
use crate::geometry::{Point, Stroke};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpellKind {
    Attack,
    Counter,
}

/// A named reference gesture. `counters` lists the attack ids a counter
/// spell answers and is always `None` for attack spells once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SpellKind,
    pub color: String,
    pub color_name: String,
    #[serde(default)]
    pub description: String,
    pub gesture_pattern: Stroke,
    #[serde(default)]
    pub counters: Option<Vec<String>>,
}

impl Spell {
    pub fn is_attack(&self) -> bool {
        self.kind == SpellKind::Attack
    }

    /// True if this is a counter spell registered against `attack_id`.
    pub fn counters_attack(&self, attack_id: &str) -> bool {
        self.kind == SpellKind::Counter
            && self
                .counters
                .as_ref()
                .is_some_and(|ids| ids.iter().any(|id| id == attack_id))
    }

    pub fn matches_color(&self, filter: &str) -> bool {
        self.color.eq_ignore_ascii_case(filter) || self.color_name.eq_ignore_ascii_case(filter)
    }
}

#[derive(Debug, Clone)]
pub struct SpellBook {
    spells: Vec<Spell>,
    index: HashMap<String, usize>,
}

impl SpellBook {
    /// Validates the whole library up front so use sites never re-check shape.
    pub fn new(mut spells: Vec<Spell>) -> WcResult<Self> {
        let mut index = HashMap::with_capacity(spells.len());
        for (i, spell) in spells.iter_mut().enumerate() {
            if spell.id.trim().is_empty() {
                return Err(WandClashError::Validation(format!(
                    "spell #{} has an empty id",
                    i
                )));
            }
            if index.insert(spell.id.clone(), i).is_some() {
                return Err(WandClashError::Validation(format!(
                    "duplicate spell id '{}'",
                    spell.id
                )));
            }
            if spell.gesture_pattern.len() < 2 {
                return Err(WandClashError::Validation(format!(
                    "spell '{}' needs at least 2 pattern points",
                    spell.id
                )));
            }
            if spell.gesture_pattern.iter().any(|p| !p.is_finite()) {
                return Err(WandClashError::Validation(format!(
                    "spell '{}' has a non-finite pattern point",
                    spell.id
                )));
            }

            match spell.kind {
                SpellKind::Attack => {
                    if spell.counters.as_ref().is_some_and(|c| !c.is_empty()) {
                        return Err(WandClashError::Validation(format!(
                            "attack spell '{}' cannot list counters",
                            spell.id
                        )));
                    }
                    spell.counters = None;
                }
                SpellKind::Counter => {
                    if spell.counters.is_none() {
                        warn!("Counter spell '{}' has no counters list", spell.id);
                        spell.counters = Some(Vec::new());
                    }
                }
            }
        }

        let attack_ids: HashSet<&str> = spells
            .iter()
            .filter(|s| s.is_attack())
            .map(|s| s.id.as_str())
            .collect();
        for spell in spells.iter().filter(|s| !s.is_attack()) {
            for target in spell.counters.iter().flatten() {
                if !attack_ids.contains(target.as_str()) {
                    return Err(WandClashError::Validation(format!(
                        "counter spell '{}' references unknown attack '{}'",
                        spell.id, target
                    )));
                }
            }
        }

        Ok(Self { spells, index })
    }

    pub fn from_reader<R: Read>(reader: R) -> WcResult<Self> {
        let spells: Vec<Spell> = serde_json::from_reader(reader)?;
        Self::new(spells)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WcResult<Self> {
        info!("Loading spellbook from {:?}", path.as_ref());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.index.get(id).map(|&i| &self.spells[i])
    }

    pub fn of_kind(&self, kind: SpellKind) -> impl Iterator<Item = &Spell> {
        self.spells.iter().filter(move |s| s.kind == kind)
    }

    /// Spells eligible in `phase`, optionally restricted to one colour.
    pub fn candidates(&self, phase: Phase, color: Option<&str>) -> Vec<&Spell> {
        self.of_kind(phase.spell_kind())
            .filter(|s| color.map_or(true, |c| s.matches_color(c)))
            .collect()
    }

    pub fn counters_for(&self, attack_id: &str) -> Vec<&Spell> {
        self.spells
            .iter()
            .filter(|s| s.counters_attack(attack_id))
            .collect()
    }

    /// Administrative correction of a pattern's points and/or description.
    pub fn correct_spell(
        &mut self,
        id: &str,
        pattern: Option<Stroke>,
        description: Option<String>,
    ) -> WcResult<&Spell> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| WandClashError::UnknownSpell(id.to_string()))?;

        if let Some(points) = &pattern {
            if points.len() < 2 || points.iter().any(|p| !p.is_finite()) {
                return Err(WandClashError::Validation(format!(
                    "corrected pattern for '{}' must have at least 2 finite points",
                    id
                )));
            }
        }

        let spell = &mut self.spells[idx];
        if let Some(points) = pattern {
            spell.gesture_pattern = points;
        }
        if let Some(text) = description {
            spell.description = text;
        }
        info!("Corrected spell '{}'", id);
        Ok(&self.spells[idx])
    }

    /// The library shipped with the game: six attacks (one per regular
    /// attack turn for either player, plus a spare for the bonus round) and
    /// five counters.
    pub fn builtin() -> Self {
        Self::new(builtin_spells()).unwrap_or_else(|e| panic!("builtin spellbook: {}", e))
    }
}

fn closed(mut points: Vec<Point>) -> Vec<Point> {
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().map(|&c| Point::from(c)).collect()
}

fn attack(id: &str, name: &str, color: &str, color_name: &str, desc: &str, pattern: Stroke) -> Spell {
    Spell {
        id: id.to_string(),
        name: name.to_string(),
        kind: SpellKind::Attack,
        color: color.to_string(),
        color_name: color_name.to_string(),
        description: desc.to_string(),
        gesture_pattern: pattern,
        counters: None,
    }
}

fn counter(
    id: &str,
    name: &str,
    color: &str,
    color_name: &str,
    desc: &str,
    pattern: Stroke,
    counters: &[&str],
) -> Spell {
    Spell {
        id: id.to_string(),
        name: name.to_string(),
        kind: SpellKind::Counter,
        color: color.to_string(),
        color_name: color_name.to_string(),
        description: desc.to_string(),
        gesture_pattern: pattern,
        counters: Some(counters.iter().map(|s| s.to_string()).collect()),
    }
}

fn builtin_spells() -> Vec<Spell> {
    let circle: Vec<Point> = (0..=24)
        .map(|i| {
            let a = 2.0 * PI * i as f32 / 24.0;
            Point::new(150.0 + 100.0 * a.cos(), 150.0 + 100.0 * a.sin())
        })
        .collect();
    let spiral: Vec<Point> = (0..40)
        .map(|i| {
            let r = 10.0 + i as f32 * 4.0;
            let a = i as f32 * 0.35;
            Point::new(150.0 + r * a.cos(), 150.0 + r * a.sin())
        })
        .collect();
    let wave: Vec<Point> = (0..28)
        .map(|i| Point::new(20.0 + i as f32 * 10.0, 150.0 + 60.0 * (i as f32 * 0.4).sin()))
        .collect();
    let arc: Vec<Point> = (0..=16)
        .map(|i| {
            let a = PI + PI * i as f32 / 16.0;
            Point::new(150.0 + 110.0 * a.cos(), 180.0 + 110.0 * a.sin())
        })
        .collect();

    vec![
        attack(
            "ember_triangle",
            "Ember Triangle",
            "#e74c3c",
            "red",
            "A three-cornered burst of flame.",
            closed(pts(&[(150.0, 40.0), (260.0, 240.0), (40.0, 240.0)])),
        ),
        attack(
            "tidal_vortex",
            "Tidal Vortex",
            "#3498db",
            "blue",
            "A closed loop that drags the target under.",
            circle,
        ),
        attack(
            "storm_zigzag",
            "Storm Zigzag",
            "#f1c40f",
            "yellow",
            "Forked lightning in four strokes.",
            pts(&[
                (20.0, 200.0),
                (80.0, 60.0),
                (140.0, 200.0),
                (200.0, 60.0),
                (260.0, 200.0),
            ]),
        ),
        attack(
            "thorn_square",
            "Thorn Square",
            "#27ae60",
            "green",
            "A cage of brambles.",
            closed(pts(&[(50.0, 50.0), (250.0, 50.0), (250.0, 250.0), (50.0, 250.0)])),
        ),
        attack(
            "void_spiral",
            "Void Spiral",
            "#8e44ad",
            "purple",
            "An outward spiral that unravels defences.",
            spiral,
        ),
        attack(
            "gale_wave",
            "Gale Wave",
            "#1abc9c",
            "teal",
            "A rolling gust of wind.",
            wave,
        ),
        counter(
            "aegis_bar",
            "Aegis Bar",
            "#ecf0f1",
            "white",
            "A flat barrier that smothers fire and lightning.",
            pts(&[(20.0, 150.0), (280.0, 150.0)]),
            &["ember_triangle", "storm_zigzag"],
        ),
        counter(
            "pillar_ward",
            "Pillar Ward",
            "#95a5a6",
            "grey",
            "A standing column that splits wind and water.",
            pts(&[(150.0, 20.0), (150.0, 280.0)]),
            &["gale_wave", "tidal_vortex"],
        ),
        counter(
            "deflect_chevron",
            "Deflect Chevron",
            "#e67e22",
            "orange",
            "A wedge that turns a spell aside.",
            pts(&[(40.0, 60.0), (150.0, 240.0), (260.0, 60.0)]),
            &["void_spiral", "ember_triangle"],
        ),
        counter(
            "rune_bolt",
            "Rune Bolt",
            "#f39c12",
            "amber",
            "A binding rune traced in three strokes.",
            pts(&[(40.0, 60.0), (260.0, 60.0), (40.0, 240.0), (260.0, 240.0)]),
            &["thorn_square", "tidal_vortex"],
        ),
        counter(
            "dome_arc",
            "Dome Arc",
            "#bdc3c7",
            "silver",
            "A sheltering half-dome.",
            arc,
            &["storm_zigzag", "gale_wave", "void_spiral"],
        ),
    ]
}
