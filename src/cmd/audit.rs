use crate::reports;
use clap::Args;
use rayon::prelude::*;
use strum::IntoEnumIterator;
use wandclash::config::Config;
use wandclash::error::WcResult;
use wandclash::gesture::Recognizer;
use wandclash::spellbook::{Spell, SpellBook, SpellKind};

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    #[command(flatten)]
    pub config: Config,

    /// Restrict the audit to attacks or counters
    #[arg(long)]
    pub kind: Option<SpellKind>,
}

/// Scores every reference pattern against every other pattern of the same
/// kind. Pairs that clear the threshold would come back ambiguous in play.
pub fn run(args: AuditArgs, config: &Config, book: &SpellBook) -> WcResult<()> {
    let recognizer = Recognizer::with_spellbook(book, config.recognition.clone());
    let kinds: Vec<SpellKind> = match args.kind {
        Some(k) => vec![k],
        None => SpellKind::iter().collect(),
    };

    println!("\n🔎 === SPELLBOOK AUDIT === 🔎");
    for kind in kinds {
        let spells: Vec<&Spell> = book.of_kind(kind).collect();
        if spells.is_empty() {
            continue;
        }
        let threshold = match kind {
            SpellKind::Attack => config.thresholds.attack_threshold,
            SpellKind::Counter => config.thresholds.counter_threshold,
        };

        let matrix: Vec<Vec<u32>> = spells
            .par_iter()
            .map(|drawn| -> WcResult<Vec<u32>> {
                let prepared = recognizer.prepare(&drawn.gesture_pattern)?;
                Ok(spells
                    .iter()
                    .map(|reference| recognizer.evaluate_spell(&prepared, reference).score)
                    .collect())
            })
            .collect::<WcResult<_>>()?;

        let ids: Vec<String> = spells.iter().map(|s| s.id.clone()).collect();
        let mut collisions = Vec::new();
        for i in 0..spells.len() {
            for j in (i + 1)..spells.len() {
                let worst = matrix[i][j].max(matrix[j][i]);
                if worst >= threshold {
                    collisions.push((ids[i].clone(), ids[j].clone(), worst));
                }
            }
        }
        collisions.sort_by(|a, b| b.2.cmp(&a.2));

        println!("\n{} spells ({}), threshold {}", kind, spells.len(), threshold);
        reports::print_confusion(&ids, &matrix, threshold);
        reports::print_collisions(&collisions, threshold);
    }
    Ok(())
}
