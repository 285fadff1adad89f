use crate::reports::{self, CalibrationRow};
use clap::Args;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::info;
use wandclash::config::Config;
use wandclash::error::WcResult;
use wandclash::geometry::{BoundingBox, Point};
use wandclash::gesture::Recognizer;
use wandclash::spellbook::{Spell, SpellBook, SpellKind};

#[derive(Args, Debug, Clone)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 't', long, default_value_t = 50)]
    pub trials: usize,

    /// Per-point jitter as a fraction of the pattern's largest side
    #[arg(long, default_value_t = 0.04)]
    pub noise: f32,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// A randomly scaled, shifted and jittered copy of `pattern`.
fn jittered(pattern: &[Point], noise: f32, rng: &mut fastrand::Rng) -> Vec<Point> {
    let extent = BoundingBox::of(pattern).map_or(1.0, |b| b.max_extent().max(1.0));
    let scale = 0.5 + rng.f32() * 1.5;
    let (dx, dy) = (rng.f32() * 400.0 - 200.0, rng.f32() * 400.0 - 200.0);
    pattern
        .iter()
        .map(|p| {
            let jx = (rng.f32() * 2.0 - 1.0) * noise * extent;
            let jy = (rng.f32() * 2.0 - 1.0) * noise * extent;
            Point::new((p.x + jx) * scale + dx, (p.y + jy) * scale + dy)
        })
        .collect()
}

/// Measures how often noisy redraws of each pattern are recognized as
/// themselves when scored against every spell of the same kind.
pub fn run(args: CalibrateArgs, config: &Config, book: &SpellBook) -> WcResult<()> {
    let recognizer = Recognizer::with_spellbook(book, config.recognition.clone());
    let attacks: Vec<&Spell> = book.of_kind(SpellKind::Attack).collect();
    let counters: Vec<&Spell> = book.of_kind(SpellKind::Counter).collect();

    info!(
        "Calibrating {} spells, {} trials each, noise {:.2}",
        book.len(),
        args.trials,
        args.noise
    );

    let rows: Vec<CalibrationRow> = book
        .spells()
        .par_iter()
        .enumerate()
        .map(|(i, spell)| -> WcResult<CalibrationRow> {
            let mut rng = match args.seed {
                Some(s) => fastrand::Rng::with_seed(s.wrapping_add(i as u64)),
                None => fastrand::Rng::new(),
            };
            let (pool, threshold) = match spell.kind {
                SpellKind::Attack => (&attacks, config.thresholds.attack_threshold),
                SpellKind::Counter => (&counters, config.thresholds.counter_threshold),
            };

            let mut recognized = 0;
            let mut accuracy_sum = 0u64;
            let mut confusions: HashMap<&str, usize> = HashMap::new();
            for _ in 0..args.trials {
                let stroke = jittered(&spell.gesture_pattern, args.noise, &mut rng);
                let scores = recognizer.score_candidates(&stroke, pool)?;
                let Some(best) = scores.best() else {
                    continue;
                };
                if let Some(own) = scores.ranked.iter().find(|c| c.spell.id == spell.id) {
                    accuracy_sum += own.accuracy as u64;
                }
                if best.spell.id == spell.id && best.accuracy >= threshold {
                    recognized += 1;
                } else if best.spell.id != spell.id {
                    *confusions.entry(best.spell.id.as_str()).or_default() += 1;
                }
            }

            let confused_with = confusions
                .into_iter()
                .max_by_key(|&(id, n)| (n, std::cmp::Reverse(id)))
                .map(|(id, _)| id.to_string());

            Ok(CalibrationRow {
                spell_id: spell.id.clone(),
                trials: args.trials,
                threshold,
                recognized,
                confused_with,
                mean_accuracy: if args.trials == 0 {
                    0.0
                } else {
                    accuracy_sum as f32 / args.trials as f32
                },
            })
        })
        .collect::<WcResult<_>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        reports::print_calibration(&rows);
    }
    Ok(())
}
