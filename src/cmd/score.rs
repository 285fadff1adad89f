use crate::reports::{self, RankingRow};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use wandclash::config::Config;
use wandclash::duel::Phase;
use wandclash::error::{WandClashError, WcResult};
use wandclash::gesture::loader::load_stroke_from_file;
use wandclash::gesture::{Recognizer, Validity};
use wandclash::matcher::{MatchContext, MatchResponse, Matcher};
use wandclash::spellbook::{Spell, SpellBook};

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    /// Stroke file: a JSON point array, or x,y rows when the extension is .csv
    pub stroke: PathBuf,

    /// Score against this spell only
    #[arg(short, long)]
    pub spell: Option<String>,

    #[arg(short, long, default_value = "attack")]
    pub phase: Phase,

    /// The attack being answered, required with `--phase counter`
    #[arg(short, long)]
    pub attack: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReport {
    validity: Validity,
    valid: bool,
    ranking: Vec<RankingRow>,
    outcome: MatchResponse,
}

pub fn run(args: ScoreArgs, config: &Config, book: &SpellBook) -> WcResult<()> {
    let stroke = load_stroke_from_file(&args.stroke)?;
    let recognizer = Recognizer::with_spellbook(book, config.recognition.clone());

    let candidates: Vec<&Spell> = match &args.spell {
        Some(id) => vec![book
            .get(id)
            .ok_or_else(|| WandClashError::UnknownSpell(id.clone()))?],
        None => book.candidates(args.phase, args.color.as_deref()),
    };
    let threshold = match args.phase {
        Phase::Attack => config.thresholds.attack_threshold,
        Phase::Counter => config.thresholds.counter_threshold,
    };

    let used = BTreeSet::new();
    let ctx = match (args.phase, &args.attack) {
        (Phase::Attack, _) => MatchContext::Attack { used: &used },
        (Phase::Counter, Some(id)) => MatchContext::Counter { attack_id: id },
        (Phase::Counter, None) => {
            return Err(WandClashError::InvalidInput(
                "--attack is required with --phase counter".to_string(),
            ))
        }
    };

    let scores = recognizer.score_candidates(&stroke, &candidates)?;
    let ranking: Vec<RankingRow> = scores
        .ranked
        .iter()
        .map(|c| RankingRow {
            spell_id: c.spell.id.clone(),
            spell_name: c.spell.name.clone(),
            accuracy: c.accuracy,
            details: c.details,
            passes: c.accuracy >= threshold,
        })
        .collect();

    let matcher = Matcher::new(recognizer, config.thresholds.clone());
    let outcome = matcher.match_gesture(&stroke, &candidates, &ctx)?.to_response();

    if args.json {
        let report = ScoreReport {
            validity: scores.validity,
            valid: scores.validity.is_valid(),
            ranking,
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        reports::print_ranking(scores.validity, &ranking, threshold);
        reports::print_outcome(&outcome);
    }
    Ok(())
}
