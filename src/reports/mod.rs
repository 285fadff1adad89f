use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;
use wandclash::gesture::{SimilarityDetails, Validity};
use wandclash::matcher::MatchResponse;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub spell_id: String,
    pub spell_name: String,
    pub accuracy: u32,
    pub details: SimilarityDetails,
    pub passes: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRow {
    pub spell_id: String,
    pub trials: usize,
    /// Attack or counter threshold, whichever the spell is judged by.
    pub threshold: u32,
    pub recognized: usize,
    pub confused_with: Option<String>,
    pub mean_accuracy: f32,
}

impl CalibrationRow {
    pub fn rate(&self) -> f32 {
        if self.trials == 0 {
            0.0
        } else {
            self.recognized as f32 / self.trials as f32 * 100.0
        }
    }
}

fn accuracy_cell(accuracy: u32, threshold: u32) -> Cell {
    let cell = Cell::new(accuracy).set_alignment(CellAlignment::Right);
    if accuracy >= threshold {
        cell.fg(Color::Green)
    } else if accuracy + 10 >= threshold {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::Red)
    }
}

pub fn print_ranking(validity: Validity, rows: &[RankingRow], threshold: u32) {
    println!("\nStroke classified as: {}", validity);
    if rows.is_empty() {
        println!("(no candidates scored)");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Spell").add_attribute(Attribute::Bold),
        Cell::new("Accuracy").fg(Color::Cyan),
        Cell::new("Point"),
        Cell::new("Line"),
        Cell::new("Angle"),
        Cell::new("Pass"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.spell_name),
            accuracy_cell(row.accuracy, threshold),
            Cell::new(format!("{:.1}", row.details.point)),
            Cell::new(format!("{:.1}", row.details.line)),
            Cell::new(format!("{:.1}", row.details.angle)),
            Cell::new(if row.passes { "yes" } else { "-" }),
        ]);
    }

    for i in 1..=4 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("{}", table);
}

pub fn print_outcome(outcome: &MatchResponse) {
    if outcome.multiple_matches == Some(true) {
        let ids: Vec<&str> = outcome.matches.iter().map(|m| m.spell.id.as_str()).collect();
        println!("⚖️  Ambiguous: {}", ids.join(", "));
    } else if outcome.recognized {
        if let (Some(spell), Some(acc)) = (&outcome.spell, outcome.accuracy) {
            println!("✅ Recognized {} ({}%)", spell.name, acc);
        }
    } else {
        let reason = outcome.reason.map_or("-".to_string(), |r| r.to_string());
        println!(
            "❌ Not recognized: {} (best {}%)",
            reason,
            outcome.accuracy.unwrap_or(0)
        );
    }
}

/// `matrix[i][j]` is the accuracy of spell `i`'s own pattern scored
/// against spell `j`.
pub fn print_confusion(ids: &[String], matrix: &[Vec<u32>], threshold: u32) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("drawn \\ ref").add_attribute(Attribute::Bold)];
    header.extend(ids.iter().map(Cell::new));
    table.add_row(header);

    for (id, row) in ids.iter().zip(matrix) {
        let mut cells = vec![Cell::new(id).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|&acc| accuracy_cell(acc, threshold)));
        table.add_row(cells);
    }
    println!("\n{}", table);
}

pub fn print_collisions(collisions: &[(String, String, u32)], threshold: u32) {
    if collisions.is_empty() {
        println!("\nNo cross-matches at or above {}.", threshold);
        return;
    }
    println!(
        "\n⚠️  {} pattern pairs cross-match at or above {}:",
        collisions.len(),
        threshold
    );
    for (a, b, acc) in collisions {
        println!("   {:<18} ~ {:<18} {:>3}", a, b, acc);
    }
}

pub fn print_calibration(rows: &[CalibrationRow]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Spell").add_attribute(Attribute::Bold),
        Cell::new("Trials"),
        Cell::new("Recognized").fg(Color::Cyan),
        Cell::new("Rate %"),
        Cell::new("Mean Acc"),
        Cell::new("Most Confused With"),
    ]);

    for row in rows {
        let rate = row.rate();
        let rate_cell = Cell::new(format!("{:.1}", rate));
        let rate_cell = if rate >= 90.0 {
            rate_cell.fg(Color::Green)
        } else if rate >= 60.0 {
            rate_cell.fg(Color::Yellow)
        } else {
            rate_cell.fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&row.spell_id),
            Cell::new(row.trials),
            Cell::new(row.recognized),
            rate_cell,
            accuracy_cell(row.mean_accuracy.round() as u32, row.threshold),
            Cell::new(row.confused_with.as_deref().unwrap_or("-")),
        ]);
    }

    for i in 1..=4 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("\n{}", table);
}
