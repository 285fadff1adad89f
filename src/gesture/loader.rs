use crate::error::{WandClashError, WcResult};
use crate::geometry::{validate_stroke, Point, Stroke};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Object(Point),
    Pair([f32; 2]),
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Object(p) => p,
            RawPoint::Pair([x, y]) => Point::new(x, y),
        }
    }
}

/// Reads a JSON array of `{"x":..,"y":..}` objects or `[x, y]` pairs.
pub fn load_stroke_json<R: Read>(reader: R) -> WcResult<Stroke> {
    let raw: Vec<RawPoint> = serde_json::from_reader(reader)?;
    let stroke: Stroke = raw.into_iter().map(Point::from).collect();
    validate_stroke(&stroke)?;
    Ok(stroke)
}

/// Reads `x,y` rows. A non-numeric first row is treated as a header; any
/// later non-numeric row is an error.
pub fn load_stroke_csv<R: Read>(reader: R) -> WcResult<Stroke> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stroke = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let rec = result?;
        if rec.len() < 2 {
            return Err(WandClashError::InvalidInput(format!(
                "row {} has {} columns, expected x,y",
                row_idx + 1,
                rec.len()
            )));
        }

        match (rec[0].parse::<f32>(), rec[1].parse::<f32>()) {
            (Ok(x), Ok(y)) => stroke.push(Point::new(x, y)),
            _ if row_idx == 0 => {
                debug!("Skipping CSV header: {:?}", rec);
            }
            _ => {
                return Err(WandClashError::InvalidInput(format!(
                    "row {} is not numeric: {:?}",
                    row_idx + 1,
                    rec
                )));
            }
        }
    }

    validate_stroke(&stroke)?;
    Ok(stroke)
}

/// Picks the parser from the file extension (`.csv`, anything else is JSON).
pub fn load_stroke_from_file<P: AsRef<Path>>(path: P) -> WcResult<Stroke> {
    let path = path.as_ref();
    info!("Loading stroke from {:?}", path);
    let file = File::open(path)?;

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        load_stroke_csv(file)
    } else {
        load_stroke_json(file)
    }
}
