use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Curve, Histogram, ResultsFile, ResultsObject};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an analysis-results file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one row per object: `name`, `kind`, `x`, `y`, `err` (recommended)
/// * `.json`    – `[{ "name": .., "kind": .., "x": [...], "y": [...], "err": [...] }, ...]`
/// * `.csv`     – same columns, list cells as semicolon-separated floats
pub fn load_file(path: &Path) -> Result<ResultsFile> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading results from {}", path.display()))?;

    let file = assemble(records)?;
    log::info!("Loaded {} objects from {}", file.len(), path.display());
    for (name, object) in file.iter() {
        log::debug!("  {name}: {object}");
    }
    Ok(file)
}

/// One object as stored on disk, before shape checks.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub kind: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub err: Vec<f64>,
}

/// Turn raw records into typed objects.
pub fn assemble(records: Vec<RawRecord>) -> Result<ResultsFile> {
    let mut file = ResultsFile::new();
    for rec in records {
        let object = match rec.kind.as_str() {
            "hist" | "histogram" | "TH1" => {
                // Curves may omit errors, histograms may not; an empty error
                // column means Poisson errors.
                let errors = if rec.err.is_empty() {
                    rec.y.iter().map(|c| c.abs().sqrt()).collect()
                } else {
                    rec.err
                };
                let h = Histogram::new(rec.x, rec.y, errors).map_err(|source| {
                    LoadError::InvalidHistogram {
                        name: rec.name.clone(),
                        source,
                    }
                })?;
                ResultsObject::Histogram(h)
            }
            "curve" | "func" | "TF1" => {
                let c = Curve::new(rec.x, rec.y).map_err(|reason| LoadError::InvalidCurve {
                    name: rec.name.clone(),
                    reason,
                })?;
                ResultsObject::Curve(c)
            }
            other => return Err(LoadError::UnknownKind(other.to_string()).into()),
        };
        if let ResultsObject::Histogram(h) = &object {
            if h.contents.iter().any(|c| !c.is_finite()) {
                log::warn!("histogram '{}' holds non-finite bin contents", rec.name);
            }
        }
        file.insert(rec.name, object)?;
    }
    Ok(file)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// [
///   { "name": "hMass_10_20", "kind": "hist",  "x": [1.7, 1.71, ...], "y": [...], "err": [...] },
///   { "name": "fTot_1_2",    "kind": "curve", "x": [...], "y": [...] }
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<RawRecord> = serde_json::from_str(&text).context("parsing JSON")?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row `name,kind,x,y,err`.
/// `x`, `y` and `err` contain semicolon-separated floats:
///   `"1.70;1.71;1.72"`
fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let name_idx = column("name")?;
    let kind_idx = column("kind")?;
    let x_idx = column("x")?;
    let y_idx = column("y")?;
    let err_idx = headers.iter().position(|h| h == "err");

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        records.push(RawRecord {
            name: field(name_idx).to_string(),
            kind: field(kind_idx).to_string(),
            x: parse_semicolon_floats(field(x_idx), row_no, "x")?,
            y: parse_semicolon_floats(field(y_idx), row_no, "y")?,
            err: match err_idx {
                Some(idx) => parse_semicolon_floats(field(idx), row_no, "err")?,
                None => Vec::new(),
            },
        });
    }
    Ok(records)
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row}, {col}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet results file.
///
/// Expected schema:
/// - `name`: Utf8 – object name
/// - `kind`: Utf8 – `hist` or `curve`
/// - `x`, `y`: List<Float64> or LargeList<Float64> (Float32 items accepted)
/// - `err`: optional List<Float64>, null or empty for curves
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let index = |name: &str| {
            schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let name_col = batch.column(index("name")?);
        let kind_col = batch.column(index("kind")?);
        let x_col = batch.column(index("x")?);
        let y_col = batch.column(index("y")?);
        let err_col = schema.index_of("err").ok().map(|i| batch.column(i));

        for row in 0..batch.num_rows() {
            let name = extract_string(name_col, row)
                .with_context(|| format!("Row {row}: failed to read 'name'"))?;
            let kind = extract_string(kind_col, row)
                .with_context(|| format!("Row {row}: failed to read 'kind'"))?;
            let x = extract_f64_list(x_col, row)
                .with_context(|| format!("Row {row} ({name}): failed to read 'x'"))?;
            let y = extract_f64_list(y_col, row)
                .with_context(|| format!("Row {row} ({name}): failed to read 'y'"))?;
            let err = match err_col {
                Some(col) if !col.is_null(row) => extract_f64_list(col, row)
                    .with_context(|| format!("Row {row} ({name}): failed to read 'err'"))?,
                _ => Vec::new(),
            };

            records.push(RawRecord {
                name,
                kind,
                x,
                y,
                err,
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // The inner array can be Float64 or Float32
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::writer::write_parquet;
    use std::io::Write;

    fn hist_record(name: &str) -> RawRecord {
        RawRecord {
            name: name.to_string(),
            kind: "hist".to_string(),
            x: vec![0.0, 1.0, 2.0],
            y: vec![4.0, 9.0],
            err: vec![2.0, 3.0],
        }
    }

    #[test]
    fn assemble_builds_typed_objects() {
        let curve = RawRecord {
            name: "fTot".to_string(),
            kind: "curve".to_string(),
            x: vec![0.0, 1.0],
            y: vec![1.0, 2.0],
            err: Vec::new(),
        };
        let file = assemble(vec![hist_record("h"), curve]).unwrap();
        assert_eq!(file.histogram("h").unwrap().bin_content(2).unwrap(), 9.0);
        assert_eq!(file.curve("fTot").unwrap().eval(0.5), Some(1.5));
    }

    #[test]
    fn assemble_defaults_missing_histogram_errors_to_poisson() {
        let mut rec = hist_record("h");
        rec.err.clear();
        let file = assemble(vec![rec]).unwrap();
        let h = file.histogram("h").unwrap();
        assert_eq!(h.errors, vec![2.0, 3.0]);
    }

    #[test]
    fn assemble_rejects_unknown_kind_and_duplicates() {
        let mut rec = hist_record("h");
        rec.kind = "graph".to_string();
        assert!(assemble(vec![rec]).is_err());
        assert!(assemble(vec![hist_record("h"), hist_record("h")]).is_err());
    }

    #[test]
    fn loads_json_records() {
        let mut tmp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            tmp,
            r#"[{{"name":"hMean","kind":"hist","x":[1,2,4],"y":[1.86,1.87],"err":[0.001,0.002]}}]"#
        )
        .unwrap();
        let file = load_file(tmp.path()).unwrap();
        let h = file.histogram("hMean").unwrap();
        assert_eq!(h.bin_width(2).unwrap(), 2.0);
        assert_eq!(h.bin_error(1).unwrap(), 0.001);
    }

    #[test]
    fn loads_csv_records() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(tmp, "name,kind,x,y,err").unwrap();
        writeln!(tmp, "hMass,hist,0;1;2,5;6,1;1").unwrap();
        writeln!(tmp, "fBkg,curve,0;1;2,1;1;1,").unwrap();
        let file = load_file(tmp.path()).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.histogram("hMass").unwrap().maximum(), 6.0);
        assert!(file.curve("fBkg").is_ok());
    }

    #[test]
    fn parquet_written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.parquet");
        let original = assemble(vec![
            hist_record("hRawYields"),
            RawRecord {
                name: "freflect".to_string(),
                kind: "curve".to_string(),
                x: vec![1.7, 1.8, 1.9],
                y: vec![3.0, 5.0, 3.0],
                err: Vec::new(),
            },
        ])
        .unwrap();
        write_parquet(&original, &path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("results.root")).unwrap_err();
        assert!(err.to_string().contains(".root"));
    }
}
