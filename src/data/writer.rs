use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{ResultsFile, ResultsObject};

fn list_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
        false,
    )
}

fn build_list<'a>(rows: impl Iterator<Item = &'a [f64]>) -> arrow::array::ListArray {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        let values = builder.values();
        for &v in row {
            values.append_value(v);
        }
        builder.append(true);
    }
    builder.finish()
}

/// Write all objects of `file` as a Parquet results file, one row per object.
pub fn write_parquet(file: &ResultsFile, path: &Path) -> Result<()> {
    let mut names = Vec::with_capacity(file.len());
    let mut kinds = Vec::with_capacity(file.len());
    let mut xs: Vec<&[f64]> = Vec::with_capacity(file.len());
    let mut ys: Vec<&[f64]> = Vec::with_capacity(file.len());
    let mut errs: Vec<&[f64]> = Vec::with_capacity(file.len());

    for (name, object) in file.iter() {
        names.push(name);
        kinds.push(object.kind());
        match object {
            ResultsObject::Histogram(h) => {
                xs.push(&h.edges);
                ys.push(&h.contents);
                errs.push(&h.errors);
            }
            ResultsObject::Curve(c) => {
                xs.push(&c.x);
                ys.push(&c.y);
                errs.push(&[]);
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("kind", DataType::Utf8, false),
        list_field("x"),
        list_field("y"),
        list_field("err"),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(kinds)),
            Arc::new(build_list(xs.into_iter())),
            Arc::new(build_list(ys.into_iter())),
            Arc::new(build_list(errs.into_iter())),
        ],
    )
    .context("building record batch")?;

    let out = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(out, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    log::info!("Wrote {} objects to {}", file.len(), path.display());
    Ok(())
}
