use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, UInt64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{AgeValue, Dataset, Record};

/// Columns every source must provide (after normalization).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "county",
    "sex",
    "marital_status",
    "year",
    "age",
    "population",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a population dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the original export)
/// * `.json`    – `[{ "county": ..., "marital status": ..., ... }, ...]`
/// * `.parquet` – flat columns, strings or integers
///
/// Column names are normalized with [`normalize_column_name`] before the
/// required columns are looked up, so `marital status` becomes
/// `marital_status`.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(Dataset::from_records(records))
}

/// Trim a header and join its whitespace-separated words with `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers: csv::StringRecord = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(normalize_column_name)
        .collect::<Vec<_>>()
        .into();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let record: Record = row
            .deserialize(Some(&headers))
            .with_context(|| format!("CSV row {row_no}: malformed record"))?;
        records.push(record);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "county": "Stockholm", "sex": "men", "marital status": "married",
///     "year": 2022, "age": 40, "population": 1234 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<Map<String, JsonValue>> =
        serde_json::from_str(&text).context("Expected top-level JSON array of objects")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let normalized: Map<String, JsonValue> = row
                .into_iter()
                .map(|(key, val)| (normalize_column_name(&key), val))
                .collect();
            serde_json::from_value(JsonValue::Object(normalized))
                .with_context(|| format!("Row {i}: malformed record"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Text columns may be any type Arrow can cast to `Utf8`; `year` and
/// `population` must cast to integers. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, records.len(), &mut records)?;
    }

    Ok(records)
}

/// How a Parquet `age` column is read: whole numbers, floats that must be
/// whole, or text parsed like a CSV cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgeColumn {
    Integer,
    Float,
    Label,
}

impl AgeColumn {
    fn of(data_type: &DataType) -> Self {
        if data_type.is_integer() {
            AgeColumn::Integer
        } else if data_type.is_floating() {
            AgeColumn::Float
        } else {
            AgeColumn::Label
        }
    }

    fn target(self) -> DataType {
        match self {
            AgeColumn::Integer => DataType::Int64,
            AgeColumn::Float => DataType::Float64,
            AgeColumn::Label => DataType::Utf8,
        }
    }
}

fn append_batch(batch: &RecordBatch, offset: usize, out: &mut Vec<Record>) -> Result<()> {
    let schema = batch.schema();
    let by_name: HashMap<String, usize> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| (normalize_column_name(f.name()), i))
        .collect();

    let index = |name: &str| -> Result<usize> {
        by_name
            .get(name)
            .copied()
            .with_context(|| format!("Parquet file missing '{name}' column"))
    };

    let county =
        cast(batch.column(index("county")?), &DataType::Utf8).context("casting 'county'")?;
    let sex = cast(batch.column(index("sex")?), &DataType::Utf8).context("casting 'sex'")?;
    let marital = cast(batch.column(index("marital_status")?), &DataType::Utf8)
        .context("casting 'marital_status'")?;
    let year =
        cast(batch.column(index("year")?), &DataType::Int64).context("casting 'year'")?;
    let population = cast(batch.column(index("population")?), &DataType::UInt64)
        .context("casting 'population'")?;

    let age_raw = batch.column(index("age")?);
    let age_kind = AgeColumn::of(age_raw.data_type());
    let age = cast(age_raw, &age_kind.target()).context("casting 'age'")?;

    for (name, array) in [
        ("county", &county),
        ("sex", &sex),
        ("marital_status", &marital),
        ("year", &year),
        ("age", &age),
        ("population", &population),
    ] {
        if let Some(row) = (0..array.len()).find(|&r| array.is_null(r)) {
            bail!(
                "Row {}: '{name}' is null or not representable",
                offset + row
            );
        }
    }

    let county = county.as_string::<i32>();
    let sex = sex.as_string::<i32>();
    let marital = marital.as_string::<i32>();
    let year = year.as_primitive::<Int64Type>();
    let population = population.as_primitive::<UInt64Type>();

    for row in 0..batch.num_rows() {
        let age = match age_kind {
            AgeColumn::Integer => AgeValue::Years(age.as_primitive::<Int64Type>().value(row)),
            AgeColumn::Float => {
                let v = age.as_primitive::<Float64Type>().value(row);
                AgeValue::from_whole(v).with_context(|| {
                    format!("Row {}: age {v} is not a whole number", offset + row)
                })?
            }
            AgeColumn::Label => AgeValue::parse(age.as_string::<i32>().value(row)),
        };
        out.push(Record {
            county: county.value(row).to_string(),
            sex: sex.value(row).to_string(),
            marital_status: marital.value(row).to_string(),
            year: year.value(row),
            age,
            population: population.value(row),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    /// One-row population file whose `age` and `population` columns are
    /// supplied by the caller.
    fn write_parquet(path: &Path, age: ArrayRef, population: i64) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("county", DataType::Utf8, false),
            Field::new("sex", DataType::Utf8, false),
            Field::new("marital status", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("age", age.data_type().clone(), false),
            Field::new("population", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Stockholm"])),
                Arc::new(StringArray::from(vec!["men"])),
                Arc::new(StringArray::from(vec!["married"])),
                Arc::new(Int64Array::from(vec![2022])),
                age,
                Arc::new(Int64Array::from(vec![population])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn normalizes_space_separated_headers() {
        assert_eq!(normalize_column_name("marital status"), "marital_status");
        assert_eq!(normalize_column_name("  marital   status "), "marital_status");
        assert_eq!(normalize_column_name("county"), "county");
    }

    #[test]
    fn csv_renames_marital_status_and_parses_ages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pop.csv",
            "county,sex,marital status,year,age,population,extra\n\
             Stockholm,men,married,2022,40,1200,x\n\
             Uppsala,women,single,2021,100+,35,y\n",
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.marital_status, "married");
        assert_eq!(first.age, AgeValue::Years(40));
        assert_eq!(first.population, 1200);
        assert_eq!(ds.records()[1].age, AgeValue::Bucket("100+".into()));
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pop.csv",
            "county,sex,year,age,population\nStockholm,men,2022,40,1200\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("marital_status"));
    }

    #[test]
    fn csv_negative_population_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pop.csv",
            "county,sex,marital status,year,age,population\nStockholm,men,married,2022,40,-5\n",
        );
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn json_records_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "pop.json",
            r#"[{"county":"Kalmar","sex":"women","marital status":"widowed","year":2020,"age":"85","population":77}]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records()[0].marital_status, "widowed");
        assert_eq!(ds.records()[0].age, AgeValue::Years(85));
        assert_eq!(ds.domains().county.values(), ["Kalmar"]);
    }

    #[test]
    fn parquet_columns_are_cast_and_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("county", DataType::Utf8, false),
            Field::new("sex", DataType::Utf8, false),
            Field::new("marital status", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("age", DataType::Int64, false),
            Field::new("population", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Stockholm", "Gotland"])),
                Arc::new(StringArray::from(vec!["men", "women"])),
                Arc::new(StringArray::from(vec!["married", "divorced"])),
                Arc::new(Int32Array::from(vec![2022, 2019])),
                Arc::new(Int64Array::from(vec![33, 71])),
                Arc::new(Int64Array::from(vec![900, 14])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].county, "Gotland");
        assert_eq!(ds.records()[1].marital_status, "divorced");
        assert_eq!(ds.records()[1].year, 2019);
        assert_eq!(ds.records()[1].age, AgeValue::Years(71));
        assert_eq!(ds.records()[0].population, 900);
    }

    #[test]
    fn parquet_float_ages_become_years() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.parquet");
        write_parquet(&path, Arc::new(Float64Array::from(vec![30.0])), 12);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records()[0].age, AgeValue::Years(30));
        assert_eq!(ds.records()[0].population, 12);
    }

    #[test]
    fn parquet_fractional_age_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.parquet");
        write_parquet(&path, Arc::new(Float64Array::from(vec![30.5])), 12);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("age 30.5 is not a whole number"));
    }

    #[test]
    fn parquet_negative_population_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.parquet");
        write_parquet(&path, Arc::new(Int64Array::from(vec![40])), -5);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("'population' is null or not representable"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "pop.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
