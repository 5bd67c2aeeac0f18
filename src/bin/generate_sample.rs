use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const COUNTIES: [(&str, f64); 6] = [
    ("Stockholm county", 2.4),
    ("Uppsala county", 0.4),
    ("Skåne county", 1.4),
    ("Västra Götaland county", 1.7),
    ("Gotland county", 0.06),
    ("Norrbotten county", 0.25),
];
const SEXES: [&str; 2] = ["men", "women"];
const MARITAL: [(&str, f64); 4] = [
    ("single", 0.48),
    ("married", 0.36),
    ("divorced", 0.11),
    ("widowed", 0.05),
];
const YEARS: std::ops::RangeInclusive<i64> = 2018..=2022;
const MAX_AGE: i64 = 100;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Rough share of an age cohort in each marital status; the young are single,
/// the old are more often widowed.
fn marital_weight(status: &str, base: f64, age: i64) -> f64 {
    let a = age as f64;
    match status {
        "single" if age < 20 => 1.0,
        _ if age < 20 => 0.0,
        "single" => base * (1.8 - a / 60.0).max(0.2),
        "married" => base * (a / 45.0).min(1.6),
        "divorced" => base * (a / 50.0).min(1.2),
        "widowed" => base * (a / 70.0).powi(3),
        _ => base,
    }
}

struct Row {
    county: &'static str,
    sex: &'static str,
    marital: &'static str,
    year: i64,
    age: i64,
    population: i64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(county, scale) in &COUNTIES {
        for sex in SEXES {
            for year in YEARS {
                for age in 0..=MAX_AGE {
                    let cohort = 12_000.0 * scale * (1.0 - age as f64 / 110.0).max(0.02);
                    for &(marital, base) in &MARITAL {
                        let noise = 0.9 + 0.2 * rng.next_f64();
                        let growth = 1.0 + 0.01 * (year - 2018) as f64;
                        let population =
                            (cohort * marital_weight(marital, base, age) * noise * growth).round();
                        rows.push(Row {
                            county,
                            sex,
                            marital,
                            year,
                            age,
                            population: population as i64,
                        });
                    }
                }
            }
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["county", "sex", "marital status", "year", "age", "population"])?;
    for row in rows {
        writer.write_record([
            row.county.to_string(),
            row.sex.to_string(),
            row.marital.to_string(),
            row.year.to_string(),
            row.age.to_string(),
            row.population.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("county", DataType::Utf8, false),
        Field::new("sex", DataType::Utf8, false),
        Field::new("marital status", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("age", DataType::Int64, false),
        Field::new("population", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.county))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.marital))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.population))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "project1_data.csv")?;
    write_parquet(&rows, "project1_data.parquet")?;

    println!(
        "Wrote {} population rows to project1_data.csv and project1_data.parquet",
        rows.len()
    );
    Ok(())
}
