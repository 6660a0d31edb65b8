//! Writes a synthetic market dataset (`sample_market.parquet` and
//! `sample_market.csv`) suitable for uploading to the service.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Uniform in `[-spread, spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

/// Location, rate in the first year (INR / sqft), yearly rate growth,
/// flats sold in the first year.
const LOCATIONS: [(&str, f64, f64, f64); 5] = [
    ("Aundh", 9800.0, 0.06, 420.0),
    ("Baner", 8600.0, 0.08, 610.0),
    ("Wakad", 6400.0, 0.05, 880.0),
    ("Akurdi", 5200.0, -0.01, 300.0),
    ("Koregaon Park", 14500.0, 0.04, 190.0),
];

const YEARS: std::ops::RangeInclusive<i64> = 2018..=2024;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut years: Vec<i64> = Vec::new();
    let mut locations: Vec<String> = Vec::new();
    let mut rates: Vec<f64> = Vec::new();
    let mut sold: Vec<i64> = Vec::new();
    let mut sales: Vec<f64> = Vec::new();

    for &(loc, base_rate, growth, base_sold) in &LOCATIONS {
        for (i, year) in YEARS.enumerate() {
            let rate = base_rate * (1.0 + growth).powi(i as i32) * (1.0 + rng.jitter(0.02));
            let units = (base_sold * (1.0 + rng.jitter(0.15))).round().max(0.0) as i64;
            // Average flat of ~950 sqft, total in INR crore.
            let total = rate * 950.0 * units as f64 / 1e7;

            years.push(year);
            locations.push(loc.to_string());
            rates.push((rate * 100.0).round() / 100.0);
            sold.push(units);
            sales.push((total * 100.0).round() / 100.0);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("final location", DataType::Utf8, false),
        Field::new("flat - weighted average rate", DataType::Float64, false),
        Field::new("flat_sold - igr", DataType::Int64, false),
        Field::new("total_sales - igr", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(years.clone())),
            Arc::new(StringArray::from(
                locations.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rates.clone())),
            Arc::new(Int64Array::from(sold.clone())),
            Arc::new(Float64Array::from(sales.clone())),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let parquet_path = "sample_market.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    // Write CSV with the same rows
    let csv_path = "sample_market.csv";
    let mut csv = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    csv.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
    for i in 0..years.len() {
        csv.write_record([
            years[i].to_string(),
            locations[i].clone(),
            rates[i].to_string(),
            sold[i].to_string(),
            sales[i].to_string(),
        ])?;
    }
    csv.flush()?;

    println!(
        "Wrote {} rows ({} locations × {} years) to {parquet_path} and {csv_path}",
        years.len(),
        LOCATIONS.len(),
        YEARS.count()
    );
    Ok(())
}
