//! Writes a synthetic `endangered_animals.csv` (and a Parquet twin) that can
//! serve as the local fallback dataset.
//!
//! ```text
//! cargo run --bin generate_sample [OUT_DIR]
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SPECIES: [(&str, &str, &str, f64); 24] = [
    // name, continent, diet, typical adult weight (kg)
    ("Amur Leopard", "Asia", "Carnivore", 45.0),
    ("Sumatran Orangutan", "Asia", "Omnivore", 60.0),
    ("Javan Rhino", "Asia", "Herbivore", 1800.0),
    ("Giant Panda", "Asia", "Herbivore", 100.0),
    ("Snow Leopard", "Asia", "Carnivore", 40.0),
    ("Saola", "Asia", "Herbivore", 90.0),
    ("Mountain Gorilla", "Africa", "Herbivore", 160.0),
    ("Black Rhino", "Africa", "Herbivore", 1100.0),
    ("African Wild Dog", "Africa", "Carnivore", 25.0),
    ("Pangolin", "Africa", "Insectivore", 12.0),
    ("Ethiopian Wolf", "Africa", "Carnivore", 16.0),
    ("Grevy's Zebra", "Africa", "Herbivore", 400.0),
    ("Iberian Lynx", "Europe", "Carnivore", 12.0),
    ("European Mink", "Europe", "Carnivore", 0.8),
    ("Mediterranean Monk Seal", "Europe", "Carnivore", 280.0),
    ("Vaquita", "North America", "Carnivore", 45.0),
    ("Red Wolf", "North America", "Carnivore", 27.0),
    ("Axolotl", "North America", "Carnivore", 0.2),
    ("Hyacinth Macaw", "South America", "Herbivore", 1.5),
    ("Golden Lion Tamarin", "South America", "Omnivore", 0.6),
    ("Giant Otter", "South America", "Carnivore", 30.0),
    ("Kakapo", "Oceania", "Herbivore", 2.2),
    ("Northern Hairy-nosed Wombat", "Oceania", "Herbivore", 32.0),
    ("Leadbeater's Possum", "Oceania", "Insectivore", 0.15),
];

const STATUSES: [&str; 4] = ["Critically Endangered", "Endangered", "Vulnerable", "Near Threatened"];
const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];

struct Row {
    species: String,
    conservation_status: &'static str,
    continent: &'static str,
    diet_type: &'static str,
    population: Option<i64>,
    weight_kg: Option<f64>,
    lifespan_years: Option<f64>,
    habitat_area_km2: Option<f64>,
    decline_rate_percent: f64,
}

/// Box-Muller transform on top of the seeded RNG.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `None` with probability `p`.
fn maybe<T>(rng: &mut StdRng, p: f64, value: T) -> Option<T> {
    (!rng.gen_bool(p)).then_some(value)
}

fn generate(rng: &mut StdRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(name, continent, diet, weight) in &SPECIES {
        for region in REGIONS {
            let status_idx = rng.gen_range(0..STATUSES.len());
            // rarer status → smaller, faster-declining populations
            let scale = 10f64.powi(status_idx as i32 + 1);
            let population = (scale * rng.gen_range(0.5..5.0)).round() as i64;
            let decline = gauss(rng, 8.0 - 2.0 * status_idx as f64, 1.5).max(0.0);

            let weight_kg = (weight * gauss(rng, 1.0, 0.12)).max(0.05);
            let lifespan = (4.0 + 6.0 * weight.ln_1p() + gauss(rng, 0.0, 2.0)).max(1.0);
            let habitat = population as f64 * rng.gen_range(0.5..40.0);

            rows.push(Row {
                species: format!("{name} ({region})"),
                conservation_status: STATUSES[status_idx],
                continent,
                diet_type: diet,
                population: maybe(rng, 0.03, population),
                weight_kg: maybe(rng, 0.05, (weight_kg * 100.0).round() / 100.0),
                lifespan_years: maybe(rng, 0.06, (lifespan * 10.0).round() / 10.0),
                habitat_area_km2: maybe(rng, 0.04, habitat.round()),
                decline_rate_percent: (decline * 100.0).round() / 100.0,
            });
        }
    }
    rows
}

const HEADER: [&str; 9] = [
    "species",
    "conservation_status",
    "continent",
    "diet_type",
    "population",
    "weight_kg",
    "lifespan_years",
    "habitat_area_km2",
    "decline_rate_percent",
];

fn cell<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    writer.write_record(HEADER)?;
    for r in rows {
        writer.write_record([
            r.species.clone(),
            r.conservation_status.to_string(),
            r.continent.to_string(),
            r.diet_type.to_string(),
            cell(r.population),
            cell(r.weight_kg),
            cell(r.lifespan_years),
            cell(r.habitat_area_km2),
            r.decline_rate_percent.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn float_column(rows: &[Row], get: impl Fn(&Row) -> Option<f64>) -> ArrayRef {
    let mut b = Float64Builder::with_capacity(rows.len());
    for r in rows {
        b.append_option(get(r));
    }
    Arc::new(b.finish())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let mut population = Int64Builder::with_capacity(rows.len());
    for r in rows {
        population.append_option(r.population);
    }

    let text = |get: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(rows.iter().map(get)))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Utf8, false),
        Field::new(HEADER[1], DataType::Utf8, false),
        Field::new(HEADER[2], DataType::Utf8, false),
        Field::new(HEADER[3], DataType::Utf8, false),
        Field::new(HEADER[4], DataType::Int64, true),
        Field::new(HEADER[5], DataType::Float64, true),
        Field::new(HEADER[6], DataType::Float64, true),
        Field::new(HEADER[7], DataType::Float64, true),
        Field::new(HEADER[8], DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.species.as_str()),
            text(|r| r.conservation_status),
            text(|r| r.continent),
            text(|r| r.diet_type),
            Arc::new(population.finish()),
            float_column(rows, |r| r.weight_kg),
            float_column(rows, |r| r.lifespan_years),
            float_column(rows, |r| r.habitat_area_km2),
            float_column(rows, |r| Some(r.decline_rate_percent)),
        ],
    )?;

    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate(&mut rng);

    let csv_path = out_dir.join("endangered_animals.csv");
    write_csv(&rows, &csv_path)?;
    let parquet_path = out_dir.join("endangered_animals.parquet");
    write_parquet(&rows, &parquet_path)?;

    println!(
        "Wrote {} rows × {} columns to {} and {}",
        rows.len(),
        HEADER.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
