//! Writes a synthetic delivery table with the columns the dashboard expects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Generate a synthetic last-mile delivery CSV", long_about = None)]
struct Args {
    /// Number of deliveries to generate
    #[arg(short = 'n', long, default_value_t = 2000)]
    rows: usize,

    /// Seed for the deterministic generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// CSV file to write
    #[arg(short, long, default_value = "Last mile Delivery Data.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct DeliveryRow {
    #[serde(rename = "Order_ID")]
    order_id: String,
    #[serde(rename = "Agent_Age")]
    agent_age: String,
    #[serde(rename = "Agent_Rating")]
    agent_rating: String,
    #[serde(rename = "Weather")]
    weather: String,
    #[serde(rename = "Traffic")]
    traffic: String,
    #[serde(rename = "Vehicle")]
    vehicle: String,
    #[serde(rename = "Area")]
    area: String,
    #[serde(rename = "Delivery_Time")]
    delivery_time: String,
    #[serde(rename = "Category")]
    category: String,
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick an entry together with its delay in minutes.
    fn pick<'a>(&mut self, choices: &'a [(&'a str, f64)]) -> &'a (&'a str, f64) {
        let i = (self.next_f64() * choices.len() as f64) as usize;
        &choices[i.min(choices.len() - 1)]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

// (value, added minutes)
const WEATHER: &[(&str, f64)] = &[
    ("Sunny", 0.0),
    ("Cloudy", 10.0),
    ("Windy", 8.0),
    ("Fog", 25.0),
    ("Stormy", 30.0),
    ("Sandstorms", 28.0),
];
const TRAFFIC: &[(&str, f64)] = &[("Low", 0.0), ("Medium", 15.0), ("High", 25.0), ("Jam", 45.0)];
const VEHICLE: &[(&str, f64)] = &[("motorcycle", 0.0), ("scooter", 6.0), ("van", 12.0)];
const AREA: &[(&str, f64)] = &[
    ("Urban", 0.0),
    ("Metropolitian", 10.0),
    ("Semi-Urban", 35.0),
    ("Other", 5.0),
];
const CATEGORY: &[(&str, f64)] = &[
    ("Grocery", -15.0),
    ("Electronics", 5.0),
    ("Clothing", 10.0),
    ("Books", 8.0),
    ("Toys", 6.0),
    ("Home", 12.0),
];

fn generate_row(id: usize, rng: &mut SimpleRng) -> DeliveryRow {
    let weather = rng.pick(WEATHER);
    let traffic = rng.pick(TRAFFIC);
    let vehicle = rng.pick(VEHICLE);
    let area = rng.pick(AREA);
    let category = rng.pick(CATEGORY);

    let age = rng.gauss(30.0, 5.0).clamp(18.0, 50.0).round();
    let rating = rng.gauss(4.6, 0.3).clamp(1.0, 5.0);
    let rating_penalty = (5.0 - rating) * 12.0;
    let time = (rng.gauss(90.0, 25.0)
        + weather.1
        + traffic.1
        + vehicle.1
        + area.1
        + category.1
        + rating_penalty)
        .max(10.0)
        .round();

    let mut row = DeliveryRow {
        order_id: format!("ord{id:06}"),
        agent_age: format!("{age}"),
        agent_rating: format!("{rating:.1}"),
        weather: weather.0.to_string(),
        traffic: traffic.0.to_string(),
        vehicle: vehicle.0.to_string(),
        area: area.0.to_string(),
        delivery_time: format!("{time}"),
        category: category.0.to_string(),
    };

    // Sprinkle the defects real exports carry: blank cells and junk numbers.
    if rng.chance(0.01) {
        row.agent_rating = String::new();
    }
    if rng.chance(0.01) {
        row.weather = "NaN".to_string();
    }
    if rng.chance(0.005) {
        row.delivery_time = "unknown".to_string();
    }
    row
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for id in 0..args.rows {
        writer
            .serialize(generate_row(id, &mut rng))
            .with_context(|| format!("writing row {id}"))?;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("Wrote {} deliveries to {}", args.rows, args.output.display());
    println!("Wrote {} deliveries to {}", args.rows, args.output.display());
    Ok(())
}
