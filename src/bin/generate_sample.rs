//! Generates deterministic demo files (`sample.csv`, `sample.json`) with
//! mixed column types and some missing cells, for trying out the viewer.

use serde::Serialize;

#[derive(Serialize)]
struct Record {
    id: u32,
    score: Option<f64>,
    category: String,
    active: bool,
    joined: String,
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn generate_records(n: usize, rng: &mut SimpleRng) -> Vec<Record> {
    const CATEGORIES: [&str; 3] = ["alpha", "beta", "gamma"];

    (0..n)
        .map(|i| {
            // Roughly 5% of scores are missing.
            let score = if rng.next_f64() < 0.05 {
                None
            } else {
                Some((rng.gauss(72.0, 12.0) * 100.0).round() / 100.0)
            };
            let day = 1 + (rng.next_u64() % 28) as u32;
            let month = 1 + (rng.next_u64() % 12) as u32;
            Record {
                id: i as u32 + 1,
                score,
                category: CATEGORIES[(rng.next_u64() % 3) as usize].to_string(),
                active: rng.next_f64() < 0.7,
                joined: format!("2023-{month:02}-{day:02}"),
            }
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let records = generate_records(150, &mut rng);

    let mut writer = csv::Writer::from_path("sample.csv")?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    std::fs::write("sample.json", serde_json::to_string_pretty(&records)?)?;

    println!(
        "Wrote sample.csv and sample.json ({} rows each)",
        records.len()
    );
    Ok(())
}
