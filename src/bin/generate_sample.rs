use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

// Instrument defaults used by the viewer.
const NEUTRAL_MASS: f64 = 22870.0;
const ION_MASS: f64 = 1.007_276_45;
const CAL_A: f64 = 231.7;
const CAL_X: f64 = 0.6262;
const TRANSFER_C: f64 = 1.41;
const PUSHER: f64 = 110.0;
const GAS: f64 = 28.0;

/// Drift time that calibrates back to `ccs` for an ion of charge `z`.
fn drift_time_for(ccs: f64, mz: f64, z: u32) -> f64 {
    let mu = NEUTRAL_MASS * GAS / (NEUTRAL_MASS + GAS);
    let base = (ccs * mu.sqrt() / (CAL_A * z as f64)).powf(1.0 / CAL_X);
    (base + TRANSFER_C * (mz / 1000.0).sqrt()) * 1000.0 / PUSHER
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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut mz = Vec::new();
    let mut rt = Vec::new();
    let mut inten = Vec::new();

    // Two conformer families: compact at low charge, extended at high charge.
    let families = [(8..=14, 2100.0, 40.0), (12..=22, 3300.0, 80.0)];
    for (charges, ccs_center, ccs_spread) in families {
        for z in charges {
            let ion_mz = (NEUTRAL_MASS + z as f64 * ION_MASS) / z as f64;
            for _ in 0..6 {
                let ccs = rng.gauss(ccs_center, ccs_spread);
                let obs_mz = ion_mz * (1.0 + rng.gauss(0.0, 40e-6));
                mz.push(obs_mz);
                rt.push(drift_time_for(ccs, obs_mz, z));
                inten.push(rng.uniform(3_000.0, 250_000.0).round());
            }
        }
    }

    // Background: random m/z, mostly below the noise floor.
    for _ in 0..400 {
        mz.push(rng.uniform(400.0, 4000.0));
        rt.push(rng.uniform(10.0, 150.0));
        inten.push(rng.uniform(100.0, 4_000.0).round());
    }

    // CSV, as exported by the instrument software
    let csv_path = "sample_apex3d.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["function", "m_z", "rt", "inten"])
        .expect("Failed to write CSV header");
    for i in 0..mz.len() {
        writer
            .write_record([
                "1".to_string(),
                format!("{:.4}", mz[i]),
                format!("{:.3}", rt[i]),
                format!("{}", inten[i]),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Same rows as Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("m_z", DataType::Float64, false),
        Field::new("rt", DataType::Float64, false),
        Field::new("inten", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(mz.clone())),
            Arc::new(Float64Array::from(rt)),
            Arc::new(Float64Array::from(inten)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_apex3d.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {} rows to {csv_path} and {parquet_path}", mz.len());
}
