use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
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

    // (name, centre x, centre y, spread, points)
    let clusters = [
        ("north", 0.0, 5.0, 0.8, 300),
        ("east", 5.0, 0.0, 1.2, 300),
        ("south", 0.0, -5.0, 0.6, 200),
        ("noise", 0.0, 0.0, 6.0, 100),
    ];

    // Hourly readings starting 2024-01-01T00:00:00Z
    let start_ms: i64 = 1_704_067_200_000;
    let hour_ms: i64 = 3_600_000;

    let mut all_x: Vec<f64> = Vec::new();
    let mut all_y: Vec<f64> = Vec::new();
    let mut all_time: Vec<i64> = Vec::new();
    let mut all_cluster: Vec<&str> = Vec::new();
    let mut all_id: Vec<i64> = Vec::new();

    let mut row_id: i64 = 0;
    for &(name, cx, cy, spread, n) in &clusters {
        for _ in 0..n {
            all_x.push(rng.gauss(cx, spread));
            all_y.push(rng.gauss(cy, spread));
            all_time.push(start_ms + row_id * hour_ms);
            all_cluster.push(name);
            all_id.push(row_id);
            row_id += 1;
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("time", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("cluster", DataType::Utf8, false),
        Field::new("id", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(all_x)),
            Arc::new(Float64Array::from(all_y)),
            Arc::new(TimestampMillisecondArray::from(all_time)),
            Arc::new(StringArray::from(all_cluster)),
            Arc::new(Int64Array::from(all_id)),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_points.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {row_id} points in {} clusters to {output_path}", clusters.len());
}
