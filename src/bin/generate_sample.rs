//! Generate sample HWiNFO-style logs for manual testing:
//! `sample_stable.csv` (constant schema) and `sample_drift.csv` (a sensor
//! comes online mid-session and widens every later row).
//!
//! Run with: cargo run --bin generate_sample

use std::io::Write;

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

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Centered noise in [-amplitude, amplitude].
    fn noise(&mut self, amplitude: f64) -> f64 {
        (self.uniform() * 2.0 - 1.0) * amplitude
    }
}

/// One synthetic sensor: name plus a value model.
struct Sensor {
    name: &'static str,
    base: f64,
    swing: f64,
    noise: f64,
    /// Sample index at which the sensor comes online (0 = from the start).
    online_at: usize,
}

impl Sensor {
    fn value(&self, sample: usize, rng: &mut SimpleRng) -> String {
        let phase = sample as f64 / 20.0;
        let v = self.base + self.swing * phase.sin() + rng.noise(self.noise);
        format!("{v:.1}")
    }
}

fn sensors(drift: bool) -> Vec<Sensor> {
    let core1_online = if drift { 40 } else { 0 };
    vec![
        Sensor { name: "Core 0 Effective Clock [MHz]", base: 3600.0, swing: 400.0, noise: 50.0, online_at: 0 },
        Sensor { name: "Core 0 Usage [%]", base: 35.0, swing: 25.0, noise: 5.0, online_at: 0 },
        Sensor { name: "CPU [°C]", base: 55.0, swing: 12.0, noise: 1.5, online_at: 0 },
        Sensor { name: "Vcore [V]", base: 1.25, swing: 0.08, noise: 0.01, online_at: 0 },
        Sensor { name: "CPU [RPM]", base: 1100.0, swing: 250.0, noise: 30.0, online_at: 0 },
        Sensor { name: "CPU Package Power (SMU) [W]", base: 65.0, swing: 30.0, noise: 4.0, online_at: 0 },
        Sensor { name: "Core 1 Effective Clock [MHz]", base: 3600.0, swing: 400.0, noise: 50.0, online_at: core1_online },
    ]
}

/// A row's fields, ending with the artifact field the logger always appends.
fn join_row(fields: &[String], separator: char) -> String {
    let mut line = String::new();
    for field in fields {
        line.push_str(field);
        line.push(separator);
    }
    line
}

fn header_fields(sensors: &[Sensor], upto: usize) -> Vec<String> {
    let mut fields = vec!["Date".to_string(), "Time".to_string()];
    fields.extend(
        sensors
            .iter()
            .filter(|s| s.online_at <= upto)
            .map(|s| s.name.to_string()),
    );
    fields
}

fn generate_log(drift: bool, samples: usize, rng: &mut SimpleRng) -> String {
    let sensors = sensors(drift);
    let mut lines = Vec::with_capacity(samples + 3);

    // The opening header only covers the sensors present at start of capture.
    lines.push(join_row(&header_fields(&sensors, 0), ','));

    for sample in 0..samples {
        let mut fields = vec![
            "6.8.2026".to_string(),
            format!("14:30:{:02}.{:03}", sample / 10, (sample % 10) * 100),
        ];
        fields.extend(
            sensors
                .iter()
                .filter(|s| s.online_at <= sample)
                .map(|s| s.value(sample, rng)),
        );
        lines.push(join_row(&fields, ','));
    }

    // End-of-file trailer: the complete header rewrite plus a summary row.
    let full_header = header_fields(&sensors, samples);
    lines.push(join_row(&full_header, ','));
    let mut summary = vec!["Average".to_string(), String::new()];
    summary.extend(sensors.iter().map(|s| format!("{:.1}", s.base)));
    lines.push(join_row(&summary, ','));

    let mut content = lines.join("\r\n");
    content.push_str("\r\n");
    content
}

/// HWiNFO writes Latin-1; map each char back to its single byte.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 256 {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn write_log(path: &str, drift: bool, rng: &mut SimpleRng) -> std::io::Result<()> {
    let content = generate_log(drift, 120, rng);
    let mut file = std::fs::File::create(path)?;
    file.write_all(&encode_latin1(&content))?;
    println!("wrote {path}");
    Ok(())
}

fn main() -> std::io::Result<()> {
    let mut rng = SimpleRng::new(0x4857_494e_464f);
    write_log("sample_stable.csv", false, &mut rng)?;
    write_log("sample_drift.csv", true, &mut rng)?;
    Ok(())
}
