use anyhow::{Context, Result};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const SENSOR_MARKER: &str = "Sensor Value:";

/// Extracts the integer from a `Sensor Value: <n>` line.
pub fn parse_sensor_line(line: &str) -> Option<i64> {
    if !line.contains(SENSOR_MARKER) {
        return None;
    }
    line.split(':').nth(1)?.trim().parse().ok()
}

/// Mean of the window, midpoint rounded to even.
pub fn average(samples: &[i64]) -> Option<i64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    Some((sum / samples.len() as f64).round_ties_even() as i64)
}

/// Where sensor lines come from.
pub enum SensorSource {
    /// Line-oriented device (serial port, pipe, file). Only the most recent
    /// line buffered since the previous read is kept.
    Device { latest: Arc<Mutex<Option<String>>> },
    /// Random readings, for running without hardware.
    Simulated { base: i64 },
}

impl SensorSource {
    /// Opens `path` and spawns a task that keeps its latest line.
    pub async fn open_device(path: PathBuf) -> Result<Self> {
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("could not open {}", path.display()))?;
        info!("Sensor device opened on {}", path.display());

        let latest = Arc::new(Mutex::new(None));
        let slot = latest.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(file).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        *slot.lock().await = Some(line);
                    }
                    Ok(None) => {
                        info!("Sensor device {} closed", path.display());
                        break;
                    }
                    Err(e) => {
                        error!("Read error on {}: {}", path.display(), e);
                        break;
                    }
                }
            }
        });

        Ok(SensorSource::Device { latest })
    }

    pub fn simulated() -> Self {
        SensorSource::Simulated { base: 500 }
    }

    /// Takes the latest line, clearing whatever was buffered.
    pub async fn read_line(&mut self) -> Option<String> {
        match self {
            SensorSource::Device { latest } => latest.lock().await.take(),
            SensorSource::Simulated { base } => {
                let mut rng = rand::thread_rng();
                *base = (*base + rng.gen_range(-5..=5)).clamp(0, 1023);
                Some(format!("{} {}", SENSOR_MARKER, base))
            }
        }
    }
}

/// Collects samples between uploads.
#[derive(Debug, Default)]
pub struct Sampler {
    samples: Vec<i64>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value carried by `line`, if any.
    pub fn record(&mut self, line: Option<String>) -> Option<i64> {
        let Some(line) = line else {
            warn!("No valid data found in buffer");
            return None;
        };

        match parse_sensor_line(&line) {
            Some(value) => {
                debug!("Latest data: {}", value);
                self.samples.push(value);
                Some(value)
            }
            None => {
                warn!("Ignoring sensor line {:?}", line);
                None
            }
        }
    }

    /// Averages and clears the window.
    pub fn drain_average(&mut self) -> Option<i64> {
        let avg = average(&self.samples);
        self.samples.clear();
        avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sensor_line() {
        assert_eq!(parse_sensor_line("Sensor Value: 512"), Some(512));
        assert_eq!(parse_sensor_line("Sensor Value:7\r"), Some(7));
        assert_eq!(parse_sensor_line("Sensor Value: abc"), None);
        assert_eq!(parse_sensor_line("booting..."), None);
    }

    #[test]
    fn test_average_rounds_half_to_even() {
        assert_eq!(average(&[1, 2]), Some(2));
        assert_eq!(average(&[2, 3]), Some(2));
        assert_eq!(average(&[10, 20, 31]), Some(20));
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn test_sampler_window() {
        let mut sampler = Sampler::new();
        assert_eq!(sampler.record(Some("Sensor Value: 100".to_string())), Some(100));
        assert_eq!(sampler.record(Some("noise".to_string())), None);
        assert_eq!(sampler.record(None), None);
        assert_eq!(sampler.record(Some("Sensor Value: 104".to_string())), Some(104));

        assert_eq!(sampler.drain_average(), Some(102));
        assert_eq!(sampler.drain_average(), None);
    }

    #[tokio::test]
    async fn test_simulated_source_produces_sensor_lines() {
        let mut source = SensorSource::simulated();
        for _ in 0..10 {
            let line = source.read_line().await.unwrap();
            let value = parse_sensor_line(&line).unwrap();
            assert!((0..=1023).contains(&value));
        }
    }

    #[tokio::test]
    async fn test_device_source_keeps_latest_line() {
        let path = std::env::temp_dir().join(format!("sensor-{}.log", std::process::id()));
        tokio::fs::write(&path, "Sensor Value: 1\nSensor Value: 2\nSensor Value: 3\n")
            .await
            .unwrap();

        let mut source = SensorSource::open_device(path.clone()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(source.read_line().await.as_deref(), Some("Sensor Value: 3"));
        assert_eq!(source.read_line().await, None);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
