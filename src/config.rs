//! TOML-backed simulator configuration.
//!
//! A missing config file is equivalent to every section being absent, which
//! in turn means every field falls back to its `#[serde(default = ...)]`,
//! matching spec.md §4.4's "default all 1" rule for stage latencies.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub reservation_station: ReservationStationConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Per-stage latency, in order `[IF, ID, EX, MEM, WB]`.
    #[serde(default = "default_phase_cycles")]
    pub phase_cycles: [i32; 5],

    #[serde(default)]
    pub show_chronogram: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            phase_cycles: default_phase_cycles(),
            show_chronogram: false,
        }
    }
}

fn default_phase_cycles() -> [i32; 5] {
    [1, 1, 1, 1, 1]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReservationStationConfig {
    #[serde(default = "default_scalability")]
    pub scalability: usize,

    #[serde(default = "default_latency")]
    pub add_latency: i32,

    #[serde(default = "default_latency")]
    pub mult_latency: i32,

    #[serde(default = "default_latency")]
    pub memory_latency: i32,
}

impl Default for ReservationStationConfig {
    fn default() -> Self {
        Self {
            scalability: default_scalability(),
            add_latency: default_latency(),
            mult_latency: default_latency(),
            memory_latency: default_latency(),
        }
    }
}

fn default_scalability() -> usize {
    1
}

fn default_latency() -> i32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "default_size_words")]
    pub size_words: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_words: default_size_words(),
        }
    }
}

fn default_size_words() -> usize {
    2048
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_every_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.pipeline.phase_cycles, [1, 1, 1, 1, 1]);
        assert_eq!(cfg.reservation_station.scalability, 1);
        assert_eq!(cfg.memory.size_words, 2048);
    }

    #[test]
    fn partial_section_fills_remaining_fields() {
        let cfg: Config = toml::from_str("[reservation_station]\nscalability = 5\n").unwrap();
        assert_eq!(cfg.reservation_station.scalability, 5);
        assert_eq!(cfg.reservation_station.add_latency, 1);
    }
}
