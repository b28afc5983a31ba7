//! Run configuration layered from defaults, an optional TOML file and flags.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use pathviz_core::RunRequest;
use pathviz_system_search::Algorithm;
use serde::Deserialize;
use thiserror::Error;

/// Smallest accepted world edge measured in cells.
const MIN_WORLD_SIZE: u32 = 8;
/// Largest accepted world edge measured in cells.
const MAX_WORLD_SIZE: u32 = 400;
/// Longest accepted pause per search step.
const MAX_STEP_DELAY_MS: u64 = 100;

const DEFAULT_WIDTH: u32 = 30;
const DEFAULT_HEIGHT: u32 = 15;
const DEFAULT_STEP_DELAY_MS: u64 = 25;
const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// Reasons a run request is refused before dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum RequestError {
    #[error("world width {0} is outside {}..={}", MIN_WORLD_SIZE, MAX_WORLD_SIZE)]
    Width(u32),
    #[error("world height {0} is outside {}..={}", MIN_WORLD_SIZE, MAX_WORLD_SIZE)]
    Height(u32),
    #[error("step delay {0} ms exceeds {} ms", MAX_STEP_DELAY_MS)]
    Delay(u64),
    #[error("batch size must be at least 1")]
    ZeroBatch,
    #[error("unknown algorithm `{0}`")]
    Algorithm(String),
}

/// Failures while loading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Optional values read from a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) boundary: Option<bool>,
    pub(crate) delay_ms: Option<u64>,
    pub(crate) batch: Option<usize>,
    pub(crate) algorithm: Option<String>,
    pub(crate) seed: Option<u64>,
}

impl Settings {
    /// Reads settings from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every unset value from `fallback`.
    #[must_use]
    pub(crate) fn or(self, fallback: Settings) -> Self {
        Self {
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
            boundary: self.boundary.or(fallback.boundary),
            delay_ms: self.delay_ms.or(fallback.delay_ms),
            batch: self.batch.or(fallback.batch),
            algorithm: self.algorithm.or(fallback.algorithm),
            seed: self.seed.or(fallback.seed),
        }
    }

    /// Validates the settings, applying defaults, into a run request.
    pub(crate) fn into_request(self) -> Result<RunRequest, RequestError> {
        let world_width = self.width.unwrap_or(DEFAULT_WIDTH);
        if !(MIN_WORLD_SIZE..=MAX_WORLD_SIZE).contains(&world_width) {
            return Err(RequestError::Width(world_width));
        }
        let world_height = self.height.unwrap_or(DEFAULT_HEIGHT);
        if !(MIN_WORLD_SIZE..=MAX_WORLD_SIZE).contains(&world_height) {
            return Err(RequestError::Height(world_height));
        }
        let delay_ms = self.delay_ms.unwrap_or(DEFAULT_STEP_DELAY_MS);
        if delay_ms > MAX_STEP_DELAY_MS {
            return Err(RequestError::Delay(delay_ms));
        }
        let max_batch_size = self.batch.unwrap_or(DEFAULT_MAX_BATCH_SIZE);
        if max_batch_size == 0 {
            return Err(RequestError::ZeroBatch);
        }
        let algorithm = match self.algorithm.as_deref() {
            Some(name) => parse_algorithm(name)?,
            None => Algorithm::AStar,
        };

        Ok(RunRequest {
            world_width,
            world_height,
            has_boundary: self.boundary.unwrap_or(true),
            step_delay: Duration::from_millis(delay_ms),
            max_batch_size,
            algorithm_index: algorithm.index(),
            seed: self.seed,
        })
    }
}

/// Resolves a registry index or an algorithm name.
pub(crate) fn parse_algorithm(value: &str) -> Result<Algorithm, RequestError> {
    let trimmed = value.trim();
    let found = match trimmed.parse::<usize>() {
        Ok(index) => Algorithm::from_index(index),
        Err(_) => Algorithm::from_name(trimmed),
    };
    found.ok_or_else(|| RequestError::Algorithm(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_animated_a_star_request() {
        let request = Settings::default().into_request().expect("defaults are valid");

        assert_eq!(request.world_width, 30);
        assert_eq!(request.world_height, 15);
        assert!(request.has_boundary);
        assert_eq!(request.step_delay, Duration::from_millis(25));
        assert_eq!(request.max_batch_size, 10);
        assert_eq!(request.algorithm_index, 0);
        assert_eq!(request.seed, None);
        assert!(request.is_animated());
    }

    #[test]
    fn earlier_layer_wins() {
        let flags = Settings {
            width: Some(50),
            ..Settings::default()
        };
        let file = Settings {
            width: Some(20),
            height: Some(40),
            ..Settings::default()
        };

        let merged = flags.or(file);

        assert_eq!(merged.width, Some(50));
        assert_eq!(merged.height, Some(40));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            (
                Settings {
                    width: Some(7),
                    ..Settings::default()
                },
                RequestError::Width(7),
            ),
            (
                Settings {
                    height: Some(401),
                    ..Settings::default()
                },
                RequestError::Height(401),
            ),
            (
                Settings {
                    delay_ms: Some(101),
                    ..Settings::default()
                },
                RequestError::Delay(101),
            ),
            (
                Settings {
                    batch: Some(0),
                    ..Settings::default()
                },
                RequestError::ZeroBatch,
            ),
            (
                Settings {
                    algorithm: Some("2".into()),
                    ..Settings::default()
                },
                RequestError::Algorithm("2".into()),
            ),
        ];

        for (settings, expected) in cases {
            assert_eq!(settings.into_request(), Err(expected));
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let settings = Settings {
            width: Some(MIN_WORLD_SIZE),
            height: Some(MAX_WORLD_SIZE),
            delay_ms: Some(MAX_STEP_DELAY_MS),
            ..Settings::default()
        };

        assert!(settings.into_request().is_ok());
    }

    #[test]
    fn algorithms_resolve_by_index_or_name() {
        assert_eq!(parse_algorithm("1"), Ok(Algorithm::Dijkstra));
        assert_eq!(parse_algorithm("astar"), Ok(Algorithm::AStar));
        assert_eq!(parse_algorithm("A*"), Ok(Algorithm::AStar));
        assert_eq!(
            parse_algorithm("greedy"),
            Err(RequestError::Algorithm("greedy".into()))
        );
    }

    #[test]
    fn toml_file_parses_partial_settings() {
        let settings: Settings = toml::from_str(
            r#"
            width = 64
            boundary = false
            algorithm = "Dijkstra"
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.width, Some(64));
        assert_eq!(settings.boundary, Some(false));
        let request = settings.into_request().expect("valid settings");
        assert!(!request.has_boundary);
        assert_eq!(request.algorithm_index, 1);
    }

    #[test]
    fn unknown_toml_fields_are_rejected() {
        let parsed: Result<Settings, _> = toml::from_str("speed = 3");

        assert!(parsed.is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = Settings::load(Path::new("/nonexistent/pathviz.toml"))
            .expect_err("missing file must fail");

        assert!(error.to_string().contains("/nonexistent/pathviz.toml"));
    }
}
