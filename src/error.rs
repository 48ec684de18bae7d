/*
 * Error Module
 *
 * The simulation core cannot fail once it is running. The only fallible surface
 * is reading and writing parameter files.
 */

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("failed to access parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid parameter file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
