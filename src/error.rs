use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("could not read {path}: {source}")]
    ConfigFile { path: PathBuf, source: io::Error },
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid [table] configuration: {0}")]
    Table(#[from] lib_2048::ConfigError),
    #[error("invalid [brew] configuration: {0}")]
    Brew(#[from] lib_brew::ConfigError),
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("could not build the key decoder: {0}")]
    Decoder(#[from] aho_corasick::BuildError),
    #[error("standard input is not a terminal")]
    NotATerminal,
}
