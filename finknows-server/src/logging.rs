//! Tracing setup shared by the binaries
//!
//! The log level normally comes from the config file, so the global
//! subscriber can only be installed after the file is read. Config loading
//! therefore runs under a scoped bootstrap subscriber.

use std::path::Path;

use finknows_common::config::{self, TomlConfig};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Level used before the config file has been read
pub const BOOTSTRAP_LEVEL: &str = "info";

/// `RUST_LOG` if set, else `default_level`
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Load the config file with lookup messages written to `make_writer`
pub fn load_config_with_logging<W>(
    cli_path: Option<&Path>,
    make_writer: W,
) -> finknows_common::Result<TomlConfig>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(BOOTSTRAP_LEVEL))
        .with_writer(make_writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || config::load_config(cli_path))
}
