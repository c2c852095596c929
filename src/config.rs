use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "lisand=info";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lisand",
    version,
    about = "Oral exam sidecar: session, roster, grading and reports over stdin/stdout JSON"
)]
pub struct Config {
    /// Workspace directory to open at startup. Without it, state is kept in
    /// memory until `workspace.select`.
    #[arg(long, env = "LISAND_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// tracing filter directives, e.g. `lisand=debug`
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// URL fragment the front end was opened with.
    #[arg(long, default_value = "")]
    pub fragment: String,
}

/// Logs go to stderr; stdout carries protocol responses only.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_workspace_and_fragment() {
        let cfg = Config::try_parse_from([
            "lisand",
            "--workspace",
            "/tmp/lisan",
            "--fragment",
            "#/grading",
            "--log-filter",
            "lisand=debug",
        ])
        .expect("parse args");
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/lisan")));
        assert_eq!(cfg.fragment, "#/grading");
        assert_eq!(cfg.log_filter, "lisand=debug");
    }
}
