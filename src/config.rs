use crate::cli::Cli;
use crate::query::FilterSpec;
use crate::types::BodyFormat;
use std::path::PathBuf;

/// Everything a run needs, parsed once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub filter: FilterSpec,
    pub format: BodyFormat,
    pub output_dir: Option<PathBuf>,
    pub client_secret_path: PathBuf,
    pub token_cache_path: PathBuf,
}

// An empty flag value filters nothing
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            filter: FilterSpec {
                sender: non_empty(cli.from),
                subject: non_empty(cli.subject),
                after: non_empty(cli.after),
                before: non_empty(cli.before),
                older_than: non_empty(cli.older_than),
                newer_than: non_empty(cli.newer_than),
            },
            format: cli.format,
            output_dir: cli.dir,
            client_secret_path: cli.client_secret,
            token_cache_path: cli.token_cache,
        }
    }
}
