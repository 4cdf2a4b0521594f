use crate::error::Result;
use crate::gmail_api::{CredentialStore, FileCredentialStore};
use crate::types::BodyFormat;
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

// Long flags that are also accepted with a single leading dash
const SINGLE_DASH_FLAGS: &[&str] = &[
    "frm",
    "sub",
    "after",
    "before",
    "older_than",
    "newer_than",
    "dir",
    "type",
];

#[derive(Parser, Debug)]
#[clap(author, version, about = "Export Gmail inbox messages to disk", long_about = None)]
pub struct Cli {
    /// Only messages from this address.
    #[clap(long = "frm", value_name = "MAIL_ADDRESS")]
    pub from: Option<String>,

    /// Subject to search for, with underscores in place of spaces.
    #[clap(long = "sub", value_name = "SUBJECT_LINE")]
    pub subject: Option<String>,

    /// Only messages after this date (YYYY/MM/DD).
    #[clap(long)]
    pub after: Option<String>,

    /// Only messages before this date (YYYY/MM/DD).
    #[clap(long)]
    pub before: Option<String>,

    /// Only messages older than <INT>(d/m/y).
    #[clap(long = "older_than")]
    pub older_than: Option<String>,

    /// Only messages newer than <INT>(d/m/y).
    #[clap(long = "newer_than")]
    pub newer_than: Option<String>,

    /// Existing directory to export into (relative path).
    #[clap(long = "dir")]
    pub dir: Option<PathBuf>,

    /// Body to keep for multipart messages.
    #[clap(long = "type", value_enum, default_value_t = BodyFormat::Plain)]
    pub format: BodyFormat,

    /// OAuth client secret downloaded from the Google Cloud console.
    #[clap(long, default_value = "credentials.json")]
    pub client_secret: PathBuf,

    /// File the OAuth token is cached in between runs.
    #[clap(long, default_value = "token.json")]
    pub token_cache: PathBuf,

    /// Delete the cached token and exit.
    #[clap(long)]
    pub clear_token: bool,
}

/// Rewrites `-frm value` style arguments to `--frm value` so clap accepts them.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = text.strip_prefix('-').filter(|f| !f.starts_with('-')) else {
                return arg;
            };
            let name = flag.split('=').next().unwrap_or(flag);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

pub fn handle_token_clear(token_cache: &Path) -> Result<()> {
    let store = FileCredentialStore::new(token_cache);
    if store.clear()? {
        println!("Removed cached token {}.", token_cache.display());
    } else {
        println!("No cached token at {}.", token_cache.display());
    }
    Ok(())
}
