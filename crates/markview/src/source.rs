//! Markdown input sources.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ureq::Agent;

use crate::error::CliError;

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Where the markdown comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Source {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl Source {
    /// Interpret a command-line argument: `-` is stdin, `http(s)://` (any
    /// case) is a URL, anything else a path.
    pub(crate) fn parse(arg: &str) -> Self {
        if arg == "-" {
            return Self::Stdin;
        }
        for scheme in SCHEMES {
            if arg
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
            {
                return Self::Url(format!("{scheme}{}", &arg[scheme.len()..]));
            }
        }
        Self::File(PathBuf::from(arg))
    }

    /// Read the whole source as UTF-8 text.
    ///
    /// All reads run on the blocking pool. Remote sources use `timeout` as
    /// the overall request deadline.
    pub(crate) async fn read(&self, timeout: Duration) -> Result<String, CliError> {
        match self {
            Self::Stdin => read_blocking(|| std::io::read_to_string(std::io::stdin())).await,
            Self::File(path) => {
                let path = path.clone();
                read_blocking(move || std::fs::read_to_string(path)).await
            }
            Self::Url(url) => {
                tracing::info!(%url, "Fetching markdown");
                let fetch_url = url.clone();
                let result = tokio::task::spawn_blocking(move || fetch(&fetch_url, timeout))
                    .await
                    .map_err(|e| CliError::Fetch {
                        url: url.clone(),
                        message: e.to_string(),
                    })?;
                if let Err(err) = &result {
                    tracing::warn!(%url, error = %err, "Fetch failed");
                }
                result
            }
        }
    }
}

/// Run a local read on the blocking pool.
async fn read_blocking<F>(read: F) -> Result<String, CliError>
where
    F: FnOnce() -> io::Result<String> + Send + 'static,
{
    let text = tokio::task::spawn_blocking(read)
        .await
        .map_err(io::Error::other)??;
    Ok(text)
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// GET `url` and return the body as text.
fn fetch(url: &str, timeout: Duration) -> Result<String, CliError> {
    let fetch_error = |message: String| CliError::Fetch {
        url: url.to_owned(),
        message,
    };

    let response = create_agent(timeout)
        .get(url)
        .call()
        .map_err(|e| fetch_error(e.to_string()))?;

    let status = response.status().as_u16();
    if status >= 400 {
        return Err(fetch_error(format!("HTTP {status}")));
    }

    response
        .into_body()
        .read_to_string()
        .map_err(|e| fetch_error(e.to_string()))
}
