// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Authenticated GitHub client construction.
use octocrab::Octocrab;
use tracing::debug;

use crate::error::Error;

/// Builds an [`Octocrab`] client authenticated with `token`.
///
/// `api_url` overrides the REST endpoint, e.g. for GitHub Enterprise Server
/// where the Actions runner exports `GITHUB_API_URL`.
///
/// # Errors
///
/// Returns [`Error::Config`] when the API URL is invalid and
/// [`Error::Api`] when the client cannot be initialized.
pub fn build_client(token: &str, api_url: Option<&str,>,) -> Result<Octocrab, Error,>
{
    let mut builder = Octocrab::builder().personal_token(token,);

    if let Some(url,) = api_url {
        debug!("Using GitHub API at {}", url);
        builder = builder
            .base_uri(url,)
            .map_err(|e| Error::config(format!("invalid GitHub API URL '{url}': {e}"),),)?;
    }

    builder.build().map_err(|e| Error::api(format!("failed to initialize GitHub client: {e}"),),)
}
