//! Site Logo Fetching
//!
//! Resolves a site's favicon from its HTML and well-known paths, validates the
//! bytes, optionally removes the background and stores the result.

mod background;
mod fetcher;
mod html;
mod signature;

#[cfg(test)]
mod tests;

pub use fetcher::{decode_data_uri, normalize_site_url, FetchedLogo, LogoFetcher};
pub use signature::{sniff, ImageKind};

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Invalid site URL: {0}")]
    InvalidUrl(String),

    #[error("No usable icon found for {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("Icon larger than {0} bytes")]
    TooLarge(usize),

    #[error("Malformed data URI")]
    InvalidDataUri,

    #[error("Background removal failed: {0}")]
    Background(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
