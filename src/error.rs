//! Typed errors for the validation paths callers need to tell apart.
//! Plain I/O plumbing returns `color_eyre::Result` instead.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("Site name is required")]
    MissingSiteName,

    #[error("Invalid entry date: {0}")]
    InvalidDate(String),

    #[error("Mood rating must be between 1 and 5, got {0}")]
    MoodOutOfRange(u8),
}

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("You can add a maximum of {0} photos")]
    LimitReached(usize),

    #[error("Only image files can be attached ({0})")]
    NotAnImage(String),

    #[error("Photo is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("You need to be signed in to upload photos")]
    NotAuthenticated,

    #[error("Upload failed: {0}")]
    Upload(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum PriceParseError {
    #[error("Price feed is not a JSON object or array")]
    NotAnObject,

    #[error("Metal record has no name")]
    MissingName,

    #[error("No price field found for {0}")]
    MissingPrice(String),

    #[error("Price for {metal} is not a usable number: {raw}")]
    InvalidPrice { metal: String, raw: String },
}
