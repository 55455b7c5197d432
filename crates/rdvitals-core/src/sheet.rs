//! Clients for the community level spreadsheet and setlists APIs.
//!
//! Plain GET + JSON decode; no retry policy. Both endpoints are Google
//! Apps Script deployments maintained by the level-sharing community.

use serde_json::Value;
use thiserror::Error;

use crate::http::{self, HttpError, HttpOptions};

/// Spreadsheet API listing every community level.
pub const SHEET_URL: &str =
    "https://script.google.com/macros/s/AKfycbzm3I9ENulE7uOmze53cyDuj7Igi7fmGiQ6w045fCRxs_sK3D4/exec";

/// Setlists API mapping setlist names to level URLs.
pub const SETLISTS_URL: &str =
    "https://script.google.com/macros/s/AKfycbzKbt6JDlvFs0jgR2AqGrjqb6UxnoXjVFmoU4QnEHbCc28Tx7rGMUG-lEm5NklqgBtX/exec";

/// Failure talking to a community API.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("unexpected API response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches all levels from the spreadsheet API. With `verified_only`, only
/// levels carrying a true `verified` flag are returned.
pub fn get_sheet_data(opts: &HttpOptions, verified_only: bool) -> Result<Vec<Value>, SheetError> {
    let body = http::get_string(opts, SHEET_URL)?;
    let mut levels: Vec<Value> = serde_json::from_str(&body)?;

    if verified_only {
        levels.retain(|level| {
            level
                .get("verified")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        });
    }

    Ok(levels)
}

/// Fetches the setlists: a mapping of setlist name to an ordered list of
/// level URLs. The endpoint reads whole spreadsheet columns, so the lists
/// arrive padded with nulls above and below the data; `trim_none` removes
/// that padding, and `keep_none` asks the endpoint to keep interior nulls.
pub fn get_setlist_urls(
    opts: &HttpOptions,
    keep_none: bool,
    trim_none: bool,
) -> Result<serde_json::Map<String, Value>, SheetError> {
    let url = format!("{SETLISTS_URL}?keepNull={keep_none}");
    let body = http::get_string(opts, &url)?;
    let mut setlists: serde_json::Map<String, Value> = serde_json::from_str(&body)?;

    if trim_none {
        for urls in setlists.values_mut() {
            if let Value::Array(list) = urls {
                *list = trim_list(std::mem::take(list));
            }
        }
    }

    Ok(setlists)
}

/// Removes falsey values (null, false, empty string) from both ends of a
/// list, leaving the interior untouched.
pub fn trim_list(mut list: Vec<Value>) -> Vec<Value> {
    fn falsey(v: &Value) -> bool {
        match v {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    while list.first().is_some_and(falsey) {
        list.remove(0);
    }
    while list.last().is_some_and(falsey) {
        list.pop();
    }
    list
}
