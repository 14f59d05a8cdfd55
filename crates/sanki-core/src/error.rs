// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::store::StoreError;

#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorReport {
            message: msg.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport {
            message: format!("I/O error: {value:#?}"),
        }
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport {
            message: format!("JSON error: {value:#?}"),
        }
    }
}

impl From<StoreError> for ErrorReport {
    fn from(value: StoreError) -> Self {
        ErrorReport {
            message: format!("storage error: {value}"),
        }
    }
}

impl From<ReviewError> for ErrorReport {
    fn from(value: ReviewError) -> Self {
        ErrorReport {
            message: value.to_string(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {
    fn description(&self) -> &str {
        &self.message
    }
}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport {
        message: msg.into(),
    })
}

/// The ways a review submission can fail. Every variant is scoped to a single
/// submission.
#[derive(Debug, PartialEq)]
pub enum ReviewError {
    /// The request itself is malformed: quality out of range, bad identifier,
    /// unusable flashcard content. Never retried.
    Validation(String),
    /// The caller could not be identified, or does not own the flashcard. The
    /// two cases are deliberately indistinguishable.
    Unauthorized,
    /// The flashcard or review store failed. The whole submission may be
    /// retried by the caller.
    Storage(StoreError),
}

impl ReviewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ReviewError::Validation(msg.into())
    }

    /// Whether retrying the same submission could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReviewError::Storage(_))
    }
}

impl Display for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::Validation(msg) => write!(f, "invalid request: {msg}"),
            ReviewError::Unauthorized => write!(f, "not authorized"),
            ReviewError::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ReviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReviewError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ReviewError {
    fn from(value: StoreError) -> Self {
        ReviewError::Storage(value)
    }
}
