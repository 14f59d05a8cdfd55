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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use sanki_core::error::Fallible;
use sanki_core::service::FlashcardView;
use sanki_core::types::date::Date;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum OutputFormat {
    /// One line per flashcard.
    Text,
    /// A JSON array.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Lists all of the caller's flashcards.
pub fn list_cards(
    directory: Option<String>,
    token: String,
    format: OutputFormat,
) -> Fallible<String> {
    let service = Collection::new(directory)?.into_service();
    render(&service.flashcards(&token)?, format)
}

/// Lists the caller's flashcards to study on a date (default: today).
pub fn list_due(
    directory: Option<String>,
    token: String,
    date: Option<String>,
    format: OutputFormat,
) -> Fallible<String> {
    let date: Option<Date> = date.map(Date::try_from).transpose()?;
    let service = Collection::new(directory)?.into_service();
    let due = service.due(&token, date)?;
    if due.is_empty() && format == OutputFormat::Text {
        return Ok("No cards due.".to_string());
    }
    render(&due, format)
}

fn render(views: &[FlashcardView], format: OutputFormat) -> Fallible<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(views)?),
        OutputFormat::Text => {
            let lines: Vec<String> = views
                .iter()
                .map(|view| {
                    let next = match view.next_review_at {
                        Some(at) => at.to_string(),
                        None => "-".to_string(),
                    };
                    format!(
                        "{}\t{:<7}\t{}\t{}",
                        view.id,
                        view.status.as_str(),
                        next,
                        view.question
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
