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

use clap::Parser;
use sanki_core::error::Fallible;

use crate::cmd::delete::delete_card;
use crate::cmd::import::import_cards;
use crate::cmd::init::init_collection;
use crate::cmd::list::OutputFormat;
use crate::cmd::list::list_cards;
use crate::cmd::list::list_due;
use crate::cmd::review::review_card;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Create a collection with a template configuration and an empty database.
    Init {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Import generated flashcards from a JSON file.
    Import {
        /// Path to a JSON array of `{"question": ..., "response": ...}` objects.
        file: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Access token of the learner who will own the cards.
        #[arg(long, env = "SANKI_TOKEN")]
        token: String,
        /// Identifier of the source document. By default, a new one is generated.
        #[arg(long)]
        document: Option<String>,
    },
    /// List every flashcard with its status and next review time.
    List {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Access token of the learner.
        #[arg(long, env = "SANKI_TOKEN")]
        token: String,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the flashcards to study on a given date.
    Due {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Access token of the learner.
        #[arg(long, env = "SANKI_TOKEN")]
        token: String,
        /// Date in YYYY-MM-DD format. Default is today.
        #[arg(long)]
        date: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Record a self-assessed recall quality for a flashcard.
    Review {
        /// Identifier of the flashcard.
        flashcard: String,
        /// Recall quality from 0 (blackout) to 5 (perfect).
        #[arg(allow_negative_numbers = true)]
        quality: i64,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Access token of the learner.
        #[arg(long, env = "SANKI_TOKEN")]
        token: String,
        /// Reference date in YYYY-MM-DD format. Default is today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a flashcard and its scheduled review.
    Delete {
        /// Identifier of the flashcard.
        flashcard: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Access token of the learner.
        #[arg(long, env = "SANKI_TOKEN")]
        token: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let output = match cli {
        Command::Init { directory } => init_collection(directory)?,
        Command::Import {
            file,
            directory,
            token,
            document,
        } => import_cards(directory, token, document, file)?,
        Command::List {
            directory,
            token,
            format,
        } => list_cards(directory, token, format)?,
        Command::Due {
            directory,
            token,
            date,
            format,
        } => list_due(directory, token, date, format)?,
        Command::Review {
            flashcard,
            quality,
            directory,
            token,
            date,
        } => review_card(directory, token, flashcard, quality, date)?,
        Command::Delete {
            flashcard,
            directory,
            token,
        } => delete_card(directory, token, flashcard)?,
    };
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
