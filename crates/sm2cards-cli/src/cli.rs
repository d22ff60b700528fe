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

use std::io::stdin;
use std::io::stdout;

use clap::Parser;
use sm2cards_core::Fallible;
use sm2cards_core::SchedulerConfig;
use sm2cards_core::clock::Clock;
use sm2cards_core::clock::SystemClock;

use crate::cmd::OutputFormat;
use crate::cmd::drill::run_session;
use crate::cmd::due::list_due;
use crate::cmd::level::level;
use crate::cmd::stats::print_deck_stats;
use crate::collection::Collection;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill due cards in the terminal.
    Drill {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only drill cards from this deck.
        #[arg(long)]
        deck: Option<String>,
        /// Maximum number of cards to drill.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the cards that are due, riskiest first.
    Due {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only list cards from this deck.
        #[arg(long)]
        deck: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Spread upcoming reviews so no day is overloaded.
    Level {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Most reviews per day. Overrides the configuration file.
        #[arg(long, allow_negative_numbers = true)]
        max_per_day: Option<i64>,
        /// How many days a review may be pushed back. Overrides the configuration file.
        #[arg(long)]
        scan_days: Option<u32>,
        /// Print the moves without saving them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let clock = SystemClock;
    let mut out = stdout().lock();
    match cli {
        Command::Drill {
            directory,
            deck,
            limit,
        } => {
            let collection = Collection::new(directory, clock.now())?;
            let mut input = stdin().lock();
            run_session(
                &collection,
                &clock,
                deck.as_deref(),
                limit,
                &mut input,
                &mut out,
            )?;
            Ok(())
        }
        Command::Due {
            directory,
            deck,
            format,
        } => {
            let now = clock.now();
            let collection = Collection::new(directory, now)?;
            list_due(&collection, now, deck.as_deref(), format, &mut out)?;
            Ok(())
        }
        Command::Level {
            directory,
            max_per_day,
            scan_days,
            dry_run,
        } => {
            let now = clock.now();
            let collection = Collection::new(directory, now)?;
            let config = SchedulerConfig::new(
                max_per_day.unwrap_or(collection.config.max_per_day),
                scan_days.unwrap_or(collection.config.bounded_scan_days),
            )?;
            level(&collection, now, &config, dry_run, &mut out)?;
            Ok(())
        }
        Command::Stats { directory, format } => {
            let now = clock.now();
            let collection = Collection::new(directory, now)?;
            print_deck_stats(&collection, now, format, &mut out)?;
            Ok(())
        }
    }
}
