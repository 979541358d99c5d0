//! zh-wordlist command line entry point
//!
//! Natively the word list lives in a JSON file in the platform data
//! directory. The browser build is driven through `WordlistWidget` instead.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow, bail};
    use clap::{Parser, Subcommand};

    use zh_wordlist::display;
    use zh_wordlist::persistence::export;
    use zh_wordlist::persistence::remote::RemoteClient;
    use zh_wordlist::platform;
    use zh_wordlist::{JsonFileStorage, RatingField, Settings, WordStore};

    /// Personal vocabulary list
    #[derive(Parser)]
    #[command(name = "zh-wordlist")]
    #[command(about = "Track vocabulary with recall/production ratings", long_about = None)]
    #[command(version)]
    struct Cli {
        /// Custom data directory (defaults to platform-specific location)
        #[arg(short, long, global = true, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Add a word, or record another encounter with a known word
        Add {
            word: String,
            /// Group for a new word (defaults to the configured default group)
            #[arg(short, long)]
            group: Option<String>,
        },
        /// Set a rating (values outside 0-5 are clamped)
        Rate {
            word: String,
            #[arg(value_parser = parse_field)]
            field: RatingField,
            #[arg(allow_negative_numbers = true)]
            value: i64,
        },
        /// Advance a rating by one, wrapping back to 0 after 5
        Cycle {
            word: String,
            #[arg(value_parser = parse_field)]
            field: RatingField,
        },
        /// Remove a word
        Rm { word: String },
        /// Set the lemma of a word; omit it to clear
        Lemma { word: String, lemma: Option<String> },
        /// Add the word to a group, or remove it if already a member
        Group { word: String, group: String },
        /// List all words
        List,
        /// Export the word list to a pretty-printed JSON file
        Export {
            /// Output directory (defaults to the current directory)
            #[arg(short, long, value_name = "DIR")]
            out: Option<PathBuf>,
        },
        /// Replace the word list with an exported file
        Import { file: PathBuf },
        /// Upload the word list to an account endpoint
        Push { endpoint: Option<String> },
        /// Replace the word list with the one stored at an account endpoint
        Pull { endpoint: Option<String> },
    }

    fn parse_field(s: &str) -> std::result::Result<RatingField, String> {
        RatingField::from_str(s).ok_or_else(|| format!("expected recall or production, got '{}'", s))
    }

    fn report(changed: bool, word: &str) {
        if !changed {
            println!("'{}' is not in the word list", word);
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let data_dir = cli.data_dir.unwrap_or_else(platform::data_dir);
        let settings = Settings::load_from(&data_dir);
        let data_dir = settings.data_dir.clone().unwrap_or(data_dir);

        let storage = JsonFileStorage::new(&data_dir, &settings.storage_key)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        let path = storage.path().to_path_buf();
        let mut store = WordStore::open(storage)
            .with_context(|| format!("Failed to load word list {}", path.display()))?
            .with_default_group(&settings.default_group);

        match cli.command {
            Command::Add { word, group } => {
                let added = match group {
                    Some(group) => store.add_word_to_group(&word, &group),
                    None => store.add_word(&word),
                };
                if !added {
                    bail!("Word must not be empty");
                }
                if let Some(record) = store.get(&word) {
                    println!("{} (seen {} times)", word.trim(), record.timestamps.len());
                }
            }
            Command::Rate { word, field, value } => {
                let changed = store.update_rating(&word, field, value);
                report(changed, &word);
            }
            Command::Cycle { word, field } => {
                let changed = store.cycle_rating(&word, field);
                report(changed, &word);
            }
            Command::Rm { word } => {
                let changed = store.remove_word(&word);
                report(changed, &word);
            }
            Command::Lemma { word, lemma } => {
                let changed = store.set_lemma(&word, lemma.as_deref());
                report(changed, &word);
            }
            Command::Group { word, group } => {
                let changed = store.toggle_group(&word, &group);
                report(changed, &word);
            }
            Command::List => {
                let now = store.now_millis();
                for (word, record) in store.words() {
                    println!("{}", display::format_row(word, record, now));
                }
                println!("{} words", store.len());
            }
            Command::Export { out } => {
                let dir = out.unwrap_or_else(|| PathBuf::from("."));
                let path = export::write_to_dir(&dir, store.snapshot(), store.now_millis())
                    .context("Failed to export word list")?;
                println!("Exported {} words to {}", store.len(), path.display());
            }
            Command::Import { file } => {
                let snapshot = export::read_file(&file)
                    .with_context(|| format!("Failed to import {}", file.display()))?;
                store.replace_all(snapshot);
                println!("Imported {} words", store.len());
            }
            Command::Push { endpoint } => {
                let endpoint = settings
                    .endpoint(endpoint.as_deref())
                    .ok_or_else(|| anyhow!("No endpoint given and none configured"))?;
                RemoteClient::new()
                    .save_account(endpoint, store.snapshot())
                    .with_context(|| format!("Failed to upload to {}", endpoint))?;
                println!("Uploaded {} words", store.len());
            }
            Command::Pull { endpoint } => {
                let endpoint = settings
                    .endpoint(endpoint.as_deref())
                    .ok_or_else(|| anyhow!("No endpoint given and none configured"))?;
                let snapshot = RemoteClient::new()
                    .load_account(endpoint)
                    .with_context(|| format!("Failed to download from {}", endpoint))?;
                store.replace_all(snapshot);
                println!("Downloaded {} words", store.len());
            }
        }

        store
            .save()
            .with_context(|| format!("Failed to save word list {}", path.display()))?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::debug!("zh-wordlist (native) starting...");
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is zh_wordlist::web::start, this is just to satisfy the compiler
}
