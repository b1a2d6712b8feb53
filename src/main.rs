use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use serde::Serialize;

use loki_ini::{IniFile, ParseMode, ParseOptions};

/// Inspect and edit Windows-style INI files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// INI file to operate on
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Treat the file as a flat, section-less user registry
    #[arg(long)]
    registry: bool,

    /// Do not split `value ;comment` on the same line
    #[arg(long)]
    no_inline_comments: bool,

    /// Write changes here instead of back to FILE
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of a key
    Get { section: String, key: String },
    /// Add or replace a key
    Set {
        section: String,
        key: String,
        value: String,
    },
    /// Remove a key, and its section once no keys are left
    Remove { section: String, key: String },
    /// List section names
    Sections,
    /// Print every key of a section
    List { section: String },
    /// Print the whole file
    Dump {
        /// Emit JSON instead of INI text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SectionDump<'a> {
    name: Option<&'a str>,
    entries: Vec<(&'a str, &'a str)>,
}

/// `-` addresses the anonymous pseudo-section
fn section_arg(section: &str) -> Option<&str> {
    if section == "-" {
        None
    } else {
        Some(section)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();
    let options = ParseOptions {
        mode: if args.registry {
            ParseMode::Registry
        } else {
            ParseMode::Strict
        },
        inline_comments: !args.no_inline_comments,
    };

    let mut ini = IniFile::open_or_empty(&args.file, options)
        .with_context(|| format!("cannot load {}", args.file.display()))?;

    match &args.command {
        Command::Get { section, key } => match ini.get_string(section_arg(section), key) {
            Some(value) => println!("{}", value),
            None => bail!("unknown key/section: [{}] {}", section, key),
        },
        Command::Set {
            section,
            key,
            value,
        } => ini.put_string(section_arg(section), key, value)?,
        Command::Remove { section, key } => ini.remove_line(section_arg(section), key)?,
        Command::Sections => {
            let mut name = ini.first_section_name().map(str::to_string);
            while let Some(n) = name {
                println!("{}", n);
                name = ini.next_section_name().map(str::to_string);
            }
        }
        Command::List { section } => {
            let count = ini.for_each_pair(section_arg(section), |key, value| {
                println!("{} = {}", key, value);
            });
            if count == 0 && ini.section(section_arg(section)).is_none() {
                bail!("section not found in file: {}", section);
            }
        }
        Command::Dump { json: false } => print!("{}", ini),
        Command::Dump { json: true } => {
            let dump: Vec<SectionDump> = ini
                .sections()
                .iter()
                .map(|s| SectionDump {
                    name: s.name(),
                    entries: s
                        .lines()
                        .iter()
                        .filter_map(|l| l.key().map(|k| (k, l.value())))
                        .collect(),
                })
                .filter(|s| s.name.is_some() || !s.entries.is_empty())
                .collect();
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    if ini.has_changed() {
        ini.write(args.output.as_deref())?;
        info!(
            "File {} has been written.",
            args.output.as_ref().unwrap_or(&args.file).display()
        );
    }
    ini.close();
    Ok(())
}
