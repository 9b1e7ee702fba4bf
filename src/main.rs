use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mbzkit::project::Project;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build Moodle quiz backups (.mbz) from JSON question banks", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a project as a Moodle backup archive
    Export {
        #[arg(value_name = "PROJECT_JSON")]
        project: Utf8PathBuf,
        /// Output path; the extension is forced to .mbz
        #[arg(short, long, value_name = "OUT")]
        output: Utf8PathBuf,
        /// Override the quiz title from the project
        #[arg(long)]
        title: Option<String>,
    },
    /// Export a project as a Moodle XML question file
    Xml {
        #[arg(value_name = "PROJECT_JSON")]
        project: Utf8PathBuf,
        #[arg(short, long, value_name = "OUT")]
        output: Utf8PathBuf,
    },
    /// Read a .mbz, backup questions.xml, or Moodle XML file into a project
    Import {
        #[arg(value_name = "FILE")]
        input: Utf8PathBuf,
        /// Write the project JSON here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<Utf8PathBuf>,
    },
    /// Validate a project without writing anything
    Check {
        #[arg(value_name = "PROJECT_JSON")]
        project: Utf8PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export {
            project,
            output,
            title,
        } => {
            let mut loaded = Project::load(&project)?;
            if let Some(title) = title {
                loaded.quiz.title = title;
            }
            let meta = loaded.metadata(chrono::Utc::now());
            let written = mbzkit::export_mbz(&loaded.bank(), &meta, &output)
                .with_context(|| format!("Failed to export {}", project))?;
            println!("{}", written);
        }
        Command::Xml { project, output } => {
            let loaded = Project::load(&project)?;
            let xml = mbzkit::generate_moodle_xml(&loaded.bank())
                .with_context(|| format!("Failed to convert {}", project))?;
            std::fs::write(&output, xml).with_context(|| format!("Failed to write {}", output))?;
            println!("{}", output);
        }
        Command::Import { input, output } => {
            let bank = mbzkit::import_path(&input).with_context(|| format!("Failed to import {}", input))?;
            let json = Project::from_bank(bank).to_json()?;
            match output {
                Some(path) => std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?,
                None => println!("{}", json),
            }
        }
        Command::Check { project } => {
            let loaded = Project::load(&project)?;
            let bank = loaded.bank();
            bank.validate().with_context(|| format!("{} is not exportable", project))?;
            loaded
                .metadata(chrono::DateTime::UNIX_EPOCH)
                .validate()
                .with_context(|| format!("{} has invalid quiz settings", project))?;
            println!("{}: {} questions OK", project, bank.questions.len());
        }
    }
    Ok(())
}
