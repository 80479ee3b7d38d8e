//! Command line front end for dicom-generator.
//!
//! ```text
//! dicomgen convert to-json image.dcm --description "thorax slice"
//! dicomgen convert to-dicom image_template.json --output-file image.dcm
//! dicomgen generate out/ --count 10 --seed 42
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dicom_generator::limits::{CONVERTED_DESCRIPTION, DEFAULT_BULK_DATA_THRESHOLD};
use dicom_generator::{ConvertOptions, annotated_to_dicom, to_annotated_dataset, tools};
use rand::SeedableRng;
use rand::rngs::StdRng;

const DEFAULT_FILTER: &str = "dicom_generator=info,dicomgen=info";

#[derive(Parser, Debug)]
#[command(name = "dicomgen")]
#[command(version, about = "Generate and convert synthetic DICOM files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert between DICOM files and annotated JSON
    #[command(subcommand)]
    Convert(ConvertCommand),
    /// Write generated CT files to a directory
    Generate {
        /// Directory to write to, created if missing
        output_dir: PathBuf,
        /// Number of files
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum ConvertCommand {
    /// Convert a DICOM file to an annotated JSON document
    #[command(alias = "to_json")]
    ToJson {
        /// DICOM file to read
        input: PathBuf,
        /// Defaults to <stem>_template.json next to the input
        #[arg(long, alias = "output_file")]
        output_file: Option<PathBuf>,
        /// Replace pixel data with a placeholder image (default)
        #[arg(long, overrides_with = "no_replace_image_data")]
        replace_image_data: bool,
        /// Keep the original pixel data
        #[arg(long, overrides_with = "replace_image_data")]
        no_replace_image_data: bool,
        /// Image to use instead of the built-in placeholder
        #[arg(long)]
        image: Option<PathBuf>,
        /// Description stored in the document
        #[arg(long, default_value = CONVERTED_DESCRIPTION)]
        description: String,
        /// Payloads longer than this many bytes go to <stem>_bulk/
        #[arg(long, default_value_t = DEFAULT_BULK_DATA_THRESHOLD)]
        bulk_threshold: usize,
    },
    /// Convert a JSON document, annotated or bare, to a DICOM file
    #[command(alias = "to_dicom")]
    ToDicom {
        /// JSON document to read
        input: PathBuf,
        /// Defaults to <stem>.dcm next to the input
        #[arg(long, alias = "output_file")]
        output_file: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert(ConvertCommand::ToJson {
            input,
            output_file,
            no_replace_image_data,
            image,
            description,
            bulk_threshold,
            ..
        }) => {
            let mut options = ConvertOptions::new()
                .with_description(description)
                .with_replace_pixel_data(!no_replace_image_data)
                .with_bulk_data_threshold(bulk_threshold);
            if let Some(path) = output_file {
                options = options.with_output_path(path);
            }
            if let Some(path) = image {
                options = options.with_image_path(path);
            }
            let written = to_annotated_dataset(&input, &options)
                .with_context(|| format!("converting {}", input.display()))?;
            println!("{}", written.display());
        }
        Commands::Convert(ConvertCommand::ToDicom { input, output_file }) => {
            let written = annotated_to_dicom(&input, output_file.as_deref())
                .with_context(|| format!("converting {}", input.display()))?;
            println!("{}", written.display());
        }
        Commands::Generate {
            output_dir,
            count,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let written = tools::generate_ct_files(&output_dir, count, &mut rng)
                .with_context(|| format!("generating into {}", output_dir.display()))?;
            tracing::info!(count = written.len(), dir = %output_dir.display(), "generated files");
            for path in written {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<dicom_generator::Error>() {
                Some(e) => eprintln!("error[{}]: {err:#}", e.kind().code()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
