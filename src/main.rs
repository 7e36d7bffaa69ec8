use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use resume_pdf::{Error, FontSource, RenderOptions};

#[derive(Parser)]
#[command(name = "resume-pdf")]
#[command(version)]
#[command(about = "Lay out a resume request (JSON) as a paginated PDF", long_about = None)]
struct Cli {
    /// Generate-PDF request as JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PDF (defaults to INPUT with a .pdf extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Use the built-in Type1 fonts instead of searching installed fonts
    #[arg(long)]
    standard_fonts: bool,

    /// Extra directory to search for fonts (repeatable)
    #[arg(long = "font-dir", value_name = "DIR")]
    font_dirs: Vec<PathBuf>,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    let options = RenderOptions {
        fonts: if cli.standard_fonts {
            FontSource::Standard
        } else {
            FontSource::System
        },
        font_dirs: cli.font_dirs,
        compress: !cli.no_compress,
    };

    match resume_pdf::convert_json_to_pdf_with(&cli.input, &output, &options) {
        Ok(()) => {
            println!("Converted: {} -> {}", cli.input.display(), output.display());
            ExitCode::SUCCESS
        }
        Err(Error::Validation(errors)) => {
            eprintln!("Invalid request {}:", cli.input.display());
            for error in errors {
                eprintln!("  {error}");
            }
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error converting {}: {e}", cli.input.display());
            ExitCode::FAILURE
        }
    }
}
