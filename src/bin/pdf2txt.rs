//! Print the text of a PDF page by page.
//!
//! Usage:
//!   pdf2txt <file.pdf>
//!   pdf2txt <file.pdf> --json
//!
//! Set `RUST_LOG=debug` for parser diagnostics.

use pdftext::layout::TextAccumulator;
use pdftext::PdfDocument;
use std::path::PathBuf;
use std::process::ExitCode;

struct Config {
    input: PathBuf,
    json: bool,
}

impl Config {
    fn from_args() -> Option<Self> {
        let mut input = None;
        let mut json = false;

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--json" => json = true,
                _ if input.is_none() => input = Some(PathBuf::from(&arg)),
                other => {
                    log::warn!("Ignoring extra argument {}", other);
                },
            }
        }

        input.map(|input| Self { input, json })
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let doc = PdfDocument::open(&config.input)?;
    let total = doc.page_count()?;
    println!("I see {} pages.", total);

    let mut text = TextAccumulator::new();
    for number in 1..=total {
        let page = match doc.page(number)? {
            Some(page) => page,
            None => {
                log::warn!("Page {} is missing from the page tree", number);
                continue;
            },
        };
        let content = page.content()?;

        if config.json {
            println!("{}", serde_json::to_string(&content.text)?);
        }
        text.add_page(&content.text);
        println!("after page {} the text is: {}", number, text.as_str());
    }

    log::info!("Parsed {} objects", doc.parse_count());
    println!("text: {}", text.collapsed());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match Config::from_args() {
        Some(config) => config,
        None => {
            eprintln!("Usage: pdf2txt <file.pdf> [--json]");
            return ExitCode::from(2);
        },
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}: {}", config.input.display(), e);
            ExitCode::FAILURE
        },
    }
}
