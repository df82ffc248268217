#[cfg(not(feature = "cli"))]
fn main() -> std::process::ExitCode {
    eprintln!("polydraft was built without the `cli` feature");
    std::process::ExitCode::from(2)
}

#[cfg(feature = "cli")]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    use clap::Parser;

    let args = cli::Args::parse();
    match cli::run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::from(2)
        }
    }
}

#[cfg(feature = "cli")]
mod cli {
    use std::{
        error::Error,
        fs::File,
        io::BufReader,
        path::{Path, PathBuf},
    };

    use clap::Parser;
    use polydraft::{Draft, ErrorDetail, Validator};
    use serde_json::Value;

    /// Validate JSON documents against a JSON Schema.
    ///
    /// The dialect is taken from the schema's `$schema` declaration when
    /// present; `--draft` covers schemas without one.
    #[derive(Parser)]
    #[command(name = "polydraft", version)]
    pub(super) struct Args {
        /// The schema document.
        schema: PathBuf,

        /// One or more documents to check against the schema.
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Fallback draft for schemas without a $schema declaration:
        /// 3, 4, 6, 7, 2019-09, 2020-12 or next.
        #[arg(long, value_parser = parse_draft)]
        draft: Option<Draft>,

        /// Fail on `format` violations even in dialects where the keyword
        /// only annotates.
        #[arg(long)]
        strict_format: bool,

        /// Reject whole-valued floats such as 1.0 where an integer is
        /// required.
        #[arg(long)]
        strict_integer: bool,

        /// Report only the first failure per document.
        #[arg(long)]
        quiet: bool,
    }

    fn parse_draft(value: &str) -> Result<Draft, String> {
        match value {
            "3" | "draft3" => Ok(Draft::Draft3),
            "4" | "draft4" => Ok(Draft::Draft4),
            "6" | "draft6" => Ok(Draft::Draft6),
            "7" | "draft7" => Ok(Draft::Draft7),
            "2019-09" | "201909" => Ok(Draft::Draft201909),
            "2020-12" | "202012" => Ok(Draft::Draft202012),
            "next" => Ok(Draft::DraftNext),
            _ => Err(format!("unknown draft {:?}", value)),
        }
    }

    fn load(path: &Path) -> Result<Value, Box<dyn Error>> {
        let file =
            File::open(path).map_err(|error| format!("{}: {}", path.display(), error))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|error| format!("{}: {}", path.display(), error).into())
    }

    /// Returns whether every document was valid.
    pub(super) fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
        let schema = load(&args.schema)?;
        let mut options = Validator::options();
        if let Some(draft) = args.draft {
            options.with_draft(draft);
        }
        let validator = options
            .strict_format(args.strict_format)
            .strict_integer(args.strict_integer)
            .quiet(args.quiet)
            .compile(&schema)
            .map_err(|error| format!("{}: {}", args.schema.display(), error))?;

        let mut all_valid = true;
        for path in &args.documents {
            let document = load(path)?;
            let verdict = validator.validate(&document)?;
            if verdict.valid {
                println!("{}: valid", path.display());
            } else {
                all_valid = false;
                println!("{}: invalid", path.display());
                report(&verdict.errors.unwrap_or_default(), 1);
            }
        }
        Ok(all_valid)
    }

    fn report(errors: &[ErrorDetail], depth: usize) {
        for error in errors {
            let location = if error.document_path.is_empty() {
                "#".to_string()
            } else {
                format!("#/{}", error.document_path.join("/"))
            };
            if error.message.is_empty() {
                println!("{}{}", "  ".repeat(depth), location);
            } else {
                println!("{}{}: {}", "  ".repeat(depth), location, error.message);
            }
            if let Some(nested) = &error.errors {
                report(nested, depth + 1);
            }
        }
    }
}
