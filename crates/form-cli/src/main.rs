use clap::{Args, Parser, Subcommand, ValueEnum};
use form_spec::{
    Form, ValidationResult, build_render_payload, document_schema, render_json_ui, render_text,
    validate,
};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Environment variable holding the log filter (`tracing_subscriber::EnvFilter`
/// syntax).
const LOG_ENV: &str = "DYNAMIC_FORM_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Schema-driven form engine CLI",
    long_about = "Builds forms from JSON widget schemas, applies toggle rules and prints, validates or saves the result"
)]
struct Cli {
    /// Log parsing and rule evaluation details to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

/// Inputs shared by every command that builds a form.
#[derive(Args)]
struct FormArgs {
    /// Path to the JSON array of widget elements.
    #[arg(long, value_name = "SCHEMA")]
    schema: PathBuf,
    /// Optional JSON object of values to populate the form with.
    #[arg(long, value_name = "DATA")]
    data: Option<PathBuf>,
    /// Set a widget value after populating; repeatable.
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the form layout with current values and visibility.
    Render {
        #[command(flatten)]
        form: FormArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the save payload (property name to value).
    Save {
        #[command(flatten)]
        form: FormArgs,
        /// Emit CBOR as hex instead of JSON.
        #[arg(long)]
        cbor: bool,
    },
    /// Validate the values of visible widgets.
    Validate {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Print the JSON Schema of the widget schema document.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Render { form, format } => run_render(form, format),
        Command::Save { form, cbor } => run_save(form, cbor),
        Command::Validate { form } => run_validate(form),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&document_schema())?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_form(args: &FormArgs) -> CliResult<Form> {
    let schema = fs::read_to_string(&args.schema)?;
    let mut form = Form::generate(&schema);
    if form.registry().is_empty() {
        warn!(schema = %args.schema.display(), "schema produced no widgets");
    }

    if let Some(path) = &args.data {
        let data = fs::read_to_string(path)?;
        let updated = form.populate(&data)?;
        debug!(updated, "populated form");
    }

    for (id, value) in &args.assignments {
        let changed = form.set_value(id, Some(value.clone()))?;
        if !changed.is_empty() {
            debug!(widget = %id, changed = ?changed, "visibility changed");
        }
    }
    Ok(form)
}

fn run_render(args: FormArgs, format: RenderMode) -> CliResult<()> {
    let form = load_form(&args)?;
    let payload = build_render_payload(&form);
    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
    }
    Ok(())
}

fn run_save(args: FormArgs, cbor: bool) -> CliResult<()> {
    let form = load_form(&args)?;
    let data = form.save()?;
    if cbor {
        println!("{}", encode_hex(&data.to_cbor()?));
    } else {
        println!("{}", serde_json::to_string_pretty(&data.to_value())?);
    }
    Ok(())
}

fn run_validate(args: FormArgs) -> CliResult<()> {
    let form = load_form(&args)?;
    let result = validate(&form);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  {} - {} ({})", error.widget_id, error.message, error.code);
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{}'", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("widget id must not be empty".into());
    }
    Ok((id.to_string(), value.to_string()))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn assignment_requires_id_and_equals() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment(" =x").is_err());
    }

    #[test]
    fn hex_encoding_is_lowercase_pairs() {
        assert_eq!(encode_hex(&[0x0a, 0xff, 0x00]), "0aff00");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
