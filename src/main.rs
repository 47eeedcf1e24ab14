//! Command-line entry point: score an order export and write predictions.

use std::io::Write;
use std::path::{Path, PathBuf};

use suggestor::app_dirs::{self, AppDirError};
use suggestor::config::{self, SuggestorConfig};
use suggestor::labeling::{RULESET_VERSION, describe_rules};
use suggestor::logging;
use suggestor::orders::FEATURE_DESCRIPTIONS;
use suggestor::pipeline::{PipelineError, PipelineOutput, run_pipeline_file};
use suggestor::report::{agreement_table, labeled_table, prediction_table, raw_preview};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let root = if options.show_rules {
        None
    } else {
        let root = app_dirs::app_root_dir();
        start_logging(&root);
        root.ok()
    };
    let stdout = std::io::stdout();
    execute(&options, root.as_deref(), &mut stdout.lock())
}

/// Logging is optional; the run continues without it.
fn start_logging(root: &Result<PathBuf, AppDirError>) {
    let result = match root {
        Ok(root) => logging::init(&app_dirs::logs_dir(root))
            .map(|_| ())
            .map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };
    if let Err(err) = result {
        eprintln!("Logging disabled: {err}");
    }
}

/// Carry out one invocation, writing report output to `out`.
fn execute<W: Write>(options: &CliOptions, root: Option<&Path>, out: &mut W) -> Result<(), String> {
    if options.show_rules {
        return write_rules(out).map_err(write_error);
    }

    let settings = load_settings(options, root)?;
    if options.print_config {
        let text = settings.to_toml_string().map_err(|err| err.to_string())?;
        return out.write_all(text.as_bytes()).map_err(write_error);
    }
    let input = options
        .input
        .as_ref()
        .ok_or_else(|| format!("--input is required\n\n{}", help_text()))?;

    let output = run_pipeline_file(input, &settings.forest_options()).map_err(kind_message)?;
    let out_path = options
        .out
        .clone()
        .unwrap_or_else(|| settings.report.output_file.clone());
    output.export(&out_path).map_err(kind_message)?;

    if options.json {
        let json = output
            .summary()
            .to_json()
            .map_err(|err| kind_message(PipelineError::from(err)))?;
        writeln!(out, "{json}").map_err(write_error)?;
        return Ok(());
    }
    if options.show_tables {
        write_tables(out, &output, settings.report.preview_rows).map_err(write_error)?;
    }
    writeln!(
        out,
        "Wrote {} predictions to {}",
        output.predictions.len(),
        out_path.display()
    )
    .map_err(write_error)
}

fn kind_message(err: PipelineError) -> String {
    format!("{}: {err}", err.kind())
}

fn write_error(err: std::io::Error) -> String {
    format!("Failed to write output: {err}")
}

fn load_settings(options: &CliOptions, root: Option<&Path>) -> Result<SuggestorConfig, String> {
    let loaded = match (&options.config, root) {
        (Some(path), _) => config::load_from(path),
        (None, Some(root)) => config::load_or_default(root),
        (None, None) => {
            tracing::warn!("No app directory available; using default settings");
            Ok(SuggestorConfig::default())
        }
    };
    let mut settings = loaded.map_err(|err| err.to_string())?;
    if let Some(seed) = options.seed {
        settings.classifier.seed = seed;
    }
    if let Some(trees) = options.trees {
        settings.classifier.trees = trees;
    }
    if let Some(rows) = options.preview_rows {
        settings.report.preview_rows = rows;
    }
    Ok(settings.normalized())
}

fn write_tables<W: Write>(
    out: &mut W,
    output: &PipelineOutput,
    preview_rows: usize,
) -> std::io::Result<()> {
    writeln!(out, "Raw orders (first {preview_rows} rows)")?;
    writeln!(out, "{}", raw_preview(&output.records, preview_rows))?;
    writeln!(out, "Companies and rule labels")?;
    writeln!(out, "{}", labeled_table(&output.companies))?;
    writeln!(out, "Predicted recommendations")?;
    writeln!(out, "{}", prediction_table(&output.predictions))?;
    writeln!(out, "Agreement with rule labels (same batch)")?;
    writeln!(out, "{}", agreement_table(&output.agreement))?;
    writeln!(out, "exact match: {:.3}", output.exact_match)
}

fn write_rules<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Features")?;
    for (name, description) in FEATURE_DESCRIPTIONS {
        writeln!(out, "  {name:<14} {description}")?;
    }
    writeln!(out)?;
    writeln!(out, "Recommendation rules (v{RULESET_VERSION})")?;
    for rule in describe_rules() {
        writeln!(out, "  {:<10} {}", rule.label.to_string(), rule.expression)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    input: Option<PathBuf>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    trees: Option<usize>,
    preview_rows: Option<usize>,
    show_tables: bool,
    json: bool,
    show_rules: bool,
    print_config: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            input: None,
            out: None,
            config: None,
            seed: None,
            trees: None,
            preview_rows: None,
            show_tables: true,
            json: false,
            show_rules: false,
            print_config: false,
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                options.input = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.out = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            "--trees" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--trees requires a value".to_string())?;
                options.trees = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --trees value: {value}"))?,
                );
            }
            "--preview" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--preview requires a value".to_string())?;
                options.preview_rows = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --preview value: {value}"))?,
                );
            }
            "--no-tables" => options.show_tables = false,
            "--json" => options.json = true,
            "--rules" => options.show_rules = true,
            "--print-config" => options.print_config = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "suggestor",
        "",
        "Aggregates an order export per company, labels each company with the",
        "recommendation rules and fits one random forest per recommendation.",
        "",
        "Usage:",
        "  suggestor --input <orders.csv> [--out company_predictions.csv] [options]",
        "",
        "Options:",
        "  --input <file>     Order export CSV (required unless --rules or --print-config).",
        "  --out <file>       Prediction CSV path (default: report.output_file).",
        "  --config <file>    Settings TOML (default: <app root>/config.toml).",
        "  --seed <n>         Random forest seed (default: 42).",
        "  --trees <n>        Trees per forest (default: 100).",
        "  --preview <n>      Raw rows to preview (default: 5).",
        "  --no-tables        Skip the text tables.",
        "  --json             Print companies, predictions and agreement as JSON.",
        "  --rules            Print the feature glossary and rules, then exit.",
        "  --print-config     Print the effective settings as TOML, then exit.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    const ORDERS: &str = "company_id,total,payment_method,status,customer_pincode,channel_order_id\n\
        c1,100,cod,15,173212,o1\n\
        c1,300,prepaid,1,110001,o2\n\
        c2,900,cod,2,560001,o3\n";

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Temp dir holding `orders.csv`, with options pointing at it and at a
    /// config file that does not exist.
    fn workspace(csv: &str) -> (TempDir, CliOptions) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("orders.csv"), csv).unwrap();
        let options = CliOptions {
            input: Some(dir.path().join("orders.csv")),
            config: Some(dir.path().join("absent.toml")),
            trees: Some(10),
            ..CliOptions::default()
        };
        (dir, options)
    }

    fn execute_to_string(options: &CliOptions) -> Result<String, String> {
        let mut buf = Vec::new();
        execute(options, None, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn parses_overrides() {
        let options = parse_args(args(&[
            "--input", "orders.csv", "--seed", "7", "--trees", "20", "--no-tables",
        ]))
        .unwrap();
        assert_eq!(options.input, Some(PathBuf::from("orders.csv")));
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.trees, Some(20));
        assert!(!options.show_tables);
        assert!(!options.json);
    }

    #[test]
    fn rejects_bad_numbers_and_unknown_flags() {
        assert!(parse_args(args(&["--seed", "x"])).unwrap_err().contains("--seed"));
        assert!(parse_args(args(&["--trees"])).unwrap_err().contains("requires a value"));
        assert!(parse_args(args(&["--bogus"])).unwrap_err().starts_with("Unknown argument"));
    }

    #[test]
    fn help_is_returned_as_error_text() {
        assert!(parse_args(args(&["--help"])).unwrap_err().contains("Usage:"));
    }

    #[test]
    fn json_output_is_one_document_and_out_overrides_config() {
        let (dir, mut options) = workspace(ORDERS);
        let out_path = dir.path().join("out").join("preds.csv");
        options.json = true;
        options.out = Some(out_path.clone());

        let text = execute_to_string(&options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["predictions"].as_array().unwrap().len(), 2);
        assert_eq!(value["companies"][0]["features"]["company_id"], "c1");
        assert_eq!(value["agreement"].as_array().unwrap().len(), 4);

        let csv = std::fs::read_to_string(&out_path).unwrap();
        assert!(csv.starts_with("company_id,pred_insurance,pred_engage,pred_rto_alert,pred_capital\n"));
        assert!(!dir.path().join("company_predictions.csv").exists());
    }

    #[test]
    fn tables_and_config_output_file_by_default() {
        let (dir, mut options) = workspace(ORDERS);
        let configured = dir.path().join("from_config.csv");
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[report]\noutput_file = {:?}\n", configured.display().to_string()),
        )
        .unwrap();
        options.config = Some(config_path);

        let text = execute_to_string(&options).unwrap();
        assert!(text.contains("Companies and rule labels"));
        assert!(text.contains("Predicted recommendations"));
        assert!(text.contains(&format!("Wrote 2 predictions to {}", configured.display())));
        assert!(configured.is_file());
    }

    #[test]
    fn rules_need_no_input_or_settings() {
        let options = CliOptions {
            show_rules: true,
            ..CliOptions::default()
        };
        let text = execute_to_string(&options).unwrap();
        assert!(text.contains("avg_total"));
        assert!(text.contains("Recommendation rules (v1)"));
        assert!(text.contains("avg_total * order_count > 100000"));
    }

    #[test]
    fn print_config_reflects_flag_overrides() {
        let dir = tempdir().unwrap();
        let options = CliOptions {
            config: Some(dir.path().join("absent.toml")),
            trees: Some(7),
            seed: Some(99),
            print_config: true,
            ..CliOptions::default()
        };
        let text = execute_to_string(&options).unwrap();
        let parsed: SuggestorConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.classifier.trees, 7);
        assert_eq!(parsed.classifier.seed, 99);
    }

    #[test]
    fn pipeline_failure_is_prefixed_with_kind() {
        let (dir, options) = workspace("company_id,total,payment_method,status,customer_pincode\nc1,1,cod,1,1\n");
        let err = execute_to_string(&options).unwrap_err();
        assert!(err.starts_with("SchemaError: "), "{err}");
        assert!(err.contains("channel_order_id"));
        assert!(!dir.path().join("company_predictions.csv").exists());

        let (_dir, options) = workspace("company_id,total,payment_method,status,customer_pincode,channel_order_id\n");
        let err = execute_to_string(&options).unwrap_err();
        assert!(err.starts_with("TrainingError: "), "{err}");
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempdir().unwrap();
        let options = CliOptions {
            config: Some(dir.path().join("absent.toml")),
            ..CliOptions::default()
        };
        assert!(execute_to_string(&options).unwrap_err().contains("--input is required"));
    }
}
