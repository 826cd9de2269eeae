use serde::Deserialize;
use smartscript::config::runtime::ExecutionPreferences;
use smartscript::execution::RequestContext;
use smartscript::logging::{self, ConsoleLogger, LogLevel, LoggingService};
use smartscript::pipeline::{self, PipelineError};
use smartscript::utils::SourceMap;
use smartscript::{file_processor, lexical};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    template: PathBuf,
    parameters: HashMap<String, String>,
    persistent: HashMap<String, String>,
    temporary: HashMap<String, String>,
    show_tokens: bool,
    show_tree: bool,
    show_ast_json: bool,
    verbose: bool,
}

impl CliOptions {
    /// Inspection flags replace rendering
    fn inspect_only(&self) -> bool {
        self.show_tokens || self.show_tree || self.show_ast_json
    }
}

#[derive(Debug)]
enum Command {
    Help,
    Run(CliOptions),
}

/// `--params` file layout
#[derive(Debug, Default, Deserialize)]
struct ParamsFile {
    #[serde(default)]
    parameters: HashMap<String, String>,
    #[serde(default)]
    persistent: HashMap<String, String>,
    #[serde(default)]
    temporary: HashMap<String, String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("smartscript");

    let options = match parse_args(&args[1.min(args.len())..]) {
        Ok(Command::Help) => {
            print_help(program_name);
            return Ok(());
        }
        Ok(Command::Run(options)) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <template.smscr> [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(2);
        }
    };

    init_logging(options.verbose)?;

    let file_result = match file_processor::process_file(&options.template) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            eprintln!("  help: {}", error.recommended_action());
            std::process::exit(1);
        }
    };
    let source = file_result.source.as_str();

    let outcome = logging::with_template_context(options.template.clone(), || {
        if options.inspect_only() {
            inspect(source, &options)
        } else {
            render(source, options)
        }
    });

    if let Err(error) = outcome {
        report_error(&error, source, &file_result.metadata.path);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), String> {
    if verbose {
        let service = LoggingService::new(Arc::new(ConsoleLogger), LogLevel::Debug);
        logging::init_global_logging_with_service(Arc::new(service))
    } else {
        logging::init_global_logging()
    }
}

fn print_help(program_name: &str) {
    println!(
        "SmartScript v{} ({} limits)",
        env!("CARGO_PKG_VERSION"),
        smartscript::config::compile_time::PROFILE
    );
    println!("Render SmartScript templates");
    println!();
    println!("USAGE:");
    println!("    {} <template.smscr> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --param K=V         Request parameter (repeatable)");
    println!("    --persistent K=V    Initial persistent parameter (repeatable)");
    println!("    --temporary K=V     Initial temporary parameter (repeatable)");
    println!("    --params FILE       TOML file with [parameters], [persistent], [temporary]");
    println!("    --tokens            Print the token stream instead of rendering");
    println!("    --tree              Print the re-serialized template instead of rendering");
    println!("    --ast-json          Print the document tree as JSON instead of rendering");
    println!("    --verbose           Log every stage to stderr");
    println!("    --help              Show this help message");
    println!();
    println!("OUTPUT:");
    println!("    Rendered text goes to stdout. Persistent parameters left after");
    println!("    the render are reported on stderr.");
    println!();
    println!("EXAMPLES:");
    println!("    {} page.smscr --param name=Ana", program_name);
    println!("    {} page.smscr --params request.toml", program_name);
    println!("    {} page.smscr --tree", program_name);
}

// ============================================================================
// ARGUMENT PARSING
// ============================================================================

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = CliOptions::default();
    let mut template = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--tokens" => options.show_tokens = true,
            "--tree" => options.show_tree = true,
            "--ast-json" => options.show_ast_json = true,
            "--verbose" => options.verbose = true,
            flag @ ("--param" | "--persistent" | "--temporary") => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a KEY=VALUE argument", flag))?;
                let (key, value) = parse_pair(value)?;
                let target = match flag {
                    "--param" => &mut options.parameters,
                    "--persistent" => &mut options.persistent,
                    _ => &mut options.temporary,
                };
                target.insert(key, value);
                i += 1;
            }
            "--params" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| "--params requires a file path".to_string())?;
                let file = load_params_file(Path::new(path))?;
                options.parameters.extend(file.parameters);
                options.persistent.extend(file.persistent);
                options.temporary.extend(file.temporary);
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{}'", other));
            }
            path => {
                if template.replace(PathBuf::from(path)).is_some() {
                    return Err("Only one template may be given".to_string());
                }
            }
        }
        i += 1;
    }

    options.template = template.ok_or_else(|| "Missing template path".to_string())?;
    Ok(Command::Run(options))
}

fn parse_pair(argument: &str) -> Result<(String, String), String> {
    match argument.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Expected KEY=VALUE, found '{}'", argument)),
    }
}

fn load_params_file(path: &Path) -> Result<ParamsFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_params_file(&content).map_err(|e| format!("Invalid TOML in {}: {}", path.display(), e))
}

fn parse_params_file(content: &str) -> Result<ParamsFile, toml::de::Error> {
    toml::from_str(content)
}

// ============================================================================
// COMMANDS
// ============================================================================

fn inspect(source: &str, options: &CliOptions) -> Result<(), PipelineError> {
    if options.show_tokens {
        let tokens = lexical::tokenize(source).map_err(smartscript::ParseError::from)?;
        for token in &tokens {
            println!("{:<12} {}", token.span.to_string(), token.value);
        }
    }

    if options.show_tree || options.show_ast_json {
        let document = pipeline::compile_source(source)?;
        if options.show_tree {
            println!("{}", document);
        }
        if options.show_ast_json {
            match serde_json::to_string_pretty(&document) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize document: {}", e),
            }
        }
    }

    Ok(())
}

fn render(source: &str, options: CliOptions) -> Result<(), PipelineError> {
    let CliOptions {
        parameters,
        mut persistent,
        temporary,
        verbose,
        ..
    } = options;

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let preferences = ExecutionPreferences::default();

    let (result, mime_type) = {
        let mut context =
            RequestContext::with_preferences(&mut output, parameters, &mut persistent, &preferences);
        for (key, value) in temporary {
            context.set_temporary_parameter(key, value);
        }
        let result = pipeline::render_source(source, &mut context)?;
        (result, context.mime_type().to_string())
    };
    drop(output);

    if verbose {
        eprintln!(
            "rendered {} bytes as {} in {:.2} ms",
            result.bytes_written,
            mime_type,
            result.total_duration().as_secs_f64() * 1000.0
        );
    }

    let mut names: Vec<&String> = persistent.keys().collect();
    names.sort();
    eprintln!("persistent parameters ({}):", names.len());
    for name in names {
        eprintln!("  {} = {}", name, persistent[name]);
    }

    Ok(())
}

fn report_error(error: &PipelineError, source: &str, path: &Path) {
    let message = format!("[{}] {}", error.error_code(), error);
    match error.span() {
        Some(span) => {
            eprint!("{}", SourceMap::new(source).format_error(span.start(), &message));
            eprintln!("  = in {} ({} stage)", path.display(), error.stage());
        }
        None => {
            eprintln!("error: {}", message);
            eprintln!("  = in {} ({} stage)", path.display(), error.stage());
        }
    }
    eprintln!("  help: {}", error.recommended_action());
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_args_collects_parameters() {
        let command = parse_args(&args(&[
            "page.smscr",
            "--param",
            "name=Ana",
            "--persistent",
            "visits=3",
            "--temporary",
            "t=a=b",
            "--tree",
        ]))
        .unwrap();

        let Command::Run(options) = command else {
            panic!("expected a run command");
        };
        assert_eq!(options.template, PathBuf::from("page.smscr"));
        assert_eq!(options.parameters["name"], "Ana");
        assert_eq!(options.persistent["visits"], "3");
        assert_eq!(options.temporary["t"], "a=b");
        assert!(options.show_tree);
        assert!(options.inspect_only());
    }

    #[test]
    fn test_parse_args_errors() {
        assert_matches!(parse_args(&args(&["--help"])), Ok(Command::Help));
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.smscr", "b.smscr"])).is_err());
        assert!(parse_args(&args(&["a.smscr", "--param"])).is_err());
        assert!(parse_args(&args(&["a.smscr", "--param", "novalue"])).is_err());
        assert!(parse_args(&args(&["a.smscr", "--bogus"])).is_err());
    }

    #[test]
    fn test_params_file_tables_are_optional() {
        let file = parse_params_file(
            r#"
            [parameters]
            name = "Ana"

            [persistent]
            visits = "4"
            "#,
        )
        .unwrap();
        assert_eq!(file.parameters["name"], "Ana");
        assert_eq!(file.persistent["visits"], "4");
        assert!(file.temporary.is_empty());

        assert!(parse_params_file("[parameters]\nname = 3\n").is_err());
    }

    #[test]
    fn test_params_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.toml");
        fs::write(&path, "[temporary]\nmode = \"draft\"\n").unwrap();

        let command = parse_args(&args(&["page.smscr", "--params", path.to_str().unwrap()])).unwrap();
        let Command::Run(options) = command else {
            panic!("expected a run command");
        };
        assert_eq!(options.temporary["mode"], "draft");
        assert!(!options.inspect_only());
    }
}
