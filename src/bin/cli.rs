// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Paramscene CLI

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use paramscene::cli::{parse_assignment, parse_binding, Reporter};
use paramscene::config::CONFIG_FILE;
use paramscene::schema::Severity;
use paramscene::{
    import_schema_file, Context, SceneBuilder, SessionConfig, TemplateProcessor,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "paramscene")]
#[command(about = "Paramscene - declarative parametric scene interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Session config file (defaults to ./paramscene.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a schema into a scene and print a summary
    Build {
        /// Input schema file
        input: PathBuf,

        /// Parameter edits applied after the initial build (TEMPLATE.PARAM=VALUE)
        #[arg(short, long = "set", value_name = "ASSIGNMENT")]
        set: Vec<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a single formula
    Eval {
        /// Formula text, e.g. "$w / 2"
        expression: String,

        /// Context bindings (NAME=VALUE)
        #[arg(long = "var", value_name = "BINDING")]
        vars: Vec<String>,
    },

    /// Expand a schema's templates and print the nodes as JSON
    Expand {
        /// Input schema file
        input: PathBuf,

        /// Only expand the top-level template with this id
        #[arg(short, long)]
        template: Option<String>,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check every template's constraints
    Validate {
        /// Input schema file
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Build { input, set, json } => {
            let config = load_config(cli.config.as_deref())?;
            build_command(input, set, *json, config)?;
        }
        Commands::Eval { expression, vars } => {
            let config = load_config(cli.config.as_deref())?;
            eval_command(expression, vars, &config)?;
        }
        Commands::Expand {
            input,
            template,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            expand_command(input, template.as_deref(), output.as_deref(), &config)?;
        }
        Commands::Validate { input } => {
            let config = load_config(cli.config.as_deref())?;
            validate_command(input, config)?;
        }
        Commands::Version => {
            println!("Paramscene v{}", env!("CARGO_PKG_VERSION"));
            println!("Schema version {}", paramscene::SCHEMA_VERSION);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => Ok(SessionConfig::from_file(path)?.with_env_overrides()),
        None => SessionConfig::load()
            .with_context(|| format!("Failed to load {}", CONFIG_FILE)),
    }
}

fn build_command(input: &Path, set: &[String], json: bool, config: SessionConfig) -> Result<()> {
    let schema = import_schema_file(input, &config)?;

    let start = Instant::now();
    let mut scene = SceneBuilder::new().config(config).build(&schema);

    for raw in set {
        let edit = parse_assignment(raw)?;
        scene
            .set_parameter(&edit.template, &edit.parameter, edit.value)
            .with_context(|| format!("Failed to apply '{}'", raw))?;
    }
    let elapsed = start.elapsed();

    if json {
        let bounds = scene.bounding_box();
        let bounds = (!bounds.is_empty()).then_some(bounds);
        let violations: Vec<_> = scene
            .all_violations()
            .map(|(path, v)| serde_json::json!({"template": path, "violations": v}))
            .collect();
        let summary = serde_json::json!({
            "templates": scene.template_paths().collect::<Vec<_>>(),
            "leaves": scene.leaf_paths().collect::<Vec<_>>(),
            "objects": scene.object_count(),
            "bounds": bounds,
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        Reporter::report_scene(&input.display().to_string(), &scene, elapsed);
    }

    Ok(())
}

fn eval_command(expression: &str, vars: &[String], config: &SessionConfig) -> Result<()> {
    let mut ctx = Context::new();
    for raw in vars {
        let (name, value) = parse_binding(raw)?;
        ctx.insert(name, value);
    }

    let evaluator = config.evaluator();

    match evaluator.try_evaluate(expression, &ctx) {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(err) => {
            Reporter::report_error(&err.to_string());
            println!("{}", "0 (fallback)".bright_black());
            std::process::exit(1);
        }
    }
}

fn expand_command(
    input: &Path,
    template: Option<&str>,
    output: Option<&Path>,
    config: &SessionConfig,
) -> Result<()> {
    let schema = import_schema_file(input, config)?;
    let evaluator = config.evaluator();
    let processor =
        TemplateProcessor::new(&evaluator).with_max_repeat_count(config.max_repeat_count);

    let mut expanded = serde_json::Map::new();
    for t in &schema.children {
        if template.is_some_and(|id| id != t.id) {
            continue;
        }
        let nodes = processor.process_template(t, &Context::new());
        expanded.insert(t.id.clone(), serde_json::to_value(nodes)?);
    }

    if let Some(id) = template {
        if expanded.is_empty() {
            bail!("no top-level template '{}' in {}", id, input.display());
        }
    }

    let text = serde_json::to_string_pretty(&expanded)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Reporter::success(&format!("Expanded nodes written to {}", path.display()));
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn validate_command(input: &Path, config: SessionConfig) -> Result<()> {
    let schema = import_schema_file(input, &config)?;
    let scene = SceneBuilder::new().config(config).build(&schema);

    let mut errors = 0;
    for path in scene.template_paths() {
        let violations = scene.violations(path);
        errors += violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        Reporter::report_violations(path, violations);
    }

    if errors > 0 {
        Reporter::report_warning(&format!("{} constraint error(s)", errors));
        std::process::exit(1);
    }
    Ok(())
}
