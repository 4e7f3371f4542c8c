//! Command line interface.
//!
//! ```sh
//! jaguar-kg start
//! jaguar-kg ask "Which jaguars were killed?"
//! jaguar-kg query --template find_by_name --arg name="El Jefe"
//! jaguar-kg import --dry-run
//! ```

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::{
    ai::{self, templates::QueryTemplate, QueryTool, ToolOutput},
    boot::{self, ServeParams},
    environment::{resolve_from_env, Environment, DEFAULT_ENVIRONMENT},
    import,
    ontology::{jaguar_ontology, rdf::schema_turtle},
    store::{GraphStore, HttpSparqlStore},
    Error, Result,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Specify the environment
    #[arg(short, long, global = true, help = &format!("Specify the environment [default: {DEFAULT_ENVIRONMENT}]"))]
    environment: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server
    Start {
        /// Server bind address
        #[arg(short, long)]
        binding: Option<String>,
        /// Server port address
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a SPARQL query through the query tool
    Query {
        /// Query text
        sparql: Option<String>,
        /// Read the query from a file
        #[arg(short, long, conflicts_with = "sparql")]
        file: Option<PathBuf>,
        /// Render a named template instead
        #[arg(short, long, conflicts_with_all = ["sparql", "file"])]
        template: Option<String>,
        /// Template argument, as `key=value`
        #[arg(short, long = "arg", value_parser = parse_key_val, requires = "template")]
        args: Vec<(String, String)>,
        /// Print the rendered query without running it
        #[arg(long)]
        print: bool,
    },
    /// Ask the agent a single question
    Ask {
        question: String,
    },
    /// Load the ontology and the jaguar dataset into the store
    Import {
        /// CSV dataset [default: `data.csv` from configuration]
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Extra Turtle files loaded verbatim
        #[arg(long)]
        turtle: Vec<PathBuf>,
        /// Print the N-Triples document instead of uploading it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the ontology schema as Turtle
    Ontology,
    /// Validate configuration and check the store connection
    Doctor,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no `=` found in `{s}`"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

/// Parses the command line and runs the selected command.
///
/// # Errors
/// Returns the error of the failed command.
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    let environment: Environment = cli.environment.unwrap_or_else(resolve_from_env).into();

    match cli.command {
        Commands::Start { binding, port } => {
            let ctx = boot::create_context(&environment)?;
            let params = ServeParams {
                port: port.unwrap_or(ctx.config.server.port),
                binding: binding.unwrap_or_else(|| ctx.config.server.binding.clone()),
            };
            boot::serve(ctx, params).await?;
        }
        Commands::Query {
            sparql,
            file,
            template,
            args,
            print,
        } => {
            let query = match (sparql, file, template) {
                (Some(sparql), _, _) => sparql,
                (None, Some(file), _) => std::fs::read_to_string(&file)?,
                (None, None, Some(name)) => {
                    let template: QueryTemplate = name.parse().map_err(Error::wrap)?;
                    let args: BTreeMap<String, String> = args.into_iter().collect();
                    template.render(&args).map_err(Error::wrap)?
                }
                (None, None, None) => {
                    return Err(Error::BadRequest(
                        "provide a query, --file or --template".to_string(),
                    ))
                }
            };
            if print {
                println!("{query}");
                return Ok(());
            }
            let config = boot::load_config(&environment)?;
            let store: Arc<dyn GraphStore> = Arc::new(HttpSparqlStore::new(&config.store)?);
            let tool = QueryTool::new(store, &jaguar_ontology()?).map_err(Error::wrap)?;
            let output = tool.run(&query).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
            if let ToolOutput::Failure(failure) = output {
                return Err(Error::Message(format!(
                    "query failed ({}): {}",
                    failure.error, failure.message
                )));
            }
        }
        Commands::Ask { question } => {
            let ctx = boot::create_context(&environment)?;
            let answer = ctx.agent.respond(&[], &question).await?;
            for call in &answer.tool_calls {
                let status = if call.ok {
                    "ok".green()
                } else {
                    call.error.clone().unwrap_or_default().red()
                };
                eprintln!(
                    "{} {} [{status}] {}ms",
                    "tool".dimmed(),
                    call.name,
                    call.duration_ms
                );
            }
            println!("{}", answer.reply);
        }
        Commands::Import {
            csv,
            turtle,
            dry_run,
        } => {
            let config = boot::load_config(&environment)?;
            let csv = csv.unwrap_or_else(|| config.data.csv.clone());
            let turtle = if turtle.is_empty() {
                config.data.turtle.clone()
            } else {
                turtle
            };
            let document = import::prepare(&csv, &turtle).map_err(Error::wrap)?;
            if dry_run {
                print!("{}", document.ntriples);
                for (path, content) in &document.turtle {
                    println!("# {}", path.display());
                    print!("{content}");
                }
                return Ok(());
            }
            let store = HttpSparqlStore::new(&config.store)?;
            import::upload(&store, &document)
                .await
                .map_err(Error::wrap)?;
            println!(
                "{} {} statements ({} jaguars from {} rows) into {}",
                "loaded".green(),
                document.statements,
                document.summary.jaguars,
                document.summary.rows,
                store.location()
            );
        }
        Commands::Ontology => {
            print!("{}", schema_turtle(&jaguar_ontology()?));
        }
        Commands::Doctor => doctor(&environment).await?,
    }
    Ok(())
}

async fn doctor(environment: &Environment) -> Result<()> {
    let mut healthy = true;
    let mut report = |name: &str, outcome: std::result::Result<String, String>| match outcome {
        Ok(detail) => println!("{} {name}: {detail}", "✔".green()),
        Err(detail) => {
            healthy = false;
            println!("{} {name}: {detail}", "✘".red());
        }
    };

    let config = match boot::load_config(environment) {
        Ok(config) => {
            report("configuration", Ok(format!("loaded `{environment}`")));
            config
        }
        Err(err) => {
            report("configuration", Err(err.to_string()));
            return Err(Error::Message("doctor found problems".to_string()));
        }
    };

    report(
        "model",
        match ai::build_assistant(&config.ai) {
            Ok(Some(model)) => Ok(model.model().to_string()),
            Ok(None) => Err("no `ai.assistant` configured".to_string()),
            Err(err) => Err(err.to_string()),
        },
    );

    let store = match HttpSparqlStore::new(&config.store) {
        Ok(store) => match store.ping().await {
            Ok(()) => Ok(format!("{} answers", store.location())),
            Err(err) => Err(err.to_string()),
        },
        Err(err) => Err(err.to_string()),
    };
    report("store", store);

    if healthy {
        Ok(())
    } else {
        Err(Error::Message("doctor found problems".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_template_arguments() {
        let cli = Cli::try_parse_from([
            "jaguar-kg",
            "query",
            "--template",
            "find_by_name",
            "--arg",
            "name=El Jefe",
        ])
        .unwrap();
        let Commands::Query { template, args, .. } = cli.command else {
            panic!("query expected");
        };
        assert_eq!(template.as_deref(), Some("find_by_name"));
        assert_eq!(args, vec![("name".to_string(), "El Jefe".to_string())]);
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(parse_key_val("name").is_err());
        assert_eq!(
            parse_key_val("gender=Female").unwrap(),
            ("gender".to_string(), "Female".to_string())
        );
    }

    #[test]
    fn environment_is_global() {
        let cli = Cli::try_parse_from(["jaguar-kg", "ontology", "-e", "production"]).unwrap();
        assert_eq!(cli.environment.as_deref(), Some("production"));
    }
}
