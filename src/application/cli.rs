#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Password;
use serde_json::Map;
use serde_json::Value;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::Task;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StorageName;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("ERPDESK_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("erpdesk");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

pub fn parse_args(text: &str) -> Result<Vec<Value>> {
    return match serde_json::from_str::<Value>(text)? {
        Value::Array(args) => Ok(args),
        _ => bail!("--args must be a JSON array"),
    };
}

pub fn parse_kwargs(text: &str) -> Result<Map<String, Value>> {
    return match serde_json::from_str::<Value>(text)? {
        Value::Object(kwargs) => Ok(kwargs),
        _ => bail!("--kwargs must be a JSON object"),
    };
}

fn prompt_login(matches: &ArgMatches) -> Result<Task> {
    let mut login = Config::get(ConfigKey::Login);
    if login.is_empty() {
        login = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Login")
            .interact_text()?;
    }

    let password = match matches.get_one::<String>("password") {
        Some(password) => password.to_string(),
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };

    return Ok(Task::Login { login, password });
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for erpdesk")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running erpdesk with environment variable RUST_LOG=erpdesk")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Sign in and persist the session.")
        .arg(
            Arg::new(ConfigKey::Login.to_string())
                .short('u')
                .long(ConfigKey::Login.to_string())
                .env("ERPDESK_LOGIN")
                .num_args(1)
                .help("Login name. Prompted for when not set."),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .long("password")
                .env("ERPDESK_PASSWORD")
                .hide_env_values(true)
                .num_args(1)
                .help("Password. Prompted for when not set."),
        );
}

fn subcommand_open() -> Command {
    return Command::new("open")
        .about("Select an app by id or name, showing its sidebar and default action.")
        .arg(Arg::new("app").help("App id or name").required(true));
}

fn subcommand_call() -> Command {
    return Command::new("call")
        .about("Call a model method through JSON-RPC and print the result.")
        .arg(Arg::new("model").help("Model name, e.g. res.partner").required(true))
        .arg(Arg::new("method").help("Method name, e.g. search_read").required(true))
        .arg(
            Arg::new("args")
                .short('a')
                .long("args")
                .num_args(1)
                .default_value("[]")
                .help("Positional arguments as a JSON array."),
        )
        .arg(
            Arg::new("kwargs")
                .short('k')
                .long("kwargs")
                .num_args(1)
                .default_value("{}")
                .help("Keyword arguments as a JSON object."),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("erpdesk")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand(subcommand_login())
        .subcommand(Command::new("logout").about("Sign out and clear the stored session."))
        .subcommand(Command::new("status").about("Validate the stored session and print who is signed in."))
        .subcommand(Command::new("menus").about("Print the app and menu tree."))
        .subcommand(subcommand_open())
        .subcommand(subcommand_call())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ERPDESK_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Url.to_string())
                .long(ConfigKey::Url.to_string())
                .env("ERPDESK_URL")
                .num_args(1)
                .help(format!("Base URL of the ERP server. [default: {}]", Config::default(ConfigKey::Url)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Storage.to_string())
                .long(ConfigKey::Storage.to_string())
                .env("ERPDESK_STORAGE")
                .num_args(1)
                .help(format!("Where the session is persisted. [default: {}]", Config::default(ConfigKey::Storage)))
                .value_parser(PossibleValuesParser::new(StorageName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StorageFile.to_string())
                .long(ConfigKey::StorageFile.to_string())
                .env("ERPDESK_STORAGE_FILE")
                .num_args(1)
                .help(format!("Session storage file when using file storage. [default: {}]", Config::default(ConfigKey::StorageFile)))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print the RPC debug log after the command output.")
                .global(true),
        );
}

/// Parsed invocation. `None` means the command was fully handled while
/// parsing.
pub struct Invocation {
    pub task: Task,
    pub verbose: bool,
}

pub async fn parse() -> Result<Option<Invocation>> {
    let matches = build().get_matches();
    return dispatch(&matches).await;
}

pub async fn dispatch(matches: &ArgMatches) -> Result<Option<Invocation>> {
    let task = match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    println!("{}", ConfigKey::VARIANTS.join("\n"));
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("create", _)) => {
                    create_config_file().await?;
                }
                Some(("default", _)) => {
                    println!("{}", Config::serialize_default(build()));
                }
                Some(("path", _)) => {
                    println!("{}", Config::default(ConfigKey::ConfigFile));
                }
                _ => {
                    subcommand_config().print_long_help()?;
                }
            }
            return Ok(None);
        }
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(None);
        }
        Some(("login", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            prompt_login(subcmd_matches)?
        }
        Some(("logout", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            Task::Logout
        }
        Some(("status", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            Task::Status
        }
        Some(("menus", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            Task::Menus
        }
        Some(("open", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            let app = match subcmd_matches.get_one::<String>("app") {
                Some(app) => app.to_string(),
                None => bail!("An app id or name is required"),
            };
            Task::Open { app }
        }
        Some(("call", subcmd_matches)) => {
            Config::load(build(), vec![matches, subcmd_matches]).await?;
            task_call(subcmd_matches)?
        }
        _ => {
            build().print_long_help()?;
            return Ok(None);
        }
    };

    let verbose = matches
        .subcommand()
        .map(|(_, subcmd_matches)| return subcmd_matches.get_flag("verbose"))
        .unwrap_or(false);

    return Ok(Some(Invocation { task, verbose }));
}

fn task_call(matches: &ArgMatches) -> Result<Task> {
    let (model, method) = match (
        matches.get_one::<String>("model"),
        matches.get_one::<String>("method"),
    ) {
        (Some(model), Some(method)) => (model.to_string(), method.to_string()),
        _ => bail!("A model and method are required"),
    };

    let args = parse_args(
        matches
            .get_one::<String>("args")
            .map(|e| return e.as_str())
            .unwrap_or("[]"),
    )?;
    let kwargs = parse_kwargs(
        matches
            .get_one::<String>("kwargs")
            .map(|e| return e.as_str())
            .unwrap_or("{}"),
    )?;

    return Ok(Task::Call {
        model,
        method,
        args,
        kwargs,
    });
}
