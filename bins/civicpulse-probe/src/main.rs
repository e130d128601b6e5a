//! civicpulse-probe - check radius and visibility decisions from the shell
//!
//! Loads the same configuration a CivicPulse service would and runs the
//! access gate against hand-supplied coordinates.

mod output;

use anyhow::Result;
use civicpulse_access::{AccessGate, CallerContext, Issue, Role, UserId, UserRef};
use civicpulse_core::config::Config;
use civicpulse_geo::{distance_km, GeoPoint};
use civicpulse_telemetry::TelemetryConfig;
use clap::{Parser, Subcommand, ValueEnum};
use output::{format_km, Status};
use tracing::{debug, error};

mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const DENIED: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}

#[derive(Parser)]
#[command(name = "civicpulse-probe")]
#[command(about = "Check CivicPulse radius and visibility decisions")]
#[command(version)]
struct Cli {
    /// Path to civicpulse.toml
    #[arg(short, long, global = true, env = "CIVICPULSE_CONFIG")]
    config: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance {
        /// First point as LAT,LON
        #[arg(value_parser = parse_point, allow_hyphen_values = true)]
        from: GeoPoint,
        /// Second point as LAT,LON
        #[arg(value_parser = parse_point, allow_hyphen_values = true)]
        to: GeoPoint,
    },

    /// Run the single-item guard for a caller and an issue location
    Check {
        /// Caller location as LAT,LON
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        caller: GeoPoint,
        /// Issue location as LAT,LON
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        issue: GeoPoint,
        /// Caller role
        #[arg(long, value_enum, default_value_t = RoleArg::Anonymous)]
        role: RoleArg,
        /// Treat the issue as hidden by a moderator
        #[arg(long)]
        hidden: bool,
        /// Requested search radius in km, validated like a list request
        #[arg(long)]
        distance: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Anonymous,
    User,
    Moderator,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Anonymous => Role::Anonymous,
            RoleArg::User => Role::User,
            RoleArg::Moderator => Role::Moderator,
            RoleArg::Admin => Role::Admin,
        }
    }
}

fn parse_point(raw: &str) -> std::result::Result<GeoPoint, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {raw:?}"))?;
    civicpulse_access::parse_location(Some(lat), Some(lon)).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::json!({ "error": e.to_report() }));
            } else {
                Status::error(&e.to_string());
            }
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let mut telemetry = TelemetryConfig::from(&config.schema.logging);
    if cli.verbose {
        telemetry.log_level = "debug".to_string();
    }
    civicpulse_telemetry::init_with_config(telemetry)?;
    debug!(
        source = config.path.as_deref().unwrap_or("built-in defaults"),
        max_radius_km = config.schema.geo.max_search_radius_km,
        "configuration loaded"
    );

    let result = match cli.command {
        Commands::Distance { from, to } => run_distance(from, to, cli.json),
        Commands::Check {
            caller,
            issue,
            role,
            hidden,
            distance,
        } => run_check(
            &config,
            caller,
            issue,
            role.into(),
            hidden,
            distance.as_deref(),
            cli.json,
        )?,
        Commands::Config => run_config(&config, cli.json)?,
    };

    std::process::exit(result);
}

fn run_distance(from: GeoPoint, to: GeoPoint, json: bool) -> i32 {
    let km = distance_km(&from, &to);
    if json {
        println!("{}", serde_json::json!({ "distanceKm": km }));
    } else {
        Status::info(&format!("Distance: {}", format_km(km)));
    }
    exit_codes::SUCCESS
}

fn run_check(
    config: &Config,
    caller_at: GeoPoint,
    issue_at: GeoPoint,
    role: Role,
    hidden: bool,
    distance: Option<&str>,
    json: bool,
) -> Result<i32> {
    let gate = AccessGate::new(config.schema.geo)?;

    let caller = if role == Role::Anonymous {
        CallerContext::anonymous(caller_at)
    } else {
        CallerContext::authenticated(UserId::new(), role, caller_at)
    };

    let mut issue = Issue::reported("probe", issue_at, UserRef::new(UserId::new(), "probe"));
    issue.is_hidden = hidden;

    let outcome = gate
        .resolve_radius(distance)
        .and_then(|_| gate.guard_single_item(&caller, Some(issue)));

    match outcome {
        Ok(located) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "allowed": true, "distanceKm": located.distance_km })
                );
            } else {
                Status::success(&format!(
                    "Visible to {} at {} (max {} km)",
                    role,
                    format_km(located.distance_km),
                    gate.max_radius_km()
                ));
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) if e.is_operational() => {
            debug!(code = %e.code(), status = e.status(), "check denied");
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "allowed": false,
                        "status": e.status(),
                        "error": e.to_report(),
                    })
                );
            } else {
                Status::warning(&format!("[{}] {}", e.code(), e));
            }
            Ok(exit_codes::DENIED)
        }
        Err(e) => {
            error!(error = %e, "check failed");
            Status::error(&e.to_string());
            Ok(exit_codes::FAILURE)
        }
    }
}

fn run_config(config: &Config, json: bool) -> Result<i32> {
    let source = config.path.as_deref().unwrap_or("built-in defaults");
    if json {
        println!(
            "{}",
            serde_json::json!({ "source": source, "config": config.schema })
        );
    } else {
        Status::info(&format!("Configuration from {}", source));
        print!("{}", toml::to_string_pretty(&config.schema)?);
    }
    Ok(exit_codes::SUCCESS)
}
