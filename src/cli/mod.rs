//! CLI subcommands: deploy, destroy, status, json, yaml, completions.

use crate::api::client::PacketClient;
use crate::api::{ApiResponse, STATUS_CREATED, STATUS_NO_CONTENT};
use crate::core::config::Settings;
use crate::core::request::{self, DeviceSpec};
use crate::core::types::{DeviceCreated, Facility, ReportMode, ServerType, Verbosity};
use crate::core::userdata::{CloudConfig, UserdataOptions};
use crate::core::{files, report};
use crate::poller::session::{self, ExitOutcome, Poller};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "virl-packet",
    version,
    about = "Provision, poll, and tear down VIRL bare-metal servers on Packet"
)]
pub struct Cli {
    /// Settings file (default: $VIRL_PACKET_CONFIG, else built-in defaults)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Server identity shared by `deploy` and `json`.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// The desired system / server name
    #[arg(short = 's', long = "server-name", value_name = "SERVER_NAME")]
    pub server_name: String,

    /// System type
    #[arg(short = 't', long = "server-type", value_enum)]
    pub server_type: ServerType,

    /// Facility
    #[arg(short = 'f', long, value_enum)]
    pub facility: Facility,
}

/// Cloud-config options shared by `deploy`, `json`, and `yaml`.
#[derive(Args, Debug, Clone, Default)]
pub struct UserdataArgs {
    /// VIRL account password
    #[arg(short = 'v', long = "virl-password", value_name = "VIRL_PW")]
    pub virl_password: Option<String>,

    /// UWM account password
    #[arg(short = 'u', long = "uwm-password", value_name = "UWM_PW")]
    pub uwm_password: Option<String>,

    /// Guest account password
    #[arg(short = 'g', long = "guest-password", value_name = "GUEST_PW")]
    pub guest_password: Option<String>,

    /// License file (format: id.domain.tld.pem)
    #[arg(short = 'l', long = "license", value_name = "LICENSE_FILE")]
    pub license: Option<PathBuf>,
}

impl From<UserdataArgs> for UserdataOptions {
    fn from(args: UserdataArgs) -> Self {
        Self {
            virl_password: args.virl_password,
            uwm_password: args.uwm_password,
            guest_password: args.guest_password,
            license_file: args.license,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a VIRL system on Packet
    Deploy {
        /// An API key associated with your Packet account
        #[arg(short = 'a', long, env = "PACKET_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// A project ID associated with your Packet account
        #[arg(short = 'p', long = "project", env = "PACKET_PROJECT_ID")]
        project_id: Option<String>,

        #[command(flatten)]
        device: DeviceArgs,

        #[command(flatten)]
        userdata: UserdataArgs,

        /// What to print (default: nothing; the exit code carries the HTTP status)
        #[arg(long, value_enum)]
        output: Option<ReportMode>,
    },

    /// Destroy the VIRL system identified by UUID
    Destroy {
        /// An API key associated with your Packet account
        #[arg(short = 'a', long, env = "PACKET_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// The UUID of the system to destroy
        #[arg(short = 'u', long)]
        uuid: String,

        /// What to print: status or json (default: nothing)
        #[arg(long, value_enum)]
        output: Option<ReportMode>,
    },

    /// Display deployment status; exit once the system is ready for use
    Status {
        /// An API key associated with your Packet account
        #[arg(short = 'a', long, env = "PACKET_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// The UUID of the system to watch
        #[arg(short = 'u', long)]
        uuid: String,

        /// Output mode
        #[arg(short = 'm', long, value_enum, default_value_t = Verbosity::Normal)]
        mode: Verbosity,

        /// Shorthand for --mode ip-only
        #[arg(short = 'q', conflicts_with_all = ["mode", "silent"])]
        ip_only: bool,

        /// Shorthand for --mode silent
        #[arg(long = "qq", conflicts_with = "mode")]
        silent: bool,
    },

    /// Write a device request body for use with cURL
    Json {
        /// The output file
        #[arg(short = 'o', long = "output-file", value_name = "OUTPUT_FILE")]
        output_file: PathBuf,

        #[command(flatten)]
        device: DeviceArgs,

        #[command(flatten)]
        userdata: UserdataArgs,
    },

    /// Write cloud-config userdata for the Packet portal
    Yaml {
        /// The output file
        #[arg(short = 'o', long = "output-file", value_name = "OUTPUT_FILE")]
        output_file: PathBuf,

        #[command(flatten)]
        userdata: UserdataArgs,
    },

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Dispatch a CLI command. `Ok` carries the process exit code.
pub async fn dispatch(cmd: Commands, settings: &Settings) -> Result<i32, String> {
    let mut stdout = std::io::stdout();
    match cmd {
        Commands::Deploy {
            api_key,
            project_id,
            device,
            userdata,
            output,
        } => {
            let spec = DeviceSpec {
                hostname: device.server_name,
                server_type: device.server_type,
                facility: device.facility,
                userdata: userdata.into(),
            };
            cmd_deploy(
                settings,
                api_key.as_deref(),
                project_id.as_deref(),
                &spec,
                output,
                &mut stdout,
            )
            .await
        }
        Commands::Destroy {
            api_key,
            uuid,
            output,
        } => cmd_destroy(settings, api_key.as_deref(), &uuid, output, &mut stdout).await,
        Commands::Status {
            api_key,
            uuid,
            mode,
            ip_only,
            silent,
        } => {
            let mode = resolve_mode(mode, ip_only, silent);
            cmd_status(settings, api_key.as_deref(), &uuid, mode, &mut stdout).await
        }
        Commands::Json {
            output_file,
            device,
            userdata,
        } => {
            let spec = DeviceSpec {
                hostname: device.server_name,
                server_type: device.server_type,
                facility: device.facility,
                userdata: userdata.into(),
            };
            cmd_json(settings, &spec, &output_file)
        }
        Commands::Yaml {
            output_file,
            userdata,
        } => {
            let userdata: UserdataOptions = userdata.into();
            cmd_yaml(&userdata, &output_file, &mut stdout)
        }
        Commands::Completions { shell } => cmd_completions(shell, &mut stdout),
    }
}

fn resolve_mode(mode: Verbosity, ip_only: bool, silent: bool) -> Verbosity {
    if silent {
        Verbosity::Silent
    } else if ip_only {
        Verbosity::IpOnly
    } else {
        mode
    }
}

/// Flag (or its env var) wins over the settings file.
fn resolve_api_key(flag: Option<&str>, settings: &Settings) -> Result<String, String> {
    flag.or(settings.api_key.as_deref())
        .map(str::to_string)
        .ok_or_else(|| {
            "no API key: pass -a/--api-key, set PACKET_API_KEY, or add api_key to the settings file"
                .to_string()
        })
}

fn resolve_project(flag: Option<&str>, settings: &Settings) -> Result<String, String> {
    flag.or(settings.project_id.as_deref())
        .map(str::to_string)
        .ok_or_else(|| {
            "no project: pass -p/--project, set PACKET_PROJECT_ID, or add project_id to the settings file"
                .to_string()
        })
}

fn client_for(settings: &Settings, api_key: Option<&str>) -> Result<PacketClient, String> {
    let token = resolve_api_key(api_key, settings)?;
    PacketClient::new(&settings.api_url, token).map_err(|e| e.to_string())
}

async fn cmd_deploy<W: Write>(
    settings: &Settings,
    api_key: Option<&str>,
    project_id: Option<&str>,
    spec: &DeviceSpec,
    output: Option<ReportMode>,
    out: &mut W,
) -> Result<i32, String> {
    let project = resolve_project(project_id, settings)?;
    let request = request::build_device_request(spec, &settings.ipxe_url)?;
    let client = client_for(settings, api_key)?;

    tracing::info!(
        hostname = %request.hostname,
        plan = %request.plan,
        facility = %request.facility,
        userdata = request.userdata.is_some(),
        "creating device"
    );
    let response = client
        .create_device(&project, &request)
        .await
        .map_err(|e| e.to_string())?;

    print_response(&response, STATUS_CREATED, output, out)?;
    Ok(i32::from(response.status))
}

async fn cmd_destroy<W: Write>(
    settings: &Settings,
    api_key: Option<&str>,
    uuid: &str,
    output: Option<ReportMode>,
    out: &mut W,
) -> Result<i32, String> {
    if output == Some(ReportMode::Uuid) {
        return Err("--output uuid is only available for deploy".to_string());
    }
    let client = client_for(settings, api_key)?;

    tracing::info!(uuid, "deleting device");
    let response = client.delete_device(uuid).await.map_err(|e| e.to_string())?;

    print_response(&response, STATUS_NO_CONTENT, output, out)?;
    Ok(i32::from(response.status))
}

/// Print a one-shot call result as the selected report mode asks.
fn print_response<W: Write>(
    response: &ApiResponse,
    success: u16,
    output: Option<ReportMode>,
    out: &mut W,
) -> Result<(), String> {
    let text = match output {
        None => return Ok(()),
        Some(ReportMode::Status) => report::status_text(response.status, success),
        Some(ReportMode::Uuid) => {
            if !response.is(success) {
                tracing::warn!(status = response.status, "no device created");
                return Ok(());
            }
            let body = response.body.clone().unwrap_or_default();
            let created: DeviceCreated = serde_json::from_value(body)
                .map_err(|e| format!("malformed response from Packet: {}", e))?;
            created.id
        }
        Some(ReportMode::Json) => match response.body {
            Some(ref body) => report::pretty_json(body)?,
            None => return Ok(()),
        },
    };
    writeln!(out, "{}", text).map_err(|e| format!("write error: {}", e))
}

async fn cmd_status<W: Write>(
    settings: &Settings,
    api_key: Option<&str>,
    uuid: &str,
    mode: Verbosity,
    out: &mut W,
) -> Result<i32, String> {
    let client = client_for(settings, api_key)?;

    let ExitOutcome(code) = match Poller::new(&client).await_completion(uuid, mode, out).await {
        Ok(outcome) => outcome,
        Err(e) => session::report_failure(&e, mode, out),
    };
    Ok(code)
}

fn cmd_json(settings: &Settings, spec: &DeviceSpec, output_file: &Path) -> Result<i32, String> {
    let request = request::build_device_request(spec, &settings.ipxe_url)?;
    let json =
        serde_json::to_string(&request).map_err(|e| format!("JSON serialize error: {}", e))?;
    files::write_atomic(output_file, &json)?;
    Ok(0)
}

fn cmd_yaml<W: Write>(
    userdata: &UserdataOptions,
    output_file: &Path,
    out: &mut W,
) -> Result<i32, String> {
    let Some(cloud_config) = CloudConfig::from_options(userdata)? else {
        writeln!(out, "No arguments were provided so there's nothing to do.")
            .map_err(|e| format!("write error: {}", e))?;
        return Ok(0);
    };
    files::write_atomic(output_file, &cloud_config.render_spaced()?)?;
    Ok(0)
}

fn cmd_completions<W: Write>(shell: clap_complete::Shell, out: &mut W) -> Result<i32, String> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "virl-packet", out);
    Ok(0)
}
