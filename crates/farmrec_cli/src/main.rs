//! Command-line front end for the farm record store.
//!
//! Every subcommand prints one JSON document to stdout. Failed actions and
//! page errors exit with status 1.

mod api;
mod config;

use api::{ActionResponse, ApiResult};
use clap::{Args, Parser, Subcommand};
use config::{AppConfig, ConfigFlags};
use farmrec_core::form::REMOVAL_REASON_FIELD;
use farmrec_core::{
    core_version, init_logging, open_db, FormInput, ListCriteria, LookupKind, PageSize,
};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "farmrec", about = "Crab and pond farm records", version)]
struct Cli {
    /// SQLite database file [env: FARMREC_DB_PATH]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error [env: FARMREC_LOG_LEVEL]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files [env: FARMREC_LOG_DIR]
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    resource: Resource,
}

#[derive(Debug, Subcommand)]
enum Resource {
    /// Crab records
    Crabs {
        #[command(subcommand)]
        action: CrabAction,
    },
    /// Pond records
    Ponds {
        #[command(subcommand)]
        action: PondAction,
    },
    /// Gender lookup table
    Genders {
        #[command(subcommand)]
        action: LookupAction,
    },
    /// Crab type lookup table
    CrabTypes {
        #[command(subcommand)]
        action: LookupAction,
    },
    /// Print every option list
    Enums,
}

#[derive(Debug, Subcommand)]
enum CrabAction {
    List(ListArgs),
    CreateForm,
    Store(FieldArgs),
    EditForm {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Destroy {
        id: Uuid,
        #[command(flatten)]
        removal: RemovalArgs,
    },
}

#[derive(Debug, Subcommand)]
enum PondAction {
    List(ListArgs),
    CreateForm,
    Store(FieldArgs),
    Show {
        id: Uuid,
    },
    EditForm {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Destroy {
        id: Uuid,
        #[command(flatten)]
        removal: RemovalArgs,
    },
}

#[derive(Debug, Subcommand)]
enum LookupAction {
    List,
    Store(FieldArgs),
    EditForm {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Destroy {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive text search
    #[arg(long, default_value = "")]
    search: String,

    /// Categorical filter as FIELD=VALUE; VALUE `All` disables it
    #[arg(long = "filter", value_parser = parse_key_value)]
    filters: Vec<(String, String)>,

    #[arg(long, default_value_t = 1)]
    page: usize,

    /// One of 5, 10, 20, 50, 100
    #[arg(long, default_value = "10", value_parser = parse_page_size)]
    page_size: PageSize,
}

#[derive(Debug, Args)]
struct FieldArgs {
    /// Form field as NAME=VALUE; repeat per field
    #[arg(long = "field", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct RemovalArgs {
    /// Removal reason
    #[arg(long)]
    reason: Option<String>,
}

impl Cli {
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            db: self.db.clone(),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

impl Resource {
    fn name(&self) -> &'static str {
        match self {
            Self::Crabs { .. } => "crabs",
            Self::Ponds { .. } => "ponds",
            Self::Genders { .. } => "genders",
            Self::CrabTypes { .. } => "crab-types",
            Self::Enums => "enums",
        }
    }
}

impl From<ListArgs> for ListCriteria {
    fn from(value: ListArgs) -> Self {
        Self {
            search: value.search,
            filters: value.filters.into_iter().collect::<BTreeMap<_, _>>(),
            page: value.page,
            page_size: value.page_size,
        }
    }
}

impl FieldArgs {
    fn into_input(self) -> FormInput {
        self.fields.into_iter().collect()
    }
}

impl RemovalArgs {
    fn into_input(self) -> FormInput {
        self.reason
            .into_iter()
            .map(|reason| (REMOVAL_REASON_FIELD, reason))
            .collect()
    }
}

/// JSON document plus whether the command succeeded.
struct Rendered {
    body: Value,
    ok: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::resolve(cli.config_flags()) {
        Ok(config) => config,
        Err(err) => return emit(failure(format!("invalid configuration: {err}"))),
    };
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("farmrec: logging disabled: {err}");
        }
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_command module=cli status=error error_code=db_open_failed error={err}");
            return emit(failure(format!("failed to open database: {err}")));
        }
    };

    info!(
        "event=cli_command module=cli status=start resource={} version={}",
        cli.resource.name(),
        core_version()
    );
    emit(dispatch(&conn, cli.resource))
}

fn dispatch(conn: &Connection, resource: Resource) -> Rendered {
    match resource {
        Resource::Crabs { action } => match action {
            CrabAction::List(args) => page(api::crab_index(conn, args.into())),
            CrabAction::CreateForm => page(api::crab_create_form(conn)),
            CrabAction::Store(fields) => respond(api::crab_store(conn, &fields.into_input())),
            CrabAction::EditForm { id } => page(api::crab_edit_form(conn, id)),
            CrabAction::Update { id, fields } => {
                respond(api::crab_update(conn, id, &fields.into_input()))
            }
            CrabAction::Destroy { id, removal } => {
                respond(api::crab_destroy(conn, id, &removal.into_input()))
            }
        },
        Resource::Ponds { action } => match action {
            PondAction::List(args) => page(api::pond_index(conn, args.into())),
            PondAction::CreateForm => page(api::pond_create_form(conn)),
            PondAction::Store(fields) => respond(api::pond_store(conn, &fields.into_input())),
            PondAction::Show { id } => page(api::pond_show(conn, id)),
            PondAction::EditForm { id } => page(api::pond_edit_form(conn, id)),
            PondAction::Update { id, fields } => {
                respond(api::pond_update(conn, id, &fields.into_input()))
            }
            PondAction::Destroy { id, removal } => {
                respond(api::pond_destroy(conn, id, &removal.into_input()))
            }
        },
        Resource::Genders { action } => dispatch_lookup(conn, LookupKind::Gender, action),
        Resource::CrabTypes { action } => dispatch_lookup(conn, LookupKind::CrabType, action),
        Resource::Enums => page(Ok(api::enums())),
    }
}

fn dispatch_lookup(conn: &Connection, kind: LookupKind, lookup: LookupAction) -> Rendered {
    match lookup {
        LookupAction::List => page(api::lookup_index(conn, kind)),
        LookupAction::Store(fields) => {
            respond(api::lookup_store(conn, kind, &fields.into_input()))
        }
        LookupAction::EditForm { id } => page(api::lookup_edit_form(conn, kind, id)),
        LookupAction::Update { id, fields } => {
            respond(api::lookup_update(conn, kind, id, &fields.into_input()))
        }
        LookupAction::Destroy { id } => respond(api::lookup_destroy(conn, kind, id)),
    }
}

fn page<T: Serialize>(result: ApiResult<T>) -> Rendered {
    match result {
        Ok(payload) => match serde_json::to_value(payload) {
            Ok(body) => Rendered { body, ok: true },
            Err(err) => failure(format!("failed to encode page: {err}")),
        },
        Err(err) => failure(err.to_string()),
    }
}

fn respond(response: ActionResponse) -> Rendered {
    let ok = response.ok;
    match serde_json::to_value(&response) {
        Ok(body) => Rendered { body, ok },
        Err(err) => failure(format!("failed to encode response: {err}")),
    }
}

fn failure(message: String) -> Rendered {
    Rendered {
        body: json!({ "ok": false, "message": message }),
        ok: false,
    }
}

fn emit(rendered: Rendered) -> ExitCode {
    match serde_json::to_string_pretty(&rendered.body) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("farmrec: failed to print output: {err}"),
    }
    if rendered.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    let value: u32 = raw
        .parse()
        .map_err(|_| format!("page size must be a number, got `{raw}`"))?;
    PageSize::try_from(value).map_err(|err| err.to_string())
}
