//! Subcommands of the `cdkey` binary and their JSON envelopes.

use std::process::ExitCode;

use cdkey_core::types::{KeyRecord, NewPack, PackInfo};
use cdkey_core::{CdkeyError, Registry};
use clap::{Args, Subcommand};
use serde::Serialize;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack administration.
    #[command(subcommand)]
    Pack(PackCommand),

    /// Key listing and redemption.
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand, Debug)]
pub enum PackCommand {
    /// List all packs.
    List,
    /// Generate a new pack.
    Add(AddArgs),
    /// Close a pack and delete its directory.
    Remove { name: String },
    /// Allow redemptions.
    Enable { name: String },
    /// Stop redemptions.
    Disable {
        name: String,
        /// Reason recorded as the pack status.
        #[arg(long, default_value = "")]
        msg: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Pack name; also the directory name.
    #[arg(required_unless_present = "json")]
    pub name: Option<String>,
    /// Leading characters shared by every code.
    #[arg(long, default_value = "")]
    pub prefix: String,
    /// Total code length, prefix included.
    #[arg(long, required_unless_present = "json")]
    pub keylen: Option<usize>,
    /// Number of codes to generate.
    #[arg(long, required_unless_present = "json")]
    pub size: Option<usize>,
    #[arg(long, default_value = "")]
    pub note: String,
    /// Full request as JSON: {"name","prefix","keylen","packsize","note"}.
    #[arg(long, conflicts_with_all = ["name", "keylen", "size"])]
    pub json: Option<String>,
}

impl AddArgs {
    pub fn to_request(&self) -> Result<NewPack, CdkeyError> {
        if let Some(json) = &self.json {
            return serde_json::from_str(json)
                .map_err(|err| CdkeyError::BadRequest(err.to_string()));
        }

        match (&self.name, self.keylen, self.size) {
            (Some(name), Some(key_len), Some(pack_size)) => Ok(NewPack {
                name: name.clone(),
                prefix: self.prefix.clone(),
                key_len,
                pack_size,
                note: self.note.clone(),
            }),
            _ => Err(CdkeyError::BadRequest(
                "name, keylen and size are required".to_string(),
            )),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// List every code of a pack with its status.
    List { pack: String },
    /// Redeem a code.
    Use { pack: String, key: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Packs {
        cmd: &'static str,
        packs: Vec<PackInfo>,
    },
    Pack {
        cmd: &'static str,
        pack: String,
    },
    Keys {
        cmd: &'static str,
        pack: String,
        keys: Vec<KeyRecord>,
    },
    KeyUsed {
        cmd: &'static str,
        pack: String,
        key: String,
    },
}

impl Command {
    /// Wire name of the command, e.g. `pack.add`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pack(PackCommand::List) => "pack.list",
            Command::Pack(PackCommand::Add(_)) => "pack.add",
            Command::Pack(PackCommand::Remove { .. }) => "pack.remove",
            Command::Pack(PackCommand::Enable { .. }) => "pack.enable",
            Command::Pack(PackCommand::Disable { .. }) => "pack.disable",
            Command::Key(KeyCommand::List { .. }) => "key.list",
            Command::Key(KeyCommand::Use { .. }) => "key.use",
        }
    }
}

/// Executes `command` against `registry`.
pub fn execute(registry: &Registry, command: &Command) -> Result<Response, CdkeyError> {
    let cmd = command.name();
    let response = match command {
        Command::Pack(PackCommand::List) => Response::Packs {
            cmd,
            packs: registry.list_packs(),
        },
        Command::Pack(PackCommand::Add(args)) => {
            let req = args.to_request()?;
            registry.add_pack(&req)?;
            Response::Pack {
                cmd,
                pack: req.name,
            }
        }
        Command::Pack(PackCommand::Remove { name }) => {
            registry.remove_pack(name)?;
            Response::Pack {
                cmd,
                pack: name.clone(),
            }
        }
        Command::Pack(PackCommand::Enable { name }) => {
            registry.enable_pack(name)?;
            Response::Pack {
                cmd,
                pack: name.clone(),
            }
        }
        Command::Pack(PackCommand::Disable { name, msg }) => {
            registry.disable_pack(name, msg)?;
            Response::Pack {
                cmd,
                pack: name.clone(),
            }
        }
        Command::Key(KeyCommand::List { pack }) => Response::Keys {
            cmd,
            pack: pack.clone(),
            keys: registry.list_keys(pack)?,
        },
        Command::Key(KeyCommand::Use { pack, key }) => {
            registry.use_key(pack, key)?;
            Response::KeyUsed {
                cmd,
                pack: pack.clone(),
                key: key.clone(),
            }
        }
    };
    Ok(response)
}

/// Executes `command` and prints its envelope.
pub fn run(registry: &Registry, command: &Command) -> ExitCode {
    match execute(registry, command) {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => report(&CdkeyError::Internal(err.to_string()), command.name()),
        },
        Err(err) => report(&err, command.name()),
    }
}

fn report(err: &CdkeyError, cmd: &str) -> ExitCode {
    let body = err.to_body(cmd);
    match serde_json::to_string(&body) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    ExitCode::FAILURE
}
