//! asmcfg - inspect and normalise an ARK server's INI configuration
//!
//! ```text
//! asmcfg [OPTIONS] [DIR]
//!
//! Arguments:
//!   [DIR]                Directory holding GameUserSettings.ini and Game.ini
//!
//! Options:
//!   --install            DIR is a server install root, not the config directory
//!   --metadata <FILE>    Profile metadata JSON; supplies DIR when it is omitted
//!   --save               Write the loaded profile back
//! ```
//!
//! Log level follows `RUST_LOG` (default `info`).

use anyhow::{bail, Context};
use asm_core::IniFile;
use asm_ini::IniLayout;
use asm_profile::{ProfileMetadata, ServerProfile, StatMultiplierKind};
use asm_settings::IniCollection;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "asmcfg", about = "Load, summarise and re-save ARK server INI settings", version)]
struct Cli {
    /// Directory holding GameUserSettings.ini and Game.ini
    dir: Option<PathBuf>,

    /// Treat DIR as a server install root
    #[arg(long)]
    install: bool,

    /// Profile metadata JSON file
    #[arg(long, env = "ASM_PROFILE_METADATA")]
    metadata: Option<PathBuf>,

    /// Write the profile back after loading
    #[arg(long)]
    save: bool,
}

impl Cli {
    fn layout(&self, metadata: Option<&ProfileMetadata>) -> anyhow::Result<IniLayout> {
        match (&self.dir, metadata) {
            (Some(dir), _) if self.install => Ok(IniLayout::for_install_dir(dir)),
            (Some(dir), _) => Ok(IniLayout::new(dir)),
            (None, Some(metadata)) => Ok(metadata.layout()),
            (None, None) => bail!("either DIR or --metadata is required"),
        }
    }
}

fn display(profile: &ServerProfile, layout: &IniLayout) {
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for file in IniFile::ALL {
        info!("{:<22} {}", file.file_name(), layout.path(file).display());
    }
    info!("Profile:               {}", profile.metadata.profile_name);
    info!("Session:               {}", profile.session_name);
    info!("Ports:                 game {} / query {}", profile.server_port, profile.query_port);
    info!("Max players:           {}", profile.max_players);
    info!("Difficulty offset:     {}", profile.difficulty_offset);
    info!("PvE:                   {}", profile.enable_pve);
    info!("RCON:                  {}", if profile.rcon_enabled { profile.rcon_port.to_string() } else { "off".into() });
    info!("Message of the day:    {}", if profile.motd_enabled { "on" } else { "off" });

    let overridden = profile.engram_overrides.iter().filter(|e| e.save_override).count();
    info!("Engram overrides:      {} of {}", overridden, profile.engram_overrides.len());
    info!("Dino damage overrides: {}", profile.dino_damage_multipliers.len());
    info!("Harvest overrides:     {}", profile.harvest_resource_multipliers.len());
    info!(
        "NPC spawn containers:  +{} -{} ={}",
        profile.npc_spawn_add.len(),
        profile.npc_spawn_subtract.len(),
        profile.npc_spawn_override.len()
    );
    info!("Supply crates:         {}", profile.supply_crate_overrides.len());
    info!("Stack sizes:           {}", profile.stack_size_overrides.len());
    info!("Engram points/level:   {}", profile.engram_points_per_level.len());
    for kind in StatMultiplierKind::ALL {
        let stats = profile.stat_multipliers(kind);
        if stats.is_enabled() {
            let included = stats.included().iter().filter(|included| **included).count();
            info!("{:<22} {} stat(s) overridden", kind.key(), included);
        }
    }
    for section in profile.custom_sections.iter() {
        info!("Custom section:        [{}] in {} ({} entries)", section.name, section.file, section.entries.len());
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let metadata = match &cli.metadata {
        Some(path) => Some(
            ProfileMetadata::load(path).with_context(|| format!("loading profile metadata {}", path.display()))?,
        ),
        None => None,
    };
    let layout = cli.layout(metadata.as_ref())?;

    let mut profile = ServerProfile::load(&layout)
        .with_context(|| format!("loading settings from {}", layout.config_dir.display()))?;
    if let Some(metadata) = metadata {
        profile.metadata = metadata;
    }

    display(&profile, &layout);

    if cli.save {
        let written = profile
            .save(&layout)
            .await
            .with_context(|| format!("saving settings to {}", layout.config_dir.display()))?;
        info!("Wrote {} file(s)", written);
    }

    Ok(())
}
