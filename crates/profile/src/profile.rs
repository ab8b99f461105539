//! Server profile
//!
//! [`ServerProfile`] owns every typed setting of one server instance and
//! knows where each lives in `GameUserSettings.ini` / `Game.ini`. The
//! mapping is a single static [`BindingTable`] used by both load and save.

use crate::error::Result;
use crate::gamedata::{BuiltinGameData, GameData, StatMultiplierKind};
use crate::metadata::ProfileMetadata;
use crate::records::{
    ClassMultiplier, EngramEntry, NpcSpawnContainer, StackSizeOverride, SupplyCrateOverride,
};
use asm_core::{IniFile, IniSection};
use asm_ini::{IniLayout, IniSession};
use asm_settings::{
    AggregateRecordList, BindingTable, CustomSections, DefaultProvider, IniCollection,
    ScalarValueList,
};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// A profile shared across threads.
///
/// Loading and saving take the write lock, so at most one of them runs per
/// profile at a time.
pub type SharedProfile = Arc<RwLock<ServerProfile>>;

/// Complete settings of one server instance
#[derive(Debug)]
pub struct ServerProfile {
    /// Non-INI settings, persisted separately as JSON
    pub metadata: ProfileMetadata,

    // ========== [ServerSettings] ==========
    /// Join password (from "ServerPassword")
    pub server_password: String,
    /// RCON and admin command password (from "ServerAdminPassword")
    pub admin_password: String,
    /// Spectator mode password (from "SpectatorPassword")
    pub spectator_password: String,
    /// Wild creature level scale (from "DifficultyOffset", default: 0.2)
    pub difficulty_offset: f32,
    /// Official difficulty override (from "OverrideOfficialDifficulty", default: 5)
    pub override_official_difficulty: f32,
    /// PvE mode (from "serverPVE")
    pub enable_pve: bool,
    /// Third person camera (from "AllowThirdPersonPlayer", default: true)
    pub allow_third_person: bool,
    /// Crosshair (from "ServerCrosshair", default: true)
    pub show_crosshair: bool,
    /// Own position on the map (from "ShowMapPlayerLocation", default: true)
    pub show_map_player_location: bool,
    /// Hardcore mode (from "ServerHardcore")
    pub enable_hardcore: bool,
    /// Experience gain (from "XPMultiplier", default: 1)
    pub xp_multiplier: f32,
    /// Taming speed (from "TamingSpeedMultiplier", default: 1)
    pub taming_speed_multiplier: f32,
    /// Resource yield (from "HarvestAmountMultiplier", default: 1)
    pub harvest_amount_multiplier: f32,
    /// Day/night cycle speed (from "DayCycleSpeedScale", default: 1)
    pub day_cycle_speed_scale: f32,
    /// World save interval (from "AutoSavePeriodMinutes", default: 15)
    pub auto_save_period_minutes: f32,
    /// Stored inverted as `bDisableStructureDecayPvE`
    pub enable_structure_decay_pve: bool,
    /// Flyers may carry in PvE (from "AllowFlyerCarryPvE")
    pub allow_flyer_carry_pve: bool,
    /// Structure density limit (from "TheMaxStructuresInRange", default: 10500)
    pub max_structures_in_range: i32,
    /// Comma separated mod ids (from "ActiveMods")
    pub active_mods: String,
    pub rcon_enabled: bool,
    /// RCON listen port (from "RCONPort", default: 32330)
    pub rcon_port: i32,
    /// Only written while RCON is on; the server manages it otherwise
    pub rcon_game_log_buffer: i32,
    /// Set on load when `KickIdlePlayersPeriod` is present
    pub enable_kick_idle_players: bool,
    /// Seconds before idle players are kicked (default: 3600)
    pub kick_idle_players_period: f32,

    // ========== [SessionSettings] ==========
    /// Name shown in the server browser (from "SessionName")
    pub session_name: String,
    /// Game port (from "Port", default: 7777)
    pub server_port: i32,
    /// Steam query port (from "QueryPort", default: 27015)
    pub query_port: i32,
    /// Bind address; `[MultiHome] MultiHome=True` is written while set
    pub server_ip: String,

    // ========== [/Script/Engine.GameSession] ==========
    /// Player slots (from "MaxPlayers", default: 70)
    pub max_players: i32,

    // ========== [MessageOfTheDay] ==========
    /// Set on load when a message is present; the section is dropped while off
    pub motd_enabled: bool,
    /// Message text; newlines are stored as `\n`
    pub motd: String,
    /// Seconds the message stays on screen (default: 20)
    pub motd_duration: i32,

    // ========== [/script/shootergame.shootergamemode] ==========
    pub use_corpse_locator: bool,
    pub disable_friendly_fire: bool,
    pub allow_unlimited_respecs: bool,
    pub mating_interval_multiplier: f32,
    pub egg_hatch_speed_multiplier: f32,
    pub baby_mature_speed_multiplier: f32,
    /// Entries kept per tribe log (from "MaxTribeLogs", default: 400)
    pub max_tribe_logs: i32,

    /// Per-class dino damage (from "DinoClassDamageMultipliers")
    pub dino_damage_multipliers: AggregateRecordList<ClassMultiplier>,
    /// Per-class dino resistance (from "DinoClassResistanceMultipliers")
    pub dino_resistance_multipliers: AggregateRecordList<ClassMultiplier>,
    /// Per-class tamed dino damage (from "TamedDinoClassDamageMultipliers")
    pub tamed_dino_damage_multipliers: AggregateRecordList<ClassMultiplier>,
    /// Per-class tamed dino resistance (from "TamedDinoClassResistanceMultipliers")
    pub tamed_dino_resistance_multipliers: AggregateRecordList<ClassMultiplier>,
    /// Per-resource yield (from "HarvestResourceItemAmountClassMultipliers")
    pub harvest_resource_multipliers: AggregateRecordList<ClassMultiplier>,
    /// Full engram catalog; only overridden entries are written
    pub engram_overrides: AggregateRecordList<EngramEntry>,
    pub npc_spawn_add: AggregateRecordList<NpcSpawnContainer>,
    pub npc_spawn_subtract: AggregateRecordList<NpcSpawnContainer>,
    pub npc_spawn_override: AggregateRecordList<NpcSpawnContainer>,
    /// Supply crate loot tables (from "ConfigOverrideSupplyCrateItems")
    pub supply_crate_overrides: AggregateRecordList<SupplyCrateOverride>,
    /// Item stack limits (from "ConfigOverrideItemMaxQuantity")
    pub stack_size_overrides: AggregateRecordList<StackSizeOverride>,
    /// Engram points granted at each level, one line per level
    pub engram_points_per_level: ScalarValueList<i32>,
    /// Per-level stat multipliers, indexed by stat; see [`StatMultiplierKind`]
    pub stats_player: ScalarValueList<f32>,
    pub stats_dino_wild: ScalarValueList<f32>,
    pub stats_dino_tamed: ScalarValueList<f32>,
    pub stats_dino_tamed_add: ScalarValueList<f32>,
    pub stats_dino_tamed_affinity: ScalarValueList<f32>,

    /// Sections not listed in [`IniSection`], carried through untouched
    pub custom_sections: CustomSections,
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinGameData))
    }
}

impl ServerProfile {
    /// A profile with stock settings, reconciling against `game_data`
    pub fn new(game_data: Arc<dyn GameData>) -> Self {
        let engrams: DefaultProvider<EngramEntry> = {
            let game_data = Arc::clone(&game_data);
            Arc::new(move || game_data.engrams())
        };
        let stats = |kind| ScalarValueList::array(game_data.stat_multipliers(kind));

        Self {
            metadata: ProfileMetadata::default(),

            server_password: String::new(),
            admin_password: String::new(),
            spectator_password: String::new(),
            difficulty_offset: 0.2,
            override_official_difficulty: 5.0,
            enable_pve: false,
            allow_third_person: true,
            show_crosshair: true,
            show_map_player_location: true,
            enable_hardcore: false,
            xp_multiplier: 1.0,
            taming_speed_multiplier: 1.0,
            harvest_amount_multiplier: 1.0,
            day_cycle_speed_scale: 1.0,
            auto_save_period_minutes: 15.0,
            enable_structure_decay_pve: true,
            allow_flyer_carry_pve: false,
            max_structures_in_range: 10500,
            active_mods: String::new(),
            rcon_enabled: false,
            rcon_port: 32330,
            rcon_game_log_buffer: 600,
            enable_kick_idle_players: false,
            kick_idle_players_period: 3600.0,

            session_name: "My ARK Server".into(),
            server_port: 7777,
            query_port: 27015,
            server_ip: String::new(),

            max_players: 70,

            motd_enabled: false,
            motd: String::new(),
            motd_duration: 20,

            use_corpse_locator: true,
            disable_friendly_fire: false,
            allow_unlimited_respecs: false,
            mating_interval_multiplier: 1.0,
            egg_hatch_speed_multiplier: 1.0,
            baby_mature_speed_multiplier: 1.0,
            max_tribe_logs: 400,

            dino_damage_multipliers: AggregateRecordList::new(),
            dino_resistance_multipliers: AggregateRecordList::new(),
            tamed_dino_damage_multipliers: AggregateRecordList::new(),
            tamed_dino_resistance_multipliers: AggregateRecordList::new(),
            harvest_resource_multipliers: AggregateRecordList::new(),
            engram_overrides: AggregateRecordList::with_defaults(engrams),
            npc_spawn_add: AggregateRecordList::new(),
            npc_spawn_subtract: AggregateRecordList::new(),
            npc_spawn_override: AggregateRecordList::new(),
            supply_crate_overrides: AggregateRecordList::new(),
            stack_size_overrides: AggregateRecordList::new(),
            engram_points_per_level: ScalarValueList::flat(),
            stats_player: stats(StatMultiplierKind::Player),
            stats_dino_wild: stats(StatMultiplierKind::DinoWild),
            stats_dino_tamed: stats(StatMultiplierKind::DinoTamed),
            stats_dino_tamed_add: stats(StatMultiplierKind::DinoTamedAdd),
            stats_dino_tamed_affinity: stats(StatMultiplierKind::DinoTamedAffinity),

            custom_sections: CustomSections::new(),
        }
    }

    /// Load the INI pair at `layout` over stock settings
    pub fn load(layout: &IniLayout) -> Result<Self> {
        Self::load_with(layout, Arc::new(BuiltinGameData))
    }

    pub fn load_with(layout: &IniLayout, game_data: Arc<dyn GameData>) -> Result<Self> {
        let mut profile = Self::new(game_data);
        let session = IniSession::new(layout.clone());
        profile.read_from(&session)?;
        info!("Loaded profile from {}", layout.config_dir.display());
        Ok(profile)
    }

    /// Load the metadata file, then the INI pair under its install directory
    pub fn open(metadata_path: &Path) -> Result<Self> {
        let metadata = ProfileMetadata::load(metadata_path)?;
        let mut profile = Self::load(&metadata.layout())?;
        profile.metadata = metadata;
        Ok(profile)
    }

    /// Populate from an open session; absent keys keep their current values
    pub fn read_from(&mut self, session: &IniSession) -> Result<()> {
        bindings().deserialize(self, session)?;
        self.custom_sections = CustomSections::load(session, &IniFile::ALL)?;
        Ok(())
    }

    /// Write every setting into an open session without flushing it
    pub fn write_to(&self, session: &IniSession) -> Result<()> {
        bindings().serialize(self, session)?;
        self.custom_sections.save(session)?;
        Ok(())
    }

    /// Write the INI pair at `layout`, keeping anything the profile does not bind.
    ///
    /// Returns the number of files written.
    pub async fn save(&self, layout: &IniLayout) -> Result<usize> {
        let session = IniSession::new(layout.clone());
        self.write_to(&session)?;
        let written = session.flush().await?;
        info!("Saved profile to {}", layout.config_dir.display());
        Ok(written)
    }

    /// Save the metadata file and the INI pair under its install directory
    pub async fn save_all(&self, metadata_path: &Path) -> Result<usize> {
        self.metadata.save(metadata_path)?;
        self.save(&self.metadata.layout()).await
    }

    pub fn stat_multipliers(&self, kind: StatMultiplierKind) -> &ScalarValueList<f32> {
        match kind {
            StatMultiplierKind::Player => &self.stats_player,
            StatMultiplierKind::DinoWild => &self.stats_dino_wild,
            StatMultiplierKind::DinoTamed => &self.stats_dino_tamed,
            StatMultiplierKind::DinoTamedAdd => &self.stats_dino_tamed_add,
            StatMultiplierKind::DinoTamedAffinity => &self.stats_dino_tamed_affinity,
        }
    }

    pub fn stat_multipliers_mut(&mut self, kind: StatMultiplierKind) -> &mut ScalarValueList<f32> {
        match kind {
            StatMultiplierKind::Player => &mut self.stats_player,
            StatMultiplierKind::DinoWild => &mut self.stats_dino_wild,
            StatMultiplierKind::DinoTamed => &mut self.stats_dino_tamed,
            StatMultiplierKind::DinoTamedAdd => &mut self.stats_dino_tamed_add,
            StatMultiplierKind::DinoTamedAffinity => &mut self.stats_dino_tamed_affinity,
        }
    }

    pub fn into_shared(self) -> SharedProfile {
        Arc::new(RwLock::new(self))
    }
}

/// Reload a shared profile in place from the INI pair at `layout`
pub fn load_shared(profile: &SharedProfile, layout: &IniLayout) -> Result<()> {
    let session = IniSession::new(layout.clone());
    profile.write().read_from(&session)
}

/// Save a shared profile; the lock is released before the files are written
pub async fn save_shared(profile: &SharedProfile, layout: &IniLayout) -> Result<usize> {
    let session = IniSession::new(layout.clone());
    profile.write().write_to(&session)?;
    Ok(session.flush().await?)
}

/// INI location of every profile setting
pub fn bindings() -> &'static BindingTable<ServerProfile> {
    static BINDINGS: OnceLock<BindingTable<ServerProfile>> = OnceLock::new();
    BINDINGS.get_or_init(|| {
        use IniSection::*;

        BindingTable::<ServerProfile>::builder()
            // ServerSettings
            .text(ServerSettings, "ServerPassword", |p| p.server_password.as_str(), |p, v| p.server_password = v)
            .text(ServerSettings, "ServerAdminPassword", |p| p.admin_password.as_str(), |p, v| p.admin_password = v)
            .text(ServerSettings, "SpectatorPassword", |p| p.spectator_password.as_str(), |p, v| p.spectator_password = v)
            .float(ServerSettings, "DifficultyOffset", |p| p.difficulty_offset, |p, v| p.difficulty_offset = v)
            .float(
                ServerSettings,
                "OverrideOfficialDifficulty",
                |p| p.override_official_difficulty,
                |p, v| p.override_official_difficulty = v,
            )
            .bool(ServerSettings, "serverPVE", |p| p.enable_pve, |p, v| p.enable_pve = v)
            .bool(ServerSettings, "AllowThirdPersonPlayer", |p| p.allow_third_person, |p, v| p.allow_third_person = v)
            .bool(ServerSettings, "ServerCrosshair", |p| p.show_crosshair, |p, v| p.show_crosshair = v)
            .bool(
                ServerSettings,
                "ShowMapPlayerLocation",
                |p| p.show_map_player_location,
                |p, v| p.show_map_player_location = v,
            )
            .bool(ServerSettings, "ServerHardcore", |p| p.enable_hardcore, |p, v| p.enable_hardcore = v)
            .float(ServerSettings, "XPMultiplier", |p| p.xp_multiplier, |p, v| p.xp_multiplier = v)
            .float(
                ServerSettings,
                "TamingSpeedMultiplier",
                |p| p.taming_speed_multiplier,
                |p, v| p.taming_speed_multiplier = v,
            )
            .float(
                ServerSettings,
                "HarvestAmountMultiplier",
                |p| p.harvest_amount_multiplier,
                |p, v| p.harvest_amount_multiplier = v,
            )
            .float(ServerSettings, "DayCycleSpeedScale", |p| p.day_cycle_speed_scale, |p, v| p.day_cycle_speed_scale = v)
            .float(
                ServerSettings,
                "AutoSavePeriodMinutes",
                |p| p.auto_save_period_minutes,
                |p, v| p.auto_save_period_minutes = v,
            )
            .bool(
                ServerSettings,
                "bDisableStructureDecayPvE",
                |p| p.enable_structure_decay_pve,
                |p, v| p.enable_structure_decay_pve = v,
            )
            .invert()
            .bool(ServerSettings, "AllowFlyerCarryPvE", |p| p.allow_flyer_carry_pve, |p, v| p.allow_flyer_carry_pve = v)
            .int(
                ServerSettings,
                "TheMaxStructuresInRange",
                |p| p.max_structures_in_range,
                |p, v| p.max_structures_in_range = v,
            )
            .text(ServerSettings, "ActiveMods", |p| p.active_mods.as_str(), |p, v| p.active_mods = v)
            .bool(ServerSettings, "RCONEnabled", |p| p.rcon_enabled, |p, v| p.rcon_enabled = v)
            .int(ServerSettings, "RCONPort", |p| p.rcon_port, |p, v| p.rcon_port = v)
            .int(
                ServerSettings,
                "RCONServerGameLogBuffer",
                |p| p.rcon_game_log_buffer,
                |p, v| p.rcon_game_log_buffer = v,
            )
            .clear_when_off(|p| p.rcon_enabled)
            .float(
                ServerSettings,
                "KickIdlePlayersPeriod",
                |p| p.kick_idle_players_period,
                |p, v| p.kick_idle_players_period = v,
            )
            .conditioned_on(|p| p.enable_kick_idle_players, |p, v| p.enable_kick_idle_players = v)
            // SessionSettings
            .text(SessionSettings, "SessionName", |p| p.session_name.as_str(), |p, v| p.session_name = v)
            .int(SessionSettings, "Port", |p| p.server_port, |p, v| p.server_port = v)
            .int(SessionSettings, "QueryPort", |p| p.query_port, |p, v| p.query_port = v)
            .text(SessionSettings, "MultiHome", |p| p.server_ip.as_str(), |p, v| p.server_ip = v)
            .text(MultiHome, "MultiHome", |p| p.server_ip.as_str(), |p, v| p.server_ip = v)
            .write_bool_if_non_empty()
            // GameSession
            .int(GameSession, "MaxPlayers", |p| p.max_players, |p, v| p.max_players = v)
            // MessageOfTheDay
            .text(MessageOfTheDay, "Message", |p| p.motd.as_str(), |p, v| p.motd = v)
            .multiline()
            .clear_section()
            .conditioned_on(|p| p.motd_enabled, |p, v| p.motd_enabled = v)
            .int(MessageOfTheDay, "Duration", |p| p.motd_duration, |p, v| p.motd_duration = v)
            .conditioned_on(|p| p.motd_enabled, |p, v| p.motd_enabled = v)
            // ShooterGameMode
            .bool(ShooterGameMode, "bUseCorpseLocator", |p| p.use_corpse_locator, |p, v| p.use_corpse_locator = v)
            .bool(
                ShooterGameMode,
                "bDisableFriendlyFire",
                |p| p.disable_friendly_fire,
                |p, v| p.disable_friendly_fire = v,
            )
            .bool(
                ShooterGameMode,
                "bAllowUnlimitedRespecs",
                |p| p.allow_unlimited_respecs,
                |p, v| p.allow_unlimited_respecs = v,
            )
            .float(
                ShooterGameMode,
                "MatingIntervalMultiplier",
                |p| p.mating_interval_multiplier,
                |p, v| p.mating_interval_multiplier = v,
            )
            .float(
                ShooterGameMode,
                "EggHatchSpeedMultiplier",
                |p| p.egg_hatch_speed_multiplier,
                |p, v| p.egg_hatch_speed_multiplier = v,
            )
            .float(
                ShooterGameMode,
                "BabyMatureSpeedMultiplier",
                |p| p.baby_mature_speed_multiplier,
                |p, v| p.baby_mature_speed_multiplier = v,
            )
            .int(ShooterGameMode, "MaxTribeLogs", |p| p.max_tribe_logs, |p, v| p.max_tribe_logs = v)
            .collection(
                ShooterGameMode,
                "DinoClassDamageMultipliers",
                |p| &p.dino_damage_multipliers as &dyn IniCollection,
                |p| &mut p.dino_damage_multipliers as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "DinoClassResistanceMultipliers",
                |p| &p.dino_resistance_multipliers as &dyn IniCollection,
                |p| &mut p.dino_resistance_multipliers as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "TamedDinoClassDamageMultipliers",
                |p| &p.tamed_dino_damage_multipliers as &dyn IniCollection,
                |p| &mut p.tamed_dino_damage_multipliers as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "TamedDinoClassResistanceMultipliers",
                |p| &p.tamed_dino_resistance_multipliers as &dyn IniCollection,
                |p| &mut p.tamed_dino_resistance_multipliers as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "HarvestResourceItemAmountClassMultipliers",
                |p| &p.harvest_resource_multipliers as &dyn IniCollection,
                |p| &mut p.harvest_resource_multipliers as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "OverrideNamedEngramEntries",
                |p| &p.engram_overrides as &dyn IniCollection,
                |p| &mut p.engram_overrides as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "ConfigAddNPCSpawnEntriesContainer",
                |p| &p.npc_spawn_add as &dyn IniCollection,
                |p| &mut p.npc_spawn_add as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "ConfigSubtractNPCSpawnEntriesContainer",
                |p| &p.npc_spawn_subtract as &dyn IniCollection,
                |p| &mut p.npc_spawn_subtract as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "ConfigOverrideNPCSpawnEntriesContainer",
                |p| &p.npc_spawn_override as &dyn IniCollection,
                |p| &mut p.npc_spawn_override as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "ConfigOverrideSupplyCrateItems",
                |p| &p.supply_crate_overrides as &dyn IniCollection,
                |p| &mut p.supply_crate_overrides as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "ConfigOverrideItemMaxQuantity",
                |p| &p.stack_size_overrides as &dyn IniCollection,
                |p| &mut p.stack_size_overrides as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "OverridePlayerLevelEngramPoints",
                |p| &p.engram_points_per_level as &dyn IniCollection,
                |p| &mut p.engram_points_per_level as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "PerLevelStatsMultiplier_Player",
                |p| &p.stats_player as &dyn IniCollection,
                |p| &mut p.stats_player as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "PerLevelStatsMultiplier_DinoWild",
                |p| &p.stats_dino_wild as &dyn IniCollection,
                |p| &mut p.stats_dino_wild as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "PerLevelStatsMultiplier_DinoTamed",
                |p| &p.stats_dino_tamed as &dyn IniCollection,
                |p| &mut p.stats_dino_tamed as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "PerLevelStatsMultiplier_DinoTamed_Add",
                |p| &p.stats_dino_tamed_add as &dyn IniCollection,
                |p| &mut p.stats_dino_tamed_add as &mut dyn IniCollection,
            )
            .collection(
                ShooterGameMode,
                "PerLevelStatsMultiplier_DinoTamed_Affinity",
                |p| &p.stats_dino_tamed_affinity as &dyn IniCollection,
                |p| &mut p.stats_dino_tamed_affinity as &mut dyn IniCollection,
            )
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_bindings_are_valid() {
        bindings().validate().unwrap();
    }

    #[test]
    fn test_stat_keys_match_bindings() {
        for kind in StatMultiplierKind::ALL {
            assert!(
                bindings().bindings().iter().any(|binding| binding.key == kind.key()),
                "no binding for {}",
                kind.key()
            );
        }
    }

    #[test]
    fn test_new_profile_seeds_defaults() {
        let profile = ServerProfile::default();
        assert!(profile.engram_overrides.is_enabled());
        assert!(profile.engram_overrides.iter().all(|engram| !engram.save_override));
        assert_eq!(profile.stat_multipliers(StatMultiplierKind::DinoTamed).get(0), Some(&0.2));
        assert!(!profile.stats_player.is_enabled());
    }

    #[tokio::test]
    async fn test_fresh_profile_writes_only_enabled_collections() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = IniLayout::new(temp_dir.path());

        let mut profile = ServerProfile::default();
        if let Some(spear) = profile.engram_overrides.find_mut("EngramEntry_Spear_C") {
            spear.points_cost = 5;
            spear.save_override = true;
        }
        assert_eq!(profile.save(&layout).await.unwrap(), 2);

        let game = fs::read_to_string(temp_dir.path().join("Game.ini")).unwrap();
        let engram_lines: Vec<&str> = game
            .lines()
            .filter(|line| line.starts_with("OverrideNamedEngramEntries="))
            .collect();
        assert_eq!(
            engram_lines,
            vec![
                "OverrideNamedEngramEntries=(EngramClassName=\"EngramEntry_Spear_C\",EngramHidden=False,\
                 EngramPointsCost=5,EngramLevelRequirement=3,RemoveEngramPreReq=False)"
            ]
        );
        assert!(!game.contains("PerLevelStatsMultiplier"));
        assert!(!game.contains("DinoClassDamageMultipliers"));

        let gus = fs::read_to_string(temp_dir.path().join("GameUserSettings.ini")).unwrap();
        assert!(gus.contains("[MultiHome]\nMultiHome=False\n"));
        assert!(!gus.contains("RCONServerGameLogBuffer"));
        assert!(!gus.contains("KickIdlePlayersPeriod"));
        assert!(gus.contains("bDisableStructureDecayPvE=False"));
    }

    #[test]
    fn test_shared_profile_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("GameUserSettings.ini"),
            "[/Script/Engine.GameSession]\nMaxPlayers=12\n",
        )
        .unwrap();
        let layout = IniLayout::new(temp_dir.path());

        let shared = ServerProfile::default().into_shared();
        load_shared(&shared, &layout).unwrap();
        assert_eq!(shared.read().max_players, 12);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        shared.write().max_players = 40;
        runtime.block_on(save_shared(&shared, &layout)).unwrap();

        let reloaded = ServerProfile::load(&layout).unwrap();
        assert_eq!(reloaded.max_players, 40);
    }

    #[test]
    fn test_reload_keeps_catalog_engrams() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Game.ini"),
            "[/script/shootergame.shootergamemode]\n\
             OverrideNamedEngramEntries=(EngramClassName=\"EngramEntry_Bow_C\",EngramPointsCost=1,EngramLevelRequirement=1)\n\
             OverrideNamedEngramEntries=(EngramClassName=\"EngramEntry_ModBench_C\",EngramPointsCost=4,EngramLevelRequirement=40)\n",
        )
        .unwrap();

        let profile = ServerProfile::load(&IniLayout::new(temp_dir.path())).unwrap();
        let catalog = BuiltinGameData.engrams();
        assert_eq!(profile.engram_overrides.len(), catalog.len() + 1);

        let bow: &EngramEntry = profile.engram_overrides.find("EngramEntry_Bow_C").unwrap();
        assert_eq!((bow.level_requirement, bow.points_cost), (1, 1));
        assert!(bow.save_override);
        assert!(profile.engram_overrides.find("EngramEntry_ModBench_C").unwrap().save_override);
        assert!(!profile.engram_overrides.find("EngramEntry_Forge_C").unwrap().save_override);

        // Sorted by level requirement.
        let levels: Vec<i32> = profile.engram_overrides.iter().map(|e| e.level_requirement).collect();
        let mut sorted = levels.clone();
        sorted.sort();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn test_partial_engram_override_keeps_catalog_level() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Game.ini"),
            "[/script/shootergame.shootergamemode]\n\
             OverrideNamedEngramEntries=(EngramClassName=\"EngramEntry_Forge_C\",EngramPointsCost=9)\n",
        )
        .unwrap();

        let profile = ServerProfile::load(&IniLayout::new(temp_dir.path())).unwrap();
        let forge = profile.engram_overrides.find("EngramEntry_Forge_C").unwrap();
        assert_eq!((forge.level_requirement, forge.points_cost), (20, 9));
        assert!(forge.save_override);

        let lines = profile.engram_overrides.to_ini_values("OverrideNamedEngramEntries");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("EngramLevelRequirement=20"));
    }
}
