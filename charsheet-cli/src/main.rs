//! Command-line character sheet.
//!
//! A headless front end for `charsheet-core`: create characters, list
//! and inspect saves, and make checks, saving throws, and free-form
//! rolls. Rolls are appended to the character's history and written
//! back to disk, and are mirrored to Discord when `DISCORD_WEBHOOK_URL`
//! is set and the character has the toggle on.
//!
//! Saves live in `./characters` unless `--dir` or `CHARSHEET_DIR`
//! points elsewhere.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charsheet_core::builder::roll_ability_scores;
use charsheet_core::model::ProficiencyLevel;
use charsheet_core::persist;
use charsheet_core::{
    Ability, Advantage, CharacterBuilder, CharacterClass, CharacterSheet, DiscordWebhook, Skill,
};

#[derive(Parser)]
#[command(name = "charsheet")]
#[command(about = "A D&D 5e character sheet for the terminal")]
#[command(version)]
struct Cli {
    /// Directory holding character saves (overrides CHARSHEET_DIR)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a character with rolled ability scores and save it
    New {
        /// Character name
        name: String,

        /// Class, e.g. sorcerer
        #[arg(short, long)]
        class: String,

        /// Character level
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Race
        #[arg(long, default_value = "")]
        race: String,

        /// Background
        #[arg(long, default_value = "")]
        background: String,
    },
    /// List saved characters
    List,
    /// Show a character's derived sheet
    Show {
        /// Character name
        name: String,
    },
    /// Roll a free-form dice formula for a character
    Roll {
        /// Character name
        name: String,

        /// Dice formula, e.g. "2d6 + 3"
        formula: String,

        /// Label recorded in the roll history
        #[arg(short, long, default_value = "Roll")]
        label: String,

        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Roll an ability check
    Check {
        /// Character name
        name: String,

        /// Ability, e.g. dex or wisdom
        ability: String,

        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Roll a saving throw
    SaveThrow {
        /// Character name
        name: String,

        /// Ability, e.g. con or charisma
        ability: String,

        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Roll a skill check
    Skill {
        /// Character name
        name: String,

        /// Skill, e.g. arcana or "sleight of hand"
        skill: String,

        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Show a character's recent rolls
    History {
        /// Character name
        name: String,

        /// Number of entries to show, most recent last
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

#[derive(Args)]
struct ModeArgs {
    /// Roll twice and keep the higher total
    #[arg(long, conflicts_with = "disadvantage")]
    advantage: bool,

    /// Roll twice and keep the lower total
    #[arg(long)]
    disadvantage: bool,
}

impl ModeArgs {
    fn advantage_state(&self) -> Advantage {
        if self.advantage {
            Advantage::Advantage
        } else if self.disadvantage {
            Advantage::Disadvantage
        } else {
            Advantage::Normal
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charsheet=info,charsheet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let dir = save_dir(cli.dir);

    match cli.command {
        Commands::New {
            name,
            class,
            level,
            race,
            background,
        } => cmd_new(&dir, name, class, level, race, background).await,
        Commands::List => cmd_list(&dir).await,
        Commands::Show { name } => cmd_show(&dir, &name).await,
        Commands::Roll {
            name,
            formula,
            label,
            mode,
        } => {
            let mut sheet = open(&dir, &name).await?;
            sheet.roll(&label, &formula, mode.advantage_state());
            finish_roll(sheet).await
        }
        Commands::Check {
            name,
            ability,
            mode,
        } => {
            let mut sheet = open(&dir, &name).await?;
            let ability = parse_ability(&ability)?;
            sheet.ability_check(ability, mode.advantage_state());
            finish_roll(sheet).await
        }
        Commands::SaveThrow {
            name,
            ability,
            mode,
        } => {
            let mut sheet = open(&dir, &name).await?;
            let ability = parse_ability(&ability)?;
            sheet.saving_throw(ability, mode.advantage_state());
            finish_roll(sheet).await
        }
        Commands::Skill { name, skill, mode } => {
            let mut sheet = open(&dir, &name).await?;
            let skill = Skill::from_name(&skill)
                .with_context(|| format!("unknown skill \"{skill}\""))?;
            sheet.skill_check(skill, mode.advantage_state());
            finish_roll(sheet).await
        }
        Commands::History { name, count } => cmd_history(&dir, &name, count).await,
    }
}

/// Resolve the save directory: flag, then environment, then default.
fn save_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("CHARSHEET_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("characters"))
}

fn parse_ability(name: &str) -> Result<Ability> {
    Ability::from_name(name).with_context(|| format!("unknown ability \"{name}\""))
}

/// Load a character into a sheet wired for autosave and, when
/// configured, Discord delivery.
async fn open(dir: &Path, name: &str) -> Result<CharacterSheet> {
    let saved = persist::load_by_name(dir, name).await?;
    let mut sheet =
        CharacterSheet::new(saved.character).with_autosave_path(persist::save_path(dir, name));
    if let Some(webhook) = DiscordWebhook::from_env() {
        sheet = sheet.with_notifier(Arc::new(webhook));
    }
    Ok(sheet)
}

/// Print the newest history entry, then write the sheet back.
async fn finish_roll(mut sheet: CharacterSheet) -> Result<()> {
    if let Some(entry) = sheet.character().roll_history.last() {
        println!("{}: {} ({})", entry.label, entry.result, entry.dice_type);
        for line in entry.details.lines() {
            println!("  {line}");
        }
    }
    sheet.autosave().await?;
    Ok(())
}

async fn cmd_new(
    dir: &Path,
    name: String,
    class: String,
    level: u32,
    race: String,
    background: String,
) -> Result<()> {
    let class =
        CharacterClass::from_name(&class).with_context(|| format!("unknown class \"{class}\""))?;
    let path = persist::save_path(dir, &name);
    if path.exists() {
        bail!(
            "a character named \"{name}\" already exists at {}",
            path.display()
        );
    }

    let scores = roll_ability_scores();
    let character = CharacterBuilder::new()
        .name(&name)
        .race(race)
        .background(background)
        .class(class)
        .level(level)
        .rolled(scores)
        .build()?;
    let mut sheet = CharacterSheet::new(character);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    sheet.save(&path).await?;

    println!("Created {name}, saved to {}", path.display());
    println!();
    print_sheet(&sheet);
    Ok(())
}

async fn cmd_list(dir: &Path) -> Result<()> {
    let saves = persist::list_saves(dir).await?;
    if saves.is_empty() {
        println!("No saved characters in {}", dir.display());
        return Ok(());
    }
    for save in saves {
        println!(
            "{:<20} level {:>2} {}",
            save.metadata.name, save.metadata.level, save.metadata.class_name
        );
    }
    Ok(())
}

async fn cmd_show(dir: &Path, name: &str) -> Result<()> {
    let sheet = open(dir, name).await?;
    print_sheet(&sheet);
    Ok(())
}

async fn cmd_history(dir: &Path, name: &str, count: usize) -> Result<()> {
    let sheet = open(dir, name).await?;
    let history = &sheet.character().roll_history;
    if history.is_empty() {
        println!("No rolls yet for {name}");
        return Ok(());
    }
    let start = history.len().saturating_sub(count);
    for entry in &history[start..] {
        println!("{}: {} ({})", entry.label, entry.result, entry.dice_type);
    }
    Ok(())
}

fn print_sheet(sheet: &CharacterSheet) {
    let c = sheet.character();

    let mut headline = format!("{} - level {}", c.name, c.level);
    if !c.race.is_empty() {
        headline.push(' ');
        headline.push_str(&c.race);
    }
    headline.push(' ');
    headline.push_str(&c.class_name);
    if !c.background.is_empty() {
        headline.push_str(&format!(" ({})", c.background));
    }
    println!("{headline}");

    println!(
        "HP {}/{}  Initiative {:+}  Speed {}  Proficiency {:+}",
        c.vitals.hp.current,
        c.vitals.hp.max,
        c.vitals.initiative,
        c.vitals.speed,
        c.vitals.proficiency_bonus
    );
    println!(
        "XP {}/{}  Hit dice {}/{} {}",
        c.xp.current, c.xp.max, c.vitals.hit_dice.current, c.vitals.hit_dice.max, c.vitals.hit_dice.face
    );

    println!();
    for ability in Ability::all() {
        let score = c.ability(ability);
        let marker = if score.save_proficiency { "*" } else { " " };
        println!(
            "  {:<13} {:>2} ({:+})  save {:+}{marker}",
            ability.name(),
            score.total,
            score.modifier,
            c.save_modifier(ability)
        );
    }

    println!();
    for skill in Skill::all() {
        let marker = match c.skill_proficiency(skill) {
            ProficiencyLevel::None => ' ',
            ProficiencyLevel::Proficient => '*',
            ProficiencyLevel::Expertise => '#',
        };
        println!(
            "  {:<16} {:+}{marker}",
            skill.name(),
            c.skill_modifier(skill)
        );
    }

    println!();
    let ac = sheet.armor_class();
    println!("Armor class {}:", ac.total);
    for line in &ac.breakdown {
        println!("  {line}");
    }

    if !c.spell_slots.is_empty() {
        let slots: Vec<String> = c
            .spell_slots
            .iter()
            .map(|(level, slot)| format!("L{level} {}/{}", slot.current, slot.max))
            .collect();
        println!("Spell slots: {}", slots.join("  "));
    }
    for resource in &c.resources {
        println!("{}: {}/{}", resource.name, resource.current, resource.max);
    }
    println!(
        "Passive perception {}, investigation {}, insight {}",
        c.senses.passive_perception, c.senses.passive_investigation, c.senses.passive_insight
    );
}
