//! Moodlog CLI
//!
//! Local front end for the journal:
//! - Write, edit and delete entries
//! - Search and list entries
//! - Show streaks and mood statistics
//! - Attach photos
//! - Manage relationships and profile preferences

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use moodlog::config::{generate_default_config, LoggingConfig};
use moodlog::{
    App, Config, EntryPatch, JournalEntry, JournalStats, MediaSource, Mood, NewEntry,
    PreferencesPatch, ProfilePatch, Relationship, RelationshipType, Theme,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "moodlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Journal, mood tracker and streak counter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new entry
    Write {
        /// Entry text
        content: Vec<String>,
        #[arg(short, long)]
        title: Option<String>,
        /// Mood from 1 (awful) to 5 (great)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: Option<u8>,
        /// Tags (repeatable)
        #[arg(short = 'T', long = "tag")]
        tags: Vec<String>,
        /// Save as draft
        #[arg(long)]
        draft: bool,
        #[arg(long)]
        private: bool,
        /// Link to a relationship id
        #[arg(long)]
        relationship: Option<String>,
    },

    /// List recent entries
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries with this tag
        #[arg(short = 'T', long)]
        tag: Option<String>,
        /// Only drafts
        #[arg(long)]
        drafts: bool,
    },

    /// Show one entry
    Show { id: String },

    /// Edit an entry
    Edit {
        id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(short, long, conflicts_with = "clear_title")]
        title: Option<String>,
        #[arg(long)]
        clear_title: bool,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5), conflicts_with = "clear_mood")]
        mood: Option<u8>,
        #[arg(long)]
        clear_mood: bool,
        /// Replace all tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        /// Publish a draft
        #[arg(long)]
        publish: bool,
        #[arg(long)]
        private: Option<bool>,
    },

    /// Delete an entry and its photos
    Delete {
        id: String,
        /// Leave uploaded photos in place
        #[arg(long)]
        keep_media: bool,
    },

    /// Search titles and content
    Search { text: Vec<String> },

    /// Show streaks and mood statistics
    Stats,

    /// Attach photos to an entry
    Attach {
        id: String,
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Manage relationships
    Relationship {
        #[command(subcommand)]
        command: RelationshipCommand,
    },

    /// Show or update the profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// light, dark or system
        #[arg(long)]
        theme: Option<Theme>,
        /// Daily reminder on/off
        #[arg(long)]
        reminder: Option<bool>,
        /// Mark onboarding as finished
        #[arg(long)]
        onboarded: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RelationshipCommand {
    /// Add a relationship
    Add {
        name: String,
        /// romantic, friendship, family or other
        #[arg(short, long, default_value = "friendship")]
        kind: RelationshipType,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List relationships
    List {
        /// Only active ones
        #[arg(long)]
        active: bool,
    },
    /// Mark a relationship as ended
    End {
        id: String,
        /// End date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Delete a relationship
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Needs no stores or logging
    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    tracing::debug!("Moodlog v{}", env!("CARGO_PKG_VERSION"));
    let app = App::open(config).await.context("opening local stores")?;
    let json = cli.format == "json";

    run(&app, cli.command, json).await
}

/// Write the config template to `output`, or stdout
fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Config written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Logs go to stderr so stdout stays clean for command output
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("moodlog={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(app: &App, command: Commands, json: bool) -> anyhow::Result<()> {
    let user = app.user_id().to_string();

    match command {
        Commands::Write {
            content,
            title,
            mood,
            tags,
            draft,
            private,
            relationship,
        } => {
            let mut new = NewEntry::new(user.as_str(), content.join(" "));
            new.title = title;
            new.mood = mood.map(Mood::new).transpose()?;
            new.tags = tags.iter().map(|t| t.trim().to_lowercase()).collect();
            new.is_draft = draft;
            new.is_private = private;
            new.relationship_id = relationship;

            let entry = app.journal.create_entry(new).await?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Saved entry {}", entry.id);
            }
        }

        Commands::List { limit, tag, drafts } => {
            let mut entries = match (&tag, drafts) {
                (Some(tag), _) => app.journal.entries_with_tag(&user, tag).await?,
                (None, true) => app.journal.drafts(&user).await?,
                (None, false) => app.journal.list_entries(&user, limit).await?,
            };
            entries.truncate(limit);
            print_entries(&entries, json)?;
        }

        Commands::Show { id } => {
            let Some(entry) = app.journal.get_entry(&user, &id).await? else {
                bail!("No entry with id {}", id);
            };
            if json {
                print_json(&entry)?;
            } else {
                print_entry_detail(&entry);
            }
        }

        Commands::Edit {
            id,
            content,
            title,
            clear_title,
            mood,
            clear_mood,
            tags,
            publish,
            private,
        } => {
            let patch = EntryPatch {
                title: if clear_title { Some(None) } else { title.map(Some) },
                content,
                mood: if clear_mood {
                    Some(None)
                } else {
                    mood.map(Mood::new).transpose()?.map(Some)
                },
                tags: tags.map(|t| t.iter().map(|s| s.trim().to_lowercase()).collect()),
                is_private: private,
                is_draft: publish.then_some(false),
                ..Default::default()
            };
            let entry = app.journal.update_entry(&user, &id, patch).await?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Updated entry {}", entry.id);
            }
        }

        Commands::Delete { id, keep_media } => {
            app.journal.delete_entry(&user, &id, !keep_media).await?;
            println!("Deleted entry {}", id);
        }

        Commands::Search { text } => {
            let entries = app.journal.search_entries(&user, &text.join(" ")).await?;
            print_entries(&entries, json)?;
        }

        Commands::Stats => {
            let stats = app.journal.stats(&user).await?;
            if json {
                print_json(&stats)?;
            } else {
                print_stats(&stats);
            }
        }

        Commands::Attach { id, images } => {
            let sources: Vec<MediaSource> = images.into_iter().map(MediaSource::Path).collect();
            let entry = app
                .journal
                .attach_images(&user, &id, &sources, |p| {
                    eprint!("\rUploading... {:>3.0}%", p);
                    let _ = std::io::stderr().flush();
                })
                .await;
            eprintln!();
            let entry = entry?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Entry {} now has {} attachment(s)", entry.id, entry.attachments.len());
            }
        }

        Commands::Relationship { command } => run_relationship(app, &user, command, json).await?,

        Commands::Profile {
            name,
            email,
            theme,
            reminder,
            onboarded,
        } => {
            let patch = ProfilePatch {
                display_name: name,
                email: email.map(Some),
                onboarding_completed: onboarded.then_some(true),
                preferences: Some(PreferencesPatch {
                    theme,
                    daily_reminder: reminder,
                    ..Default::default()
                }),
            };
            let profile = app.profiles.update_profile(&user, patch).await?;
            if json {
                print_json(&profile)?;
            } else {
                println!("User:        {}", profile.user_id);
                println!("Name:        {}", profile.display_name);
                println!("Email:       {}", profile.email.as_deref().unwrap_or("-"));
                println!("Onboarded:   {}", profile.onboarding_completed);
                println!("Theme:       {:?}", profile.preferences.theme);
                println!("Reminder:    {}", profile.preferences.daily_reminder);
            }
        }

        Commands::Config { output } => write_default_config(output.as_deref())?,
    }

    Ok(())
}

async fn run_relationship(
    app: &App,
    user: &str,
    command: RelationshipCommand,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        RelationshipCommand::Add {
            name,
            kind,
            since,
            notes,
        } => {
            let mut relationship = Relationship::new(user, name, kind, chrono::Utc::now()).notes(notes);
            relationship.start_date = since;
            let relationship = app.relationships.create(relationship).await?;
            if json {
                print_json(&relationship)?;
            } else {
                println!("Added {} ({})", relationship.name, relationship.id);
            }
        }
        RelationshipCommand::List { active } => {
            let relationships = if active {
                app.relationships.list_active(user).await?
            } else {
                app.relationships.list(user).await?
            };
            if json {
                print_json(&relationships)?;
            } else if relationships.is_empty() {
                println!("No relationships");
            } else {
                println!("{:<36}  {:<20}  {:<10}  {:<11}  Since", "ID", "Name", "Type", "Status");
                for r in relationships {
                    println!(
                        "{:<36}  {:<20}  {:<10}  {:<11}  {}",
                        r.id,
                        r.name,
                        r.kind.to_string(),
                        r.status.to_string(),
                        r.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }
        RelationshipCommand::End { id, on } => {
            let on = on.unwrap_or_else(|| Local::now().date_naive());
            let relationship = app.relationships.end_relationship(user, &id, on).await?;
            println!(
                "Ended {} on {}",
                relationship.name,
                relationship.end_date.unwrap_or(on)
            );
        }
        RelationshipCommand::Delete { id } => {
            app.relationships.delete(user, &id).await?;
            println!("Deleted relationship {}", id);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entries(entries: &[JournalEntry], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for entry in entries {
        let date = entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        let mood = entry.mood.map(|m| m.emoji()).unwrap_or(" ");
        let heading = entry.title.clone().unwrap_or_else(|| preview(&entry.content, 50));
        let draft = if entry.is_draft { " [draft]" } else { "" };
        println!("{}  {}  {}{}  ({})", date, mood, heading, draft, short_id(&entry.id));
    }
    Ok(())
}

fn print_entry_detail(entry: &JournalEntry) {
    println!("ID:       {}", entry.id);
    println!(
        "Written:  {}",
        entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    if let Some(title) = &entry.title {
        println!("Title:    {}", title);
    }
    if let Some(mood) = entry.mood {
        println!("Mood:     {}", mood);
    }
    if !entry.tags.is_empty() {
        println!("Tags:     {}", entry.tags.join(", "));
    }
    for attachment in &entry.attachments {
        println!("Photo:    {} ({})", attachment.url, attachment.id);
    }
    if entry.is_draft {
        println!("Status:   draft");
    }
    println!();
    println!("{}", entry.content);
}

fn print_stats(stats: &JournalStats) {
    println!("Entries:         {}", stats.total_entries);
    println!("Current streak:  {} day(s)", stats.current_streak);
    println!("Longest streak:  {} day(s)", stats.longest_streak);
    if stats.mood_average > 0.0 {
        println!("Average mood:    {:.2}", stats.mood_average);
    } else {
        println!("Average mood:    -");
    }
    println!("Mood trend:      {}", stats.mood_trend);

    if !stats.top_tags.is_empty() {
        println!();
        println!("Top tags:");
        for tag in stats.top_tags.iter().take(10) {
            println!("  {:<20} {}", tag.tag, tag.count);
        }
    }

    if !stats.entries_by_month.is_empty() {
        println!();
        println!("{:<8}  {:>7}  {:>8}", "Month", "Entries", "Avg mood");
        for month in &stats.entries_by_month {
            let avg = stats
                .mood_by_month
                .iter()
                .find(|m| m.month == month.month)
                .map(|m| format!("{:.2}", m.average))
                .unwrap_or_else(|| "-".to_string());
            println!("{:<8}  {:>7}  {:>8}", month.month, month.count, avg);
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max_chars {
        let cut: String = line.chars().take(max_chars).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
