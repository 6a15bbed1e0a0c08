use crate::cli::Commands;
use crate::config::Config;
use crate::error::{BedtimeError, Result};
use crate::generation::StoryGenerator;
use crate::library::Library;
use crate::storage::create_store;
use crate::story::{normalize_optional, ReadingDuration, Story};
use anyhow::Context;
use colored::Colorize;
use prettytable::{format, Table};
use std::path::Path;

/// Shortest id prefix accepted by `show` and `delete`
pub const MIN_ID_PREFIX: usize = 4;

/// Run one CLI command against the configured store
pub async fn handle_command(config: Config, command: Commands) -> Result<()> {
    let store = create_store(&config.store)?;
    let mut library = Library::new(store);

    match command {
        Commands::List { json } => list(&mut library, json).await,
        Commands::Show { id } => show(&mut library, &id).await,
        Commands::Create {
            title,
            duration,
            description,
            characters,
            content,
            content_file,
            sample,
        } => {
            let story = if sample {
                Story::sample()
            } else {
                let content = match content_file {
                    Some(path) => Some(read_content(&path)?),
                    None => content,
                };
                Story::new(
                    title.unwrap_or_default(),
                    content,
                    duration,
                    description,
                    characters,
                )?
            };
            create(&mut library, story).await
        }
        Commands::Generate {
            duration,
            description,
            characters,
            title,
            no_save,
        } => {
            let generator = StoryGenerator::from_config(&config.generation)?;
            generate(
                &mut library,
                &generator,
                duration,
                description.as_deref(),
                characters.as_deref(),
                title,
                no_save,
            )
            .await
        }
        Commands::Delete { ids } => delete(&mut library, &ids).await,
    }
}

/// Find a story by full id or by a unique id prefix
///
/// # Errors
///
/// Returns `BedtimeError::NotFound` if nothing matches and
/// `BedtimeError::Validation` if the prefix is shorter than
/// [`MIN_ID_PREFIX`] or matches more than one story.
pub fn resolve_story<'a>(stories: &'a [Story], id: &str) -> Result<&'a Story> {
    let id = id.trim();
    if let Some(story) = stories.iter().find(|s| s.id.as_str() == id) {
        return Ok(story);
    }

    if id.chars().count() < MIN_ID_PREFIX {
        return Err(BedtimeError::Validation(format!(
            "id prefix '{}' is too short (at least {} characters)",
            id, MIN_ID_PREFIX
        ))
        .into());
    }

    let mut matches = stories.iter().filter(|s| s.id.as_str().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(story), None) => Ok(story),
        (None, _) => Err(BedtimeError::NotFound(id.to_string()).into()),
        (Some(_), Some(_)) => Err(BedtimeError::Validation(format!(
            "id prefix '{}' matches more than one story",
            id
        ))
        .into()),
    }
}

async fn list(library: &mut Library, json: bool) -> Result<()> {
    let stories = library.refresh().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(stories)?);
        return Ok(());
    }

    if stories.is_empty() {
        println!("{}", "No stories yet.".yellow());
        println!(
            "Use {} or {} to add one.",
            "bedtime create".cyan(),
            "bedtime generate".cyan()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Duration".bold(),
        "Theme".bold(),
        "Created".bold()
    ]);

    for story in stories {
        let description = story.description.as_deref().unwrap_or("-");
        let created = story
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            story.id.short().cyan(),
            truncate(&story.title, 40),
            story.duration.display_text(),
            truncate(description, 32),
            created
        ]);
    }

    println!("\nStories:");
    table.printstd();
    println!();
    println!("Use {} to read a story.", "bedtime show <ID>".cyan());
    println!();
    Ok(())
}

async fn show(library: &mut Library, id: &str) -> Result<()> {
    let stories = library.refresh().await?;
    let story = resolve_story(stories, id)?;
    print_story(story);
    Ok(())
}

async fn create(library: &mut Library, story: Story) -> Result<()> {
    let id = story.id.clone();
    let title = story.title.clone();
    library.save(story).await?;
    println!(
        "{} {} ({})",
        "Saved story".green(),
        title.bold(),
        id.short().cyan()
    );
    Ok(())
}

async fn generate(
    library: &mut Library,
    generator: &StoryGenerator,
    duration: ReadingDuration,
    description: Option<&str>,
    characters: Option<&str>,
    title: Option<String>,
    no_save: bool,
) -> Result<()> {
    println!(
        "{}",
        format!("Writing a {} story...", duration.display_text()).dimmed()
    );

    let mut story = generator
        .generate_story(duration, description, characters)
        .await?;
    if let Some(title) = normalize_optional(title) {
        story.title = title;
    }

    print_story(&story);

    if no_save {
        println!("{}", "Not saved (--no-save).".yellow());
        return Ok(());
    }
    create(library, story).await
}

async fn delete(library: &mut Library, ids: &[String]) -> Result<()> {
    let stories = library.refresh().await?;

    let mut targets: Vec<Story> = Vec::with_capacity(ids.len());
    for id in ids {
        let story = resolve_story(stories, id)?;
        if !targets.iter().any(|t| t.id == story.id) {
            targets.push(story.clone());
        }
    }

    let deleted = library.delete_many(&targets).await?;
    for story in targets.iter().filter(|s| deleted.contains(&s.id)) {
        println!(
            "{}",
            format!("Deleted story {} ({})", story.title, story.id.short()).green()
        );
    }
    Ok(())
}

fn read_content(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read story content from {}", path.display()))?;
    Ok(content)
}

fn print_story(story: &Story) {
    println!();
    println!("{}", story.title.bold());
    println!(
        "{}",
        format!(
            "{} | {} | {}",
            story.id,
            story.duration.display_text(),
            story
                .created_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
    if let Some(description) = &story.description {
        println!("{} {}", "Theme:".bold(), description);
    }
    if let Some(characters) = &story.favorite_characters {
        println!("{} {}", "Characters:".bold(), characters);
    }
    println!();
    match &story.content {
        Some(content) => println!("{}", content),
        None => println!("{}", "(no content)".dimmed()),
    }
    println!();
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
