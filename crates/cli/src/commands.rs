//! Command implementations

use std::path::Path;

use anyhow::{Context, Result, bail};
use cardmap_core::{Rect, Validatable};
use cardmap_ir::{Card, Document, DocumentHandle, ensure_extension, load_document, save_document};
use cardmap_ui::{CanvasConfig, Viewport};
use colored::Colorize;
use tracing::info;

use crate::script;

/// Load the canvas configuration, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<CanvasConfig> {
    match path {
        Some(path) => CanvasConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(CanvasConfig::default()),
    }
}

fn open(file: &Path) -> Result<Document> {
    Document::open(file).with_context(|| format!("Failed to open {}", file.display()))
}

/// `cardmap new`
///
/// The file gets the document extension when it has a different one.
pub fn new_document(file: &Path, name: Option<String>, force: bool) -> Result<()> {
    let file = ensure_extension(file);
    let file = file.as_path();
    if file.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }

    let name = name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled Map".to_string())
    });
    let document = Document::new(name);
    save_document(&document, file)?;

    info!(path = %file.display(), "Created document");
    println!(
        "{} Created {} ({})",
        "✓".green(),
        document.meta.name.bold(),
        file.display()
    );
    Ok(())
}

/// `cardmap add-card`
pub fn add_card(file: &Path, title: &str, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
    let mut document = open(file)?;

    let card = Card::new(title)
        .with_rect(Rect::from_xywh(x, y, w, h))
        .with_z_index(document.max_z_index() + 1);
    card.validate()?;
    let id = document.add_card(card);
    document.commit()?;

    println!("{} Added card {} {}", "✓".green(), title.bold(), id.to_string().dimmed());
    Ok(())
}

/// `cardmap info`
pub fn info(file: &Path) -> Result<()> {
    let document = open(file)?;

    println!("{}", document.meta.name.bold());
    if let Some(description) = &document.meta.description {
        println!("  {}", description);
    }
    println!("  Cards: {}", document.card_count());
    println!("  Edges: {}", document.edge_count());
    println!("  Modified: {}", document.meta.modified_at.to_rfc3339());

    for card in document.cards_in_z_order() {
        let r = card.rect;
        println!(
            "  {} {} at ({}, {}) {}x{}",
            "■".cyan(),
            card.title,
            r.x(),
            r.y(),
            r.width(),
            r.height()
        );
    }

    for edge in document.edges() {
        let title = |id| {
            document
                .get_card(id)
                .map(|c| c.title.as_str())
                .unwrap_or("<missing>")
        };
        let self_loop = if edge.is_self_loop() { " (self-loop)" } else { "" };
        println!(
            "  {} {} → {}{}",
            "→".blue(),
            title(edge.orig),
            title(edge.dest),
            self_loop.dimmed()
        );
    }
    Ok(())
}

/// `cardmap validate`
pub fn validate(file: &Path) -> Result<()> {
    let document = open(file)?;
    match document.validate() {
        Ok(()) => {
            println!("{} {} is valid", "✓".green(), file.display());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            Err(e).with_context(|| format!("{} is invalid", file.display()))
        }
    }
}

/// `cardmap replay`
pub fn replay(file: &Path, script_path: &Path, dry_run: bool, config: CanvasConfig) -> Result<()> {
    let mut document = open(file)?;
    if dry_run {
        document.set_path(None);
    }

    let events = script::load_script(script_path)?;
    let mut viewport = Viewport::from_document(&document, config)?;
    let summary = script::replay(&mut document, &mut viewport, &events)?;

    info!(events = summary.events, dry_run, "Replayed script");
    println!(
        "{} Replayed {} events: {} bound, {} reverted, {} discarded",
        "✓".green(),
        summary.events,
        summary.bound,
        summary.reverted,
        summary.discarded
    );
    println!(
        "  {} cards, {} edges",
        document.card_count(),
        document.edge_count()
    );
    Ok(())
}

/// `cardmap render`
pub fn render(file: &Path, output: Option<&Path>, config: CanvasConfig) -> Result<()> {
    let document = open(file)?;
    let viewport = Viewport::from_document(&document, config)?;
    let svg = viewport.render_svg();

    match output {
        Some(path) => {
            std::fs::write(path, &svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Rendered {}", "✓".green(), path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_then_add_cards() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plans.cmap");

        new_document(&file, None, false).unwrap();
        assert!(new_document(&file, None, false).is_err());

        add_card(&file, "Inbox", 0.0, 0.0, 10.0, 10.0).unwrap();
        add_card(&file, "Done", 100.0, 0.0, 10.0, 10.0).unwrap();

        let document = load_document(&file).unwrap();
        assert_eq!(document.meta.name, "plans");
        assert_eq!(document.card_count(), 2);
        assert_eq!(document.get_card_by_title("Done").unwrap().z_index, 2);
    }

    #[test]
    fn test_new_adds_document_extension() {
        let dir = tempdir().unwrap();
        new_document(&dir.path().join("roadmap"), None, false).unwrap();

        let document = load_document(dir.path().join("roadmap.cmap")).unwrap();
        assert_eq!(document.meta.name, "roadmap");
        assert!(!dir.path().join("roadmap").exists());
    }

    #[test]
    fn test_add_card_rejects_invalid_size() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("map.cmap");
        new_document(&file, None, false).unwrap();
        assert!(add_card(&file, "Bad", 0.0, 0.0, -5.0, 10.0).is_err());
    }

    #[test]
    fn test_replay_dry_run_leaves_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("map.cmap");
        let script = dir.path().join("script.json");
        new_document(&file, None, false).unwrap();
        add_card(&file, "A", 0.0, 0.0, 10.0, 10.0).unwrap();
        add_card(&file, "B", 100.0, 0.0, 10.0, 10.0).unwrap();
        std::fs::write(
            &script,
            r#"[
                {"event": "connect_from", "card": "A"},
                {"event": "release", "x": 105, "y": 5}
            ]"#,
        )
        .unwrap();

        replay(&file, &script, true, CanvasConfig::default()).unwrap();
        assert_eq!(load_document(&file).unwrap().edge_count(), 0);

        replay(&file, &script, false, CanvasConfig::default()).unwrap();
        assert_eq!(load_document(&file).unwrap().edge_count(), 1);
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("map.cmap");
        let out = dir.path().join("map.svg");
        new_document(&file, None, false).unwrap();
        add_card(&file, "A", 0.0, 0.0, 10.0, 10.0).unwrap();

        render(&file, Some(&out), CanvasConfig::default()).unwrap();
        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(">A</text>"));
    }

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("canvas.toml");
        std::fs::write(&path, "clip_precision = \"float\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.clip_precision, cardmap_core::ClipPrecision::Float);
        assert_eq!(load_config(None).unwrap(), CanvasConfig::default());
    }
}
