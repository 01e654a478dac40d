use std::path::Path;

use notepin_core::map::Viewport;
use notepin_core::render::GridView;
use notepin_core::{AppConfig, Error, Location, Note, NoteId};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::cli::{CompletionShell, MapCommands};
use crate::commands::add::run_add;
use crate::commands::common::{
    default_editor, discard_temp_file, format_grid_lines, format_list_lines, format_viewport,
    is_affirmative, normalize_content, open_app, parse_editor_buffer, render_editor_buffer,
    resolve_db_path, Context,
};
use crate::commands::completions::render_completions;
use crate::commands::delete::{run_clear, run_delete};
use crate::commands::edit::{apply_flags, EditFlags};
use crate::commands::export::{run_export, run_import};
use crate::commands::map::run_map;
use crate::config_file::{load_config, save_config, with_config_value};
use crate::error::CliError;

fn context_in(dir: &Path, config: AppConfig) -> Context {
    Context {
        db_path: dir.join("notepin.db"),
        config_path: dir.join("config.json"),
        config,
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn affirmative_answers() {
    assert!(is_affirmative("y\n"));
    assert!(is_affirmative(" YES "));
    assert!(!is_affirmative(""));
    assert!(!is_affirmative("nope"));
}

#[test]
fn editor_buffer_round_trips_title_and_content() {
    let buffer = render_editor_buffer("Groceries", "milk\neggs");
    assert_eq!(
        parse_editor_buffer(&buffer),
        ("Groceries".to_string(), "milk\neggs".to_string())
    );
    assert_eq!(
        parse_editor_buffer("only a title"),
        ("only a title".to_string(), String::new())
    );
}

#[test]
fn list_and_grid_render_empty_state() {
    assert_eq!(format_list_lines(&[]), vec!["No notes".to_string()]);
    let grid = format_grid_lines(&GridView::Empty);
    assert_eq!(grid.len(), 1);
    assert!(grid[0].starts_with("No notes yet"));
}

#[test]
fn list_lines_mark_active_note() {
    let notes = vec![
        Note::new(NoteId::from_millis(2), "second", "b", 2),
        Note::new(NoteId::from_millis(1), "first", "a", 1),
    ];
    let items = notepin_core::render::list(&notes, Some(NoteId::from_millis(1)));
    let lines = format_list_lines(&items);

    assert!(lines[0].starts_with("  2"));
    assert!(lines[1].starts_with("> 1"));
}

#[test]
fn config_value_updates_typed_fields() {
    let config = AppConfig::default();

    let updated = with_config_value(&config, "features.map", "false").unwrap();
    assert!(!updated.features.map);

    let updated = with_config_value(&config, "image.max_width", "640").unwrap();
    assert_eq!(updated.image.max_width, 640);

    let updated = with_config_value(&config, "cloud.api_base_url", "https://gists.local/").unwrap();
    assert_eq!(updated.cloud.api_base_url, "https://gists.local");
}

#[test]
fn config_value_rejects_bad_input() {
    let config = AppConfig::default();
    assert!(matches!(
        with_config_value(&config, "features.nope", "true"),
        Err(CliError::Config(_))
    ));
    assert!(matches!(
        with_config_value(&config, "features", "true"),
        Err(CliError::Config(_))
    ));
    assert!(matches!(
        with_config_value(&config, "features.cloud", "maybe"),
        Err(CliError::Config(_))
    ));
    assert!(matches!(
        with_config_value(&config, "image.jpeg_quality", "0"),
        Err(CliError::Core(Error::InvalidInput(_)))
    ));
}

#[test]
fn config_file_missing_then_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    assert_eq!(load_config(&path).unwrap(), AppConfig::default());

    let mut config = AppConfig::default();
    config.features.cloud = false;
    config.autosave_interval_secs = 5;
    save_config(&config, &path).unwrap();

    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn config_file_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn explicit_db_path_wins() {
    let path = resolve_db_path(Some("/tmp/custom.db".into())).unwrap();
    assert_eq!(path, Path::new("/tmp/custom.db"));
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("notepin"));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_then_delete_round_trip_through_local_storage() {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), AppConfig::default());

    run_add("First", &words("hello world"), None, None, &context)
        .await
        .unwrap();
    run_add("Second", &words("pinned"), None, Some((40.0, -73.0)), &context)
        .await
        .unwrap();

    let app = open_app(&context).await.unwrap();
    let titles = app
        .notes()
        .iter()
        .map(|note| note.title.clone())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(app.markers().unwrap().len(), 1);

    let first = app.notes()[1].id.to_string();
    drop(app);
    run_delete(Some(&first), true, &context).await.unwrap();

    let app = open_app(&context).await.unwrap();
    assert_eq!(app.notes().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_refuses_when_empty() {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), AppConfig::default());

    let err = run_clear(true, &context).await.unwrap_err();
    assert_eq!(err.to_string(), "No notes to remove.");
}

#[tokio::test(flavor = "multi_thread")]
async fn export_then_import_into_fresh_database() {
    let source_dir = tempdir().unwrap();
    let source = context_in(source_dir.path(), AppConfig::default());
    run_add("One", &words("1"), None, None, &source).await.unwrap();
    run_add("Two", &words("2"), None, None, &source).await.unwrap();

    let export_path = source_dir.path().join("backup.json");
    run_export(Some(&export_path), &source).await.unwrap();

    let target_dir = tempdir().unwrap();
    let target = context_in(target_dir.path(), AppConfig::default());
    run_import(&export_path, &target).await.unwrap();
    run_import(&export_path, &target).await.unwrap();

    let exported = open_app(&source).await.unwrap();
    let imported = open_app(&target).await.unwrap();
    assert_eq!(imported.notes(), exported.notes());
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_flags_update_the_loaded_note() {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), AppConfig::default());
    run_add("Draft", &words("before"), None, None, &context)
        .await
        .unwrap();

    let mut app = open_app(&context).await.unwrap();
    let id = app.notes()[0].id;
    app.open_note(id).await.unwrap();
    app.toggle_edit().unwrap();
    apply_flags(
        &mut app,
        EditFlags {
            content: Some("after".to_string()),
            ..EditFlags::default()
        },
    )
    .await
    .unwrap();
    app.save_current().await.unwrap();

    let reloaded = open_app(&context).await.unwrap();
    assert_eq!(reloaded.note(id).unwrap().content, "after");
    assert_eq!(reloaded.note(id).unwrap().title, "Draft");
}

#[tokio::test(flavor = "multi_thread")]
async fn map_commands_fail_when_feature_disabled() {
    let dir = tempdir().unwrap();
    let mut config = AppConfig::default();
    config.features.map = false;
    let context = context_in(dir.path(), config);

    let err = run_map(MapCommands::Markers { json: false }, &context)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Core(Error::FeatureDisabled("map"))));
}

#[test]
fn viewport_line_names_center_and_zoom() {
    let viewport = Viewport {
        center: Location::new(40.7128, -74.006).unwrap(),
        zoom: 13,
    };
    let line = format_viewport(&viewport);
    assert!(line.starts_with("Map centered at "));
    assert!(line.ends_with("(zoom 13)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_image_saves_nothing_with_or_without_location() {
    let dir = tempdir().unwrap();
    let mut config = AppConfig::default();
    config.image.max_bytes = 16;
    let context = context_in(dir.path(), config);
    let image = dir.path().join("photo.bin");
    std::fs::write(&image, [0_u8; 64]).unwrap();

    let plain = run_add("Plain", &words("text"), Some(&image), None, &context).await;
    let pinned = run_add(
        "Pinned",
        &words("text"),
        Some(&image),
        Some((1.0, 2.0)),
        &context,
    )
    .await;

    for result in [plain, pinned] {
        assert!(matches!(
            result,
            Err(CliError::Core(Error::ImageTooLarge { size: 64, limit: 16 }))
        ));
    }
    let app = open_app(&context).await.unwrap();
    assert!(app.notes().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn map_edit_updates_pinned_note_only() {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), AppConfig::default());
    run_add("Pinned", &words("before"), None, Some((10.0, 20.0)), &context)
        .await
        .unwrap();
    run_add("Plain", &words("unpinned"), None, None, &context)
        .await
        .unwrap();

    let app = open_app(&context).await.unwrap();
    let plain = app.notes()[0].id.to_string();
    let pinned = app.notes()[1].id;
    drop(app);

    run_map(
        MapCommands::Edit {
            id: pinned.to_string(),
            title: None,
            content: Some("after".to_string()),
            image: None,
            remove_image: false,
        },
        &context,
    )
    .await
    .unwrap();

    let app = open_app(&context).await.unwrap();
    let note = app.note(pinned).unwrap();
    assert_eq!(note.content, "after");
    assert_eq!(note.location, Some(Location::new(10.0, 20.0).unwrap()));
    drop(app);

    for id in [plain, "42".to_string()] {
        let err = run_map(
            MapCommands::Edit {
                id,
                title: Some("nope".to_string()),
                content: None,
                image: None,
                remove_image: false,
            },
            &context,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Core(Error::NotFound(_))));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_without_id_removes_the_current_note() {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), AppConfig::default());
    run_add("Keep", &words("a"), None, None, &context).await.unwrap();
    run_add("Drop", &words("b"), None, None, &context).await.unwrap();

    let mut app = open_app(&context).await.unwrap();
    let drop_id = app.notes()[0].id;
    app.open_note(drop_id).await.unwrap();
    drop(app);

    run_delete(None, true, &context).await.unwrap();

    let app = open_app(&context).await.unwrap();
    let titles = app
        .notes()
        .iter()
        .map(|note| note.title.clone())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Keep"]);
}

#[test]
fn temp_file_cleanup_reports_missing_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("note.txt");
    std::fs::write(&path, "title\n\nbody\n").unwrap();

    assert!(discard_temp_file(&path));
    assert!(!path.exists());
    assert!(!discard_temp_file(&path));
}
