use std::path::Path;

use notepin_core::Location;

use crate::commands::common::{open_app, resolve_note_content, Context};
use crate::error::CliError;

/// Create a note. The image is compressed before anything is saved, so a
/// rejected image leaves the collection untouched on both paths.
pub async fn run_add(
    title: &str,
    content_parts: &[String],
    image: Option<&Path>,
    location: Option<(f64, f64)>,
    context: &Context,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let location = location
        .map(|(lat, lng)| Location::new(lat, lng))
        .transpose()?;
    let mut app = open_app(context).await?;

    let image = match image {
        Some(path) => Some(app.load_image_file(path).await?),
        None => None,
    };

    let id = if let Some(location) = location {
        app.add_note_at_with_image(location, title, &content, image.as_ref())
            .await?
    } else {
        app.open_new();
        app.set_title(title)?;
        app.set_content(content)?;
        if let Some(image) = image.as_ref() {
            app.set_image(image)?;
        }
        app.save_current().await?
    };

    println!("{id}");
    Ok(())
}
