//! Scalable font resolution

use crate::{
    config::FontSource,
    error::{CatalogError, Result},
};
use ab_glyph::{Font, FontVec, PxScale};
use std::path::Path;

/// A parsed font plus the name it was found under
pub struct LoadedFont {
    pub font: FontVec,
    pub name: String,
}

impl LoadedFont {
    /// Scale for a size given in pixels per em
    ///
    /// `ab_glyph` scales by ascent-to-descent height, so the em size is
    /// converted through the font's own metrics.
    #[must_use]
    pub fn px_scale(&self, size_per_em: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(size_per_em * self.font.height_unscaled() / units_per_em)
            },
            _ => PxScale::from(size_per_em),
        }
    }
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Resolve a [`FontSource`] into a parsed font
///
/// A family name is looked up in the system font database, first exactly and
/// then case-insensitively. A file path that does not exist but looks like a
/// bare file name (`arial.ttf`) is retried as a family using its stem.
///
/// # Errors
/// - No installed face matches the family
/// - The file cannot be read or is not a valid font
pub fn load_font(source: &FontSource) -> Result<LoadedFont> {
    match source {
        FontSource::File(path) if path.is_file() => load_font_file(path),
        FontSource::File(path) => {
            let bare_name = path.parent().map_or(true, |parent| parent.as_os_str().is_empty());
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if bare_name => load_system_family(stem),
                _ => Err(CatalogError::font(format!(
                    "Font file not found: {}",
                    path.display()
                ))),
            }
        },
        FontSource::Family(name) => load_system_family(name),
    }
}

fn load_font_file(path: &Path) -> Result<LoadedFont> {
    let data = std::fs::read(path)
        .map_err(|e| CatalogError::file_io_error("read font file", path, &e))?;
    let font = FontVec::try_from_vec(data)
        .map_err(|e| CatalogError::font(format!("{}: {e}", path.display())))?;

    Ok(LoadedFont {
        font,
        name: path.display().to_string(),
    })
}

fn load_system_family(name: &str) -> Result<LoadedFont> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families = [fontdb::Family::Name(name)];
    let query = fontdb::Query {
        families: &families,
        ..fontdb::Query::default()
    };

    let id = db
        .query(&query)
        .or_else(|| {
            db.faces()
                .find(|face| {
                    face.families
                        .iter()
                        .any(|(family, _)| family.eq_ignore_ascii_case(name))
                })
                .map(|face| face.id)
        })
        .ok_or_else(|| CatalogError::font(format!("No installed font family named '{name}'")))?;

    let font = db
        .with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))
        .ok_or_else(|| CatalogError::font(format!("Font data for '{name}' is unavailable")))?
        .map_err(|e| CatalogError::font(format!("'{name}': {e}")))?;

    log::debug!("Resolved font family '{}' from the system database", name);

    Ok(LoadedFont {
        font,
        name: name.to_string(),
    })
}
