//! Font provisioning for the Typst engine.
//!
//! Typst never touches the filesystem for fonts on its own; the `World` hands out
//! fonts by index and a `FontBook` describing them. This module builds that pair
//! once per process:
//! - the embedded `typst-assets` fonts first (they include the math font Typst
//!   uses by default, so formulas render the same on every machine)
//! - then every file-backed system face discovered through `fontdb`
//!
//! The resulting [`FontSet`] is shared by every compile through [`FontSet::shared`].

use std::{fs, sync::OnceLock};

use fontdb::{Database, Source};
use typst::{
    foundations::Bytes,
    text::{Font, FontBook},
    utils::LazyHash,
};

/// Errors produced by the font subsystem.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("no fonts could be loaded (embedded typst-assets and system fonts both failed)")]
    NoFontsAvailable,
}

/// Where [`FontSet::load`] looks for faces.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FontSources {
    /// Include the fonts bundled with `typst-assets`.
    pub embedded: bool,
    /// Include file-backed faces from the system font directories.
    pub system: bool,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            embedded: true,
            system: true,
        }
    }
}

/// Loaded fonts plus the book Typst uses to select among them.
///
/// Indices into `fonts` match the indices recorded in `book`.
pub struct FontSet {
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl FontSet {
    /// Load fonts from the requested sources.
    pub fn load(sources: FontSources) -> Result<Self, FontError> {
        let mut fonts: Vec<Font> = Vec::new();

        if sources.embedded {
            for data in typst_assets::fonts() {
                fonts.extend(Font::iter(Bytes::new(data)));
            }
            log::debug!("font: {} embedded face(s)", fonts.len());
        }

        if sources.system {
            let before = fonts.len();
            fonts.extend(load_system_faces());
            log::debug!("font: {} system face(s)", fonts.len() - before);
        }

        if fonts.is_empty() {
            return Err(FontError::NoFontsAvailable);
        }

        let book = FontBook::from_fonts(fonts.iter());
        Ok(Self {
            book: LazyHash::new(book),
            fonts,
        })
    }

    /// The process-wide font set, loaded on first use.
    ///
    /// A failed load is remembered; later calls fail fast with the same error.
    pub fn shared() -> Result<&'static FontSet, FontError> {
        static SHARED: OnceLock<Option<FontSet>> = OnceLock::new();

        SHARED
            .get_or_init(|| match FontSet::load(FontSources::default()) {
                Ok(set) => {
                    log::info!("font: loaded {} face(s)", set.len());
                    Some(set)
                }
                Err(err) => {
                    log::error!("font: {err}");
                    None
                }
            })
            .as_ref()
            .ok_or(FontError::NoFontsAvailable)
    }

    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Read every file-backed face `fontdb` can find. Unreadable or unparsable faces are skipped.
fn load_system_faces() -> Vec<Font> {
    let mut db = Database::new();
    db.load_system_fonts();

    let mut fonts = Vec::new();
    for face in db.faces() {
        let Source::File(path) = &face.source else {
            continue;
        };

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                log::debug!("font: skipping {}: {err}", path.display());
                continue;
            }
        };

        if let Some(font) = Font::new(Bytes::new(data), face.index) {
            fonts.push(font);
        }
    }
    fonts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_fonts_are_enough_on_their_own() {
        let set = FontSet::load(FontSources {
            embedded: true,
            system: false,
        })
        .expect("typst-assets ships fonts");

        assert!(!set.is_empty());
        assert!(set.font(0).is_some());
        assert!(set.font(set.len()).is_none());
    }

    #[test]
    fn no_sources_is_an_error() {
        let err = FontSet::load(FontSources {
            embedded: false,
            system: false,
        })
        .err();
        assert_eq!(err, Some(FontError::NoFontsAvailable));
    }
}
