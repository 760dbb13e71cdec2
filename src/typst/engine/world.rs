//! Minimal Typst `World` implementation.
//!
//! The world serves:
//! - one in-memory main source (the snippet or document being compiled)
//! - read-only binary files under an optional asset root on disk (used by the PDF
//!   export to pull in rendered formula images via `#image("/name.png")`)
//! - the process-wide [`FontSet`]
//!
//! No packages, no imports of other sources, no clock.

use std::path::PathBuf;

use ecow::EcoString;
use typst::{
    Library, LibraryExt,
    diag::{FileError, FileResult},
    foundations::{Bytes, Datetime},
    syntax::{FileId, Source as TypstSource, VirtualPath},
    text::{Font, FontBook},
    utils::LazyHash,
};

use crate::font::{FontError, FontSet};

/// In-memory main source document.
#[derive(Debug, Clone)]
pub struct InMemoryDoc {
    /// Virtual file path for diagnostics.
    pub main_path: EcoString,
    /// Typst source contents.
    pub main_source: EcoString,
}

impl InMemoryDoc {
    pub fn new(main_path: impl Into<EcoString>, main_source: impl Into<EcoString>) -> Self {
        Self {
            main_path: main_path.into(),
            main_source: main_source.into(),
        }
    }
}

pub struct TypstWorld {
    main: FileId,
    source: TypstSource,

    /// Directory that absolute virtual paths (`/foo.png`) resolve against.
    asset_root: Option<PathBuf>,

    library: LazyHash<Library>,
    fonts: &'static FontSet,
}

impl TypstWorld {
    /// Create a world around a single in-memory source using the shared font set.
    pub fn new(doc: InMemoryDoc) -> Result<Self, FontError> {
        Ok(Self::with_fonts(doc, FontSet::shared()?))
    }

    pub fn with_fonts(doc: InMemoryDoc, fonts: &'static FontSet) -> Self {
        let main = FileId::new(None, VirtualPath::new(doc.main_path.as_str()));
        let source = TypstSource::new(main, doc.main_source.to_string());

        Self {
            main,
            source,
            asset_root: None,
            library: LazyHash::new(Library::default()),
            fonts,
        }
    }

    /// Allow `file()` reads below `root`.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }
}

impl typst::World for TypstWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.fonts.book()
    }

    fn main(&self) -> FileId {
        self.main
    }

    fn source(&self, id: FileId) -> FileResult<TypstSource> {
        if id == self.main {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let not_found = || FileError::NotFound(id.vpath().as_rootless_path().into());

        if id.package().is_some() {
            return Err(not_found());
        }
        let root = self.asset_root.as_deref().ok_or_else(not_found)?;
        let path = id.vpath().resolve(root).ok_or(FileError::AccessDenied)?;

        std::fs::read(&path)
            .map(Bytes::new)
            .map_err(|err| FileError::from_io(err, &path))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.font(index)
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        None
    }
}
