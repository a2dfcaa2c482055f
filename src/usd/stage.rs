//! Stage: root prims plus layer metadata, persisted as `.usda` text.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::prim::Prim;
use super::usda;
use crate::core::{TimeCode, TimeRange};
use crate::util::{Error, Result};

/// Stage up axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpAxis {
    #[default]
    Y,
    Z,
}

impl UpAxis {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

impl fmt::Display for UpAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Layer metadata of a stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageMetadata {
    pub up_axis: UpAxis,
    pub meters_per_unit: f64,
    pub start_time_code: TimeCode,
    pub end_time_code: TimeCode,
    pub time_codes_per_second: f64,
    pub frames_per_second: f64,
    pub default_prim: Option<String>,
    pub doc: Option<String>,
}

impl Default for StageMetadata {
    fn default() -> Self {
        Self {
            up_axis: UpAxis::Y,
            meters_per_unit: 1.0,
            start_time_code: TimeCode::new(0.0),
            end_time_code: TimeCode::new(0.0),
            time_codes_per_second: 24.0,
            frames_per_second: 24.0,
            default_prim: None,
            doc: Some(generator_doc()),
        }
    }
}

/// `doc` string naming the generator and its build stamp.
pub fn generator_doc() -> String {
    let date = option_env!("AGX_USD_BUILD_DATE").unwrap_or("unknown");
    let time = option_env!("AGX_USD_BUILD_TIME").unwrap_or("unknown");
    format!(
        "Generated by agx-usd {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        date,
        time
    )
}

/// An in-memory USD stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stage {
    path: Option<PathBuf>,
    metadata: StageMetadata,
    root_prims: Vec<Prim>,
}

impl Stage {
    /// Create a new stage bound to a `.usda`/`.usd` file path.
    ///
    /// Nothing is written until [`save`](Self::save). Fails when the
    /// extension is not a text layer extension or the parent directory does
    /// not exist.
    pub fn create_new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if ext.eq_ignore_ascii_case("usdc") {
            return Err(Error::BinaryLayerUnsupported(path.to_path_buf()));
        }
        if !(ext.eq_ignore_ascii_case("usda") || ext.eq_ignore_ascii_case("usd")) {
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(Error::FileNotFound(parent.to_path_buf()));
            }
        }
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Create a stage with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file path, if any.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn metadata(&self) -> &StageMetadata {
        &self.metadata
    }

    pub fn set_up_axis(&mut self, up_axis: UpAxis) {
        self.metadata.up_axis = up_axis;
    }

    pub fn set_meters_per_unit(&mut self, meters_per_unit: f64) {
        self.metadata.meters_per_unit = meters_per_unit;
    }

    /// Set the start and end time codes.
    pub fn set_time_range(&mut self, range: TimeRange) {
        self.metadata.start_time_code = range.start;
        self.metadata.end_time_code = range.end;
    }

    /// The declared `[startTimeCode, endTimeCode]` range.
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.metadata.start_time_code,
            end: self.metadata.end_time_code,
        }
    }

    /// Set both time codes per second and frames per second.
    pub fn set_frame_rate(&mut self, fps: f64) {
        self.metadata.time_codes_per_second = fps;
        self.metadata.frames_per_second = fps;
    }

    pub fn set_doc(&mut self, doc: Option<String>) {
        self.metadata.doc = doc;
    }

    /// Set the default prim. It must be an existing root prim.
    pub fn set_default_prim(&mut self, name: &str) -> Result<()> {
        if !self.root_prims.iter().any(|p| p.name() == name) {
            return Err(Error::PrimNotFound(format!("/{}", name)));
        }
        self.metadata.default_prim = Some(name.to_string());
        Ok(())
    }

    /// The default prim, if set.
    pub fn default_prim(&self) -> Option<&Prim> {
        let name = self.metadata.default_prim.as_deref()?;
        self.root_prims.iter().find(|p| p.name() == name)
    }

    /// Root prims in definition order.
    #[inline]
    pub fn root_prims(&self) -> &[Prim] {
        &self.root_prims
    }

    /// Define a prim at an absolute path such as `/Geometry/mesh`.
    ///
    /// The parent must already exist. Defining an existing prim updates its
    /// type name and returns it.
    pub fn define_prim(&mut self, path: &str, type_name: &str) -> Result<&mut Prim> {
        let names = split_path(path)?;
        let Some((name, parents)) = names.split_last() else {
            return Err(Error::InvalidPath(path.to_string()));
        };

        let prim = if parents.is_empty() {
            if !self.root_prims.iter().any(|p| p.name() == *name) {
                self.root_prims.push(Prim::new(name, type_name)?);
            }
            self.root_prims.iter_mut().find(|p| p.name() == *name)
        } else {
            let parent = find_mut(&mut self.root_prims, parents)
                .ok_or_else(|| Error::PrimNotFound(format!("/{}", parents.join("/"))))?;
            if parent.child(name).is_none() {
                parent.add_child(Prim::new(name, type_name)?)?;
            }
            parent.child_mut(name)
        };

        let prim = prim.ok_or_else(|| Error::PrimNotFound(path.to_string()))?;
        prim.set_type_name(type_name);
        Ok(prim)
    }

    /// Look up a prim by absolute path.
    pub fn prim(&self, path: &str) -> Option<&Prim> {
        let names = split_path(path).ok()?;
        let (first, rest) = names.split_first()?;
        let mut prim = self.root_prims.iter().find(|p| p.name() == *first)?;
        for name in rest {
            prim = prim.child(name)?;
        }
        Some(prim)
    }

    /// Look up a mutable prim by absolute path.
    pub fn prim_mut(&mut self, path: &str) -> Option<&mut Prim> {
        let names = split_path(path).ok()?;
        find_mut(&mut self.root_prims, &names)
    }

    /// Render the stage as `.usda` text.
    pub fn to_usda(&self) -> String {
        usda::render(self)
    }

    /// Write the stage to its backing file.
    ///
    /// The text goes to a temporary sibling first and is then renamed over
    /// the target, so a failed save leaves no partial file.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::other("Stage has no backing file"))?;
        self.export(path)
    }

    /// Write the stage as `.usda` text to an arbitrary path.
    pub fn export(&self, path: &Path) -> Result<()> {
        let tmp = temp_sibling(path);
        let written = write_text(&tmp, &self.to_usda())
            .and_then(|()| fs::rename(&tmp, path).map_err(Error::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Split an absolute prim path into its names.
fn split_path(path: &str) -> Result<Vec<&str>> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
    let names: Vec<&str> = rest.split('/').collect();
    if names.iter().any(|n| n.is_empty()) {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(names)
}

fn find_mut<'a>(roots: &'a mut [Prim], names: &[&str]) -> Option<&'a mut Prim> {
    let (first, rest) = names.split_first()?;
    let mut prim = roots.iter_mut().find(|p| p.name() == *first)?;
    for name in rest {
        prim = prim.child_mut(name)?;
    }
    Some(prim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usd::prim::{MESH_TYPE, XFORM_TYPE};

    #[test]
    fn test_define_hierarchy() {
        let mut stage = Stage::in_memory();
        stage.define_prim("/Geometry", XFORM_TYPE).unwrap();
        stage.define_prim("/Geometry/mesh", MESH_TYPE).unwrap();
        stage.set_default_prim("Geometry").unwrap();

        assert_eq!(stage.prim("/Geometry/mesh").unwrap().type_name(), "Mesh");
        assert_eq!(stage.default_prim().unwrap().children().len(), 1);

        // Redefining returns the existing prim.
        stage.define_prim("/Geometry/mesh", MESH_TYPE).unwrap();
        assert_eq!(stage.prim("/Geometry").unwrap().children().len(), 1);
    }

    #[test]
    fn test_define_requires_parent() {
        let mut stage = Stage::in_memory();
        let err = stage.define_prim("/Geometry/mesh", MESH_TYPE).unwrap_err();
        assert!(matches!(err, Error::PrimNotFound(_)));
        assert!(matches!(stage.define_prim("Geometry", XFORM_TYPE), Err(Error::InvalidPath(_))));
        assert!(matches!(stage.define_prim("/a//b", XFORM_TYPE), Err(Error::InvalidPath(_))));
        assert!(stage.set_default_prim("Geometry").is_err());
    }

    #[test]
    fn test_create_new_checks_extension() {
        let err = Stage::create_new("out.usdc").unwrap_err();
        assert!(matches!(err, Error::BinaryLayerUnsupported(_)));
        assert!(err.to_string().contains(".usda"));
        assert!(matches!(Stage::create_new("out.abc"), Err(Error::UnsupportedFormat(_))));
        assert!(Stage::create_new("out.usda").is_ok());
        assert!(Stage::create_new("/definitely/missing/dir/out.usda").is_err());
    }

    #[test]
    fn test_save_without_path() {
        assert!(Stage::in_memory().save().is_err());
    }

    #[test]
    fn test_temp_sibling() {
        let tmp = temp_sibling(Path::new("/tmp/scene.usda"));
        assert_eq!(tmp, PathBuf::from("/tmp/.scene.usda.tmp"));
    }
}
