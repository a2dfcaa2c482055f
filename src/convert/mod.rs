//! AGX to USD conversion.
//!
//! A conversion opens the AGX file, reads its header, configures a stage
//! with a root `Xform` and one `Mesh` beneath it, ingests the constant
//! parameters once, then every time step in stream order, and finally saves
//! the stage. The first error aborts the run and nothing is written.
//!
//! ```ignore
//! use agx_usd::convert::{Converter, ConvertOptions};
//!
//! let mut converter = Converter::new(ConvertOptions::default());
//! let report = converter.convert_file("anim.agx", "anim.usda")?;
//! println!("{} time steps", report.time_steps_processed);
//! ```

mod constants;
mod error;
mod primvars;
mod timesteps;

pub use constants::ConstantStore;
pub use error::{ConvertError, StreamScope};
pub use timesteps::ATTRIBUTE0_PRIMVAR;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::agx::{AgxHeader, AgxReader};
use crate::core::TimeRange;
use crate::usd::{Stage, UpAxis, UsdMesh, XFORM_TYPE};
use crate::util::TypeTag;

/// Conversion settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertOptions {
    pub up_axis: UpAxis,
    pub meters_per_unit: f64,
    /// Time codes per second and frames per second.
    pub frames_per_second: f64,
    /// Name of the root `Xform` prim, also the default prim.
    pub root_prim: String,
    /// Name of the `Mesh` prim under the root.
    pub mesh_prim: String,
    /// Author custom arrays as primvars.
    pub custom_primvars: bool,
    /// Memory map the input file.
    pub use_mmap: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            up_axis: UpAxis::Y,
            meters_per_unit: 1.0,
            frames_per_second: 24.0,
            root_prim: "Geometry".to_string(),
            mesh_prim: "mesh".to_string(),
            custom_primvars: false,
            use_mmap: cfg!(feature = "mmap"),
        }
    }
}

impl ConvertOptions {
    /// Absolute path of the mesh prim.
    pub fn mesh_path(&self) -> String {
        format!("/{}/{}", self.root_prim, self.mesh_prim)
    }
}

/// Progress of a conversion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversionState {
    #[default]
    Uninitialized,
    HeaderRead,
    StageConfigured,
    ConstantsIngested,
    /// Entered the time step with this index.
    TimestepBegin(u32),
    /// Finished the parameters of the time step with this index.
    TimestepParamsIngested(u32),
    Saved,
    Failed,
}

/// Summary of a finished conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionReport {
    pub header: AgxHeader,
    pub subtype: Option<String>,
    /// Declared stage time range.
    pub time_range: TimeRange,
    pub time_steps_processed: u32,
    pub point_samples: usize,
    pub normal_samples: usize,
    /// Time-sampled topology (index) updates.
    pub topology_samples: usize,
    /// True when a constant index array set the default topology.
    pub constant_topology: bool,
    /// Parameters skipped for a shape or type mismatch.
    pub skipped_params: usize,
    /// Custom arrays seen (or authored, with custom primvars on).
    pub custom_params: usize,
    /// Names of the retained constant arrays, in first-seen order.
    pub constant_arrays: Vec<String>,
    /// Written file, set once the stage is saved.
    pub output: Option<PathBuf>,
}

impl ConversionReport {
    fn new(header: AgxHeader, subtype: Option<String>) -> Self {
        let time_range = TimeRange::from_time_steps(header.time_steps);
        Self {
            header,
            subtype,
            time_range,
            time_steps_processed: 0,
            point_samples: 0,
            normal_samples: 0,
            topology_samples: 0,
            constant_topology: false,
            skipped_params: 0,
            custom_params: 0,
            constant_arrays: Vec::new(),
            output: None,
        }
    }
}

/// Runs conversions and tracks the state of the current one.
#[derive(Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
    state: ConversionState,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            state: ConversionState::Uninitialized,
        }
    }

    #[inline]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// State reached by the last run.
    #[inline]
    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Convert an AGX file into a `.usda` file.
    pub fn convert_file(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<ConversionReport, ConvertError> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let _span = tracing::info_span!("convert", input = %input.display()).entered();
        self.state = ConversionState::Uninitialized;

        let result = self.run_file(input, output);
        if result.is_err() {
            self.state = ConversionState::Failed;
        }
        result
    }

    fn run_file(&mut self, input: &Path, output: &Path) -> Result<ConversionReport, ConvertError> {
        let mut reader = AgxReader::open_opts(input, self.options.use_mmap).map_err(|source| {
            ConvertError::SourceOpen {
                path: input.to_path_buf(),
                source,
            }
        })?;
        tracing::debug!("Opened {} (mapped: {})", input.display(), reader.streams().is_mapped());

        let mut stage = Stage::create_new(output).map_err(|source| ConvertError::DocumentCreate {
            path: output.to_path_buf(),
            source,
        })?;

        let mut report = self.convert_to_stage(&mut reader, &mut stage)?;

        info!("Saving USD file to: {}", output.display());
        stage.save().map_err(|source| ConvertError::Save {
            path: output.to_path_buf(),
            source,
        })?;
        self.state = ConversionState::Saved;
        report.output = Some(output.to_path_buf());

        info!("Conversion complete!");
        info!("Time range: {} to {}", report.time_range.start, report.time_range.end);
        Ok(report)
    }

    /// Convert an opened reader into a stage without saving it.
    pub fn convert_to_stage(
        &mut self,
        reader: &mut AgxReader,
        stage: &mut Stage,
    ) -> Result<ConversionReport, ConvertError> {
        let result = self.ingest(reader, stage);
        if result.is_err() {
            self.state = ConversionState::Failed;
        }
        result
    }

    fn ingest(&mut self, reader: &mut AgxReader, stage: &mut Stage) -> Result<ConversionReport, ConvertError> {
        let header = reader.read_header().map_err(ConvertError::HeaderRead)?.clone();
        let subtype = reader.subtype().map(str::to_string);
        self.state = ConversionState::HeaderRead;
        log_header(&header, subtype.as_deref());

        let mut report = ConversionReport::new(header, subtype);
        self.configure_stage(stage, report.time_range)?;
        self.state = ConversionState::StageConfigured;

        let mut mesh = UsdMesh::get(stage, &self.options.mesh_path()).map_err(ConvertError::Author)?;

        let mut store = ConstantStore::new();
        constants::ingest_constants(reader, &mut mesh, &mut store, &self.options, &mut report)?;
        self.state = ConversionState::ConstantsIngested;

        timesteps::ingest_time_steps(reader, &mut mesh, &self.options, &mut self.state, &mut report)?;

        if report.time_steps_processed != report.header.time_steps {
            warn!(
                "Header declares {} time steps, stream holds {}",
                report.header.time_steps, report.time_steps_processed
            );
        }
        Ok(report)
    }

    /// Stage metadata and the prim hierarchy, fixed before any sample is set.
    fn configure_stage(&self, stage: &mut Stage, range: TimeRange) -> Result<(), ConvertError> {
        let opts = &self.options;
        stage.set_up_axis(opts.up_axis);
        stage.set_meters_per_unit(opts.meters_per_unit);
        stage.set_time_range(range);
        stage.set_frame_rate(opts.frames_per_second);

        stage
            .define_prim(&format!("/{}", opts.root_prim), XFORM_TYPE)
            .map_err(ConvertError::Author)?;
        stage
            .set_default_prim(&opts.root_prim)
            .map_err(ConvertError::Author)?;
        UsdMesh::define(stage, &opts.mesh_path()).map_err(ConvertError::Author)?;
        Ok(())
    }
}

fn log_header(header: &AgxHeader, subtype: Option<&str>) {
    info!("AGX File Info:");
    info!("  Version: {}", header.version);
    info!("  Time Steps: {}", header.time_steps);
    info!("  Constants: {}", header.constant_param_count);
    info!("  Object Type: {}", header.object_type);
    if let Some(subtype) = subtype {
        info!("  Subtype: {}", subtype);
    }
    if header.object_type != TypeTag::Geometry {
        warn!("Object type {} is not GEOMETRY, converting anyway", header.object_type);
    }
}

/// Convert `input` into `output` with default options.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionReport, ConvertError> {
    Converter::new(ConvertOptions::default()).convert_file(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.mesh_path(), "/Geometry/mesh");
        assert_eq!(opts.up_axis, UpAxis::Y);
        assert_eq!(opts.frames_per_second, 24.0);
        assert!(!opts.custom_primvars);
    }

    #[test]
    fn test_missing_input_fails_to_open() {
        let mut converter = Converter::default();
        let err = converter
            .convert_file("/nonexistent/input.agx", "/nonexistent/output.usda")
            .unwrap_err();
        assert!(matches!(err, ConvertError::SourceOpen { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(converter.state(), ConversionState::Failed);
    }
}
