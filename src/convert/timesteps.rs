//! Per-time-step ingestion and role dispatch.

use tracing::{debug, info, trace, warn};

use super::error::{ConvertError, StreamScope};
use super::primvars::{custom_value, float_value, primvar_name, to_i32};
use super::{ConversionReport, ConversionState, ConvertOptions};
use crate::agx::{AgxReader, ArrayData, ParamView};
use crate::core::{Role, TimeCode};
use crate::usd::{Interpolation, UsdMesh, Value};
use crate::util::Error;

/// Primvar name of the generic vertex attribute.
pub const ATTRIBUTE0_PRIMVAR: &str = "attribute0";

/// Read every time step in stream order and author its parameters at the
/// step's time code.
pub(crate) fn ingest_time_steps(
    reader: &AgxReader,
    mesh: &mut UsdMesh<'_>,
    options: &ConvertOptions,
    state: &mut ConversionState,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let mut cursor = reader
        .time_steps()
        .map_err(ConvertError::stream(StreamScope::TimeSteps))?;
    let mut last_index: Option<u32> = None;

    loop {
        // An unreadable step header ends the stream; the steps before it stand.
        let step = match cursor.begin_next() {
            Ok(Some(step)) => step,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopping at unreadable time step header: {}", e);
                break;
            }
        };
        *state = ConversionState::TimestepBegin(step.index);
        let _span = tracing::info_span!("time_step", index = step.index).entered();
        info!("Time step {} ({} parameters)", step.index, step.param_count);

        if let Some(prev) = last_index {
            if step.index <= prev {
                warn!("Time step {} is not after time step {}", step.index, prev);
            }
        }
        last_index = Some(step.index);

        let time = TimeCode::from_step(step.index);
        if !report.time_range.contains(time) {
            warn!(
                "Time step {} lies outside the declared range {} to {}",
                step.index, report.time_range.start, report.time_range.end
            );
        }

        while let Some(param) = cursor
            .next_param()
            .map_err(ConvertError::stream(StreamScope::TimeSteps))?
        {
            apply_param(mesh, &param, time, options, report)?;
        }

        *state = ConversionState::TimestepParamsIngested(step.index);
        report.time_steps_processed += 1;
    }
    Ok(())
}

/// Author one parameter by role. Shape mismatches are skipped.
fn apply_param(
    mesh: &mut UsdMesh<'_>,
    param: &ParamView<'_>,
    time: TimeCode,
    options: &ConvertOptions,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let at = Some(time);
    match Role::resolve(param.name) {
        Role::Position => match param.decode_array() {
            Some(ArrayData::Vec3f(points)) => {
                let n = points.len();
                mesh.set_points(points, at).map_err(ConvertError::Author)?;
                report.point_samples += 1;
                info!("  -> Set {} vertex positions at time {}", n, time);
            }
            _ => skip(param, "FLOAT32_VEC3 array", report),
        },
        Role::Normal => match param.decode_array() {
            Some(ArrayData::Vec3f(normals)) => {
                let n = normals.len();
                mesh.set_normals(normals, at).map_err(ConvertError::Author)?;
                mesh.set_normals_interpolation(Interpolation::Vertex)
                    .map_err(ConvertError::Author)?;
                report.normal_samples += 1;
                debug!("  -> Set {} normals at time {}", n, time);
            }
            _ => skip(param, "FLOAT32_VEC3 array", report),
        },
        Role::Attribute0 => match param.decode_array().and_then(float_value) {
            Some(value) => set_primvar(mesh, param, ATTRIBUTE0_PRIMVAR, value, time, report)?,
            None => skip(param, "FLOAT32 to FLOAT32_VEC4 array", report),
        },
        Role::TexCoord => match param.decode_array() {
            Some(ArrayData::Vec2f(uvs)) => {
                let n = uvs.len();
                mesh.set_texcoords(uvs, at).map_err(ConvertError::Author)?;
                debug!("  -> Set {} texture coordinates at time {}", n, time);
            }
            _ => skip(param, "FLOAT32_VEC2 array", report),
        },
        Role::Index => {
            let triangles = match param.decode_array() {
                Some(ArrayData::Vec3u(tris)) => tris,
                _ => {
                    skip(param, "UINT32_VEC3 array", report);
                    return Ok(());
                }
            };
            let Some(indices) = to_i32(triangles.iter().flat_map(|t| t.to_array())) else {
                skip(param, "indices within int range", report);
                return Ok(());
            };
            let count = triangles.len();
            mesh.set_face_vertex_indices(indices, at)
                .map_err(ConvertError::Author)?;
            mesh.set_face_vertex_counts(vec![3; count], at)
                .map_err(ConvertError::Author)?;
            report.topology_samples += 1;
            debug!("  -> Set {} triangles at time {}", count, time);
        }
        Role::Time => match param.decode_scalar() {
            Some(value) => debug!("Time value {} at step time {}", value, time),
            None => debug!("Time parameter of type {} ignored", param.type_tag()),
        },
        Role::Custom => apply_custom(mesh, param, time, options, report)?,
    }
    Ok(())
}

fn apply_custom(
    mesh: &mut UsdMesh<'_>,
    param: &ParamView<'_>,
    time: TimeCode,
    options: &ConvertOptions,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    if !param.is_array {
        trace!("Custom scalar {} ({})", param.name, param.value_type);
        return Ok(());
    }
    if options.custom_primvars {
        let name = primvar_name(param.name);
        let value = custom_value(param);
        if let (Some(name), Some(value)) = (name, value) {
            return set_primvar(mesh, param, &name, value, time, report);
        }
        skip(param, "numeric array with an identifier name", report);
        return Ok(());
    }
    report.custom_params += 1;
    debug!(
        "Custom array {} ({}, {} elements) not mapped",
        param.name, param.element_type, param.element_count
    );
    Ok(())
}

/// Set a vertex primvar; a value whose type differs from the declared one
/// is skipped.
fn set_primvar(
    mesh: &mut UsdMesh<'_>,
    param: &ParamView<'_>,
    name: &str,
    value: Value,
    time: TimeCode,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    match mesh.set_primvar(name, value, Interpolation::Vertex, Some(time)) {
        Ok(()) => {
            if name != ATTRIBUTE0_PRIMVAR {
                report.custom_params += 1;
            }
            debug!("  -> Set primvar {} at time {}", name, time);
            Ok(())
        }
        Err(Error::TypeMismatch { expected, actual }) => {
            report.skipped_params += 1;
            warn!(
                "Skipping {} at time {}: primvar {} is {}, got {}",
                param.name, time, name, expected, actual
            );
            Ok(())
        }
        Err(e) => Err(ConvertError::Author(e)),
    }
}

fn skip(param: &ParamView<'_>, expected: &str, report: &mut ConversionReport) {
    report.skipped_params += 1;
    let kind = if param.is_array { "array" } else { "scalar" };
    warn!(
        "Skipping {}: expected {}, got {} {} ({} elements, {} bytes)",
        param.name,
        expected,
        param.type_tag(),
        kind,
        param.element_count,
        param.data_bytes()
    );
}
