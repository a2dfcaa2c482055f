//! Constant parameter ingestion.

use std::collections::HashMap;

use tracing::{debug, info, trace, warn};

use super::error::{ConvertError, StreamScope};
use super::primvars::{custom_value, primvar_name, to_i32};
use super::{ConversionReport, ConvertOptions};
use crate::agx::{AgxReader, OwnedArray, ParamView};
use crate::core::Role;
use crate::usd::{Interpolation, UsdMesh};
use crate::util::{Error, TypeTag};

/// Constant arrays kept by name. A repeated name replaces the earlier array.
#[derive(Clone, Debug, Default)]
pub struct ConstantStore {
    arrays: HashMap<String, OwnedArray>,
    order: Vec<String>,
}

impl ConstantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an array, replacing one with the same name.
    pub fn insert(&mut self, name: &str, array: OwnedArray) {
        if self.arrays.insert(name.to_string(), array).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&OwnedArray> {
        self.arrays.get(name)
    }

    /// Names in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Read every constant parameter once, in stream order.
///
/// Constant index arrays become the default topology; every array is kept in
/// `store`. With custom primvars enabled, custom arrays are authored as
/// default primvar values.
pub(crate) fn ingest_constants(
    reader: &AgxReader,
    mesh: &mut UsdMesh<'_>,
    store: &mut ConstantStore,
    options: &ConvertOptions,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let _span = tracing::info_span!("constants").entered();
    info!("Reading constant parameters...");

    let mut cursor = reader
        .constants()
        .map_err(ConvertError::stream(StreamScope::Constants))?;

    while let Some(param) = cursor
        .next_param()
        .map_err(ConvertError::stream(StreamScope::Constants))?
    {
        if !param.is_array {
            match param.decode_scalar() {
                Some(value) => debug!("Constant {} ({}) = {}", param.name, param.value_type, value),
                None => debug!("Constant {} ({})", param.name, param.value_type),
            }
            continue;
        }

        trace!(
            "Constant array {} ({}, {} elements, {} bytes)",
            param.name,
            param.element_type,
            param.element_count,
            param.data_bytes()
        );
        store.insert(param.name, param.to_owned_array());

        match Role::resolve(param.name) {
            Role::Index => set_constant_topology(mesh, &param, report)?,
            Role::Custom if options.custom_primvars => set_constant_primvar(mesh, &param, report)?,
            _ => {}
        }
    }

    report.constant_arrays = store.names().to_vec();
    Ok(())
}

fn set_constant_topology(
    mesh: &mut UsdMesh<'_>,
    param: &ParamView<'_>,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let Some(flat) = param.flat_u32() else {
        report.skipped_params += 1;
        warn!(
            "Skipping constant index array {}: expected UINT32 or UINT32_VEC3, got {}",
            param.name, param.element_type
        );
        return Ok(());
    };
    let Some(indices) = to_i32(flat) else {
        report.skipped_params += 1;
        warn!("Skipping constant index array {}: index exceeds int range", param.name);
        return Ok(());
    };

    let count = indices.len();
    mesh.set_face_vertex_indices(indices, None)
        .map_err(ConvertError::Author)?;
    if param.element_type == TypeTag::Uint32Vec3 || count % 3 == 0 {
        mesh.set_face_vertex_counts(vec![3; count / 3], None)
            .map_err(ConvertError::Author)?;
    }
    report.constant_topology = true;
    info!("  -> Set {} face vertex indices (constant)", count);
    Ok(())
}

fn set_constant_primvar(
    mesh: &mut UsdMesh<'_>,
    param: &ParamView<'_>,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let (Some(name), Some(value)) = (primvar_name(param.name), custom_value(param)) else {
        report.skipped_params += 1;
        debug!("Constant {} has no primvar mapping", param.name);
        return Ok(());
    };
    match mesh.set_primvar(&name, value, Interpolation::Vertex, None) {
        Ok(()) => {
            report.custom_params += 1;
            debug!("  -> Set primvar {} (constant)", name);
            Ok(())
        }
        Err(Error::TypeMismatch { expected, actual }) => {
            report.skipped_params += 1;
            warn!("Skipping constant {}: primvar is {}, got {}", param.name, expected, actual);
            Ok(())
        }
        Err(e) => Err(ConvertError::Author(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(bytes: &[u8]) -> OwnedArray {
        OwnedArray {
            element_type: TypeTag::Uint32,
            element_count: (bytes.len() / 4) as u64,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_store_last_write_wins() {
        let mut store = ConstantStore::new();
        store.insert("index", array(&[0; 4]));
        store.insert("weights", array(&[0; 8]));
        store.insert("index", array(&[0; 12]));

        assert_eq!(store.len(), 2);
        assert_eq!(store.names(), &["index".to_string(), "weights".to_string()]);
        let index = store.get("index").unwrap();
        assert_eq!(index.element_count, 3);
        assert_eq!(index.view("index").flat_u32(), Some(vec![0, 0, 0]));
        assert!(store.get("missing").is_none());
    }
}
