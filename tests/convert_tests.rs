//! End-to-end conversion tests: AGX files in, `.usda` stages out.

use std::path::{Path, PathBuf};

use agx_usd::agx::{AgxReader, AgxWriter, OParam};
use agx_usd::convert::{ConversionState, ConvertError, ConvertOptions, Converter, StreamScope};
use agx_usd::core::{TimeCode, TimeRange};
use agx_usd::usd::{Stage, UsdMesh, ValueType};
use agx_usd::util::{TypeTag, UVec3, Vec2, Vec3, Vec4};

use tempfile::{tempdir, TempDir};

const MESH: &str = "/Geometry/mesh";

fn quad_points() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
    ]
}

fn shifted(points: &[Vec3]) -> Vec<Vec3> {
    points.iter().map(|p| *p + Vec3::new(0.0, 1.0, 0.0)).collect()
}

/// Two time steps, constant topology of two triangles.
fn two_triangles(position_name: &str) -> AgxWriter {
    let mut w = AgxWriter::triangles();
    w.add_constant(OParam::array("primitive.index", TypeTag::Uint32, &[0u32, 1, 2, 1, 2, 3]));
    w.add_time_step().push(OParam::array(position_name, TypeTag::Float32Vec3, &quad_points()));
    w.add_time_step().push(OParam::array(
        position_name,
        TypeTag::Float32Vec3,
        &shifted(&quad_points()),
    ));
    w
}

fn write_input(dir: &TempDir, name: &str, writer: &AgxWriter) -> PathBuf {
    let path = dir.path().join(name);
    writer.write(&path).expect("Failed to write AGX input");
    path
}

/// Convert into an in-memory stage.
fn convert_in_memory(path: &Path, options: ConvertOptions) -> (Stage, agx_usd::ConversionReport) {
    let mut reader = AgxReader::open(path).expect("Failed to open AGX input");
    let mut stage = Stage::in_memory();
    let report = Converter::new(options)
        .convert_to_stage(&mut reader, &mut stage)
        .expect("Conversion failed");
    (stage, report)
}

fn t(v: f64) -> Option<TimeCode> {
    Some(TimeCode::new(v))
}

#[test]
fn test_two_timestep_two_triangle_scenario() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(&dir, "quad.agx", &two_triangles("position"));
    let output = dir.path().join("quad.usda");

    let mut converter = Converter::new(ConvertOptions::default());
    let report = converter.convert_file(&input, &output).expect("Conversion failed");
    println!("Report: {:?}", report);

    assert_eq!(converter.state(), ConversionState::Saved);
    assert_eq!(report.time_steps_processed, 2);
    assert_eq!(report.point_samples, 2);
    assert!(report.constant_topology);
    assert_eq!(report.skipped_params, 0);
    assert_eq!(report.constant_arrays, vec!["primitive.index".to_string()]);
    assert_eq!(report.output.as_deref(), Some(output.as_path()));
    assert_eq!(
        report.time_range,
        TimeRange { start: TimeCode::new(0.0), end: TimeCode::new(1.0) }
    );

    let text = std::fs::read_to_string(&output).expect("Failed to read output");
    println!("{}", text);
    assert!(text.starts_with("#usda 1.0\n"));
    assert!(text.contains("defaultPrim = \"Geometry\""));
    assert!(text.contains("startTimeCode = 0"));
    assert!(text.contains("endTimeCode = 1"));
    assert!(text.contains("timeCodesPerSecond = 24"));
    assert!(text.contains("upAxis = \"Y\""));
    assert!(text.contains("def Xform \"Geometry\""));
    assert!(text.contains("def Mesh \"mesh\""));
    assert!(text.contains("int[] faceVertexCounts = [3, 3]"));
    assert!(text.contains("int[] faceVertexIndices = [0, 1, 2, 1, 2, 3]"));
    assert!(text.contains("point3f[] points.timeSamples = {"));
    assert!(text.contains("0: [(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 0)],"));
    assert!(text.contains("1: [(0, 1, 0), (1, 1, 0), (0, 2, 0), (1, 2, 0)],"));
    assert!(text.contains("float3[] extent.timeSamples = {"));

    // No temporary file left beside the output.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .expect("Failed to list temp dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_scenario_resolved_values() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(&dir, "quad.agx", &two_triangles("vertex.position"));
    let (mut stage, _) = convert_in_memory(&input, ConvertOptions::default());

    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    for time in [t(0.0), t(1.0)] {
        assert_eq!(mesh.face_vertex_counts(time), Some(&[3, 3][..]));
        assert_eq!(mesh.face_vertex_indices(time), Some(&[0, 1, 2, 1, 2, 3][..]));
    }
    assert_eq!(mesh.points(t(0.0)), Some(&quad_points()[..]));
    assert_eq!(mesh.points(t(1.0)), Some(&shifted(&quad_points())[..]));

    let points = mesh.prim().attribute("points").expect("points attribute");
    assert_eq!(points.value_type(), ValueType::Point3fArray);
    assert_eq!(points.sample_times(), vec![TimeCode::new(0.0), TimeCode::new(1.0)]);
    assert!(points.default_value().is_none());
}

#[test]
fn test_position_synonyms_are_equivalent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = write_input(&dir, "a.agx", &two_triangles("vertex.positions"));
    let b = write_input(&dir, "b.agx", &two_triangles("position"));

    let (stage_a, report_a) = convert_in_memory(&a, ConvertOptions::default());
    let (stage_b, report_b) = convert_in_memory(&b, ConvertOptions::default());

    assert_eq!(report_a.point_samples, report_b.point_samples);
    assert_eq!(stage_a.to_usda(), stage_b.to_usda());
}

#[test]
fn test_non_vec3_position_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    w.add_time_step()
        .push(OParam::array("position", TypeTag::Float32Vec2, &[Vec2::ZERO, Vec2::ONE]));
    w.add_time_step()
        .push(OParam::array("position", TypeTag::Float32Vec3, &quad_points()));
    let input = write_input(&dir, "vec2.agx", &w);
    let output = dir.path().join("vec2.usda");

    let report = agx_usd::convert(&input, &output).expect("Skipped params are not errors");
    assert_eq!(report.skipped_params, 1);
    assert_eq!(report.point_samples, 1);

    let (mut stage, _) = convert_in_memory(&input, ConvertOptions::default());
    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    let points = mesh.prim().attribute("points").expect("points attribute");
    assert_eq!(points.sample_times(), vec![TimeCode::new(1.0)]);
}

#[test]
fn test_per_step_topology_overrides_only_its_time() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    w.add_constant(OParam::array("index", TypeTag::Uint32Vec3, &[UVec3::new(0, 1, 2)]));
    w.add_time_step()
        .push(OParam::array("position", TypeTag::Float32Vec3, &quad_points()));
    w.add_time_step().push(OParam::array(
        "primitive.indices",
        TypeTag::Uint32Vec3,
        &[UVec3::new(0, 1, 2), UVec3::new(1, 3, 2)],
    ));
    w.add_time_step()
        .push(OParam::array("position", TypeTag::Float32Vec3, &quad_points()));
    let input = write_input(&dir, "topo.agx", &w);

    let (mut stage, report) = convert_in_memory(&input, ConvertOptions::default());
    assert_eq!(report.topology_samples, 1);

    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    assert_eq!(mesh.face_vertex_indices(t(0.0)), Some(&[0, 1, 2][..]));
    assert_eq!(mesh.face_vertex_indices(t(1.0)), Some(&[0, 1, 2, 1, 3, 2][..]));
    assert_eq!(mesh.face_vertex_counts(t(1.0)), Some(&[3, 3][..]));
    assert_eq!(mesh.face_vertex_indices(t(2.0)), Some(&[0, 1, 2][..]));
    assert_eq!(mesh.face_vertex_counts(t(2.0)), Some(&[3][..]));
}

#[test]
fn test_constant_index_not_divisible_by_three() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    w.add_constant(OParam::array("indices", TypeTag::Uint32, &[0u32, 1, 2, 3]));
    let input = write_input(&dir, "odd.agx", &w);

    let (mut stage, report) = convert_in_memory(&input, ConvertOptions::default());
    assert_eq!(report.time_steps_processed, 0);
    assert_eq!(report.time_range.end, TimeCode::new(0.0));

    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    assert_eq!(mesh.face_vertex_indices(None), Some(&[0, 1, 2, 3][..]));
    assert_eq!(mesh.face_vertex_counts(None), None);
}

#[test]
fn test_attribute0_arity_change_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    w.add_time_step()
        .push(OParam::array("attribute0", TypeTag::Float32, &[0.5f32, 1.5, 2.5]));
    w.add_time_step().push(OParam::array(
        "vertex.attribute0",
        TypeTag::Float32Vec3,
        &[Vec3::ONE, Vec3::ONE, Vec3::ONE],
    ));
    w.add_time_step()
        .push(OParam::array("attribute0", TypeTag::Float32, &[3.0f32, 4.0, 5.0]));
    let input = write_input(&dir, "attr.agx", &w);

    let (mut stage, report) = convert_in_memory(&input, ConvertOptions::default());
    assert_eq!(report.skipped_params, 1);

    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    let attr = mesh.primvar("attribute0").expect("attribute0 primvar");
    assert_eq!(attr.value_type(), ValueType::FloatArray);
    assert_eq!(attr.interpolation(), Some("vertex"));
    assert_eq!(attr.sample_times(), vec![TimeCode::new(0.0), TimeCode::new(2.0)]);
    assert_eq!(
        attr.get(t(1.0)).and_then(|v| v.as_float_array()),
        Some(&[0.5f32, 1.5, 2.5][..]),
        "the skipped step holds the earlier sample"
    );
    assert_eq!(
        attr.get(t(2.0)).and_then(|v| v.as_float_array()),
        Some(&[3.0f32, 4.0, 5.0][..])
    );
}

#[test]
fn test_normals_texcoords_and_vec4_attribute() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    let step = w.add_time_step();
    step.push(OParam::array("normals", TypeTag::Float32Vec3, &[Vec3::Z; 3]));
    step.push(OParam::array("uv", TypeTag::Float32Vec2, &[Vec2::ZERO, Vec2::X, Vec2::Y]));
    step.push(OParam::array("attribute0", TypeTag::Float32Vec4, &[Vec4::ONE; 3]));
    step.push(OParam::scalar("time", TypeTag::Float32, 0.0f32));
    let input = write_input(&dir, "attrs.agx", &w);

    let (stage, report) = convert_in_memory(&input, ConvertOptions::default());
    assert_eq!(report.normal_samples, 1);
    assert_eq!(report.skipped_params, 0);

    let text = stage.to_usda();
    println!("{}", text);
    assert!(text.contains("normal3f[] normals (\n"));
    assert!(text.contains("interpolation = \"vertex\""));
    assert!(text.contains("texCoord2f[] primvars:st (\n"));
    assert!(text.contains("float4[] primvars:attribute0 (\n"));
    let mesh = stage.prim(MESH).expect("Mesh prim missing");
    let st = mesh.attribute("primvars:st").expect("st primvar");
    assert_eq!(
        st.get(t(0.0)).and_then(|v| v.as_float2_array()),
        Some(&[Vec2::ZERO, Vec2::X, Vec2::Y][..])
    );
    let attr = mesh.attribute("primvars:attribute0").expect("attribute0 primvar");
    assert_eq!(
        attr.get(t(0.0)).and_then(|v| v.as_float4_array()),
        Some(&[Vec4::ONE; 3][..])
    );
    assert!(
        mesh.attributes().iter().all(|a| !a.name().contains("time")),
        "time parameters are never written"
    );
}

#[test]
fn test_custom_arrays() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut w = AgxWriter::triangles();
    w.add_constant(OParam::array("vertex.weight", TypeTag::Float32, &[1.0f32, 0.5, 0.25]));
    w.add_time_step()
        .push(OParam::array("vertex.temperature", TypeTag::Float32, &[20.0f32, 21.0, 22.0]));
    let input = write_input(&dir, "custom.agx", &w);

    // Logged only by default.
    let (stage, report) = convert_in_memory(&input, ConvertOptions::default());
    assert_eq!(report.custom_params, 1);
    assert!(!stage.to_usda().contains("primvars:vertex_"));

    let options = ConvertOptions {
        custom_primvars: true,
        ..ConvertOptions::default()
    };
    let (mut stage, report) = convert_in_memory(&input, options);
    assert_eq!(report.custom_params, 2);

    let mesh = UsdMesh::get(&mut stage, MESH).expect("Mesh prim missing");
    let weight = mesh.primvar("vertex_weight").expect("constant custom primvar");
    assert!(weight.default_value().is_some());
    assert!(!weight.has_time_samples());
    let temperature = mesh.primvar("vertex_temperature").expect("sampled custom primvar");
    assert_eq!(temperature.sample_times(), vec![TimeCode::new(0.0)]);
}

#[test]
fn test_conversion_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(&dir, "quad.agx", &two_triangles("position"));
    let out_a = dir.path().join("a.usda");
    let out_b = dir.path().join("b.usda");

    agx_usd::convert(&input, &out_a).expect("First conversion failed");
    agx_usd::convert(&input, &out_b).expect("Second conversion failed");
    // Converting again over an existing output replaces it.
    agx_usd::convert(&input, &out_a).expect("Re-conversion failed");

    let a = std::fs::read_to_string(&out_a).expect("read a");
    let b = std::fs::read_to_string(&out_b).expect("read b");
    assert_eq!(a, b);
}

#[test]
fn test_missing_input_exit_code() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = agx_usd::convert(dir.path().join("missing.agx"), dir.path().join("out.usda"))
        .expect_err("Missing input must fail");
    assert!(matches!(err, ConvertError::SourceOpen { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_unsupported_output_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = write_input(&dir, "quad.agx", &two_triangles("position"));
    let err = agx_usd::convert(&input, dir.path().join("out.usdc"))
        .expect_err("Binary crate output is not supported");
    println!("Error: {}", err);
    assert!(matches!(
        err,
        ConvertError::DocumentCreate { source: agx_usd::Error::BinaryLayerUnsupported(_), .. }
    ));
    assert!(err.to_string().contains("write a .usda file instead"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_bad_header_exit_code() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("garbage.agx");
    std::fs::write(&input, b"not an agx file at all....").expect("Failed to write input");
    let output = dir.path().join("out.usda");

    let mut converter = Converter::default();
    let err = converter.convert_file(&input, &output).expect_err("Bad magic must fail");
    assert!(matches!(err, ConvertError::HeaderRead(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(converter.state(), ConversionState::Failed);
    assert!(!output.exists());
}

#[test]
fn test_truncated_time_step_fails_without_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("truncated.agx");
    let mut bytes = two_triangles("position").to_bytes().expect("Failed to encode");
    bytes.truncate(bytes.len() - 7);
    std::fs::write(&input, &bytes).expect("Failed to write input");
    let output = dir.path().join("out.usda");

    let err = agx_usd::convert(&input, &output).expect_err("Truncated input must fail");
    println!("Error: {}", err);
    assert!(matches!(
        err,
        ConvertError::StreamRead { scope: StreamScope::TimeSteps, .. }
    ));
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
}

#[test]
fn test_partial_step_header_ends_stream() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("trailing.agx");
    let mut bytes = two_triangles("position").to_bytes().expect("Failed to encode");
    // Index of a third step without its parameter count.
    bytes.extend_from_slice(&[0u8; 4]);
    std::fs::write(&input, &bytes).expect("Failed to write input");
    let output = dir.path().join("out.usda");

    let report = agx_usd::convert(&input, &output).expect("Complete steps still convert");
    println!("Report: {:?}", report);
    assert_eq!(report.time_steps_processed, 2);
    assert_eq!(report.point_samples, 2);
    assert!(output.exists());

    let text = std::fs::read_to_string(&output).expect("Failed to read output");
    assert!(text.contains("point3f[] points.timeSamples = {"));
}
