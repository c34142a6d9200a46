use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use prost::Message as _;
use protodoc_core::descriptor::{
    http_route, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FieldLabel, FieldType, FileDescriptorProto, FileDescriptorSet,
    HttpRoute, Location, MethodDescriptorProto, MethodOptions, ServiceDescriptorProto,
    SourceCodeInfo,
};
use tempfile::TempDir;

fn protodoc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_protodoc"))
}

fn field(name: &str, number: i32, ty: FieldType, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(FieldLabel::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_string),
        json_name: Some(name.to_string()),
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

fn routed(
    name: &str,
    input: &str,
    output: &str,
    pattern: http_route::Pattern,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(format!(".demo.{input}")),
        output_type: Some(format!(".demo.{output}")),
        options: Some(MethodOptions {
            deprecated: None,
            route: Some(HttpRoute {
                pattern: Some(pattern),
                body: None,
            }),
            http: None,
        }),
        client_streaming: None,
        server_streaming: None,
    }
}

/// `.demo.ClockApi` with two routed methods, one of which cannot render
/// (its request carries a fixed32 field).
fn write_fixture(dir: &Path) -> PathBuf {
    let file = FileDescriptorProto {
        name: Some("demo/clock.proto".to_string()),
        package: Some("demo".to_string()),
        message_type: vec![
            message(
                "GetTimeRequest",
                vec![
                    field("zone", 1, FieldType::String, None),
                    field("precise", 2, FieldType::Bool, None),
                ],
            ),
            message(
                "TimeInfo",
                vec![
                    field("seconds", 1, FieldType::Int64, None),
                    field("source", 2, FieldType::Enum, Some(".demo.TimeSource")),
                ],
            ),
            message("SyncRequest", vec![field("crc", 1, FieldType::Fixed32, None)]),
        ],
        enum_type: vec![EnumDescriptorProto {
            name: Some("TimeSource".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("GPS".to_string()),
                    number: Some(0),
                },
                EnumValueDescriptorProto {
                    name: Some("NTP".to_string()),
                    number: Some(1),
                },
            ],
        }],
        service: vec![ServiceDescriptorProto {
            name: Some("ClockApi".to_string()),
            method: vec![
                routed(
                    "GetTime",
                    "GetTimeRequest",
                    "TimeInfo",
                    http_route::Pattern::Get("/api/clock/{zone}".into()),
                ),
                routed(
                    "Sync",
                    "SyncRequest",
                    "TimeInfo",
                    http_route::Pattern::Post("/api/clock:sync".into()),
                ),
            ],
        }],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                Location {
                    path: vec![6, 0, 2, 0],
                    leading_comments: Some(" Current time in a zone.\n".to_string()),
                    trailing_comments: None,
                },
                Location {
                    path: vec![4, 0, 2, 7],
                    leading_comments: Some(" Points past the last field.\n".to_string()),
                    trailing_comments: None,
                },
            ],
        }),
        ..Default::default()
    };

    let path = dir.join("demo.protobin");
    let set = FileDescriptorSet { file: vec![file] };
    fs::write(&path, set.encode_to_vec()).expect("write descriptor set");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(protodoc_bin())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run protodoc")
}

#[test]
fn message_is_printed_as_interface() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());

    let out = run(&["--descriptor-set", set.to_str().unwrap(), "message", "demo.TimeInfo"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "interface TimeInfo {\n  seconds: string;  // String decimal\n  source: TimeSource;\n}\n"
    );
}

#[test]
fn route_json_reports_partition() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());

    let out = run(&[
        "route",
        ".demo.ClockApi.GetTime",
        "--json",
        "--descriptor-set",
        set.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["route"]["verb"], "GET");
    assert_eq!(json["route"]["template"], "/api/clock/{zone}");
    assert_eq!(json["path"], serde_json::json!(["zone"]));
    assert_eq!(json["query"], serde_json::json!(["precise"]));
}

#[test]
fn closure_lists_enums() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());

    let out = run(&[
        "--descriptor-set",
        set.to_str().unwrap(),
        "closure",
        "demo.GetTimeRequest",
        "demo.TimeInfo",
        "--enums",
    ]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), ".demo.TimeSource\n");
}

#[test]
fn unknown_symbol_fails_with_message() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());

    let out = run(&["--descriptor-set", set.to_str().unwrap(), "enum", "demo.Nope"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains(".demo.Nope"));
}

#[test]
fn all_writes_siblings_of_a_failed_method_and_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());
    let out_dir = tmp.path().join("docs");
    let config = tmp.path().join("protodoc.json");
    fs::write(
        &config,
        serde_json::json!({
            "descriptor_set": set,
            "output_dir": out_dir,
        })
        .to_string(),
    )
    .unwrap();

    let out = run(&["--config", config.to_str().unwrap(), "all"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains(".demo.ClockApi.Sync"), "{stderr}");

    let page = fs::read_to_string(out_dir.join("ClockApi/GetTime.txt")).unwrap();
    assert!(page.starts_with(
        "Current time in a zone.\n\nURI Template\n    GET /api/clock/{zone}\n"
    ));
    assert!(page.contains("interface TimeInfo {"));
    assert!(page.contains("enum TimeSource {"));
    assert!(!out_dir.join("ClockApi/Sync.txt").exists());
}

#[test]
fn service_respects_out_flag() {
    let tmp = TempDir::new().unwrap();
    let set = write_fixture(tmp.path());
    let out_dir = tmp.path().join("elsewhere");

    let out = run(&[
        "--descriptor-set",
        set.to_str().unwrap(),
        "service",
        "demo.ClockApi",
        "--out",
        out_dir.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(out_dir.join("ClockApi/GetTime.txt").exists());
}
