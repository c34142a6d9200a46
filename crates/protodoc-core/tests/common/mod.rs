//! Fixture schema shaped like the Mission Database API.
//!
//! Declaration order matters: the comment locations below address nodes by
//! index.

#![allow(dead_code)]

use prost::Message as _;
use protodoc_core::descriptor::{
    http_route, http_rule, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FieldLabel, FieldType, FileDescriptorProto, FileDescriptorSet,
    HttpRoute, HttpRule, Location, MessageOptions, MethodDescriptorProto, MethodOptions,
    ServiceDescriptorProto, SourceCodeInfo,
};
use protodoc_core::index::to_json_name;

pub const PKG: &str = ".yamcs.protobuf.mdb";

pub fn sym(local: &str) -> String {
    format!("{PKG}.{local}")
}

pub fn field(name: &str, number: i32, ty: FieldType) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(FieldLabel::Optional as i32),
        r#type: Some(ty as i32),
        type_name: None,
        json_name: Some(to_json_name(name)),
    }
}

pub fn typed(name: &str, number: i32, ty: FieldType, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..field(name, number, ty)
    }
}

pub fn repeated(mut f: FieldDescriptorProto) -> FieldDescriptorProto {
    f.label = Some(FieldLabel::Repeated as i32);
    f
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

pub fn map_entry(
    name: &str,
    key: FieldDescriptorProto,
    value: FieldDescriptorProto,
) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
        }),
        ..message(name, vec![key, value])
    }
}

pub fn enumeration(name: &str, values: &[&str]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .enumerate()
            .map(|(i, v)| EnumValueDescriptorProto {
                name: Some(v.to_string()),
                number: Some(i as i32),
            })
            .collect(),
    }
}

pub fn method(
    name: &str,
    input: &str,
    output: &str,
    route: Option<HttpRoute>,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(sym(input)),
        output_type: Some(sym(output)),
        options: route.map(|r| MethodOptions {
            deprecated: None,
            route: Some(r),
            http: None,
        }),
        client_streaming: None,
        server_streaming: None,
    }
}

pub fn route(pattern: http_route::Pattern, body: Option<&str>) -> HttpRoute {
    HttpRoute {
        pattern: Some(pattern),
        body: body.map(str::to_string),
    }
}

fn comment(path: &[i32], text: &str) -> Location {
    Location {
        path: path.to_vec(),
        leading_comments: Some(text.to_string()),
        trailing_comments: None,
    }
}

pub fn mdb_file() -> FileDescriptorProto {
    use FieldType::{Bool, Bytes, Enum, Int32, Int64, Message, String as Str, Uint64};

    let mut parameter_info = message(
        "ParameterInfo",
        vec![
            field("name", 1, Str),
            field("qualified_name", 2, Str),
            typed("type", 3, Message, &sym("ParameterTypeInfo")),
            typed("data_source", 4, Enum, &sym("DataSourceType")),
            repeated(typed("aliases", 5, Message, &sym("ParameterInfo.AliasesEntry"))),
            field("raw_value", 6, Bytes),
            typed("generation_time", 7, Message, ".google.protobuf.Timestamp"),
            field("count", 8, Int64),
            repeated(field("flags", 9, Uint64)),
            repeated(typed("ancillary", 10, Message, &sym("ParameterInfo.AncillaryEntry"))),
        ],
    );
    parameter_info.nested_type = vec![
        map_entry("AliasesEntry", field("key", 1, Str), field("value", 2, Str)),
        map_entry(
            "AncillaryEntry",
            field("key", 1, Str),
            typed("value", 2, Message, &sym("AncillaryData")),
        ),
    ];

    let mut filter = message(
        "Filter",
        vec![
            field("expression", 1, Str),
            typed("severity", 2, Enum, &sym("Filter.Severity")),
        ],
    );
    filter.enum_type = vec![enumeration("Severity", &["INFO", "WARNING", "CRITICAL"])];

    let mut update = message(
        "UpdateParameterRequest",
        vec![
            field("instance", 1, Str),
            field("name", 2, Str),
            field("value", 3, Str),
            typed("action", 4, Enum, &sym("UpdateParameterRequest.ActionType")),
        ],
    );
    update.enum_type = vec![enumeration("ActionType", &["SET_DEFAULT", "RESET"])];

    let messages = vec![
        parameter_info,
        message(
            "ParameterTypeInfo",
            vec![
                field("eng_type", 1, Str),
                repeated(typed("unit_set", 2, Message, &sym("UnitInfo"))),
            ],
        ),
        message("UnitInfo", vec![field("unit", 1, Str)]),
        message(
            "AncillaryData",
            vec![field("value", 1, Str), field("mimetype", 2, Str)],
        ),
        message(
            "ListParametersRequest",
            vec![
                field("instance", 1, Str),
                field("limit", 2, Int32),
                field("next", 3, Str),
                field("details", 4, Bool),
            ],
        ),
        message(
            "ListParametersResponse",
            vec![
                repeated(typed("parameters", 1, Message, &sym("ParameterInfo"))),
                field("continuation_token", 2, Str),
            ],
        ),
        message(
            "GetParameterRequest",
            vec![field("instance", 1, Str), field("name", 2, Str)],
        ),
        message(
            "SetFilterRequest",
            vec![
                field("instance", 1, Str),
                typed("filter", 2, Message, &sym("Filter")),
            ],
        ),
        filter,
        update,
        message(
            "SubscribeParametersRequest",
            vec![field("instance", 1, Str), repeated(field("ids", 2, Str))],
        ),
        message("Empty", vec![]),
    ];

    let mut subscribe = method(
        "SubscribeParameters",
        "SubscribeParametersRequest",
        "ParameterInfo",
        None,
    );
    subscribe.server_streaming = Some(true);

    let mut delete = method("DeleteParameter", "GetParameterRequest", "Empty", None);
    delete.options = Some(MethodOptions {
        deprecated: Some(true),
        route: None,
        http: Some(HttpRule {
            pattern: Some(http_rule::Pattern::Delete(
                "/api/mdb/{instance}/parameters/{name*}".to_string(),
            )),
            body: None,
        }),
    });

    let service = ServiceDescriptorProto {
        name: Some("MdbApi".to_string()),
        method: vec![
            method(
                "ListParameters",
                "ListParametersRequest",
                "ListParametersResponse",
                Some(route(
                    http_route::Pattern::Get("/api/mdb/{instance}/parameters".into()),
                    None,
                )),
            ),
            method(
                "GetParameter",
                "GetParameterRequest",
                "ParameterInfo",
                Some(route(
                    http_route::Pattern::Get("/api/mdb/{instance}/parameters/{name*}".into()),
                    None,
                )),
            ),
            method(
                "SetFilter",
                "SetFilterRequest",
                "Empty",
                Some(route(
                    http_route::Pattern::Post("/api/mdb/{instance}/filter".into()),
                    Some("filter"),
                )),
            ),
            method(
                "UpdateParameter",
                "UpdateParameterRequest",
                "ParameterInfo",
                Some(route(
                    http_route::Pattern::Patch("/api/mdb/{instance}/parameters/{name*}".into()),
                    Some("*"),
                )),
            ),
            subscribe,
            delete,
        ],
    };

    FileDescriptorProto {
        name: Some("yamcs/protobuf/mdb/mdb.proto".to_string()),
        package: Some("yamcs.protobuf.mdb".to_string()),
        message_type: messages,
        enum_type: vec![enumeration(
            "DataSourceType",
            &["TELEMETERED", "DERIVED", "CONSTANT"],
        )],
        service: vec![service],
        extension: vec![],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                comment(&[12], " Syntax.\n"),
                comment(&[6, 0], " Methods related to the Mission Database.\n"),
                comment(&[6, 0, 2, 0], " List parameters.\n"),
                comment(&[6, 0, 2, 1], " Get a single parameter.\n"),
                comment(&[4, 0], " Info about a parameter.\n"),
                comment(&[4, 0, 2, 1], " Qualified name.\n"),
                comment(&[4, 4, 2, 0], " Yamcs instance name.\n"),
                comment(
                    &[4, 4, 2, 1],
                    " The maximum number of returned records per page.\n",
                ),
                comment(&[4, 6, 2, 1], " Fully-qualified parameter name.\n"),
                comment(&[5, 0, 2, 1], " Derived by an algorithm.\n"),
                comment(&[4, 8, 4, 0, 2, 2], " Critical severity.\n"),
                comment(&[5, 0, 2, 0, 9], " Tag 9 does not exist on enum values.\n"),
            ],
        }),
        syntax: Some("proto3".to_string()),
    }
}

pub fn fixture_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![mdb_file()],
    }
}

pub fn fixture_bytes() -> Vec<u8> {
    fixture_set().encode_to_vec()
}
