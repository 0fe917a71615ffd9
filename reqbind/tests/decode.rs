//! End-to-end decoding of requests into derived records.

use http::Request;
use reqbind::{
    BoxError, CoerceError, Decoder, Error, Origin, PathParams, Record, Style, TextDecode, decode,
};
use serde::Deserialize;

fn get(uri: &str) -> Request<&'static [u8]> {
    Request::get(uri).body(&b""[..]).unwrap()
}

fn post(uri: &str, body: &'static str) -> Request<&'static [u8]> {
    Request::post(uri).body(body.as_bytes()).unwrap()
}

// ============================================================================
// Query styles
// ============================================================================

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Client {
    id: i32,
}

#[derive(Debug, Default, Record)]
struct ListOrders {
    #[bind("filterType,query,implode")]
    pub filter_type: Vec<String>,
    #[bind("filterClientIds,query,pipeDelimited,implode")]
    pub filter_client_ids: Vec<i64>,
    #[bind("clientId,query")]
    pub client_id: i64,
    #[bind(",body,json")]
    pub client: Client,
}

#[test]
fn test_list_orders() {
    let mut req = ListOrders::default();
    decode(
        post(
            "/?filterType=pending,approved&clientId=4&filterClientIds=1|2|3",
            r#"{"id":1}"#,
        ),
        &mut req,
    )
    .unwrap();

    assert_eq!(req.filter_type, ["pending", "approved"]);
    assert_eq!(req.filter_client_ids, [1, 2, 3]);
    assert_eq!(req.client_id, 4);
    assert_eq!(req.client, Client { id: 1 });
}

#[test]
fn test_decoder_imploded_by_default() {
    #[derive(Default, Record)]
    struct Ids {
        pub ids: Vec<i32>,
    }

    let decoder = Decoder::builder().query_imploded().build();
    let mut req = Ids::default();
    decoder
        .decode_request(post("/?ids=1,2,3", ""), &mut req)
        .unwrap();
    assert_eq!(req.ids, [1, 2, 3]);
}

#[test]
fn test_exploded_and_default_agree() {
    #[derive(Default, Record)]
    struct Values {
        #[bind("value")]
        pub default: Vec<String>,
        #[bind("value,explode")]
        pub exploded: Vec<String>,
    }

    let mut req = Values::default();
    decode(get("/?value=a&value=b%2Cc&value="), &mut req).unwrap();
    assert_eq!(req.default, ["a", "b,c", ""]);
    assert_eq!(req.exploded, req.default);
}

#[test]
fn test_space_delimited() {
    #[derive(Default, Record)]
    struct Words {
        #[bind("q,spaceDelimited")]
        pub q: Vec<String>,
    }

    let mut req = Words::default();
    decode(get("/?q=red+green%20blue"), &mut req).unwrap();
    assert_eq!(req.q, ["red", "green", "blue"]);
}

#[test]
fn test_style_on_decoder() {
    #[derive(Default, Record)]
    struct Ids {
        pub ids: Vec<u16>,
    }

    let decoder = Decoder::builder()
        .query_style(Style::PipeDelimited)
        .query_imploded()
        .build();
    let mut req = Ids::default();
    decoder.decode_request(get("/?ids=4|5"), &mut req).unwrap();
    assert_eq!(req.ids, [4, 5]);
}

#[test]
fn test_present_but_empty() {
    #[derive(Default, Record)]
    struct Fields {
        pub fields: Vec<String>,
    }

    let mut req = Fields::default();
    decode(get("/?fields="), &mut req).unwrap();
    assert_eq!(req.fields, [""]);
}

#[test]
fn test_invalid_tag() {
    #[derive(Default, Record)]
    struct Bad {
        #[bind("value,expanded")]
        pub value: Vec<String>,
    }

    let err = decode(get("/"), &mut Bad::default()).unwrap_err();
    assert!(matches!(err, Error::Tag { ref field, .. } if field == "value"));
}

// ============================================================================
// Presence
// ============================================================================

#[test]
fn test_optional_absent_field_is_untouched() {
    #[derive(Default, Record)]
    struct Flag {
        #[bind("field")]
        pub field: bool,
        pub limit: Option<u32>,
        pub tags: Vec<String>,
    }

    let mut req = Flag {
        tags: vec!["kept".into()],
        ..Default::default()
    };
    decode(get("/"), &mut req).unwrap();
    assert!(!req.field);
    assert_eq!(req.limit, None);
    assert_eq!(req.tags, ["kept"]);
}

#[test]
fn test_required_missing() {
    #[derive(Default, Record)]
    struct Flag {
        #[bind("field,required")]
        pub field: bool,
    }

    let err = decode(get("/"), &mut Flag::default()).unwrap_err();
    assert_eq!(err.to_string(), "query param 'field' is required");
}

#[test]
fn test_required_present_but_empty_is_not_missing() {
    #[derive(Default, Record)]
    struct Name {
        #[bind("name,required")]
        pub name: String,
    }

    let mut req = Name {
        name: "old".into(),
    };
    decode(get("/?name="), &mut req).unwrap();
    assert_eq!(req.name, "");
}

#[test]
fn test_excluded_field() {
    #[derive(Default, Record)]
    struct Ignored {
        #[bind("-")]
        pub field: String,
    }

    let mut req = Ignored::default();
    decode(get("/?field=foobar&-=x"), &mut req).unwrap();
    assert_eq!(req.field, "");
}

#[test]
fn test_private_fields_are_skipped() {
    #[derive(Default, Record)]
    struct Mixed {
        pub public: String,
        private: String,
    }

    let mut req = Mixed::default();
    decode(get("/?public=a&private=b"), &mut req).unwrap();
    assert_eq!(req.public, "a");
    assert_eq!(req.private, "");
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_field_names_are_case_insensitive() {
    #[derive(Default, Record)]
    struct Names {
        pub fieldone: String,
        #[bind(",required")]
        pub fieldtwo: String,
        pub fieldthree: Vec<String>,
    }

    let mut req = Names::default();
    decode(
        get("/?fIeLdOnE=foo&fieldTwo=bar&fieldthree=fuzz&FIELDTHREE=bazz"),
        &mut req,
    )
    .unwrap();

    assert_eq!(req.fieldone, "foo");
    assert_eq!(req.fieldtwo, "bar");
    req.fieldthree.sort();
    assert_eq!(req.fieldthree, ["bazz", "fuzz"]);
}

#[test]
fn test_rename_all() {
    #[derive(Default, Record)]
    #[bind(rename_all = "camelCase")]
    struct Renamed {
        pub client_id: u32,
        #[bind(",pipeDelimited")]
        pub filter_client_ids: Vec<u32>,
        #[bind("explicit_name")]
        pub other: String,
    }

    let mut req = Renamed::default();
    decode(
        get("/?clientId=1&filterClientIds=2|3&explicit_name=x"),
        &mut req,
    )
    .unwrap();
    assert_eq!(req.client_id, 1);
    assert_eq!(req.filter_client_ids, [2, 3]);
    assert_eq!(req.other, "x");
}

#[test]
fn test_raw_identifier() {
    #[derive(Default, Record)]
    struct Raw {
        pub r#type: String,
    }

    let mut req = Raw::default();
    decode(get("/?type=pdf"), &mut req).unwrap();
    assert_eq!(req.r#type, "pdf");
}

// ============================================================================
// Nested records
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Sort {
    name: String,
    asc: bool,
}

impl TextDecode for Sort {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        let words: Vec<&str> = text.split(',').collect();
        if words.len() > 2 {
            return Err(format!("incorrectly formatted sort: {text}").into());
        }
        self.name = words[0].to_string();
        self.asc = words.len() == 1 || words[1].eq_ignore_ascii_case("asc");
        Ok(())
    }
}

#[derive(Default, Record)]
#[bind(text)]
struct SortParam(Sort);

impl TextDecode for SortParam {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        self.0.decode_text(text)
    }
}

#[derive(Default, Record)]
struct Range {
    #[bind("rangeStart")]
    pub start: i64,
    #[bind("rangeEnd")]
    pub end: i64,
}

#[derive(Default, Record)]
struct Listing {
    pub sort: SortParam,
    pub range: Range,
}

#[test]
fn test_text_decode_field() {
    let mut req = Listing::default();
    decode(get("/?sort=name"), &mut req).unwrap();
    assert_eq!(
        req.sort.0,
        Sort {
            name: "name".into(),
            asc: true
        }
    );
}

#[test]
fn test_text_decode_error_names_param() {
    let err = decode(get("/?sort=a,b,c"), &mut Listing::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "query param 'sort': incorrectly formatted sort: a,b,c"
    );
}

#[test]
fn test_nested_records_are_flattened() {
    let mut req = Listing::default();
    decode(get("/?rangeStart=-3&rangeEnd=7&sort=name,desc"), &mut req).unwrap();
    assert_eq!(req.range.start, -3);
    assert_eq!(req.range.end, 7);
    assert_eq!(req.sort.0.name, "name");
    assert!(!req.sort.0.asc);
}

#[derive(Debug, Default, PartialEq, Record)]
struct Filter {
    #[bind("find")]
    pub search: String,
    pub gt: u8,
}

#[test]
fn test_deep_object() {
    #[derive(Default, Record)]
    struct Search {
        #[bind(",deepObject")]
        pub filter: Filter,
    }

    let mut req = Search::default();
    decode(get("/?filter%5Bfind%5D=pen&filter[gt]=3"), &mut req).unwrap();
    assert_eq!(
        req.filter,
        Filter {
            search: "pen".into(),
            gt: 3
        }
    );
}

#[test]
fn test_deep_object_errors_name_full_key() {
    #[derive(Default, Record)]
    struct Search {
        #[bind(",deepObject")]
        pub filter: Filter,
    }

    let err = decode(get("/?filter[gt]=300"), &mut Search::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Coerce { origin: Origin::Query, ref name, .. } if name == "filter[gt]"
    ));
}

#[test]
fn test_optional_deep_object() {
    #[derive(Default, Record)]
    struct Search {
        #[bind("filter,deepObject")]
        pub filter: Option<Filter>,
    }

    let mut req = Search::default();
    decode(get("/?other=1"), &mut req).unwrap();
    assert_eq!(req.filter, None);

    decode(get("/?filter[find]=x"), &mut req).unwrap();
    assert_eq!(
        req.filter,
        Some(Filter {
            search: "x".into(),
            gt: 0
        })
    );
}

#[test]
fn test_required_deep_object() {
    #[derive(Default, Record)]
    struct Search {
        #[bind("filter,deepObject,required")]
        pub filter: Filter,
    }

    let err = decode(get("/?find=x"), &mut Search::default()).unwrap_err();
    assert!(matches!(err, Error::Required { ref name } if name == "filter"));
}

#[test]
fn test_nested_deep_objects() {
    #[derive(Default, Record)]
    struct Bounds {
        pub min: i32,
        pub max: i32,
    }

    #[derive(Default, Record)]
    struct Outer {
        #[bind("range,deepObject")]
        pub range: Bounds,
    }

    #[derive(Default, Record)]
    struct Search {
        #[bind("filter,deepObject")]
        pub filter: Outer,
    }

    let mut req = Search::default();
    decode(get("/?filter[range][min]=1&filter[range][max]=9"), &mut req).unwrap();
    assert_eq!(req.filter.range.min, 1);
    assert_eq!(req.filter.range.max, 9);
}

// ============================================================================
// Path, body, header
// ============================================================================

#[test]
fn test_path_values() {
    #[derive(Default, Record)]
    struct ById {
        #[bind("id,path")]
        pub client_id: i64,
    }

    let decoder = Decoder::default();
    for id in [0i64, -1, 42, i64::MAX] {
        let mut req = get("/");
        req.extensions_mut()
            .insert(PathParams::from_iter([("id", id.to_string())]));
        let mut target = ById::default();
        decoder.decode_request(req, &mut target).unwrap();
        assert_eq!(target.client_id, id);
    }
}

#[test]
fn test_json_body() {
    #[derive(Debug, Default, Deserialize)]
    struct Body {
        id: i32,
    }

    #[derive(Default, Record)]
    struct WithBody {
        #[bind(",body,json")]
        pub body: Body,
    }

    let mut req = WithBody::default();
    decode(post("/", r#"{"id":9}"#), &mut req).unwrap();
    assert_eq!(req.body.id, 9);
}

#[test]
fn test_xml_body() {
    #[derive(Debug, Default, Deserialize)]
    struct Body {
        #[serde(rename = "Id")]
        id: i32,
    }

    #[derive(Default, Record)]
    struct WithBody {
        #[bind(",body,xml")]
        pub body: Body,
    }

    let mut req = WithBody::default();
    decode(post("/", "<Body><Id>1</Id></Body>"), &mut req).unwrap();
    assert_eq!(req.body.id, 1);
}

#[test]
fn test_body_format_from_content_type() {
    #[derive(Debug, Default, Deserialize)]
    struct Body {
        #[serde(rename = "Id")]
        id: i32,
    }

    #[derive(Default, Record)]
    struct WithBody {
        #[bind(",body")]
        pub body: Body,
    }

    let req = Request::post("/")
        .header("content-type", "application/xml; charset=utf-8")
        .body(&b"<Body><Id>5</Id></Body>"[..])
        .unwrap();
    let mut target = WithBody::default();
    decode(req, &mut target).unwrap();
    assert_eq!(target.body.id, 5);
}

#[test]
fn test_invalid_json_body() {
    #[derive(Default, Record)]
    struct WithBody {
        #[bind(",body")]
        pub body: Client,
    }

    let err = decode(post("/", "{"), &mut WithBody::default()).unwrap_err();
    assert!(matches!(err, Error::Body { .. }));
    assert!(err.is_client_error());
}

#[test]
fn test_header_is_not_implemented() {
    #[derive(Default, Record)]
    struct WithHeader {
        #[bind("x-request-id,header")]
        pub request_id: String,
    }

    let err = decode(get("/"), &mut WithHeader::default()).unwrap_err();
    assert!(matches!(err, Error::NotImplemented { .. }));
}

#[test]
fn test_header_record_is_not_flattened() {
    #[derive(Default, Record)]
    struct Meta {
        pub trace: String,
    }

    #[derive(Default, Record)]
    struct WithMeta {
        #[bind("x-meta,header")]
        pub meta: Meta,
    }

    let mut req = WithMeta::default();
    let err = decode(get("/?trace=abc"), &mut req).unwrap_err();
    assert!(matches!(err, Error::NotImplemented { ref name } if name == "x-meta"));
    assert_eq!(req.meta.trace, "");
}

#[test]
fn test_path_record_is_unsupported() {
    #[derive(Default, Record)]
    struct Key {
        pub id: String,
    }

    #[derive(Default, Record)]
    struct ByKey {
        #[bind("key,path")]
        pub key: Key,
    }

    let mut req = ByKey::default();
    let mut request = get("/?id=abc");
    request
        .extensions_mut()
        .insert(PathParams::from_iter([("key", "k1")]));
    let err = decode(request, &mut req).unwrap_err();
    assert!(matches!(
        err,
        Error::Coerce {
            origin: Origin::Path,
            source: CoerceError::Unsupported("record"),
            ..
        }
    ));
    assert_eq!(req.key.id, "");
}

#[test]
fn test_unknown_declared_body_format() {
    #[derive(Default, Record)]
    struct WithYaml {
        #[bind("p,body,yaml")]
        pub payload: Client,
    }

    let err = decode(post("/", "id: 1"), &mut WithYaml::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedBodyFormat(ref format) if format == "yaml"));
}

// ============================================================================
// Usage and fail-fast
// ============================================================================

#[test]
fn test_non_record_target() {
    let mut n = 5i32;
    assert!(matches!(decode(get("/?x=1"), &mut n), Err(Error::Usage(_))));

    let mut v: Vec<String> = Vec::new();
    assert!(matches!(decode(get("/?x=1"), &mut v), Err(Error::Usage(_))));
}

#[test]
fn test_deep_object_on_scalar_is_unsupported() {
    #[derive(Default, Record)]
    struct DeepScalar {
        #[bind("n,deepObject")]
        pub n: i32,
    }

    let mut req = DeepScalar::default();
    let err = decode(get("/?n[a]=1"), &mut req).unwrap_err();
    assert!(matches!(
        err,
        Error::Coerce {
            origin: Origin::Query,
            ref name,
            source: CoerceError::Unsupported("i32"),
        } if name == "n"
    ));
    assert_eq!(err.to_string(), "query param 'n': unsupported target shape: i32");
}

#[test]
fn test_optional_record_without_deep_style_is_unsupported() {
    #[derive(Default, Record)]
    struct Inner {
        pub value: i32,
    }

    #[derive(Default, Record)]
    struct Outer {
        pub inner: Option<Inner>,
    }

    let mut req = Outer::default();
    let err = decode(get("/?inner=5"), &mut req).unwrap_err();
    assert!(matches!(
        err,
        Error::Coerce {
            source: CoerceError::Unsupported("record"),
            ..
        }
    ));
}

#[test]
fn test_fail_fast_keeps_earlier_fields() {
    #[derive(Default, Record)]
    struct Pair {
        pub first: u8,
        pub second: u8,
        pub third: u8,
    }

    let mut req = Pair::default();
    let err = decode(get("/?first=1&second=x&third=3"), &mut req).unwrap_err();
    assert!(matches!(err, Error::Coerce { ref name, .. } if name == "second"));
    assert_eq!(req.first, 1);
    assert_eq!(req.third, 0);
}

#[test]
fn test_decoder_shared_across_threads() {
    #[derive(Default, Record)]
    struct Id {
        pub id: u32,
    }

    let decoder = Decoder::default();
    std::thread::scope(|s| {
        for n in 0..4u32 {
            let decoder = &decoder;
            s.spawn(move || {
                let mut target = Id::default();
                decoder
                    .decode_request(get(&format!("/?id={n}")), &mut target)
                    .unwrap();
                assert_eq!(target.id, n);
            });
        }
    });
}
