//! Example: Decoding without a server
//!
//! Any `http::Request` whose body implements `std::io::Read` can be bound
//! directly. Path values come from a custom provider here, standing in for
//! whatever router produced them.
//!
//! Run with: cargo run --bin plain-decode

use reqbind::prelude::*;
use reqbind::BoxError;
use serde::Deserialize;

#[derive(Debug, Default)]
struct Sort {
    key: String,
    descending: bool,
}

#[derive(Debug, Default, Record)]
#[bind(text)]
struct SortParam(Sort);

impl TextDecode for SortParam {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
        let (key, dir) = text.split_once(',').unwrap_or((text, "asc"));
        self.0.descending = match dir {
            "asc" => false,
            "desc" => true,
            other => return Err(format!("unknown sort direction '{other}'").into()),
        };
        self.0.key = key.to_string();
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct Note {
    text: String,
}

#[derive(Debug, Default, Record)]
#[bind(rename_all = "camelCase")]
struct AnnotateOrder {
    #[bind(",path")]
    pub order_id: u64,
    pub sort: SortParam,
    #[bind(",spaceDelimited")]
    pub tag_names: Vec<String>,
    #[bind(",body")]
    pub note: Note,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let decoder = Decoder::builder()
        .path_value(|parts, name| match name {
            "orderId" => parts
                .uri
                .path()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        })
        .build();

    let request = http::Request::post("/orders/42?sort=created,desc&tagNames=gift%20rush")
        .header("content-type", "application/json")
        .body(&br#"{"text": "leave at the door"}"#[..])?;

    let mut annotate = AnnotateOrder::default();
    decoder.decode_request(request, &mut annotate)?;
    println!("{annotate:#?}");

    let bad = http::Request::get("/orders/42?sort=created,sideways").body(&b""[..])?;
    let mut annotate = AnnotateOrder::default();
    if let Err(err) = decoder.decode_request(bad, &mut annotate) {
        println!("rejected with {} ({}): {err}", err.status_code(), err.kind());
    }

    Ok(())
}
