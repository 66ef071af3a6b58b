//! Admin API request bodies shaped like the ones a load-test harness posts.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use mockwire_proto::MARKET_DATA_DESCRIPTOR;

/// Full gRPC path of the countdown method.
pub const COUNTDOWN_METHOD: &str = "market_data.OTCMarketDataService/Countdown";

/// Descriptor id used by the countdown scenario.
pub const COUNTDOWN_ID: &str = "unary-countdown";

/// Base64 `FileDescriptorSet` for `market_data.proto`.
pub fn encoded_descriptor() -> String {
    STANDARD.encode(MARKET_DATA_DESCRIPTOR)
}

pub struct MethodDescriptionFixture;

impl MethodDescriptionFixture {
    /// `POST /methodDescription` body for the unary countdown method.
    pub fn countdown() -> Value {
        Self::unary(COUNTDOWN_ID, COUNTDOWN_METHOD)
    }

    pub fn unary(id: &str, method_name: &str) -> Value {
        let codecs = encoded_descriptor();
        json!({
            "id": id,
            "description": "k6 testing scope",
            "service": "market-data",
            "methodName": method_name,
            "connectionType": "UNARY",
            "proxyUrl": null,
            "requestClass": "PricesRequest",
            "responseClass": "PricesResponse",
            "requestCodecs": codecs,
            "responseCodecs": codecs,
        })
    }
}

pub struct StubFixture;

impl StubFixture {
    /// `POST /stub` body echoing the request's instrument fields `times` times.
    pub fn countdown(times: u32) -> Value {
        json!({
            "methodDescriptionId": COUNTDOWN_ID,
            "scope": "countdown",
            "name": "countdown stub",
            "times": times,
            "response": {
                "data": {
                    "instrument_id": "${req.instrument_id}",
                    "tracking_id": "${req.instrument_id_kind}",
                },
                "mode": "fill",
            },
            "requestPredicates": {},
            "state": null,
            "seed": null,
            "persist": null,
            "labels": [],
        })
    }
}
