//! gRPC client helpers for calling the stub server in tests.

use std::net::SocketAddr;

use mockwire_proto::market_data::PricesRequest;
use mockwire_proto::market_data::otc_market_data_service_client::OtcMarketDataServiceClient;
use tonic::transport::Channel;

pub type MarketDataClient = OtcMarketDataServiceClient<Channel>;

/// Connect a plaintext client to a stub server's gRPC listener.
///
/// Panics if the connection cannot be established.
pub async fn connect(addr: SocketAddr) -> MarketDataClient {
    OtcMarketDataServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap_or_else(|e| panic!("failed to connect to stub gRPC endpoint at {addr}: {e}"))
}

pub fn prices_request(instrument_id: &str, instrument_id_kind: &str) -> PricesRequest {
    PricesRequest {
        instrument_id: instrument_id.to_owned(),
        instrument_id_kind: instrument_id_kind.to_owned(),
        ..Default::default()
    }
}
