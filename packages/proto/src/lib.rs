//! Protobuf definitions used to exercise the stub server end to end.

pub mod market_data {
    tonic::include_proto!("market_data");
}

/// Serialized `FileDescriptorSet` for `market_data.proto`.
pub const MARKET_DATA_DESCRIPTOR: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/market_data_descriptor.bin"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_set_contains_countdown_service() {
        let pool = prost_reflect::DescriptorPool::decode(MARKET_DATA_DESCRIPTOR).unwrap();
        let service = pool
            .get_service_by_name("market_data.OTCMarketDataService")
            .unwrap();
        assert!(service.methods().any(|m| m.name() == "Countdown"));
    }
}
