use std::path::PathBuf;

use prost::Message;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/market_data.proto");

    let fds = protox::compile(["proto/market_data.proto"], ["proto/"])?;

    // Serialized descriptor set, posted as `requestCodecs`/`responseCodecs` in tests.
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(
        out_dir.join("market_data_descriptor.bin"),
        fds.encode_to_vec(),
    )?;

    tonic_prost_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_fds(fds)?;

    Ok(())
}
