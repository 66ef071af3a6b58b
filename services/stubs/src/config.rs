/// Stub server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StubsConfig {
    /// Interface both listeners bind to (default `0.0.0.0`). Env var: `STUBS_BIND_ADDR`.
    pub bind_addr: String,
    /// TCP port for the HTTP admin API (default 8228). Env var: `STUBS_HTTP_PORT`.
    pub http_port: u16,
    /// TCP port for the gRPC endpoint (default 9000). Env var: `STUBS_GRPC_PORT`.
    pub grpc_port: u16,
    /// Fallback log filter when `RUST_LOG` is unset (default `info`). Env var: `STUBS_LOG`.
    pub log_filter: String,
}

impl StubsConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("STUBS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_owned()),
            http_port: std::env::var("STUBS_HTTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8228),
            grpc_port: std::env::var("STUBS_GRPC_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9000),
            log_filter: std::env::var("STUBS_LOG").unwrap_or_else(|_| "info".to_owned()),
        }
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }

    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.grpc_port)
    }
}
