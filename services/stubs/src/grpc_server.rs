//! Catch-all gRPC endpoint. Every `/{service}/{method}` path lands here; the
//! message schema comes from the registered method description, so bodies pass
//! through tonic as raw bytes.

use std::convert::Infallible;

use bytes::{Buf, BufMut, Bytes};
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::{Body, BoxFuture, Context, Poll, Service, StdError, http};
use tonic::server::{Grpc, UnaryService};
use tonic::{Request, Response, Status};

use crate::domain::types::MethodRoute;
use crate::state::AppState;
use crate::usecase::dispatch::{DispatchInput, DispatchUseCase};

/// Pass-through codec: message bytes in, message bytes out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl Codec for RawCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = RawCodec;
    type Decoder = RawCodec;

    fn encoder(&mut self) -> Self::Encoder {
        RawCodec
    }

    fn decoder(&mut self) -> Self::Decoder {
        RawCodec
    }
}

impl Encoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let len = src.remaining();
        Ok(Some(src.copy_to_bytes(len)))
    }
}

struct UnaryCall {
    state: AppState,
    route: MethodRoute,
}

impl UnaryService<Bytes> for UnaryCall {
    type Response = Bytes;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let state = self.state.clone();
        let route = self.route.clone();
        Box::pin(async move {
            let uc = DispatchUseCase {
                methods: state.method_repo(),
                stubs: state.stub_repo(),
                states: state.state_repo(),
            };
            let payload = uc
                .execute(DispatchInput {
                    route,
                    payload: request.into_inner().to_vec(),
                })
                .await
                .map_err(Status::from)?;
            Ok(Response::new(Bytes::from(payload)))
        })
    }
}

/// Tower service answering any gRPC path from the stub stores.
#[derive(Clone)]
pub struct StubGrpcServer {
    pub state: AppState,
}

impl<B> Service<http::Request<B>> for StubGrpcServer
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let Some(route) = MethodRoute::from_path(req.uri().path()) else {
            let status = Status::unimplemented(format!("malformed gRPC path {}", req.uri().path()));
            return Box::pin(async move { Ok(status.into_http()) });
        };
        let call = UnaryCall {
            state: self.state.clone(),
            route,
        };
        Box::pin(async move {
            let mut grpc = Grpc::new(RawCodec);
            Ok(grpc.unary(call, req).await)
        })
    }
}
