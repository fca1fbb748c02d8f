//! Mapping of gateway errors onto gRPC status codes.

use durable_gateway_core::GatewayError;
use tonic::Status;

/// Convert a gateway error into the status returned to the caller.
pub fn to_status(err: &GatewayError) -> Status {
    let message = err.to_string();
    match err {
        GatewayError::InvalidArgument(_) => Status::invalid_argument(message),
        GatewayError::Resolution(_) => Status::failed_precondition(message),
        GatewayError::Unavailable(_) => Status::unavailable(message),
        GatewayError::NotFound(_) => Status::not_found(message),
        GatewayError::Internal(_) => Status::internal(message),
    }
}
