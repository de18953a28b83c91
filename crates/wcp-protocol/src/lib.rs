pub mod catalogue;
pub mod envelope;

pub use catalogue::{character_scoped, find, tool_catalogue, ToolAuth, ToolSpec, METADATA_MUTATION, READ_ONLY};
pub use envelope::{
    from_kernel_error, Request, Response, RpcError, ToolCallResult, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
