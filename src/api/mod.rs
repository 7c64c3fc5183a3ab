// ==========================================
// SWIFT 代码登记系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行入口调用
// ==========================================

pub mod dto;
pub mod error;
pub mod import_api;
pub mod swift_code_api;
pub mod validator;

// 重导出核心类型
pub use dto::{
    CountrySwiftCodesResponse, CreateSwiftCodeRequest, MessageResponse, SwiftCodeBranchResponse,
    SwiftCodeResponse,
};
pub use error::{map_api_error, ApiError, ApiResult, ErrorResponse};
pub use import_api::ImportApi;
pub use swift_code_api::SwiftCodeApi;
pub use validator::validate_create_request;
