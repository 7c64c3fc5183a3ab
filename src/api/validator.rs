// ==========================================
// SWIFT 代码登记系统 - 请求校验器
// ==========================================
// 职责: 创建请求的字段格式校验（进入服务前）
// 后缀与 isHeadquarter 的一致性由 SwiftCodeApi 判断
// ==========================================

use crate::api::dto::CreateSwiftCodeRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::{is_valid_swift_code, SWIFT_CODE_LEN};

/// 校验创建请求
///
/// # 规则
/// - swiftCode: 11 位，^[A-Z]{6}[A-Z0-9]{2}[A-Z0-9]{3}$
/// - countryISO2: 2 位字母（大小写均可，入库前统一转大写）
/// - bankName / countryName: 非空
///
/// # 返回
/// - Err(ApiError::ValidationError): 所有违规项以 "; " 拼接
pub fn validate_create_request(request: &CreateSwiftCodeRequest) -> ApiResult<()> {
    let mut problems = Vec::new();

    let code = request.swift_code.trim();
    if code.len() != SWIFT_CODE_LEN {
        problems.push(format!(
            "swiftCode 长度必须为 {} 位: {}",
            SWIFT_CODE_LEN, code
        ));
    } else if !is_valid_swift_code(code) {
        problems.push(format!("swiftCode 格式错误: {}", code));
    }

    let iso2 = request.country_iso2.trim();
    if iso2.len() != 2 || !iso2.chars().all(|c| c.is_ascii_alphabetic()) {
        problems.push(format!("countryISO2 必须为 2 位字母: {}", iso2));
    }

    if request.bank_name.trim().is_empty() {
        problems.push("bankName 不能为空".to_string());
    }
    if request.country_name.trim().is_empty() {
        problems.push("countryName 不能为空".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateSwiftCodeRequest {
        CreateSwiftCodeRequest {
            address: None,
            bank_name: "test bank".to_string(),
            country_iso2: "pl".to_string(),
            country_name: "poland".to_string(),
            is_head_office: true,
            swift_code: "ABCDPLPWXXX".to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_create_request(&request()).is_ok());
    }

    #[test]
    fn test_collects_all_problems() {
        let mut req = request();
        req.swift_code = "ABC".to_string();
        req.country_iso2 = "P1".to_string();
        req.bank_name = "  ".to_string();

        match validate_create_request(&req) {
            Err(ApiError::ValidationError(msg)) => {
                assert!(msg.contains("swiftCode"));
                assert!(msg.contains("countryISO2"));
                assert!(msg.contains("bankName"));
                assert!(!msg.contains("countryName"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_lowercase_code_is_rejected() {
        let mut req = request();
        req.swift_code = "abcdplpwxxx".to_string();
        assert!(validate_create_request(&req).is_err());
    }
}
