// ==========================================
// SWIFT 代码登记系统 - API 请求/响应 DTO
// ==========================================
// JSON 字段名为对外契约（camelCase，国家代码为 countryISO2）
// ==========================================

use crate::domain::SwiftCodeRecord;
use serde::{Deserialize, Serialize};

// ==========================================
// CreateSwiftCodeRequest - 创建请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwiftCodeRequest {
    #[serde(default)]
    pub address: Option<String>,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    #[serde(rename = "isHeadquarter")]
    pub is_head_office: bool,
    pub swift_code: String,
}

// ==========================================
// SwiftCodeBranchResponse - 扁平记录（不嵌套分行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeBranchResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    #[serde(rename = "isHeadquarter")]
    pub is_head_office: bool,
    pub swift_code: String,
}

impl From<&SwiftCodeRecord> for SwiftCodeBranchResponse {
    fn from(record: &SwiftCodeRecord) -> Self {
        Self {
            address: record.address.clone(),
            bank_name: record.bank_name.clone(),
            country_iso2: record.country_iso2.clone(),
            country_name: record.country_name.clone(),
            is_head_office: record.is_head_office,
            swift_code: record.swift_code.clone(),
        }
    }
}

// ==========================================
// SwiftCodeResponse - 单条查询响应
// ==========================================
// 总行携带 branches（可能为空列表）；分行不输出该字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    #[serde(rename = "isHeadquarter")]
    pub is_head_office: bool,
    pub swift_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCodeBranchResponse>>,
}

impl SwiftCodeResponse {
    pub fn head_office(record: &SwiftCodeRecord, branches: &[SwiftCodeRecord]) -> Self {
        Self {
            branches: Some(branches.iter().map(SwiftCodeBranchResponse::from).collect()),
            ..Self::branch(record)
        }
    }

    pub fn branch(record: &SwiftCodeRecord) -> Self {
        Self {
            address: record.address.clone(),
            bank_name: record.bank_name.clone(),
            country_iso2: record.country_iso2.clone(),
            country_name: record.country_name.clone(),
            is_head_office: record.is_head_office,
            swift_code: record.swift_code.clone(),
            branches: None,
        }
    }
}

// ==========================================
// CountrySwiftCodesResponse - 按国家查询响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySwiftCodesResponse {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCodeBranchResponse>,
}

/// 写操作确认消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
