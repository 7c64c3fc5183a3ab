// ==========================================
// SWIFT 代码登记系统 - SWIFT 代码 API
// ==========================================
// 职责: 单条查询、按国家查询、创建（自动关联/收养孤儿分行）、删除
// 每个操作在存储的一个事务内完成
// 规则:
// - 总行代码以 "XXX" 结尾，分行不得以 "XXX" 结尾
// - 删除总行由存储级联删除其分行
// ==========================================

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::api::dto::{
    CountrySwiftCodesResponse, CreateSwiftCodeRequest, MessageResponse,
    SwiftCodeBranchResponse, SwiftCodeResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_create_request;
use crate::domain::{is_head_office_code, SwiftCodeRecord};
use crate::repository::{SwiftCodeStore, TransactionalStore};

// ==========================================
// SwiftCodeApi
// ==========================================
pub struct SwiftCodeApi<S: TransactionalStore> {
    store: Arc<S>,
}

impl<S: TransactionalStore> SwiftCodeApi<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 按代码查询
    ///
    /// # 返回
    /// - 总行: 附带当前全部分行（扁平，不再嵌套）
    /// - 分行: 不含 branches 字段
    /// - Err(ApiError::NotFound): 代码不存在
    pub fn get_swift_code(&self, swift_code: &str) -> ApiResult<SwiftCodeResponse> {
        let code = swift_code.trim();
        self.store.transaction(|store| -> ApiResult<SwiftCodeResponse> {
            let record = store
                .find_by_code(code)?
                .ok_or_else(|| ApiError::NotFound(format!("SWIFT code {} not found", code)))?;

            if record.is_head_office {
                let branches = store.find_branches(&record.swift_code)?;
                Ok(SwiftCodeResponse::head_office(&record, &branches))
            } else {
                Ok(SwiftCodeResponse::branch(&record))
            }
        })
    }

    /// 按国家代码查询（代码统一转大写）
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 该国家无任何记录
    pub fn get_country_swift_codes(&self, country_iso2: &str) -> ApiResult<CountrySwiftCodesResponse> {
        let iso2 = country_iso2.trim().to_uppercase();
        let records = self.store.find_by_country(&iso2)?;

        let first = records.first().ok_or_else(|| {
            ApiError::NotFound(format!("No SWIFT codes found for country {}", iso2))
        })?;

        Ok(CountrySwiftCodesResponse {
            country_iso2: iso2,
            country_name: first.country_name.clone(),
            swift_codes: records.iter().map(SwiftCodeBranchResponse::from).collect(),
        })
    }

    /// 创建 SWIFT 代码
    ///
    /// # 流程
    /// 1. 请求格式校验
    /// 2. 代码已存在 → Conflict
    /// 3. 后缀与 isHeadquarter 不一致 → InvalidFormat
    /// 4. 分行: 查找 前缀 + "XXX" 总行并关联
    ///    总行: 写入后收养前缀相同的孤儿分行
    #[instrument(skip(self, request), fields(swift_code = %request.swift_code))]
    pub fn create_swift_code(&self, request: &CreateSwiftCodeRequest) -> ApiResult<MessageResponse> {
        validate_create_request(request)?;
        let mut record = Self::to_record(request);

        let adopted = self.store.transaction(|store| -> ApiResult<usize> {
            if store.exists_by_code(&record.swift_code)? {
                return Err(ApiError::Conflict(format!(
                    "SWIFT code {} already exists",
                    record.swift_code
                )));
            }

            let suffix_is_head_office = is_head_office_code(&record.swift_code);
            if request.is_head_office != suffix_is_head_office {
                return Err(ApiError::InvalidFormat(if request.is_head_office {
                    format!(
                        "Head office SWIFT code {} must end with XXX",
                        record.swift_code
                    )
                } else {
                    format!(
                        "Branch SWIFT code {} must not end with XXX",
                        record.swift_code
                    )
                }));
            }

            if record.is_head_office {
                store.save(&record)?;
                Self::adopt_orphans(store, &record)
            } else {
                Self::link_to_head_office(store, &mut record)?;
                store.save(&record)?;
                Ok(0)
            }
        })?;

        info!(
            swift_code = %record.swift_code,
            head_office = record.head_office_code.as_deref().unwrap_or("-"),
            adopted_orphans = adopted,
            "SWIFT 代码已创建"
        );
        Ok(MessageResponse::new(format!(
            "Successfully created new SWIFT code: {}",
            record.swift_code
        )))
    }

    /// 删除 SWIFT 代码
    ///
    /// - 分行: 先从总行解除关联再删除
    /// - 总行: 分行由存储级联删除
    #[instrument(skip(self))]
    pub fn delete_swift_code(&self, swift_code: &str) -> ApiResult<MessageResponse> {
        let code = swift_code.trim();

        let removed = self.store.transaction(|store| -> ApiResult<usize> {
            let mut record = store
                .find_by_code(code)?
                .ok_or_else(|| ApiError::NotFound(format!("SWIFT code {} not found", code)))?;

            if let Some(head) = record.head_office_code.take() {
                debug!(branch = %record.swift_code, head_office = %head, "解除分行关联");
                store.save(&record)?;
            }

            Ok(store.delete(&record)?)
        })?;

        info!(swift_code = %code, removed = removed, "SWIFT 代码已删除");
        Ok(MessageResponse::new(format!(
            "Successfully deleted SWIFT code: {}",
            code
        )))
    }

    /// 请求 → 领域记录（国家代码、国家名称、银行名称转大写）
    fn to_record(request: &CreateSwiftCodeRequest) -> SwiftCodeRecord {
        SwiftCodeRecord::new(
            request.swift_code.trim(),
            request.bank_name.trim().to_uppercase(),
            request.address.as_deref().unwrap_or("").trim(),
            request.country_iso2.trim().to_uppercase(),
            request.country_name.trim().to_uppercase(),
        )
    }

    fn link_to_head_office(
        store: &dyn SwiftCodeStore,
        record: &mut SwiftCodeRecord,
    ) -> ApiResult<()> {
        let Some(head_code) = record.candidate_head_office_code() else {
            return Ok(());
        };

        match store.find_by_code(&head_code)? {
            Some(head) if record.belongs_to(&head) => {
                debug!(branch = %record.swift_code, head_office = %head_code, "关联总行");
                record.head_office_code = Some(head.swift_code);
            }
            _ => debug!(branch = %record.swift_code, "总行不存在，作为孤儿分行写入"),
        }
        Ok(())
    }

    fn adopt_orphans(store: &dyn SwiftCodeStore, head: &SwiftCodeRecord) -> ApiResult<usize> {
        let Some(prefix) = head.prefix() else {
            return Ok(0);
        };

        let mut adopted = 0;
        for mut orphan in store.find_orphan_branches(prefix)? {
            if !orphan.belongs_to(head) {
                continue;
            }
            debug!(branch = %orphan.swift_code, head_office = %head.swift_code, "收养孤儿分行");
            orphan.head_office_code = Some(head.swift_code.clone());
            orphan.updated_at = head.updated_at;
            store.save(&orphan)?;
            adopted += 1;
        }
        Ok(adopted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySwiftCodeStore;

    fn api() -> SwiftCodeApi<InMemorySwiftCodeStore> {
        SwiftCodeApi::new(Arc::new(InMemorySwiftCodeStore::new()))
    }

    fn request(code: &str, is_head_office: bool) -> CreateSwiftCodeRequest {
        CreateSwiftCodeRequest {
            address: Some("ul. Prosta 1".to_string()),
            bank_name: "test bank".to_string(),
            country_iso2: "pl".to_string(),
            country_name: "poland".to_string(),
            is_head_office,
            swift_code: code.to_string(),
        }
    }

    #[test]
    fn test_create_branch_links_to_existing_head_office() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();
        api.create_swift_code(&request("ABCDPLPW123", false)).unwrap();

        let head = api.get_swift_code("ABCDPLPWXXX").unwrap();
        let branches = head.branches.unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].swift_code, "ABCDPLPW123");
        assert_eq!(head.bank_name, "TEST BANK");
        assert_eq!(head.country_iso2, "PL");
    }

    #[test]
    fn test_head_office_adopts_orphan_branch() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPW456", false)).unwrap();
        assert!(api.get_swift_code("ABCDPLPW456").unwrap().branches.is_none());

        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();

        let head = api.get_swift_code("ABCDPLPWXXX").unwrap();
        assert_eq!(head.branches.unwrap()[0].swift_code, "ABCDPLPW456");
    }

    #[test]
    fn test_create_existing_code_is_conflict() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();

        let result = api.create_swift_code(&request("ABCDPLPWXXX", true));
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn test_suffix_must_match_flag() {
        let api = api();
        let result = api.create_swift_code(&request("ABCDPLPWXXX", false));
        assert!(matches!(result, Err(ApiError::InvalidFormat(_))));

        let result = api.create_swift_code(&request("ABCDPLPW123", true));
        assert!(matches!(result, Err(ApiError::InvalidFormat(_))));
        assert!(matches!(
            api.get_swift_code("ABCDPLPW123"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_branch_unlinks_from_head_office() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();
        api.create_swift_code(&request("ABCDPLPW123", false)).unwrap();

        let message = api.delete_swift_code("ABCDPLPW123").unwrap();
        assert_eq!(message.message, "Successfully deleted SWIFT code: ABCDPLPW123");

        let head = api.get_swift_code("ABCDPLPWXXX").unwrap();
        assert!(head.branches.unwrap().is_empty());
    }

    #[test]
    fn test_delete_head_office_cascades() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();
        api.create_swift_code(&request("ABCDPLPW123", false)).unwrap();

        api.delete_swift_code("ABCDPLPWXXX").unwrap();

        assert!(matches!(
            api.get_swift_code("ABCDPLPW123"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.delete_swift_code("ABCDPLPWXXX"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_country_lookup_is_case_insensitive() {
        let api = api();
        api.create_swift_code(&request("ABCDPLPWXXX", true)).unwrap();
        api.create_swift_code(&request("ABCDPLPW123", false)).unwrap();

        let country = api.get_country_swift_codes("pl").unwrap();
        assert_eq!(country.country_iso2, "PL");
        assert_eq!(country.country_name, "POLAND");
        assert_eq!(country.swift_codes.len(), 2);

        assert!(matches!(
            api.get_country_swift_codes("DE"),
            Err(ApiError::NotFound(_))
        ));
    }
}
