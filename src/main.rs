// ==========================================
// SWIFT 代码登记系统 - 命令行入口
// ==========================================
// stdout: 成功结果（JSON）
// stderr: 日志与错误信封（JSON）
// ==========================================

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use swift_registry::api::{map_api_error, ApiError, ApiResult, CreateSwiftCodeRequest};
use swift_registry::app::{get_default_db_path, AppState};
use swift_registry::logging;

#[derive(Parser, Debug)]
#[command(name = "swift-registry")]
#[command(about = "SWIFT 代码登记系统")]
#[command(version)]
struct Cli {
    /// 数据库路径（默认: SWIFT_REGISTRY_DB_PATH 或用户数据目录）
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<String>,

    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入 SWIFT 代码文件（.csv / .xlsx / .xls）
    Import {
        file: String,
    },
    /// 按代码查询（总行附带分行）
    Get {
        swift_code: String,
    },
    /// 按国家代码查询
    Country {
        country_iso2: String,
    },
    /// 创建 SWIFT 代码
    Create {
        #[arg(long)]
        swift_code: String,
        #[arg(long)]
        bank_name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "country-iso2")]
        country_iso2: String,
        #[arg(long)]
        country_name: String,
        /// 总行（代码必须以 XXX 结尾）
        #[arg(long)]
        head_office: bool,
    },
    /// 删除 SWIFT 代码（总行连同分行一起删除）
    Delete {
        swift_code: String,
    },
    /// 最近的导入批次
    Batches {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// 列出所有配置
    List,
    /// 写入配置
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!("{} {} 使用数据库: {}", swift_registry::APP_NAME, swift_registry::VERSION, db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            let err = ApiError::DatabaseConnectionError(e);
            eprintln!("{}", map_api_error(&err));
            return ExitCode::from(2);
        }
    };

    match run(cli.command, &state) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", map_api_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, state: &AppState) -> ApiResult<String> {
    match command {
        Command::Import { file } => to_json(&state.import_api.import_file(&file)?),
        Command::Get { swift_code } => to_json(&state.swift_code_api.get_swift_code(&swift_code)?),
        Command::Country { country_iso2 } => {
            to_json(&state.swift_code_api.get_country_swift_codes(&country_iso2)?)
        }
        Command::Create {
            swift_code,
            bank_name,
            address,
            country_iso2,
            country_name,
            head_office,
        } => {
            let request = CreateSwiftCodeRequest {
                address,
                bank_name,
                country_iso2,
                country_name,
                is_head_office: head_office,
                swift_code,
            };
            to_json(&state.swift_code_api.create_swift_code(&request)?)
        }
        Command::Delete { swift_code } => {
            to_json(&state.swift_code_api.delete_swift_code(&swift_code)?)
        }
        Command::Batches { limit } => to_json(&state.import_api.list_recent_batches(limit)?),
        Command::Config { action } => match action {
            ConfigAction::List => {
                let configs = state
                    .config_manager
                    .list_configs()
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;
                to_json(&configs)
            }
            ConfigAction::Set { key, value } => {
                state
                    .config_manager
                    .set_config_value(&key, &value)
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;
                to_json(&serde_json::json!({ "key": key, "value": value }))
            }
        },
    }
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?)
}
