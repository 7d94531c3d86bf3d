//! Comanda Server - 餐厅订单生命周期与同步引擎
//!
//! # 架构概述
//!
//! - **订单引擎** (`orders`): 命令 → 校验 → redb 事务 → 事件
//! - **库存** (`inventory`): 下单扣减、退款回补、手动调整
//! - **发票** (`invoicing`): 上菜自动开票、收款、退款
//! - **变更通知** (`notify`): 厨房 / 库存频道的长轮询
//! - **防重复提交** (`guard`): 按操作者 + 动作的冷却窗口
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── orders/        # 命令处理、存储、视图
//! ├── inventory/     # 库存账本
//! ├── invoicing/     # 计费
//! ├── notify/        # 长轮询通知
//! ├── guard/         # 防重复提交
//! ├── catalog.rs     # 菜品 / 桌台引导
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod guard;
pub mod inventory;
pub mod invoicing;
pub mod notify;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{EngineRules, OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCode, FailureKind};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env`
/// 2. 创建工作目录与日志目录
/// 3. 初始化日志 (控制台 + 按天滚动文件)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    init_logger_with_file(Some(&config.log_level), config.log_json, Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______                                __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
