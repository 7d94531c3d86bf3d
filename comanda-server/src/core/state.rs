use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::Catalog;
use crate::core::{Config, Result, ServerError};
use crate::guard::RequestGuard;
use crate::notify::Notifier;
use crate::orders::OrdersManager;

/// Interval of the guard sweeper task
const GUARD_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Interval of the processed-command pruning task
const COMMAND_PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | orders | Arc<OrdersManager> | 订单引擎 (redb) |
/// | notifier | Arc<Notifier> | 长轮询变更通知 |
/// | guard | Arc<RequestGuard> | 防重复提交 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单引擎
    pub orders: Arc<OrdersManager>,
    /// 长轮询变更通知
    pub notifier: Arc<Notifier>,
    /// 防重复提交
    pub guard: Arc<RequestGuard>,
    /// 启动时间
    pub started_at: Instant,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(config: Config, orders: Arc<OrdersManager>) -> Self {
        let notifier = Arc::new(Notifier::new(orders.clone(), config.poll_timings()));
        let guard = Arc::new(RequestGuard::new(config.guard_cooldowns()));
        Self {
            config,
            orders,
            notifier,
            guard,
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开 redb 数据库
    /// 3. 目录引导 (虚拟桌台、种子文件)
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let orders = OrdersManager::new(&db_path, config.engine_rules())?;
        tracing::info!(path = %db_path.display(), "Order database opened");

        let seed_file = config.seed_file.as_deref().map(std::path::Path::new);
        Catalog::seed(orders.storage(), seed_file).map_err(|e| ServerError::Seed(e.to_string()))?;

        Ok(Self::new(config.clone(), Arc::new(orders)))
    }

    /// 启动后台任务
    ///
    /// - 防重记录清理
    /// - 过期的已处理命令 ID 清理
    pub fn start_background_tasks(&self) {
        let guard = self.guard.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(GUARD_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = guard.sweep();
                if removed > 0 {
                    tracing::debug!(removed, "Guard records swept");
                }
            }
        });

        let orders = self.orders.clone();
        let retention = self.config.command_retention();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(COMMAND_PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = orders.prune_processed_commands(retention) {
                    tracing::warn!(error = %e, "Processed command pruning failed");
                }
            }
        });
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
