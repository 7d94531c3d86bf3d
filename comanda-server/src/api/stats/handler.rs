//! System Stats API Handlers

use std::collections::BTreeMap;

use axum::extract::State;
use serde::Serialize;
use shared::SyncChannel;

use crate::core::ServerState;
use crate::notify::LastDigest;
use crate::orders::EngineStats;
use crate::utils::{ApiResponse, AppResult, ok};

/// 系统统计
#[derive(Debug, Serialize)]
pub struct SystemStats {
    /// 服务实例 ID (重启后变化)
    pub epoch: String,
    pub uptime_seconds: u64,
    pub engine: EngineStats,
    /// 每个频道最近一次计算的摘要
    pub last_digests: BTreeMap<SyncChannel, LastDigest>,
    /// 防重记录数
    pub guard_records: usize,
}

/// GET /api/stats
pub async fn system_stats(State(state): State<ServerState>) -> AppResult<ApiResponse<SystemStats>> {
    ok(SystemStats {
        epoch: state.orders.epoch().to_string(),
        uptime_seconds: state.uptime().as_secs(),
        engine: state.orders.engine_stats()?,
        last_digests: state.notifier.last_digests(),
        guard_records: state.guard.len(),
    })
}
