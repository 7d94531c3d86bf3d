/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Whole minutes elapsed between two millisecond timestamps (never negative)
pub fn elapsed_minutes(since: i64, now: i64) -> i64 {
    (now - since).max(0) / 60_000
}

/// Format an invoice number from its id (`FAC-000042`)
pub fn invoice_number(invoice_id: i64) -> String {
    format!("FAC-{:06}", invoice_id)
}
