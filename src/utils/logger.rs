use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// 對應 `[logging] format`，未設定時使用 compact
    pub fn from_config(format: Option<&str>) -> Self {
        match format {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// 本 crate 使用設定的等級，其餘依賴只輸出 warn 以上；--verbose 強制 debug
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("warn,product_catalog={}", level)
}

/// RUST_LOG 優先於設定檔
pub fn init_logger(format: LogFormat, level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)));

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init(),
        // 集中式收集需要 target 與 span 資訊
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_target(true).json().with_current_span(true))
            .init(),
    }
}
