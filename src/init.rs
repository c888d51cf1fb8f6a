use env_logger::Env;

/// 初始化日誌輸出
///
/// 預設層級為 `info`，可透過 `RUST_LOG` 環境變數覆寫
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}
