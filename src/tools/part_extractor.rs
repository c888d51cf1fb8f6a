//! 集數（Part number）擷取
//!
//! 縮圖檔名與影片標題共用同一條規則，確保比對結果一致

use anyhow::{Result, bail};
use regex::Regex;
use std::sync::LazyLock;

/// 第一個獨立的 "part"（不分大小寫），接著空白或底線，再接一串數字
static REGEX_PART_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\p{L}])part[\s_]+(\d+)").expect("Invalid regex")
});

/// 從檔名或標題擷取集數
///
/// 找不到符合的片段，或數字超出 `u32` 範圍時回傳 `None`
#[must_use]
pub fn extract_part_number(text: &str) -> Option<u32> {
    REGEX_PART_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// 解析 `START-END` 格式的集數範圍（包含兩端）
pub fn parse_part_range(input: &str) -> Result<(u32, u32)> {
    let Some((start, end)) = input.trim().split_once('-') else {
        bail!("範圍格式錯誤: '{input}'，請使用 START-END，例如 130-145");
    };

    let (Ok(start), Ok(end)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>()) else {
        bail!("範圍格式錯誤: '{input}'，請使用 START-END，例如 130-145");
    };

    if start > end {
        bail!("範圍起點 {start} 大於終點 {end}");
    }

    Ok((start, end))
}
