//! 縮圖比對與上傳元件
//!
//! 依集數將縮圖檔與影片一對一配對，再逐支設定縮圖（可重試），
//! 最後輸出配對報告

mod main;
mod matcher;
mod report;
mod upload_engine;

pub use main::ThumbnailUploader;
pub use matcher::{
    Assignment, AssignmentEntry, MatchResult, PartFilter, PartKey, UnmatchedSet, match_thumbnails,
};
pub use report::{AssignmentReport, EntryStatus, ReportEntry};
pub use upload_engine::{
    FinalState, MAX_RETRIES_LIMIT, RetryPolicy, UploadEngine, UploadOutcome,
};
