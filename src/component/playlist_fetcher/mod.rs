//! 播放清單影片擷取元件
//!
//! 取得播放清單內所有影片的 ID 與標題，存成 JSON 供比對使用

mod main;

pub use main::{DEFAULT_VIDEO_LIST_FILE, PlaylistFetcher, fetch_playlist_videos};
