//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能：產生縮圖、取得播放清單、比對並上傳縮圖

pub mod playlist_fetcher;
pub mod thumbnail_generator;
pub mod thumbnail_uploader;

pub use playlist_fetcher::PlaylistFetcher;
pub use thumbnail_generator::ThumbnailGenerator;
pub use thumbnail_uploader::ThumbnailUploader;
