//! YouTube Data API v3 用戶端
//!
//! 只負責呼叫 API；OAuth 授權在程式外完成，存取權杖由環境變數提供

use super::platform_client::{PlatformClient, UploadError};
use super::video_catalog::VideoRecord;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 存取權杖的環境變數名稱
pub const ACCESS_TOKEN_ENV: &str = "YOUTUBE_ACCESS_TOKEN";

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

/// playlistItems.list 與 videos.list 單次最多 50 筆
const PAGE_SIZE: usize = 50;

/// 私人影片在播放清單中顯示的標題
const PRIVATE_VIDEO_TITLE: &str = "Private Video";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: ContentDetails,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

pub struct YouTubeClient {
    client: Client,
    access_token: String,
}

impl YouTubeClient {
    /// 從 `YOUTUBE_ACCESS_TOKEN` 讀取存取權杖
    pub fn from_env() -> Result<Self> {
        let token = env::var(ACCESS_TOKEN_ENV).with_context(|| {
            format!("{ACCESS_TOKEN_ENV} 環境變數未設定，請先完成 OAuth 授權並匯出存取權杖")
        })?;
        Self::new(&token)
    }

    pub fn new(access_token: &str) -> Result<Self> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            bail!("存取權杖為空");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("無法建立 HTTP 用戶端")?;

        Ok(Self {
            client,
            access_token: access_token.to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{API_BASE}/{endpoint}");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .with_context(|| format!("無法呼叫 YouTube API: {endpoint}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("YouTube API 錯誤 {endpoint} ({status}): {}", error_message(&body));
        }

        response
            .json()
            .with_context(|| format!("無法解析 YouTube API 回應: {endpoint}"))
    }

    /// 以 videos.list 查詢私人影片的實際標題
    fn fetch_titles(&self, video_ids: &[String]) -> Result<HashMap<String, String>> {
        let mut titles = HashMap::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(PAGE_SIZE) {
            let ids = chunk.join(",");
            let response: VideoListResponse =
                self.get_json("videos", &[("part", "snippet"), ("id", ids.as_str())])?;

            titles.extend(
                response
                    .items
                    .into_iter()
                    .map(|item| (item.id, item.snippet.title)),
            );
        }

        Ok(titles)
    }
}

impl PlatformClient for YouTubeClient {
    fn list_playlist_items(&self, playlist_id: &str) -> Result<Vec<VideoRecord>> {
        let mut videos = Vec::new();
        let mut private_ids = Vec::new();
        let mut page_token: Option<String> = None;
        let page_size = PAGE_SIZE.to_string();

        loop {
            let mut query = vec![
                ("part", "contentDetails,snippet"),
                ("playlistId", playlist_id),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: PlaylistItemListResponse = self.get_json("playlistItems", &query)?;
            debug!("取得播放清單頁面: {} 筆", page.items.len());

            collect_page_items(page.items, &mut videos, &mut private_ids);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        if !private_ids.is_empty() {
            info!("查詢 {} 支私人影片的標題", private_ids.len());
            let titles = self.fetch_titles(&private_ids)?;
            apply_titles(&mut videos, &titles);
        }

        Ok(videos)
    }

    fn set_thumbnail(&self, video_id: &str, thumbnail_path: &Path) -> Result<(), UploadError> {
        let bytes = fs::read(thumbnail_path).map_err(|e| {
            UploadError::fatal(format!("無法讀取縮圖檔 {}: {e}", thumbnail_path.display()))
        })?;

        let response = self
            .client
            .post(format!("{UPLOAD_BASE}/thumbnails/set"))
            .bearer_auth(&self.access_token)
            .query(&[("videoId", video_id), ("uploadType", "media")])
            .header(CONTENT_TYPE, content_type_for(thumbnail_path))
            .body(bytes)
            .send()
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(classify_status(status, &body))
    }
}

/// 收集一頁播放清單項目；標題為 "Private Video" 的先留空並記下 ID
fn collect_page_items(
    items: Vec<PlaylistItem>,
    videos: &mut Vec<VideoRecord>,
    private_ids: &mut Vec<String>,
) {
    for item in items {
        let video_id = item.content_details.video_id;
        let mut title = item.snippet.title;
        if title == PRIVATE_VIDEO_TITLE {
            private_ids.push(video_id.clone());
            title = String::new();
        }
        videos.push(VideoRecord { video_id, title });
    }
}

fn apply_titles(videos: &mut [VideoRecord], titles: &HashMap<String, String>) {
    for video in videos.iter_mut().filter(|v| v.title.is_empty()) {
        if let Some(title) = titles.get(&video.video_id) {
            video.title.clone_from(title);
        }
    }
}

/// HTTP 狀態碼分類：429、5xx 與限流類 403 可重試，其餘 4xx 直接失敗
fn classify_status(status: StatusCode, body: &str) -> UploadError {
    let message = format!("HTTP {status}: {}", error_message(body));

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return UploadError::retryable(message);
    }

    if status == StatusCode::FORBIDDEN && is_rate_limited(body) {
        return UploadError::retryable(message);
    }

    UploadError::fatal(message)
}

fn classify_transport_error(err: &reqwest::Error) -> UploadError {
    if err.is_builder() {
        UploadError::fatal(format!("無效的請求: {err}"))
    } else {
        UploadError::retryable(format!("網路錯誤: {err}"))
    }
}

fn is_rate_limited(body: &str) -> bool {
    serde_json::from_str::<ApiErrorResponse>(body).is_ok_and(|resp| {
        resp.error
            .errors
            .iter()
            .any(|e| matches!(e.reason.as_str(), "rateLimitExceeded" | "userRateLimitExceeded"))
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(resp) if !resp.error.message.is_empty() => resp.error.message,
        _ => body.trim().to_string(),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
