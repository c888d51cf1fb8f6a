mod file_tools;
mod magick_renderer;
mod part_extractor;
mod path_validator;
mod platform_client;
mod task_pool;
mod text_renderer;
mod thumbnail_scanner;
mod video_catalog;
mod youtube_client;

pub use file_tools::write_file_atomically;
pub use magick_renderer::{MagickRenderer, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
pub use part_extractor::{extract_part_number, parse_part_range};
pub use path_validator::{ensure_directory_exists, validate_directory_exists, validate_file_exists};
pub use platform_client::{PlatformClient, UploadError};
pub use task_pool::TaskPool;
pub use text_renderer::{RenderError, RenderJob, TextRenderer, TextStyle, part_indicator};
pub use thumbnail_scanner::{
    THUMBNAIL_EXTENSIONS, ThumbnailFile, normalize_extension, scan_thumbnail_files,
    thumbnail_file_name,
};
pub use video_catalog::{VideoRecord, load_video_records, save_video_records};
pub use youtube_client::{ACCESS_TOKEN_ENV, YouTubeClient};
