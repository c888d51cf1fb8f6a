//! 縮圖批次產生元件
//!
//! 將集數選擇展開成繪製工作，交給固定大小的工作池平行繪製，
//! 依原始順序回報每張縮圖的結果

mod batch_generator;
mod main;

pub use batch_generator::{
    BatchGenerator, BatchSummary, GeneratorConfig, PartSpec, RenderOutcome, RenderResult,
    create_render_jobs,
};
pub use main::ThumbnailGenerator;
