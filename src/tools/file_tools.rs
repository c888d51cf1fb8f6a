use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

/// 先寫入同資料夾的隱藏暫存檔，再改名到目標路徑
///
/// 目標路徑只會出現完整的檔案；失敗時會清除暫存檔
pub fn write_file_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path)?;

    if let Err(e) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("無法寫入暫存檔: {}", temp_path.display()));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| {
            format!(
                "無法將暫存檔改名: {} -> {}",
                temp_path.display(),
                path.display()
            )
        });
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("無效的檔案路徑: {}", path.display()))?;
    Ok(path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}
