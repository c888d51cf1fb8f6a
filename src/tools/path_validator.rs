use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("檔案不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_paths() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("base.png");
        std::fs::write(&file, b"x").unwrap();

        assert!(validate_directory_exists(dir.path()).is_ok());
        assert!(validate_directory_exists(&file).is_err());
        assert!(validate_file_exists(&file).is_ok());
        assert!(validate_file_exists(dir.path()).is_err());
        assert!(validate_file_exists(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn test_ensure_directory_exists_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_directory_exists(&nested).unwrap();
    }
}
