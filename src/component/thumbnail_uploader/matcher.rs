use crate::tools::{ThumbnailFile, VideoRecord, extract_part_number};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 比對用的鍵：有集數的依數字排序，無集數自成一組並排在最後
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartKey {
    Numbered(u32),
    Unlabeled,
}

impl From<Option<u32>> for PartKey {
    fn from(part: Option<u32>) -> Self {
        part.map_or(Self::Unlabeled, Self::Numbered)
    }
}

/// 影片端的集數篩選，在比對前套用
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartFilter {
    #[default]
    All,
    MinPart(u32),
    /// 包含兩端
    Range(u32, u32),
}

impl PartFilter {
    /// 啟用篩選時，沒有集數的影片不在範圍內
    #[must_use]
    pub fn includes(&self, part: Option<u32>) -> bool {
        match (*self, part) {
            (Self::All, _) => true,
            (Self::MinPart(min), Some(part)) => part >= min,
            (Self::Range(start, end), Some(part)) => (start..=end).contains(&part),
            (_, None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub part_number: Option<u32>,
    pub video: VideoRecord,
    pub thumbnail_path: PathBuf,
}

/// 一對一配對結果，同一集數、影片、檔案最多出現一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    entries: Vec<AssignmentEntry>,
}

impl Assignment {
    #[must_use]
    pub fn entries(&self) -> &[AssignmentEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmatchedSet {
    pub unmatched_videos: Vec<VideoRecord>,
    pub unmatched_files: Vec<ThumbnailFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub assignment: Assignment,
    pub unmatched: UnmatchedSet,
    /// 被篩選條件排除的影片數量
    pub filtered_out: usize,
}

#[derive(Default)]
struct Bucket<'a> {
    files: Vec<&'a ThumbnailFile>,
    videos: Vec<&'a VideoRecord>,
}

/// 依集數比對縮圖與影片
///
/// 同一集數恰好一個檔案與一支影片才會配對；其他情況（缺一邊或重複）
/// 該集數的所有檔案與影片都列為未配對，不會任意挑選。
/// 結果只取決於輸入內容，與輸入順序無關。
#[must_use]
pub fn match_thumbnails(
    files: &[ThumbnailFile],
    videos: &[VideoRecord],
    filter: &PartFilter,
) -> MatchResult {
    let mut buckets: BTreeMap<PartKey, Bucket> = BTreeMap::new();

    for file in files {
        buckets
            .entry(file.part_number.into())
            .or_default()
            .files
            .push(file);
    }

    let mut filtered_out = 0;
    for video in videos {
        let part = extract_part_number(&video.title);
        if !filter.includes(part) {
            filtered_out += 1;
            continue;
        }
        buckets.entry(part.into()).or_default().videos.push(video);
    }

    let mut result = MatchResult {
        filtered_out,
        ..MatchResult::default()
    };

    for (key, mut bucket) in buckets {
        if let ([file], [video]) = (bucket.files.as_slice(), bucket.videos.as_slice()) {
            result.assignment.entries.push(AssignmentEntry {
                part_number: file.part_number,
                video: (*video).clone(),
                thumbnail_path: file.path.clone(),
            });
            continue;
        }

        bucket.files.sort();
        bucket.videos.sort();
        log_unmatched(key, &bucket);

        result
            .unmatched
            .unmatched_files
            .extend(bucket.files.into_iter().cloned());
        result
            .unmatched
            .unmatched_videos
            .extend(bucket.videos.into_iter().cloned());
    }

    debug!(
        "比對完成 - 配對: {}, 未配對影片: {}, 未配對縮圖: {}, 篩選排除: {}",
        result.assignment.len(),
        result.unmatched.unmatched_videos.len(),
        result.unmatched.unmatched_files.len(),
        result.filtered_out
    );

    result
}

fn log_unmatched(key: PartKey, bucket: &Bucket) {
    let part = match key {
        PartKey::Numbered(part) => format!("Part {part}"),
        PartKey::Unlabeled => "無集數".to_string(),
    };

    match (bucket.files.len(), bucket.videos.len()) {
        (0, _) => {
            for video in &bucket.videos {
                warn!("找不到縮圖 [{part}]: '{}'", video.title);
            }
        }
        (_, 0) => debug!("{part} 的縮圖沒有對應影片"),
        (files, videos) => warn!(
            "{part} 有 {files} 個縮圖、{videos} 支影片，無法一對一配對，全部列為未配對"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file(name: &str) -> ThumbnailFile {
        ThumbnailFile::from_path(&Path::new("/thumbs").join(name)).unwrap()
    }

    fn video(id: &str, title: &str) -> VideoRecord {
        VideoRecord::new(id, title)
    }

    #[test]
    fn test_part_key_order() {
        assert!(PartKey::Numbered(u32::MAX) < PartKey::Unlabeled);
        assert!(PartKey::Numbered(2) < PartKey::Numbered(10));
        assert_eq!(PartKey::from(None), PartKey::Unlabeled);
    }

    #[test]
    fn test_part_filter() {
        assert!(PartFilter::All.includes(None));
        assert!(PartFilter::MinPart(5).includes(Some(5)));
        assert!(!PartFilter::MinPart(5).includes(Some(4)));
        assert!(!PartFilter::MinPart(5).includes(None));
        assert!(PartFilter::Range(3, 6).includes(Some(6)));
        assert!(!PartFilter::Range(3, 6).includes(Some(7)));
        assert!(!PartFilter::Range(3, 6).includes(None));
    }

    #[test]
    fn test_one_to_one_match() {
        let files = vec![file("thumbnail_part_1.png"), file("thumbnail_part_2.png")];
        let videos = vec![video("b", "Trip Part 2"), video("a", "Trip Part 1")];

        let result = match_thumbnails(&files, &videos, &PartFilter::All);

        assert_eq!(result.assignment.len(), 2);
        let entries = result.assignment.entries();
        assert_eq!(entries[0].part_number, Some(1));
        assert_eq!(entries[0].video.video_id, "a");
        assert_eq!(
            entries[0].thumbnail_path,
            Path::new("/thumbs/thumbnail_part_1.png")
        );
        assert_eq!(entries[1].video.video_id, "b");
        assert_eq!(result.unmatched, UnmatchedSet::default());
    }

    #[test]
    fn test_duplicate_files_are_unmatched() {
        let files = vec![
            file("thumbnail_part_3.png"),
            file("thumbnail_part_3.jpg"),
            file("thumbnail_part_4.png"),
        ];
        let videos = vec![video("c", "Trip Part 3"), video("d", "Trip Part 4")];

        let result = match_thumbnails(&files, &videos, &PartFilter::All);

        assert_eq!(result.assignment.len(), 1);
        assert_eq!(result.assignment.entries()[0].part_number, Some(4));
        assert_eq!(result.unmatched.unmatched_files.len(), 2);
        assert!(
            result
                .unmatched
                .unmatched_files
                .iter()
                .all(|f| f.part_number == Some(3))
        );
        assert_eq!(result.unmatched.unmatched_videos, vec![video("c", "Trip Part 3")]);
    }

    #[test]
    fn test_duplicate_videos_are_unmatched() {
        let files = vec![file("thumbnail_part_5.png")];
        let videos = vec![video("x", "Trip Part 5"), video("y", "Trip (recut) Part 5")];

        let result = match_thumbnails(&files, &videos, &PartFilter::All);

        assert!(result.assignment.is_empty());
        assert_eq!(result.unmatched.unmatched_files.len(), 1);
        assert_eq!(result.unmatched.unmatched_videos.len(), 2);
    }

    #[test]
    fn test_unlabeled_matches_only_unlabeled() {
        let files = vec![file("thumbnail.png"), file("thumbnail_part_1.png")];
        let videos = vec![video("t", "Trailer"), video("p", "Trip Part 2")];

        let result = match_thumbnails(&files, &videos, &PartFilter::All);

        assert_eq!(result.assignment.len(), 1);
        let entry = &result.assignment.entries()[0];
        assert_eq!(entry.part_number, None);
        assert_eq!(entry.video.video_id, "t");
        assert_eq!(result.unmatched.unmatched_videos, vec![video("p", "Trip Part 2")]);
        assert_eq!(result.unmatched.unmatched_files, vec![file("thumbnail_part_1.png")]);
    }

    #[test]
    fn test_filter_excludes_videos_entirely() {
        let files = vec![file("thumbnail_part_1.png"), file("thumbnail_part_5.png")];
        let videos = vec![
            video("a", "Trip Part 1"),
            video("e", "Trip Part 5"),
            video("i", "Intro"),
        ];

        let result = match_thumbnails(&files, &videos, &PartFilter::MinPart(3));

        assert_eq!(result.filtered_out, 2);
        assert_eq!(result.assignment.len(), 1);
        assert_eq!(result.assignment.entries()[0].video.video_id, "e");
        assert!(result.unmatched.unmatched_videos.is_empty());
        assert_eq!(result.unmatched.unmatched_files, vec![file("thumbnail_part_1.png")]);
    }

    #[test]
    fn test_range_filter() {
        let files = vec![file("thumbnail_part_2.png"), file("thumbnail_part_3.png")];
        let videos = vec![video("b", "Part 2"), video("c", "Part 3"), video("d", "Part 4")];

        let result = match_thumbnails(&files, &videos, &PartFilter::Range(2, 3));

        assert_eq!(result.filtered_out, 1);
        assert_eq!(result.assignment.len(), 2);
    }

    #[test]
    fn test_match_is_order_independent() {
        let files = vec![
            file("thumbnail_part_1.png"),
            file("thumbnail_part_2.png"),
            file("thumbnail_part_2.jpg"),
            file("thumbnail.png"),
        ];
        let videos = vec![
            video("a", "Part 1"),
            video("b", "Part 2"),
            video("c", "Part 3"),
            video("d", "Part 3 (alt)"),
        ];

        let expected = match_thumbnails(&files, &videos, &PartFilter::All);

        let mut files_rev = files.clone();
        files_rev.reverse();
        let mut videos_rot = videos.clone();
        videos_rot.rotate_left(2);

        assert_eq!(match_thumbnails(&files_rev, &videos_rot, &PartFilter::All), expected);
        assert_eq!(match_thumbnails(&files, &videos, &PartFilter::All), expected);
    }

    #[test]
    fn test_empty_inputs() {
        let result = match_thumbnails(&[], &[], &PartFilter::All);
        assert_eq!(result, MatchResult::default());
    }
}
