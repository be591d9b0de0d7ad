use log::warn;

/// 時間比較的統一容差（秒），用於邊界整理與區間長度判斷
pub const TIME_EPSILON: f64 = 1e-6;

/// 切割區間
///
/// `index` 是保留區間的 1 起始編號；被捨棄的候選區間不佔編號
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInterval {
    pub start: f64,
    pub end: f64,
    pub index: usize,
}

impl ClipInterval {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// 把邊界點轉成實際切割區間
///
/// 每對相鄰邊界形成一個候選區間，起點往後、終點往前各縮
/// `padding_seconds`；內縮後短於 `min_clip_duration` 的候選捨棄
/// 並逐筆警告。輸入相同時輸出必定相同。
#[must_use]
pub fn plan_clip_intervals(
    boundaries: &[f64],
    duration: f64,
    padding_seconds: f64,
    min_clip_duration: f64,
) -> Vec<ClipInterval> {
    let mut intervals = Vec::new();

    for window in boundaries.windows(2) {
        let start = window[0] + padding_seconds;
        let end = (window[1] - padding_seconds).min(duration);

        if end - start < min_clip_duration - TIME_EPSILON {
            warn!(
                "捨棄過短的片段: {:.3}s - {:.3}s（內縮後不足 {min_clip_duration:.3}s）",
                window[0], window[1]
            );
            continue;
        }

        intervals.push(ClipInterval {
            start,
            end,
            index: intervals.len() + 1,
        });
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_basic_intervals() {
        let boundaries = vec![0.0, 5.0, 30.0];
        let intervals = plan_clip_intervals(&boundaries, 30.0, 0.04, 0.1);

        assert_eq!(intervals.len(), 2);
        assert!((intervals[0].start - 0.04).abs() < 1e-9);
        assert!((intervals[0].end - 4.96).abs() < 1e-9);
        assert!((intervals[1].start - 5.04).abs() < 1e-9);
        assert!((intervals[1].end - 29.96).abs() < 1e-9);
        assert_eq!(intervals[0].index, 1);
        assert_eq!(intervals[1].index, 2);
    }

    #[test]
    fn test_plan_intervals_never_overlap() {
        let boundaries = vec![0.0, 5.0, 10.0, 30.0, 60.0];
        let intervals = plan_clip_intervals(&boundaries, 60.0, 0.04, 0.1);

        for pair in intervals.windows(2) {
            assert!(
                pair[0].end < pair[1].start,
                "相鄰區間不應該重疊: {:.3} vs {:.3}",
                pair[0].end,
                pair[1].start
            );
        }
    }

    #[test]
    fn test_plan_single_boundary_pair_full_span() {
        // 偵測只回報頭尾時，整部影片就是一個片段
        let boundaries = vec![0.0, 60.0];
        let intervals = plan_clip_intervals(&boundaries, 60.0, 0.04, 0.1);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].index, 1);
        assert!((intervals[0].duration() - 59.92).abs() < 1e-9);
    }

    #[test]
    fn test_plan_drops_non_viable_interval() {
        // 內縮 0.04*2 後剩 0.07 秒，低於 0.1 秒門檻
        let boundaries = vec![0.0, 0.15];
        let intervals = plan_clip_intervals(&boundaries, 0.15, 0.04, 0.1);

        assert!(intervals.is_empty(), "過短的片段應該被捨棄");
    }

    #[test]
    fn test_plan_threshold_arithmetic_with_epsilon() {
        // 0.18 - 0.08 = 0.1，浮點運算會差一點點，容差要吃掉這個誤差
        let kept = plan_clip_intervals(&[0.0, 0.18], 0.18, 0.04, 0.1);
        assert_eq!(kept.len(), 1, "剛好等於門檻的片段應該保留");

        let dropped = plan_clip_intervals(&[0.0, 0.179], 0.179, 0.04, 0.1);
        assert!(dropped.is_empty(), "低於門檻的片段應該捨棄");
    }

    #[test]
    fn test_plan_indices_skip_discarded() {
        // 兩個過短候選夾在中間，保留的編號仍然連續
        let boundaries = vec![0.0, 0.05, 10.0, 10.05, 20.0];
        let intervals = plan_clip_intervals(&boundaries, 20.0, 0.0, 0.1);

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].index, 1);
        assert_eq!(intervals[1].index, 2);
        assert!((intervals[0].start - 0.05).abs() < 1e-9);
        assert!((intervals[1].start - 10.05).abs() < 1e-9);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let boundaries = vec![0.0, 7.5, 20.0, 45.0];
        let first = plan_clip_intervals(&boundaries, 45.0, 0.04, 0.1);
        let second = plan_clip_intervals(&boundaries, 45.0, 0.04, 0.1);

        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_duration_accounting() {
        // 保留片段長度 + 被移除的 padding + 被捨棄的原始間隔 = 總長
        let boundaries = vec![0.0, 5.0, 5.05, 30.0];
        let padding = 0.02;
        let intervals = plan_clip_intervals(&boundaries, 30.0, padding, 0.1);

        assert_eq!(intervals.len(), 2);

        let kept_sum: f64 = intervals.iter().map(ClipInterval::duration).sum();
        let padding_removed = 2.0 * padding * intervals.len() as f64;
        let discarded_gap = 5.05 - 5.0;

        assert!((kept_sum + padding_removed + discarded_gap - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_empty_and_single_boundary() {
        assert!(plan_clip_intervals(&[], 10.0, 0.04, 0.1).is_empty());
        assert!(plan_clip_intervals(&[0.0], 10.0, 0.04, 0.1).is_empty());
    }
}
