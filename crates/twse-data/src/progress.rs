//! 다운로드 진행률 보고.

/// 진행률 보고자.
pub trait ProgressReporter: Send + Sync {
    /// `current`/`total` 단계 완료. `label`은 보통 종목 코드입니다.
    fn report(&self, current: usize, total: usize, label: &str);
}

/// 아무것도 하지 않는 보고자.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _current: usize, _total: usize, _label: &str) {}
}

/// `debug` 레벨 tracing 이벤트로 진행률을 남기는 보고자.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, current: usize, total: usize, label: &str) {
        tracing::debug!(
            label,
            current,
            total,
            percent = percent(current, total),
            "다운로드 진행"
        );
    }
}

/// 소수 첫째 자리까지의 진행률. 전체가 0이면 100입니다.
fn percent(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (current as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn test_reporters_are_object_safe() {
        let reporters: Vec<Box<dyn ProgressReporter>> =
            vec![Box::new(NoopProgress), Box::new(TracingProgress)];
        for reporter in &reporters {
            reporter.report(1, 2, "2330");
        }
    }
}
