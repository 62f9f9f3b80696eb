/// 长耗时操作的进度回调
///
/// 添加操作上报 2 个单位；删除操作上报 `n + 1` 个单位，每个键一个子任务。
pub trait ProgressReporter: Send + Sync {
    /// 开始一个任务
    fn begin(&self, task: &str, total: u64);

    /// 切换到子任务
    fn sub_task(&self, name: &str);

    /// 完成若干单位
    fn worked(&self, units: u64);

    /// 任务结束（成功或失败）
    fn done(&self);
}

/// 不输出任何进度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn begin(&self, _task: &str, _total: u64) {}

    fn sub_task(&self, _name: &str) {}

    fn worked(&self, _units: u64) {}

    fn done(&self) {}
}
