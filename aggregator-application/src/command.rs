use aggregator_domain::entity::AggregateId;

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，由目标聚合执行并产生事件。
/// - 必须能给出目标聚合的标识，命令处理器据此加载聚合；
/// - 建议保持语义化的“动宾结构”命名，如 `OpenAccount`、`Deposit`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪与错误信息。避免依赖 `type_name::<T>()`。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 目标聚合的标识类型
    type Id: AggregateId;

    /// 目标聚合标识
    fn aggregate_id(&self) -> &Self::Id;
}
