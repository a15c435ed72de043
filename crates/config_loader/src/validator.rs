//! 配置校验模块
//!
//! 校验规则：
//! - target.addr 非空
//! - delivery.concurrency >= 1
//! - delivery.queue_capacity >= 1
//! - synthetic 源 rate_hz 有界且 payload_size >= 1
//! - capture 源必须提供 path

use contracts::{ContractError, ReplayPlan, SourceKind};

/// 校验 ReplayPlan 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(plan: &ReplayPlan) -> Result<(), ContractError> {
    validate_target(plan)?;
    validate_delivery(plan)?;
    validate_source(plan)?;
    Ok(())
}

/// 校验目标端点
fn validate_target(plan: &ReplayPlan) -> Result<(), ContractError> {
    if plan.target.addr.is_empty() {
        return Err(ContractError::config_validation(
            "target.addr",
            "target address cannot be empty",
        ));
    }
    Ok(())
}

/// 校验投递参数
fn validate_delivery(plan: &ReplayPlan) -> Result<(), ContractError> {
    let delivery = &plan.delivery;

    if delivery.concurrency == 0 {
        return Err(ContractError::config_validation(
            "delivery.concurrency",
            "concurrency must be >= 1",
        ));
    }

    if delivery.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "delivery.queue_capacity",
            "queue_capacity must be >= 1",
        ));
    }

    Ok(())
}

/// 校验数据源
fn validate_source(plan: &ReplayPlan) -> Result<(), ContractError> {
    let source = &plan.source;

    if !source.rate_hz.is_finite() || source.rate_hz < 0.0 {
        return Err(ContractError::config_validation(
            "source.rate_hz",
            format!("rate_hz must be finite and >= 0, got {}", source.rate_hz),
        ));
    }

    match source.kind {
        SourceKind::Synthetic => {
            if source.payload_size == 0 {
                return Err(ContractError::config_validation(
                    "source.payload_size",
                    "payload_size must be >= 1 for synthetic sources",
                ));
            }
        }
        SourceKind::Capture => {
            if source.path.is_none() {
                return Err(ContractError::config_validation(
                    "source.path",
                    "capture sources require a capture file path",
                ));
            }
        }
    }

    Ok(())
}
