//! 计划校验模块
//!
//! 校验规则：
//! - target.url 合法且为 http/https
//! - sink name 唯一
//! - sink queue_capacity >= 1
//! - file sink 必须带 path 参数
//!
//! 注意：fire.capacity = 0 不在此处拒绝，引擎按约定回退到默认值 1000。

use std::collections::HashSet;

use contracts::{ContractError, LoadPlan, SinkType};
use validator::Validate;

/// 校验 LoadPlan 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(plan: &LoadPlan) -> Result<(), ContractError> {
    validate_fields(plan)?;
    validate_target_scheme(plan)?;
    validate_sink_names(plan)?;
    validate_sink_params(plan)?;
    Ok(())
}

/// 字段级校验 (validator derive)
fn validate_fields(plan: &LoadPlan) -> Result<(), ContractError> {
    plan.validate()
        .map_err(|e| ContractError::config_validation("plan", e.to_string()))
}

/// 校验 target scheme
fn validate_target_scheme(plan: &LoadPlan) -> Result<(), ContractError> {
    let url = &plan.target.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "target.url",
            format!("scheme must be http or https, got '{url}'"),
        ));
    }
    Ok(())
}

/// 校验 sink name 唯一性
fn validate_sink_names(plan: &LoadPlan) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sink in &plan.sinks {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                "sinks[].name",
                "sink name must not be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 参数
fn validate_sink_params(plan: &LoadPlan) -> Result<(), ContractError> {
    for sink in &plan.sinks {
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[name={}].queue_capacity", sink.name),
                "queue_capacity must be >= 1",
            ));
        }
        if sink.sink_type == SinkType::File && !sink.params.contains_key("path") {
            return Err(ContractError::config_validation(
                format!("sinks[name={}].params", sink.name),
                "file sink requires a 'path' param",
            ));
        }
    }
    Ok(())
}
