//! 配置校验模块
//!
//! 校验规则：
//! - session id 非空且唯一
//! - sink name 非空且唯一
//! - 对齐参数在合法范围内 (tolerance_seconds > 0, 0 < direct_coverage_threshold <= 1)
//! - total_video_frames > 0 (若设置)
//! - 直径列别名非空
//! - csv/json sink 必须提供 base_path

use std::collections::HashSet;

use contracts::{ContractError, SessionBlueprint, SinkType};
use ::validator::Validate;

/// 校验 SessionBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    validate_alignment(blueprint)?;
    validate_columns(blueprint)?;
    validate_sessions(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验对齐参数
fn validate_alignment(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let alignment = &blueprint.alignment;

    // NaN 会绕过 range 校验
    if !alignment.tolerance_seconds.is_finite() {
        return Err(ContractError::config_validation(
            "alignment.tolerance_seconds",
            "tolerance_seconds must be finite",
        ));
    }
    if !alignment.direct_coverage_threshold.is_finite() {
        return Err(ContractError::config_validation(
            "alignment.direct_coverage_threshold",
            "direct_coverage_threshold must be finite",
        ));
    }

    alignment
        .validate()
        .map_err(|e| ContractError::config_validation("alignment", e.to_string()))
}

/// 校验列名别名
fn validate_columns(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let diameter = &blueprint.columns.diameter;
    if diameter.is_empty() || diameter.iter().all(|alias| alias.trim().is_empty()) {
        return Err(ContractError::config_validation(
            "columns.diameter",
            "diameter alias list cannot be empty",
        ));
    }
    Ok(())
}

/// 校验会话列表
fn validate_sessions(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, session) in blueprint.sessions.iter().enumerate() {
        if session.id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("sessions[{}].id", idx),
                "session id cannot be empty",
            ));
        }
        if !seen.insert(session.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("sessions[id={}]", session.id),
                "duplicate session id",
            ));
        }
        if let Some(total) = session.total_video_frames {
            if total <= 0 {
                return Err(ContractError::config_validation(
                    format!("sessions[{}].total_video_frames", session.id),
                    format!("total_video_frames must be > 0, got {total}"),
                ));
            }
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if matches!(sink.sink_type, SinkType::Csv | SinkType::Json)
            && !sink.params.contains_key("base_path")
        {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.base_path", sink.name),
                "file sinks require a base_path",
            ));
        }
    }
    Ok(())
}
