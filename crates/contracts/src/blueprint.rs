//! SessionBlueprint - Config Loader 输出
//!
//! 描述一次批量对齐运行：对齐参数、列名别名、会话输入文件、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::{AlignmentConfig, ColumnAliases};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的运行配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 对齐参数
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// 列名别名
    #[serde(default)]
    pub columns: ColumnAliases,

    /// 会话列表
    #[serde(default)]
    pub sessions: Vec<SessionConfig>,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 单个会话的输入文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 唯一标识符 (e.g., "subject1")
    pub id: String,

    /// 直径表路径 (必需)
    pub diameter_path: PathBuf,

    /// 压力日志路径 (可选；缺失时只输出直径)
    #[serde(default)]
    pub pressure_path: Option<PathBuf>,

    /// 帧-时间戳表路径 (可选)
    #[serde(default)]
    pub timestamps_path: Option<PathBuf>,

    /// 视频总帧数 (可选)，必须 > 0
    #[serde(default)]
    pub total_video_frames: Option<i64>,
}

impl SessionConfig {
    pub fn new(id: impl Into<String>, diameter_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            diameter_path: diameter_path.into(),
            pressure_path: None,
            timestamps_path: None,
            total_video_frames: None,
        }
    }
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数 (csv/json: base_path)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    16
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// CSV 文件 (记录 + 覆盖率)
    Csv,
    /// JSON 文件 (完整结果)
    Json,
}

impl SessionBlueprint {
    /// Look up a session by id
    pub fn session(&self, id: &str) -> Option<&SessionConfig> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Sessions selected by an optional id filter, in declaration order
    pub fn selected_sessions<'a>(&'a self, only: Option<&'a str>) -> Vec<&'a SessionConfig> {
        self.sessions
            .iter()
            .filter(|s| only.map_or(true, |id| s.id == id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = "V1"

[alignment]
tolerance_seconds = 0.05

[[sessions]]
id = "subject1"
diameter_path = "inference/subject1/diameter_data.csv"
pressure_path = "raw/subject1/subject1.csv"
total_video_frames = 300

[[sessions]]
id = "subject2"
diameter_path = "inference/subject2/diameter_data.csv"

[[sinks]]
name = "csv_out"
sink_type = "csv"
params = { base_path = "./output" }
"#;

    #[test]
    fn test_blueprint_from_toml() {
        let blueprint: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        assert_eq!(blueprint.alignment.tolerance_seconds, 0.05);
        assert_eq!(blueprint.alignment.direct_coverage_threshold, 0.5);
        assert_eq!(blueprint.sessions.len(), 2);
        assert_eq!(blueprint.sessions[0].total_video_frames, Some(300));
        assert!(blueprint.sessions[1].pressure_path.is_none());
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::Csv);
        assert_eq!(blueprint.sinks[0].queue_capacity, 16);
        assert_eq!(blueprint.columns, ColumnAliases::default());
    }

    #[test]
    fn test_selected_sessions() {
        let blueprint: SessionBlueprint = toml::from_str(SAMPLE).unwrap();
        assert_eq!(blueprint.selected_sessions(None).len(), 2);
        let only = blueprint.selected_sessions(Some("subject2"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "subject2");
        assert!(blueprint.session("missing").is_none());
    }
}
