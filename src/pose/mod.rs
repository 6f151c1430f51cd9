//! 姿态数据模型与数据源
//!
//! 姿态估计本身由外部模型完成，这里只定义它交付的数据形状：
//! 每次推理产生若干 [`Pose`]，每个姿态包含一组带置信度的 [`Keypoint`]。
//!
//! ## 线格式
//!
//! ```json
//! { "score": 0.8,
//!   "keypoints": [ { "part": "nose", "position": { "x": 320.0, "y": 200.0 }, "score": 0.93 } ] }
//! ```
//!
//! `part` 可以是名称（`"leftWrist"`、`"left_wrist"`）也可以是无标签的整数索引。

pub mod scripted;
pub mod source;
pub mod synthetic;

pub use scripted::{PoseScript, ScriptFrame, ScriptedPoseSource};
pub use source::{LatestPoses, PoseCallback, PoseEvent, PoseSource, Subscribers};
pub use synthetic::SyntheticPoseSource;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 身体部位标签
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PartLabel", into = "PartLabel")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    Mouth,
    /// 模型只给出索引而没有名称
    Index(u32),
    /// 未识别的名称，原样保留
    Other(String),
}

const NAMED_PARTS: [(BodyPart, &str); 18] = [
    (BodyPart::Nose, "nose"),
    (BodyPart::LeftEye, "leftEye"),
    (BodyPart::RightEye, "rightEye"),
    (BodyPart::LeftEar, "leftEar"),
    (BodyPart::RightEar, "rightEar"),
    (BodyPart::LeftShoulder, "leftShoulder"),
    (BodyPart::RightShoulder, "rightShoulder"),
    (BodyPart::LeftElbow, "leftElbow"),
    (BodyPart::RightElbow, "rightElbow"),
    (BodyPart::LeftWrist, "leftWrist"),
    (BodyPart::RightWrist, "rightWrist"),
    (BodyPart::LeftHip, "leftHip"),
    (BodyPart::RightHip, "rightHip"),
    (BodyPart::LeftKnee, "leftKnee"),
    (BodyPart::RightKnee, "rightKnee"),
    (BodyPart::LeftAnkle, "leftAnkle"),
    (BodyPart::RightAnkle, "rightAnkle"),
    (BodyPart::Mouth, "mouth"),
];

impl BodyPart {
    /// 按名称解析，大小写、下划线和连字符不敏感
    pub fn from_name(name: &str) -> BodyPart {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        NAMED_PARTS
            .iter()
            .find(|(_, n)| n.to_lowercase() == normalized)
            .map(|(part, _)| part.clone())
            .unwrap_or_else(|| BodyPart::Other(name.to_string()))
    }

    /// 规范名称（PoseNet 风格的驼峰）
    pub fn name(&self) -> Option<&str> {
        match self {
            BodyPart::Index(_) => None,
            BodyPart::Other(name) => Some(name.as_str()),
            named => NAMED_PARTS
                .iter()
                .find(|(part, _)| part == named)
                .map(|(_, n)| *n),
        }
    }
}

impl std::str::FromStr for BodyPart {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<u32>() {
            Ok(index) => BodyPart::Index(index),
            Err(_) => BodyPart::from_name(s),
        })
    }
}

/// 线格式上的部位标签
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PartLabel {
    Index(u32),
    Name(String),
}

impl From<PartLabel> for BodyPart {
    fn from(label: PartLabel) -> Self {
        match label {
            PartLabel::Index(i) => BodyPart::Index(i),
            PartLabel::Name(name) => BodyPart::from_name(&name),
        }
    }
}

impl From<BodyPart> for PartLabel {
    fn from(part: BodyPart) -> Self {
        match part {
            BodyPart::Index(i) => PartLabel::Index(i),
            other => PartLabel::Name(other.name().unwrap_or_default().to_string()),
        }
    }
}

/// `{x, y}` 形式的坐标序列化
mod xy {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        x: f32,
        y: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec2, s: S) -> Result<S::Ok, S::Error> {
        Xy { x: v.x, y: v.y }.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec2, D::Error> {
        let p = Xy::deserialize(d)?;
        Ok(Vec2::new(p.x, p.y))
    }
}

/// 单个关键点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: BodyPart,
    #[serde(with = "xy")]
    pub position: Vec2,
    pub score: f32,
}

impl Keypoint {
    pub fn new(part: BodyPart, position: Vec2, score: f32) -> Self {
        Self {
            part,
            position,
            score,
        }
    }

    /// 置信度是否严格高于阈值
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// 一次检测到的人体姿态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        let score = if keypoints.is_empty() {
            0.0
        } else {
            keypoints.iter().map(|k| k.score).sum::<f32>() / keypoints.len() as f32
        };
        Self { score, keypoints }
    }

    /// 按部位查找关键点
    pub fn keypoint(&self, part: &BodyPart) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| &k.part == part)
    }

    /// 部位置信度高于阈值时返回其位置
    pub fn confident_position(&self, part: &BodyPart, threshold: f32) -> Option<Vec2> {
        self.keypoint(part)
            .filter(|k| k.is_confident(threshold))
            .map(|k| k.position)
    }
}
