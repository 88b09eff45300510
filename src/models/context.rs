use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::models::paper::PaperId;

/// 科目代码 → 科目名称
static SUBJECT_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "9708" => "Economics",
    "9609" => "Business",
};

/// 根据科目代码查找科目名称
pub fn subject_name_for_code(code: &str) -> Option<&'static str> {
    SUBJECT_NAMES.get(code).copied()
}

/// 试卷上下文（由调用方提供，字段均可缺省）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperContext {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text", skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text", skip_serializing_if = "Option::is_none")]
    pub paper_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text", skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_label: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl PaperContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 用试卷ID和科目表补全缺失字段
    ///
    /// 调用方提供的字段优先；试卷ID无法解析时只补全不到任何内容。
    pub fn completed(&self) -> PaperContext {
        let mut ctx = self.clone();
        let Ok(paper_id) = PaperId::parse(&self.id) else {
            return ctx;
        };

        fill(&mut ctx.subject_code, || Some(paper_id.subject_code().to_string()));
        let code = ctx.subject_code.clone().unwrap_or_default();
        fill(&mut ctx.subject_name, || subject_name_for_code(&code).map(String::from));
        fill(&mut ctx.paper_number, || paper_id.paper_number());
        fill(&mut ctx.variant, || paper_id.variant());
        fill(&mut ctx.session_label, || Some(paper_id.session().label().to_string()));
        fill(&mut ctx.year, || paper_id.full_year().map(|y| y.to_string()));
        ctx
    }
}

fn fill(slot: &mut Option<String>, value: impl FnOnce() -> Option<String>) {
    let missing = slot.as_deref().map_or(true, |s| s.trim().is_empty());
    if missing {
        *slot = value();
    }
}

// 数字或字符串都接受，例如 year = 2023 / year = "2023"
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(TextVisitor)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_option(TextVisitor)
}
