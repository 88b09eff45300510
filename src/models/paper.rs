//! 试卷ID编解码
//!
//! 试卷ID格式：`前缀-科目代码-卷号变体-考试季-年份`，例如 `econ-9708-22-fm-24`。
//! 评分标准文件名由试卷ID推导：`9708_m24_ms_22.pdf`。

use std::fmt;
use std::str::FromStr;

use crate::error::PaperIdError;

/// 试卷ID至少包含的段数
const MIN_SEGMENTS: usize = 5;

/// 考试季
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCode {
    /// Feb/March
    FM,
    /// May/June
    MJ,
    /// Oct/Nov
    ON,
}

impl SessionCode {
    /// 从原始代码解析（不区分大小写）
    pub fn from_raw(raw: &str) -> Result<Self, PaperIdError> {
        match raw.to_lowercase().as_str() {
            "fm" => Ok(SessionCode::FM),
            "mj" => Ok(SessionCode::MJ),
            "on" => Ok(SessionCode::ON),
            _ => Err(PaperIdError::UnknownSessionCode {
                raw: raw.to_string(),
            }),
        }
    }

    /// 评分标准文件名中使用的考试季字母
    pub fn letter(self) -> char {
        match self {
            SessionCode::FM => 'm',
            SessionCode::MJ => 's',
            SessionCode::ON => 'w',
        }
    }

    /// 小写原始代码
    pub fn raw_code(self) -> &'static str {
        match self {
            SessionCode::FM => "fm",
            SessionCode::MJ => "mj",
            SessionCode::ON => "on",
        }
    }

    /// 展示用标签
    pub fn label(self) -> &'static str {
        match self {
            SessionCode::FM => "Feb/March",
            SessionCode::MJ => "May/June",
            SessionCode::ON => "Oct/Nov",
        }
    }
}

/// 将原始考试季代码转换为评分标准字母：`fm→m`, `mj→s`, `on→w`
pub fn session_raw_to_letter(raw: &str) -> Result<char, PaperIdError> {
    SessionCode::from_raw(raw).map(SessionCode::letter)
}

/// 解析后的试卷ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperId {
    raw: String,
    subject_code: String,
    paper_variant: String,
    session: SessionCode,
    year_short: String,
}

impl PaperId {
    /// 解析试卷ID
    ///
    /// 段数不足、或科目 / 卷号 / 年份段不是纯 ASCII 字母数字时返回 `MalformedPaperId`，
    /// 考试季未知返回 `UnknownSessionCode`。第 5 段之后的内容会被忽略。
    ///
    /// 这些段会拼进文件名，所以不允许出现路径分隔符或 `..`。
    pub fn parse(paper_id: &str) -> Result<Self, PaperIdError> {
        let raw = paper_id.trim();
        let parts: Vec<&str> = raw.split('-').collect();
        let malformed = || PaperIdError::MalformedPaperId {
            paper_id: paper_id.to_string(),
        };
        if parts.len() < MIN_SEGMENTS {
            return Err(malformed());
        }

        let session = SessionCode::from_raw(parts[3])?;

        let (subject_code, paper_variant, year_short) = (parts[1], parts[2], parts[4]);
        if ![subject_code, paper_variant, year_short]
            .iter()
            .all(|s| is_filename_safe(s))
        {
            return Err(malformed());
        }

        Ok(Self {
            raw: raw.to_string(),
            subject_code: subject_code.to_string(),
            paper_variant: paper_variant.to_string(),
            session,
            year_short: year_short.to_string(),
        })
    }

    pub fn subject_code(&self) -> &str {
        &self.subject_code
    }

    pub fn session(&self) -> SessionCode {
        self.session
    }

    /// 卷号（`22` 的第一位）
    pub fn paper_number(&self) -> Option<String> {
        self.paper_variant.chars().next().map(String::from)
    }

    /// 变体（`22` 的第二位）
    pub fn variant(&self) -> Option<String> {
        self.paper_variant.chars().nth(1).map(String::from)
    }

    /// 四位年份，仅当年份段是两位数字时可推导
    pub fn full_year(&self) -> Option<u16> {
        if self.year_short.len() != 2 {
            return None;
        }
        self.year_short.parse::<u16>().ok().map(|y| 2000 + y)
    }

    /// 评分标准文件名：`{科目}_{考试季字母}{年份}_ms_{卷号变体}.pdf`
    pub fn mark_scheme_filename(&self) -> String {
        format!(
            "{}_{}{}_ms_{}.pdf",
            self.subject_code,
            self.session.letter(),
            self.year_short,
            self.paper_variant
        )
    }
}

fn is_filename_safe(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
}

impl FromStr for PaperId {
    type Err = PaperIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
