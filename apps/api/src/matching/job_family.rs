use serde::{Deserialize, Serialize};

use crate::matching::job_profile::JobCompetencyProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFamily {
    Dev,
    Design,
    Pm,
    Ops,
    Delivery,
    Support,
    HrAdmin,
    Edu,
    Sales,
    General,
}

/// Checked in order; the first family with a matching keyword wins.
const FAMILY_KEYWORDS: &[(JobFamily, &[&str])] = &[
    (
        JobFamily::Dev,
        &[
            "工程师", "开发", "技术", "架构", "算法", "测试", "运维", "前端", "后端", "全栈", "程序员",
            "engineer", "developer", "programmer", "architect", "devops", "qa",
        ],
    ),
    (
        JobFamily::Design,
        &["设计", "ui", "ux", "视觉", "交互", "品牌", "创意", "美术", "designer", "design"],
    ),
    (
        JobFamily::Pm,
        &["产品", "需求", "策划", "解决方案", "pm", "规划", "product"],
    ),
    (
        JobFamily::Ops,
        &["运营", "活动", "用户", "社群", "增长", "内容", "市场", "operations", "growth", "marketing"],
    ),
    (
        JobFamily::Delivery,
        &["实施", "项目", "交付", "客户", "部署", "集成", "顾问", "implementation", "project", "consultant"],
    ),
    (
        JobFamily::Support,
        &["客服", "支持", "售后", "服务", "帮助", "support", "service"],
    ),
    (
        JobFamily::HrAdmin,
        &["人事", "行政", "财务", "法务", "hr", "招聘", "薪酬", "培训", "recruit", "finance", "admin"],
    ),
    (
        JobFamily::Edu,
        &["教学", "教务", "班主任", "教师", "老师", "培训", "讲师", "助教", "teacher", "tutor", "instructor"],
    ),
    (
        JobFamily::Sales,
        &["销售", "商务", "渠道", "客户", "bd", "拓展", "大客户", "sales", "account"],
    ),
];

/// Latin keywords match whole words, or word prefixes from four letters up
/// (`engineer` in `engineering`). CJK keywords match anywhere in the title.
fn keyword_matches(keyword: &str, title: &str, words: &[&str]) -> bool {
    if !keyword.is_ascii() {
        return title.contains(keyword);
    }
    words
        .iter()
        .any(|w| *w == keyword || (keyword.len() >= 4 && w.starts_with(keyword)))
}

impl JobFamily {
    /// Classifies a position title by keyword; untitled or unmatched positions are `General`.
    pub fn detect(position: Option<&str>) -> Self {
        let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) else {
            return Self::General;
        };
        let lower = position.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        FAMILY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| keyword_matches(kw, &lower, &words)))
            .map(|(family, _)| *family)
            .unwrap_or(Self::General)
    }

    /// Competencies proposed for a job with no configured profile. Every name
    /// resolves in the built-in mapping table.
    pub fn default_competencies(self) -> &'static [&'static str] {
        match self {
            Self::Dev => &[
                "technical ability",
                "problem solving",
                "learning agility",
                "teamwork",
                "code quality",
                "system design",
            ],
            Self::Design => &[
                "innovation",
                "expression",
                "teamwork",
                "responsibility",
                "learning agility",
                "stress tolerance",
            ],
            Self::Pm => &[
                "user insight",
                "requirements analysis",
                "cross-functional collaboration",
                "product planning",
                "data analysis",
                "decision making",
            ],
            Self::Ops => &[
                "user insight",
                "data analysis",
                "communication",
                "execution",
                "innovation",
                "learning agility",
            ],
            Self::Delivery => &[
                "technical ability",
                "problem solving",
                "client communication",
                "solution delivery",
                "documentation",
                "project management",
            ],
            Self::Support => &[
                "client communication",
                "emotional stability",
                "responsibility",
                "teamwork",
                "problem solving",
                "stress tolerance",
            ],
            Self::HrAdmin => &[
                "communication",
                "responsibility",
                "teamwork",
                "emotional stability",
                "documentation",
                "management",
            ],
            Self::Edu => &[
                "communication",
                "emotional stability",
                "responsibility",
                "learning agility",
                "expression",
                "teamwork",
            ],
            Self::Sales => &[
                "client communication",
                "stress tolerance",
                "execution",
                "communication",
                "leadership",
                "decision making",
            ],
            Self::General => &[
                "communication",
                "execution",
                "learning agility",
                "teamwork",
                "problem solving",
                "stress tolerance",
            ],
        }
    }

    pub fn default_profile(self, job_name: impl Into<String>) -> JobCompetencyProfile {
        JobCompetencyProfile::evenly_weighted(job_name, self.default_competencies())
    }
}
