//! Competency → instrument-dimension mapping rules.
//!
//! A `MappingTable` is loaded once at startup, from the built-in rule set or a
//! JSON file, and is never mutated afterwards. Rules live in an arena; the
//! name index resolves canonical names and aliases case-insensitively.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::InstrumentType;
use crate::assessment::InstrumentType::{Disc, Epq, Mbti};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("competency '{0}' has no mapping factors")]
    NoFactors(String),

    #[error("competency '{name}' has a factor weight {weight} outside (0, 1]")]
    WeightOutOfRange { name: String, weight: f64 },

    #[error("competency name or alias '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("failed to read mapping file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mapping JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One weighted contribution of an instrument dimension to a competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingFactor {
    pub instrument: InstrumentType,
    /// MBTI codes are directional: `F-T` reads the F share.
    pub dimension: String,
    pub weight: f64,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyMappingRule {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub factors: Vec<MappingFactor>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    rules: Vec<CompetencyMappingRule>,
    index: HashMap<String, usize>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl MappingTable {
    pub fn new(rules: Vec<CompetencyMappingRule>) -> Result<Self, MappingError> {
        let mut index = HashMap::new();
        for (slot, rule) in rules.iter().enumerate() {
            if rule.factors.is_empty() {
                return Err(MappingError::NoFactors(rule.name.clone()));
            }
            if let Some(bad) = rule
                .factors
                .iter()
                .find(|f| !(f.weight > 0.0 && f.weight <= 1.0))
            {
                return Err(MappingError::WeightOutOfRange {
                    name: rule.name.clone(),
                    weight: bad.weight,
                });
            }
            for name in std::iter::once(&rule.name).chain(&rule.aliases) {
                if index.insert(normalize_name(name), slot).is_some() {
                    return Err(MappingError::DuplicateName(name.clone()));
                }
            }
        }
        Ok(Self { rules, index })
    }

    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let rules: Vec<CompetencyMappingRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let json = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The rule set shipped with the service.
    pub fn builtin() -> Result<Self, MappingError> {
        let rules = BUILTIN_RULES
            .iter()
            .map(|rule| CompetencyMappingRule {
                name: rule.name.to_string(),
                aliases: rule.aliases.iter().map(|a| a.to_string()).collect(),
                factors: rule
                    .factors
                    .iter()
                    .map(|&(instrument, dimension, weight, reversed)| MappingFactor {
                        instrument,
                        dimension: dimension.to_string(),
                        weight,
                        reversed,
                    })
                    .collect(),
            })
            .collect();
        Self::new(rules)
    }

    /// Looks up a competency by canonical name or alias.
    pub fn rule(&self, competency: &str) -> Option<&CompetencyMappingRule> {
        self.index
            .get(&normalize_name(competency))
            .map(|&slot| &self.rules[slot])
    }

    pub fn rules(&self) -> &[CompetencyMappingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rule set
// ────────────────────────────────────────────────────────────────────────────

type Factor = (InstrumentType, &'static str, f64, bool);

struct BuiltinRule {
    name: &'static str,
    aliases: &'static [&'static str],
    factors: &'static [Factor],
}

const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        name: "logical thinking",
        aliases: &["逻辑思维", "逻辑思维能力"],
        factors: &[(Mbti, "T-F", 0.7, false), (Disc, "C", 0.3, false)],
    },
    BuiltinRule {
        name: "analysis",
        aliases: &["分析能力"],
        factors: &[(Mbti, "T-F", 0.6, false), (Mbti, "N-S", 0.2, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "data analysis",
        aliases: &["数据分析", "数据分析能力"],
        factors: &[(Mbti, "T-F", 0.5, false), (Mbti, "N-S", 0.3, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "communication",
        aliases: &["沟通能力", "沟通表达", "沟通表达能力"],
        factors: &[(Mbti, "E-I", 0.4, false), (Disc, "I", 0.6, false)],
    },
    BuiltinRule {
        name: "expression",
        aliases: &["表达能力"],
        factors: &[(Mbti, "E-I", 0.5, false), (Disc, "I", 0.5, false)],
    },
    BuiltinRule {
        name: "client communication",
        aliases: &["客户沟通", "客户沟通能力"],
        factors: &[(Mbti, "E-I", 0.3, false), (Disc, "I", 0.5, false), (Disc, "S", 0.2, false)],
    },
    BuiltinRule {
        name: "teamwork",
        aliases: &["团队协作", "团队协作能力", "协作能力"],
        factors: &[(Mbti, "F-T", 0.5, false), (Disc, "S", 0.5, false)],
    },
    BuiltinRule {
        name: "cross-functional collaboration",
        aliases: &["跨部门协作"],
        factors: &[
            (Mbti, "F-T", 0.4, false),
            (Mbti, "E-I", 0.2, false),
            (Disc, "I", 0.2, false),
            (Disc, "S", 0.2, false),
        ],
    },
    BuiltinRule {
        name: "execution",
        aliases: &["执行能力", "执行落地", "执行落地能力", "执行力"],
        factors: &[(Mbti, "J-P", 0.4, false), (Disc, "D", 0.6, false)],
    },
    BuiltinRule {
        name: "solution delivery",
        aliases: &["方案交付", "方案交付能力"],
        factors: &[(Mbti, "J-P", 0.5, false), (Disc, "D", 0.3, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "emotional stability",
        aliases: &["情绪稳定", "情绪稳定性"],
        factors: &[(Epq, "N", 1.0, true)],
    },
    BuiltinRule {
        name: "stress tolerance",
        aliases: &["抗压能力", "压力管理"],
        factors: &[(Epq, "N", 0.7, true), (Disc, "D", 0.3, false)],
    },
    BuiltinRule {
        name: "responsibility",
        aliases: &["责任心", "责任感"],
        factors: &[(Disc, "C", 0.6, false), (Epq, "P", 0.4, true)],
    },
    BuiltinRule {
        name: "learning agility",
        aliases: &["学习能力", "学习适应", "学习适应能力", "适应能力"],
        factors: &[(Mbti, "N-S", 0.5, false), (Epq, "E", 0.3, false), (Disc, "I", 0.2, false)],
    },
    BuiltinRule {
        name: "innovation",
        aliases: &["创新能力", "创新思维"],
        factors: &[(Mbti, "N-S", 0.6, false), (Mbti, "P-J", 0.4, false)],
    },
    BuiltinRule {
        name: "leadership",
        aliases: &["领导力"],
        factors: &[(Disc, "D", 0.5, false), (Mbti, "E-I", 0.3, false), (Disc, "I", 0.2, false)],
    },
    BuiltinRule {
        name: "management",
        aliases: &["管理能力"],
        factors: &[(Disc, "D", 0.5, false), (Mbti, "J-P", 0.3, false), (Mbti, "T-F", 0.2, false)],
    },
    BuiltinRule {
        name: "decision making",
        aliases: &["决策能力", "决策判断", "决策判断力"],
        factors: &[(Mbti, "T-F", 0.5, false), (Mbti, "J-P", 0.3, false), (Disc, "D", 0.2, false)],
    },
    BuiltinRule {
        name: "technical ability",
        aliases: &["技术能力", "技术理解", "技术理解能力"],
        factors: &[(Mbti, "T-F", 0.6, false), (Mbti, "N-S", 0.2, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "programming",
        aliases: &["编程能力"],
        factors: &[(Mbti, "T-F", 0.5, false), (Mbti, "N-S", 0.3, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "system design",
        aliases: &["系统设计", "系统设计能力"],
        factors: &[(Mbti, "N-S", 0.5, false), (Mbti, "T-F", 0.4, false), (Disc, "C", 0.1, false)],
    },
    BuiltinRule {
        name: "product planning",
        aliases: &["产品规划", "产品规划能力"],
        factors: &[(Mbti, "N-S", 0.5, false), (Mbti, "J-P", 0.3, false), (Disc, "D", 0.2, false)],
    },
    BuiltinRule {
        name: "user insight",
        aliases: &["用户洞察", "用户洞察力"],
        factors: &[(Mbti, "N-S", 0.4, false), (Mbti, "F-T", 0.3, false), (Disc, "I", 0.3, false)],
    },
    BuiltinRule {
        name: "requirements analysis",
        aliases: &["需求分析", "需求分析能力"],
        factors: &[(Mbti, "T-F", 0.5, false), (Mbti, "N-S", 0.3, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "problem solving",
        aliases: &["问题解决", "问题解决能力"],
        factors: &[(Mbti, "T-F", 0.5, false), (Mbti, "N-S", 0.3, false), (Disc, "D", 0.2, false)],
    },
    BuiltinRule {
        name: "documentation",
        aliases: &["文档编写", "文档编写能力"],
        factors: &[(Mbti, "J-P", 0.5, false), (Disc, "C", 0.5, false)],
    },
    BuiltinRule {
        name: "project management",
        aliases: &["项目管理", "项目管理能力"],
        factors: &[(Mbti, "J-P", 0.4, false), (Disc, "D", 0.4, false), (Disc, "C", 0.2, false)],
    },
    BuiltinRule {
        name: "code quality",
        aliases: &["代码质量", "代码质量意识"],
        factors: &[(Disc, "C", 0.6, false), (Mbti, "J-P", 0.4, false)],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = MappingTable::builtin().unwrap();
        assert_eq!(table.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_lookup_by_name_and_alias() {
        let table = MappingTable::builtin().unwrap();
        let by_name = table.rule("Emotional Stability").unwrap();
        let by_alias = table.rule("情绪稳定性").unwrap();
        assert_eq!(by_name, by_alias);
        assert!(by_name.factors[0].reversed);
        assert!(table.rule("juggling").is_none());
    }

    #[test]
    fn test_from_json_accepts_lowercase_instruments() {
        let json = r#"[
            {"name": "grit", "factors": [
                {"instrument": "epq", "dimension": "N", "weight": 0.5, "reversed": true},
                {"instrument": "DISC", "dimension": "D", "weight": 0.5}
            ]}
        ]"#;
        let table = MappingTable::from_json(json).unwrap();
        let rule = table.rule("GRIT").unwrap();
        assert_eq!(rule.factors[1].instrument, InstrumentType::Disc);
        assert!(!rule.factors[1].reversed);
    }

    #[test]
    fn test_rejects_rule_without_factors() {
        let json = r#"[{"name": "empty", "factors": []}]"#;
        assert!(matches!(
            MappingTable::from_json(json),
            Err(MappingError::NoFactors(name)) if name == "empty"
        ));
    }

    #[test]
    fn test_rejects_weight_out_of_range() {
        let json = r#"[{"name": "heavy", "factors": [
            {"instrument": "MBTI", "dimension": "E-I", "weight": 1.5}
        ]}]"#;
        assert!(matches!(
            MappingTable::from_json(json),
            Err(MappingError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let json = r#"[
            {"name": "a", "aliases": ["shared"], "factors": [{"instrument": "DISC", "dimension": "D", "weight": 1.0}]},
            {"name": "b", "aliases": ["Shared"], "factors": [{"instrument": "DISC", "dimension": "I", "weight": 1.0}]}
        ]"#;
        assert!(matches!(
            MappingTable::from_json(json),
            Err(MappingError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = MappingTable::load(Path::new("/nonexistent/mapping.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mapping.json"));
    }
}
