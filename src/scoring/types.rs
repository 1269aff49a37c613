//! Score categories, per-category scores and the grade table

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six scored areas of an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crawlability,
    Performance,
    Security,
    Mobile,
    ContentQuality,
    Indexability,
}

impl Category {
    /// All categories in reporting order
    pub const ALL: [Category; 6] = [
        Category::Crawlability,
        Category::Performance,
        Category::Security,
        Category::Mobile,
        Category::ContentQuality,
        Category::Indexability,
    ];

    /// Weight of the category in the overall score; the weights sum to 1
    pub fn weight(&self) -> f64 {
        match self {
            Self::Crawlability => 0.20,
            Self::Performance => 0.25,
            Self::Security => 0.15,
            Self::Mobile => 0.15,
            Self::ContentQuality => 0.15,
            Self::Indexability => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawlability => "crawlability",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Mobile => "mobile",
            Self::ContentQuality => "content_quality",
            Self::Indexability => "indexability",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score of every category, each in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub crawlability: f64,
    pub performance: f64,
    pub security: f64,
    pub mobile: f64,
    pub content_quality: f64,
    pub indexability: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Crawlability => self.crawlability,
            Category::Performance => self.performance,
            Category::Security => self.security,
            Category::Mobile => self.mobile,
            Category::ContentQuality => self.content_quality,
            Category::Indexability => self.indexability,
        }
    }

    /// Scores paired with their category, in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Weighted sum of all categories
    pub fn weighted_total(&self) -> f64 {
        self.iter().map(|(c, score)| score * c.weight()).sum()
    }
}

/// Letter grade derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps a score to its grade: ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Parses a stored grade letter
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
