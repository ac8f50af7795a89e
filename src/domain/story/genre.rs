//! Story Context - 故事类型

use std::fmt;
use std::str::FromStr;

use super::StoryError;

/// 故事类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Comedy,
    Horror,
    Adventure,
    Emotional,
    Thriller,
    Moral,
    Fantasy,
    FairyTale,
    Action,
    Mystery,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Comedy,
        Genre::Horror,
        Genre::Adventure,
        Genre::Emotional,
        Genre::Thriller,
        Genre::Moral,
        Genre::Fantasy,
        Genre::FairyTale,
        Genre::Action,
        Genre::Mystery,
    ];

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            Self::Comedy => "Comedy",
            Self::Horror => "Horror",
            Self::Adventure => "Adventure",
            Self::Emotional => "Emotional",
            Self::Thriller => "Thriller",
            Self::Moral => "Moral",
            Self::Fantasy => "Fantasy",
            Self::FairyTale => "Fairy Tale",
            Self::Action => "Action",
            Self::Mystery => "Mystery",
        }
    }

    /// URL / 表单中使用的标识
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Comedy => "comedy",
            Self::Horror => "horror",
            Self::Adventure => "adventure",
            Self::Emotional => "emotional",
            Self::Thriller => "thriller",
            Self::Moral => "moral",
            Self::Fantasy => "fantasy",
            Self::FairyTale => "fairy-tale",
            Self::Action => "action",
            Self::Mystery => "mystery",
        }
    }

    /// 该类型要求的语气
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Comedy => "light and funny",
            Self::Horror => "spooky and mysterious",
            Self::Adventure => "exciting and bold",
            Self::Emotional => "touching and heartfelt",
            Self::Thriller => "full of suspense",
            Self::Moral => "gives a life lesson",
            Self::Fantasy => "magical and creative",
            Self::FairyTale => "simple and dreamlike",
            Self::Action => "fast and powerful",
            Self::Mystery => "curious and clever",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Genre {
    type Err = StoryError;

    /// 忽略大小写、空格、`-` 与 `_`；同时接受旧界面使用的形容词形式
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "comedy" => Ok(Self::Comedy),
            "horror" => Ok(Self::Horror),
            "adventure" | "adventurous" => Ok(Self::Adventure),
            "emotional" => Ok(Self::Emotional),
            "thriller" => Ok(Self::Thriller),
            "moral" => Ok(Self::Moral),
            "fantasy" => Ok(Self::Fantasy),
            "fairytale" => Ok(Self::FairyTale),
            "action" => Ok(Self::Action),
            "mystery" | "mysterious" => Ok(Self::Mystery),
            _ => Err(StoryError::InvalidGenre(s.to_string())),
        }
    }
}
