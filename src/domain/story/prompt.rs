//! Story Context - 故事生成提示词

use std::fmt;

use super::{Genre, StoryError};

/// 故事最少段落数
pub const MIN_PARAGRAPHS: usize = 7;

/// 目标字数范围
pub const TARGET_WORDS: (usize, usize) = (500, 700);

/// 发送给生成服务的指令文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 根据故事类型构建提示词
///
/// 纯函数：相同 genre 总是得到相同文本。
pub fn build_prompt(genre: Genre) -> Prompt {
    let name = genre.label();
    let (min_words, max_words) = TARGET_WORDS;

    let text = format!(
        "You are a professional and skilled storyteller. Your job is to write a **{name} story** \
using the uploaded images as your inspiration.
Use simple and easy to understand English.

**Instructions:**
1. Look carefully at all the uploaded images. Imagine what could be happening in each one.
2. Write a story that connects all the images **in order**. Each image should feel like one scene in the story.
3. The story must have **at least {paragraphs} clear paragraphs**:
   - **Paragraph 1:** Begin the story. Set the place, time, and main character(s).
   - **Paragraphs 2-5:** Build the story using ideas from each image. Keep the flow natural and smooth.
   - **Paragraph 6:** Add an important or surprising moment (the climax).
   - **Paragraph 7:** End with a meaningful or emotional ending.
4. Match the **tone and feeling** of a {name} story: it should be **{tone}**.
5. Don't describe the images directly. Instead, **turn what you see into a smooth story** that feels natural and human.
6. Write in **simple, clear, and beautiful English** that anyone can enjoy reading.
7. The story should be **{min_words}-{max_words} words** long and **feel complete**.

Now write the full {name} story using these images as inspiration.",
        name = name,
        paragraphs = MIN_PARAGRAPHS,
        tone = genre.tone(),
        min_words = min_words,
        max_words = max_words,
    );

    Prompt(text)
}

/// 解析类型标签并构建提示词
pub fn build_prompt_for_label(label: &str) -> Result<Prompt, StoryError> {
    let genre: Genre = label.parse()?;
    Ok(build_prompt(genre))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        for genre in Genre::ALL {
            assert_eq!(build_prompt(genre), build_prompt(genre));
        }
    }

    #[test]
    fn test_prompt_embeds_genre_and_tone() {
        for genre in Genre::ALL {
            let prompt = build_prompt(genre);
            assert!(prompt.as_str().contains(genre.label()), "{:?}", genre);
            assert!(prompt.as_str().contains(genre.tone()), "{:?}", genre);
        }
    }

    #[test]
    fn test_prompt_only_carries_own_tone() {
        let prompt = build_prompt(Genre::Horror);
        assert!(prompt.as_str().contains("spooky and mysterious"));
        assert!(!prompt.as_str().contains("light and funny"));
    }

    #[test]
    fn test_prompt_structure_contract() {
        let prompt = build_prompt(Genre::Comedy).into_string();
        assert!(prompt.contains("at least 7 clear paragraphs"));
        assert!(prompt.contains("Paragraph 1:"));
        assert!(prompt.contains("climax"));
        assert!(prompt.contains("Paragraph 7:"));
        assert!(prompt.contains("500-700 words"));
        assert!(prompt.contains("Don't describe the images directly"));
        assert!(prompt.contains("**in order**"));
    }

    #[test]
    fn test_build_from_label() {
        let prompt = build_prompt_for_label("fairy tale").unwrap();
        assert_eq!(prompt, build_prompt(Genre::FairyTale));

        assert_eq!(
            build_prompt_for_label("Western"),
            Err(StoryError::InvalidGenre("Western".to_string()))
        );
    }
}
