/// Instruction template sent to the generative backend.
///
/// It asks for a single JSON object with `title`, `ingredients` and
/// `instructions` plus the optional recipe fields, omitting anything not found.
/// Loaded from `prompt.txt` at compile time.
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

/// Build the full single-turn prompt for a page digest.
pub fn build_extraction_prompt(digest: &str) -> String {
    format!("{}\nContent:\n{}", RECIPE_EXTRACTION_PROMPT.trim_end(), digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECIPE_EXTRACTION_PROMPT.is_empty());
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"ingredients\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"instructions\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("omit it entirely"));
    }

    #[test]
    fn test_digest_is_appended() {
        let prompt = build_extraction_prompt("## Pancakes\n- 1 cup milk");
        assert!(prompt.starts_with("Extract recipe information"));
        assert!(prompt.ends_with("Content:\n## Pancakes\n- 1 cup milk"));
    }
}
