//! Prompt construction for commit message generation.

/// Conventional Commit types embedded in every prompt, with one-line
/// descriptions.
const COMMIT_TYPES: [(&str, &str); 11] = [
    ("feat", "a new feature"),
    ("fix", "a bug fix"),
    ("docs", "documentation only changes"),
    ("style", "changes that do not affect the meaning of the code"),
    ("refactor", "a code change that neither fixes a bug nor adds a feature"),
    ("perf", "a code change that improves performance"),
    ("test", "adding missing tests or correcting existing tests"),
    ("build", "changes that affect the build system or external dependencies"),
    ("ci", "changes to CI configuration files and scripts"),
    ("chore", "other changes that don't modify src or test files"),
    ("revert", "reverts a previous commit"),
];

/// Build the instruction prompt sent to any backend.
///
/// Deterministic: identical inputs always produce an identical string. When
/// commitlint rules are supplied they are appended verbatim, preceded by an
/// instruction to treat them as mandatory.
pub fn build_prompt(max_length: u32, commitlint_rules: Option<&str>) -> String {
    let types_section: String = COMMIT_TYPES
        .iter()
        .map(|(name, description)| format!("- {name}: {description}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        r#"You are generating a Git commit message for the staged diff provided by the user.

## Commit Types
Use exactly one of the following types:
{types_section}

## Rules
- Output format: `<type>(<optional scope>): <message>`
- The message is written in imperative mood, lowercase after the colon
- HARD LIMIT: the entire message must be at most {max_length} characters
- Respond with the commit message only: no explanation, no markdown, no quotes"#
    );

    if let Some(rules) = commitlint_rules {
        prompt.push_str(
            "\n\n## Commitlint Rules\nThe following commitlint rules are mandatory. \
             Follow them exactly, in particular the subject-case and type-enum constraints:\n",
        );
        prompt.push_str(rules);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_is_deterministic() {
        assert_eq!(build_prompt(50, None), build_prompt(50, None));
        assert_eq!(
            build_prompt(72, Some("type-enum: [feat, fix]")),
            build_prompt(72, Some("type-enum: [feat, fix]"))
        );
    }

    #[test]
    fn test_build_prompt_embeds_length_limit() {
        assert!(build_prompt(72, None).contains("72"));
        assert!(build_prompt(50, None).contains("50"));
    }

    #[test]
    fn test_build_prompt_lists_all_commit_types() {
        let prompt = build_prompt(72, None);
        for (name, _) in COMMIT_TYPES {
            assert!(prompt.contains(&format!("- {name}:")), "missing type {name}");
        }
    }

    #[test]
    fn test_build_prompt_contains_output_format() {
        let prompt = build_prompt(72, None);
        assert!(prompt.contains("<type>(<optional scope>): <message>"));
    }

    #[test]
    fn test_rules_appended_verbatim_and_lengthen_prompt() {
        let rules = "subject-case: [lower-case]\ntype-enum: [feat, fix]";
        let with_rules = build_prompt(50, Some(rules));
        let without = build_prompt(50, None);

        assert!(with_rules.len() > without.len());
        assert!(with_rules.contains(rules));
        assert!(with_rules.contains("mandatory"));
        assert!(with_rules.contains("subject-case"));
        assert!(with_rules.contains("type-enum"));
    }
}
