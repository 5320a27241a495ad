use serde::{Deserialize, Serialize};

use super::PromptItem;

/// Slug of the synthetic category that matches every prompt
pub const ALL_CATEGORY: &str = "all";

/// A category with the number of prompts in it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// Directory query: both parts are optional and combine with AND
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PromptFilter {
    /// Category slug, `all` or absent keeps every category
    pub category: Option<String>,
    /// Case-insensitive text searched in titles, descriptions and skills
    #[serde(alias = "query")]
    pub q: Option<String>,
}

/// Lowercase the name and replace each whitespace run with a single `-`, leading and
/// trailing runs included
pub fn category_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

/// `All` first, then every category in the order it first appears
pub fn categories(prompts: &[PromptItem]) -> Vec<Category> {
    let mut found: Vec<Category> = Vec::new();
    for prompt in prompts {
        match found.iter_mut().find(|c| c.name == prompt.category) {
            Some(category) => category.count += 1,
            None => found.push(Category {
                id: category_slug(&prompt.category),
                name: prompt.category.clone(),
                count: 1,
            }),
        }
    }

    let mut all = vec![Category {
        id: ALL_CATEGORY.to_string(),
        name: "All".to_string(),
        count: prompts.len(),
    }];
    all.extend(found);
    all
}

pub fn find(prompts: &[PromptItem], id: u32) -> Option<&PromptItem> {
    prompts.iter().find(|prompt| prompt.id == id)
}

pub fn filter<'a>(prompts: &'a [PromptItem], filter: &PromptFilter) -> Vec<&'a PromptItem> {
    let category = filter
        .category
        .as_deref()
        .filter(|slug| *slug != ALL_CATEGORY);
    // Blank queries match everything; others are searched as typed
    let query = filter
        .q
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .map(str::to_lowercase);

    prompts
        .iter()
        .filter(|prompt| category.is_none_or(|slug| category_slug(&prompt.category) == slug))
        .filter(|prompt| query.as_deref().is_none_or(|q| matches_query(prompt, q)))
        .collect()
}

fn matches_query(prompt: &PromptItem, query: &str) -> bool {
    prompt.title.to_lowercase().contains(query)
        || prompt.description.to_lowercase().contains(query)
        || prompt
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::tests::prompt;

    fn sample() -> Vec<PromptItem> {
        let mut coder = prompt(1, "Rust Reviewer", "Software  Development");
        coder.skills = vec!["Code Review".to_string(), "rust".to_string()];
        let mut poet = prompt(2, "Poet", "Writing");
        poet.description = "Writes SONNETS on demand...".to_string();
        let chef = prompt(3, "Chef", "General");
        let mut tester = prompt(4, "Tester", "Software Development");
        tester.skills = vec!["qa".to_string()];
        vec![coder, poet, chef, tester]
    }

    #[test]
    fn slugs_collapse_whitespace() {
        assert_eq!(category_slug("Software  Development"), "software-development");
        assert_eq!(category_slug("AI\tTools"), "ai-tools");
        assert_eq!(category_slug("General"), "general");
    }

    #[test]
    fn slugs_keep_outer_whitespace_runs() {
        assert_eq!(category_slug(" Dev Ops "), "-dev-ops-");
        assert_eq!(category_slug("\t\nData\n"), "-data-");
        assert_eq!(category_slug(""), "");
    }

    #[test]
    fn padded_category_matches_its_own_slug() {
        let prompts = vec![prompt(1, "Ops", " Dev Ops "), prompt(2, "Dev", "Dev Ops")];
        let query = PromptFilter {
            category: Some("-dev-ops-".to_string()),
            q: None,
        };
        let ids: Vec<u32> = filter(&prompts, &query).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(categories(&prompts)[1].id, "-dev-ops-");
    }

    #[test]
    fn categories_start_with_all_and_count() {
        let prompts = sample();
        let categories = categories(&prompts);

        assert_eq!(categories[0].id, "all");
        assert_eq!(categories[0].count, 4);

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["All", "Software  Development", "Writing", "General", "Software Development"]
        );
        assert!(categories.iter().skip(1).all(|c| c.count == 1));
    }

    #[test]
    fn categories_of_empty_collection() {
        let categories = categories(&[]);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].count, 0);
    }

    #[test]
    fn filters_by_category_slug() {
        let prompts = sample();
        let query = PromptFilter {
            category: Some("software-development".to_string()),
            q: None,
        };
        let ids: Vec<u32> = filter(&prompts, &query).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn all_category_keeps_everything() {
        let prompts = sample();
        let query = PromptFilter {
            category: Some("all".to_string()),
            q: Some("   ".to_string()),
        };
        assert_eq!(filter(&prompts, &query).len(), 4);
        assert_eq!(filter(&prompts, &PromptFilter::default()).len(), 4);
    }

    #[test]
    fn searches_title_description_and_skills() {
        let prompts = sample();
        let search = |q: &str| -> Vec<u32> {
            let query = PromptFilter {
                category: None,
                q: Some(q.to_string()),
            };
            filter(&prompts, &query).iter().map(|p| p.id).collect()
        };

        assert_eq!(search("CHEF"), vec![3]);
        assert_eq!(search("sonnets"), vec![2]);
        assert_eq!(search("code review"), vec![1]);
        assert!(search("nothing matches").is_empty());
    }

    #[test]
    fn query_is_searched_untrimmed() {
        let prompts = sample();
        let search = |q: &str| -> Vec<u32> {
            let query = PromptFilter {
                category: None,
                q: Some(q.to_string()),
            };
            filter(&prompts, &query).iter().map(|p| p.id).collect()
        };

        assert_eq!(search("chef"), vec![3]);
        // "Poet" is never followed by a space
        assert!(search("poet ").is_empty());
        assert_eq!(search(" reviewer"), vec![1]);
    }

    #[test]
    fn category_and_query_combine() {
        let prompts = sample();
        let query = PromptFilter {
            category: Some("software-development".to_string()),
            q: Some("qa".to_string()),
        };
        let ids: Vec<u32> = filter(&prompts, &query).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn finds_by_id() {
        let prompts = sample();
        assert_eq!(find(&prompts, 2).map(|p| p.title.as_str()), Some("Poet"));
        assert!(find(&prompts, 99).is_none());
    }
}
