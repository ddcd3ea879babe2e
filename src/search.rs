//! Package index search and result rendering.

use anyhow::Result;

use crate::aur::{SearchIndex, SearchResult};

#[tracing::instrument(skip(index))]
pub async fn search<S: SearchIndex>(index: &S, query: &str) -> Result<()> {
    let results = index.search(query).await?;
    if results.is_empty() {
        println!("No packages matching '{}'", query);
        return Ok(());
    }
    for result in &results {
        println!("{}", render_result(result));
    }
    Ok(())
}

fn render_result(result: &SearchResult) -> String {
    let description = result.description.as_deref().unwrap_or("(no description)");
    format!(
        "{} {} ({} votes)\n    {}",
        result.name, result.version, result.num_votes, description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_result() {
        let result = SearchResult {
            name: "foo-bin".to_string(),
            version: "1.0-1".to_string(),
            num_votes: 12,
            description: Some("Foo, prebuilt".to_string()),
        };
        assert_eq!(
            render_result(&result),
            "foo-bin 1.0-1 (12 votes)\n    Foo, prebuilt"
        );
    }

    #[test]
    fn test_render_result_without_description() {
        let result = SearchResult {
            name: "bar".to_string(),
            version: "2.3-1".to_string(),
            num_votes: 0,
            description: None,
        };
        assert!(render_result(&result).contains("(no description)"));
    }

    #[tokio::test]
    async fn test_search_propagates_index_errors() {
        use crate::aur::MockSearchIndex;

        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .returning(|_| Err(anyhow::anyhow!("index unreachable")));

        assert!(search(&index, "foo").await.is_err());
    }
}
