use crate::engine::SearchServer;
use crate::error::Result;
use crate::index::Document;
use rayon::prelude::*;

/// Run each query's default top-N search in parallel, keeping input order.
/// The first malformed query fails the whole batch.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect()
}

/// [`process_queries`] with the per-query results concatenated.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocumentStatus;

    fn server() -> SearchServer {
        let mut server = SearchServer::new("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in texts.iter().enumerate() {
            server.add_document(id as i32 + 1, text, DocumentStatus::Active, &[1, 2]).unwrap();
        }
        server
    }

    #[test]
    fn keeps_query_order() {
        let server = server();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let results = process_queries(&server, &queries).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 3);
        assert_eq!(results[1].len(), 5);
        assert_eq!(results[2].len(), 2);
        for (query, docs) in queries.iter().zip(&results) {
            assert_eq!(docs, &server.find_top_documents(query).unwrap());
        }
    }

    #[test]
    fn joined_flattens() {
        let server = server();
        let queries = vec!["nasty rat -not".to_string(), "curly hair".to_string()];
        let joined = process_queries_joined(&server, &queries).unwrap();
        assert_eq!(joined.len(), 5);
        let mut tail: Vec<i32> = joined[3..].iter().map(|d| d.id).collect();
        tail.sort_unstable();
        assert_eq!(tail, vec![2, 5]);
    }

    #[test]
    fn malformed_query_fails_batch() {
        let server = server();
        assert!(process_queries(&server, &["rat", "--rat"]).is_err());
    }
}
