use search_core::{
    DocumentFilter, DocumentStatus, EngineConfig, ExecutionPolicy, SearchError, SearchServer,
};

fn pet_server() -> SearchServer {
    let mut server = SearchServer::new("and").unwrap();
    server.add_document(0, "white cat and fashionable collar", DocumentStatus::Active, &[8, -3]).unwrap();
    server.add_document(1, "fluffy cat fluffy tail", DocumentStatus::Active, &[7, 2, 7]).unwrap();
    server.add_document(2, "well groomed dog expressive eyes", DocumentStatus::Active, &[5, -12, 2, 1]).unwrap();
    server.add_document(3, "well groomed starling eugene", DocumentStatus::Banned, &[9]).unwrap();
    server
}

fn ids(docs: &[search_core::Document]) -> Vec<i32> {
    docs.iter().map(|d| d.id).collect()
}

#[test]
fn default_filter_ranks_active_documents() {
    let server = pet_server();
    let docs = server.find_top_documents("fluffy well groomed cat").unwrap();
    assert_eq!(ids(&docs), vec![1, 2, 0]);
    assert!(docs.windows(2).all(|w| w[0].relevance >= w[1].relevance));
}

#[test]
fn status_and_predicate_filters() {
    let server = pet_server();
    let banned = server
        .find_top_documents_by_status("fluffy well groomed cat", DocumentStatus::Banned)
        .unwrap();
    assert_eq!(ids(&banned), vec![3]);

    let even = DocumentFilter::custom(|id, _, _| id % 2 == 0);
    let docs = server.find_top_documents_with("fluffy well groomed cat", &even).unwrap();
    assert_eq!(ids(&docs), vec![2, 0]);
}

#[test]
fn stop_words_never_score() {
    let server = pet_server();
    assert!(server.find_top_documents("and").unwrap().is_empty());
    assert!(server.word_frequencies(0).keys().all(|w| w != "and"));
    // "-and" is a stop word too, so doc 0 is not excluded
    let docs = server.find_top_documents("cat -and").unwrap();
    assert_eq!(ids(&docs), vec![1, 0]);
}

#[test]
fn stop_words_ignored_when_indexing() {
    let mut server = SearchServer::new("in the").unwrap();
    server.add_document(42, "cat in the city", DocumentStatus::Active, &[1, 2, 3]).unwrap();
    assert!(server.find_top_documents("in").unwrap().is_empty());

    let mut open = SearchServer::new(" ").unwrap();
    open.add_document(42, "cat in the city", DocumentStatus::Active, &[1, 2, 3]).unwrap();
    assert_eq!(ids(&open.find_top_documents("in").unwrap()), vec![42]);
}

#[test]
fn minus_words_exclude_documents() {
    let server = pet_server();
    let docs = server.find_top_documents("fluffy well groomed cat -tail").unwrap();
    assert_eq!(ids(&docs), vec![2, 0]);
    // a document holding every plus word still drops out
    let docs = server.find_top_documents("fluffy cat tail -fluffy").unwrap();
    assert!(!ids(&docs).contains(&1));
}

#[test]
fn results_capped_at_five() {
    let mut server = SearchServer::new("").unwrap();
    for id in 0..12 {
        server.add_document(id, &format!("common word{id}"), DocumentStatus::Active, &[id]).unwrap();
    }
    let docs = server.find_top_documents("common").unwrap();
    assert_eq!(docs.len(), 5);
    // equal relevance everywhere, so highest ratings come first
    assert_eq!(ids(&docs), vec![11, 10, 9, 8, 7]);
}

#[test]
fn equal_relevance_sorted_by_rating() {
    let mut server = SearchServer::new("").unwrap();
    server.add_document(1, "cat dog", DocumentStatus::Active, &[1]).unwrap();
    server.add_document(2, "cat bird", DocumentStatus::Active, &[9]).unwrap();
    server.add_document(3, "fish", DocumentStatus::Active, &[]).unwrap();
    let docs = server.find_top_documents("cat").unwrap();
    assert_eq!(ids(&docs), vec![2, 1]);
    assert!((docs[0].relevance - docs[1].relevance).abs() < 1e-6);
}

#[test]
fn invalid_documents_rejected() {
    let mut server = SearchServer::new("").unwrap();
    assert!(matches!(
        server.add_document(-1, "a", DocumentStatus::Active, &[]),
        Err(SearchError::InvalidInput(_))
    ));
    server.add_document(5, "a", DocumentStatus::Active, &[]).unwrap();
    assert!(matches!(
        server.add_document(5, "a", DocumentStatus::Active, &[]),
        Err(SearchError::InvalidInput(_))
    ));
    assert!(matches!(
        server.add_document(6, "bad\u{1f}word", DocumentStatus::Active, &[]),
        Err(SearchError::InvalidInput(_))
    ));
    assert_eq!(server.document_count(), 1);
    assert_eq!(server.ids().collect::<Vec<_>>(), vec![5]);
}

#[test]
fn malformed_queries_rejected() {
    let server = pet_server();
    for query in ["fluffy --cat", "fluffy -", "cat\u{3}"] {
        assert!(
            matches!(server.find_top_documents(query), Err(SearchError::InvalidInput(_))),
            "{query:?} should be rejected"
        );
        assert!(server.match_document(query, 1).is_err());
    }
}

#[test]
fn match_document_contract() {
    let mut server = SearchServer::new("is are was a an in the with near").unwrap();
    server
        .add_document(1, "a colorful parrot with green wings and red tail is lost", DocumentStatus::Active, &[1, 2, 3])
        .unwrap();

    let (words, status) = server.match_document("white cat -long tail tail", 1).unwrap();
    assert_eq!(words, vec!["tail"]);
    assert_eq!(status, DocumentStatus::Active);

    let (words, status) = server.match_document("white cat -long -tail", 1).unwrap();
    assert!(words.is_empty());
    assert_eq!(status, DocumentStatus::Active);

    assert_eq!(server.match_document("tail", 99), Err(SearchError::NotFound(99)));

    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let (words, _) = server.match_document_policy(policy, "wings parrot green red", 1).unwrap();
        assert_eq!(words, vec!["green", "parrot", "red", "wings"]);
    }
}

#[test]
fn remove_document_clears_everything() {
    let mut server = pet_server();
    server.remove_document(1);
    assert!(server.word_frequencies(1).is_empty());
    assert!(!server.ids().any(|id| id == 1));
    assert_eq!(server.document_count(), 3);
    assert!(server.find_top_documents("fluffy").unwrap().is_empty());
    assert!(server.inverse_document_frequency("fluffy").is_none());
    assert_eq!(server.match_document("cat", 1), Err(SearchError::NotFound(1)));

    server.remove_document(1);
    server.remove_document(1000);
    assert_eq!(server.document_count(), 3);
}

#[test]
fn word_frequencies_sum_to_one() {
    let server = pet_server();
    for id in server.ids() {
        let total: f64 = server.word_frequencies(id).values().sum();
        assert!((total - 1.0).abs() < 1e-9, "doc {id} sums to {total}");
    }
    assert!(server.word_frequencies(77).is_empty());
}

fn large_server(config: EngineConfig) -> SearchServer {
    let words = [
        "cat", "dog", "bird", "fish", "tail", "collar", "fluffy", "groomed", "white", "black",
        "red", "green", "eyes", "nose", "paws", "fur",
    ];
    let mut server = SearchServer::with_config(["and", "with"], config).unwrap();
    let mut seed: u64 = 7;
    for id in 0..400 {
        let text: Vec<&str> = (0..8)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                words[(seed >> 33) as usize % words.len()]
            })
            .collect();
        let status = if id % 7 == 0 { DocumentStatus::Irrelevant } else { DocumentStatus::Active };
        server.add_document(id, &text.join(" "), status, &[id % 11, 3]).unwrap();
    }
    server
}

#[test]
fn sequential_and_parallel_agree() {
    let server = large_server(EngineConfig::default().with_shard_count(8));
    let queries = [
        "cat dog -fish",
        "fluffy groomed white black red",
        "tail -collar -nose",
        "eyes nose paws fur with",
        "bird",
    ];
    let filters = [
        DocumentFilter::default(),
        DocumentFilter::All,
        DocumentFilter::custom(|id, _, rating| id % 3 == 0 && rating > 2),
    ];
    for query in queries {
        for filter in &filters {
            let seq = server
                .find_top_documents_policy(ExecutionPolicy::Sequential, query, filter)
                .unwrap();
            let par = server
                .find_top_documents_policy(ExecutionPolicy::Parallel, query, filter)
                .unwrap();
            assert_eq!(seq.len(), par.len(), "{query}");
            assert_eq!(ids(&seq), ids(&par), "{query}");
            for (s, p) in seq.iter().zip(&par) {
                assert!((s.relevance - p.relevance).abs() < 1e-6, "{query}: {s} vs {p}");
            }
        }
    }
}

#[test]
fn shard_count_does_not_change_results() {
    let one = large_server(EngineConfig::default().with_shard_count(1));
    let many = large_server(EngineConfig::default().with_shard_count(13).with_worker_threads(4));
    let query = "cat fluffy -green";
    let a = one.find_top_documents_policy(ExecutionPolicy::Parallel, query, &DocumentFilter::All).unwrap();
    let b = many.find_top_documents_policy(ExecutionPolicy::Parallel, query, &DocumentFilter::All).unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(ids(&a), ids(&b));
    for (x, y) in a.iter().zip(&b) {
        assert!((x.relevance - y.relevance).abs() < 1e-6);
    }
}

#[test]
fn concurrent_queries_on_shared_server() {
    let server = large_server(EngineConfig::default());
    let expected = server.find_top_documents("cat dog -fish").unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..20 {
                    let docs = server
                        .find_top_documents_policy(ExecutionPolicy::Parallel, "cat dog -fish", &DocumentFilter::default())
                        .unwrap();
                    assert_eq!(docs.len(), expected.len());
                }
            });
        }
    });
}
