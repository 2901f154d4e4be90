use network::graph::ArticleGraph;
use network::metrics::{
    article_hubs, average_degree, category_hubs, category_overlap, network_report,
    smallest_degree, MetricsError,
};
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap};

fn sample_articles() -> ArticleMap {
    let mut map = ArticleMap::new();
    for (id, name) in [("1", "A"), ("2", "B"), ("3", "C"), ("4", "D")] {
        map.insert(id, name);
    }
    map
}

fn sample_graph() -> ArticleGraph {
    // 1 -> 2, 2 -> 3, 4 -> 2: node 2 is the hub with total degree 3.
    let edges = vec![
        ("1".to_string(), "2".to_string()),
        ("2".to_string(), "3".to_string()),
        ("4".to_string(), "2".to_string()),
    ];
    ArticleGraph::from_edges(&edges, &sample_articles(), &CategoryMap::new()).unwrap()
}

#[test]
fn article_hubs_sort_by_non_increasing_degree() {
    let graph = sample_graph();
    let hubs = article_hubs(&graph);

    assert_eq!(hubs.len(), graph.node_count());
    assert_eq!(hubs[0], ("2".to_string(), 3));
    for pair in hubs.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }

    let degree_sum: usize = hubs.iter().map(|(_, d)| d).sum();
    assert_eq!(degree_sum, 2 * graph.edge_count());
}

#[test]
fn smallest_degree_is_the_ascending_ordering() {
    let graph = sample_graph();
    let ascending = smallest_degree(&graph);

    for pair in ascending.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
    assert_eq!(ascending.last().unwrap(), &("2".to_string(), 3));
}

#[test]
fn degree_ties_keep_graph_iteration_order() {
    let graph = sample_graph();
    let hubs = article_hubs(&graph);

    // Nodes 1, 3, 4 all have degree 1; they must appear in
    // first-appearance order (1 before 3 before 4).
    let tied: Vec<&str> = hubs
        .iter()
        .filter(|(_, d)| *d == 1)
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(tied, vec!["1", "3", "4"]);
}

#[test]
fn two_node_scenario_ranks_middle_node_first() {
    let edges = vec![
        ("1".to_string(), "2".to_string()),
        ("2".to_string(), "3".to_string()),
    ];
    let graph = ArticleGraph::from_edges(&edges, &sample_articles(), &CategoryMap::new()).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(article_hubs(&graph)[0], ("2".to_string(), 2));
}

#[test]
fn category_hubs_rank_by_member_count() {
    let mut categories = CategoryMap::new();
    categories.insert("Small", vec!["1".to_string()]);
    categories.insert(
        "Large",
        vec!["1".to_string(), "2".to_string(), "3".to_string()],
    );
    categories.insert("Medium", vec!["1".to_string(), "2".to_string()]);

    let hubs = category_hubs(&categories);
    assert_eq!(hubs.len(), 3);
    assert_eq!(
        hubs,
        vec![
            ("Large".to_string(), 3),
            ("Medium".to_string(), 2),
            ("Small".to_string(), 1),
        ]
    );
}

#[test]
fn overlap_is_a_substring_test_on_labels() {
    let mut categories = CategoryMap::new();
    categories.insert("Base", vec!["7".to_string(), "42".to_string()]);
    categories.insert("Group_42", vec!["1".to_string()]);
    categories.insert("Version_7_things", vec!["2".to_string()]);
    categories.insert("Unrelated", vec!["3".to_string()]);

    let overlap = category_overlap(&categories, "Base").unwrap();
    let found: Vec<&str> = overlap.iter().map(String::as_str).collect();
    assert_eq!(found, vec!["Group_42", "Version_7_things"]);
}

#[test]
fn overlap_of_unknown_category_is_not_found() {
    let categories = CategoryMap::new();
    let err = category_overlap(&categories, "Nope").unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::NotFound);
    assert!(matches!(err, MetricsError::UnknownCategory { .. }));
}

#[test]
fn average_degree_counts_both_directions() {
    let graph = sample_graph();
    // 3 edges over 4 nodes, each edge contributing twice.
    assert!((average_degree(&graph).unwrap() - 1.5).abs() < 1e-12);
}

#[test]
fn metrics_on_empty_graph_fail_fast() {
    let graph = ArticleGraph::new();
    let err = average_degree(&graph).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::EmptyGraph);

    let err = network_report(&graph, &CategoryMap::new(), None).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::EmptyGraph);
}

#[test]
fn report_truncates_hub_lists_and_keeps_full_ascending_list() {
    let mut edges = Vec::new();
    for i in 2..=10 {
        edges.push(("1".to_string(), i.to_string()));
    }
    let mut articles = ArticleMap::new();
    for i in 1..=10 {
        articles.insert(i.to_string(), format!("Article {i}"));
    }
    let mut categories = CategoryMap::new();
    for i in 1..=5 {
        let members = (1..=i).map(|m| m.to_string()).collect();
        categories.insert(format!("Cat_{i}"), members);
    }

    let graph = ArticleGraph::from_edges(&edges, &articles, &CategoryMap::new()).unwrap();
    let report = network_report(&graph, &categories, None).unwrap();

    assert_eq!(report.article_hubs.len(), 5);
    assert_eq!(report.article_hubs[0], ("1".to_string(), 9));
    assert_eq!(report.smallest_degree.len(), 10);
    assert_eq!(report.category_hubs.len(), 3);
    assert_eq!(report.category_hubs[0], ("Cat_5".to_string(), 5));
    assert!(report.overlap.is_none());
}

#[test]
fn report_overlap_always_targets_living_people() {
    let edges = vec![("1".to_string(), "2".to_string())];
    let mut articles = ArticleMap::new();
    articles.insert("1", "A");
    articles.insert("2", "B");

    let mut categories = CategoryMap::new();
    categories.insert("Living_people", vec!["9".to_string()]);
    categories.insert("Room_9", vec!["1".to_string()]);
    // Members of the requested category would match this label, but the
    // request is ignored.
    categories.insert("AnyValue", vec!["8".to_string()]);
    categories.insert("Unit_8", vec!["2".to_string()]);

    let graph = ArticleGraph::from_edges(&edges, &articles, &categories).unwrap();
    let report = network_report(&graph, &categories, Some("AnyValue")).unwrap();

    let overlap = report.overlap.unwrap();
    assert!(overlap.contains("Room_9"));
    assert!(!overlap.contains("Unit_8"));
}
