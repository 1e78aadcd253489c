use chess::{PieceColor, STARTING_FEN};

use super::{Database, SqliteGraphRepository};
use crate::persistence::traits::{GraphRepository, RepertoireRepository};
use crate::types::{NewRepertoire, RepertoireId};

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const AFTER_E4_C5: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
const AFTER_D4: &str = "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1";

async fn create(db: &Database, name: &str, color: PieceColor) -> RepertoireId {
    let rep = db
        .repertoires()
        .create_repertoire(&NewRepertoire::new(name, color, 1500), STARTING_FEN, 1)
        .await
        .unwrap();
    db.graph().create_start_node(rep.id, STARTING_FEN).await.unwrap();
    rep.id
}

async fn edge_count(db: &Database) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM edges")
        .fetch_one(db.pool())
        .await
        .unwrap();
    n
}

#[tokio::test]
async fn test_deleting_repertoire_cascades_to_graph() {
    let db = Database::new_in_memory().await.unwrap();
    let rep = create(&db, "Sicilian", PieceColor::Black).await;
    let graph = db.graph();
    graph.add_edge(rep, STARTING_FEN, AFTER_E4, "e4", 10).await.unwrap();
    graph.add_edge(rep, AFTER_E4, AFTER_E4_C5, "c5", 10).await.unwrap();
    assert_eq!(graph.count_nodes(rep).await.unwrap(), 3);

    assert!(db.repertoires().delete_repertoire(rep).await.unwrap());

    assert_eq!(graph.count_nodes(rep).await.unwrap(), 0);
    assert_eq!(edge_count(&db).await, 0);
    assert!(graph.start_position(rep).await.unwrap().is_none());
}

#[tokio::test]
async fn test_repertoires_share_positions_but_not_state() {
    let db = Database::new_in_memory().await.unwrap();
    let white = create(&db, "White lines", PieceColor::White).await;
    let black = create(&db, "Black lines", PieceColor::Black).await;
    let graph = db.graph();

    graph.add_edge(white, STARTING_FEN, AFTER_E4, "e4", 10).await.unwrap();
    graph.add_edge(black, STARTING_FEN, AFTER_D4, "d4", 20).await.unwrap();

    assert_eq!(graph.list_edges(white, STARTING_FEN).await.unwrap(), vec!["e4"]);
    assert_eq!(graph.list_edges(black, STARTING_FEN).await.unwrap(), vec!["d4"]);

    let white_root = graph.get_node(white, STARTING_FEN).await.unwrap().unwrap();
    let black_root = graph.get_node(black, STARTING_FEN).await.unwrap().unwrap();
    assert_eq!(white_root.schedule.due, Some(10));
    assert_eq!(black_root.schedule.due, Some(20));

    // Removing a line in one repertoire leaves the other alone.
    graph.delete_edge(white, STARTING_FEN, "e4").await.unwrap();
    assert_eq!(graph.count_nodes(white).await.unwrap(), 1);
    assert_eq!(graph.count_nodes(black).await.unwrap(), 2);
    assert_eq!(graph.count_due(black, 100).await.unwrap(), 1);
}

#[tokio::test]
async fn test_edges_never_dangle_after_deletes() {
    let db = Database::new_in_memory().await.unwrap();
    let rep = create(&db, "Mixed", PieceColor::White).await;
    let graph = db.graph();
    graph.add_edge(rep, STARTING_FEN, AFTER_E4, "e4", 1).await.unwrap();
    graph.add_edge(rep, AFTER_E4, AFTER_E4_C5, "c5", 1).await.unwrap();
    graph.add_edge(rep, STARTING_FEN, AFTER_D4, "d4", 1).await.unwrap();
    graph.delete_edge(rep, AFTER_E4, "c5").await.unwrap();

    let (dangling,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM edges e \
         WHERE NOT EXISTS \
             (SELECT 1 FROM nodes n WHERE n.rep_id = e.rep_id AND n.fen = e.child_fen) \
            OR NOT EXISTS \
             (SELECT 1 FROM nodes n WHERE n.rep_id = e.rep_id AND n.fen = e.parent_fen)",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(dangling, 0);
    assert_eq!(edge_count(&db).await, 2);
    assert_eq!(graph.count_nodes(rep).await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_writers_on_separate_repertoires() {
    const LINES: usize = 40;

    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("repertoires.db")).await.unwrap();
    let mut reps = Vec::new();
    for name in ["One", "Two", "Three", "Four", "Five"] {
        reps.push(create(&db, name, PieceColor::White).await);
    }

    // Each task records LINES moves from the root and takes every other one
    // back right after, so adds and deletes from all repertoires interleave.
    async fn churn(graph: SqliteGraphRepository, rep: RepertoireId) {
        for i in 0..LINES {
            let child = format!("line-{i}");
            graph
                .add_edge(rep, STARTING_FEN, &child, &format!("m{i}"), i as u64)
                .await
                .unwrap();
            graph
                .add_edge(rep, &child, &format!("{child}-reply"), "r", i as u64)
                .await
                .unwrap();
            if i % 2 == 1 {
                let removed = graph
                    .delete_edge(rep, STARTING_FEN, &format!("m{i}"))
                    .await
                    .unwrap();
                assert_eq!(removed.len(), 2);
            }
        }
    }

    let tasks: Vec<_> = reps
        .iter()
        .map(|&rep| tokio::spawn(churn(db.graph(), rep)))
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    for rep in reps {
        let graph = db.graph();
        let kept = graph.list_edges(rep, STARTING_FEN).await.unwrap();
        assert_eq!(kept.len(), LINES / 2);
        assert_eq!(kept.first().map(String::as_str), Some("m0"));
        assert_eq!(graph.count_nodes(rep).await.unwrap(), 1 + LINES);
    }
    assert_eq!(edge_count(&db).await, (5 * LINES) as i64);
}

#[tokio::test]
async fn test_graph_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repertoires.db");
    let rep = {
        let db = Database::open(&path).await.unwrap();
        let rep = create(&db, "Persistent", PieceColor::White).await;
        db.graph().add_edge(rep, STARTING_FEN, AFTER_E4, "e4", 7).await.unwrap();
        db.pool().close().await;
        rep
    };

    let db = Database::open(&path).await.unwrap();
    let loaded = db.repertoires().load_repertoire(rep).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Persistent");
    assert_eq!(db.graph().list_edges(rep, STARTING_FEN).await.unwrap(), vec!["e4"]);
    assert_eq!(db.graph().list_due_nodes(rep, 7).await.unwrap(), vec![STARTING_FEN]);
}
